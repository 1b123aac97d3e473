/// Cache-friendly matrix multiplication using i-k-j loop order.
///
/// Swapping the j and k loops makes the innermost loop walk both B and C
/// with stride 1. Each C element still accumulates its terms in increasing
/// `p` starting from zero, so results are bit-identical to the naive kernel.
pub fn matmul_ikj(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, k: usize) {
    debug_assert_eq!(c.len(), m * n);
    matmul_rows_ikj(a, b, c, 0, n, k);
}

/// i-k-j multiplication of a contiguous band of output rows.
///
/// `c_rows` holds whole rows of C starting at global row `row_start`; its
/// length must be a multiple of `n`. Used directly by the parallel kernel,
/// where each worker owns one band.
pub fn matmul_rows_ikj(
    a: &[f32],
    b: &[f32],
    c_rows: &mut [f32],
    row_start: usize,
    n: usize,
    k: usize,
) {
    if n == 0 {
        return;
    }
    debug_assert_eq!(c_rows.len() % n, 0);

    for (local, c_row) in c_rows.chunks_exact_mut(n).enumerate() {
        let i = row_start + local;
        let a_row = &a[i * k..(i + 1) * k];

        c_row.fill(0.0);
        for (p, &a_ip) in a_row.iter().enumerate() {
            let b_row = &b[p * n..(p + 1) * n];
            for (c_ij, &b_pj) in c_row.iter_mut().zip(b_row) {
                *c_ij += a_ip * b_pj;
            }
        }
    }
}
