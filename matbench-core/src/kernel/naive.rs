/// Reference matrix multiplication using i-j-k loop order.
///
/// Each output element is a dot product of a row of A with a column of B,
/// summed in increasing `p`. The inner loop strides through B by `n`, so this
/// is the slowest variant and the one every other kernel is checked against.
///
/// # Arguments
///
/// * `a` - Matrix A (m × k), row-major
/// * `b` - Matrix B (k × n), row-major
/// * `c` - Matrix C (m × n), row-major, overwritten with A * B
pub fn matmul_naive(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, k: usize) {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    debug_assert_eq!(c.len(), m * n);

    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0f32;
            for p in 0..k {
                sum += a[i * k + p] * b[p * n + j];
            }
            c[i * n + j] = sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let id = [1.0, 0.0, 0.0, 1.0];
        let mut c = [0.0; 4];
        matmul_naive(&a, &id, &mut c, 2, 2, 2);
        assert_eq!(c, a);
    }

    #[test]
    fn test_zero_inner_dimension_clears_output() {
        let mut c = [5.0; 6];
        matmul_naive(&[], &[], &mut c, 2, 3, 0);
        assert_eq!(c, [0.0; 6]);
    }
}
