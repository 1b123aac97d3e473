//! Column-blocked SIMD kernel.
//!
//! Computes 8 adjacent output elements of a row at once: for each `p` the
//! scalar `A[i,p]` is broadcast and multiplied against 8 contiguous elements
//! of row `p` of B. On x86_64 with AVX2 and FMA this uses `_mm256_fmadd_ps`,
//! whose single rounding makes results differ from the naive kernel by a few
//! ulps. Elsewhere an 8-lane array block keeps the naive summation order and
//! is left to the auto-vectorizer.

/// Lanes per block
pub const LANES: usize = 8;

/// Name of the code path `matmul_vectorized` takes on this machine
pub fn backend() -> &'static str {
    #[cfg(target_arch = "x86_64")]
    {
        if has_avx2_fma() {
            return "avx2+fma";
        }
    }
    "portable"
}

#[cfg(target_arch = "x86_64")]
fn has_avx2_fma() -> bool {
    is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma")
}

/// Vectorized matrix multiply, overwriting C with A * B.
///
/// Picks the AVX2+FMA path when the CPU supports it, otherwise the portable
/// block kernel.
pub fn matmul_vectorized(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, k: usize) {
    assert_eq!(a.len(), m * k, "A: expected {}x{}={} elements", m, k, m * k);
    assert_eq!(b.len(), k * n, "B: expected {}x{}={} elements", k, n, k * n);
    assert_eq!(c.len(), m * n, "C: expected {}x{}={} elements", m, n, m * n);

    #[cfg(target_arch = "x86_64")]
    {
        if has_avx2_fma() {
            // SAFETY: AVX2 and FMA support was just detected; slice lengths
            // were asserted above.
            unsafe { matmul_avx2_fma(a, b, c, m, n, k) };
            return;
        }
    }

    matmul_portable(a, b, c, m, n, k);
}

/// Portable 8-lane kernel
pub fn matmul_portable(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, k: usize) {
    let n_main = (n / LANES) * LANES;

    for i in 0..m {
        let a_row = &a[i * k..(i + 1) * k];

        for j in (0..n_main).step_by(LANES) {
            let mut acc = [0.0f32; LANES];
            for (p, &a_ip) in a_row.iter().enumerate() {
                let b_block = &b[p * n + j..p * n + j + LANES];
                for (lane, &b_pj) in acc.iter_mut().zip(b_block) {
                    *lane += a_ip * b_pj;
                }
            }
            c[i * n + j..i * n + j + LANES].copy_from_slice(&acc);
        }

        for j in n_main..n {
            let mut sum = 0.0f32;
            for (p, &a_ip) in a_row.iter().enumerate() {
                sum += a_ip * b[p * n + j];
            }
            c[i * n + j] = sum;
        }
    }
}

/// AVX2+FMA kernel.
///
/// # Safety
///
/// Caller must ensure the CPU supports AVX2 and FMA and that `a`, `b` and
/// `c` hold at least `m*k`, `k*n` and `m*n` elements.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2,fma")]
unsafe fn matmul_avx2_fma(a: &[f32], b: &[f32], c: &mut [f32], m: usize, n: usize, k: usize) {
    use std::arch::x86_64::*;

    let n_main = (n / LANES) * LANES;

    for i in 0..m {
        let a_row = &a[i * k..(i + 1) * k];

        for j in (0..n_main).step_by(LANES) {
            // SAFETY: j + LANES <= n, so every load reads inside row p of B
            // and the store writes inside row i of C.
            unsafe {
                let mut acc = _mm256_setzero_ps();
                for (p, &a_ip) in a_row.iter().enumerate() {
                    let b_vec = _mm256_loadu_ps(b.as_ptr().add(p * n + j));
                    acc = _mm256_fmadd_ps(_mm256_set1_ps(a_ip), b_vec, acc);
                }
                _mm256_storeu_ps(c.as_mut_ptr().add(i * n + j), acc);
            }
        }

        for j in n_main..n {
            let mut sum = 0.0f32;
            for (p, &a_ip) in a_row.iter().enumerate() {
                sum += a_ip * b[p * n + j];
            }
            c[i * n + j] = sum;
        }
    }
}
