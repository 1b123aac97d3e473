//! Result Verification
//!
//! Tolerance-based comparison of a candidate result against a reference.
//! Element drift is measured relative to the reference value, or absolutely
//! when the reference is close to zero. A mismatch is reported, never raised.

use crate::matrix::Matrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Default per-element tolerance
pub const DEFAULT_TOLERANCE: f32 = 1e-4;

/// References at or below this magnitude are compared absolutely
const RELATIVE_EPSILON: f32 = 1e-6;

/// Outcome of comparing two matrices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    /// True when shapes agree and every element is within tolerance
    pub matches: bool,
    /// Tolerance the comparison used
    pub tolerance: f32,
    /// Largest absolute difference seen
    pub max_abs_diff: f32,
    /// Largest relative difference seen (elements with non-negligible reference)
    pub max_rel_diff: f32,
    /// Element with the largest drift, as (row, col)
    pub worst_index: Option<(usize, usize)>,
    /// Elements outside tolerance
    pub mismatches: usize,
    /// Elements compared
    pub compared: usize,
    /// Whether the two matrices had the same shape
    pub shape_matches: bool,
}

impl Verification {
    /// One-line summary of the drift, suitable for a warning
    pub fn describe(&self) -> String {
        if !self.shape_matches {
            return "result shape differs from reference".to_string();
        }
        match self.worst_index {
            Some((i, j)) if !self.matches => format!(
                "{} of {} elements exceed tolerance {:e} \
                 (max abs diff {:e}, max rel diff {:e}, worst at ({i}, {j}))",
                self.mismatches,
                self.compared,
                self.tolerance,
                self.max_abs_diff,
                self.max_rel_diff
            ),
            _ => format!(
                "all {} elements within tolerance {:e} (max abs diff {:e})",
                self.compared, self.tolerance, self.max_abs_diff
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Drift {
    max_abs: f32,
    max_rel: f32,
    worst: Option<(usize, f32)>,
    mismatches: usize,
}

impl Drift {
    fn observe(mut self, idx: usize, r: f32, c: f32, tolerance: f32) -> Self {
        let abs = (r - c).abs();
        let diff = if r.abs() > RELATIVE_EPSILON {
            let rel = abs / r.abs();
            self.max_rel = self.max_rel.max(rel);
            rel
        } else {
            abs
        };
        self.max_abs = self.max_abs.max(abs);

        // NaN never compares within tolerance
        let within = diff <= tolerance;
        if !within {
            self.mismatches += 1;
        }
        let score = if diff.is_nan() { f32::INFINITY } else { diff };
        self.worst = pick_worst(self.worst, Some((idx, score)));
        self
    }

    fn merge(self, other: Self) -> Self {
        Self {
            max_abs: self.max_abs.max(other.max_abs),
            max_rel: self.max_rel.max(other.max_rel),
            worst: pick_worst(self.worst, other.worst),
            mismatches: self.mismatches + other.mismatches,
        }
    }
}

/// Larger score wins; ties go to the lower index so results are deterministic
fn pick_worst(a: Option<(usize, f32)>, b: Option<(usize, f32)>) -> Option<(usize, f32)> {
    match (a, b) {
        (Some(x), Some(y)) => {
            if y.1 > x.1 || (y.1 == x.1 && y.0 < x.0) {
                Some(y)
            } else {
                Some(x)
            }
        }
        (x, None) => x,
        (None, y) => y,
    }
}

/// Compare `candidate` against `reference` element by element.
///
/// Shape disagreement yields a non-matching result with nothing compared.
pub fn verify(reference: &Matrix, candidate: &Matrix, tolerance: f32) -> Verification {
    if reference.rows() != candidate.rows() || reference.cols() != candidate.cols() {
        return Verification {
            matches: false,
            tolerance,
            max_abs_diff: 0.0,
            max_rel_diff: 0.0,
            worst_index: None,
            mismatches: 0,
            compared: 0,
            shape_matches: false,
        };
    }

    let drift = reference
        .as_slice()
        .par_iter()
        .zip(candidate.as_slice().par_iter())
        .enumerate()
        .fold(Drift::default, |acc, (idx, (&r, &c))| {
            acc.observe(idx, r, c, tolerance)
        })
        .reduce(Drift::default, Drift::merge);

    let cols = reference.cols();
    Verification {
        matches: drift.mismatches == 0,
        tolerance,
        max_abs_diff: drift.max_abs,
        max_rel_diff: drift.max_rel,
        worst_index: drift.worst.map(|(idx, _)| (idx / cols, idx % cols)),
        mismatches: drift.mismatches,
        compared: reference.len(),
        shape_matches: true,
    }
}

/// True when `candidate` equals `reference` within `tolerance`
pub fn matches(reference: &Matrix, candidate: &Matrix, tolerance: f32) -> bool {
    verify(reference, candidate, tolerance).matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: &[&[f32]]) -> Matrix {
        Matrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_identical_matrices_match() {
        let a = m(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let v = verify(&a, &a.clone(), DEFAULT_TOLERANCE);
        assert!(v.matches);
        assert_eq!(v.mismatches, 0);
        assert_eq!(v.compared, 4);
        assert_eq!(v.max_abs_diff, 0.0);
    }

    #[test]
    fn test_relative_difference_within_tolerance() {
        let r = m(&[&[1000.0, 2.0]]);
        let c = m(&[&[1000.05, 2.0]]);
        // 0.05 / 1000 = 5e-5
        assert!(matches(&r, &c, 1e-4));
        assert!(!matches(&r, &c, 1e-5));
    }

    #[test]
    fn test_absolute_difference_near_zero() {
        let r = m(&[&[0.0, 1.0]]);
        let c = m(&[&[0.5e-4, 1.0]]);
        assert!(matches(&r, &c, 1e-4));

        let c = m(&[&[2e-4, 1.0]]);
        let v = verify(&r, &c, 1e-4);
        assert!(!v.matches);
        assert_eq!(v.worst_index, Some((0, 0)));
        assert_eq!(v.max_rel_diff, 0.0);
    }

    #[test]
    fn test_reports_worst_element() {
        let r = m(&[&[1.0, 1.0], &[1.0, 1.0]]);
        let c = m(&[&[1.0, 1.1], &[1.5, 1.0]]);
        let v = verify(&r, &c, 1e-4);
        assert!(!v.matches);
        assert_eq!(v.mismatches, 2);
        assert_eq!(v.worst_index, Some((1, 0)));
        assert!((v.max_abs_diff - 0.5).abs() < 1e-6);
        assert!(v.describe().contains("2 of 4"));
    }

    #[test]
    fn test_shape_mismatch_is_not_a_match() {
        let r = Matrix::zeros(2, 2);
        let c = Matrix::zeros(2, 3);
        let v = verify(&r, &c, DEFAULT_TOLERANCE);
        assert!(!v.matches);
        assert!(!v.shape_matches);
        assert_eq!(v.compared, 0);
    }

    #[test]
    fn test_nan_is_a_mismatch() {
        let r = m(&[&[1.0, 2.0]]);
        let c = m(&[&[1.0, f32::NAN]]);
        let v = verify(&r, &c, DEFAULT_TOLERANCE);
        assert!(!v.matches);
        assert_eq!(v.mismatches, 1);
        assert_eq!(v.worst_index, Some((0, 1)));
    }

    #[test]
    fn test_large_matrix_parallel_reduction() {
        let rows = 64;
        let cols = 65;
        let r = Matrix::from_vec(rows, cols, (0..rows * cols).map(|x| x as f32 + 1.0).collect())
            .unwrap();
        let mut c = r.clone();
        c[(40, 7)] += 100.0;
        let v = verify(&r, &c, DEFAULT_TOLERANCE);
        assert_eq!(v.mismatches, 1);
        assert_eq!(v.worst_index, Some((40, 7)));
    }
}
