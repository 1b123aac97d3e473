//! Row-major `f32` matrix storage.

use crate::error::{BenchError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Dense row-major matrix; element `(i, j)` lives at `i * cols + j`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

/// Shape of one multiplication: `A` is `m x k`, `B` is `k x n`, `R` is `m x n`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixDims {
    /// Rows of A and R
    pub m: usize,
    /// Columns of A, rows of B
    pub k: usize,
    /// Columns of B and R
    pub n: usize,
}

impl MatrixDims {
    /// Floating-point operations for one multiplication (one multiply and one add per term)
    pub fn flops(&self) -> f64 {
        2.0 * self.m as f64 * self.k as f64 * self.n as f64
    }
}

impl std::fmt::Display for MatrixDims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} * {}x{}", self.m, self.k, self.k, self.n)
    }
}

fn allocate(rows: usize, cols: usize) -> Result<Vec<f32>> {
    let elements = rows.checked_mul(cols).ok_or_else(|| BenchError::Allocation {
        elements: usize::MAX,
        message: format!("{rows}x{cols} overflows usize"),
    })?;
    let mut data = Vec::new();
    data.try_reserve_exact(elements)
        .map_err(|e| BenchError::Allocation {
            elements,
            message: e.to_string(),
        })?;
    Ok(data)
}

impl Matrix {
    /// Zero-filled matrix, reporting allocation failure instead of aborting
    pub fn try_zeros(rows: usize, cols: usize) -> Result<Self> {
        let mut data = allocate(rows, cols)?;
        data.resize(rows * cols, 0.0);
        Ok(Self { rows, cols, data })
    }

    /// Zero-filled matrix
    ///
    /// # Panics
    ///
    /// Panics if the buffer cannot be allocated. Use [`Matrix::try_zeros`]
    /// where allocation failure must be reported.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Wrap an existing buffer
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(BenchError::Config(format!(
                "buffer of {} elements cannot back a {rows}x{cols} matrix",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build from row slices, which must all have the same length
    pub fn from_rows(rows: &[&[f32]]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        if let Some(bad) = rows.iter().position(|r| r.len() != cols) {
            return Err(BenchError::Config(format!(
                "row {bad} has {} columns, expected {cols}",
                rows[bad].len()
            )));
        }
        let mut data = allocate(rows.len(), cols)?;
        for row in rows {
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Matrix filled with integers in `0..10` stored as `f32`
    ///
    /// Small integers keep every product and partial sum exactly
    /// representable for moderate sizes, so scalar kernels agree bit for bit.
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Result<Self> {
        let mut data = allocate(rows, cols)?;
        data.extend((0..rows * cols).map(|_| rng.gen_range(0..10u8) as f32));
        Ok(Self { rows, cols, data })
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total element count
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the matrix has no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bounds-checked element read
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i < self.rows && j < self.cols {
            Some(self.data[i * self.cols + j])
        } else {
            None
        }
    }

    /// Bounds-checked element write access
    pub fn get_mut(&mut self, i: usize, j: usize) -> Option<&mut f32> {
        if i < self.rows && j < self.cols {
            Some(&mut self.data[i * self.cols + j])
        } else {
            None
        }
    }

    /// Row `i` as a slice
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        if i < self.rows {
            Some(&self.data[i * self.cols..(i + 1) * self.cols])
        } else {
            None
        }
    }

    /// Iterate over rows
    pub fn rows_iter(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact(0) panics; a zero-column matrix still has `rows` empty rows
        (0..self.rows).map(move |i| &self.data[i * self.cols..(i + 1) * self.cols])
    }

    /// Underlying row-major buffer
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Underlying row-major buffer, mutable
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consume into the underlying buffer
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f32;

    fn index(&self, (i, j): (usize, usize)) -> &f32 {
        assert!(
            i < self.rows && j < self.cols,
            "index ({i}, {j}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f32 {
        assert!(
            i < self.rows && j < self.cols,
            "index ({i}, {j}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        &mut self.data[i * self.cols + j]
    }
}
