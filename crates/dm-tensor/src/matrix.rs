use std::fmt;

use crate::backend::RowKernel;
use crate::cpu::unary;
use crate::error::{Result, TensorError};

/// A square, row-major matrix of f32 values.
///
/// Holds `n * n` contiguous elements. Compute routines borrow the buffer and
/// never copy it.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Wrap an existing buffer as an `n x n` matrix.
    ///
    /// # Errors
    /// Returns `ZeroDimension` when `n == 0` and `LengthMismatch` when
    /// `data.len() != n * n`.
    pub fn from_vec(n: usize, data: Vec<f32>) -> Result<Self> {
        if n == 0 {
            return Err(TensorError::ZeroDimension);
        }
        let expected = checked_square(n)?;
        if data.len() != expected {
            return Err(TensorError::LengthMismatch {
                n,
                expected,
                got: data.len(),
            });
        }
        Ok(Matrix { n, data })
    }

    /// Create a zero-filled `n x n` matrix.
    pub fn zeros(n: usize) -> Result<Self> {
        Self::from_fn(n, |_, _| 0.0)
    }

    /// Create the `n x n` identity matrix.
    pub fn identity(n: usize) -> Result<Self> {
        Self::from_fn(n, |row, col| if row == col { 1.0 } else { 0.0 })
    }

    /// Fill with the flattened index, `value[i] = i`.
    pub fn indexed(n: usize) -> Result<Self> {
        Self::from_fn(n, |row, col| (row * n + col) as f32)
    }

    /// Build a matrix by evaluating `f(row, col)` for every cell in row-major order.
    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> f32) -> Result<Self> {
        if n == 0 {
            return Err(TensorError::ZeroDimension);
        }
        let mut data = Vec::with_capacity(checked_square(n)?);
        for row in 0..n {
            for col in 0..n {
                data.push(f(row, col));
            }
        }
        Ok(Matrix { n, data })
    }

    /// Side length of the matrix.
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Total number of elements (`n * n`).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a constructed matrix; kept for slice-like ergonomics.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Element at `(row, col)`.
    ///
    /// # Panics
    /// Panics if either index is `>= dim()`.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        assert!(row < self.n && col < self.n, "index ({row}, {col}) out of bounds");
        self.data[row * self.n + col]
    }

    /// One row as a slice.
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Largest element-wise relative difference against `other`.
    ///
    /// The denominator is `max(|x|, |y|, 1)`, so cells near zero are compared
    /// absolutely.
    pub fn max_relative_diff(&self, other: &Matrix) -> Result<f32> {
        if self.n != other.n {
            return Err(TensorError::DimensionMismatch {
                a: self.n,
                b: other.n,
            });
        }
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&x, &y)| (x - y).abs() / x.abs().max(y.abs()).max(1.0))
            .fold(0.0f32, f32::max))
    }

    /// Multiply every element by `factor`, walking the buffer linearly.
    pub fn scale_in_place(&mut self, factor: f32) {
        unary::scale_in_place(&mut self.data, factor);
    }

    /// Serial product `self @ other` using the given kernel on every row.
    pub fn matmul(&self, other: &Matrix, kernel: &dyn RowKernel) -> Result<Matrix> {
        if self.n != other.n {
            return Err(TensorError::DimensionMismatch {
                a: self.n,
                b: other.n,
            });
        }
        let mut out = Matrix::zeros(self.n)?;
        kernel.compute_rows(&self.data, &other.data, self.n, 0, &mut out.data)?;
        Ok(out)
    }
}

fn checked_square(n: usize) -> Result<usize> {
    n.checked_mul(n).ok_or(TensorError::TooLarge(n))
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.n {
            for (col, v) in self.row(row).iter().enumerate() {
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{v}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
