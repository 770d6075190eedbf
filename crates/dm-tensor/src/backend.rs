use std::fmt::{self, Debug};
use std::str::FromStr;

use crate::cpu::{ScalarKernel, SimdKernel};
use crate::detect::{simd_level, SimdLevel};
use crate::error::{Result, TensorError};

/// Trait for pluggable row kernels (scalar, wide-lane SIMD).
///
/// A kernel computes whole output rows of `C = A @ B` for square `n x n`
/// row-major inputs. Callers hand each kernel invocation a disjoint slice of
/// `C`, which is what lets several workers run kernels concurrently without
/// locking the output.
pub trait RowKernel: Send + Sync + Debug {
    /// Returns the name of this kernel (e.g., "scalar", "simd").
    fn name(&self) -> &str;

    /// Number of f32 values processed per vector step; 1 for scalar code.
    fn lane_width(&self) -> usize;

    /// Fill `out` with rows `first_row..first_row + out.len() / n` of `A @ B`.
    ///
    /// - `a`, `b`: row-major data of shape [n, n]
    /// - `out`: whole output rows, `out.len()` must be a multiple of `n`
    fn compute_rows(
        &self,
        a: &[f32],
        b: &[f32],
        n: usize,
        first_row: usize,
        out: &mut [f32],
    ) -> Result<()>;
}

/// Shared argument checks for `RowKernel::compute_rows` implementations.
pub(crate) fn check_rows(
    a: &[f32],
    b: &[f32],
    n: usize,
    first_row: usize,
    out: &[f32],
) -> Result<usize> {
    if n == 0 {
        return Err(TensorError::ZeroDimension);
    }
    let nn = n.checked_mul(n).ok_or(TensorError::TooLarge(n))?;
    if a.len() != nn {
        return Err(TensorError::LengthMismatch {
            n,
            expected: nn,
            got: a.len(),
        });
    }
    if b.len() != nn {
        return Err(TensorError::LengthMismatch {
            n,
            expected: nn,
            got: b.len(),
        });
    }
    if out.len() % n != 0 {
        return Err(TensorError::PartialRows { n, got: out.len() });
    }
    let rows = out.len() / n;
    match first_row.checked_add(rows) {
        Some(end_row) if end_row <= n => Ok(rows),
        end_row => Err(TensorError::RowsOutOfBounds {
            first_row,
            end_row: end_row.unwrap_or(usize::MAX),
            n,
        }),
    }
}

/// Kernel selector used by configuration surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KernelKind {
    /// Plain triple loop.
    #[default]
    Scalar,
    /// 16-lane fused multiply-add kernel with a scalar tail.
    Simd,
    /// `Simd` when the CPU reports a vector unit, otherwise `Scalar`.
    Auto,
}

impl KernelKind {
    /// Resolve `Auto` against the detected SIMD level.
    pub fn resolve(self) -> KernelKind {
        match self {
            KernelKind::Auto if simd_level() > SimdLevel::Scalar => KernelKind::Simd,
            KernelKind::Auto => KernelKind::Scalar,
            other => other,
        }
    }

    /// Instantiate the kernel this selector names.
    pub fn build(self) -> Box<dyn RowKernel> {
        match self.resolve() {
            KernelKind::Simd => Box::new(SimdKernel::new()),
            _ => Box::new(ScalarKernel::new()),
        }
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelKind::Scalar => write!(f, "scalar"),
            KernelKind::Simd => write!(f, "simd"),
            KernelKind::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for KernelKind {
    type Err = TensorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "scalar" => Ok(KernelKind::Scalar),
            "simd" => Ok(KernelKind::Simd),
            "auto" => Ok(KernelKind::Auto),
            other => Err(TensorError::UnknownKernel(other.to_string())),
        }
    }
}
