//! `dm-tensor` - Dense matrices and row kernels for densemm.
//!
//! This crate provides:
//! - A square, row-major `Matrix` type
//! - A `RowKernel` trait with scalar and 16-lane SIMD implementations
//! - Runtime SIMD level detection for kernel selection
//! - `BlockPool`, a cache-line aligned fixed-size block dispenser

pub mod backend;
pub mod cpu;
pub mod detect;
pub mod error;
pub mod matrix;
pub mod pool;

// Re-export primary types at the crate root for convenience.
pub use backend::{KernelKind, RowKernel};
pub use cpu::{ScalarKernel, SimdKernel};
pub use detect::{simd_level, SimdLevel};
pub use error::{Result, TensorError};
pub use matrix::Matrix;
pub use pool::{BlockHandle, BlockPool, CACHE_LINE_SIZE};
