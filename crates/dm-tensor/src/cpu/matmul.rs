//! Wide-lane matmul kernel.
//!
//! Each output row is produced in groups of [`LANES`] columns. For every `k`
//! the kernel broadcasts `A[i, k]` and accumulates it against the contiguous
//! slice `B[k, j..j + LANES]` with a multiply-add per 8-lane half, so each
//! lane ends up holding the dot product of row `i` of A with one column of B.
//!
//! Accumulation runs sequentially over `k` inside every lane. Multiply-adds
//! are fused where the target supports it, so results can differ from
//! [`ScalarKernel`](super::ScalarKernel) in the last bits. That difference is
//! expected and callers compare with a relative tolerance.
//!
//! Columns past the last full lane group (`n % LANES`) go through a scalar
//! cleanup loop, so any `n` is accepted.

use wide::f32x8;

use crate::backend::{check_rows, RowKernel};
use crate::error::Result;

/// f32 values handled per accumulation step.
pub const LANES: usize = 16;

const HALF: usize = LANES / 2;

#[derive(Debug, Clone, Default)]
pub struct SimdKernel;

impl SimdKernel {
    pub fn new() -> Self {
        SimdKernel
    }
}

#[inline(always)]
fn load(src: &[f32]) -> f32x8 {
    let mut buf = [0.0f32; HALF];
    buf.copy_from_slice(&src[..HALF]);
    f32x8::from(buf)
}

impl RowKernel for SimdKernel {
    fn name(&self) -> &str {
        "simd"
    }

    fn lane_width(&self) -> usize {
        LANES
    }

    fn compute_rows(
        &self,
        a: &[f32],
        b: &[f32],
        n: usize,
        first_row: usize,
        out: &mut [f32],
    ) -> Result<()> {
        check_rows(a, b, n, first_row, out)?;
        let full = n - n % LANES;

        for (r, c_row) in out.chunks_exact_mut(n).enumerate() {
            let i = first_row + r;
            let a_row = &a[i * n..(i + 1) * n];

            for j in (0..full).step_by(LANES) {
                let mut lo = f32x8::ZERO;
                let mut hi = f32x8::ZERO;
                for (k, &aik) in a_row.iter().enumerate() {
                    let av = f32x8::splat(aik);
                    let group = &b[k * n + j..k * n + j + LANES];
                    lo = av.mul_add(load(&group[..HALF]), lo);
                    hi = av.mul_add(load(&group[HALF..]), hi);
                }
                c_row[j..j + HALF].copy_from_slice(&lo.to_array());
                c_row[j + HALF..j + LANES].copy_from_slice(&hi.to_array());
            }

            // tail
            for j in full..n {
                let mut sum = 0.0f32;
                for (k, &aik) in a_row.iter().enumerate() {
                    sum += aik * b[k * n + j];
                }
                c_row[j] = sum;
            }
        }
        Ok(())
    }
}
