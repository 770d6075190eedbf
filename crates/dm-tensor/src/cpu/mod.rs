pub mod matmul;
pub mod unary;

pub use matmul::SimdKernel;

use crate::backend::{check_rows, RowKernel};
use crate::error::Result;

/// Pure-Rust scalar row kernel.
///
/// Straightforward triple loop optimized for correctness rather than peak
/// performance. Serves as the reference every other kernel is checked against.
#[derive(Debug, Clone)]
pub struct ScalarKernel;

impl ScalarKernel {
    pub fn new() -> Self {
        ScalarKernel
    }
}

impl Default for ScalarKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl RowKernel for ScalarKernel {
    fn name(&self) -> &str {
        "scalar"
    }

    fn lane_width(&self) -> usize {
        1
    }

    fn compute_rows(
        &self,
        a: &[f32],
        b: &[f32],
        n: usize,
        first_row: usize,
        out: &mut [f32],
    ) -> Result<()> {
        let rows = check_rows(a, b, n, first_row, out)?;
        for r in 0..rows {
            let i = first_row + r;
            for j in 0..n {
                let mut sum = 0.0f32;
                for k in 0..n {
                    sum += a[i * n + k] * b[k * n + j];
                }
                out[r * n + j] = sum;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kernel() -> ScalarKernel {
        ScalarKernel::new()
    }

    #[test]
    fn test_identity() {
        let k = kernel();
        let a = vec![1.0, 0.0, 0.0, 1.0];
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let mut c = vec![0.0; 4];
        k.compute_rows(&a, &x, 2, 0, &mut c).unwrap();
        assert_eq!(c, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_basic() {
        let k = kernel();
        // [1,2;3,4] @ [5,6;7,8] = [19,22;43,50]
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let x = vec![5.0, 6.0, 7.0, 8.0];
        let mut c = vec![0.0; 4];
        k.compute_rows(&a, &x, 2, 0, &mut c).unwrap();
        assert_eq!(c, vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_single_row_offset() {
        let k = kernel();
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let x = vec![5.0, 6.0, 7.0, 8.0];
        let mut row = vec![0.0; 2];
        k.compute_rows(&a, &x, 2, 1, &mut row).unwrap();
        assert_eq!(row, vec![43.0, 50.0]);
    }

    #[test]
    fn test_input_length_mismatch() {
        let k = kernel();
        let mut c = vec![0.0; 4];
        assert!(k.compute_rows(&[1.0], &[1.0; 4], 2, 0, &mut c).is_err());
    }
}
