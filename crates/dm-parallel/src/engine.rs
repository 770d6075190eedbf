use dm_tensor::{Matrix, RowKernel, ScalarKernel, TensorError};
use tracing::debug;

use crate::config::MultiplyConfig;
use crate::error::Result;
use crate::strategy::{ExecutionStrategy, RowJob};

/// Parallel square-matrix multiplier.
///
/// Owns one execution strategy and one row kernel, both built from a
/// `MultiplyConfig` up front so that repeated runs pay no setup cost.
#[derive(Debug)]
pub struct Multiplier {
    config: MultiplyConfig,
    strategy: Box<dyn ExecutionStrategy>,
    kernel: Box<dyn RowKernel>,
}

impl Multiplier {
    pub fn new(config: MultiplyConfig) -> Result<Self> {
        config.validate()?;
        let strategy = config.strategy.build(config.threads, config.remainder)?;
        let kernel = config.kernel.build();
        debug!(
            threads = config.threads,
            strategy = strategy.name(),
            kernel = kernel.name(),
            "multiplier ready"
        );
        Ok(Self {
            config,
            strategy,
            kernel,
        })
    }

    pub fn config(&self) -> &MultiplyConfig {
        &self.config
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub fn kernel_name(&self) -> &str {
        self.kernel.name()
    }

    /// Compute `a @ b` into a freshly allocated matrix.
    ///
    /// Either every cell of the result is written or an error is returned
    /// and no matrix is produced.
    pub fn multiply(&self, a: &Matrix, b: &Matrix) -> Result<Matrix> {
        let mut c = Matrix::zeros(a.dim())?;
        self.multiply_into(a, b, &mut c)?;
        Ok(c)
    }

    /// Compute `a @ b` into `c`, overwriting every cell.
    ///
    /// On error the contents of `c` are unspecified.
    pub fn multiply_into(&self, a: &Matrix, b: &Matrix, c: &mut Matrix) -> Result<()> {
        let n = a.dim();
        for other in [b.dim(), c.dim()] {
            if other != n {
                return Err(TensorError::DimensionMismatch { a: n, b: other }.into());
            }
        }
        self.multiply_slices(a.as_slice(), b.as_slice(), n, c.as_mut_slice())
    }

    /// Raw-buffer form of [`multiply_into`](Self::multiply_into) for callers
    /// that own their storage. All three buffers must hold `n * n` values.
    pub fn multiply_slices(&self, a: &[f32], b: &[f32], n: usize, c: &mut [f32]) -> Result<()> {
        if n == 0 {
            return Err(TensorError::ZeroDimension.into());
        }
        let expected = n.checked_mul(n).ok_or(TensorError::TooLarge(n))?;
        for got in [a.len(), b.len(), c.len()] {
            if got != expected {
                return Err(TensorError::LengthMismatch { n, expected, got }.into());
            }
        }

        let _span = tracing::debug_span!(
            "multiply",
            n,
            threads = self.config.threads,
            strategy = self.strategy.name(),
            kernel = self.kernel.name()
        )
        .entered();

        let job = RowJob {
            a,
            b,
            n,
            kernel: self.kernel.as_ref(),
        };
        self.strategy.execute(&job, c)?;
        debug!("run complete");
        Ok(())
    }
}

/// Serial scalar product, the baseline every parallel run must agree with.
pub fn reference_multiply(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    Ok(a.matmul(b, &ScalarKernel::new())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParallelError;
    use crate::partition::RemainderPolicy;
    use crate::strategy::StrategyKind;
    use approx::assert_relative_eq;
    use dm_tensor::KernelKind;

    fn configs(threads: usize) -> Vec<MultiplyConfig> {
        let mut out = Vec::new();
        for strategy in StrategyKind::ALL {
            for kernel in [KernelKind::Scalar, KernelKind::Simd] {
                out.push(
                    MultiplyConfig::default()
                        .with_threads(threads)
                        .with_strategy(strategy)
                        .with_kernel(kernel),
                );
            }
        }
        out
    }

    #[test]
    fn test_identity_is_exact() {
        let i = Matrix::identity(4).unwrap();
        for config in configs(2) {
            let c = Multiplier::new(config).unwrap().multiply(&i, &i).unwrap();
            assert_eq!(c, i);
        }
    }

    #[test]
    fn test_indexed_32_matches_reference() {
        let a = Matrix::indexed(32).unwrap();
        let expected = reference_multiply(&a, &a).unwrap();
        for config in configs(4) {
            let c = Multiplier::new(config).unwrap().multiply(&a, &a).unwrap();
            assert_eq!(c.len(), 32 * 32);
            for (x, y) in c.as_slice().iter().zip(expected.as_slice()) {
                assert_relative_eq!(x, y, max_relative = 1e-4);
            }
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let m = Multiplier::new(MultiplyConfig::default().with_threads(1)).unwrap();
        let a = Matrix::zeros(4).unwrap();
        let b = Matrix::zeros(8).unwrap();
        assert!(matches!(
            m.multiply(&a, &b),
            Err(ParallelError::Tensor(TensorError::DimensionMismatch { a: 4, b: 8 }))
        ));
    }

    #[test]
    fn test_strict_remainder_fails_before_output() {
        let m = Multiplier::new(
            MultiplyConfig::default()
                .with_threads(3)
                .with_remainder(RemainderPolicy::Reject),
        )
        .unwrap();
        let a = Matrix::identity(8).unwrap();
        assert!(matches!(
            m.multiply(&a, &a),
            Err(ParallelError::UnevenPartition { rows: 8, threads: 3 })
        ));
    }

    #[test]
    fn test_multiply_slices_checks_lengths() {
        let m = Multiplier::new(MultiplyConfig::default().with_threads(2)).unwrap();
        let a = vec![1.0; 16];
        let mut c = vec![0.0; 15];
        assert!(matches!(
            m.multiply_slices(&a, &a, 4, &mut c),
            Err(ParallelError::Tensor(TensorError::LengthMismatch {
                n: 4,
                expected: 16,
                got: 15
            }))
        ));

        let mut c = vec![0.0; 16];
        m.multiply_slices(&a, &a, 4, &mut c).unwrap();
        assert_eq!(c, vec![4.0; 16]);
    }

    #[test]
    fn test_names() {
        let m = Multiplier::new(
            MultiplyConfig::default()
                .with_threads(2)
                .with_strategy(StrategyKind::Pool)
                .with_kernel(KernelKind::Simd),
        )
        .unwrap();
        assert_eq!(m.strategy_name(), "pool");
        assert_eq!(m.kernel_name(), "simd");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(24))]

            #[test]
            fn strategies_agree_with_reference(
                threads in 1usize..=4,
                per_worker in 1usize..=6,
                seed in any::<u32>(),
            ) {
                let n = threads * per_worker * 4;
                let a = Matrix::from_fn(n, |r, c| ((r * 31 + c * 17 + seed as usize) % 23) as f32 - 11.0).unwrap();
                let b = Matrix::from_fn(n, |r, c| ((r * 7 + c * 13 + seed as usize) % 19) as f32 - 9.0).unwrap();
                let expected = reference_multiply(&a, &b).unwrap();

                for config in configs(threads) {
                    let c = Multiplier::new(config).unwrap().multiply(&a, &b).unwrap();
                    prop_assert!(c.max_relative_diff(&expected).unwrap() <= 1e-4);
                }
            }
        }
    }
}
