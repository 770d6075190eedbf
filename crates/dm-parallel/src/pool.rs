use std::panic::{self, AssertUnwindSafe};

use dm_tensor::TensorError;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{ParallelError, Result};
use crate::partition::{partition_rows, validate_threads, RemainderPolicy};
use crate::strategy::{ExecutionStrategy, RowJob, StrategyKind};

/// Work-sharing strategy backed by a dedicated rayon pool.
///
/// The pool is built once with a fixed worker count and never resized. Each
/// run hands the row loop to the pool, one output row per task, and blocks in
/// `install` until the loop drains.
///
/// Row counts are checked against `threads` and `remainder` with the same
/// rules as [`ExplicitThreads`](crate::ExplicitThreads), so a configuration
/// is accepted or rejected identically by both strategies.
#[derive(Debug)]
pub struct PoolStrategy {
    pool: ThreadPool,
    threads: usize,
    remainder: RemainderPolicy,
}

impl PoolStrategy {
    pub fn new(threads: usize, remainder: RemainderPolicy) -> Result<Self> {
        validate_threads(threads)?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("dm-pool-{}", i))
            .build()?;
        Ok(Self {
            pool,
            threads,
            remainder,
        })
    }
}

impl ExecutionStrategy for PoolStrategy {
    fn name(&self) -> &str {
        "pool"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Pool
    }

    fn threads(&self) -> usize {
        self.threads
    }

    fn execute(&self, job: &RowJob<'_>, c: &mut [f32]) -> Result<()> {
        partition_rows(job.n, self.threads, self.remainder)?;
        let expected = job.n.checked_mul(job.n).ok_or(TensorError::TooLarge(job.n))?;
        if c.len() != expected {
            return Err(ParallelError::RangeMismatch {
                expected: job.n,
                got: c.len() / job.n.max(1),
            });
        }

        let run = panic::catch_unwind(AssertUnwindSafe(|| {
            self.pool.install(|| {
                c.par_chunks_mut(job.n)
                    .enumerate()
                    .try_for_each(|(row, out)| {
                        job.kernel.compute_rows(job.a, job.b, job.n, row, out)
                    })
            })
        }));

        match run {
            Ok(result) => Ok(result?),
            Err(_) => Err(ParallelError::PoolPanicked),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dm_tensor::{Matrix, ScalarKernel, SimdKernel};

    #[test]
    fn test_pool_has_requested_workers() {
        let s = PoolStrategy::new(3, RemainderPolicy::LastWorker).unwrap();
        assert_eq!(s.pool.current_num_threads(), 3);
    }

    #[test]
    fn test_matches_serial() {
        let a = Matrix::indexed(16).unwrap();
        let b = Matrix::indexed(16).unwrap();
        let expected = a.matmul(&b, &ScalarKernel::new()).unwrap();

        let kernel = SimdKernel::new();
        let job = RowJob {
            a: a.as_slice(),
            b: b.as_slice(),
            n: 16,
            kernel: &kernel,
        };
        let mut c = vec![0.0; 256];
        PoolStrategy::new(4, RemainderPolicy::Reject)
            .unwrap()
            .execute(&job, &mut c)
            .unwrap();
        for (x, y) in c.iter().zip(expected.as_slice()) {
            approx::assert_relative_eq!(x, y, max_relative = 1e-4);
        }
    }

    #[test]
    fn test_pool_is_reusable_across_runs() {
        let a = Matrix::identity(8).unwrap();
        let kernel = ScalarKernel::new();
        let job = RowJob {
            a: a.as_slice(),
            b: a.as_slice(),
            n: 8,
            kernel: &kernel,
        };
        let s = PoolStrategy::new(2, RemainderPolicy::Reject).unwrap();
        for _ in 0..3 {
            let mut c = vec![0.0; 64];
            s.execute(&job, &mut c).unwrap();
            assert_eq!(c, a.as_slice());
        }
    }

    #[test]
    fn test_row_count_rules_match_explicit_threads() {
        let a = vec![1.0; 100];
        let kernel = ScalarKernel::new();
        let job = RowJob {
            a: &a,
            b: &a,
            n: 10,
            kernel: &kernel,
        };
        let mut c = vec![0.0; 100];
        assert!(matches!(
            PoolStrategy::new(4, RemainderPolicy::Reject)
                .unwrap()
                .execute(&job, &mut c),
            Err(ParallelError::UnevenPartition {
                rows: 10,
                threads: 4
            })
        ));
        PoolStrategy::new(4, RemainderPolicy::LastWorker)
            .unwrap()
            .execute(&job, &mut c)
            .unwrap();
        assert_eq!(c, vec![10.0; 100]);

        let small = vec![1.0; 4];
        let job = RowJob {
            a: &small,
            b: &small,
            n: 2,
            kernel: &kernel,
        };
        let mut c = vec![0.0; 4];
        assert!(matches!(
            PoolStrategy::new(8, RemainderPolicy::LastWorker)
                .unwrap()
                .execute(&job, &mut c),
            Err(ParallelError::TooManyThreads {
                threads: 8,
                rows: 2
            })
        ));
    }

    #[test]
    fn test_wrong_output_length() {
        let a = vec![0.0; 4];
        let kernel = ScalarKernel::new();
        let job = RowJob {
            a: &a,
            b: &a,
            n: 2,
            kernel: &kernel,
        };
        let mut c = vec![0.0; 6];
        assert!(PoolStrategy::new(1, RemainderPolicy::LastWorker)
            .unwrap()
            .execute(&job, &mut c)
            .is_err());
    }
}
