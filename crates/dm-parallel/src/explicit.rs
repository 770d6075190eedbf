use std::thread;

use tracing::debug;

use crate::error::{ParallelError, Result};
use crate::partition::{partition_rows, split_rows_mut, validate_threads, RemainderPolicy};
use crate::strategy::{ExecutionStrategy, RowJob, StrategyKind};

/// Explicit threading: one named OS thread per `WorkRange`.
///
/// Threads are scoped to a single run, so the thread set is created fresh and
/// joined before `execute` returns. Workers never wait on each other.
#[derive(Debug, Clone)]
pub struct ExplicitThreads {
    threads: usize,
    remainder: RemainderPolicy,
}

impl ExplicitThreads {
    pub fn new(threads: usize, remainder: RemainderPolicy) -> Result<Self> {
        validate_threads(threads)?;
        Ok(Self { threads, remainder })
    }
}

impl ExecutionStrategy for ExplicitThreads {
    fn name(&self) -> &str {
        "explicit"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Explicit
    }

    fn threads(&self) -> usize {
        self.threads
    }

    fn execute(&self, job: &RowJob<'_>, c: &mut [f32]) -> Result<()> {
        let ranges = partition_rows(job.n, self.threads, self.remainder)?;
        let slices = split_rows_mut(c, job.n, &ranges)?;

        thread::scope(|s| {
            let mut handles = Vec::with_capacity(ranges.len());
            let mut first_err = None;

            for (range, rows) in ranges.iter().zip(slices) {
                debug!(
                    worker = range.worker,
                    start_row = range.start_row,
                    end_row = range.end_row,
                    "spawning worker"
                );
                let spawned = thread::Builder::new()
                    .name(format!("dm-worker-{}", range.worker))
                    .spawn_scoped(s, move || {
                        job.kernel
                            .compute_rows(job.a, job.b, job.n, range.start_row, rows)
                    });
                match spawned {
                    Ok(handle) => handles.push((range.worker, handle)),
                    Err(e) => {
                        first_err = Some(ParallelError::Spawn(e));
                        break;
                    }
                }
            }

            for (worker, handle) in handles {
                match handle.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        first_err.get_or_insert(e.into());
                    }
                    Err(_) => {
                        first_err.get_or_insert(ParallelError::WorkerPanicked { worker });
                    }
                }
            }

            first_err.map_or(Ok(()), Err)
        })
    }
}
