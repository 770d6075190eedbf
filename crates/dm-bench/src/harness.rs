//! Wall-clock timing of complete multiplication runs.

use std::fmt;
use std::time::{Duration, Instant};

use dm_parallel::{reference_multiply, MultiplyConfig, Multiplier, StrategyKind};
use dm_tensor::{Matrix, TensorError};
use tracing::{debug, info};

use crate::config::BenchConfig;
use crate::error::{BenchError, Result};

/// Multiply two `n x n` matrices on `threads` workers and time the run.
///
/// Uses the scalar kernel. The output buffer is allocated before the clock
/// starts, so `elapsed` covers only the parallel multiplication.
pub fn multiply(
    a: &Matrix,
    b: &Matrix,
    n: usize,
    threads: usize,
    strategy: StrategyKind,
) -> Result<(Matrix, Duration)> {
    let expected = n.checked_mul(n).ok_or(TensorError::TooLarge(n))?;
    for m in [a, b] {
        if m.dim() != n {
            return Err(TensorError::LengthMismatch {
                n,
                expected,
                got: m.len(),
            }
            .into());
        }
    }
    let multiplier = Multiplier::new(
        MultiplyConfig::default()
            .with_threads(threads)
            .with_strategy(strategy),
    )?;
    timed_multiply(&multiplier, a, b)
}

/// Time one `multiplier` run over `a @ b`.
pub fn timed_multiply(multiplier: &Multiplier, a: &Matrix, b: &Matrix) -> Result<(Matrix, Duration)> {
    let mut c = Matrix::zeros(a.dim())?;
    let ((), elapsed) = time(|| multiplier.multiply_into(a, b, &mut c))?;
    Ok((c, elapsed))
}

/// Run `f` between two monotonic timestamps.
///
/// The end timestamp is taken only after `f` returns, which for the parallel
/// strategies means after every worker has joined.
pub fn time<T, E>(f: impl FnOnce() -> std::result::Result<T, E>) -> std::result::Result<(T, Duration), E> {
    let start = Instant::now();
    let value = f()?;
    let elapsed = start.elapsed();
    debug!(elapsed_us = elapsed.as_micros() as u64, "timed run finished");
    Ok((value, elapsed))
}

/// Outcome of one timed run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchReport {
    pub n: usize,
    pub threads: usize,
    pub strategy: String,
    pub kernel: String,
    pub elapsed: Duration,
    /// Set when the run was checked against the serial reference.
    pub max_rel_error: Option<f32>,
}

impl BenchReport {
    /// Throughput counting one multiply and one add per inner step.
    pub fn gflops(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        let n = self.n as f64;
        2.0 * n * n * n / secs / 1e9
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "[{} x {} | {} threads | {} strategy | {} kernel]",
            self.n, self.n, self.threads, self.strategy, self.kernel
        )?;
        write!(
            f,
            "Matrix multiplication took: {:.6} seconds. ({:.2} GFLOP/s)",
            self.elapsed.as_secs_f64(),
            self.gflops()
        )?;
        if let Some(err) = self.max_rel_error {
            write!(f, "\nMax relative error vs reference: {:e}", err)?;
        }
        Ok(())
    }
}

/// A configured benchmark: inputs are generated per run, the multiplier once.
#[derive(Debug)]
pub struct Benchmark {
    config: BenchConfig,
    multiplier: Multiplier,
}

impl Benchmark {
    pub fn new(config: BenchConfig) -> Result<Self> {
        config.validate()?;
        let multiplier = Multiplier::new(config.multiply.clone())?;
        Ok(Self { config, multiplier })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Fill inputs, run the warmup passes, then time one multiplication.
    pub fn run(&self) -> Result<BenchReport> {
        let n = self.config.n;
        let a = self.config.fill.matrix(n, 0)?;
        let b = self.config.fill.matrix(n, 1)?;

        for i in 0..self.config.warmup {
            debug!(pass = i, "warmup");
            self.multiplier.multiply(&a, &b)?;
        }

        let (c, elapsed) = timed_multiply(&self.multiplier, &a, &b)?;

        let max_rel_error = if self.config.verify {
            let expected = reference_multiply(&a, &b)?;
            let err = c.max_relative_diff(&expected)?;
            if err > self.config.tolerance {
                return Err(BenchError::VerificationFailed {
                    max_rel_error: err,
                    tolerance: self.config.tolerance,
                });
            }
            Some(err)
        } else {
            None
        };

        let report = BenchReport {
            n,
            threads: self.config.multiply.threads,
            strategy: self.multiplier.strategy_name().to_string(),
            kernel: self.multiplier.kernel_name().to_string(),
            elapsed,
            max_rel_error,
        };
        info!(
            n,
            threads = report.threads,
            strategy = %report.strategy,
            kernel = %report.kernel,
            elapsed_s = elapsed.as_secs_f64(),
            "benchmark finished"
        );
        Ok(report)
    }
}
