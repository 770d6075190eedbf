use std::num::NonZeroUsize;

use dm_tensor::KernelKind;

use crate::error::Result;
use crate::partition::{validate_threads, RemainderPolicy};
use crate::strategy::StrategyKind;

/// Settings for a `Multiplier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiplyConfig {
    /// Worker threads per run. Defaults to the detected hardware concurrency.
    pub threads: usize,
    /// How rows are distributed across threads.
    pub strategy: StrategyKind,
    /// Per-row compute kernel.
    pub kernel: KernelKind,
    /// Handling of `n % threads` leftover rows, applied by every strategy.
    pub remainder: RemainderPolicy,
}

impl Default for MultiplyConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            strategy: StrategyKind::default(),
            kernel: KernelKind::default(),
            remainder: RemainderPolicy::default(),
        }
    }
}

impl MultiplyConfig {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_kernel(mut self, kernel: KernelKind) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn with_remainder(mut self, remainder: RemainderPolicy) -> Self {
        self.remainder = remainder;
        self
    }

    /// Reject settings no run could satisfy.
    pub fn validate(&self) -> Result<()> {
        validate_threads(self.threads)
    }
}

/// Hardware concurrency, or 1 when it cannot be queried.
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
