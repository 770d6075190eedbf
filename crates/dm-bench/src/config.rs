use dm_parallel::{MultiplyConfig, StrategyKind};

use crate::error::{BenchError, Result};
use crate::fill::Fill;

/// Default matrix side length for a benchmark run.
pub const DEFAULT_SIZE: usize = 1024;

/// Default relative tolerance when verifying against the scalar reference.
pub const DEFAULT_TOLERANCE: f32 = 1e-4;

/// Settings for one `Benchmark`.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Matrix side length.
    pub n: usize,
    pub multiply: MultiplyConfig,
    pub fill: Fill,
    /// Untimed runs before the measured one.
    pub warmup: usize,
    /// Compare the timed result against the serial reference.
    pub verify: bool,
    pub tolerance: f32,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            n: DEFAULT_SIZE,
            multiply: MultiplyConfig::default(),
            fill: Fill::default(),
            warmup: 0,
            verify: false,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl BenchConfig {
    pub fn with_size(mut self, n: usize) -> Self {
        self.n = n;
        self
    }

    pub fn with_multiply(mut self, multiply: MultiplyConfig) -> Self {
        self.multiply = multiply;
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.multiply.strategy = strategy;
        self
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.n == 0 {
            return Err(BenchError::InvalidConfig("size must be > 0".to_string()));
        }
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(BenchError::InvalidConfig(format!(
                "tolerance must be > 0, got {}",
                self.tolerance
            )));
        }
        self.multiply.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_reference_run() {
        let c = BenchConfig::default();
        assert_eq!(c.n, 1024);
        assert_eq!(c.fill, Fill::Indexed);
        assert!(!c.verify);
        c.validate().unwrap();
    }

    #[test]
    fn test_invalid() {
        assert!(BenchConfig::default().with_size(0).validate().is_err());
        let mut c = BenchConfig::default();
        c.tolerance = f32::NAN;
        assert!(c.validate().is_err());
        let c = BenchConfig::default().with_multiply(MultiplyConfig::default().with_threads(0));
        assert!(matches!(c.validate(), Err(BenchError::Parallel(_))));
    }
}
