use std::fmt::{self, Debug};
use std::str::FromStr;

use dm_tensor::RowKernel;

use crate::error::{ParallelError, Result};
use crate::explicit::ExplicitThreads;
use crate::partition::RemainderPolicy;
use crate::pool::PoolStrategy;

/// Read-only inputs shared by every worker in one run.
#[derive(Debug, Clone, Copy)]
pub struct RowJob<'a> {
    pub a: &'a [f32],
    pub b: &'a [f32],
    pub n: usize,
    pub kernel: &'a dyn RowKernel,
}

/// Trait for interchangeable ways of running a `RowJob` across threads.
///
/// Implementations write disjoint rows of `c` and return only once every
/// row has been written, or with an error. There is no cancellation: a
/// started run always runs to completion.
pub trait ExecutionStrategy: Send + Sync + Debug {
    /// Returns the name of this strategy (e.g., "explicit", "pool").
    fn name(&self) -> &str;

    fn kind(&self) -> StrategyKind;

    /// Worker threads used per run.
    fn threads(&self) -> usize;

    /// Compute every row of `c` (length `n * n`).
    fn execute(&self, job: &RowJob<'_>, c: &mut [f32]) -> Result<()>;
}

/// Strategy selector used by configuration surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StrategyKind {
    /// One OS thread per row range, joined at the end of the run.
    #[default]
    Explicit,
    /// Rows distributed by a rayon work-stealing pool.
    Pool,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 2] = [StrategyKind::Explicit, StrategyKind::Pool];

    /// Instantiate the strategy this selector names.
    pub fn build(
        self,
        threads: usize,
        remainder: RemainderPolicy,
    ) -> Result<Box<dyn ExecutionStrategy>> {
        Ok(match self {
            StrategyKind::Explicit => Box::new(ExplicitThreads::new(threads, remainder)?),
            StrategyKind::Pool => Box::new(PoolStrategy::new(threads, remainder)?),
        })
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Explicit => write!(f, "explicit"),
            StrategyKind::Pool => write!(f, "pool"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = ParallelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "explicit" | "threads" => Ok(StrategyKind::Explicit),
            "pool" | "rayon" => Ok(StrategyKind::Pool),
            other => Err(ParallelError::UnknownStrategy(other.to_string())),
        }
    }
}
