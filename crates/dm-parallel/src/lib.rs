//! `dm-parallel` - Row-partitioned parallel matrix multiplication.
//!
//! Two interchangeable strategies run the same row kernels:
//! - `ExplicitThreads`: one scoped OS thread per contiguous row range
//! - `PoolStrategy`: a fixed-size rayon pool draining the row loop
//!
//! Both write disjoint rows of the output, so neither needs locks on it.

pub mod config;
pub mod engine;
pub mod error;
pub mod explicit;
pub mod partition;
pub mod pool;
pub mod strategy;

pub use config::{default_threads, MultiplyConfig};
pub use engine::{reference_multiply, Multiplier};
pub use error::{ParallelError, Result};
pub use explicit::ExplicitThreads;
pub use partition::{partition_rows, split_rows_mut, RemainderPolicy, WorkRange, MAX_THREADS};
pub use pool::PoolStrategy;
pub use strategy::{ExecutionStrategy, RowJob, StrategyKind};
