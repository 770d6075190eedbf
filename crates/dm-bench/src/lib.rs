//! `dm-bench` - Benchmark harness for densemm.
//!
//! Times complete parallel multiplications, generates synthetic inputs, and
//! optionally checks results against the serial scalar reference.

pub mod config;
pub mod error;
pub mod fill;
pub mod harness;
pub mod logging;

pub use config::BenchConfig;
pub use error::{BenchError, Result};
pub use fill::Fill;
pub use harness::{multiply, time, timed_multiply, BenchReport, Benchmark};
pub use logging::init_logging;
