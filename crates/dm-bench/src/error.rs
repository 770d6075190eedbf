use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unknown fill pattern: {0}")]
    UnknownFill(String),
    #[error("result differs from reference by {max_rel_error:e} (tolerance {tolerance:e})")]
    VerificationFailed { max_rel_error: f32, tolerance: f32 },
    #[error("parallel error: {0}")]
    Parallel(#[from] dm_parallel::ParallelError),
    #[error("tensor error: {0}")]
    Tensor(#[from] dm_tensor::TensorError),
}

pub type Result<T> = std::result::Result<T, BenchError>;
