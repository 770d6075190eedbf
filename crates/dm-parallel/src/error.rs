use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParallelError {
    #[error("thread count {threads} outside 1..={max}")]
    InvalidThreadCount { threads: usize, max: usize },
    #[error("{threads} threads requested for only {rows} rows")]
    TooManyThreads { threads: usize, rows: usize },
    #[error("{rows} rows do not divide evenly across {threads} threads")]
    UnevenPartition { rows: usize, threads: usize },
    #[error("work ranges cover {got} rows, output buffer holds {expected}")]
    RangeMismatch { expected: usize, got: usize },
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
    #[error("unknown remainder policy: {0}")]
    UnknownRemainderPolicy(String),
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("failed to build worker pool: {0}")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },
    #[error("a pool worker panicked")]
    PoolPanicked,
    #[error("tensor error: {0}")]
    Tensor(#[from] dm_tensor::TensorError),
}

pub type Result<T> = std::result::Result<T, ParallelError>;
