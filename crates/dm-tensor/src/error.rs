use thiserror::Error;

#[derive(Error, Debug)]
pub enum TensorError {
    #[error("matrix dimension must be > 0")]
    ZeroDimension,
    #[error("length mismatch: expected {expected} elements for an {n}x{n} matrix, got {got}")]
    LengthMismatch { n: usize, expected: usize, got: usize },
    #[error("matrix dimension {0} overflows the address space")]
    TooLarge(usize),
    #[error("dimension mismatch: [{a}x{a}] @ [{b}x{b}]")]
    DimensionMismatch { a: usize, b: usize },
    #[error("output buffer holds {got} elements, expected whole rows of width {n}")]
    PartialRows { n: usize, got: usize },
    #[error("row range {first_row}..{end_row} exceeds matrix dimension {n}")]
    RowsOutOfBounds {
        first_row: usize,
        end_row: usize,
        n: usize,
    },
    #[error("invalid block pool layout: block_size={block_size}, block_count={block_count}")]
    InvalidPoolLayout {
        block_size: usize,
        block_count: usize,
    },
    #[error("block handle {index} out of range for pool of {capacity} blocks")]
    InvalidHandle { index: usize, capacity: usize },
    #[error("block is not castable to f32: {0}")]
    BlockCast(String),
    #[error("unknown kernel: {0}")]
    UnknownKernel(String),
}

pub type Result<T> = std::result::Result<T, TensorError>;
