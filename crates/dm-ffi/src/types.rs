use dm_parallel::StrategyKind;
use dm_tensor::KernelKind;

/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DMStatus {
    Ok = 0,
    ErrorInvalidArgument = 1,
    /// Matrix size, buffer length, or row partition is unusable.
    ErrorDimension = 2,
    /// The block pool has handed out every block.
    ErrorExhausted = 3,
    ErrorInternal = 4,
}

/// Work partitioning strategy selector.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub enum DMStrategy {
    /// One OS thread per contiguous row range.
    Explicit = 0,
    /// Rows scheduled on a persistent work-sharing pool.
    Pool = 1,
}

/// Row kernel selector.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub enum DMKernel {
    Scalar = 0,
    Simd = 1,
    Auto = 2,
}

impl From<DMStrategy> for StrategyKind {
    fn from(s: DMStrategy) -> Self {
        match s {
            DMStrategy::Explicit => StrategyKind::Explicit,
            DMStrategy::Pool => StrategyKind::Pool,
        }
    }
}

impl From<DMKernel> for KernelKind {
    fn from(k: DMKernel) -> Self {
        match k {
            DMKernel::Scalar => KernelKind::Scalar,
            DMKernel::Simd => KernelKind::Simd,
            DMKernel::Auto => KernelKind::Auto,
        }
    }
}
