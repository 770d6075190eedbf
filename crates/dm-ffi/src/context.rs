use std::ptr::NonNull;

use dm_parallel::{Multiplier, MultiplyConfig, Result};
use dm_tensor::{BlockPool, Result as TensorResult};

/// Opaque engine handle that owns a configured multiplier.
///
/// The pool strategy's worker threads live as long as the engine.
pub struct DMEngine {
    pub multiplier: Multiplier,
}

impl DMEngine {
    pub fn new(config: MultiplyConfig) -> Result<Self> {
        Ok(Self {
            multiplier: Multiplier::new(config)?,
        })
    }
}

/// Opaque handle around a one-shot [`BlockPool`].
///
/// `base` is taken once at creation and every block address handed to C is
/// derived from it, so later lookups never re-borrow the arena and earlier
/// addresses stay valid.
pub struct DMBlockPool {
    pub pool: BlockPool,
    base: NonNull<u8>,
}

impl DMBlockPool {
    pub fn new(block_size: usize, block_count: usize) -> TensorResult<Self> {
        let mut pool = BlockPool::new(block_size, block_count)?;
        let base = pool.arena_ptr();
        Ok(Self { pool, base })
    }

    /// Address of block `index`, or `None` when it is out of range.
    pub fn block_ptr(&self, index: usize) -> Option<NonNull<u8>> {
        if index >= self.pool.capacity() {
            return None;
        }
        let offset = index * self.pool.block_size();
        // SAFETY: index < capacity, so offset lies inside the arena `base`
        // was derived from.
        NonNull::new(unsafe { self.base.as_ptr().add(offset) })
    }
}
