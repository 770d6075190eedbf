//! Fixed-size block pool carved from one cache-line aligned arena.
//!
//! [`BlockPool`] owns a single contiguous arena of `block_size * block_count`
//! bytes, split at construction into `block_count` equal blocks. Blocks are
//! addressed by [`BlockHandle`] indices rather than raw pointers; the byte
//! range of block `i` is `[i * block_size, (i + 1) * block_size)` and never
//! moves for the lifetime of the pool.
//!
//! The pool is a one-shot dispenser: [`BlockPool::allocate`] hands out each
//! block at most once and [`BlockPool::deallocate`] is accepted but does not
//! return the block or restore capacity. Callers that need reuse must build a
//! new pool.

use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytemuck::{Pod, Zeroable};
use tracing::trace;

use crate::error::{Result, TensorError};

/// Alignment of the arena base, in bytes.
pub const CACHE_LINE_SIZE: usize = 64;

/// One cache line of arena storage. `Vec<CacheLine>` gives the arena its
/// 64-byte aligned base.
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C, align(64))]
struct CacheLine([u8; CACHE_LINE_SIZE]);

/// Index of a block inside the pool that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHandle(pub usize);

impl BlockHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

pub struct BlockPool {
    arena: Vec<CacheLine>,
    block_size: usize,
    block_count: usize,
    /// Blocks not yet handed out. Only ever decremented.
    free: AtomicUsize,
}

impl BlockPool {
    /// Create a pool of `block_count` blocks of `block_size` bytes each.
    ///
    /// The arena is zero-initialised.
    ///
    /// # Errors
    /// Returns `InvalidPoolLayout` if either argument is zero or the arena
    /// size overflows.
    pub fn new(block_size: usize, block_count: usize) -> Result<Self> {
        let layout_err = TensorError::InvalidPoolLayout {
            block_size,
            block_count,
        };
        if block_size == 0 || block_count == 0 {
            return Err(layout_err);
        }
        let total = block_size.checked_mul(block_count).ok_or(layout_err)?;
        let lines = total.div_ceil(CACHE_LINE_SIZE);
        let arena = vec![CacheLine([0; CACHE_LINE_SIZE]); lines];

        trace!(block_size, block_count, arena_bytes = total, "block pool created");
        Ok(BlockPool {
            arena,
            block_size,
            block_count,
            free: AtomicUsize::new(block_count),
        })
    }

    /// Take one block, or `None` once every block has been handed out.
    ///
    /// Never blocks and never grows the arena. Safe to call from several
    /// threads at once.
    pub fn allocate(&self) -> Option<BlockHandle> {
        let prev = self
            .free
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |free| {
                free.checked_sub(1)
            })
            .ok()?;
        let handle = BlockHandle(prev - 1);
        trace!(index = handle.0, remaining = prev - 1, "block allocated");
        Some(handle)
    }

    /// Accept a block back. This is a placeholder: the block is not reusable
    /// afterwards and [`available`](Self::available) is unchanged.
    pub fn deallocate(&self, handle: BlockHandle) {
        trace!(index = handle.0, "deallocate ignored; pool is one-shot");
    }

    /// Blocks that `allocate` can still return.
    pub fn available(&self) -> usize {
        self.free.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.block_count
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Bytes addressable through blocks (`block_size * block_count`).
    pub fn arena_bytes(&self) -> usize {
        self.block_size * self.block_count
    }

    /// Read access to a block's bytes.
    pub fn block(&self, handle: BlockHandle) -> Result<&[u8]> {
        let range = self.byte_range(handle)?;
        let bytes: &[u8] = bytemuck::cast_slice(&self.arena);
        Ok(&bytes[range])
    }

    /// Write access to a block's bytes.
    pub fn block_mut(&mut self, handle: BlockHandle) -> Result<&mut [u8]> {
        let range = self.byte_range(handle)?;
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut self.arena);
        Ok(&mut bytes[range])
    }

    /// Base address of the arena with write provenance over every block.
    ///
    /// Block `i` starts `i * block_size()` bytes past the returned pointer.
    /// The address is stable for the life of the pool; it is invalidated only
    /// by a later `block_mut`/`block_f32_mut` borrow or by dropping the pool.
    pub fn arena_ptr(&mut self) -> NonNull<u8> {
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut self.arena);
        NonNull::from(bytes).cast()
    }

    /// A block viewed as f32 scratch space.
    ///
    /// # Errors
    /// Returns `BlockCast` when the block's offset or size is not a multiple
    /// of 4 bytes.
    pub fn block_f32_mut(&mut self, handle: BlockHandle) -> Result<&mut [f32]> {
        let block = self.block_mut(handle)?;
        bytemuck::try_cast_slice_mut(block).map_err(|e| TensorError::BlockCast(e.to_string()))
    }

    fn byte_range(&self, handle: BlockHandle) -> Result<std::ops::Range<usize>> {
        if handle.0 >= self.block_count {
            return Err(TensorError::InvalidHandle {
                index: handle.0,
                capacity: self.block_count,
            });
        }
        let start = handle.0 * self.block_size;
        Ok(start..start + self.block_size)
    }
}

impl std::fmt::Debug for BlockPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockPool")
            .field("block_size", &self.block_size)
            .field("block_count", &self.block_count)
            .field("available", &self.available())
            .finish()
    }
}

impl Drop for BlockPool {
    fn drop(&mut self) {
        // The arena Vec is the only allocation; blocks are views into it.
        trace!(arena_bytes = self.arena_bytes(), "block pool released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_yields_exactly_capacity_blocks() {
        let pool = BlockPool::new(128, 4).unwrap();
        let handles: Vec<_> = (0..4).map(|_| pool.allocate()).collect();
        assert!(handles.iter().all(Option::is_some));
        assert!(pool.allocate().is_none());
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn test_handles_are_distinct() {
        let pool = BlockPool::new(64, 8).unwrap();
        let seen: HashSet<_> = std::iter::from_fn(|| pool.allocate()).collect();
        assert_eq!(seen.len(), 8);
        assert!(seen.iter().all(|h| h.index() < 8));
    }

    #[test]
    fn test_deallocate_does_not_restore_capacity() {
        let pool = BlockPool::new(64, 2).unwrap();
        let h = pool.allocate().unwrap();
        assert_eq!(pool.available(), 1);

        pool.deallocate(h);
        assert_eq!(pool.available(), 1);

        assert!(pool.allocate().is_some());
        pool.deallocate(h);
        assert_eq!(pool.available(), 0);
        assert!(pool.allocate().is_none());
    }

    #[test]
    fn test_arena_base_is_cache_aligned() {
        let pool = BlockPool::new(100, 3).unwrap();
        let base = pool.block(BlockHandle(0)).unwrap().as_ptr() as usize;
        assert_eq!(base % CACHE_LINE_SIZE, 0);
    }

    #[test]
    fn test_block_addresses_are_stable() {
        let mut pool = BlockPool::new(256, 4).unwrap();
        let before = pool.block(BlockHandle(2)).unwrap().as_ptr();
        let h = pool.allocate().unwrap();
        pool.block_mut(h).unwrap().fill(7);
        let after = pool.block(BlockHandle(2)).unwrap().as_ptr();
        assert_eq!(before, after);
    }

    #[test]
    fn test_blocks_do_not_overlap() {
        let mut pool = BlockPool::new(16, 3).unwrap();
        pool.block_mut(BlockHandle(0)).unwrap().fill(1);
        pool.block_mut(BlockHandle(1)).unwrap().fill(2);
        assert!(pool.block(BlockHandle(0)).unwrap().iter().all(|&b| b == 1));
        assert!(pool.block(BlockHandle(1)).unwrap().iter().all(|&b| b == 2));
        assert!(pool.block(BlockHandle(2)).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_arena_ptr_matches_block_addresses() {
        let mut pool = BlockPool::new(48, 3).unwrap();
        let base = pool.arena_ptr().as_ptr() as usize;
        assert_eq!(base % CACHE_LINE_SIZE, 0);
        for i in 0..3 {
            let block = pool.block(BlockHandle(i)).unwrap().as_ptr() as usize;
            assert_eq!(block, base + i * 48);
        }
        assert_eq!(pool.arena_ptr().as_ptr() as usize, base);
    }

    #[test]
    fn test_block_f32_view() {
        let mut pool = BlockPool::new(64, 2).unwrap();
        let h = pool.allocate().unwrap();
        let scratch = pool.block_f32_mut(h).unwrap();
        assert_eq!(scratch.len(), 16);
        scratch[15] = 1.5;
        assert_eq!(pool.block_f32_mut(h).unwrap()[15], 1.5);
    }

    #[test]
    fn test_block_f32_view_rejects_odd_sizes() {
        let mut pool = BlockPool::new(6, 2).unwrap();
        assert!(matches!(
            pool.block_f32_mut(BlockHandle(1)),
            Err(TensorError::BlockCast(_))
        ));
    }

    #[test]
    fn test_invalid_handle() {
        let pool = BlockPool::new(8, 2).unwrap();
        assert!(matches!(
            pool.block(BlockHandle(2)),
            Err(TensorError::InvalidHandle {
                index: 2,
                capacity: 2
            })
        ));
    }

    #[test]
    fn test_invalid_layout() {
        assert!(BlockPool::new(0, 4).is_err());
        assert!(BlockPool::new(4, 0).is_err());
        assert!(BlockPool::new(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_concurrent_allocation_hands_out_each_block_once() {
        let pool = Arc::new(BlockPool::new(64, 64).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    std::iter::from_fn(|| pool.allocate()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all = HashSet::new();
        for h in handles {
            for block in h.join().unwrap() {
                assert!(all.insert(block), "block {:?} handed out twice", block);
            }
        }
        assert_eq!(all.len(), 64);
        assert_eq!(pool.available(), 0);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn capacity_then_exhaustion(block_size in 1usize..256, count in 1usize..64) {
                let pool = BlockPool::new(block_size, count).unwrap();
                for _ in 0..count {
                    prop_assert!(pool.allocate().is_some());
                }
                prop_assert!(pool.allocate().is_none());
            }
        }
    }
}
