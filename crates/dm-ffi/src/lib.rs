//! C ABI for densemm: engine creation, timed multiplication over caller
//! buffers, and the one-shot block pool.

mod context;
mod error;
mod types;

pub use context::*;
pub use error::*;
pub use types::*;

use std::ffi::CString;
use std::os::raw::c_char;

use dm_parallel::{MultiplyConfig, RemainderPolicy};
use dm_tensor::{BlockHandle, TensorError};

/// Execute a closure that returns a `DMStatus`, catching any panics
/// and converting them into `DMStatus::ErrorInternal`.
fn catch_panic<F: FnOnce() -> DMStatus>(f: F) -> DMStatus {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(status) => status,
        Err(_) => {
            set_last_error("internal panic".to_string());
            DMStatus::ErrorInternal
        }
    }
}

/// Create a multiplication engine.
///
/// On success, writes a heap-allocated `DMEngine` pointer into `*engine_out`
/// and returns `DMStatus::Ok`. The caller must later call `dm_engine_destroy`.
/// Rows that do not divide evenly across `threads` go to the last worker.
#[no_mangle]
pub extern "C" fn dm_engine_create(
    threads: usize,
    strategy: DMStrategy,
    kernel: DMKernel,
    engine_out: *mut *mut DMEngine,
) -> DMStatus {
    catch_panic(|| {
        if engine_out.is_null() {
            set_last_error("engine_out is null".to_string());
            return DMStatus::ErrorInvalidArgument;
        }
        let config = MultiplyConfig::default()
            .with_threads(threads)
            .with_strategy(strategy.into())
            .with_kernel(kernel.into())
            .with_remainder(RemainderPolicy::LastWorker);
        match DMEngine::new(config) {
            Ok(engine) => {
                unsafe { *engine_out = Box::into_raw(Box::new(engine)) };
                DMStatus::Ok
            }
            Err(e) => report(e),
        }
    })
}

/// Destroy an engine previously created by `dm_engine_create`.
///
/// Passing a null pointer is a no-op and returns `DMStatus::Ok`.
#[no_mangle]
pub unsafe extern "C" fn dm_engine_destroy(engine: *mut DMEngine) -> DMStatus {
    if engine.is_null() {
        return DMStatus::Ok;
    }
    drop(Box::from_raw(engine));
    DMStatus::Ok
}

/// Compute `C = A @ B` for row-major `n x n` buffers.
///
/// `a` and `b` are read in place and `c` is overwritten; each must point at
/// `n * n` floats and `c` must not alias either input. When
/// `elapsed_secs_out` is non-null it receives the wall-clock time of the
/// multiplication, excluding this function's argument checks.
#[no_mangle]
pub unsafe extern "C" fn dm_multiply(
    engine: *const DMEngine,
    a: *const f32,
    b: *const f32,
    c: *mut f32,
    n: usize,
    elapsed_secs_out: *mut f64,
) -> DMStatus {
    catch_panic(|| {
        if engine.is_null() || a.is_null() || b.is_null() || c.is_null() {
            set_last_error("null argument".to_string());
            return DMStatus::ErrorInvalidArgument;
        }
        if n == 0 {
            set_last_error("matrix dimension must be non-zero".to_string());
            return DMStatus::ErrorDimension;
        }
        let Some(len) = n.checked_mul(n) else {
            set_last_error(format!("matrix dimension {} overflows", n));
            return DMStatus::ErrorDimension;
        };

        let engine = unsafe { &*engine };
        let (a, b, c) = unsafe {
            (
                std::slice::from_raw_parts(a, len),
                std::slice::from_raw_parts(b, len),
                std::slice::from_raw_parts_mut(c, len),
            )
        };

        match dm_bench::time(|| engine.multiplier.multiply_slices(a, b, n, c)) {
            Ok(((), elapsed)) => {
                if !elapsed_secs_out.is_null() {
                    unsafe { *elapsed_secs_out = elapsed.as_secs_f64() };
                }
                DMStatus::Ok
            }
            Err(e) => report(e),
        }
    })
}

/// Create a pool of `block_count` blocks of `block_size` bytes each.
///
/// The caller must later call `dm_pool_destroy`.
#[no_mangle]
pub extern "C" fn dm_pool_create(
    block_size: usize,
    block_count: usize,
    pool_out: *mut *mut DMBlockPool,
) -> DMStatus {
    catch_panic(|| {
        if pool_out.is_null() {
            set_last_error("pool_out is null".to_string());
            return DMStatus::ErrorInvalidArgument;
        }
        match DMBlockPool::new(block_size, block_count) {
            Ok(pool) => {
                unsafe { *pool_out = Box::into_raw(Box::new(pool)) };
                DMStatus::Ok
            }
            Err(e) => report_tensor(e),
        }
    })
}

/// Take one block and write its index into `*index_out`.
///
/// Returns `DMStatus::ErrorExhausted` once every block has been handed out.
#[no_mangle]
pub unsafe extern "C" fn dm_pool_allocate(pool: *const DMBlockPool, index_out: *mut usize) -> DMStatus {
    catch_panic(|| {
        if pool.is_null() || index_out.is_null() {
            set_last_error("null argument".to_string());
            return DMStatus::ErrorInvalidArgument;
        }
        let pool = unsafe { &*pool };
        match pool.pool.allocate() {
            Some(handle) => {
                unsafe { *index_out = handle.index() };
                DMStatus::Ok
            }
            None => {
                set_last_error("block pool exhausted".to_string());
                DMStatus::ErrorExhausted
            }
        }
    })
}

/// Write the address and byte length of block `index` into the out
/// parameters. The address stays valid until `dm_pool_destroy`.
///
/// Lookups only read the pool, so concurrent calls are safe. Writing through
/// the returned memory is the caller's business: two threads must not write
/// the same block at once.
#[no_mangle]
pub unsafe extern "C" fn dm_pool_block(
    pool: *const DMBlockPool,
    index: usize,
    ptr_out: *mut *mut u8,
    len_out: *mut usize,
) -> DMStatus {
    catch_panic(|| {
        if pool.is_null() || ptr_out.is_null() || len_out.is_null() {
            set_last_error("null argument".to_string());
            return DMStatus::ErrorInvalidArgument;
        }
        let pool = unsafe { &*pool };
        match pool.block_ptr(index) {
            Some(block) => {
                unsafe {
                    *ptr_out = block.as_ptr();
                    *len_out = pool.pool.block_size();
                }
                DMStatus::Ok
            }
            None => report_tensor(TensorError::InvalidHandle {
                index,
                capacity: pool.pool.capacity(),
            }),
        }
    })
}

/// Hand a block back. The pool is one-shot: the block is not reused and
/// `dm_pool_available` does not change.
#[no_mangle]
pub unsafe extern "C" fn dm_pool_deallocate(pool: *const DMBlockPool, index: usize) -> DMStatus {
    catch_panic(|| {
        if pool.is_null() {
            set_last_error("pool is null".to_string());
            return DMStatus::ErrorInvalidArgument;
        }
        let pool = unsafe { &*pool };
        if index >= pool.pool.capacity() {
            set_last_error(format!(
                "block index {} out of range for pool of {}",
                index,
                pool.pool.capacity()
            ));
            return DMStatus::ErrorInvalidArgument;
        }
        pool.pool.deallocate(BlockHandle(index));
        DMStatus::Ok
    })
}

/// Blocks that `dm_pool_allocate` can still return; 0 for a null pool.
#[no_mangle]
pub unsafe extern "C" fn dm_pool_available(pool: *const DMBlockPool) -> usize {
    if pool.is_null() {
        return 0;
    }
    (*pool).pool.available()
}

/// Destroy a pool previously created by `dm_pool_create`, releasing the
/// whole arena at once. Passing a null pointer is a no-op.
#[no_mangle]
pub unsafe extern "C" fn dm_pool_destroy(pool: *mut DMBlockPool) -> DMStatus {
    if pool.is_null() {
        return DMStatus::Ok;
    }
    drop(Box::from_raw(pool));
    DMStatus::Ok
}

/// Retrieve the last error message.
///
/// Returns a pointer to a C string describing the most recent error on this
/// thread, or null if none. The caller must free it with `dm_free_string`.
#[no_mangle]
pub extern "C" fn dm_last_error() -> *const c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null(),
    }
}

/// Free a string previously returned by `dm_last_error`.
#[no_mangle]
pub unsafe extern "C" fn dm_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
