use std::cell::RefCell;
use std::ffi::CString;

use dm_parallel::ParallelError;
use dm_tensor::TensorError;

use crate::types::DMStatus;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Store an error message for later retrieval via `dm_last_error`.
pub fn set_last_error(msg: String) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Take the last error message, leaving `None` in its place.
pub fn take_last_error() -> Option<CString> {
    LAST_ERROR.with(|e| e.borrow_mut().take())
}

/// Record `err` and map it to the status the C caller sees.
pub(crate) fn report(err: ParallelError) -> DMStatus {
    let status = match &err {
        ParallelError::InvalidThreadCount { .. }
        | ParallelError::UnknownStrategy(_)
        | ParallelError::UnknownRemainderPolicy(_) => DMStatus::ErrorInvalidArgument,
        ParallelError::TooManyThreads { .. }
        | ParallelError::UnevenPartition { .. }
        | ParallelError::RangeMismatch { .. } => DMStatus::ErrorDimension,
        ParallelError::Tensor(inner) => tensor_status(inner),
        _ => DMStatus::ErrorInternal,
    };
    set_last_error(err.to_string());
    status
}

pub(crate) fn report_tensor(err: TensorError) -> DMStatus {
    let status = tensor_status(&err);
    set_last_error(err.to_string());
    status
}

fn tensor_status(err: &TensorError) -> DMStatus {
    match err {
        TensorError::ZeroDimension
        | TensorError::TooLarge(_)
        | TensorError::LengthMismatch { .. }
        | TensorError::DimensionMismatch { .. }
        | TensorError::PartialRows { .. }
        | TensorError::RowsOutOfBounds { .. } => DMStatus::ErrorDimension,
        TensorError::InvalidPoolLayout { .. }
        | TensorError::InvalidHandle { .. }
        | TensorError::UnknownKernel(_) => DMStatus::ErrorInvalidArgument,
        TensorError::BlockCast(_) => DMStatus::ErrorInternal,
    }
}
