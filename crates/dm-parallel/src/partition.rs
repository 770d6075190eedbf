//! Row partitioning for the explicit-threads strategy.
//!
//! An `n x n` output is split into contiguous, non-overlapping row ranges,
//! one per worker. Because ranges are disjoint, every worker owns its slice
//! of the output outright and no locking is needed on `C`.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use dm_tensor::TensorError;

use crate::error::{ParallelError, Result};

/// Upper bound on worker threads for one run.
pub const MAX_THREADS: usize = 1024;

/// Rows `[start_row, end_row)` assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkRange {
    pub worker: usize,
    pub start_row: usize,
    pub end_row: usize,
}

impl WorkRange {
    pub fn len(&self) -> usize {
        self.end_row - self.start_row
    }

    pub fn is_empty(&self) -> bool {
        self.start_row == self.end_row
    }

    pub fn rows(&self) -> Range<usize> {
        self.start_row..self.end_row
    }
}

/// What to do with `n % threads` leftover rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RemainderPolicy {
    /// The last worker takes the leftover rows.
    #[default]
    LastWorker,
    /// Fail with `UnevenPartition` unless `n % threads == 0`.
    Reject,
}

impl fmt::Display for RemainderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemainderPolicy::LastWorker => write!(f, "last-worker"),
            RemainderPolicy::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for RemainderPolicy {
    type Err = ParallelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "last-worker" | "last" => Ok(RemainderPolicy::LastWorker),
            "reject" => Ok(RemainderPolicy::Reject),
            other => Err(ParallelError::UnknownRemainderPolicy(other.to_string())),
        }
    }
}

/// Check a thread count against `1..=MAX_THREADS`.
pub fn validate_threads(threads: usize) -> Result<()> {
    if threads == 0 || threads > MAX_THREADS {
        return Err(ParallelError::InvalidThreadCount {
            threads,
            max: MAX_THREADS,
        });
    }
    Ok(())
}

/// Split `n` rows into `threads` contiguous ranges of `n / threads` rows.
///
/// Ranges are returned in row order and together cover `0..n` exactly once.
pub fn partition_rows(n: usize, threads: usize, policy: RemainderPolicy) -> Result<Vec<WorkRange>> {
    if n == 0 {
        return Err(TensorError::ZeroDimension.into());
    }
    validate_threads(threads)?;
    if threads > n {
        return Err(ParallelError::TooManyThreads { threads, rows: n });
    }

    let chunk = n / threads;
    let remainder = n % threads;
    if remainder != 0 && policy == RemainderPolicy::Reject {
        return Err(ParallelError::UnevenPartition { rows: n, threads });
    }

    let ranges = (0..threads)
        .map(|worker| {
            let start_row = worker * chunk;
            let end_row = if worker + 1 == threads {
                n
            } else {
                start_row + chunk
            };
            WorkRange {
                worker,
                start_row,
                end_row,
            }
        })
        .collect();
    Ok(ranges)
}

/// Hand out one disjoint mutable slice of `c` per range.
///
/// `ranges` must be contiguous from row 0 and cover every row of `c`.
pub fn split_rows_mut<'c>(
    c: &'c mut [f32],
    n: usize,
    ranges: &[WorkRange],
) -> Result<Vec<&'c mut [f32]>> {
    let covered = ranges.last().map_or(0, |r| r.end_row);
    let contiguous = ranges
        .iter()
        .scan(0, |next, r| {
            let ok = r.start_row == *next && r.end_row >= r.start_row;
            *next = r.end_row;
            Some(ok)
        })
        .all(|ok| ok);
    if !contiguous || covered * n != c.len() {
        return Err(ParallelError::RangeMismatch {
            expected: if n == 0 { 0 } else { c.len() / n },
            got: covered,
        });
    }

    let mut slices = Vec::with_capacity(ranges.len());
    let mut rest = c;
    for r in ranges {
        let (head, tail) = rest.split_at_mut(r.len() * n);
        slices.push(head);
        rest = tail;
    }
    Ok(slices)
}
