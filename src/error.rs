//! Errors that are surfaced to the callers of this crate
//!
//! Storage and fetch failures are not part of this list: they are logged and recovered from inside the [`gateway`](crate::gateway).

use thiserror::Error;

use crate::store::Partition;
use crate::task::TaskId;

/// An operation addressed a task that the store does not hold (anymore)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The position is stale or invalid, e.g. because the view is out of sync with the store
    #[error("index {index} is out of range for the {partition} tasks (there are {len})")]
    IndexOutOfRange { partition: Partition, index: usize, len: usize },

    #[error("no {partition} task has id {id}")]
    UnknownTask { partition: Partition, id: TaskId },
}

impl StoreError {
    pub(crate) fn unknown(partition: Partition, id: TaskId) -> Self {
        StoreError::UnknownTask { partition, id }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("invalid month {month} in year {year} (expected 1 to 12)")]
    InvalidMonth { year: i32, month: u32 },
}
