use thiserror::Error;

use super::models::{CommentId, IntervalId};

/// Errors surfaced by the outbound stores.
///
/// Everything here is retryable from the caller's point of view; nothing is
/// fatal to the session.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0} seconds")]
    Timeout(u64),
    #[error("{0}")]
    Invalid(String),
}

impl StoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }
}

/// Errors that can occur during interval and time-entry operations.
#[derive(Debug, Error)]
pub enum TimeTrackingError {
    #[error("select at least two intervals to merge")]
    MergeSelectionTooSmall,
    #[error("no intervals selected")]
    EmptySelection,
    #[error("no intervals to synthesize an entry from")]
    NoIntervals,
    #[error("interval not loaded: {0}")]
    UnknownInterval(IntervalId),
    #[error("no open time period")]
    NoOpenPeriod,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors that can occur during comment editing.
#[derive(Debug, Error)]
pub enum CommentError {
    #[error("comment content is empty")]
    EmptyNote,
    #[error("comment not found: {0}")]
    CommentNotFound(CommentId),
    #[error(transparent)]
    Store(#[from] StoreError),
}
