use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Status written by the ingestion workflow for a fresh order.
pub const STATUS_REVIEW: &str = "Review";
/// Older spelling of the initial status, still present in stored rows.
pub const STATUS_NEW: &str = "Nieuw";
pub const STATUS_IN_PROGRESS: &str = "In Behandeling";
pub const STATUS_PROCESSED: &str = "Verwerkt";

pub const KNOWN_STATUSES: &[&str] = &[
    STATUS_REVIEW,
    STATUS_NEW,
    STATUS_IN_PROGRESS,
    STATUS_PROCESSED,
];

/// Group an order is listed under. Stored statuses outside the known set have no bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBucket {
    New,
    InProgress,
    Processed,
}

impl StatusBucket {
    pub fn of(status: &str) -> Option<Self> {
        match status {
            STATUS_REVIEW | STATUS_NEW => Some(StatusBucket::New),
            STATUS_IN_PROGRESS => Some(StatusBucket::InProgress),
            STATUS_PROCESSED => Some(StatusBucket::Processed),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            StatusBucket::New => "NIEUW",
            StatusBucket::InProgress => "IN BEHANDELING",
            StatusBucket::Processed => "VERWERKT",
        }
    }
}

pub fn is_known_status(status: &str) -> bool {
    KNOWN_STATUSES.contains(&status)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    TakeIntoProgress,
    MarkProcessed,
}

impl Transition {
    fn source(self) -> StatusBucket {
        match self {
            Transition::TakeIntoProgress => StatusBucket::New,
            Transition::MarkProcessed => StatusBucket::InProgress,
        }
    }

    /// Status value written when the transition succeeds.
    pub fn target(self) -> &'static str {
        match self {
            Transition::TakeIntoProgress => STATUS_IN_PROGRESS,
            Transition::MarkProcessed => STATUS_PROCESSED,
        }
    }

    pub fn is_allowed_from(self, status: &str) -> bool {
        StatusBucket::of(status) == Some(self.source())
    }

    pub fn apply(self, status: &str) -> Result<&'static str, TransitionError> {
        if self.is_allowed_from(status) {
            Ok(self.target())
        } else {
            Err(TransitionError {
                transition: self,
                status: status.to_string(),
            })
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::TakeIntoProgress => f.write_str("take into progress"),
            Transition::MarkProcessed => f.write_str("mark processed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {transition} an order with status {status:?}")]
pub struct TransitionError {
    pub transition: Transition,
    pub status: String,
}

/// Which action controls the order view shows for a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AvailableActions {
    pub take_into_progress: bool,
    pub mark_processed: bool,
    pub delete: bool,
}

impl AvailableActions {
    pub fn for_status(status: &str) -> Self {
        Self {
            take_into_progress: Transition::TakeIntoProgress.is_allowed_from(status),
            mark_processed: Transition::MarkProcessed.is_allowed_from(status),
            delete: true,
        }
    }
}
