//! Types for the mover state machine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to do when the destination already holds an exact duplicate
/// of the file being moved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Report the duplicate and let the caller decide (no mutation)
    #[default]
    Ask,
    /// Leave the source untouched
    Skip,
    /// Replace the existing destination copy
    Overwrite,
    /// Delete the source; the library already has this content
    DeleteOriginal,
}

/// Outcome category of one move attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    /// The group was moved (or the move was simulated)
    Success,
    /// Nothing to do: already organized, or skipped by policy
    Skipped,
    /// An exact duplicate exists at the destination; awaiting caller decision
    Duplicate,
    /// The move failed; the source is untouched or fully intact
    Error,
}

/// The outcome of one move attempt.
///
/// Returned by value and never retained by the mover; the caller owns the
/// record and decides how to render or tally it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult {
    pub status: OperationStatus,
    /// Human-readable description of what happened
    pub message: String,
    /// The resolved destination, when one was computed
    pub destination: Option<PathBuf>,
}

impl OperationResult {
    pub fn new(
        status: OperationStatus,
        message: impl Into<String>,
        destination: Option<PathBuf>,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            destination,
        }
    }

    pub fn success(message: impl Into<String>, destination: PathBuf) -> Self {
        Self::new(OperationStatus::Success, message, Some(destination))
    }

    pub fn skipped(message: impl Into<String>) -> Self {
        Self::new(OperationStatus::Skipped, message, None)
    }

    pub fn duplicate(message: impl Into<String>, destination: PathBuf) -> Self {
        Self::new(OperationStatus::Duplicate, message, Some(destination))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(OperationStatus::Error, message, None)
    }
}
