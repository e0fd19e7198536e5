//! Event type definitions for progress reporting.

use crate::core::mover::OperationResult;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the organizer core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scanning phase events
    Scan(ScanEvent),
    /// Per-group move events
    Move(MoveEvent),
    /// Deduplication events
    Dedup(DedupEvent),
    /// Whole-pass events
    Pass(PassEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { root: PathBuf },
    /// A media group was found
    GroupFound { primary: PathBuf, sidecars: usize },
    /// Scanning completed
    Completed { total_groups: usize },
}

/// Events emitted while moving media groups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MoveEvent {
    /// A group is about to be processed
    Started { primary: PathBuf },
    /// A group was processed; the outcome says what happened
    Completed {
        primary: PathBuf,
        result: OperationResult,
    },
}

/// Events during tree-wide deduplication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DedupEvent {
    /// The duplicate scan has started
    Started { root: PathBuf },
    /// Size bucketing finished; hashing begins
    Bucketed { total_files: usize },
    /// A large file is being hashed (emitted for UI responsiveness)
    Hashing { path: PathBuf },
    /// A redundant copy of `original` was found
    DuplicateFound { original: PathBuf, duplicate: PathBuf },
    /// A redundant file was moved into quarantine
    Moved { from: PathBuf, to: PathBuf },
    /// A duplicate could not be moved; the pass continues
    Error { path: PathBuf, message: String },
    /// Deduplication completed
    Completed { found: usize, moved: usize },
}

/// Whole-pass events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PassEvent {
    /// The organize pass has started
    Started,
    /// The pass completed (possibly with per-item errors)
    Completed { summary: PassSummary },
    /// The pass was cancelled between items
    Cancelled { summary: PassSummary },
}

/// Tally of outcomes over one organize pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassSummary {
    /// Groups moved (or simulated) successfully
    pub moved: usize,
    /// Groups skipped (already organized, or skipped by policy)
    pub skipped: usize,
    /// Exact duplicates awaiting a caller decision
    pub duplicates: usize,
    /// Groups that failed with an error
    pub errors: usize,
}

impl PassSummary {
    /// Total number of groups processed
    pub fn total(&self) -> usize {
        self.moved + self.skipped + self.duplicates + self.errors
    }
}
