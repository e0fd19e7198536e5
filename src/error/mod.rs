//! # Error Module
//!
//! User-friendly error types for the photo organizer.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, sizes, what went wrong
//! - **Per-item containment** - a failure on one file never aborts a run;
//!   the pipeline converts errors into `Error` operation results

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("Move error: {0}")]
    Move(#[from] MoveError),

    #[error("Deduplication error: {0}")]
    Dedup(#[from] DedupError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while moving a media group
#[derive(Error, Debug)]
pub enum MoveError {
    #[error("Source file not found: {path}")]
    SourceMissing { path: PathBuf },

    #[error(
        "Integrity check failed for {path}: source is {expected} bytes, copy is {actual} bytes"
    )]
    IntegrityMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MoveError {
    /// Wrap an I/O error with the path it occurred on.
    ///
    /// `NotFound` gets its own variant so callers can distinguish a source
    /// that vanished mid-run from a genuine copy failure.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            MoveError::SourceMissing { path }
        } else {
            MoveError::Io { path, source }
        }
    }
}

/// Errors that occur during tree-wide deduplication
#[derive(Error, Debug)]
pub enum DedupError {
    #[error("Target directory not found: {path}")]
    TargetMissing { path: PathBuf },

    #[error("Failed to create quarantine directory {path}: {source}")]
    Quarantine {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, OrganizerError>;
