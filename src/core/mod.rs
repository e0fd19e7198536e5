//! # Core Module
//!
//! The GUI-agnostic organizing and deduplication engine.
//!
//! ## Modules
//! - `scanner` - discovers media groups (primary file + sidecars) in a tree
//! - `dates` - resolves a capture timestamp for a media file
//! - `integrity` - content hashing and byte-identity checks
//! - `mover` - the safe move/rename/collision state machine
//! - `cleaner` - removes directories left empty after a move pass
//! - `dedup` - tree-wide exact-duplicate quarantine
//! - `pipeline` - orchestrates a full organize pass

pub mod cleaner;
pub mod dates;
pub mod dedup;
pub mod integrity;
pub mod mover;
pub mod pipeline;
pub mod scanner;

// Re-export commonly used types
pub use dedup::DedupSummary;
pub use mover::{DuplicatePolicy, OperationResult, OperationStatus};
pub use scanner::{ExclusionSet, MediaGroup};
