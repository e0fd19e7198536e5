//! # Photo Organizer
//!
//! Relocates an unorganized tree of photos and videos into a date-structured
//! library, and quarantines exact duplicates found anywhere in a tree.
//!
//! ## Core Philosophy
//! - **Never lose data** - a source file is deleted only after a verified copy exists
//! - **Idempotent** - re-running on an already-organized tree changes nothing
//! - **Deterministic** - name collisions and duplicates resolve the same way every run
//!
//! ## Architecture
//! The library is split into a core engine (GUI-agnostic) and presentation layers:
//! - `core` - scanning, date resolution, the move state machine, deduplication
//! - `events` - event-driven progress reporting (GUI-ready)
//! - `error` - user-friendly error types
//! - `cli` - command-line interface

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{OrganizerError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
