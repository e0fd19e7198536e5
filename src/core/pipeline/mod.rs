//! # Pipeline Module
//!
//! Orchestrates a full organize pass: scan, move each group, then clean up
//! emptied source directories.
//!
//! The pass is single-threaded and sequential. Cancellation is cooperative:
//! the flag is checked once per media group, never mid-copy, so a
//! copy-verify-delete triplet always runs to completion or failure. One
//! group failing never halts the pass.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

use crate::core::cleaner;
use crate::core::mover::{self, DuplicatePolicy, OperationStatus};
use crate::core::scanner::{self, ExclusionSet};
use crate::events::{Event, EventSender, MoveEvent, PassEvent, PassSummary, ScanEvent};

/// Configuration for one organize pass
#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    /// Root of the date-structured library
    pub destination: PathBuf,
    /// What to do when an exact duplicate already exists at the destination
    pub policy: DuplicatePolicy,
    /// Compute and report every move without touching the filesystem
    pub simulate: bool,
    /// Remove source directories left empty by the pass
    pub clean_source: bool,
}

/// Run an organize pass over `source`.
///
/// Emits progress through `events`, checks `cancel` between groups, and
/// returns the outcome tally. Per-item failures are folded into the tally;
/// this function itself never fails.
pub fn run(
    source: &Path,
    exclusions: &ExclusionSet,
    options: &OrganizeOptions,
    events: &EventSender,
    cancel: &AtomicBool,
) -> PassSummary {
    let mut summary = PassSummary::default();
    let mut cancelled = false;

    events.send(Event::Pass(PassEvent::Started));
    events.send(Event::Scan(ScanEvent::Started {
        root: source.to_path_buf(),
    }));

    for group in scanner::scan(source, exclusions) {
        if cancel.load(Ordering::Relaxed) {
            cancelled = true;
            break;
        }

        events.send(Event::Scan(ScanEvent::GroupFound {
            primary: group.primary.clone(),
            sidecars: group.sidecars.len(),
        }));
        events.send(Event::Move(MoveEvent::Started {
            primary: group.primary.clone(),
        }));

        let result = mover::move_group(&group, &options.destination, options.policy, options.simulate);

        match result.status {
            OperationStatus::Success => summary.moved += 1,
            OperationStatus::Skipped => summary.skipped += 1,
            OperationStatus::Duplicate => summary.duplicates += 1,
            OperationStatus::Error => summary.errors += 1,
        }

        events.send(Event::Move(MoveEvent::Completed {
            primary: group.primary,
            result,
        }));
    }

    events.send(Event::Scan(ScanEvent::Completed {
        total_groups: summary.total(),
    }));

    if cancelled {
        info!(processed = summary.total(), "organize pass cancelled");
        events.send(Event::Pass(PassEvent::Cancelled {
            summary: summary.clone(),
        }));
        return summary;
    }

    // Cleanup runs only after an uncancelled, real pass
    if options.clean_source && !options.simulate {
        cleaner::clean_empty_directories(source);
    }

    info!(
        moved = summary.moved,
        skipped = summary.skipped,
        duplicates = summary.duplicates,
        errors = summary.errors,
        "organize pass completed"
    );
    events.send(Event::Pass(PassEvent::Completed {
        summary: summary.clone(),
    }));
    summary
}
