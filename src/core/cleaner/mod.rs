//! # Cleaner Module
//!
//! Removes directories left empty after a move pass.
//!
//! Children are processed before parents, so a parent that becomes empty
//! once its subdirectories are gone is removed in the same pass. The scan
//! root itself is never removed. All failures (permissions, hidden system
//! files appearing mid-removal) are swallowed per-directory.

use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Remove every strictly-empty directory under `root`, bottom-up.
pub fn clean_empty_directories(root: &Path) {
    // contents_first yields children before their parents; min_depth keeps
    // the root itself out of reach
    for entry in WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();
        if is_empty(dir) && fs::remove_dir(dir).is_ok() {
            debug!(path = %dir.display(), "removed empty directory");
        }
    }
}

fn is_empty(dir: &Path) -> bool {
    match fs::read_dir(dir) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => false,
    }
}
