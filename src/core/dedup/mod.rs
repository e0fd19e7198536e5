//! # Dedup Module
//!
//! Tree-wide exact-duplicate discovery and quarantine.
//!
//! Files are bucketed by size first (singleton buckets can't contain
//! duplicates and are discarded before any hashing), then by content hash.
//! Within each duplicate group one canonical file stays in place - the one
//! with the fewest path segments, ties broken alphabetically by full path -
//! and the rest are moved into a `_DUPLICADOS` folder at the tree root.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::integrity;
use crate::error::DedupError;
use crate::events::{DedupEvent, Event, EventSender};

/// Fixed name of the quarantine folder at the tree root
pub const QUARANTINE_DIR: &str = "_DUPLICADOS";

/// Files at least this large announce themselves before hashing
const LARGE_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Counts from one deduplication pass
#[derive(Debug, Clone, Copy, Default)]
pub struct DedupSummary {
    /// Redundant copies detected (group size minus the canonical one)
    pub duplicates_found: usize,
    /// Redundant copies successfully moved into quarantine
    pub files_moved: usize,
}

/// Find exact duplicates under `root` and move the redundant copies into
/// the quarantine folder. Emits progress through `events`.
pub fn quarantine_duplicates(root: &Path, events: &EventSender) -> Result<DedupSummary, DedupError> {
    if !root.is_dir() {
        return Err(DedupError::TargetMissing {
            path: root.to_path_buf(),
        });
    }

    let quarantine = root.join(QUARANTINE_DIR);
    events.send(Event::Dedup(DedupEvent::Started {
        root: root.to_path_buf(),
    }));

    // Pass 1: bucket by size; the quarantine folder from an earlier run is
    // skipped so the pass stays rerun-safe
    let mut size_buckets: HashMap<u64, Vec<PathBuf>> = HashMap::new();
    let mut total_files = 0usize;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            !(entry.file_type().is_dir() && entry.file_name() == QUARANTINE_DIR)
        });

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        // A file that vanished mid-walk is silently skipped; empty files are
        // ignored (every empty file is trivially identical to every other)
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if metadata.len() == 0 {
            continue;
        }
        size_buckets
            .entry(metadata.len())
            .or_default()
            .push(entry.into_path());
        total_files += 1;
    }

    events.send(Event::Dedup(DedupEvent::Bucketed { total_files }));

    // Pass 2: hash within size buckets, quarantine the redundant copies.
    // Buckets are visited in a fixed order (ascending size, then by each
    // group's canonical file) so the quarantine's collision suffixes come
    // out the same on every run.
    let mut summary = DedupSummary::default();

    let mut sizes: Vec<u64> = size_buckets.keys().copied().collect();
    sizes.sort_unstable();

    for size in sizes {
        let files = size_buckets.remove(&size).unwrap_or_default();
        if files.len() < 2 {
            continue;
        }

        let mut hash_buckets: HashMap<blake3::Hash, Vec<PathBuf>> = HashMap::new();
        for file in files {
            if size >= LARGE_FILE_BYTES {
                events.send(Event::Dedup(DedupEvent::Hashing { path: file.clone() }));
            }
            match integrity::hash_file(&file) {
                Ok(hash) => hash_buckets.entry(hash).or_default().push(file),
                Err(e) => {
                    debug!(path = %file.display(), error = %e, "skipping unreadable file");
                }
            }
        }

        let mut groups: Vec<Vec<PathBuf>> = hash_buckets
            .into_values()
            .filter(|group| group.len() >= 2)
            .collect();
        for group in &mut groups {
            // Canonical selection: fewest path segments, then alphabetical
            group.sort_by(|a, b| {
                a.components()
                    .count()
                    .cmp(&b.components().count())
                    .then_with(|| a.cmp(b))
            });
        }
        // Lexicographic on the sorted members puts the canonical file first
        groups.sort();

        for mut group in groups {
            let canonical = group.remove(0);

            summary.duplicates_found += group.len();

            for duplicate in group {
                events.send(Event::Dedup(DedupEvent::DuplicateFound {
                    original: canonical.clone(),
                    duplicate: duplicate.clone(),
                }));

                match quarantine_file(&duplicate, &quarantine)? {
                    Some(destination) => {
                        summary.files_moved += 1;
                        events.send(Event::Dedup(DedupEvent::Moved {
                            from: duplicate.clone(),
                            to: destination,
                        }));
                        remove_parent_if_empty(&duplicate, root);
                    }
                    None => {
                        events.send(Event::Dedup(DedupEvent::Error {
                            path: duplicate,
                            message: "could not be moved to quarantine".into(),
                        }));
                    }
                }
            }
        }
    }

    events.send(Event::Dedup(DedupEvent::Completed {
        found: summary.duplicates_found,
        moved: summary.files_moved,
    }));

    Ok(summary)
}

/// Move one redundant file into the quarantine folder.
///
/// Name collisions inside the quarantine get `_dup_N` suffixes; this
/// numbering is independent of the organizer's collision suffixes. Returns
/// the final destination, or `None` when the move failed (the pass
/// continues either way).
fn quarantine_file(file: &Path, quarantine: &Path) -> Result<Option<PathBuf>, DedupError> {
    fs::create_dir_all(quarantine).map_err(|e| DedupError::Quarantine {
        path: quarantine.to_path_buf(),
        source: e,
    })?;

    let Some(name) = file.file_name() else {
        return Ok(None);
    };
    let mut destination = quarantine.join(name);

    if destination.exists() {
        let stem = file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("duplicate");
        let extension = file.extension().and_then(|e| e.to_str());
        let mut counter = 1u32;
        loop {
            let candidate = match extension {
                Some(ext) => format!("{}_dup_{}.{}", stem, counter, ext),
                None => format!("{}_dup_{}", stem, counter),
            };
            destination = quarantine.join(candidate);
            if !destination.exists() {
                break;
            }
            counter += 1;
        }
    }

    match move_file(file, &destination) {
        Ok(()) => Ok(Some(destination)),
        Err(e) => {
            warn!(path = %file.display(), error = %e, "failed to quarantine duplicate");
            Ok(None)
        }
    }
}

/// Rename, with a copy-verify-delete fallback for cross-device moves.
fn move_file(source: &Path, destination: &Path) -> std::io::Result<()> {
    if fs::rename(source, destination).is_ok() {
        return Ok(());
    }

    let source_size = fs::metadata(source)?.len();
    fs::copy(source, destination)?;
    if fs::metadata(destination)?.len() != source_size {
        let _ = fs::remove_file(destination);
        return Err(std::io::Error::other("copy size mismatch"));
    }
    fs::remove_file(source)
}

/// Best-effort removal of a directory that just lost its last file.
fn remove_parent_if_empty(moved_file: &Path, root: &Path) {
    let Some(parent) = moved_file.parent() else {
        return;
    };
    if parent == root {
        return;
    }
    let empty = fs::read_dir(parent)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false);
    if empty {
        let _ = fs::remove_dir(parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::null_sender;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(root: &Path, relative: &str, content: &[u8]) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    #[test]
    fn keeps_shallowest_copy_and_quarantines_the_rest() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "original.txt", b"shared content");
        write_file(temp.path(), "sub/copia.txt", b"shared content");
        write_file(temp.path(), "other/unico.txt", b"unique content");

        let summary = quarantine_duplicates(temp.path(), &null_sender()).unwrap();

        assert_eq!(summary.duplicates_found, 1);
        assert_eq!(summary.files_moved, 1);
        assert!(temp.path().join("original.txt").exists());
        assert!(!temp.path().join("sub/copia.txt").exists());
        assert!(temp.path().join(QUARANTINE_DIR).join("copia.txt").exists());
        assert!(temp.path().join("other/unico.txt").exists());
    }

    #[test]
    fn quarantine_name_collisions_get_dup_suffixes() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "a/dup.txt", b"same everywhere");
        write_file(temp.path(), "b/dup.txt", b"same everywhere");
        write_file(temp.path(), "c/dup.txt", b"same everywhere");

        let summary = quarantine_duplicates(temp.path(), &null_sender()).unwrap();

        assert_eq!(summary.duplicates_found, 2);
        assert_eq!(summary.files_moved, 2);

        let quarantine = temp.path().join(QUARANTINE_DIR);
        assert!(quarantine.join("dup.txt").exists());
        assert!(quarantine.join("dup_dup_1.txt").exists());

        // Exactly one copy remains outside quarantine
        let survivors = ["a", "b", "c"]
            .iter()
            .filter(|d| temp.path().join(d).join("dup.txt").exists())
            .count();
        assert_eq!(survivors, 1);
    }

    #[test]
    fn shallower_path_wins_then_alphabetical() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "deep/nested/photo.jpg", b"bytes here");
        write_file(temp.path(), "zeta.jpg", b"bytes here");
        write_file(temp.path(), "alpha.jpg", b"bytes here");

        quarantine_duplicates(temp.path(), &null_sender()).unwrap();

        // Both root-level copies beat the nested one on depth; alphabetical
        // order keeps alpha.jpg
        assert!(temp.path().join("alpha.jpg").exists());
        assert!(!temp.path().join("zeta.jpg").exists());
        assert!(!temp.path().join("deep/nested/photo.jpg").exists());
    }

    #[test]
    fn quarantine_names_are_reproducible_across_content_classes() {
        // Two distinct content classes sharing one filename: which class
        // gets the plain quarantine name and which gets the suffix must not
        // depend on bucket iteration order
        let build = |temp: &TempDir| {
            write_file(temp.path(), "a/same.txt", b"one");
            write_file(temp.path(), "b/same.txt", b"one");
            write_file(temp.path(), "c/same.txt", b"two");
            write_file(temp.path(), "d/same.txt", b"two");
        };

        for _ in 0..3 {
            let temp = TempDir::new().unwrap();
            build(&temp);
            quarantine_duplicates(temp.path(), &null_sender()).unwrap();

            let quarantine = temp.path().join(QUARANTINE_DIR);
            // a/ and c/ hold the canonicals; b/ quarantines before d/
            assert_eq!(fs::read(quarantine.join("same.txt")).unwrap(), b"one");
            assert_eq!(fs::read(quarantine.join("same_dup_1.txt")).unwrap(), b"two");
        }
    }

    #[test]
    fn smaller_size_class_quarantines_first() {
        for _ in 0..3 {
            let temp = TempDir::new().unwrap();
            write_file(temp.path(), "a/dup.txt", b"xx");
            write_file(temp.path(), "b/dup.txt", b"xx");
            write_file(temp.path(), "c/dup.txt", b"yyy");
            write_file(temp.path(), "d/dup.txt", b"yyy");

            quarantine_duplicates(temp.path(), &null_sender()).unwrap();

            let quarantine = temp.path().join(QUARANTINE_DIR);
            assert_eq!(fs::read(quarantine.join("dup.txt")).unwrap(), b"xx");
            assert_eq!(fs::read(quarantine.join("dup_dup_1.txt")).unwrap(), b"yyy");
        }
    }

    #[test]
    fn emptied_directories_are_removed() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "keep.bin", b"data data");
        write_file(temp.path(), "lonely/copy.bin", b"data data");

        quarantine_duplicates(temp.path(), &null_sender()).unwrap();

        assert!(!temp.path().join("lonely").exists());
    }

    #[test]
    fn existing_quarantine_is_not_rescanned() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "a.txt", b"payload");
        // A leftover from a previous pass with identical content must not
        // count as a duplicate of the live file
        write_file(temp.path(), &format!("{}/old.txt", QUARANTINE_DIR), b"payload");

        let summary = quarantine_duplicates(temp.path(), &null_sender()).unwrap();

        assert_eq!(summary.duplicates_found, 0);
        assert!(temp.path().join("a.txt").exists());
    }

    #[test]
    fn empty_files_are_ignored() {
        let temp = TempDir::new().unwrap();
        write_file(temp.path(), "a.txt", b"");
        write_file(temp.path(), "b.txt", b"");

        let summary = quarantine_duplicates(temp.path(), &null_sender()).unwrap();
        assert_eq!(summary.duplicates_found, 0);
    }

    #[test]
    fn missing_target_is_an_error() {
        let result = quarantine_duplicates(Path::new("/nonexistent/12345"), &null_sender());
        assert!(result.is_err());
    }
}
