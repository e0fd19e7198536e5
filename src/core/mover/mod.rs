//! # Mover Module
//!
//! The safe move/rename/collision state machine.
//!
//! ## Guarantees
//! - A source file is deleted only after a verified, size-exact copy exists
//! - Re-running on an already-organized file is a no-op (`Skipped`)
//! - Name collisions with different content get deterministic `_dup_N` names
//! - With `simulate` set, the filesystem is never touched
//!
//! Every failure is captured as an `Error` operation result; nothing
//! propagates out of [`move_group`] and a multi-item run never aborts.

mod types;

pub use types::{DuplicatePolicy, OperationResult, OperationStatus};

use chrono::{Datelike, NaiveDateTime};
use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::dates;
use crate::core::integrity;
use crate::core::scanner::MediaGroup;
use crate::error::MoveError;

/// Month folder names, long-form with a zero-padded sort prefix
const MONTH_FOLDERS: [&str; 12] = [
    "01-january",
    "02-february",
    "03-march",
    "04-april",
    "05-may",
    "06-june",
    "07-july",
    "08-august",
    "09-september",
    "10-october",
    "11-november",
    "12-december",
];

/// Compute the dated directory a file with this capture date belongs in.
pub fn target_directory(dest_root: &Path, date: NaiveDateTime) -> PathBuf {
    let month = MONTH_FOLDERS
        .get(date.month() as usize - 1)
        .copied()
        .unwrap_or("unknown");
    dest_root.join(date.year().to_string()).join(month)
}

/// Move one media group into the date-structured library.
///
/// Produces exactly one [`OperationResult`] and performs at most the
/// filesystem mutations that result implies. Errors never escape; they are
/// folded into an `Error` result so a batch run can continue.
pub fn move_group(
    group: &MediaGroup,
    dest_root: &Path,
    policy: DuplicatePolicy,
    simulate: bool,
) -> OperationResult {
    match try_move_group(group, dest_root, policy, simulate) {
        Ok(result) => result,
        Err(e) => OperationResult::error(e.to_string()),
    }
}

fn try_move_group(
    group: &MediaGroup,
    dest_root: &Path,
    policy: DuplicatePolicy,
    simulate: bool,
) -> Result<OperationResult, MoveError> {
    let primary = &group.primary;
    let file_name = primary
        .file_name()
        .ok_or_else(|| MoveError::SourceMissing {
            path: primary.clone(),
        })?;

    // 1. Resolve the dated destination directory
    let date = dates::capture_date(primary);
    let target_dir = target_directory(dest_root, date);
    let mut target_primary = target_dir.join(file_name);

    // 2. Idempotency: the file is already where it belongs
    if refer_to_same_file(primary, &target_primary) {
        return Ok(OperationResult::skipped("Already organized (same path)"));
    }

    // 3. Collision handling
    if target_primary.exists() {
        let identical = integrity::are_identical(primary, &target_primary)
            .map_err(|e| MoveError::io(primary, e))?;

        if identical {
            match policy {
                DuplicatePolicy::Ask => {
                    return Ok(OperationResult::duplicate(
                        "Exact duplicate detected",
                        target_primary,
                    ));
                }
                DuplicatePolicy::Skip => {
                    return Ok(OperationResult::skipped("Skipped exact duplicate"));
                }
                DuplicatePolicy::DeleteOriginal => {
                    if simulate {
                        return Ok(OperationResult::success(
                            "Simulated: original would be deleted (duplicate)",
                            target_primary,
                        ));
                    }
                    delete_group(group)?;
                    return Ok(OperationResult::success(
                        "Original deleted (duplicate)",
                        target_primary,
                    ));
                }
                DuplicatePolicy::Overwrite => {
                    if simulate {
                        return Ok(OperationResult::success(
                            "Simulated: destination would be overwritten",
                            target_primary,
                        ));
                    }
                    // Remove the existing copy and its same-named sidecars,
                    // then fall through to the normal move
                    fs::remove_file(&target_primary)
                        .map_err(|e| MoveError::io(&target_primary, e))?;
                    for sidecar in &group.sidecars {
                        if let Some(name) = sidecar.file_name() {
                            let stale = target_dir.join(name);
                            if stale.exists() {
                                fs::remove_file(&stale).map_err(|e| MoveError::io(&stale, e))?;
                            }
                        }
                    }
                }
            }
        } else {
            // Name collision, not a true duplicate: find a `_dup_N` slot
            target_primary = resolve_name_collision(group, &target_dir, policy)?;
            if let Some(result) = slot_was_duplicate(&target_primary, policy) {
                return Ok(result);
            }
        }
    }

    // 4. Dry run: report the computed destination, touch nothing
    if simulate {
        return Ok(OperationResult::success("Simulated move", target_primary));
    }

    // 5. The real move: primary first, then sidecars adopting its final stem
    fs::create_dir_all(&target_dir).map_err(|e| MoveError::io(&target_dir, e))?;
    copy_verify_delete(primary, &target_primary)?;

    let new_stem = target_primary
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_owned);
    for sidecar in &group.sidecars {
        let sidecar_dest = match (&new_stem, sidecar.extension().and_then(|e| e.to_str())) {
            (Some(stem), Some(ext)) => target_dir.join(format!("{}.{}", stem, ext)),
            // Non-UTF-8 stem or extension-less sidecar: keep its own name
            _ => match sidecar.file_name() {
                Some(name) => target_dir.join(name),
                None => continue,
            },
        };
        // Sidecars are disposable metadata; an existing one is replaced
        if sidecar_dest.exists() {
            fs::remove_file(&sidecar_dest).map_err(|e| MoveError::io(&sidecar_dest, e))?;
        }
        copy_verify_delete(sidecar, &sidecar_dest)?;
    }

    debug!(from = %primary.display(), to = %target_primary.display(), "group moved");
    Ok(OperationResult::success("Moved", target_primary))
}

/// Search `name_dup_1`, `name_dup_2`, ... for the first usable slot.
///
/// A slot already holding content identical to the source is left alone and
/// returned as-is; the caller decides whether that short-circuits (Skip
/// policy) or whether the search result is only accepted when free. The
/// search is deterministic and stops at the first free name.
fn resolve_name_collision(
    group: &MediaGroup,
    target_dir: &Path,
    policy: DuplicatePolicy,
) -> Result<PathBuf, MoveError> {
    let primary = &group.primary;
    let stem = primary
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| MoveError::SourceMissing {
            path: primary.clone(),
        })?;
    let extension = primary.extension().and_then(|e| e.to_str());

    let mut counter: u32 = 1;
    loop {
        let candidate_name = match extension {
            Some(ext) => format!("{}_dup_{}.{}", stem, counter, ext),
            None => format!("{}_dup_{}", stem, counter),
        };
        let candidate = target_dir.join(&candidate_name);

        if !candidate.exists() {
            return Ok(candidate);
        }

        // An occupied slot with identical content ends the search under the
        // Skip policy; every other policy keeps looking for a free name
        if policy == DuplicatePolicy::Skip
            && integrity::are_identical(primary, &candidate)
                .map_err(|e| MoveError::io(primary, e))?
        {
            return Ok(candidate);
        }

        counter += 1;
    }
}

/// If the resolved collision slot is occupied, the Skip policy reports it.
///
/// Only the Skip policy can receive an occupied slot from
/// [`resolve_name_collision`], and only when its content matched the source.
fn slot_was_duplicate(slot: &Path, policy: DuplicatePolicy) -> Option<OperationResult> {
    if policy == DuplicatePolicy::Skip && slot.exists() {
        let name = slot
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Some(OperationResult::skipped(format!(
            "Skipped, already present as {}",
            name
        )));
    }
    None
}

/// Copy, verify size, and only then delete the source.
///
/// On a size mismatch the half-written destination is removed and the source
/// stays in place. This ordering is the load-bearing safety property: no
/// source file is ever removed without a verified byte-accurate copy.
pub(crate) fn copy_verify_delete(source: &Path, destination: &Path) -> Result<(), MoveError> {
    let source_meta = fs::metadata(source).map_err(|e| MoveError::io(source, e))?;
    let source_size = source_meta.len();

    fs::copy(source, destination).map_err(|e| MoveError::io(destination, e))?;

    let dest_size = fs::metadata(destination)
        .map_err(|e| MoveError::io(destination, e))?
        .len();
    if dest_size != source_size {
        let _ = fs::remove_file(destination);
        return Err(MoveError::IntegrityMismatch {
            path: destination.to_path_buf(),
            expected: source_size,
            actual: dest_size,
        });
    }

    // Carry the original timestamp over; fs::copy preserves permissions only
    if let Ok(mtime) = source_meta.modified() {
        let _ = File::options()
            .write(true)
            .open(destination)
            .and_then(|f| f.set_times(FileTimes::new().set_modified(mtime)));
    }

    fs::remove_file(source).map_err(|e| MoveError::io(source, e))
}

/// Delete every file of a source group (duplicate confirmed in the library).
fn delete_group(group: &MediaGroup) -> Result<(), MoveError> {
    for file in group.files() {
        if file.exists() {
            fs::remove_file(file).map_err(|e| MoveError::io(file, e))?;
        }
    }
    Ok(())
}

/// Robust path equality: resolved paths when possible, lexical absolute
/// paths as a fallback for destinations that do not exist yet.
fn refer_to_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(resolved_a), Ok(resolved_b)) => resolved_a == resolved_b,
        _ => match (std::path::absolute(a), std::path::absolute(b)) {
            (Ok(abs_a), Ok(abs_b)) => abs_a == abs_b,
            _ => false,
        },
    }
}
