//! Lazy media-group iteration over a directory tree.

use super::filter::{self, ExclusionSet};
use super::MediaGroup;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Walk a tree and yield one [`MediaGroup`] per primary media file found.
///
/// The returned iterator is lazy, finite and not restartable. Excluded
/// directories are pruned before descent (their subtrees are never visited),
/// symbolic links are not followed, and files that vanish between listing
/// and inspection are silently skipped. Groups come out in traversal order;
/// callers must not rely on any particular ordering.
pub fn scan(root: &Path, exclusions: &ExclusionSet) -> MediaGroups {
    let exclusions = exclusions.clone();
    let predicate: Box<dyn FnMut(&DirEntry) -> bool> = Box::new(move |entry| {
        // Prune excluded subtrees at descent time; files pass through here
        // and are classified later
        !entry.file_type().is_dir() || !exclusions.excludes(entry.path())
    });

    MediaGroups {
        walker: WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(predicate),
        listing_cache: None,
    }
}

/// Iterator over the media groups in a tree. Created by [`scan`].
pub struct MediaGroups {
    walker: walkdir::FilterEntry<walkdir::IntoIter, Box<dyn FnMut(&DirEntry) -> bool>>,
    /// Listing of the directory we are currently walking through, keyed by
    /// lowercase file name. Traversal visits a directory's files
    /// consecutively enough that one slot is sufficient.
    listing_cache: Option<(PathBuf, HashMap<String, OsString>)>,
}

impl MediaGroups {
    fn sidecars_for(&mut self, primary: &Path) -> Vec<PathBuf> {
        let Some(parent) = primary.parent() else {
            return Vec::new();
        };
        let Some(stem) = primary.file_stem().and_then(|s| s.to_str()) else {
            return Vec::new();
        };

        let listing = self.listing(parent);
        let mut sidecars = Vec::new();
        for ext in filter::sidecar_extensions() {
            let candidate = format!("{}.{}", stem.to_lowercase(), ext);
            if let Some(real_name) = listing.get(&candidate) {
                sidecars.push(parent.join(real_name));
            }
        }
        sidecars
    }

    /// Case-insensitive listing of `dir`, cached for consecutive lookups.
    fn listing(&mut self, dir: &Path) -> &HashMap<String, OsString> {
        let stale = match &self.listing_cache {
            Some((cached_dir, _)) => cached_dir != dir,
            None => true,
        };

        if stale {
            let mut names = HashMap::new();
            if let Ok(entries) = fs::read_dir(dir) {
                for entry in entries.flatten() {
                    let file_name = entry.file_name();
                    if let Some(name) = file_name.to_str() {
                        names.insert(name.to_lowercase(), file_name);
                    }
                }
            }
            self.listing_cache = Some((dir.to_path_buf(), names));
        }

        // Freshly populated above when stale
        &self.listing_cache.as_ref().expect("listing cache populated").1
    }
}

impl Iterator for MediaGroups {
    type Item = MediaGroup;

    fn next(&mut self) -> Option<MediaGroup> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                // A file that disappeared mid-scan, or an unreadable
                // directory: skip and keep walking
                Err(_) => continue,
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !filter::is_primary_media(path) {
                continue;
            }

            let sidecars = self.sidecars_for(path);
            return Some(MediaGroup {
                primary: path.to_path_buf(),
                sidecars,
            });
        }
    }
}
