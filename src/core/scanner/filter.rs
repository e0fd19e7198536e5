//! Extension classification and directory exclusion for the scanner.

use std::path::{Path, PathBuf};
use tracing::warn;

/// Image extensions, standard and RAW
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", // standard
    "heic", "heif", // high efficiency
    "dng", "cr2", "cr3", "nef", "arw", "raf", "orf", "pef", // RAW
];

/// Video container extensions
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "wmv"];

/// Sidecar files that must move together with their primary file
const SIDECAR_EXTENSIONS: &[&str] = &["aae", "xmp", "thm"];

/// Broad classification of a primary media file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a path by extension, case-insensitively.
    pub fn of(path: &Path) -> Option<MediaKind> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }
}

/// Check if a file is a recognized primary media file.
pub fn is_primary_media(path: &Path) -> bool {
    MediaKind::of(path).is_some()
}

/// Check if a file is a recognized sidecar.
pub fn is_sidecar(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SIDECAR_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Sidecar extensions recognized by the scanner.
pub(crate) fn sidecar_extensions() -> &'static [&'static str] {
    SIDECAR_EXTENSIONS
}

/// A set of directories to skip entirely during scanning.
///
/// Paths are canonicalized on construction; excluding a directory implicitly
/// excludes everything nested under it. Matching is component-wise on
/// resolved paths, never plain string-prefix comparison, so `/a/bc` is not
/// hidden by excluding `/a/b`.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    roots: Vec<PathBuf>,
}

impl ExclusionSet {
    /// An exclusion set that excludes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set from caller-supplied paths, resolving each one.
    ///
    /// Paths that cannot be resolved (typically because they no longer
    /// exist) are dropped with a warning; they cannot match anything during
    /// the walk anyway.
    pub fn resolve<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut roots = Vec::new();
        for path in paths {
            match path.as_ref().canonicalize() {
                Ok(resolved) => roots.push(resolved),
                Err(e) => {
                    warn!(path = %path.as_ref().display(), error = %e, "dropping unresolvable exclusion");
                }
            }
        }
        Self { roots }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Test whether a directory is excluded, directly or via an ancestor.
    pub fn excludes(&self, dir: &Path) -> bool {
        if self.roots.is_empty() {
            return false;
        }
        // Resolve symlinks so an aliased path cannot dodge its exclusion
        let resolved = match dir.canonicalize() {
            Ok(p) => p,
            Err(_) => return false,
        };
        self.roots.iter().any(|root| resolved.starts_with(root))
    }
}
