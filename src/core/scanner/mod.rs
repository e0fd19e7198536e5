//! # Scanner Module
//!
//! Discovers media files in a directory tree and groups each primary file
//! with its sidecar files (edit metadata such as `.aae`/`.xmp`/`.thm` sharing
//! the same base name).
//!
//! ## Supported Formats
//! - Images: JPEG, PNG, GIF, BMP, TIFF, WebP, HEIC/HEIF
//! - RAW: DNG, CR2, CR3, NEF, ARW, RAF, ORF, PEF
//! - Video: MP4, MOV, AVI, MKV, WMV
//!
//! ## Example
//! ```rust,ignore
//! use photo_organizer::core::scanner::{self, ExclusionSet};
//!
//! let exclusions = ExclusionSet::resolve(["/photos/do-not-touch"]);
//! for group in scanner::scan("/photos".as_ref(), &exclusions) {
//!     println!("{} (+{} sidecars)", group.primary.display(), group.sidecars.len());
//! }
//! ```

mod filter;
mod walker;

pub use filter::{is_primary_media, is_sidecar, ExclusionSet, MediaKind};
pub use walker::{scan, MediaGroups};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A primary media file plus the sidecar files that must travel with it.
///
/// Sidecars share the primary's base name (case-insensitively) within the
/// same directory. Groups are built fresh on every scan; they carry no
/// identity across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaGroup {
    /// The photo or video file itself
    pub primary: PathBuf,
    /// Auxiliary files that follow the primary under a matching name
    pub sidecars: Vec<PathBuf>,
}

impl MediaGroup {
    /// All files in the group, primary first.
    pub fn files(&self) -> impl Iterator<Item = &PathBuf> {
        std::iter::once(&self.primary).chain(self.sidecars.iter())
    }
}
