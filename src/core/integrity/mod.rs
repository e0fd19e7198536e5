//! # Integrity Module
//!
//! Streaming content hashing and byte-identity checks.
//!
//! Files are read in fixed-size chunks so memory stays bounded regardless of
//! file size (videos can be many gigabytes). Identity checks compare sizes
//! first and only hash when the sizes match.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Chunk size for streaming reads
const CHUNK_SIZE: usize = 8192;

/// Compute the blake3 digest of a file's contents.
pub fn hash_file(path: &Path) -> io::Result<blake3::Hash> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize())
}

/// Check whether two files have byte-identical contents.
///
/// Sizes are compared first; on a mismatch this returns `false` without
/// reading either file's contents.
pub fn are_identical(a: &Path, b: &Path) -> io::Result<bool> {
    let size_a = std::fs::metadata(a)?.len();
    let size_b = std::fs::metadata(b)?.len();

    if size_a != size_b {
        return Ok(false);
    }

    Ok(hash_file(a)? == hash_file(b)?)
}
