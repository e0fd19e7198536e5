//! # Dates Module
//!
//! Resolves a best-effort capture timestamp for a media file.
//!
//! ## Priority
//! 1. Embedded metadata - EXIF tags for images, the `mvhd` movie header for
//!    MP4/MOV containers
//! 2. Filesystem creation time
//! 3. Filesystem modification time
//! 4. The current time
//!
//! Resolution never fails: any error at one level falls through to the next,
//! and the final fallback is unconditional.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::time::SystemTime;
use tracing::debug;

use crate::core::scanner::MediaKind;

/// EXIF date tags in priority order: capture time, digitization time,
/// then the generic file timestamp.
const EXIF_DATE_TAGS: [Tag; 3] = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];

/// Resolve the capture timestamp for a file.
///
/// Always returns a usable value; see the module docs for the priority order.
pub fn capture_date(path: &Path) -> NaiveDateTime {
    let embedded = match MediaKind::of(path) {
        Some(MediaKind::Image) => exif_date(path),
        Some(MediaKind::Video) => video_date(path),
        None => None,
    };

    if let Some(date) = embedded {
        return date;
    }

    if let Some(date) = filesystem_date(path, |m| m.created()) {
        return date;
    }
    if let Some(date) = filesystem_date(path, |m| m.modified()) {
        return date;
    }

    debug!(path = %path.display(), "no timestamp available, using current time");
    Local::now().naive_local()
}

fn exif_date(path: &Path) -> Option<NaiveDateTime> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = Reader::new().read_from_container(&mut reader).ok()?;

    for tag in EXIF_DATE_TAGS {
        let Some(field) = exif.get_field(tag, In::PRIMARY) else {
            continue;
        };
        if let Value::Ascii(ref values) = field.value {
            let parsed = values
                .first()
                .and_then(|bytes| std::str::from_utf8(bytes).ok())
                .and_then(parse_exif_datetime);
            // Unparsable tag values are skipped, not fatal
            if parsed.is_some() {
                return parsed;
            }
        }
    }

    None
}

/// Parse the EXIF datetime format `YYYY:MM:DD HH:MM:SS`.
fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), "%Y:%m:%d %H:%M:%S").ok()
}

/// Extract the creation time from an MP4/MOV container.
///
/// Walks the top-level box stream for a `moov` container, then its sub-boxes
/// for `mvhd`. Only these two container extensions are attempted; other video
/// formats fall back to filesystem timestamps.
fn video_date(path: &Path) -> Option<NaiveDateTime> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    if ext != "mp4" && ext != "mov" {
        return None;
    }

    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let seconds = mvhd_creation_seconds(&mut reader)?;
    mp4_epoch_offset(seconds)
}

/// Scan the box stream for `moov`/`mvhd` and return the raw creation seconds.
fn mvhd_creation_seconds<R: Read + Seek>(reader: &mut R) -> Option<u64> {
    loop {
        let (size, kind) = read_box_header(reader)?;

        if &kind == b"moov" {
            let end_of_moov = reader.stream_position().ok()? + size.checked_sub(8)?;

            while reader.stream_position().ok()? < end_of_moov {
                let (sub_size, sub_kind) = read_box_header(reader)?;
                let body_len = sub_size.checked_sub(8)?;

                if &sub_kind == b"mvhd" {
                    // Only the version byte and the creation field matter;
                    // the declared box size is untrusted and never drives
                    // an allocation
                    let mut body = vec![0u8; body_len.min(12) as usize];
                    reader.read_exact(&mut body).ok()?;

                    // Version 0 stores a 32-bit creation time after the
                    // version/flags word; version 1 widens it to 64 bits.
                    return match body.first()? {
                        0 => body
                            .get(4..8)
                            .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as u64),
                        1 => body.get(4..12).map(|b| {
                            u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
                        }),
                        _ => None,
                    };
                }

                reader.seek(SeekFrom::Current(body_len as i64)).ok()?;
            }
            return None;
        }

        // size == 1 marks a 64-bit extended box size, which this simple
        // walker does not handle
        if size < 8 {
            return None;
        }
        reader.seek(SeekFrom::Current(size as i64 - 8)).ok()?;
    }
}

/// Read an 8-byte box header: big-endian 32-bit size plus a 4-byte type.
fn read_box_header<R: Read>(reader: &mut R) -> Option<(u64, [u8; 4])> {
    let mut header = [0u8; 8];
    reader.read_exact(&mut header).ok()?;
    let size = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as u64;
    let kind = [header[4], header[5], header[6], header[7]];
    Some((size, kind))
}

/// The MP4 timescale reference point is 1904-01-01 00:00:00 UTC.
fn mp4_epoch_offset(seconds: u64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1904, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let delta = Duration::try_seconds(i64::try_from(seconds).ok()?)?;
    epoch.checked_add_signed(delta)
}

fn filesystem_date<F>(path: &Path, pick: F) -> Option<NaiveDateTime>
where
    F: Fn(&std::fs::Metadata) -> std::io::Result<SystemTime>,
{
    let metadata = std::fs::metadata(path).ok()?;
    let time = pick(&metadata).ok()?;
    let local: DateTime<Local> = time.into();
    Some(local.naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn parses_exif_datetime_format() {
        let parsed = parse_exif_datetime("2023:07/04 12:00:00");
        assert!(parsed.is_none());

        let parsed = parse_exif_datetime("2023:07:04 12:30:45").unwrap();
        assert_eq!(parsed.year(), 2023);
        assert_eq!(parsed.month(), 7);
        assert_eq!(parsed.day(), 4);
    }

    /// Build a minimal MP4 box stream: an `ftyp` box to skip over, then
    /// `moov` containing a version-0 `mvhd` with the given creation seconds.
    fn synthetic_mp4(creation_seconds: u32) -> Vec<u8> {
        let mut bytes = Vec::new();

        // ftyp box: 8-byte header + 8 bytes payload
        bytes.extend_from_slice(&16u32.to_be_bytes());
        bytes.extend_from_slice(b"ftyp");
        bytes.extend_from_slice(b"isom\x00\x00\x02\x00");

        // mvhd body: version 0, flags, creation, modification
        let mut mvhd_body = vec![0u8; 4];
        mvhd_body.extend_from_slice(&creation_seconds.to_be_bytes());
        mvhd_body.extend_from_slice(&0u32.to_be_bytes());

        // moov wrapping the mvhd
        let mvhd_size = 8 + mvhd_body.len() as u32;
        let moov_size = 8 + mvhd_size;
        bytes.extend_from_slice(&moov_size.to_be_bytes());
        bytes.extend_from_slice(b"moov");
        bytes.extend_from_slice(&mvhd_size.to_be_bytes());
        bytes.extend_from_slice(b"mvhd");
        bytes.extend_from_slice(&mvhd_body);

        bytes
    }

    #[test]
    fn reads_mvhd_creation_time_from_mp4() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("clip.mp4");
        // ~2004 in the 1904-based timescale
        let seconds: u32 = 3_170_000_000;
        fs::write(&path, synthetic_mp4(seconds)).unwrap();

        let resolved = capture_date(&path);
        let expected = NaiveDate::from_ymd_opt(1904, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::seconds(seconds as i64);
        assert_eq!(resolved, expected);
    }

    #[test]
    fn oversized_mvhd_declaration_is_read_without_allocating_it() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hostile.mp4");
        let seconds: u32 = 3_170_000_000;

        // moov wrapping an mvhd whose declared size claims ~4 GiB while the
        // actual body is the usual 12 bytes
        let mut mvhd_body = vec![0u8; 4];
        mvhd_body.extend_from_slice(&seconds.to_be_bytes());
        mvhd_body.extend_from_slice(&0u32.to_be_bytes());

        let mut bytes = Vec::new();
        let moov_size = 8 + 8 + mvhd_body.len() as u32;
        bytes.extend_from_slice(&moov_size.to_be_bytes());
        bytes.extend_from_slice(b"moov");
        bytes.extend_from_slice(&0xFFFF_FFF0u32.to_be_bytes());
        bytes.extend_from_slice(b"mvhd");
        bytes.extend_from_slice(&mvhd_body);
        fs::write(&path, bytes).unwrap();

        let resolved = capture_date(&path);
        let expected = NaiveDate::from_ymd_opt(1904, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::seconds(seconds as i64);
        assert_eq!(resolved, expected);
    }

    #[test]
    fn garbage_mp4_falls_back_to_filesystem() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.mp4");
        fs::write(&path, b"not a real container").unwrap();

        let resolved = capture_date(&path);
        // Must match a filesystem timestamp, i.e. "now-ish"
        assert!(resolved.year() >= 2020);
    }

    #[test]
    fn image_without_exif_falls_back_to_filesystem() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plain.jpg");
        fs::write(&path, b"no exif here").unwrap();

        let resolved = capture_date(&path);
        assert!(resolved.year() >= 2020);
    }

    #[test]
    fn missing_file_still_resolves() {
        let resolved = capture_date(Path::new("/nonexistent/ghost.jpg"));
        assert!(resolved.year() >= 2020);
    }
}
