use photo_organizer::core::dedup::{self, QUARANTINE_DIR};
use photo_organizer::events::{DedupEvent, Event, EventChannel};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use tempfile::TempDir;

fn write_file(root: &Path, relative: &str, content: &[u8]) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(content).unwrap();
    path
}

#[test]
fn quarantines_redundant_copies_and_reports_progress() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "original.txt", b"shared content");
    write_file(temp.path(), "sub/copia.txt", b"shared content");
    write_file(temp.path(), "other/unico.txt", b"unique content");

    let (sender, receiver) = EventChannel::new();
    let collector = thread::spawn(move || receiver.iter().collect::<Vec<Event>>());

    let summary = dedup::quarantine_duplicates(temp.path(), &sender).unwrap();
    drop(sender);
    let events = collector.join().unwrap();

    assert_eq!(summary.duplicates_found, 1);
    assert_eq!(summary.files_moved, 1);

    assert!(temp.path().join("original.txt").exists());
    assert!(!temp.path().join("sub").exists()); // emptied and removed
    assert!(temp.path().join(QUARANTINE_DIR).join("copia.txt").exists());
    assert!(temp.path().join("other/unico.txt").exists());

    // The event stream told the caller what moved where
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::Dedup(DedupEvent::Moved { .. }))));
    assert!(events.iter().any(|e| matches!(
        e,
        Event::Dedup(DedupEvent::Completed { found: 1, moved: 1 })
    )));
}

#[test]
fn one_survivor_per_equivalence_class() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "a/dup.txt", b"class one");
    write_file(temp.path(), "b/dup.txt", b"class one");
    write_file(temp.path(), "c/dup.txt", b"class one");
    write_file(temp.path(), "x/other.bin", b"class two bytes");
    write_file(temp.path(), "y/other.bin", b"class two bytes");

    let summary = dedup::quarantine_duplicates(
        temp.path(),
        &photo_organizer::events::null_sender(),
    )
    .unwrap();

    assert_eq!(summary.duplicates_found, 3);
    assert_eq!(summary.files_moved, 3);

    let survivors_one = ["a", "b", "c"]
        .iter()
        .filter(|d| temp.path().join(d).join("dup.txt").exists())
        .count();
    assert_eq!(survivors_one, 1);

    let survivors_two = ["x", "y"]
        .iter()
        .filter(|d| temp.path().join(d).join("other.bin").exists())
        .count();
    assert_eq!(survivors_two, 1);

    // Independent quarantine numbering: dup.txt plus its renamed twin
    let quarantine = temp.path().join(QUARANTINE_DIR);
    assert!(quarantine.join("dup.txt").exists());
    assert!(quarantine.join("dup_dup_1.txt").exists());
    assert!(quarantine.join("other.bin").exists());
}

#[test]
fn second_pass_finds_nothing_new() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "keep.dat", b"some payload");
    write_file(temp.path(), "nested/extra.dat", b"some payload");

    let sender = photo_organizer::events::null_sender();
    let first = dedup::quarantine_duplicates(temp.path(), &sender).unwrap();
    assert_eq!(first.files_moved, 1);

    // The quarantined copy still matches keep.dat byte-for-byte, but the
    // quarantine folder is out of bounds on the rerun
    let second = dedup::quarantine_duplicates(temp.path(), &sender).unwrap();
    assert_eq!(second.duplicates_found, 0);
    assert_eq!(second.files_moved, 0);
    assert!(temp.path().join("keep.dat").exists());
}
