/*!
 * Tests for archive entry naming and the ZIP writer
 */

use ass2srt::archive::{BulkArchiver, EntryNamer, ZipWriter, archive_entry_name};
use ass2srt::archive::zip::MAX_ENTRIES;
use ass2srt::errors::ArchiveError;

use crate::common::read_zip_entries;

#[test]
fn test_zip_writer_shouldStoreEntriesWithCorrectCrc() {
    let mut zip = ZipWriter::new(Vec::new());
    zip.add_entry("first.srt", b"1\n00:00:01,000 --> 00:00:02,000\nHi\n\n").unwrap();
    zip.add_entry("second.srt", b"").unwrap();
    assert_eq!(zip.len(), 2);
    let bytes = zip.finish().unwrap();

    let entries = read_zip_entries(&bytes);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "first.srt");
    assert_eq!(entries[0].data, b"1\n00:00:01,000 --> 00:00:02,000\nHi\n\n");
    assert_eq!(entries[0].crc32, crc32fast::hash(&entries[0].data));
    assert_eq!(entries[1].size, 0);
    assert_eq!(entries[1].crc32, 0);
    for entry in &entries {
        assert_eq!(entry.method, 0, "entries are stored");
        assert_ne!(entry.flags & (1 << 11), 0, "names are flagged as UTF-8");
    }
}

#[test]
fn test_zip_writer_withUnicodeName_shouldKeepUtf8Bytes() {
    let mut zip = ZipWriter::new(Vec::new());
    zip.add_entry("第一集.srt", "字幕".as_bytes()).unwrap();
    let bytes = zip.finish().unwrap();

    let entries = read_zip_entries(&bytes);
    assert_eq!(entries[0].name, "第一集.srt");
    assert_eq!(String::from_utf8(entries[0].data.clone()).unwrap(), "字幕");
}

#[test]
fn test_zip_writer_withSameEntries_shouldBeByteIdentical() {
    let build = || {
        let mut zip = ZipWriter::new(Vec::new());
        zip.add_entry("a.srt", b"alpha").unwrap();
        zip.add_entry("b.srt", b"beta").unwrap();
        zip.finish().unwrap()
    };
    assert_eq!(build(), build());
}

#[test]
fn test_zip_writer_withNoEntries_shouldWriteEmptyArchive() {
    let zip = ZipWriter::new(Vec::new());
    assert!(zip.is_empty());
    let bytes = zip.finish().unwrap();

    assert_eq!(bytes.len(), 22);
    assert!(read_zip_entries(&bytes).is_empty());
}

#[test]
fn test_zip_writer_withDuplicateName_shouldRejectSecond() {
    let mut zip = ZipWriter::new(Vec::new());
    zip.add_entry("a.srt", b"x").unwrap();
    assert_eq!(
        zip.add_entry("a.srt", b"y").unwrap_err(),
        ArchiveError::NameCollision("a.srt".to_string())
    );
    assert_eq!(zip.len(), 1);
}

#[test]
fn test_max_entries_shouldMatchClassicZipLimit() {
    assert_eq!(MAX_ENTRIES, 65_535);
}

#[test]
fn test_archive_entry_name_shouldDropDirectoriesAndExtension() {
    assert_eq!(archive_entry_name("/videos/show/ep01.ass"), "ep01.srt");
    assert_eq!(archive_entry_name("C:\\subs\\ep02.SSA"), "ep02.srt");
    assert_eq!(archive_entry_name("readme"), "readme.srt");
    assert_eq!(archive_entry_name("archive.ass.bak"), "archive.ass.bak.srt");
}

#[test]
fn test_entry_namer_withCaseVariants_shouldTreatThemAsCollisions() {
    let mut namer = EntryNamer::new();
    assert_eq!(namer.assign("Show.ass"), "Show.srt");
    assert_eq!(namer.assign("show.ass"), "show_1.srt");
    assert_eq!(namer.assign("dir/SHOW.ssa"), "SHOW_2.srt");
    assert_eq!(namer.assign("other.ass"), "other.srt");
}

#[test]
fn test_bulk_archiver_shouldNameEntriesInOrder() {
    let mut archiver = BulkArchiver::new();
    assert_eq!(archiver.add("a/ep.ass", b"one").unwrap(), "ep.srt");
    assert_eq!(archiver.add("b/ep.ass", b"two").unwrap(), "ep_1.srt");
    assert_eq!(archiver.len(), 2);

    let bytes = archiver.finish().unwrap();
    let entries = read_zip_entries(&bytes);
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["ep.srt", "ep_1.srt"]);
    assert_eq!(entries[1].data, b"two");
}
