//! End-to-end checks for the transparent opener against real files on disk.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wkr::io::{byte_lines, StreamOrigin};
use wkr::{
    count_lines, lines, load_counter, open, write_atomic, AccessMode, Encoding, FileReference,
    WkrError,
};

const SEMCOR: &[u8] = b"The jury said it did find that many of Atlanta's registration\n\
and election laws are outmoded or inadequate and often ambiguous.\n";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn build_zip(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("corpus.zip");
    let file = File::create(&path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();
    zip.start_file("semcor000.txt", options).unwrap();
    zip.write_all(SEMCOR).unwrap();
    zip.start_file("counts.tsv", options).unwrap();
    zip.write_all(b"3\ta\n4\tb\n2\ta\n").unwrap();
    zip.finish().unwrap();
    path
}

fn zip_ref(archive: &Path, member: &str) -> String {
    format!("{}:{}", archive.display(), member)
}

fn read_all(reference: &str) -> Vec<u8> {
    let mut data = Vec::new();
    open(reference, AccessMode::READ)
        .unwrap()
        .read_to_end(&mut data)
        .unwrap();
    data
}

#[test]
fn test_zip_member_reads_member_bytes() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let archive = build_zip(&dir);

    let reference = zip_ref(&archive, "semcor000.txt");
    let stream = open(reference.as_str(), AccessMode::READ).unwrap();
    assert_eq!(stream.origin(), StreamOrigin::ZipMember);
    drop(stream);

    assert_eq!(read_all(&reference), SEMCOR);
    assert_eq!(read_all(&reference), read_all(&reference));
}

#[test]
fn test_zip_member_binary_and_text_modes_agree() {
    let dir = TempDir::new().unwrap();
    let archive = build_zip(&dir);
    let reference = zip_ref(&archive, "semcor000.txt");

    let mut text = String::new();
    open(reference.as_str(), "rt".parse().unwrap())
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    let mut binary = Vec::new();
    open(reference.as_str(), "rb".parse().unwrap())
        .unwrap()
        .read_to_end(&mut binary)
        .unwrap();
    assert_eq!(text.as_bytes(), binary.as_slice());
}

#[test]
fn test_zip_member_rejects_write_modes() {
    let dir = TempDir::new().unwrap();
    let archive = build_zip(&dir);
    let reference = zip_ref(&archive, "semcor000.txt");

    for mode in ["w", "wb", "wt", "a", "ab", "at"] {
        let result = open(reference.as_str(), mode.parse().unwrap());
        match result {
            Err(WkrError::InvalidOperation { .. }) => {}
            other => panic!("Expected InvalidOperation for mode {}, got {:?}", mode, other),
        }
    }
    // archive untouched
    assert_eq!(read_all(&reference), SEMCOR);
}

#[test]
fn test_zip_missing_member_is_archive_error() {
    let dir = TempDir::new().unwrap();
    let archive = build_zip(&dir);
    let reference = zip_ref(&archive, "semcor999.txt");

    match open(reference.as_str(), AccessMode::READ) {
        Err(WkrError::ArchiveError { .. }) => {}
        other => panic!("Expected ArchiveError, got {:?}", other),
    }
}

#[test]
fn test_zip_reference_with_extra_colon_is_rejected() {
    match open("corpus.zip:a:b", AccessMode::READ) {
        Err(WkrError::InvalidReference { reference, .. }) => {
            assert_eq!(reference, "corpus.zip:a:b");
        }
        other => panic!("Expected InvalidReference, got {:?}", other),
    }
}

#[test]
fn test_helpers_accept_zip_members() {
    let dir = TempDir::new().unwrap();
    let archive = build_zip(&dir);

    let reference = zip_ref(&archive, "semcor000.txt");
    assert_eq!(count_lines(reference.as_str()).unwrap(), 2);

    let decoded: Vec<String> = lines(reference.as_str(), Encoding::Utf8)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(decoded.concat().as_bytes(), SEMCOR);

    let tally = load_counter(zip_ref(&archive, "counts.tsv"), Encoding::Utf8).unwrap();
    assert_eq!(tally.get(&"a".into()), 5);
    assert_eq!(tally.get(&"b".into()), 4);
}

#[test]
fn test_unsupported_reference_kinds() {
    match FileReference::from_any(42_i32) {
        Err(WkrError::UnsupportedReferenceKind { type_name }) => assert_eq!(type_name, "i32"),
        other => panic!("Expected UnsupportedReferenceKind, got {:?}", other),
    }
    assert!(matches!(
        FileReference::from_any(vec![1u8, 2, 3]),
        Err(WkrError::UnsupportedReferenceKind { .. })
    ));
    assert!(matches!(
        FileReference::from_any("notes.txt.gz"),
        Ok(FileReference::Path(_))
    ));
    assert!(matches!(
        FileReference::from_any(String::from("-")),
        Ok(FileReference::Stdio)
    ));
}

#[test]
fn test_atomic_write_round_trips_through_every_codec() {
    init_logging();
    let dir = TempDir::new().unwrap();
    for name in ["plain.txt", "packed.txt.gz", "packed.txt.xz"] {
        let path = dir.path().join(name);
        write_atomic([&SEMCOR[..20], &SEMCOR[20..]], &path, false).unwrap();

        let mut data = Vec::new();
        open(&path, AccessMode::READ)
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();
        assert_eq!(data, SEMCOR, "{}", name);

        let raw = byte_lines(&path).unwrap().collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(raw.len(), 2, "{}", name);
    }
}

#[test]
fn test_missing_file_is_file_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.txt.gz");
    match open(&path, AccessMode::READ) {
        Err(e @ WkrError::FileError { .. }) => {
            assert_eq!(e.io_kind(), Some(std::io::ErrorKind::NotFound));
        }
        other => panic!("Expected FileError, got {:?}", other),
    }
}
