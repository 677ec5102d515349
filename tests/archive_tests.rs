//! Tests for the archive module functionality.
//!
//! Archives are built on the fly with the zip writer, including ones whose
//! entry names try to escape the target directory.

use std::fs;
use zipmirror::archive::{extract_archive, validate, Validation, ZipExtractor};
use zipmirror::Error;

mod common;
use common::helpers::*;

#[test]
fn test_extracts_nested_entries() {
    let dir = create_temp_dir();
    let archive = create_temp_file(dir.path(), "pack.zip", &sample_zip());
    let target = dir.path().join("pack");

    let extracted = ZipExtractor::extract(&archive, &target).unwrap();

    assert_eq!(extracted.files, 2);
    assert_eq!(extracted.directories, 1);
    assert_eq!(extracted.bytes, 9);
    assert_eq!(fs::read(target.join("readme.txt")).unwrap(), b"hello");
    assert_eq!(fs::read(target.join("data/level1.bin")).unwrap(), [1, 2, 3, 4]);
}

#[test]
fn test_creates_parents_for_implicit_directories() {
    let dir = create_temp_dir();
    let archive = write_zip(dir.path(), "implicit.zip", &[("a/b/c.txt", b"deep")]);
    let target = dir.path().join("implicit");

    ZipExtractor::extract(&archive, &target).unwrap();

    assert_eq!(fs::read(target.join("a/b/c.txt")).unwrap(), b"deep");
}

#[test]
fn test_parent_traversal_rejects_whole_archive() {
    let dir = create_temp_dir();
    let archive = write_zip(
        dir.path(),
        "evil.zip",
        &[("good.txt", b"fine"), ("../../etc/passwd", b"root::0:0")],
    );
    let target = dir.path().join("evil");

    let err = ZipExtractor::extract(&archive, &target).unwrap_err();

    match err {
        Error::UnsafeArchive { entries, .. } => assert_eq!(entries, ["../../etc/passwd"]),
        other => panic!("expected UnsafeArchive, got {:?}", other),
    }
    assert!(!target.exists(), "nothing may be written for a rejected archive");
}

#[test]
fn test_absolute_entry_rejects_whole_archive() {
    let dir = create_temp_dir();
    let archive = write_zip(
        dir.path(),
        "abs.zip",
        &[("/tmp/owned.txt", b"x"), ("ok.txt", b"y")],
    );
    let target = dir.path().join("abs");

    let err = ZipExtractor::extract(&archive, &target).unwrap_err();

    assert!(matches!(err, Error::UnsafeArchive { .. }));
    assert!(err.to_string().contains("/tmp/owned.txt"));
    assert!(!target.exists());
}

#[test]
fn test_unmappable_entry_rejects_before_any_write() {
    let dir = create_temp_dir();
    let archive = write_zip(
        dir.path(),
        "nul.zip",
        &[("first.txt", b"written first"), ("bad\0name.txt", b"x")],
    );
    let target = dir.path().join("nul");

    let err = ZipExtractor::extract(&archive, &target).unwrap_err();

    match err {
        Error::UnsafeArchive { entries, .. } => assert_eq!(entries, ["bad\0name.txt"]),
        other => panic!("expected UnsafeArchive, got {:?}", other),
    }
    assert!(!target.exists(), "nothing may be written for a rejected archive");
}

#[test]
fn test_validate_lists_every_unsafe_entry() {
    let bytes = build_zip(&[
        ("fine.txt", b""),
        ("..\\windows.txt", b""),
        ("nested/../../up.txt", b""),
        ("C:/drive.txt", b""),
    ]);
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();

    let validation = validate(&mut archive).unwrap();

    assert_eq!(
        validation,
        Validation::Rejected(vec![
            "..\\windows.txt".to_string(),
            "nested/../../up.txt".to_string(),
            "C:/drive.txt".to_string(),
        ])
    );
}

#[test]
fn test_corrupt_archive_is_an_error() {
    let dir = create_temp_dir();
    let archive = create_temp_file(dir.path(), "broken.zip", b"this is not a zip file");

    let err = ZipExtractor::extract(&archive, &dir.path().join("broken")).unwrap_err();

    assert!(matches!(err, Error::Zip { .. }));
}

#[test]
fn test_missing_archive_is_io_error() {
    let dir = create_temp_dir();

    let err = ZipExtractor::extract(&dir.path().join("nope.zip"), &dir.path().join("nope"))
        .unwrap_err();

    assert!(matches!(err, Error::IOError { .. }));
}

#[tokio::test]
async fn test_extract_archive_runs_off_the_runtime() {
    let dir = create_temp_dir();
    let archive = create_temp_file(dir.path(), "async.zip", &sample_zip());
    let target = dir.path().join("async");

    let extracted = extract_archive(archive, target.clone()).await.unwrap();

    assert_eq!(extracted.files, 2);
    assert_file_exists(&target.join("readme.txt"));
}
