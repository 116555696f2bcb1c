//! Tests for checkpoint files
//!
//! These tests verify:
//! - Entries and last LSN survive a write/read cycle
//! - The temporary file is renamed into place
//! - Corruption (CRC, magic, truncation) is rejected

use std::path::PathBuf;

use rawkv::checkpoint::{CheckpointReader, CheckpointWriter};
use rawkv::memtable::MemTable;
use rawkv::storage::Modify;
use rawkv::KvError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_checkpoint() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("checkpoint.ckpt");
    (temp_dir, path)
}

fn write_sample(path: &std::path::Path) {
    let mut writer = CheckpointWriter::create(path, 17).unwrap();
    writer.add("default", b"a", b"1").unwrap();
    writer.add("default", b"b", b"").unwrap();
    writer.add("lock", b"a", b"lock-value").unwrap();
    assert_eq!(writer.finish().unwrap(), 3);
}

// =============================================================================
// Write / Read Tests
// =============================================================================

#[test]
fn test_write_and_read() {
    let (_temp, path) = setup_temp_checkpoint();
    write_sample(&path);

    let checkpoint = CheckpointReader::read(&path).unwrap();

    assert_eq!(checkpoint.last_lsn, 17);
    assert_eq!(checkpoint.entries.len(), 3);
    assert_eq!(checkpoint.entries[1].cf, "default");
    assert_eq!(checkpoint.entries[1].key, b"b");
    assert!(checkpoint.entries[1].value.is_empty());
    assert_eq!(checkpoint.entries[2].cf, "lock");
}

#[test]
fn test_empty_checkpoint() {
    let (_temp, path) = setup_temp_checkpoint();
    let writer = CheckpointWriter::create(&path, 0).unwrap();
    assert_eq!(writer.finish().unwrap(), 0);

    let checkpoint = CheckpointReader::read(&path).unwrap();
    assert_eq!(checkpoint.last_lsn, 0);
    assert!(checkpoint.entries.is_empty());
}

#[test]
fn test_temp_file_renamed() {
    let (temp, path) = setup_temp_checkpoint();
    write_sample(&path);

    assert!(path.exists());
    assert!(!temp.path().join("checkpoint.tmp").exists());
}

#[test]
fn test_write_snapshot_into_batch() {
    let (_temp, path) = setup_temp_checkpoint();
    let mt = MemTable::new(["default", "write"]);
    mt.apply(&[
        Modify::put("write", "w", "x"),
        Modify::put("default", "d", "y"),
    ])
    .unwrap();

    let count = CheckpointWriter::write_snapshot(&path, 5, &mt.snapshot()).unwrap();
    assert_eq!(count, 2);

    let batch = CheckpointReader::read(&path).unwrap().into_batch();
    assert_eq!(
        batch,
        vec![Modify::put("default", "d", "y"), Modify::put("write", "w", "x")]
    );
}

#[test]
fn test_overwrite_existing_checkpoint() {
    let (_temp, path) = setup_temp_checkpoint();
    write_sample(&path);

    let mut writer = CheckpointWriter::create(&path, 99).unwrap();
    writer.add("default", b"only", b"entry").unwrap();
    writer.finish().unwrap();

    let checkpoint = CheckpointReader::read(&path).unwrap();
    assert_eq!(checkpoint.last_lsn, 99);
    assert_eq!(checkpoint.entries.len(), 1);
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_crc_corruption_detected() {
    let (_temp, path) = setup_temp_checkpoint();
    write_sample(&path);

    let mut bytes = std::fs::read(&path).unwrap();
    // First byte of the entry data (header is 22 bytes)
    bytes[22] ^= 0xFF;
    std::fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        CheckpointReader::read(&path),
        Err(KvError::Checkpoint(_))
    ));
}

#[test]
fn test_bad_magic() {
    let (_temp, path) = setup_temp_checkpoint();
    write_sample(&path);

    let mut bytes = std::fs::read(&path).unwrap();
    bytes[0] = b'X';
    std::fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        CheckpointReader::read(&path),
        Err(KvError::Checkpoint(_))
    ));
}

#[test]
fn test_truncated_file() {
    let (_temp, path) = setup_temp_checkpoint();
    std::fs::write(&path, b"RKVC").unwrap();

    assert!(CheckpointReader::read(&path).is_err());
}

#[test]
fn test_missing_file() {
    let (_temp, path) = setup_temp_checkpoint();

    assert!(matches!(CheckpointReader::read(&path), Err(KvError::Io(_))));
}
