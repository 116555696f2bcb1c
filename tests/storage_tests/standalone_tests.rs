//! Tests for StandaloneStorage
//!
//! These tests verify:
//! - Basic reads and writes through the storage contract
//! - State is restored on reopen from WAL replay
//! - State is restored on reopen from a checkpoint (+ WAL tail)
//! - Size-triggered checkpoints truncate the WAL
//! - Rejected batches never reach the WAL

use std::path::Path;

use rawkv::config::{Config, WalSyncStrategy};
use rawkv::storage::{Modify, StandaloneStorage, Storage, StorageReader, CF_DEFAULT, CF_LOCK};
use rawkv::{Context, KvError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn config(dir: &Path) -> Config {
    Config::builder()
        .data_dir(dir)
        .wal_sync_strategy(WalSyncStrategy::EveryWrite)
        .build()
}

fn put(storage: &StandaloneStorage, cf: &str, key: &str, value: &str) {
    storage
        .write(&Context::default(), vec![Modify::put(cf, key, value)])
        .unwrap();
}

fn get(storage: &StandaloneStorage, cf: &str, key: &str) -> Option<Vec<u8>> {
    let reader = storage.reader(&Context::default()).unwrap();
    reader.get_cf(cf, key.as_bytes()).unwrap()
}

// =============================================================================
// Basic Operation Tests
// =============================================================================

#[test]
fn test_open_creates_data_dir() {
    let temp = TempDir::new().unwrap();
    let data_dir = temp.path().join("nested").join("data");

    let storage = StandaloneStorage::open(config(&data_dir)).unwrap();

    assert!(data_dir.is_dir());
    assert!(data_dir.join("wal.log").exists());
    assert_eq!(storage.data_dir(), data_dir.as_path());
    assert_eq!(storage.entry_count(), 0);
    assert_eq!(storage.last_lsn(), 0);
}

#[test]
fn test_put_get_delete() {
    let temp = TempDir::new().unwrap();
    let storage = StandaloneStorage::open(config(temp.path())).unwrap();

    put(&storage, CF_DEFAULT, "key", "value");
    assert_eq!(get(&storage, CF_DEFAULT, "key"), Some(b"value".to_vec()));
    assert_eq!(get(&storage, CF_LOCK, "key"), None);

    storage
        .write(&Context::default(), vec![Modify::delete(CF_DEFAULT, "key")])
        .unwrap();
    assert_eq!(get(&storage, CF_DEFAULT, "key"), None);
    assert_eq!(storage.last_lsn(), 2);
}

#[test]
fn test_rejected_batch_not_logged() {
    let temp = TempDir::new().unwrap();
    let storage = StandaloneStorage::open(config(temp.path())).unwrap();
    put(&storage, CF_DEFAULT, "a", "1");
    let wal_size = storage.wal_size();

    let err = storage
        .write(
            &Context::default(),
            vec![
                Modify::put(CF_DEFAULT, "b", "2"),
                Modify::put("bogus", "c", "3"),
            ],
        )
        .unwrap_err();

    assert!(matches!(err, KvError::UnknownColumnFamily(_)));
    assert_eq!(storage.wal_size(), wal_size);
    assert_eq!(storage.last_lsn(), 1);
    assert_eq!(get(&storage, CF_DEFAULT, "b"), None);
}

#[test]
fn test_invalid_config_rejected() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp.path())
        .worker_threads(0)
        .build();

    assert!(matches!(
        StandaloneStorage::open(config),
        Err(KvError::Config(_))
    ));
}

// =============================================================================
// Recovery Tests
// =============================================================================

#[test]
fn test_reopen_replays_wal() {
    let temp = TempDir::new().unwrap();

    {
        let storage = StandaloneStorage::open(config(temp.path())).unwrap();
        put(&storage, CF_DEFAULT, "a", "1");
        put(&storage, CF_LOCK, "b", "2");
        storage
            .write(&Context::default(), vec![Modify::delete(CF_DEFAULT, "a")])
            .unwrap();
        // Dropped without stop(): only the WAL holds the data
    }
    assert!(!temp.path().join("checkpoint.ckpt").exists());

    let storage = StandaloneStorage::open(config(temp.path())).unwrap();
    assert_eq!(get(&storage, CF_DEFAULT, "a"), None);
    assert_eq!(get(&storage, CF_LOCK, "b"), Some(b"2".to_vec()));
    assert_eq!(storage.last_lsn(), 3);

    put(&storage, CF_DEFAULT, "c", "3");
    assert_eq!(storage.last_lsn(), 4);
}

#[test]
fn test_reopen_after_flush() {
    let temp = TempDir::new().unwrap();

    {
        let storage = StandaloneStorage::open(config(temp.path())).unwrap();
        put(&storage, CF_DEFAULT, "a", "1");
        put(&storage, CF_DEFAULT, "b", "2");
        storage.flush().unwrap();
        assert_eq!(storage.wal_size(), 0);

        // Lands in the WAL after the checkpoint
        put(&storage, CF_DEFAULT, "b", "updated");
    }

    let storage = StandaloneStorage::open(config(temp.path())).unwrap();
    assert_eq!(get(&storage, CF_DEFAULT, "a"), Some(b"1".to_vec()));
    assert_eq!(get(&storage, CF_DEFAULT, "b"), Some(b"updated".to_vec()));
    assert_eq!(storage.last_lsn(), 3);
}

#[test]
fn test_stop_checkpoints() {
    let temp = TempDir::new().unwrap();

    {
        let storage = StandaloneStorage::open(config(temp.path())).unwrap();
        storage.start().unwrap();
        put(&storage, CF_DEFAULT, "k", "v");
        storage.stop().unwrap();
        assert_eq!(storage.wal_size(), 0);
    }

    assert!(temp.path().join("checkpoint.ckpt").exists());
    let storage = StandaloneStorage::open(config(temp.path())).unwrap();
    assert_eq!(get(&storage, CF_DEFAULT, "k"), Some(b"v".to_vec()));
    assert_eq!(storage.last_lsn(), 1);
}

#[test]
fn test_wal_size_limit_triggers_checkpoint() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp.path())
        .wal_sync_strategy(WalSyncStrategy::EveryWrite)
        .wal_size_limit(256)
        .build();

    {
        let storage = StandaloneStorage::open(config.clone()).unwrap();
        for i in 0..20 {
            put(&storage, CF_DEFAULT, &format!("key{:02}", i), "some-value");
            assert!(storage.wal_size() < 256);
        }
    }

    assert!(temp.path().join("checkpoint.ckpt").exists());

    let storage = StandaloneStorage::open(config).unwrap();
    assert_eq!(storage.entry_count(), 20);
    assert_eq!(storage.last_lsn(), 20);
    assert_eq!(get(&storage, CF_DEFAULT, "key19"), Some(b"some-value".to_vec()));
}

#[test]
fn test_failed_checkpoint_does_not_fail_write() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp.path())
        .wal_sync_strategy(WalSyncStrategy::EveryWrite)
        .wal_size_limit(1)
        .build();
    let storage = StandaloneStorage::open(config.clone()).unwrap();

    // The checkpoint temp file cannot be created while a directory holds its name
    let blocker = temp.path().join("checkpoint.tmp");
    std::fs::create_dir(&blocker).unwrap();

    storage
        .write(&Context::default(), vec![Modify::put(CF_DEFAULT, "k1", "v1")])
        .unwrap();
    storage
        .write(&Context::default(), vec![Modify::put(CF_DEFAULT, "k2", "v2")])
        .unwrap();

    assert_eq!(get(&storage, CF_DEFAULT, "k1"), Some(b"v1".to_vec()));
    assert_eq!(get(&storage, CF_DEFAULT, "k2"), Some(b"v2".to_vec()));
    assert!(storage.wal_size() > 0);
    assert!(storage.flush().is_err());

    // Once the checkpoint can be written again it catches up
    std::fs::remove_dir(&blocker).unwrap();
    put(&storage, CF_DEFAULT, "k3", "v3");
    assert_eq!(storage.wal_size(), 0);
    drop(storage);

    let storage = StandaloneStorage::open(config).unwrap();
    assert_eq!(storage.entry_count(), 3);
    assert_eq!(storage.last_lsn(), 3);
}

#[test]
fn test_reopen_with_torn_wal_tail() {
    use std::io::Write;

    let temp = TempDir::new().unwrap();
    {
        let storage = StandaloneStorage::open(config(temp.path())).unwrap();
        put(&storage, CF_DEFAULT, "a", "1");
        put(&storage, CF_DEFAULT, "b", "2");
    }

    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(temp.path().join("wal.log"))
        .unwrap();
    file.write_all(&[0x01, 0x02, 0x03]).unwrap();
    drop(file);

    let storage = StandaloneStorage::open(config(temp.path())).unwrap();
    assert_eq!(storage.entry_count(), 2);
    assert_eq!(storage.last_lsn(), 2);

    put(&storage, CF_DEFAULT, "c", "3");
    drop(storage);

    let storage = StandaloneStorage::open(config(temp.path())).unwrap();
    assert_eq!(get(&storage, CF_DEFAULT, "c"), Some(b"3".to_vec()));
}

#[test]
fn test_open_path() {
    let temp = TempDir::new().unwrap();
    let storage = StandaloneStorage::open_path(temp.path()).unwrap();

    put(&storage, CF_DEFAULT, "k", "v");
    assert_eq!(storage.config().data_dir, temp.path());
    assert!(storage.memtable_size() > 0);
}
