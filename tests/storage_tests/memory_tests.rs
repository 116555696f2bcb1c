//! Tests for MemStorage
//!
//! These tests verify:
//! - Write batches and point reads through the storage contract
//! - Batch atomicity across column families
//! - Reader snapshot isolation and close semantics

use rawkv::config::Config;
use rawkv::storage::{MemStorage, Modify, Storage, StorageReader, CF_DEFAULT, CF_LOCK};
use rawkv::{Context, KvError};

fn ctx() -> Context {
    Context::default()
}

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_default_column_families() {
    let storage = MemStorage::default();
    let reader = storage.reader(&ctx()).unwrap();

    for cf in ["default", "lock", "write"] {
        assert_eq!(reader.get_cf(cf, b"k").unwrap(), None);
    }
}

#[test]
fn test_new_rejects_invalid_config() {
    let config = Config::builder().column_families(Vec::<String>::new()).build();
    assert!(matches!(MemStorage::new(&config), Err(KvError::Config(_))));

    let config = Config::builder().column_families(["a", "a"]).build();
    assert!(matches!(MemStorage::new(&config), Err(KvError::Config(_))));
}

#[test]
fn test_custom_column_families() {
    let storage = MemStorage::with_column_families(["only"]);

    storage
        .write(&ctx(), vec![Modify::put("only", "k", "v")])
        .unwrap();
    let err = storage
        .write(&ctx(), vec![Modify::put(CF_DEFAULT, "k", "v")])
        .unwrap_err();

    assert!(matches!(err, KvError::UnknownColumnFamily(_)));
}

// =============================================================================
// Read / Write Tests
// =============================================================================

#[test]
fn test_write_then_read() {
    let storage = MemStorage::default();
    storage
        .write(
            &ctx(),
            vec![
                Modify::put(CF_DEFAULT, "a", "1"),
                Modify::put(CF_LOCK, "a", "2"),
            ],
        )
        .unwrap();

    let reader = storage.reader(&ctx()).unwrap();
    assert_eq!(reader.get_cf(CF_DEFAULT, b"a").unwrap(), Some(b"1".to_vec()));
    assert_eq!(reader.get_cf(CF_LOCK, b"a").unwrap(), Some(b"2".to_vec()));
    assert_eq!(storage.entry_count(), 2);
}

#[test]
fn test_failed_batch_leaves_no_trace() {
    let storage = MemStorage::default();

    let result = storage.write(
        &ctx(),
        vec![
            Modify::put(CF_DEFAULT, "a", "1"),
            Modify::delete("bogus", "a"),
        ],
    );

    assert!(result.is_err());
    let reader = storage.reader(&ctx()).unwrap();
    assert_eq!(reader.get_cf(CF_DEFAULT, b"a").unwrap(), None);
    assert_eq!(storage.entry_count(), 0);
}

#[test]
fn test_reader_sees_snapshot() {
    let storage = MemStorage::default();
    storage
        .write(&ctx(), vec![Modify::put(CF_DEFAULT, "a", "old")])
        .unwrap();

    let reader = storage.reader(&ctx()).unwrap();
    storage
        .write(
            &ctx(),
            vec![
                Modify::put(CF_DEFAULT, "a", "new"),
                Modify::put(CF_DEFAULT, "b", "added"),
            ],
        )
        .unwrap();

    assert_eq!(reader.get_cf(CF_DEFAULT, b"a").unwrap(), Some(b"old".to_vec()));
    assert_eq!(reader.get_cf(CF_DEFAULT, b"b").unwrap(), None);

    let fresh = storage.reader(&ctx()).unwrap();
    assert_eq!(fresh.get_cf(CF_DEFAULT, b"a").unwrap(), Some(b"new".to_vec()));
}

#[test]
fn test_get_unknown_cf() {
    let storage = MemStorage::default();
    let reader = storage.reader(&ctx()).unwrap();

    assert!(matches!(
        reader.get_cf("bogus", b"k"),
        Err(KvError::UnknownColumnFamily(_))
    ));
    assert!(reader.iter_cf("bogus").is_err());
}

// =============================================================================
// Reader Lifecycle Tests
// =============================================================================

#[test]
fn test_closed_reader_rejects_reads() {
    let storage = MemStorage::default();
    let mut reader = storage.reader(&ctx()).unwrap();

    reader.close();

    assert!(matches!(
        reader.get_cf(CF_DEFAULT, b"k"),
        Err(KvError::InvalidState(_))
    ));
    assert!(matches!(reader.iter_cf(CF_DEFAULT), Err(KvError::InvalidState(_))));
}

#[test]
fn test_close_is_idempotent() {
    let storage = MemStorage::default();
    let mut reader = storage.reader(&ctx()).unwrap();

    reader.close();
    reader.close();

    assert!(reader.get_cf(CF_DEFAULT, b"k").is_err());
}
