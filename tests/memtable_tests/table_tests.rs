//! Tests for MemTable
//!
//! These tests verify:
//! - Put/delete per column family
//! - Batch atomicity and ordering
//! - Snapshot isolation
//! - Size tracking
//! - Concurrent readers and writers

use std::sync::Arc;
use std::thread;

use rawkv::memtable::MemTable;
use rawkv::storage::Modify;
use rawkv::KvError;

fn table() -> MemTable {
    MemTable::new(["default", "lock", "write"])
}

// =============================================================================
// Basic Operation Tests
// =============================================================================

#[test]
fn test_new_memtable_is_empty() {
    let mt = table();

    assert!(mt.is_empty());
    assert_eq!(mt.size(), 0);
    assert_eq!(mt.entry_count(), 0);
    assert_eq!(mt.column_families(), vec!["default", "lock", "write"]);
}

#[test]
fn test_put_and_get() {
    let mt = table();
    mt.apply(&[Modify::put("default", "key1", "value1")]).unwrap();

    assert_eq!(mt.get("default", b"key1").unwrap(), Some(b"value1".to_vec()));
    assert_eq!(mt.get("default", b"missing").unwrap(), None);
}

#[test]
fn test_column_families_are_separate() {
    let mt = table();
    mt.apply(&[
        Modify::put("default", "k", "in-default"),
        Modify::put("lock", "k", "in-lock"),
    ])
    .unwrap();

    assert_eq!(mt.get("default", b"k").unwrap(), Some(b"in-default".to_vec()));
    assert_eq!(mt.get("lock", b"k").unwrap(), Some(b"in-lock".to_vec()));
    assert_eq!(mt.get("write", b"k").unwrap(), None);
}

#[test]
fn test_overwrite() {
    let mt = table();
    mt.apply(&[Modify::put("default", "key", "v1")]).unwrap();
    mt.apply(&[Modify::put("default", "key", "v2")]).unwrap();

    assert_eq!(mt.get("default", b"key").unwrap(), Some(b"v2".to_vec()));
    assert_eq!(mt.entry_count(), 1);
}

#[test]
fn test_delete() {
    let mt = table();
    mt.apply(&[Modify::put("default", "key", "value")]).unwrap();
    mt.apply(&[Modify::delete("default", "key")]).unwrap();

    assert_eq!(mt.get("default", b"key").unwrap(), None);
    assert!(mt.is_empty());
}

#[test]
fn test_delete_missing_key_is_noop() {
    let mt = table();
    mt.apply(&[Modify::delete("default", "never-written")]).unwrap();

    assert!(mt.is_empty());
}

#[test]
fn test_empty_value_is_present() {
    let mt = table();
    mt.apply(&[Modify::put("default", "key", "")]).unwrap();

    assert_eq!(mt.get("default", b"key").unwrap(), Some(Vec::new()));
}

#[test]
fn test_get_unknown_cf() {
    let mt = table();

    assert!(matches!(
        mt.get("nope", b"key"),
        Err(KvError::UnknownColumnFamily(_))
    ));
}

// =============================================================================
// Batch Tests
// =============================================================================

#[test]
fn test_batch_applied_in_order() {
    let mt = table();
    mt.apply(&[
        Modify::put("default", "key", "first"),
        Modify::delete("default", "key"),
        Modify::put("default", "key", "last"),
    ])
    .unwrap();

    assert_eq!(mt.get("default", b"key").unwrap(), Some(b"last".to_vec()));
}

#[test]
fn test_batch_with_unknown_cf_applies_nothing() {
    let mt = table();
    mt.apply(&[Modify::put("default", "existing", "old")]).unwrap();

    let result = mt.apply(&[
        Modify::put("default", "existing", "new"),
        Modify::put("default", "fresh", "value"),
        Modify::put("missing-cf", "key", "value"),
    ]);

    assert!(matches!(result, Err(KvError::UnknownColumnFamily(cf)) if cf == "missing-cf"));
    assert_eq!(mt.get("default", b"existing").unwrap(), Some(b"old".to_vec()));
    assert_eq!(mt.get("default", b"fresh").unwrap(), None);
}

#[test]
fn test_validate() {
    let mt = table();

    assert!(mt.validate(&[Modify::delete("write", "k")]).is_ok());
    assert!(mt.validate(&[Modify::delete("other", "k")]).is_err());
    assert!(mt.has_cf("lock"));
    assert!(!mt.has_cf("other"));
}

// =============================================================================
// Size Tracking Tests
// =============================================================================

#[test]
fn test_size_tracking() {
    let mt = table();

    mt.apply(&[Modify::put("default", "key", "value")]).unwrap();
    assert_eq!(mt.size(), 8);

    // Overwrite with a longer value
    mt.apply(&[Modify::put("default", "key", "longer-value")]).unwrap();
    assert_eq!(mt.size(), 15);

    // Overwrite with a shorter value
    let size = mt.apply(&[Modify::put("default", "key", "v")]).unwrap();
    assert_eq!(size, 4);

    mt.apply(&[Modify::delete("default", "key")]).unwrap();
    assert_eq!(mt.size(), 0);
}

// =============================================================================
// Snapshot Tests
// =============================================================================

#[test]
fn test_snapshot_isolation() {
    let mt = table();
    mt.apply(&[Modify::put("default", "a", "1")]).unwrap();

    let snapshot = mt.snapshot();

    mt.apply(&[
        Modify::put("default", "a", "2"),
        Modify::put("default", "b", "3"),
    ])
    .unwrap();

    assert_eq!(snapshot.get("default", b"a").unwrap(), Some(&b"1"[..]));
    assert_eq!(snapshot.get("default", b"b").unwrap(), None);
    assert_eq!(snapshot.entry_count(), 1);
    assert_eq!(mt.entry_count(), 2);
}

#[test]
fn test_snapshot_iter_ordered() {
    let mt = table();
    mt.apply(&[
        Modify::put("write", "z", "3"),
        Modify::put("default", "b", "2"),
        Modify::put("default", "a", "1"),
    ])
    .unwrap();

    let snapshot = mt.snapshot();
    let items: Vec<(&str, &[u8], &[u8])> = snapshot.iter().collect();

    assert_eq!(
        items,
        vec![
            ("default", &b"a"[..], &b"1"[..]),
            ("default", &b"b"[..], &b"2"[..]),
            ("write", &b"z"[..], &b"3"[..]),
        ]
    );
}

#[test]
fn test_snapshot_cf_name() {
    let snapshot = table().snapshot();

    assert_eq!(snapshot.cf_name("lock"), Some("lock"));
    assert_eq!(snapshot.cf_name("nope"), None);
    assert!(snapshot.cf("nope").is_err());
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_writers_and_readers() {
    let mt = Arc::new(table());
    let mut handles = Vec::new();

    for t in 0..4 {
        let mt = Arc::clone(&mt);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                let key = format!("t{}-k{:03}", t, i);
                mt.apply(&[
                    Modify::put("default", key.clone(), "v"),
                    Modify::put("lock", key, "v"),
                ])
                .unwrap();
            }
        }));
    }

    for _ in 0..2 {
        let mt = Arc::clone(&mt);
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                // Both halves of a batch are always visible together
                let snapshot = mt.snapshot();
                let default = snapshot.cf("default").unwrap().len();
                let lock = snapshot.cf("lock").unwrap().len();
                assert_eq!(default, lock);
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(mt.entry_count(), 800);
}
