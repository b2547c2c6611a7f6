//! Integration tests for rate limit persistence across store reopens.

use camino::Utf8PathBuf;
use realmstash::gate::{RATE_LIMIT_DURATION_MS, RATE_LIMIT_KEY, RateLimitGate};
use realmstash::store::{JsonFileStore, KvStore};
use std::sync::Arc;
use tempfile::TempDir;

fn store_path(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::try_from(dir.path().join("store.json")).unwrap()
}

#[test]
fn test_window_survives_restart() {
    let dir = TempDir::new().unwrap();
    let t = 1_700_000_000_000;

    {
        let store = Arc::new(JsonFileStore::open(store_path(&dir)).unwrap());
        let mut gate = RateLimitGate::new(store);
        gate.set_limit(t).unwrap();
    }

    // Simulated restart two minutes later: the window is still active.
    let store = Arc::new(JsonFileStore::open(store_path(&dir)).unwrap());
    let mut gate = RateLimitGate::new(store);
    gate.init(t + 2 * 60 * 1000).unwrap();
    assert!(gate.is_limited(t + 2 * 60 * 1000));
    assert_eq!(
        gate.remaining_ms(t + 2 * 60 * 1000),
        RATE_LIMIT_DURATION_MS - 2 * 60 * 1000
    );
}

#[test]
fn test_expired_window_cleared_on_restart() {
    let dir = TempDir::new().unwrap();
    let t = 1_700_000_000_000;

    {
        let store = Arc::new(JsonFileStore::open(store_path(&dir)).unwrap());
        let mut gate = RateLimitGate::new(store);
        gate.set_limit(t).unwrap();
    }

    // Restart after the window ended: memory and file both come up clean.
    let store = Arc::new(JsonFileStore::open(store_path(&dir)).unwrap());
    let mut gate = RateLimitGate::new(store.clone());
    gate.init(t + RATE_LIMIT_DURATION_MS + 1).unwrap();
    assert!(!gate.is_limited(t + RATE_LIMIT_DURATION_MS + 1));
    assert_eq!(store.get(RATE_LIMIT_KEY).unwrap(), None);
}

#[test]
fn test_garbage_persisted_value_is_ignored() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonFileStore::open(store_path(&dir)).unwrap());
    store.set(RATE_LIMIT_KEY, "not-a-number").unwrap();

    let mut gate = RateLimitGate::new(store);
    gate.init(1_000).unwrap();
    assert!(!gate.is_limited(1_000));
}
