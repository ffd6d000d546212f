//! Integration Tests for the Cache Item Pool
//!
//! Drives the full pool surface against a fresh in-memory store per test,
//! asserting on the store's raw contents and call order.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::{json, Value};

use cache_bridge::{CacheError, CacheItem, CacheItemPool, Repository, StoreError, StoreResult};

// == In-Memory Store ==

/// In-memory repository with an ordered call log; entries keep their raw
/// payload and the TTL minutes they were stored with.
#[derive(Default)]
struct InMemoryStore {
    entries: RefCell<HashMap<String, (Vec<u8>, Option<u64>)>>,
    calls: RefCell<Vec<String>>,
    fail_writes: RefCell<bool>,
}

impl InMemoryStore {
    fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.borrow().get(key).map(|(bytes, _)| bytes.clone())
    }

    fn minutes(&self, key: &str) -> Option<u64> {
        self.entries.borrow().get(key).and_then(|(_, ttl)| *ttl)
    }
}

impl Repository for InMemoryStore {
    fn has(&self, key: &str) -> StoreResult<bool> {
        self.calls.borrow_mut().push(format!("has {}", key));
        Ok(self.entries.borrow().contains_key(key))
    }

    fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        self.calls.borrow_mut().push(format!("get {}", key));
        self.entries
            .borrow()
            .get(key)
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| StoreError::new(format!("missing: {}", key)))
    }

    fn put(&self, key: &str, value: &[u8], minutes: u64) -> StoreResult<bool> {
        self.calls
            .borrow_mut()
            .push(format!("put {} {}", key, minutes));
        if *self.fail_writes.borrow() {
            return Err(StoreError::new("write refused"));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), (value.to_vec(), Some(minutes)));
        Ok(true)
    }

    fn forever(&self, key: &str, value: &[u8]) -> StoreResult<bool> {
        self.calls.borrow_mut().push(format!("forever {}", key));
        if *self.fail_writes.borrow() {
            return Err(StoreError::new("write refused"));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), (value.to_vec(), None));
        Ok(true)
    }

    fn forget(&self, key: &str) -> StoreResult<bool> {
        self.calls.borrow_mut().push(format!("forget {}", key));
        Ok(self.entries.borrow_mut().remove(key).is_some())
    }

    fn flush(&self) -> StoreResult<bool> {
        self.calls.borrow_mut().push("flush".to_string());
        self.entries.borrow_mut().clear();
        Ok(true)
    }
}

// == Miss Scenarios ==

#[test]
fn test_empty_store_yields_miss() {
    let store = InMemoryStore::new();
    let pool = CacheItemPool::new(Rc::clone(&store));

    let item = pool.get_item("foo").unwrap();

    assert_eq!(item.key(), "foo");
    assert!(!item.is_hit());
    assert_eq!(item.get(), &Value::Null);
}

// == Save Scenarios ==

#[test]
fn test_save_writes_serialized_form_to_store() {
    let store = InMemoryStore::new();
    let pool = CacheItemPool::new(Rc::clone(&store));

    let mut item = pool.get_item("foo").unwrap();
    item.set(json!("bar"));
    assert!(pool.save(&item));

    // The store holds the serialized form, opaque to it.
    assert_eq!(store.raw("foo").unwrap(), b"\"bar\"");
    assert_eq!(store.minutes("foo"), None);
}

#[test]
fn test_save_and_reload_nested_value() {
    let store = InMemoryStore::new();
    let pool = CacheItemPool::new(Rc::clone(&store));

    let value = json!({
        "name": "widget",
        "tags": ["a", "b"],
        "meta": {"empty": {}, "count": 3, "none": null},
    });

    let mut item = pool.get_item("widget").unwrap();
    item.set(value.clone());
    assert!(pool.save(&item));

    // A second pool over the same store sees the same value.
    let other = CacheItemPool::new(Rc::clone(&store));
    let fetched = other.get_item("widget").unwrap();
    assert!(fetched.is_hit());
    assert_eq!(fetched.get(), &value);
}

#[test]
fn test_save_with_expiration_passes_minutes_to_store() {
    let store = InMemoryStore::new();
    let pool = CacheItemPool::new(Rc::clone(&store));

    let mut item = CacheItem::new("session");
    item.set(json!("token")).expires_after(Some(150.into()));

    assert!(pool.save(&item));
    assert_eq!(store.minutes("session"), Some(2));
}

#[test]
fn test_save_failure_is_a_normal_outcome() {
    let store = InMemoryStore::new();
    *store.fail_writes.borrow_mut() = true;
    let pool = CacheItemPool::new(Rc::clone(&store));

    let mut item = CacheItem::new("foo");
    item.set(json!("bar"));

    assert!(!pool.save(&item));
    assert!(store.raw("foo").is_none());
}

// == Key Validation Scenarios ==

#[test]
fn test_invalid_key_fails_before_store_is_queried() {
    let store = InMemoryStore::new();
    let pool = CacheItemPool::new(Rc::clone(&store));

    let result = pool.has_item("foo@bar");

    assert!(matches!(result, Err(CacheError::InvalidKey(_))));
    assert!(store.calls().is_empty());
}

// == Deferred Write Scenarios ==

#[test]
fn test_dropped_pool_flushes_deferred_items() {
    let store = InMemoryStore::new();

    {
        let mut pool = CacheItemPool::new(Rc::clone(&store));
        let mut item = pool.get_item("bar").unwrap();
        item.set(json!("baz"));
        assert!(pool.save_deferred(item));

        // Nothing is written while the pool is alive.
        assert!(store.raw("bar").is_none());
    }

    assert_eq!(store.raw("bar").unwrap(), b"\"baz\"");
}

#[test]
fn test_commit_writes_in_insertion_order() {
    let store = InMemoryStore::new();
    let mut pool = CacheItemPool::new(Rc::clone(&store));

    for key in ["alpha", "beta", "gamma"] {
        let mut item = CacheItem::new(key);
        item.set(json!(key));
        pool.save_deferred(item);
    }

    assert!(pool.commit());
    assert_eq!(
        store.calls(),
        vec!["forever alpha", "forever beta", "forever gamma"]
    );
}

// == Batch Scenarios ==

#[test]
fn test_get_items_mixed_hits_and_misses() {
    let store = InMemoryStore::new();
    let pool = CacheItemPool::new(Rc::clone(&store));

    let mut item = CacheItem::new("present");
    item.set(json!(42));
    assert!(pool.save(&item));

    let items: Vec<(&str, CacheItem)> = pool
        .get_items(["present", "absent"])
        .collect::<cache_bridge::Result<_>>()
        .unwrap();

    assert_eq!(items[0].0, "present");
    assert!(items[0].1.is_hit());
    assert_eq!(items[0].1.get(), &json!(42));

    assert_eq!(items[1].0, "absent");
    assert!(!items[1].1.is_hit());
}

#[test]
fn test_empty_batches() {
    let store = InMemoryStore::new();
    let pool = CacheItemPool::new(Rc::clone(&store));

    let keys: [&str; 0] = [];
    assert_eq!(pool.get_items(keys).count(), 0);
    assert!(pool.delete_items(keys).unwrap());
}

// == Full Lifecycle ==

#[test]
fn test_store_reuse_across_pool_lifetimes() {
    let store = InMemoryStore::new();

    {
        let mut pool = CacheItemPool::new(Rc::clone(&store));

        let mut immediate = pool.get_item("immediate").unwrap();
        immediate.set(json!({"kind": "now"}));
        assert!(pool.save(&immediate));

        let mut deferred = pool.get_item("deferred").unwrap();
        deferred.set(json!({"kind": "later"}));
        pool.save_deferred(deferred);
    }

    let pool = CacheItemPool::new(Rc::clone(&store));
    assert!(pool.has_item("immediate").unwrap());
    assert!(pool.has_item("deferred").unwrap());

    assert!(pool.delete_item("immediate").unwrap());
    assert!(!pool.has_item("immediate").unwrap());

    assert!(pool.clear());
    assert!(!pool.has_item("deferred").unwrap());
}
