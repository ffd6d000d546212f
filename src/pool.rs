//! Cache Item Pool Module
//!
//! Translates the cache item contract onto a minute-granularity repository:
//! key validation, payload (de)serialization, immediate and deferred writes.

use std::mem;

use tracing::{debug, warn};

use crate::error::{CacheError, Result};
use crate::item::CacheItem;
use crate::repository::Repository;

// == Key Validation ==
/// Characters a key may never contain.
const RESERVED_KEY_CHARACTERS: [char; 8] = ['{', '}', '(', ')', '/', '\\', '@', ':'];

/// Rejects keys containing reserved characters, before any store call.
fn validate_key(key: &str) -> Result<()> {
    if key.chars().any(|c| RESERVED_KEY_CHARACTERS.contains(&c)) {
        return Err(CacheError::InvalidKey(key.to_string()));
    }

    Ok(())
}

// == Cache Item Pool ==
/// Pool of cache items backed by an external [`Repository`].
///
/// The pool holds the store handle and a buffer of deferred items. Dropping
/// the pool commits whatever is still buffered, so a deferred write is never
/// silently lost; `commit` remains the explicit flush point.
pub struct CacheItemPool<S: Repository> {
    /// Backing store; the pool manages no store lifecycle of its own
    store: S,
    /// Items queued by `save_deferred`, in insertion order
    deferred: Vec<CacheItem>,
}

impl<S: Repository> CacheItemPool<S> {
    // == Constructor ==
    /// Creates a pool over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            deferred: Vec::new(),
        }
    }

    // == Get Item ==
    /// Fetches the item for `key`: a hit carrying the deserialized value
    /// when the store has a live entry, a fresh miss otherwise.
    ///
    /// The `has`-then-`get` sequence is not atomic; coherence between the
    /// two calls is the store's responsibility. Store and deserialization
    /// failures propagate.
    ///
    /// # Errors
    /// - [`CacheError::InvalidKey`] before any store call
    /// - [`CacheError::Store`] when the store fails
    /// - [`CacheError::Serialization`] when the stored payload is corrupt
    pub fn get_item(&self, key: &str) -> Result<CacheItem> {
        validate_key(key)?;

        if self.store.has(key)? {
            let payload = self.store.get(key)?;
            let value = serde_json::from_slice(&payload)?;
            debug!(key, "cache hit");
            Ok(CacheItem::from_lookup(key, value, true))
        } else {
            debug!(key, "cache miss");
            Ok(CacheItem::new(key))
        }
    }

    // == Get Items ==
    /// Fetches one item per key, lazily and in the supplied order.
    ///
    /// Each element is the `get_item` outcome for the corresponding key;
    /// empty input yields an empty iterator.
    pub fn get_items<'a, K, I>(
        &'a self,
        keys: I,
    ) -> impl Iterator<Item = Result<(K, CacheItem)>> + 'a
    where
        K: AsRef<str> + 'a,
        I: IntoIterator<Item = K>,
        I::IntoIter: 'a,
    {
        keys.into_iter().map(move |key| {
            let item = self.get_item(key.as_ref())?;
            Ok((key, item))
        })
    }

    // == Has Item ==
    /// Returns whether the store has a live entry for `key`.
    ///
    /// # Errors
    /// - [`CacheError::InvalidKey`] before any store call
    /// - [`CacheError::Store`] when the store fails
    pub fn has_item(&self, key: &str) -> Result<bool> {
        validate_key(key)?;

        Ok(self.store.has(key)?)
    }

    // == Clear ==
    /// Flushes the entire store.
    ///
    /// A store failure is absorbed into `false`; it never propagates.
    pub fn clear(&self) -> bool {
        match self.store.flush() {
            Ok(_) => true,
            Err(error) => {
                warn!(%error, "store failed to flush");
                false
            }
        }
    }

    // == Delete Item ==
    /// Removes the entry for `key`, returning the store's own verdict.
    ///
    /// Store failures propagate here, unlike `clear` and `save`.
    ///
    /// # Errors
    /// - [`CacheError::InvalidKey`] before any store call
    /// - [`CacheError::Store`] when the store fails
    pub fn delete_item(&self, key: &str) -> Result<bool> {
        validate_key(key)?;

        Ok(self.store.forget(key)?)
    }

    // == Delete Items ==
    /// Removes the entries for all given keys, in order.
    ///
    /// Every key is validated before anything is deleted, so an invalid key
    /// fails the whole batch up front. Each key is then attempted even after
    /// an earlier deletion reported `false`; the result is the AND of all
    /// verdicts. An empty batch succeeds.
    ///
    /// # Errors
    /// - [`CacheError::InvalidKey`] before any deletion
    /// - [`CacheError::Store`] when the store fails mid-batch
    pub fn delete_items<K, I>(&self, keys: I) -> Result<bool>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = K>,
    {
        let keys: Vec<K> = keys.into_iter().collect();

        for key in &keys {
            validate_key(key.as_ref())?;
        }

        let mut success = true;

        for key in &keys {
            success &= self.delete_item(key.as_ref())?;
        }

        Ok(success)
    }

    // == Save ==
    /// Writes an item to the store immediately.
    ///
    /// Items without an expiration are stored forever; the rest are stored
    /// with their TTL truncated to whole minutes. Serialization and store
    /// failures are absorbed into `false`; this never panics or propagates.
    /// Only a store failure fails the save; the store's boolean return on
    /// writes is not consulted.
    pub fn save(&self, item: &CacheItem) -> bool {
        let payload = match serde_json::to_vec(item.get()) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(key = item.key(), %error, "value failed to serialize");
                return false;
            }
        };

        let result = match item.ttl_minutes() {
            None => self.store.forever(item.key(), &payload),
            Some(minutes) => self.store.put(item.key(), &payload, minutes),
        };

        match result {
            Ok(_) => true,
            Err(error) => {
                warn!(key = item.key(), %error, "store rejected write");
                false
            }
        }
    }

    // == Save Deferred ==
    /// Queues an item for the next `commit`. Buffering never fails.
    pub fn save_deferred(&mut self, item: CacheItem) -> bool {
        self.deferred.push(item);

        true
    }

    // == Commit ==
    /// Saves every deferred item in insertion order, returning the AND of
    /// the individual outcomes.
    ///
    /// The buffer is taken up front and cleared unconditionally, so items
    /// are attempted once and never re-committed after a partial failure.
    pub fn commit(&mut self) -> bool {
        let deferred = mem::take(&mut self.deferred);

        if !deferred.is_empty() {
            debug!(count = deferred.len(), "committing deferred items");
        }

        let mut success = true;

        for item in &deferred {
            success &= self.save(item);
        }

        success
    }
}

// == Drop ==
impl<S: Repository> Drop for CacheItemPool<S> {
    /// Commits pending deferred items at the end of the pool's scope, a
    /// deterministic flush point.
    fn drop(&mut self) {
        let _ = self.commit();
    }
}
