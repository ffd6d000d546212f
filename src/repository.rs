//! Repository Trait Module
//!
//! Contract the backing store must satisfy for the pool to drive it.
//! The pool never stores values directly; it hands the repository opaque
//! byte payloads and a TTL expressed in whole minutes.

use std::rc::Rc;
use std::sync::Arc;

use crate::error::StoreResult;

// == Repository Trait ==
/// Minute-granularity key/value store consumed by the pool.
///
/// Methods take `&self`; stores that mutate on write are expected to use
/// interior mutability (they are typically shared handles over a connection
/// or a concurrent map). Every method may fail with a store-level error.
pub trait Repository {
    /// Returns whether a live entry exists for `key`.
    fn has(&self, key: &str) -> StoreResult<bool>;

    /// Returns the stored payload for `key`.
    ///
    /// Only called after `has` returned true for the same key. The two calls
    /// are not atomic; keeping them coherent is the store's responsibility.
    fn get(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Stores a payload that expires after `minutes` whole minutes.
    fn put(&self, key: &str, value: &[u8], minutes: u64) -> StoreResult<bool>;

    /// Stores a payload with no expiration.
    fn forever(&self, key: &str, value: &[u8]) -> StoreResult<bool>;

    /// Removes the entry for `key`, reporting whether removal succeeded.
    fn forget(&self, key: &str) -> StoreResult<bool>;

    /// Removes every entry in the store.
    fn flush(&self) -> StoreResult<bool>;
}

// == Forwarding Implementations ==
// Let a pool hold either an owned store or a shared handle to one.

macro_rules! forward_repository {
    ($wrapper:ty) => {
        impl<R: Repository + ?Sized> Repository for $wrapper {
            fn has(&self, key: &str) -> StoreResult<bool> {
                (**self).has(key)
            }

            fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
                (**self).get(key)
            }

            fn put(&self, key: &str, value: &[u8], minutes: u64) -> StoreResult<bool> {
                (**self).put(key, value, minutes)
            }

            fn forever(&self, key: &str, value: &[u8]) -> StoreResult<bool> {
                (**self).forever(key, value)
            }

            fn forget(&self, key: &str) -> StoreResult<bool> {
                (**self).forget(key)
            }

            fn flush(&self) -> StoreResult<bool> {
                (**self).flush()
            }
        }
    };
}

forward_repository!(&R);
forward_repository!(Box<R>);
forward_repository!(Rc<R>);
forward_repository!(Arc<R>);
