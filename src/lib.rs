//! Cache Bridge - A PSR-6 style cache item pool over a cache repository
//!
//! Adapts a minute-granularity key/value repository (`has`/`get`/`put`/
//! `forever`/`forget`/`flush`) to a cache item pool contract: items with
//! explicit hit/miss state, deferred writes, batch operations, and
//! expiration as absolute timestamps or relative durations.

pub mod error;
pub mod item;
pub mod pool;
pub mod repository;


pub use error::{CacheError, Result, StoreError, StoreResult};
pub use item::{CacheItem, Expiration, ExpiresAfter};
pub use pool::CacheItemPool;
pub use repository::Repository;
