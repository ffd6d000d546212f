//! Cache Item Module
//!
//! Defines the mutable value holder for a single cache slot: key, payload,
//! hit flag, and expiration setting.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

// == Expiration ==
/// Expiration setting carried by a cache item.
///
/// `Never` means "store forever". Absolute points in time are held as
/// `DateTime<Utc>`, a `Copy` value type, so the item always owns an
/// immutable snapshot of whatever the caller passed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// No expiration was set; the pool stores the value forever
    Never,
    /// Expires at an absolute point in time
    At(DateTime<Utc>),
    /// Expires after a relative duration
    After(Duration),
}

// == Expires After ==
/// Relative expiration accepted by [`CacheItem::expires_after`].
///
/// Converts from a raw integer (interpreted as seconds from now) or a
/// [`chrono::Duration`].
#[derive(Debug, Clone, Copy)]
pub enum ExpiresAfter {
    /// Seconds from now
    Seconds(i64),
    /// An explicit duration from now
    Duration(Duration),
}

impl From<i64> for ExpiresAfter {
    fn from(seconds: i64) -> Self {
        ExpiresAfter::Seconds(seconds)
    }
}

impl From<Duration> for ExpiresAfter {
    fn from(duration: Duration) -> Self {
        ExpiresAfter::Duration(duration)
    }
}

impl ExpiresAfter {
    fn into_duration(self) -> Duration {
        match self {
            ExpiresAfter::Seconds(seconds) => Duration::seconds(seconds),
            ExpiresAfter::Duration(duration) => duration,
        }
    }
}

// == Cache Item ==
/// One cache slot's current view: key, value, hit flag, and expiration.
///
/// Items are created by the pool (on hit or miss) or directly by a caller,
/// mutated through `set` / `expires_at` / `expires_after`, then handed to
/// the pool's save path and discarded.
#[derive(Debug, Clone)]
pub struct CacheItem {
    /// Immutable key, set at construction
    key: String,
    /// Stored payload; `Value::Null` is a legitimate value, distinct from a miss
    value: Value,
    /// True only when the item came from a successful store lookup
    hit: bool,
    /// Expiration setting consumed by the pool's save path
    expiration: Expiration,
}

impl CacheItem {
    // == Constructors ==
    /// Creates a fresh miss: no value, no expiration.
    pub fn new(key: impl Into<String>) -> Self {
        Self::from_lookup(key, Value::Null, false)
    }

    /// Creates an item from a store lookup result.
    ///
    /// Hit gating is strict: when `hit` is false the value is discarded and
    /// the item reads as `Value::Null`, whatever was passed in.
    pub fn from_lookup(key: impl Into<String>, value: Value, hit: bool) -> Self {
        let value = if hit { value } else { Value::Null };

        Self {
            key: key.into(),
            value,
            hit,
            expiration: Expiration::Never,
        }
    }

    // == Accessors ==
    /// Returns the item's key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the stored value; `Value::Null` when the item is a miss.
    pub fn get(&self) -> &Value {
        &self.value
    }

    /// Returns whether the item came from a successful lookup.
    ///
    /// Reads the same post-construction state as [`get`](Self::get), so the
    /// two can never disagree on one instance.
    pub fn is_hit(&self) -> bool {
        self.hit
    }

    /// Returns the expiration setting as assigned.
    pub fn expiration(&self) -> &Expiration {
        &self.expiration
    }

    // == Mutators ==
    /// Replaces the stored value. Chainable.
    pub fn set(&mut self, value: Value) -> &mut Self {
        self.value = value;
        self
    }

    /// Replaces the stored value with the JSON form of any serializable type.
    ///
    /// Fails only when `value` cannot be represented as a JSON value (for
    /// example a map with non-string keys).
    pub fn set_from<T: Serialize>(&mut self, value: &T) -> Result<&mut Self> {
        self.value = serde_json::to_value(value)?;
        Ok(self)
    }

    /// Sets an absolute expiration; `None` clears it back to "store forever".
    pub fn expires_at(&mut self, expires: Option<DateTime<Utc>>) -> &mut Self {
        self.expiration = match expires {
            Some(at) => Expiration::At(at),
            None => Expiration::Never,
        };
        self
    }

    /// Sets a relative expiration; `None` clears it back to "store forever".
    ///
    /// Accepts anything convertible to [`ExpiresAfter`]: raw seconds or a
    /// `chrono::Duration`.
    pub fn expires_after(&mut self, time: Option<ExpiresAfter>) -> &mut Self {
        self.expiration = match time {
            Some(after) => Expiration::After(after.into_duration()),
            None => Expiration::Never,
        };
        self
    }

    // == Time To Live ==
    /// Returns the remaining TTL in whole minutes, or None when no
    /// expiration is set ("store forever").
    ///
    /// Minutes are truncated, never rounded, and the result is clamped at
    /// zero for already-elapsed expirations:
    /// - `Some(0)` for an expiration in the past
    /// - `Some(remaining / 60)` otherwise
    /// - `None` when the item never expires
    pub fn ttl_minutes(&self) -> Option<u64> {
        match self.expiration {
            Expiration::Never => None,
            Expiration::At(at) => {
                let remaining = at.signed_duration_since(Utc::now());
                Some(remaining.num_minutes().max(0) as u64)
            }
            Expiration::After(duration) => Some(duration.num_minutes().max(0) as u64),
        }
    }
}
