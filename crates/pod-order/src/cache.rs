//! TTL reply cache keyed by request fingerprints.
//!
//! # Contract
//! - An entry is never returned once its TTL has elapsed (expiry is checked
//!   against the injected [`Clock`] on every read; stale entries are evicted).
//! - `put` is last-write-wins.
//! - Keys are [`Fingerprint`]s: SHA-256 over the credential-free canonical
//!   request. Raw request text never becomes a key.
//!
//! # Thread-safety
//! `TtlCache` is `Sync`. One instance can be shared (`Arc`) by every order in
//! a process. Each key is read and written under a single lock acquisition, so
//! a reader never observes a half-written entry. There is no cross-key
//! transaction.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

use crate::response::OrderStatus;
use crate::shipping::ShippingOption;

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// Lowercase hex SHA-256 digest used as an opaque cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Fingerprint(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex chars; enough to correlate log lines.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Monotonic time source for TTL checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Lets tests cross a TTL without sleeping.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(|e| e.into_inner());
        self.start + offset
    }
}

// ---------------------------------------------------------------------------
// TtlCache
// ---------------------------------------------------------------------------

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Keyed store with a per-entry time-to-live.
pub struct TtlCache<V> {
    entries: RwLock<HashMap<Fingerprint, Entry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    // The map only holds plain values, so a poisoned lock is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<Fingerprint, Entry<V>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Fingerprint, Entry<V>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a clone of the live value for `key`, if any.
    pub fn get(&self, key: &Fingerprint) -> Option<V> {
        let now = self.clock.now();
        {
            let map = self.read();
            match map.get(key) {
                None => return None,
                Some(e) if now < e.expires_at => return Some(e.value.clone()),
                Some(_) => {}
            }
        }

        // Expired under the read lock. Re-check under the write lock: another
        // writer may have refreshed the entry in between.
        let mut map = self.write();
        match map.get(key) {
            Some(e) if now < e.expires_at => Some(e.value.clone()),
            Some(_) => {
                map.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores `value` under `key` for `ttl`. A zero TTL stores nothing.
    pub fn put(&self, key: Fingerprint, value: V, ttl: Duration) {
        if ttl.is_zero() {
            self.remove(&key);
            return;
        }
        let Some(expires_at) = self.clock.now().checked_add(ttl) else {
            tracing::warn!(key = %key.short(), ?ttl, "cache ttl overflows the clock; entry not stored");
            return;
        };
        self.write().insert(key, Entry { value, expires_at });
    }

    pub fn remove(&self, key: &Fingerprint) {
        self.write().remove(key);
    }

    /// Drops every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut map = self.write();
        let before = map.len();
        map.retain(|_, e| now < e.expires_at);
        before - map.len()
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.read().values().filter(|e| now < e.expires_at).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.entries.read().map(|m| m.len()).unwrap_or(0);
        f.debug_struct("TtlCache").field("entries", &n).finish()
    }
}

// ---------------------------------------------------------------------------
// Reply cache
// ---------------------------------------------------------------------------

/// What the order workflow caches: a parsed quote or a parsed status record.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedReply {
    Quote(Vec<ShippingOption>),
    Status(OrderStatus),
}

pub type ReplyCache = TtlCache<CachedReply>;

/// TTL per operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub shipping_quote: Duration,
    pub order_status: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            shipping_quote: Duration::from_secs(1440 * 60),
            order_status: Duration::from_secs(30 * 60),
        }
    }
}
