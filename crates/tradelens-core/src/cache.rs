//! Two-tier expiring cache for enrichment results.
//!
//! Both tiers are the same [`ExpiringStore`] policy layered over a
//! [`BlobStore`]: the memory tier over a [`MemoryBlobStore`], the persisted
//! tier over whatever durable store the caller supplies (DuckDB in
//! production). [`CacheManager`] composes the two.
//!
//! Tier failures never escape the manager. They are logged and the other
//! tier carries on; the memory tier stays authoritative for the process.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use tradelens_store::{BlobStore, MemoryBlobStore};

use crate::clock::Clock;
use crate::error::CacheError;
use crate::{CompanyId, UtcDateTime};

/// Prefix shared by every key this engine writes.
pub const CACHE_NAMESPACE: &str = "tradelens:enrichment:v1:";

/// Lifetime of a cache entry.
pub const CACHE_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// What a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Enrichment,
    Kpi,
}

impl CacheKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enrichment => "enrichment",
            Self::Kpi => "kpi",
        }
    }
}

pub fn cache_key(kind: CacheKind, company_id: &CompanyId) -> String {
    format!("{CACHE_NAMESPACE}{}:{company_id}", kind.as_str())
}

/// Stored wrapper: the value plus when it was written and how long it lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub created_at_ms: i64,
    pub ttl_ms: i64,
    pub value: T,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, created_at: UtcDateTime, ttl: Duration) -> Self {
        Self {
            created_at_ms: created_at.unix_millis(),
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            value,
        }
    }

    /// Fresh while `now - created_at <= ttl`.
    pub fn is_fresh(&self, now: UtcDateTime) -> bool {
        now.unix_millis().saturating_sub(self.created_at_ms) <= self.ttl_ms
    }
}

/// TTL policy over a blob store. Values are stored as JSON [`CacheEntry`]s.
#[derive(Debug)]
pub struct ExpiringStore<S> {
    store: S,
    ttl: Duration,
}

impl<S: BlobStore> ExpiringStore<S> {
    pub fn new(store: S, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fresh entry under `key`, if any. Expired or undecodable entries are
    /// removed from the underlying store and reported as absent.
    pub fn get<T: DeserializeOwned>(
        &self,
        key: &str,
        now: UtcDateTime,
    ) -> Result<Option<CacheEntry<T>>, CacheError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(error) => {
                debug!(key, %error, "dropping undecodable cache entry");
                self.store.remove(key)?;
                return Ok(None);
            }
        };

        if !entry.is_fresh(now) {
            debug!(key, "dropping expired cache entry");
            self.store.remove(key)?;
            return Ok(None);
        }

        Ok(Some(entry))
    }

    /// Write `value` stamped with `now` and this store's TTL.
    pub fn put<T: Serialize>(&self, key: &str, value: &T, now: UtcDateTime) -> Result<(), CacheError> {
        self.put_entry(key, &CacheEntry::new(value, now, self.ttl))
    }

    /// Write an entry as-is, keeping its original timestamp.
    pub fn put_entry<T: Serialize>(&self, key: &str, entry: &CacheEntry<T>) -> Result<(), CacheError> {
        let raw = serde_json::to_string(entry)?;
        self.store.set(key, &raw)?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.store.remove(key)?;
        Ok(())
    }

    /// Remove every key starting with `prefix`; returns how many were removed.
    pub fn remove_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let mut removed = 0;
        for key in self.store.keys()? {
            if key.starts_with(prefix) {
                self.store.remove(&key)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Memory tier + persisted tier, keyed by company.
pub struct CacheManager {
    memory: ExpiringStore<MemoryBlobStore>,
    persisted: ExpiringStore<Arc<dyn BlobStore>>,
    clock: Arc<dyn Clock>,
}

impl CacheManager {
    pub fn new(persisted: Arc<dyn BlobStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            memory: ExpiringStore::new(MemoryBlobStore::new(), CACHE_TTL),
            persisted: ExpiringStore::new(persisted, CACHE_TTL),
            clock,
        }
    }

    /// Both tiers live in process memory; nothing survives a restart.
    pub fn memory_only(clock: Arc<dyn Clock>) -> Self {
        Self::new(Arc::new(MemoryBlobStore::new()), clock)
    }

    pub fn now(&self) -> UtcDateTime {
        self.clock.now()
    }

    /// Memory tier first, then persisted. A persisted hit is copied into
    /// memory with its original timestamp.
    pub fn get<T>(&self, kind: CacheKind, company_id: &CompanyId) -> Option<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let key = cache_key(kind, company_id);
        let now = self.clock.now();

        match self.memory.get::<T>(&key, now) {
            Ok(Some(entry)) => {
                debug!(company_id = %company_id, kind = kind.as_str(), tier = "memory", "cache hit");
                return Some(entry.value);
            }
            Ok(None) => {}
            Err(error) => warn!(company_id = %company_id, %error, "memory cache tier read failed"),
        }

        match self.persisted.get::<T>(&key, now) {
            Ok(Some(entry)) => {
                debug!(company_id = %company_id, kind = kind.as_str(), tier = "persisted", "cache hit");
                if let Err(error) = self.memory.put_entry(&key, &entry) {
                    warn!(company_id = %company_id, %error, "memory cache tier promote failed");
                }
                Some(entry.value)
            }
            Ok(None) => {
                debug!(company_id = %company_id, kind = kind.as_str(), "cache miss");
                None
            }
            Err(error) => {
                warn!(company_id = %company_id, %error, "persisted cache tier read failed");
                None
            }
        }
    }

    /// Write to both tiers with a fresh timestamp. Last write wins.
    pub fn put<T: Serialize>(&self, kind: CacheKind, company_id: &CompanyId, value: &T) {
        let key = cache_key(kind, company_id);
        let now = self.clock.now();

        if let Err(error) = self.memory.put(&key, value, now) {
            warn!(company_id = %company_id, %error, "memory cache tier write failed");
        }
        if let Err(error) = self.persisted.put(&key, value, now) {
            warn!(company_id = %company_id, %error, "persisted cache tier write failed");
        }
    }

    /// Empty the memory tier and remove every namespaced persisted key.
    /// Unrelated persisted keys are left alone.
    pub fn clear(&self) {
        self.memory.store().clear();
        match self.persisted.remove_prefix(CACHE_NAMESPACE) {
            Ok(removed) => debug!(removed, "persisted cache tier cleared"),
            Err(error) => warn!(%error, "persisted cache tier clear failed"),
        }
    }

    pub fn memory_len(&self) -> usize {
        self.memory.store().len()
    }
}
