//! # Tradelens Store
//!
//! Key/value blob storage used as the persisted tier of the enrichment cache.
//!
//! ## Overview
//!
//! The engine only needs "store/retrieve a blob by key" plus key enumeration
//! for namespace sweeps. This crate provides that contract ([`BlobStore`]) and
//! two implementations:
//!
//! | Store | Description |
//! |-------|-------------|
//! | [`DuckDbBlobStore`] | Durable store in a single DuckDB table |
//! | [`MemoryBlobStore`] | Process-local map, used for the memory tier and tests |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tradelens_store::{BlobStore, DuckDbBlobStore};
//!
//! fn main() -> Result<(), tradelens_store::StoreError> {
//!     let store = DuckDbBlobStore::open_default()?;
//!     store.set("tradelens:enrichment:v1:acme", "{}")?;
//!     assert!(store.get("tradelens:enrichment:v1:acme")?.is_some());
//!     Ok(())
//! }
//! ```
//!
//! ## Tables
//!
//! | Table | Description |
//! |-------|-------------|
//! | `blob_entries` | One row per key, value stored as text |
//! | `schema_migrations` | Applied migration versions |

pub mod duckdb;
mod memory;
pub mod migrations;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ::duckdb::{params, Connection};
use thiserror::Error;

pub use memory::MemoryBlobStore;

/// Errors raised by blob store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (creating the store directory).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The store refused the operation (quota, read-only medium, ...).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Minimal key/value contract for persisted blobs.
pub trait BlobStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Every key currently held, in no particular order.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        (**self).keys()
    }
}

/// Location of the persisted store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root directory for tradelens data.
    pub tradelens_home: PathBuf,
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::under(resolve_tradelens_home())
    }
}

impl StoreConfig {
    /// Standard layout below a given home directory.
    pub fn under(tradelens_home: impl Into<PathBuf>) -> Self {
        let tradelens_home = tradelens_home.into();
        let db_path = tradelens_home.join("cache").join("enrichment.duckdb");
        Self {
            tradelens_home,
            db_path,
        }
    }
}

/// Blob store persisted in a DuckDB file.
pub struct DuckDbBlobStore {
    db_path: PathBuf,
    connection: Mutex<Connection>,
}

impl DuckDbBlobStore {
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(&StoreConfig::default())
    }

    /// Open (creating if needed) the store described by `config`.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let connection = duckdb::open_connection(config.db_path.as_path())?;
        migrations::apply_migrations(&connection)?;

        Ok(Self {
            db_path: config.db_path.clone(),
            connection: Mutex::new(connection),
        })
    }

    pub fn db_path(&self) -> &Path {
        self.db_path.as_path()
    }

    fn with_connection<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, ::duckdb::Error>,
    ) -> Result<T, StoreError> {
        let connection = self
            .connection
            .lock()
            .expect("duckdb blob store mutex poisoned");
        op(&connection).map_err(StoreError::from)
    }
}

impl BlobStore for DuckDbBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_connection(|connection| {
            let mut statement =
                connection.prepare("SELECT value FROM blob_entries WHERE key = ?")?;
            let mut rows = statement.query(params![key])?;
            match rows.next()? {
                Some(row) => Ok(Some(row.get::<_, String>(0)?)),
                None => Ok(None),
            }
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.with_connection(|connection| {
            connection.execute(
                "INSERT OR REPLACE INTO blob_entries (key, value, updated_at) \
                 VALUES (?, ?, CURRENT_TIMESTAMP)",
                params![key, value],
            )?;
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.with_connection(|connection| {
            connection.execute("DELETE FROM blob_entries WHERE key = ?", params![key])?;
            Ok(())
        })
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.with_connection(|connection| {
            let mut statement = connection.prepare("SELECT key FROM blob_entries ORDER BY key")?;
            let keys = statement
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(keys)
        })
    }
}

fn resolve_tradelens_home() -> PathBuf {
    if let Some(path) = env::var_os("TRADELENS_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".tradelens");
    }

    PathBuf::from(".tradelens")
}
