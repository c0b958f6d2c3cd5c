//! Persistent store adapter.
//!
//! The storefront keeps two key-value stores, mirroring what a browser tab
//! offers:
//!
//! - a **durable** store (cart, prescriptions, preferences) that survives
//!   restarts, backed by [`FileStore`];
//! - a **session-scoped** store (login record) that lives as long as the
//!   session, backed by [`MemoryStore`] or a separate [`FileStore`].
//!
//! Values are strings. Structured values are stored as JSON through
//! [`Repository`], which is the single persistence boundary every state
//! manager writes through.
//!
//! # Keys
//!
//! See [`keys`] for the full list. Key names are part of the on-disk format
//! and must not change.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage keys.
pub mod keys {
    /// Durable: cart lines (JSON array).
    pub const CART: &str = "cart";

    /// Durable: prescriptions keyed by product ID (JSON object).
    pub const PRESCRIPTIONS: &str = "prescriptions";

    /// Durable: display language code (plain text).
    pub const LANGUAGE: &str = "language";

    /// Durable: delivery pincode (plain text).
    pub const PINCODE: &str = "pincode";

    /// Durable: total cart quantity, denormalized from [`CART`] (plain text).
    pub const CART_COUNT: &str = "cartCount";

    /// Session: login record (JSON object with `user` and `loginTime`).
    pub const LOGGED_IN_USER: &str = "loggedInUser";

    /// Session: backend user ID of the logged-in user (plain text).
    pub const USER_ID: &str = "userId";
}

/// Errors raised by a [`KeyValueStore`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file could not be encoded.
    #[error("storage encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// A previous writer panicked while holding the store lock.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A string key-value store.
///
/// Implementations must apply each write before returning so that a
/// subsequent `get`, from this or a fresh instance over the same backing
/// storage, observes it.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write cannot be persisted. The store is
    /// left unchanged in that case.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the deletion cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Errors that can occur in repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The underlying store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A stored value could not be decoded.
    #[error("data corruption in '{key}': {message}")]
    DataCorruption {
        /// Key holding the bad value.
        key: String,
        /// Decoder message.
        message: String,
    },

    /// A value could not be encoded for storage.
    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Typed JSON access to a [`KeyValueStore`].
///
/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository").finish_non_exhaustive()
    }
}

impl Repository {
    /// Create a repository over a store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Create a repository over a fresh, empty in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Load and decode a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the store cannot be read and
    /// `RepositoryError::DataCorruption` if the stored text is not a valid
    /// `T`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RepositoryError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| RepositoryError::DataCorruption {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    /// Load a JSON value, falling back to `T::default()` when it is absent,
    /// unreadable or malformed.
    ///
    /// Failures are logged and never surfaced.
    #[must_use]
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.load(key) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding unreadable stored value");
                T::default()
            }
        }
    }

    /// Encode and store a JSON value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if encoding or the write fails.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), RepositoryError> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, &raw)?;
        Ok(())
    }

    /// Load a plain-text value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the store cannot be read.
    pub fn load_text(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        Ok(self.store.get(key)?)
    }

    /// Store a plain-text value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the write fails.
    pub fn save_text(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        Ok(self.store.set(key, value)?)
    }

    /// Delete a key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the deletion fails.
    pub fn remove(&self, key: &str) -> Result<(), RepositoryError> {
        Ok(self.store.remove(key)?)
    }
}
