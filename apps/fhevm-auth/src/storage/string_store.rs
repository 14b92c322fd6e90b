// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Generic string key-value storage.
//!
//! The signature cache depends only on [`StringStorage`]. The in-memory
//! implementation is the default; [`super::FileStringStorage`] is a drop-in
//! durable replacement.

use std::collections::HashMap;
use std::io;
use std::sync::RwLock;

/// Error type for string storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error in a durable backend
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend lock was poisoned by a panicking writer
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A total mapping from string keys to string values.
///
/// A missing key is `Ok(None)`, never an error. Errors are reserved for
/// backend failures (disk, locks).
pub trait StringStorage: Send + Sync {
    /// Get the value stored under `key`.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Process-local string storage backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryStringStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStringStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StringStorage for InMemoryStringStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}
