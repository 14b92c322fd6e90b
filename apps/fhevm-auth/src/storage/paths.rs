// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the durable storage layout.

use std::path::{Path, PathBuf};

/// Default base directory for durable key-value data.
pub const DATA_ROOT: &str = "./.fhevm-auth";

/// Storage path utilities for the durable backends.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DATA_ROOT)
    }
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all durable data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== Key-Value Paths ==========

    /// Directory containing all string key-value entries.
    pub fn kv_dir(&self) -> PathBuf {
        self.root.join("kv")
    }

    /// Path to the file holding a single key.
    ///
    /// Keys are hex-encoded so that any string (including `/` or `..`)
    /// maps to a single, safe path component.
    pub fn kv_entry(&self, key: &str) -> PathBuf {
        self.kv_dir()
            .join(format!("{}.json", alloy::hex::encode(key.as_bytes())))
    }
}
