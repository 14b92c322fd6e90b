// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Durable [`StringStorage`] backed by the filesystem.
//!
//! Each key lives in its own JSON file under `{root}/kv/`. The file name is
//! the hex encoding of the key, so arbitrary key strings are safe. Writes go
//! to a uniquely named temp file first and are moved into place with a rename.
//!
//! Entries hold ephemeral private keys: point the root at a directory that
//! only the owning process can read.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::string_store::{StorageResult, StringStorage};
use super::StoragePaths;

/// On-disk envelope for a single entry.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    value: String,
}

/// Filesystem-backed string storage.
#[derive(Debug, Clone)]
pub struct FileStringStorage {
    paths: StoragePaths,
}

impl FileStringStorage {
    /// Open (and create if needed) a store rooted at `paths`.
    pub fn open(paths: StoragePaths) -> StorageResult<Self> {
        fs::create_dir_all(paths.kv_dir())?;
        Ok(Self { paths })
    }

    /// Get the storage paths.
    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    /// List every stored key.
    pub fn keys(&self) -> StorageResult<Vec<String>> {
        let dir = self.paths.kv_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let file = File::open(&path)?;
                let stored: StoredEntry = serde_json::from_reader(BufReader::new(file))?;
                keys.push(stored.key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

impl StringStorage for FileStringStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let file = match File::open(self.paths.kv_entry(key)) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored: StoredEntry = serde_json::from_reader(BufReader::new(file))?;
        Ok(Some(stored.value))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.paths.kv_entry(key);

        let dir = path.parent().unwrap_or(self.paths.root());
        fs::create_dir_all(dir)?;

        // Uniquely named so concurrent writers never share a temp file.
        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer(
                &mut writer,
                &StoredEntry {
                    key: key.to_string(),
                    value: value.to_string(),
                },
            )?;
            writer.flush()?;
        }

        temp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        match fs::remove_file(self.paths.kv_entry(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    fn test_storage() -> (tempfile::TempDir, FileStringStorage) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = FileStringStorage::open(StoragePaths::new(dir.path()))
            .expect("Failed to open file storage");
        (dir, storage)
    }

    #[test]
    fn open_creates_kv_dir() {
        let (_dir, storage) = test_storage();
        assert!(storage.paths().kv_dir().is_dir());
    }

    #[test]
    fn missing_key_is_absent() {
        let (_dir, storage) = test_storage();
        assert_eq!(storage.get("fhevm_sig_0xAAA_0x01").unwrap(), None);
    }

    #[test]
    fn set_then_get_survives_reopen() {
        let (dir, storage) = test_storage();
        storage.set("fhevm_sig_0xAAA_0x01", r#"{"a":1}"#).unwrap();
        drop(storage);

        let reopened = FileStringStorage::open(StoragePaths::new(dir.path())).unwrap();
        assert_eq!(
            reopened.get("fhevm_sig_0xAAA_0x01").unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
    }

    #[test]
    fn overwrite_leaves_no_temp_file() {
        let (_dir, storage) = test_storage();
        storage.set("k", "one").unwrap();
        storage.set("k", "two").unwrap();

        assert_eq!(storage.get("k").unwrap().as_deref(), Some("two"));
        let files: Vec<_> = fs::read_dir(storage.paths().kv_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path(), storage.paths().kv_entry("k"));
    }

    #[test]
    fn concurrent_writers_to_one_key_all_succeed() {
        let (dir, _storage) = test_storage();

        let writers: Vec<_> = (0..8)
            .map(|i| {
                // Separate instances stand in for separate processes.
                let storage = FileStringStorage::open(StoragePaths::new(dir.path())).unwrap();
                std::thread::spawn(move || {
                    for round in 0..25 {
                        storage.set("shared", &format!("{i}-{round}")).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let reopened = FileStringStorage::open(StoragePaths::new(dir.path())).unwrap();
        assert!(reopened.get("shared").unwrap().is_some());
        assert_eq!(reopened.keys().unwrap(), vec!["shared".to_string()]);
    }

    #[test]
    fn remove_missing_key_is_ok() {
        let (_dir, storage) = test_storage();
        storage.remove("never-set").unwrap();

        storage.set("k", "v").unwrap();
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn keys_lists_original_key_strings() {
        let (_dir, storage) = test_storage();
        storage.set("b/slash", "1").unwrap();
        storage.set("a", "2").unwrap();

        assert_eq!(storage.keys().unwrap(), vec!["a".to_string(), "b/slash".to_string()]);
    }

    #[test]
    fn corrupted_file_is_a_json_error() {
        let (_dir, storage) = test_storage();
        fs::write(storage.paths().kv_entry("k"), b"not json").unwrap();

        assert!(matches!(storage.get("k"), Err(StorageError::Json(_))));
    }
}
