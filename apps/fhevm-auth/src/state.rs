// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::config::AuthConfig;
use crate::signature::DecryptionSignatureManager;
use crate::storage::{
    FileStringStorage, InMemoryStringStorage, PublicKeyStorage, StorageResult, StoragePaths,
    StringStorage,
};

/// Shared handles for one application instance.
#[derive(Clone)]
pub struct AuthState {
    pub storage: Arc<dyn StringStorage>,
    pub public_keys: Arc<PublicKeyStorage>,
    pub signatures: Arc<DecryptionSignatureManager>,
    pub default_duration_days: u64,
}

impl AuthState {
    pub fn new(storage: Arc<dyn StringStorage>, config: &AuthConfig) -> Self {
        Self {
            signatures: Arc::new(DecryptionSignatureManager::from_config(
                storage.clone(),
                config,
            )),
            public_keys: Arc::new(PublicKeyStorage::new(config.public_key_cache_capacity)),
            storage,
            default_duration_days: config.default_duration_days,
        }
    }

    /// Build state from configuration, opening the durable store when a data
    /// directory is set.
    pub fn from_config(config: &AuthConfig) -> StorageResult<Self> {
        let storage: Arc<dyn StringStorage> = match &config.data_dir {
            Some(dir) => {
                tracing::info!(data_dir = %dir.display(), "Using file-backed signature store");
                Arc::new(FileStringStorage::open(StoragePaths::new(dir))?)
            }
            None => {
                tracing::info!("Using in-memory signature store");
                Arc::new(InMemoryStringStorage::new())
            }
        };
        Ok(Self::new(storage, config))
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryStringStorage::new()), &AuthConfig::default())
    }
}
