// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! LRU cache for the FHE network public key and public parameters.
//!
//! Entries are keyed by the lower-cased ACL contract address. The cache is
//! advisory: on a miss the caller fetches the material from the network and
//! calls [`PublicKeyStorage::set`]. The cache itself never fetches.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use serde::{Deserialize, Serialize};

/// Default number of ACL addresses kept in the cache.
pub const DEFAULT_PUBLIC_KEY_CACHE_CAPACITY: usize = 64;

/// Public FHE material for one ACL contract.
///
/// Empty strings mean "not fetched yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyData {
    pub public_key: String,
    pub public_params: String,
}

impl PublicKeyData {
    /// Whether both halves are present.
    pub fn is_complete(&self) -> bool {
        !self.public_key.is_empty() && !self.public_params.is_empty()
    }
}

/// In-process cache of public FHE material per ACL contract address.
pub struct PublicKeyStorage {
    cache: Mutex<LruCache<String, PublicKeyData>>,
}

impl Default for PublicKeyStorage {
    fn default() -> Self {
        Self::new(DEFAULT_PUBLIC_KEY_CACHE_CAPACITY)
    }
}

impl PublicKeyStorage {
    /// Create a new cache holding at most `capacity` ACL addresses.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
        }
    }

    /// Get the cached material for an ACL address.
    ///
    /// Returns empty placeholders if not cached.
    pub fn get(&self, acl_address: &str) -> PublicKeyData {
        let key = acl_address.to_lowercase();
        let cached = self
            .cache
            .lock()
            .ok()
            .and_then(|mut cache| cache.get(&key).cloned())
            .filter(PublicKeyData::is_complete);

        match cached {
            Some(data) => {
                tracing::debug!(acl = %acl_address, "Using cached FHE public key");
                data
            }
            None => {
                tracing::debug!(acl = %acl_address, "No cached FHE public key, caller must fetch");
                PublicKeyData::default()
            }
        }
    }

    /// Store the material for an ACL address.
    ///
    /// No-op unless both `public_key` and `public_params` are non-empty.
    pub fn set(&self, acl_address: &str, public_key: &str, public_params: &str) {
        if public_key.is_empty() || public_params.is_empty() {
            return;
        }

        let key = acl_address.to_lowercase();
        if let Ok(mut cache) = self.cache.lock() {
            tracing::debug!(acl = %acl_address, "Caching FHE public key");
            cache.put(
                key,
                PublicKeyData {
                    public_key: public_key.to_string(),
                    public_params: public_params.to_string(),
                },
            );
        }
    }

    /// Drop the cached material for an ACL address.
    pub fn invalidate(&self, acl_address: &str) {
        let key = acl_address.to_lowercase();
        if let Ok(mut cache) = self.cache.lock() {
            cache.pop(&key);
        }
    }
}
