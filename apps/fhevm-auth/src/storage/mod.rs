// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Two caches back the decryption flow:
//!
//! - [`StringStorage`]: a narrow string key-value contract. The signature
//!   cache persists serialized authorization records through it and never
//!   sees the concrete backend.
//! - [`PublicKeyStorage`]: the FHE public key and public parameters per ACL
//!   contract, filled by the caller after a network fetch.
//!
//! ## Backends
//!
//! - [`InMemoryStringStorage`]: process-local, lost on restart
//! - [`FileStringStorage`]: one JSON file per key under `{root}/kv/`
//!
//! Stores are constructed once and shared by reference (`Arc`). Nothing in
//! this crate reaches for a global store.

pub mod file_store;
pub mod paths;
pub mod public_key;
pub mod string_store;

pub use file_store::FileStringStorage;
pub use paths::StoragePaths;
pub use public_key::{PublicKeyData, PublicKeyStorage, DEFAULT_PUBLIC_KEY_CACHE_CAPACITY};
pub use string_store::{InMemoryStringStorage, StorageError, StorageResult, StringStorage};
