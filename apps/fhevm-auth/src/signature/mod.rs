// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Decryption authorization signatures and their cache.

pub mod manager;
pub mod record;

pub use manager::{
    DecryptionSignatureManager, DEFAULT_DURATION_DAYS, FALLBACK_DOMAIN_NAME, FALLBACK_EXTRA_DATA,
    USER_DECRYPT_PRIMARY_TYPE,
};
pub use record::{ensure_hex_prefix, storage_key, DecryptionSignature, STORAGE_KEY_PREFIX};
