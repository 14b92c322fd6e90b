// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User decryption request handed to the FHEVM instance.

use std::collections::BTreeMap;

use alloy::primitives::U256;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::instance::FhevmError;

/// An encrypted handle and the contract that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleContractPair {
    /// `0x`-prefixed 32-byte ciphertext handle
    pub handle: String,
    pub contract_address: String,
}

/// Everything the instance needs to re-encrypt and decrypt for a user.
///
/// Borrowed from a cached [`crate::signature::DecryptionSignature`].
#[derive(Clone, Copy)]
pub struct UserDecryptRequest<'a> {
    pub items: &'a [HandleContractPair],
    pub private_key: &'a str,
    pub public_key: &'a str,
    pub signature: &'a str,
    pub contract_addresses: &'a [String],
    pub user_address: &'a str,
    pub start_timestamp: u64,
    pub duration_days: u64,
}

/// Decrypts handles with a user's decryption authorization.
#[async_trait]
pub trait UserDecryptor: Send + Sync {
    /// Returns clear values keyed by handle.
    async fn user_decrypt(
        &self,
        request: UserDecryptRequest<'_>,
    ) -> Result<BTreeMap<String, U256>, FhevmError>;
}
