// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Capability model of a confidential-computation (FHEVM) instance.
//!
//! Instances differ in which signing helpers they ship. Rather than probing
//! for optional methods, an instance reports an [`InstanceCapabilities`]
//! value once and callers branch on it.

use std::fmt;

use alloy::sol_types::Eip712Domain;
use serde::{Deserialize, Serialize};

use crate::blockchain::TypeSchema;

/// Errors raised by an FHEVM instance capability.
#[derive(Debug, thiserror::Error)]
pub enum FhevmError {
    #[error("Key pair generation failed: {0}")]
    KeyGeneration(String),

    #[error("EIP-712 construction failed: {0}")]
    Eip712(String),

    #[error("User decryption failed: {0}")]
    Decryption(String),
}

/// One-time key pair bound to a single decryption authorization.
///
/// Both halves are `0x`-prefixed hex once normalized.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EphemeralKeypair {
    pub public_key: String,
    pub private_key: String,
}

impl fmt::Debug for EphemeralKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralKeypair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// A complete EIP-712 document produced by the instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Eip712Document {
    pub domain: Eip712Domain,
    /// May include an `EIP712Domain` entry; the signature cache strips it.
    pub types: TypeSchema,
    pub message: serde_json::Value,
    pub primary_type: Option<String>,
}

/// Generates ephemeral key pairs for user decryption.
pub trait KeypairGenerator: Send + Sync {
    fn generate_keypair(&self) -> Result<EphemeralKeypair, FhevmError>;
}

/// Builds the user-decryption EIP-712 document.
pub trait Eip712Builder: Send + Sync {
    fn create_eip712(
        &self,
        public_key: &str,
        contract_addresses: &[String],
        start_timestamp: u64,
        duration_days: u64,
    ) -> Result<Eip712Document, FhevmError>;
}

/// What an instance can do for the signing flow.
pub enum InstanceCapabilities<'a> {
    /// Key pairs and the full EIP-712 document.
    FullDocumentBuilder {
        keypair: &'a dyn KeypairGenerator,
        eip712: &'a dyn Eip712Builder,
    },
    /// Key pairs only; the EIP-712 document is built by hand.
    KeypairOnly(&'a dyn KeypairGenerator),
    /// No key pair generation. Decryption authorization is impossible.
    Unsupported,
}

impl InstanceCapabilities<'_> {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            InstanceCapabilities::FullDocumentBuilder { .. } => "full_document_builder",
            InstanceCapabilities::KeypairOnly(_) => "keypair_only",
            InstanceCapabilities::Unsupported => "unsupported",
        }
    }
}

/// A confidential-computation instance as seen by the signature cache.
pub trait FhevmInstance: Send + Sync {
    fn capabilities(&self) -> InstanceCapabilities<'_>;
}
