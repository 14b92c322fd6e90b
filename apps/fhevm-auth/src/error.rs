// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Failure causes of the decryption signature flow.
//!
//! [`crate::signature::DecryptionSignatureManager::load_or_sign`] flattens all
//! of these into `None`; `try_load_or_sign` keeps them apart.

use crate::blockchain::SignerError;
use crate::fhevm::FhevmError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    /// The instance cannot generate ephemeral key pairs.
    #[error("FHEVM instance does not expose key pair generation")]
    MissingKeypairGenerator,

    /// The instance's EIP-712 document has no usable signing type.
    #[error("EIP-712 data contains neither `{primary_type}` nor `UserDecryptRequestVerification`")]
    MissingSigningType { primary_type: String },

    #[error("At least one contract address is required")]
    EmptyContractList,

    #[error("Invalid contract address `{address}`: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("FHEVM instance error: {0}")]
    Instance(#[from] FhevmError),

    #[error("Signer error: {0}")]
    Signer(#[from] SignerError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SignatureError {
    /// Whether the user explicitly declined the signing prompt.
    pub fn is_rejection(&self) -> bool {
        matches!(self, SignatureError::Signer(SignerError::Rejected(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_is_detected() {
        let err = SignatureError::from(SignerError::Rejected("user denied".into()));
        assert!(err.is_rejection());
        assert!(!SignatureError::EmptyContractList.is_rejection());
    }

    #[test]
    fn messages_name_the_cause() {
        let err = SignatureError::MissingSigningType {
            primary_type: "Custom".to_string(),
        };
        assert!(err.to_string().contains("Custom"));

        let err = SignatureError::from(FhevmError::KeyGeneration("no entropy".into()));
        assert_eq!(err.to_string(), "FHEVM instance error: Key pair generation failed: no entropy");
    }
}
