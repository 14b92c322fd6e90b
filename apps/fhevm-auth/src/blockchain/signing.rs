// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Message-signing capability used to authorize user decryption.
//!
//! [`DecryptionSigner`] is what the signature cache consumes: an address, a
//! best-effort chain id, and EIP-712 typed data signing. A browser wallet
//! bridge, a hardware wallet, or the local [`WalletSigner`] can sit behind it.

use alloy::signers::{local::PrivateKeySigner, Signer};
use async_trait::async_trait;

use super::client::ChainClient;
use super::eip712::TypedDataPayload;

/// Errors surfaced by a signer capability.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Invalid typed data: {0}")]
    InvalidTypedData(String),

    /// The user declined the signing prompt.
    #[error("Signature request rejected: {0}")]
    Rejected(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

/// A signer able to authorize decryption on behalf of a user.
#[async_trait]
pub trait DecryptionSigner: Send + Sync {
    /// The user address the signature will be attributed to.
    async fn address(&self) -> Result<String, SignerError>;

    /// Chain id of the network the signer is connected to, if known.
    async fn chain_id(&self) -> Result<Option<u64>, SignerError>;

    /// Sign EIP-712 typed data and return the `0x`-prefixed signature.
    ///
    /// For interactive wallets this may wait on the user indefinitely.
    async fn sign_typed_data(&self, payload: &TypedDataPayload) -> Result<String, SignerError>;
}

/// Local-key signer (tests, scripts, server-side relayers).
pub struct WalletSigner {
    signer: PrivateKeySigner,
    chain_id: Option<u64>,
    client: Option<ChainClient>,
}

impl WalletSigner {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self {
            signer,
            chain_id: None,
            client: None,
        }
    }

    /// Create a signer from a hex private key (with or without `0x`).
    pub fn from_hex(private_key_hex: &str) -> Result<Self, SignerError> {
        let trimmed = private_key_hex.trim();
        let key_bytes = alloy::hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed))
            .map_err(|e| SignerError::InvalidPrivateKey(e.to_string()))?;

        let signer = PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| SignerError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self::new(signer))
    }

    /// Report a fixed chain id instead of asking the network.
    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Resolve the chain id over RPC when no fixed id is configured.
    pub fn with_client(mut self, client: ChainClient) -> Self {
        self.client = Some(client);
        self
    }

    /// The underlying alloy address.
    pub fn alloy_address(&self) -> alloy::primitives::Address {
        self.signer.address()
    }
}

#[async_trait]
impl DecryptionSigner for WalletSigner {
    async fn address(&self) -> Result<String, SignerError> {
        Ok(self.signer.address().to_checksum(None))
    }

    async fn chain_id(&self) -> Result<Option<u64>, SignerError> {
        if let Some(chain_id) = self.chain_id {
            return Ok(Some(chain_id));
        }
        match &self.client {
            Some(client) => client.get_chain_id().await.map(Some),
            None => Ok(None),
        }
    }

    async fn sign_typed_data(&self, payload: &TypedDataPayload) -> Result<String, SignerError> {
        let typed = payload.to_typed_data()?;
        let signature = self
            .signer
            .sign_dynamic_typed_data(&typed)
            .await
            .map_err(|e| SignerError::Signing(e.to_string()))?;
        Ok(alloy::hex::encode_prefixed(signature.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::eip712::{TypeSchema, TypedField};
    use alloy::primitives::{Address, Signature, U256};
    use alloy::sol_types::Eip712Domain;

    // Hardhat account #0
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn payload() -> TypedDataPayload {
        TypedDataPayload {
            domain: Eip712Domain::new(
                Some("Authorization token".into()),
                Some("1".into()),
                Some(U256::from(31337u64)),
                Some(Address::ZERO),
                None,
            ),
            types: TypeSchema::from([(
                "Ping".to_string(),
                vec![TypedField::new("value", "uint256")],
            )]),
            primary_type: "Ping".to_string(),
            message: serde_json::json!({ "value": 1 }),
        }
    }

    #[test]
    fn from_hex_accepts_both_prefix_forms() {
        let with = WalletSigner::from_hex(TEST_KEY).unwrap();
        let without = WalletSigner::from_hex(&TEST_KEY[2..]).unwrap();
        assert_eq!(with.alloy_address(), without.alloy_address());
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert!(matches!(
            WalletSigner::from_hex("0xnot-hex"),
            Err(SignerError::InvalidPrivateKey(_))
        ));
        assert!(matches!(
            WalletSigner::from_hex("0x01"),
            Err(SignerError::InvalidPrivateKey(_))
        ));
    }

    #[tokio::test]
    async fn address_is_checksummed() {
        let signer = WalletSigner::from_hex(TEST_KEY).unwrap();
        assert_eq!(signer.address().await.unwrap(), TEST_ADDRESS);
    }

    #[tokio::test]
    async fn chain_id_prefers_fixed_value() {
        let signer = WalletSigner::from_hex(TEST_KEY).unwrap();
        assert_eq!(signer.chain_id().await.unwrap(), None);

        let signer = signer.with_chain_id(11155111);
        assert_eq!(signer.chain_id().await.unwrap(), Some(11155111));
    }

    #[tokio::test]
    async fn typed_data_signature_recovers_signer() {
        let signer = WalletSigner::from_hex(TEST_KEY).unwrap();
        let payload = payload();

        let hex_sig = signer.sign_typed_data(&payload).await.unwrap();
        assert!(hex_sig.starts_with("0x"));
        assert_eq!(hex_sig.len(), 2 + 65 * 2);

        let bytes = alloy::hex::decode(&hex_sig).unwrap();
        let signature = Signature::try_from(bytes.as_slice()).unwrap();
        let recovered = signature
            .recover_address_from_prehash(&payload.signing_hash().unwrap())
            .unwrap();
        assert_eq!(recovered, signer.alloy_address());
    }
}
