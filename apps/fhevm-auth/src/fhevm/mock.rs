// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Local FHEVM instance for Hardhat mock mode and tests.
//!
//! Key pairs are real secp256k1 keys so that every authorization gets a
//! fresh, unpredictable ephemeral key. No homomorphic material is involved.

use alloy::primitives::{Address, U256};
use alloy::sol_types::Eip712Domain;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::SecretKey;
use rand::rngs::OsRng;

use super::instance::{
    Eip712Builder, Eip712Document, EphemeralKeypair, FhevmError, FhevmInstance,
    InstanceCapabilities, KeypairGenerator,
};
use crate::blockchain::{
    TypeSchema, TypedField, EIP712_DOMAIN_TYPE, MOCK_DECRYPTION_VERIFYING_CONTRACT,
    MOCK_GATEWAY_CHAIN_ID,
};
use crate::signature::USER_DECRYPT_PRIMARY_TYPE;

/// EIP-712 domain name used by the decryption gateway.
pub const DECRYPTION_DOMAIN_NAME: &str = "Decryption";

/// Mock instance configuration.
#[derive(Debug, Clone)]
pub struct MockFhevmConfig {
    pub gateway_chain_id: u64,
    pub verifying_contract_decryption: Address,
}

impl Default for MockFhevmConfig {
    fn default() -> Self {
        Self {
            gateway_chain_id: MOCK_GATEWAY_CHAIN_ID,
            verifying_contract_decryption: MOCK_DECRYPTION_VERIFYING_CONTRACT
                .parse()
                .unwrap_or(Address::ZERO),
        }
    }
}

/// In-process FHEVM instance.
#[derive(Debug, Clone, Default)]
pub struct MockFhevmInstance {
    config: MockFhevmConfig,
    eip712: bool,
}

impl MockFhevmInstance {
    /// Instance that only generates key pairs.
    pub fn keypair_only() -> Self {
        Self::default()
    }

    /// Instance that also builds the gateway EIP-712 document.
    pub fn with_eip712() -> Self {
        Self {
            eip712: true,
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: MockFhevmConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MockFhevmConfig {
        &self.config
    }
}

impl KeypairGenerator for MockFhevmInstance {
    fn generate_keypair(&self) -> Result<EphemeralKeypair, FhevmError> {
        let secret = SecretKey::random(&mut OsRng);
        let public = secret.public_key().to_encoded_point(true);
        Ok(EphemeralKeypair {
            public_key: alloy::hex::encode(public.as_bytes()),
            private_key: alloy::hex::encode(secret.to_bytes()),
        })
    }
}

impl Eip712Builder for MockFhevmInstance {
    fn create_eip712(
        &self,
        public_key: &str,
        contract_addresses: &[String],
        start_timestamp: u64,
        duration_days: u64,
    ) -> Result<Eip712Document, FhevmError> {
        let domain = Eip712Domain::new(
            Some(DECRYPTION_DOMAIN_NAME.into()),
            Some("1".into()),
            Some(U256::from(self.config.gateway_chain_id)),
            Some(self.config.verifying_contract_decryption),
            None,
        );

        let types = TypeSchema::from([
            (
                EIP712_DOMAIN_TYPE.to_string(),
                vec![
                    TypedField::new("name", "string"),
                    TypedField::new("version", "string"),
                    TypedField::new("chainId", "uint256"),
                    TypedField::new("verifyingContract", "address"),
                ],
            ),
            (
                USER_DECRYPT_PRIMARY_TYPE.to_string(),
                vec![
                    TypedField::new("publicKey", "bytes"),
                    TypedField::new("contractAddresses", "address[]"),
                    TypedField::new("startTimestamp", "uint256"),
                    TypedField::new("durationDays", "uint256"),
                    TypedField::new("extraData", "bytes"),
                ],
            ),
        ]);

        Ok(Eip712Document {
            domain,
            types,
            message: serde_json::json!({
                "publicKey": public_key,
                "contractAddresses": contract_addresses,
                "startTimestamp": start_timestamp,
                "durationDays": duration_days,
                "extraData": "0x00",
            }),
            primary_type: Some(USER_DECRYPT_PRIMARY_TYPE.to_string()),
        })
    }
}

impl FhevmInstance for MockFhevmInstance {
    fn capabilities(&self) -> InstanceCapabilities<'_> {
        if self.eip712 {
            InstanceCapabilities::FullDocumentBuilder {
                keypair: self,
                eip712: self,
            }
        } else {
            InstanceCapabilities::KeypairOnly(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypairs_are_fresh_and_well_formed() {
        let instance = MockFhevmInstance::keypair_only();
        let a = instance.generate_keypair().unwrap();
        let b = instance.generate_keypair().unwrap();

        assert_ne!(a.private_key, b.private_key);
        assert_eq!(a.private_key.len(), 64);
        // Compressed SEC1 point
        assert_eq!(a.public_key.len(), 66);
        assert!(alloy::hex::decode(&a.public_key).is_ok());
    }

    #[test]
    fn capabilities_follow_construction() {
        assert_eq!(
            MockFhevmInstance::keypair_only().capabilities().label(),
            "keypair_only"
        );
        assert_eq!(
            MockFhevmInstance::with_eip712().capabilities().label(),
            "full_document_builder"
        );
    }

    #[test]
    fn eip712_document_matches_gateway_layout() {
        let instance = MockFhevmInstance::with_eip712();
        let contracts = vec!["0x00000000000000000000000000000000000000c1".to_string()];
        let doc = instance
            .create_eip712("0xabcd", &contracts, 1_700_000_000, 10)
            .unwrap();

        assert_eq!(doc.primary_type.as_deref(), Some(USER_DECRYPT_PRIMARY_TYPE));
        assert!(doc.types.contains_key(EIP712_DOMAIN_TYPE));
        assert_eq!(doc.types[USER_DECRYPT_PRIMARY_TYPE].len(), 5);
        assert_eq!(doc.domain.chain_id, Some(U256::from(MOCK_GATEWAY_CHAIN_ID)));
        assert_eq!(doc.message["contractAddresses"][0], contracts[0]);
        assert_eq!(doc.message["durationDays"], 10);
    }

    #[test]
    fn default_verifying_contract_parses() {
        assert_ne!(
            MockFhevmConfig::default().verifying_contract_decryption,
            Address::ZERO
        );
    }
}
