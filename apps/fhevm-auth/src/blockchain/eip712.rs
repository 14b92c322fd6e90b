// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EIP-712 typed data as handed to a [`super::DecryptionSigner`].
//!
//! The payload keeps the domain apart from the type schema, the way wallet
//! `signTypedData(domain, types, message)` APIs expect it. The schema never
//! contains an `EIP712Domain` entry; [`TypedDataPayload::to_typed_data`]
//! derives one from the domain when a full alloy [`TypedData`] is needed.

use std::collections::BTreeMap;

use alloy::{dyn_abi::TypedData, primitives::B256, sol_types::Eip712Domain};
use serde::{Deserialize, Serialize};

use super::signing::SignerError;

/// Name of the domain type inside an EIP-712 `types` map.
pub const EIP712_DOMAIN_TYPE: &str = "EIP712Domain";

/// A single `{ name, type }` member of an EIP-712 struct type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl TypedField {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// EIP-712 struct type definitions keyed by type name.
pub type TypeSchema = BTreeMap<String, Vec<TypedField>>;

/// Everything a signer needs to produce an EIP-712 signature.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedDataPayload {
    pub domain: Eip712Domain,
    pub types: TypeSchema,
    pub primary_type: String,
    pub message: serde_json::Value,
}

impl TypedDataPayload {
    /// Assemble the alloy representation (domain type included).
    pub fn to_typed_data(&self) -> Result<TypedData, SignerError> {
        let mut types = serde_json::Map::new();
        types.insert(
            EIP712_DOMAIN_TYPE.to_string(),
            to_json(&domain_fields(&self.domain))?,
        );
        for (name, fields) in &self.types {
            types.insert(name.clone(), to_json(fields)?);
        }

        let document = serde_json::json!({
            "types": types,
            "primaryType": self.primary_type,
            "domain": to_json(&self.domain)?,
            "message": self.message,
        });

        serde_json::from_value(document)
            .map_err(|e| SignerError::InvalidTypedData(e.to_string()))
    }

    /// The EIP-712 digest a wallet signs for this payload.
    pub fn signing_hash(&self) -> Result<B256, SignerError> {
        self.to_typed_data()?
            .eip712_signing_hash()
            .map_err(|e| SignerError::InvalidTypedData(e.to_string()))
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, SignerError> {
    serde_json::to_value(value).map_err(|e| SignerError::InvalidTypedData(e.to_string()))
}

/// `EIP712Domain` members for the fields present in `domain`.
fn domain_fields(domain: &Eip712Domain) -> Vec<TypedField> {
    let mut fields = Vec::with_capacity(5);
    if domain.name.is_some() {
        fields.push(TypedField::new("name", "string"));
    }
    if domain.version.is_some() {
        fields.push(TypedField::new("version", "string"));
    }
    if domain.chain_id.is_some() {
        fields.push(TypedField::new("chainId", "uint256"));
    }
    if domain.verifying_contract.is_some() {
        fields.push(TypedField::new("verifyingContract", "address"));
    }
    if domain.salt.is_some() {
        fields.push(TypedField::new("salt", "bytes32"));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, U256};

    fn mail_payload() -> TypedDataPayload {
        TypedDataPayload {
            domain: Eip712Domain::new(
                Some("Ether Mail".into()),
                Some("1".into()),
                Some(U256::from(1u64)),
                Some(address!("CcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC")),
                None,
            ),
            types: TypeSchema::from([(
                "Note".to_string(),
                vec![
                    TypedField::new("owner", "address"),
                    TypedField::new("amount", "uint256"),
                ],
            )]),
            primary_type: "Note".to_string(),
            message: serde_json::json!({
                "owner": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826",
                "amount": 7,
            }),
        }
    }

    #[test]
    fn typed_field_serializes_type_key() {
        let json = serde_json::to_value(TypedField::new("publicKey", "bytes")).unwrap();
        assert_eq!(json, serde_json::json!({"name": "publicKey", "type": "bytes"}));
    }

    #[test]
    fn domain_fields_follow_present_members() {
        let payload = mail_payload();
        let names: Vec<_> = domain_fields(&payload.domain)
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, ["name", "version", "chainId", "verifyingContract"]);
    }

    #[test]
    fn converts_to_alloy_typed_data() {
        let typed = mail_payload().to_typed_data().unwrap();
        assert_eq!(typed.primary_type, "Note");
        assert_eq!(typed.domain, mail_payload().domain);
    }

    #[test]
    fn signing_hash_depends_on_message() {
        let a = mail_payload();
        let mut b = mail_payload();
        b.message["amount"] = serde_json::json!(8);

        assert_ne!(a.signing_hash().unwrap(), b.signing_hash().unwrap());
        assert_eq!(a.signing_hash().unwrap(), mail_payload().signing_hash().unwrap());
    }

    #[test]
    fn unknown_primary_type_is_rejected() {
        let mut payload = mail_payload();
        payload.primary_type = "Missing".to_string();
        assert!(matches!(
            payload.signing_hash(),
            Err(SignerError::InvalidTypedData(_))
        ));
    }
}
