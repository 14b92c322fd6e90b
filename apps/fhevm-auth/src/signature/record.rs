// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The cached decryption authorization and its storage key.

use std::collections::BTreeMap;
use std::fmt;

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::clock::SECONDS_PER_DAY;
use crate::fhevm::{FhevmError, HandleContractPair, UserDecryptRequest, UserDecryptor};

/// Prefix of every signature cache key.
pub const STORAGE_KEY_PREFIX: &str = "fhevm_sig_";

/// A user's signed authorization to decrypt values of a set of contracts
/// with a one-time key pair, for a bounded window.
///
/// Serialized with the camelCase field names used by browser clients so that
/// caches written by either side stay readable.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptionSignature {
    /// Ephemeral private key. Never leaves the backing store entry.
    pub private_key: String,
    /// Ephemeral public key bound by the signature.
    pub public_key: String,
    /// The user's EIP-712 signature.
    pub signature: String,
    /// Contracts covered, in the order they were signed.
    pub contract_addresses: Vec<String>,
    pub user_address: String,
    /// Start of the window (Unix seconds).
    pub start_timestamp: u64,
    pub duration_days: u64,
}

impl fmt::Debug for DecryptionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptionSignature")
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .field("signature", &self.signature)
            .field("contract_addresses", &self.contract_addresses)
            .field("user_address", &self.user_address)
            .field("start_timestamp", &self.start_timestamp)
            .field("duration_days", &self.duration_days)
            .finish()
    }
}

impl DecryptionSignature {
    /// First second at which the authorization is no longer valid.
    pub fn expires_at(&self) -> u64 {
        self.start_timestamp
            .saturating_add(self.duration_days.saturating_mul(SECONDS_PER_DAY))
    }

    /// `now < start + duration`. A window ending exactly at `now` is expired.
    pub fn is_valid_at(&self, now: u64) -> bool {
        now < self.expires_at()
    }

    /// Whether `contract` is one of the authorized contracts.
    pub fn covers(&self, contract: &str) -> bool {
        self.contract_addresses
            .iter()
            .any(|c| c.eq_ignore_ascii_case(contract))
    }

    /// Decrypt `items` with this authorization.
    pub async fn decrypt_with(
        &self,
        decryptor: &dyn UserDecryptor,
        items: &[HandleContractPair],
    ) -> Result<BTreeMap<String, U256>, FhevmError> {
        if items.is_empty() {
            return Ok(BTreeMap::new());
        }

        decryptor
            .user_decrypt(UserDecryptRequest {
                items,
                private_key: &self.private_key,
                public_key: &self.public_key,
                signature: &self.signature,
                contract_addresses: &self.contract_addresses,
                user_address: &self.user_address,
                start_timestamp: self.start_timestamp,
                duration_days: self.duration_days,
            })
            .await
    }
}

/// Cache key for `(user, set of contracts)`.
///
/// Contracts are sorted (byte-wise, case-sensitive) so any ordering of the
/// same set maps to the same key.
pub fn storage_key<S: AsRef<str>>(user_address: &str, contract_addresses: &[S]) -> String {
    let mut sorted: Vec<&str> = contract_addresses.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();
    format!("{STORAGE_KEY_PREFIX}{user_address}_{}", sorted.join("_"))
}

/// Prefix `value` with `0x` unless it already is.
pub fn ensure_hex_prefix(value: &str) -> String {
    if value.starts_with("0x") {
        value.to_string()
    } else {
        format!("0x{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn record(start: u64, days: u64) -> DecryptionSignature {
        DecryptionSignature {
            private_key: "0xsecret".to_string(),
            public_key: "0xpublic".to_string(),
            signature: "0xsig".to_string(),
            contract_addresses: vec!["0xB".to_string(), "0xA".to_string()],
            user_address: "0xAAA".to_string(),
            start_timestamp: start,
            duration_days: days,
        }
    }

    #[test]
    fn storage_key_sorts_contracts() {
        assert_eq!(
            storage_key("0xAAA", &["0x02", "0x01"]),
            "fhevm_sig_0xAAA_0x01_0x02"
        );
        assert_eq!(
            storage_key("0xAAA", &["0x01", "0x02"]),
            storage_key("0xAAA", &["0x02", "0x01"])
        );
    }

    #[test]
    fn storage_key_is_case_sensitive() {
        assert_ne!(storage_key("0xAAA", &["0xab"]), storage_key("0xAAA", &["0xAB"]));
        // Upper-case hex digits sort before lower-case ones.
        assert_eq!(storage_key("u", &["0xab", "0xAB"]), "fhevm_sig_u_0xAB_0xab");
    }

    #[test]
    fn validity_is_strict() {
        let sig = record(1_000, 1);
        assert_eq!(sig.expires_at(), 1_000 + SECONDS_PER_DAY);
        assert!(sig.is_valid_at(1_000));
        assert!(sig.is_valid_at(1_000 + SECONDS_PER_DAY - 1));
        assert!(!sig.is_valid_at(1_000 + SECONDS_PER_DAY));
    }

    #[test]
    fn expiry_does_not_overflow() {
        let sig = record(u64::MAX - 10, u64::MAX);
        assert_eq!(sig.expires_at(), u64::MAX);
        assert!(sig.is_valid_at(u64::MAX - 1));
    }

    #[test]
    fn zero_day_window_is_never_valid() {
        assert!(!record(1_000, 0).is_valid_at(1_000));
    }

    #[test]
    fn serializes_with_client_field_names() {
        let json = serde_json::to_value(record(5, 365)).unwrap();
        for field in [
            "privateKey",
            "publicKey",
            "signature",
            "contractAddresses",
            "userAddress",
            "startTimestamp",
            "durationDays",
        ] {
            assert!(json.get(field).is_some(), "missing {field}");
        }

        let back: DecryptionSignature = serde_json::from_value(json).unwrap();
        assert_eq!(back, record(5, 365));
    }

    #[test]
    fn debug_redacts_private_key() {
        let rendered = format!("{:?}", record(0, 1));
        assert!(!rendered.contains("0xsecret"));
        assert!(rendered.contains("0xpublic"));
    }

    #[test]
    fn covers_ignores_case() {
        let sig = record(0, 1);
        assert!(sig.covers("0xa"));
        assert!(!sig.covers("0xC"));
    }

    #[test]
    fn hex_prefix_added_once() {
        assert_eq!(ensure_hex_prefix("abcd"), "0xabcd");
        assert_eq!(ensure_hex_prefix("0xabcd"), "0xabcd");
    }

    struct EchoDecryptor {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl UserDecryptor for EchoDecryptor {
        async fn user_decrypt(
            &self,
            request: UserDecryptRequest<'_>,
        ) -> Result<BTreeMap<String, U256>, FhevmError> {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}:{}", request.user_address, request.private_key));
            Ok(request
                .items
                .iter()
                .map(|item| (item.handle.clone(), U256::from(42u64)))
                .collect())
        }
    }

    #[tokio::test]
    async fn decrypt_with_forwards_the_record() {
        let decryptor = EchoDecryptor {
            seen: Mutex::new(Vec::new()),
        };
        let items = vec![HandleContractPair {
            handle: "0x01".to_string(),
            contract_address: "0xA".to_string(),
        }];

        let values = record(0, 1).decrypt_with(&decryptor, &items).await.unwrap();
        assert_eq!(values["0x01"], U256::from(42u64));
        assert_eq!(*decryptor.seen.lock().unwrap(), vec!["0xAAA:0xsecret".to_string()]);
    }

    #[tokio::test]
    async fn decrypt_with_no_items_skips_the_instance() {
        let decryptor = EchoDecryptor {
            seen: Mutex::new(Vec::new()),
        };
        let values = record(0, 1).decrypt_with(&decryptor, &[]).await.unwrap();
        assert!(values.is_empty());
        assert!(decryptor.seen.lock().unwrap().is_empty());
    }
}
