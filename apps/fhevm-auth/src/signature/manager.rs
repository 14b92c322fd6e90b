// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Load-or-sign flow for decryption authorizations.
//!
//! ## Flow
//!
//! 1. Resolve the user address from the signer
//! 2. Derive the cache key from the user and the sorted contract set
//! 3. Return the cached record if it parses and its window is still open
//! 4. Otherwise generate an ephemeral key pair, build the EIP-712 payload
//!    (instance document or manual fallback), ask the user to sign, and
//!    persist the new record under the same key
//!
//! A valid cached record never triggers a second signing prompt. Calls for
//! the same key are serialised so concurrent readers share one prompt.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use alloy::primitives::{Address, U256};
use alloy::sol_types::Eip712Domain;

use super::record::{ensure_hex_prefix, storage_key, DecryptionSignature};
use crate::blockchain::{
    DecryptionSigner, TypeSchema, TypedDataPayload, TypedField, DEFAULT_FALLBACK_CHAIN_ID,
    EIP712_DOMAIN_TYPE,
};
use crate::clock::{Clock, SystemClock};
use crate::config::AuthConfig;
use crate::error::SignatureError;
use crate::fhevm::{Eip712Document, FhevmInstance, InstanceCapabilities};
use crate::storage::StringStorage;

/// Default authorization window.
pub const DEFAULT_DURATION_DAYS: u64 = 365;

/// EIP-712 primary type of a user decryption request.
pub const USER_DECRYPT_PRIMARY_TYPE: &str = "UserDecryptRequestVerification";

/// Domain name of the manually built authorization.
pub const FALLBACK_DOMAIN_NAME: &str = "Authorization token";

/// Placeholder `extraData` of the manually built authorization.
pub const FALLBACK_EXTRA_DATA: &str = "0x00";

/// Per-key async locks for in-flight signing requests.
#[derive(Default)]
struct InFlight {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl InFlight {
    fn acquire(&self, key: &str) -> InFlightGuard<'_> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = locks.entry(key.to_string()).or_default().clone();
        InFlightGuard {
            in_flight: self,
            key: key.to_string(),
            lock,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Holds a key's lock handle and drops the map entry once nobody else is
/// waiting on it, including when the request future is cancelled.
struct InFlightGuard<'a> {
    in_flight: &'a InFlight,
    key: String,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self
            .in_flight
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one held here.
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.key);
        }
    }
}

/// Caches decryption authorizations per `(user, contract set)`.
pub struct DecryptionSignatureManager {
    storage: Arc<dyn StringStorage>,
    clock: Arc<dyn Clock>,
    fallback_chain_id: u64,
    in_flight: InFlight,
}

impl DecryptionSignatureManager {
    /// Create a manager over `storage` using the system clock.
    pub fn new(storage: Arc<dyn StringStorage>) -> Self {
        Self {
            storage,
            clock: Arc::new(SystemClock),
            fallback_chain_id: DEFAULT_FALLBACK_CHAIN_ID,
            in_flight: InFlight::default(),
        }
    }

    pub fn from_config(storage: Arc<dyn StringStorage>, config: &AuthConfig) -> Self {
        Self::new(storage).with_fallback_chain_id(config.fallback_chain_id)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Chain id used when the signer cannot report one.
    pub fn with_fallback_chain_id(mut self, chain_id: u64) -> Self {
        self.fallback_chain_id = chain_id;
        self
    }

    pub fn storage(&self) -> &Arc<dyn StringStorage> {
        &self.storage
    }

    /// Return a valid authorization, signing a new one if needed.
    ///
    /// `None` means no authorization could be obtained (missing capability,
    /// rejected prompt, signer failure). The cause is logged; use
    /// [`Self::try_load_or_sign`] to inspect it.
    pub async fn load_or_sign(
        &self,
        instance: &dyn FhevmInstance,
        contract_addresses: &[String],
        signer: &dyn DecryptionSigner,
        duration_days: u64,
    ) -> Option<DecryptionSignature> {
        match self
            .try_load_or_sign(instance, contract_addresses, signer, duration_days)
            .await
        {
            Ok(signature) => Some(signature),
            Err(e) if e.is_rejection() => {
                tracing::warn!(error = %e, "User rejected decryption signature request");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create decryption signature");
                None
            }
        }
    }

    /// Same as [`Self::load_or_sign`], keeping the failure cause.
    pub async fn try_load_or_sign(
        &self,
        instance: &dyn FhevmInstance,
        contract_addresses: &[String],
        signer: &dyn DecryptionSigner,
        duration_days: u64,
    ) -> Result<DecryptionSignature, SignatureError> {
        if contract_addresses.is_empty() {
            return Err(SignatureError::EmptyContractList);
        }

        let user_address = signer.address().await?;
        let key = storage_key(&user_address, contract_addresses);

        let in_flight = self.in_flight.acquire(&key);
        let _held = in_flight.lock.lock().await;
        self.load_or_sign_locked(
            &key,
            &user_address,
            instance,
            contract_addresses,
            signer,
            duration_days,
        )
        .await
    }

    /// Look up the cached record without ever signing.
    pub async fn cached(
        &self,
        signer: &dyn DecryptionSigner,
        contract_addresses: &[String],
    ) -> Result<Option<DecryptionSignature>, SignatureError> {
        let user_address = signer.address().await?;
        Ok(self.load_cached(&storage_key(&user_address, contract_addresses)))
    }

    /// Remove the cached authorization for `(user, contracts)`.
    pub fn forget(
        &self,
        user_address: &str,
        contract_addresses: &[String],
    ) -> Result<(), SignatureError> {
        let key = storage_key(user_address, contract_addresses);
        self.storage.remove(&key)?;
        tracing::info!(user = %user_address, key = %key, "Removed cached decryption signature");
        Ok(())
    }

    async fn load_or_sign_locked(
        &self,
        key: &str,
        user_address: &str,
        instance: &dyn FhevmInstance,
        contract_addresses: &[String],
        signer: &dyn DecryptionSigner,
        duration_days: u64,
    ) -> Result<DecryptionSignature, SignatureError> {
        if let Some(cached) = self.load_cached(key) {
            tracing::info!(user = %user_address, key = %key, "Using cached decryption signature");
            return Ok(cached);
        }

        tracing::info!(
            user = %user_address,
            contracts = contract_addresses.len(),
            duration_days,
            "Creating new decryption signature"
        );
        let signature = self
            .sign(instance, contract_addresses, signer, user_address, duration_days)
            .await?;

        match serde_json::to_string(&signature) {
            Ok(serialized) => match self.storage.set(key, &serialized) {
                Ok(()) => tracing::info!(key = %key, "Decryption signature cached"),
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "Failed to cache decryption signature")
                }
            },
            Err(e) => {
                tracing::error!(key = %key, error = %e, "Failed to serialize decryption signature")
            }
        }

        Ok(signature)
    }

    /// Read and validate the record under `key`. Anything unusable is a miss.
    fn load_cached(&self, key: &str) -> Option<DecryptionSignature> {
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read cached signature");
                return None;
            }
        };

        match serde_json::from_str::<DecryptionSignature>(&raw) {
            Ok(signature) if signature.is_valid_at(self.clock.now()) => Some(signature),
            Ok(signature) => {
                tracing::debug!(
                    key = %key,
                    expired_at = signature.expires_at(),
                    "Cached signature expired"
                );
                None
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to parse cached signature");
                None
            }
        }
    }

    async fn sign(
        &self,
        instance: &dyn FhevmInstance,
        contract_addresses: &[String],
        signer: &dyn DecryptionSigner,
        user_address: &str,
        duration_days: u64,
    ) -> Result<DecryptionSignature, SignatureError> {
        let capabilities = instance.capabilities();
        let capability = capabilities.label();
        let keypair_generator = match &capabilities {
            InstanceCapabilities::FullDocumentBuilder { keypair, .. } => *keypair,
            InstanceCapabilities::KeypairOnly(keypair) => *keypair,
            InstanceCapabilities::Unsupported => {
                tracing::error!(capability, "FHEVM instance cannot generate key pairs");
                return Err(SignatureError::MissingKeypairGenerator);
            }
        };

        let keypair = keypair_generator.generate_keypair()?;
        let public_key = ensure_hex_prefix(&keypair.public_key);
        let private_key = ensure_hex_prefix(&keypair.private_key);

        let start_timestamp = self.clock.now();

        let payload = match &capabilities {
            InstanceCapabilities::FullDocumentBuilder { eip712, .. } => {
                tracing::debug!(capability, "Using instance EIP-712 helper");
                let document = eip712.create_eip712(
                    &public_key,
                    contract_addresses,
                    start_timestamp,
                    duration_days,
                )?;
                payload_from_document(document)?
            }
            _ => {
                tracing::warn!(
                    capability,
                    "EIP-712 helper unavailable, building domain manually"
                );
                let chain_id = self.resolve_chain_id(signer).await;
                fallback_payload(
                    chain_id,
                    &public_key,
                    contract_addresses,
                    start_timestamp,
                    duration_days,
                )?
            }
        };

        tracing::debug!(primary_type = %payload.primary_type, "Requesting EIP-712 signature");
        let signature = signer.sign_typed_data(&payload).await?;

        tracing::info!(user = %user_address, "Decryption signature created");

        Ok(DecryptionSignature {
            private_key,
            public_key,
            signature: ensure_hex_prefix(&signature),
            contract_addresses: contract_addresses.to_vec(),
            user_address: user_address.to_string(),
            start_timestamp,
            duration_days,
        })
    }

    /// Signer chain id, or the configured fallback.
    async fn resolve_chain_id(&self, signer: &dyn DecryptionSigner) -> u64 {
        match signer.chain_id().await {
            Ok(Some(chain_id)) if chain_id != 0 => chain_id,
            Ok(_) => {
                tracing::warn!(
                    fallback = self.fallback_chain_id,
                    "Signer reported no chain id, using fallback"
                );
                self.fallback_chain_id
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback = self.fallback_chain_id,
                    "Failed to resolve chain id, using fallback"
                );
                self.fallback_chain_id
            }
        }
    }
}

/// Reduce an instance document to the single signing type.
///
/// The `EIP712Domain` entry is dropped because the signer receives the
/// domain separately.
fn payload_from_document(document: Eip712Document) -> Result<TypedDataPayload, SignatureError> {
    let Eip712Document {
        domain,
        mut types,
        message,
        primary_type,
    } = document;

    types.remove(EIP712_DOMAIN_TYPE);

    let primary_type = primary_type.unwrap_or_else(|| USER_DECRYPT_PRIMARY_TYPE.to_string());
    let (name, fields) = match types.remove_entry(&primary_type) {
        Some(entry) => entry,
        None => types
            .remove_entry(USER_DECRYPT_PRIMARY_TYPE)
            .ok_or(SignatureError::MissingSigningType { primary_type })?,
    };

    Ok(TypedDataPayload {
        domain,
        types: TypeSchema::from([(name.clone(), fields)]),
        primary_type: name,
        message,
    })
}

/// Build the authorization by hand for instances without an EIP-712 helper.
fn fallback_payload(
    chain_id: u64,
    public_key: &str,
    contract_addresses: &[String],
    start_timestamp: u64,
    duration_days: u64,
) -> Result<TypedDataPayload, SignatureError> {
    let first = contract_addresses
        .first()
        .ok_or(SignatureError::EmptyContractList)?;
    let verifying_contract: Address = first.parse().map_err(|e| SignatureError::InvalidAddress {
        address: first.clone(),
        reason: format!("{e}"),
    })?;

    let domain = Eip712Domain::new(
        Some(FALLBACK_DOMAIN_NAME.into()),
        Some("1".into()),
        Some(U256::from(chain_id)),
        Some(verifying_contract),
        None,
    );

    let types = TypeSchema::from([(
        USER_DECRYPT_PRIMARY_TYPE.to_string(),
        vec![
            TypedField::new("publicKey", "bytes"),
            TypedField::new("contractAddresses", "address[]"),
            TypedField::new("contractsChainId", "uint256"),
            TypedField::new("startTimestamp", "uint256"),
            TypedField::new("durationDays", "uint256"),
            TypedField::new("extraData", "bytes"),
        ],
    )]);

    let message = serde_json::json!({
        "publicKey": public_key,
        "contractAddresses": contract_addresses,
        "contractsChainId": chain_id,
        "startTimestamp": start_timestamp,
        "durationDays": duration_days,
        "extraData": FALLBACK_EXTRA_DATA,
    });

    Ok(TypedDataPayload {
        domain,
        types,
        primary_type: USER_DECRYPT_PRIMARY_TYPE.to_string(),
        message,
    })
}
