// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM integration for decryption authorization.
//!
//! This module provides:
//! - EIP-712 typed data payloads
//! - The signer capability consumed by the signature cache
//! - Chain id discovery over JSON-RPC

pub mod client;
pub mod eip712;
pub mod signing;
pub mod types;

pub use client::ChainClient;
pub use eip712::{TypeSchema, TypedDataPayload, TypedField, EIP712_DOMAIN_TYPE};
pub use signing::{DecryptionSigner, SignerError, WalletSigner};
pub use types::*;
