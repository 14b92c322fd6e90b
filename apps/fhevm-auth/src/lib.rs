// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! FHEVM Auth - Decryption Authorization Cache
//!
//! A user who wants to read confidential values from FHEVM contracts signs an
//! EIP-712 authorization binding a one-time key pair to a set of contracts
//! for a number of days. This crate obtains that signature once and reuses it
//! until it expires.
//!
//! ## Modules
//!
//! - `signature` - Load-or-sign flow and the cached record
//! - `storage` - String key-value stores and the public-material cache
//! - `fhevm` - Instance capabilities (key pairs, EIP-712, user decryption)
//! - `blockchain` - EIP-712 payloads, signers, chain id discovery
//! - `config` / `telemetry` - Environment configuration and logging

pub mod blockchain;
pub mod clock;
pub mod config;
pub mod error;
pub mod fhevm;
pub mod signature;
pub mod state;
pub mod storage;
pub mod telemetry;

pub use config::AuthConfig;
pub use error::SignatureError;
pub use signature::{DecryptionSignature, DecryptionSignatureManager};
pub use state::AuthState;
