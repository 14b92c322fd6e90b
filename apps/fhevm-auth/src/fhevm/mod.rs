// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Confidential-computation (FHEVM) instance capabilities.
//!
//! Key generation, EIP-712 document construction and user decryption are
//! owned by the instance. This crate only consumes them.

pub mod decrypt;
pub mod instance;
pub mod mock;

pub use decrypt::{HandleContractPair, UserDecryptRequest, UserDecryptor};
pub use instance::{
    Eip712Builder, Eip712Document, EphemeralKeypair, FhevmError, FhevmInstance,
    InstanceCapabilities, KeypairGenerator,
};
pub use mock::{MockFhevmConfig, MockFhevmInstance};
