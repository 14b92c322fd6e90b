// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Network constants for FHEVM deployments.

/// EVM network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: &'static str,
}

/// Local Hardhat node (FHEVM mock mode).
pub const HARDHAT_LOCAL: NetworkConfig = NetworkConfig {
    name: "Hardhat",
    chain_id: 31337,
    rpc_url: "http://127.0.0.1:8545",
};

/// Ethereum Sepolia testnet (Zama FHEVM coprocessor).
pub const SEPOLIA: NetworkConfig = NetworkConfig {
    name: "Sepolia",
    chain_id: 11155111,
    rpc_url: "https://ethereum-sepolia-rpc.publicnode.com",
};

/// Chain id used when the signer cannot report its network.
pub const DEFAULT_FALLBACK_CHAIN_ID: u64 = HARDHAT_LOCAL.chain_id;

/// Chain id of the decryption gateway used by the FHEVM mock instance.
pub const MOCK_GATEWAY_CHAIN_ID: u64 = 55815;

/// Verifying contract of the decryption EIP-712 domain in mock mode.
pub const MOCK_DECRYPTION_VERIFYING_CONTRACT: &str = "0x5ffdaAB0373E62E2ea2944776209aEf29E631A64";

/// Look up a known network by chain id.
pub fn network_by_chain_id(chain_id: u64) -> Option<&'static NetworkConfig> {
    [&HARDHAT_LOCAL, &SEPOLIA]
        .into_iter()
        .find(|network| network.chain_id == chain_id)
}
