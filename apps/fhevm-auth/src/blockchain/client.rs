// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Minimal JSON-RPC client used to discover the signer's network.

use alloy::{
    network::Ethereum,
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};

use super::signing::SignerError;
use super::types::NetworkConfig;

/// HTTP provider type (with all fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// EVM chain client.
pub struct ChainClient {
    /// RPC endpoint, kept for diagnostics
    rpc_url: String,
    /// Alloy HTTP provider
    provider: HttpProvider,
}

impl ChainClient {
    /// Create a new client for an RPC endpoint.
    pub fn new(rpc_url: &str) -> Result<Self, SignerError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| SignerError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self {
            rpc_url: rpc_url.to_string(),
            provider,
        })
    }

    /// Create a client for a known network.
    pub fn for_network(network: &NetworkConfig) -> Result<Self, SignerError> {
        Self::new(network.rpc_url)
    }

    /// Query `eth_chainId`.
    pub async fn get_chain_id(&self) -> Result<u64, SignerError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| SignerError::Rpc(e.to_string()))
    }

    /// The RPC endpoint this client talks to.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::HARDHAT_LOCAL;

    #[test]
    fn rejects_malformed_rpc_url() {
        assert!(matches!(
            ChainClient::new("not a url"),
            Err(SignerError::InvalidRpcUrl(_))
        ));
    }

    #[test]
    fn builds_for_known_network() {
        let client = ChainClient::for_network(&HARDHAT_LOCAL).unwrap();
        assert_eq!(client.rpc_url(), "http://127.0.0.1:8545");
    }

    #[tokio::test]
    async fn unreachable_node_is_rpc_error() {
        // Port 9 (discard) is not an RPC endpoint.
        let client = ChainClient::new("http://127.0.0.1:9").unwrap();
        assert!(matches!(
            client.get_chain_id().await,
            Err(SignerError::Rpc(_))
        ));
    }
}
