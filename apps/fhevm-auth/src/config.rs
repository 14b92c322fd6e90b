// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names and defaults for the authorization cache.
//! Configuration is read once when the hosting application builds its
//! [`crate::state::AuthState`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `FHEVM_AUTH_DATA_DIR` | Directory of the durable signature store | unset (in-memory) |
//! | `FHEVM_AUTH_DURATION_DAYS` | Default authorization window in days | `365` |
//! | `FHEVM_AUTH_FALLBACK_CHAIN_ID` | Chain id when the signer reports none | `31337` |
//! | `FHEVM_AUTH_PUBLIC_KEY_CACHE_CAPACITY` | Public-material cache entries | `64` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::PathBuf;
use std::str::FromStr;

use crate::blockchain::DEFAULT_FALLBACK_CHAIN_ID;
use crate::signature::DEFAULT_DURATION_DAYS;
use crate::storage::DEFAULT_PUBLIC_KEY_CACHE_CAPACITY;
use crate::telemetry::LogFormat;

/// Environment variable name for the durable store directory.
///
/// When unset, signatures live in memory and are lost on restart.
pub const DATA_DIR_ENV: &str = "FHEVM_AUTH_DATA_DIR";

/// Environment variable name for the default authorization window.
pub const DURATION_DAYS_ENV: &str = "FHEVM_AUTH_DURATION_DAYS";

/// Environment variable name for the fallback chain id.
pub const FALLBACK_CHAIN_ID_ENV: &str = "FHEVM_AUTH_FALLBACK_CHAIN_ID";

/// Environment variable name for the public-material cache capacity.
pub const PUBLIC_KEY_CACHE_CAPACITY_ENV: &str = "FHEVM_AUTH_PUBLIC_KEY_CACHE_CAPACITY";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub data_dir: Option<PathBuf>,
    pub default_duration_days: u64,
    pub fallback_chain_id: u64,
    pub public_key_cache_capacity: usize,
    pub log_format: LogFormat,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_duration_days: DEFAULT_DURATION_DAYS,
            fallback_chain_id: DEFAULT_FALLBACK_CHAIN_ID,
            public_key_cache_capacity: DEFAULT_PUBLIC_KEY_CACHE_CAPACITY,
            log_format: LogFormat::default(),
        }
    }
}

impl AuthConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`. Missing or invalid values keep
    /// their defaults; invalid ones are logged.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_dir = lookup(DATA_DIR_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Self {
            data_dir,
            default_duration_days: parse_or(
                &lookup,
                DURATION_DAYS_ENV,
                defaults.default_duration_days,
            ),
            fallback_chain_id: parse_or(&lookup, FALLBACK_CHAIN_ID_ENV, defaults.fallback_chain_id),
            public_key_cache_capacity: parse_or(
                &lookup,
                PUBLIC_KEY_CACHE_CAPACITY_ENV,
                defaults.public_key_cache_capacity,
            ),
            log_format: parse_or(&lookup, LOG_FORMAT_ENV, defaults.log_format),
        }
    }
}

fn parse_or<T, F>(lookup: &F, name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(
                variable = name,
                value = %raw,
                default = ?default,
                "Invalid configuration value, using default"
            );
            default
        }
    }
}
