// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serializer configuration.
//!
//! - **Level 1 (Static)**: compile-time defaults for the decode limits.
//! - **Level 2 (Dynamic)**: [`SerializerConfig`], built in code, from
//!   environment variables or from YAML (`yaml-config` feature).
//!
//! # Example
//!
//! ```rust
//! use amqp_contract::config::SerializerConfig;
//! use amqp_contract::ContractSerializer;
//!
//! let config = SerializerConfig::new()
//!     .with_max_depth(16)
//!     .with_max_collection_len(4096);
//! let serializer = ContractSerializer::with_config(config);
//! assert_eq!(serializer.config().limits.max_depth, 16);
//! ```

use crate::error::{Error, Result};

// =======================================================================
// Decode limits
// =======================================================================

/// Maximum nesting of compound values (lists, maps, arrays, described values)
/// accepted while decoding.
///
/// Bounds recursion on hostile input. Legitimate AMQP frames rarely nest
/// deeper than a handful of levels.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

/// Maximum item count declared by a single list, map or array header.
///
/// Checked before any item is read, so a forged count cannot trigger a large
/// allocation.
pub const DEFAULT_MAX_COLLECTION_LEN: usize = 1 << 20;

/// Environment variable overriding [`DEFAULT_MAX_NESTING_DEPTH`].
pub const ENV_MAX_DEPTH: &str = "AMQP_CONTRACT_MAX_DEPTH";

/// Environment variable overriding [`DEFAULT_MAX_COLLECTION_LEN`].
pub const ENV_MAX_COLLECTION_LEN: &str = "AMQP_CONTRACT_MAX_COLLECTION_LEN";

/// Limits applied by every decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "yaml-config", derive(serde::Deserialize))]
#[cfg_attr(feature = "yaml-config", serde(default))]
pub struct DecodeLimits {
    pub max_depth: usize,
    pub max_collection_len: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
            max_collection_len: DEFAULT_MAX_COLLECTION_LEN,
        }
    }
}

// =======================================================================
// Runtime configuration
// =======================================================================

/// Runtime configuration of a [`ContractSerializer`](crate::ContractSerializer).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "yaml-config", derive(serde::Deserialize))]
#[cfg_attr(feature = "yaml-config", serde(default))]
pub struct SerializerConfig {
    pub limits: DecodeLimits,
}

impl SerializerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum decode nesting depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.limits.max_depth = depth;
        self
    }

    /// Set the maximum item count of a single collection.
    pub fn with_max_collection_len(mut self, len: usize) -> Self {
        self.limits.max_collection_len = len;
        self
    }

    /// Defaults overridden by `AMQP_CONTRACT_MAX_DEPTH` and
    /// `AMQP_CONTRACT_MAX_COLLECTION_LEN` when set.
    ///
    /// A variable that is set but not a valid number is an error.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(depth) = env_usize(ENV_MAX_DEPTH)? {
            config.limits.max_depth = depth;
        }
        if let Some(len) = env_usize(ENV_MAX_COLLECTION_LEN)? {
            config.limits.max_collection_len = len;
        }
        log::debug!("[config] loaded from environment: {:?}", config.limits);
        Ok(config)
    }

    /// Parse a YAML document.
    ///
    /// ```yaml
    /// limits:
    ///   max_depth: 32
    ///   max_collection_len: 65536
    /// ```
    ///
    /// Missing keys keep their defaults.
    #[cfg(feature = "yaml-config")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::Config(format!("Failed to parse YAML: {}", e)))
    }

    /// Load a YAML document from disk.
    #[cfg(feature = "yaml-config")]
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read YAML file: {}", e)))?;
        Self::from_yaml_str(&content)
    }
}

fn env_usize(key: &str) -> Result<Option<usize>> {
    match std::env::var(key) {
        Ok(raw) => parse_usize(key, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_usize(key: &str, raw: &str) -> Result<usize> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a number, got '{}'", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SerializerConfig::default();
        assert_eq!(config.limits.max_depth, DEFAULT_MAX_NESTING_DEPTH);
        assert_eq!(config.limits.max_collection_len, DEFAULT_MAX_COLLECTION_LEN);
    }

    #[test]
    fn test_builder_overrides() {
        let config = SerializerConfig::new()
            .with_max_depth(3)
            .with_max_collection_len(10);
        assert_eq!(
            config.limits,
            DecodeLimits {
                max_depth: 3,
                max_collection_len: 10
            }
        );
    }

    #[test]
    fn test_parse_usize_rejects_garbage() {
        assert_eq!(parse_usize(ENV_MAX_DEPTH, " 12 ").unwrap(), 12);
        assert!(matches!(
            parse_usize(ENV_MAX_DEPTH, "deep"),
            Err(Error::Config(_))
        ));
    }

    #[cfg(feature = "yaml-config")]
    #[test]
    fn test_yaml_partial_document() {
        let config = SerializerConfig::from_yaml_str("limits:\n  max_depth: 7\n").unwrap();
        assert_eq!(config.limits.max_depth, 7);
        assert_eq!(config.limits.max_collection_len, DEFAULT_MAX_COLLECTION_LEN);
    }

    #[cfg(feature = "yaml-config")]
    #[test]
    fn test_yaml_invalid_is_config_error() {
        assert!(matches!(
            SerializerConfig::from_yaml_str("limits: [1, 2"),
            Err(Error::Config(_))
        ));
    }
}
