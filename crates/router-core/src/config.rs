//! Configuration types for the auto-router

use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, ConfigError, Network, TokenId};

/// Route search and safety settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Maximum pools a single route may traverse
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,

    /// Deviation (in percent) from USD reference prices above which a quote
    /// is flagged
    #[serde(default = "default_max_price_deviation_percent")]
    pub max_price_deviation_percent: Decimal,

    /// Lifetime of coalesced quote results; 0 disables the quote cache
    #[serde(default = "default_quote_cache_ttl_secs")]
    pub quote_cache_ttl_secs: u64,
}

fn default_max_hops() -> usize {
    4
}

fn default_max_price_deviation_percent() -> Decimal {
    Decimal::ONE
}

fn default_quote_cache_ttl_secs() -> u64 {
    6
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
            max_price_deviation_percent: default_max_price_deviation_percent(),
            quote_cache_ttl_secs: default_quote_cache_ttl_secs(),
        }
    }
}

/// Contract addresses and native currency identifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
    /// Router contract receiving the aggregated multi-pair swap
    pub router_address: Address,

    /// Wrapping contract for the native currency
    pub wrap_address: Address,

    /// Identifier of the native currency (not tradeable in pools)
    #[serde(default = "default_native_token_id")]
    pub native_token_id: TokenId,

    /// Token representation of the native currency used in pools
    pub wrapped_native_token_id: TokenId,
}

fn default_native_token_id() -> TokenId {
    TokenId::new("EGLD")
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            router_address: Address::new(
                "erd1qqqqqqqqqqqqqpgqpv09kfzry5y4sj05udcngesat07umyj70n4sa2c0rp",
            ),
            wrap_address: Address::new(
                "erd1qqqqqqqqqqqqqpgqd77fnev2sthnczp2lnfx0y5jdycynjfhzzgq6p3rax",
            ),
            native_token_id: default_native_token_id(),
            wrapped_native_token_id: TokenId::new("WEGLD-123456"),
        }
    }
}

impl ContractsConfig {
    pub fn is_native(&self, token: &TokenId) -> bool {
        token == &self.native_token_id
    }

    /// Token that actually trades in pools for a requested token id
    pub fn routing_token(&self, token: &TokenId) -> TokenId {
        if self.is_native(token) {
            self.wrapped_native_token_id.clone()
        } else {
            token.clone()
        }
    }
}

/// Gas settings for built transactions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasConfig {
    /// Gas units charged per hop of an aggregated swap
    #[serde(default = "default_multi_pair_swap_per_hop")]
    pub multi_pair_swap_per_hop: u64,

    #[serde(default = "default_wrap_gas")]
    pub wrap: u64,

    #[serde(default = "default_wrap_gas")]
    pub unwrap: u64,

    #[serde(default = "default_gas_price")]
    pub gas_price: u64,

    #[serde(default = "default_tx_version")]
    pub tx_version: u32,
}

fn default_multi_pair_swap_per_hop() -> u64 {
    25_000_000
}

fn default_wrap_gas() -> u64 {
    4_200_000
}

fn default_gas_price() -> u64 {
    1_000_000_000
}

fn default_tx_version() -> u32 {
    1
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            multi_pair_swap_per_hop: default_multi_pair_swap_per_hop(),
            wrap: default_wrap_gas(),
            unwrap: default_wrap_gas(),
            gas_price: default_gas_price(),
            tx_version: default_tx_version(),
        }
    }
}

/// Router configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Network the transactions are built for
    pub network: Network,

    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub contracts: ContractsConfig,

    #[serde(default)]
    pub gas: GasConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            network: Network::Testnet,
            routing: RoutingConfig::default(),
            contracts: ContractsConfig::default(),
            gas: GasConfig::default(),
        }
    }
}

impl RouterConfig {
    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        raw.parse()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.routing.max_hops == 0 {
            return Err(ConfigError::Invalid(
                "routing.max_hops must be at least 1".to_string(),
            ));
        }
        if self.routing.max_price_deviation_percent.is_sign_negative() {
            return Err(ConfigError::Invalid(
                "routing.max_price_deviation_percent must not be negative".to_string(),
            ));
        }
        if self.contracts.router_address.as_str().is_empty()
            || self.contracts.wrap_address.as_str().is_empty()
        {
            return Err(ConfigError::Invalid(
                "contract addresses must not be empty".to_string(),
            ));
        }
        if self.contracts.native_token_id == self.contracts.wrapped_native_token_id {
            return Err(ConfigError::Invalid(
                "native and wrapped native token ids must differ".to_string(),
            ));
        }
        Ok(())
    }

    pub fn chain_id(&self) -> &'static str {
        self.network.chain_id()
    }
}

impl FromStr for RouterConfig {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RouterConfig::default();
        assert_eq!(config.routing.max_hops, 4);
        assert_eq!(config.routing.max_price_deviation_percent, Decimal::ONE);
        assert_eq!(config.contracts.native_token_id.as_str(), "EGLD");
        assert_eq!(config.chain_id(), "T");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = RouterConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: RouterConfig = json.parse().unwrap();
        assert_eq!(parsed.contracts.router_address, config.contracts.router_address);
        assert_eq!(parsed.gas.multi_pair_swap_per_hop, config.gas.multi_pair_swap_per_hop);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: RouterConfig = r#"{ "network": "mainnet", "routing": { "max_hops": 3 } }"#
            .parse()
            .unwrap();
        assert_eq!(parsed.chain_id(), "1");
        assert_eq!(parsed.routing.max_hops, 3);
        assert_eq!(parsed.routing.quote_cache_ttl_secs, 6);
        assert_eq!(parsed.gas.wrap, 4_200_000);
    }

    #[test]
    fn test_native_maps_to_wrapped() {
        let contracts = ContractsConfig::default();
        assert_eq!(
            contracts.routing_token(&TokenId::new("EGLD")),
            TokenId::new("WEGLD-123456")
        );
        assert_eq!(
            contracts.routing_token(&TokenId::new("USDC-1111")),
            TokenId::new("USDC-1111")
        );
    }

    #[test]
    fn test_zero_max_hops_rejected() {
        let result: Result<RouterConfig, _> =
            r#"{ "network": "devnet", "routing": { "max_hops": 0 } }"#.parse();
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
