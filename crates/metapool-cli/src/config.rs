// crates/metapool-cli/src/config.rs
//
// Runtime configuration for the metapool CLI.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use metapool_core::amount::Yocto;
use metapool_core::error::MetaPoolError;
use metapool_economics::minimum::MinimumUnstakeGuard;
use metapool_epoch::timing::{UnstakeTimingEstimator, SAFETY_MARGIN_HOURS};

/// Runtime configuration for the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Network preset: "mainnet" or "testnet".
    #[serde(default = "default_network")]
    pub network: String,

    /// JSON-RPC endpoint. Defaults to the network preset's public endpoint.
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Meta Pool contract account. Defaults to the network preset's contract.
    #[serde(default)]
    pub contract_id: Option<String>,

    /// Account whose balances are shown. Account-specific commands need it.
    #[serde(default)]
    pub account_id: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Hours added to delayed unstake wait estimates.
    #[serde(default = "default_safety_margin_hours")]
    pub safety_margin_hours: u64,

    /// Full-balance tolerance for sub-minimum accounts, in NEAR.
    #[serde(default = "default_dust_epsilon")]
    pub dust_epsilon: String,

    /// Smallest regular unstake, in NEAR.
    #[serde(default = "default_min_unstake")]
    pub min_unstake: String,

    /// Slippage tolerance applied to liquid unstake quotes.
    #[serde(default = "default_slippage_basis_points")]
    pub slippage_basis_points: u16,

    /// Timeout for each JSON-RPC request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_network() -> String {
    "testnet".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_safety_margin_hours() -> u64 {
    SAFETY_MARGIN_HOURS
}

fn default_dust_epsilon() -> String {
    "0.0000001".to_string()
}

fn default_min_unstake() -> String {
    "1".to_string()
}

fn default_slippage_basis_points() -> u16 {
    100
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            rpc_url: None,
            contract_id: None,
            account_id: None,
            log_level: default_log_level(),
            safety_margin_hours: default_safety_margin_hours(),
            dust_epsilon: default_dust_epsilon(),
            min_unstake: default_min_unstake(),
            slippage_basis_points: default_slippage_basis_points(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Public RPC endpoint and contract account for a network.
fn network_preset(network: &str) -> Option<(&'static str, &'static str)> {
    match network {
        "mainnet" => Some(("https://rpc.mainnet.near.org", "meta-pool.near")),
        "testnet" => Some(("https://rpc.testnet.near.org", "meta-v2.pool.testnet")),
        _ => None,
    }
}

impl CliConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: CliConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// The JSON-RPC endpoint: explicit `rpc_url`, else the network preset.
    pub fn rpc_url(&self) -> Result<String, MetaPoolError> {
        if let Some(url) = &self.rpc_url {
            return Ok(url.clone());
        }
        network_preset(&self.network)
            .map(|(url, _)| url.to_string())
            .ok_or_else(|| self.unknown_network())
    }

    /// The contract account: explicit `contract_id`, else the network preset.
    pub fn contract_id(&self) -> Result<String, MetaPoolError> {
        if let Some(id) = &self.contract_id {
            return Ok(id.clone());
        }
        network_preset(&self.network)
            .map(|(_, contract)| contract.to_string())
            .ok_or_else(|| self.unknown_network())
    }

    /// Minimum unstake policy built from `min_unstake` and `dust_epsilon`.
    pub fn guard(&self) -> Result<MinimumUnstakeGuard, MetaPoolError> {
        let min_unstake = Yocto::parse_near(&self.min_unstake)
            .map_err(|e| MetaPoolError::Config(format!("min_unstake: {}", e)))?;
        let dust_epsilon = Yocto::parse_near(&self.dust_epsilon)
            .map_err(|e| MetaPoolError::Config(format!("dust_epsilon: {}", e)))?;
        Ok(MinimumUnstakeGuard::new(min_unstake, dust_epsilon))
    }

    pub fn estimator(&self) -> UnstakeTimingEstimator {
        UnstakeTimingEstimator::new(self.safety_margin_hours)
    }

    fn unknown_network(&self) -> MetaPoolError {
        MetaPoolError::Config(format!(
            "unknown network '{}': use 'mainnet' or 'testnet', or set rpc_url and contract_id",
            self.network
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_resolve_testnet() {
        let config = CliConfig::default();
        assert_eq!(config.rpc_url().unwrap(), "https://rpc.testnet.near.org");
        assert_eq!(config.contract_id().unwrap(), "meta-v2.pool.testnet");
        assert_eq!(config.guard().unwrap(), MinimumUnstakeGuard::default());
        assert_eq!(config.estimator(), UnstakeTimingEstimator::default());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CliConfig = toml::from_str(
            r#"
            network = "mainnet"
            account_id = "alice.near"
            safety_margin_hours = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.contract_id().unwrap(), "meta-pool.near");
        assert_eq!(config.account_id.as_deref(), Some("alice.near"));
        assert_eq!(config.estimator().safety_margin_hours(), 3);
        assert_eq!(config.slippage_basis_points, 100);
    }

    #[test]
    fn test_explicit_endpoint_overrides_preset() {
        let config = CliConfig {
            network: "localnet".to_string(),
            rpc_url: Some("http://127.0.0.1:3030".to_string()),
            contract_id: Some("meta.test.near".to_string()),
            ..Default::default()
        };
        assert_eq!(config.rpc_url().unwrap(), "http://127.0.0.1:3030");
        assert_eq!(config.contract_id().unwrap(), "meta.test.near");
    }

    #[test]
    fn test_unknown_network_without_overrides() {
        let config = CliConfig {
            network: "localnet".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.rpc_url(), Err(MetaPoolError::Config(_))));
    }

    #[test]
    fn test_bad_dust_epsilon() {
        let config = CliConfig {
            dust_epsilon: "tiny".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.guard(), Err(MetaPoolError::Config(_))));
    }
}
