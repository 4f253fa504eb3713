use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::shared::errors::AppError;

/// Polygon staking contract the dashboard was built for.
pub const DEFAULT_STAKING_CONTRACT: &str = "0x6f66cb1d37ae6f200345396dc6c564567e396f01";
/// Token staked into that contract.
pub const DEFAULT_TOKEN_CONTRACT: &str = "0x850e479ea10a725f564cb6d0fc00cb1e86bd1832";
pub const DEFAULT_RPC_URL: &str = "https://polygon-rpc.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcCfg {
    pub url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsCfg {
    pub staking: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletCfg {
    /// Account that signs through the RPC endpoint
    pub account: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardCfg {
    /// Upper bound on pools read per refresh, `None` reads all of them
    pub max_pools: Option<u64>,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GasSpeed {
    Slow,
    Standard,
    Fast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPrefs {
    pub on_stake: bool,
    pub on_unstake: bool,
    pub on_claim: bool,
    pub on_error: bool,
}

/// User staking preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakingPreferences {
    pub auto_approve: bool,
    /// Percent
    pub slippage_tolerance: f64,
    pub gas_price: GasSpeed,
    pub notifications: NotificationPrefs,
}

impl Default for StakingPreferences {
    fn default() -> Self {
        Self {
            auto_approve: false,
            slippage_tolerance: 0.5,
            gas_price: GasSpeed::Standard,
            notifications: NotificationPrefs {
                on_stake: true,
                on_unstake: true,
                on_claim: true,
                on_error: true,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rpc: RpcCfg,
    pub contracts: ContractsCfg,
    #[serde(default)]
    pub wallet: WalletCfg,
    #[serde(default)]
    pub dashboard: DashboardCfg,
    #[serde(default)]
    pub preferences: StakingPreferences,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_refresh_interval() -> u64 {
    15
}

impl Default for DashboardCfg {
    fn default() -> Self {
        Self {
            max_pools: None,
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc: RpcCfg {
                url: DEFAULT_RPC_URL.to_string(),
                timeout_ms: default_timeout_ms(),
            },
            contracts: ContractsCfg {
                staking: DEFAULT_STAKING_CONTRACT.to_string(),
                token: DEFAULT_TOKEN_CONTRACT.to_string(),
            },
            wallet: WalletCfg::default(),
            dashboard: DashboardCfg::default(),
            preferences: StakingPreferences::default(),
        }
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, AppError> {
        let config_content = fs::read_to_string(path.as_ref())
            .map_err(|e| AppError::ConfigError(format!("Failed to read config file: {}", e)))?;

        Self::parse(&config_content)
    }

    pub fn parse(content: &str) -> Result<Config, AppError> {
        let config: Config = toml::from_str(content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Reject unparseable addresses before anything talks to the chain
    pub fn validate(&self) -> Result<(), AppError> {
        parse_address("contracts.staking", &self.contracts.staking)?;
        parse_address("contracts.token", &self.contracts.token)?;
        if let Some(account) = &self.wallet.account {
            parse_address("wallet.account", account)?;
        }
        if self.rpc.url.trim().is_empty() {
            return Err(AppError::ConfigError("rpc.url must not be empty".to_string()));
        }
        Ok(())
    }
}

pub fn parse_address(field: &str, value: &str) -> Result<Address, AppError> {
    Address::from_str(value.trim())
        .map_err(|e| AppError::ConfigError(format!("Invalid {} address {}: {}", field, value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let cfg = ConfigLoader::parse(
            r#"
            [rpc]
            url = "http://localhost:8545"
            timeout_ms = 5000

            [contracts]
            staking = "0x6f66cb1d37ae6f200345396dc6c564567e396f01"
            token = "0x850e479ea10a725f564cb6d0fc00cb1e86bd1832"

            [wallet]
            account = "0x000000000000000000000000000000000000dEaD"

            [dashboard]
            max_pools = 5
            refresh_interval_secs = 30

            [preferences]
            auto_approve = true
            slippage_tolerance = 1.0
            gas_price = "fast"

            [preferences.notifications]
            on_stake = true
            on_unstake = false
            on_claim = true
            on_error = true
            "#,
        )
        .unwrap();

        assert_eq!(cfg.rpc.timeout_ms, 5000);
        assert_eq!(cfg.dashboard.max_pools, Some(5));
        assert!(cfg.preferences.auto_approve);
        assert_eq!(cfg.preferences.gas_price, GasSpeed::Fast);
        assert!(!cfg.preferences.notifications.on_unstake);
    }

    #[test]
    fn test_optional_sections_default() {
        let cfg = ConfigLoader::parse(
            r#"
            [rpc]
            url = "http://localhost:8545"

            [contracts]
            staking = "0x6f66cb1d37ae6f200345396dc6c564567e396f01"
            token = "0x850e479ea10a725f564cb6d0fc00cb1e86bd1832"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.rpc.timeout_ms, 30_000);
        assert_eq!(cfg.dashboard.refresh_interval_secs, 15);
        assert!(cfg.wallet.account.is_none());
        assert_eq!(cfg.preferences, StakingPreferences::default());
    }

    #[test]
    fn test_invalid_address_rejected() {
        let result = ConfigLoader::parse(
            r#"
            [rpc]
            url = "http://localhost:8545"

            [contracts]
            staking = "not-an-address"
            token = "0x850e479ea10a725f564cb6d0fc00cb1e86bd1832"
            "#,
        );
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }
}
