use alloy_primitives::Address;
use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::fs;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub chain: Chain,
    #[serde(default)]
    pub contracts: Contracts,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub trade: TradeConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub general: General,
}

#[derive(Debug, Deserialize)]
pub struct Chain {
    pub rpc_url: String,
}

/// Deployed contract addresses. Defaults are the BSC testnet deployment.
#[derive(Debug, Deserialize)]
pub struct Contracts {
    #[serde(default = "default_nft")]
    pub nft: String,
    #[serde(default = "default_mmpro")]
    pub mmpro: String,
    #[serde(default = "default_busd")]
    pub busd: String,
}

impl Default for Contracts {
    fn default() -> Self {
        Self {
            nft: default_nft(),
            mmpro: default_mmpro(),
            busd: default_busd(),
        }
    }
}

fn default_nft() -> String {
    "0x7eF383bcc99f30214a6d45581177AEcbEbdef19B".to_string()
}

fn default_mmpro() -> String {
    "0xE700866c1468a5003877d756a45fFe4a0910730B".to_string()
}

fn default_busd() -> String {
    "0x78867BbEeF44f2326bF8DDd1941a4439382EF2A7".to_string()
}

// Hide the key from `{:?}` output.
#[derive(Default, Deserialize)]
pub struct Credentials {
    /// Signs transactions. Without it the session is read-only.
    pub private_key: Option<String>,
    /// Account to display when no private key is configured.
    pub watch_address: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("watch_address", &self.watch_address)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradeConfig {
    /// Minimum MMPRO the contract must get out of the BUSD swap on `buy`.
    #[serde(default = "default_min_swap_amount")]
    pub min_swap_amount: u64,
    /// Swap deadline, seconds after submission.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: i64,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            min_swap_amount: default_min_swap_amount(),
            deadline_secs: default_deadline_secs(),
        }
    }
}

fn default_min_swap_amount() -> u64 {
    4
}

fn default_deadline_secs() -> i64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Block range of one historical log query.
    #[serde(default = "default_window_blocks")]
    pub window_blocks: u64,
    /// How often the live watcher polls for new blocks.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Back-off after a failed poll.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            window_blocks: default_window_blocks(),
            poll_interval_ms: default_poll_interval_ms(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

fn default_window_blocks() -> u64 {
    5000
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_retry_delay_secs() -> u64 {
    5
}

#[derive(Debug, Deserialize)]
pub struct General {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for General {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Parsed contract addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractAddresses {
    pub nft: Address,
    pub mmpro: Address,
    pub busd: Address,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
        let mut config = Self::parse(&contents)?;
        config.apply_env();
        Ok(config)
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        if config.scan.window_blocks == 0 {
            return Err(anyhow!("scan.window_blocks must be positive"));
        }
        Ok(config)
    }

    /// `PRIVATE_KEY` and `WATCH_ADDRESS` override the file.
    fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("PRIVATE_KEY") {
            if !key.is_empty() {
                self.credentials.private_key = Some(key);
            }
        }
        if let Ok(addr) = std::env::var("WATCH_ADDRESS") {
            if !addr.is_empty() {
                self.credentials.watch_address = Some(addr);
            }
        }
    }

    pub fn addresses(&self) -> anyhow::Result<ContractAddresses> {
        Ok(ContractAddresses {
            nft: parse_address("contracts.nft", &self.contracts.nft)?,
            mmpro: parse_address("contracts.mmpro", &self.contracts.mmpro)?,
            busd: parse_address("contracts.busd", &self.contracts.busd)?,
        })
    }

    pub fn watch_address(&self) -> anyhow::Result<Option<Address>> {
        self.credentials
            .watch_address
            .as_deref()
            .map(|s| parse_address("credentials.watch_address", s))
            .transpose()
    }
}

fn parse_address(field: &str, value: &str) -> anyhow::Result<Address> {
    Address::from_str(value.trim()).with_context(|| format!("{field}: invalid address {value:?}"))
}
