use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// JSON-RPC client behaviour shared by every network connection.
///
/// Transport failures and timeouts are retried with exponential backoff
/// (`retry_delay_ms * 2^attempt`); contract reverts are never retried.
#[derive(Debug, Deserialize, Clone)]
pub struct RpcSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Position tracking configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct TrackerSettings {
    /// Fee tier (hundredths of a bip) used to find the USD pool when valuing
    /// wallet balances. Positions are quoted at their own fee tier.
    #[serde(default = "default_quote_fee_tier")]
    pub quote_fee_tier: u32,
    /// How many positions of one network are valued at the same time.
    #[serde(default = "default_max_concurrent_positions")]
    pub max_concurrent_positions: usize,
    /// Upper bound for a whole tracking request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_quote_fee_tier() -> u32 {
    3000
}

fn default_max_concurrent_positions() -> usize {
    4
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            quote_fee_tier: default_quote_fee_tier(),
            max_concurrent_positions: default_max_concurrent_positions(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Root application configuration.
///
/// Read from an optional `config.{yaml,toml,json}` file, then overridden by
/// environment variables. Nested keys use `__` as separator, e.g.
/// `RPC__TIMEOUT_SECS=10` or `TRACKER__QUOTE_FEE_TIER=500`.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub l1_rpc_url: String,
    pub arbitrum_rpc_url: String,
    #[serde(default)]
    pub rpc: RpcSettings,
    #[serde(default)]
    pub tracker: TrackerSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::default().separator("__").try_parsing(true))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }
}
