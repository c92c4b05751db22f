use serde::Deserialize;
use std::env;

use crate::constants::{
    DEFAULT_ABI_PATH, DEFAULT_API_URL, DEFAULT_CHAIN_ID, DEFAULT_PLATFORM_ABI_PATH,
    GAS_LIMIT_CREATE_SUBSCRIPTION, GAS_LIMIT_DEFAULT, GAS_LIMIT_PLATFORM_CALL, GAS_PRICE_DEFAULT,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Network
    pub network: String,
    pub api_url: String,
    pub chain_id: String,

    // Contracts
    pub contract_address: Option<String>,
    pub abi_path: String,
    pub platform_contract_address: Option<String>,
    pub platform_abi_path: String,

    // Gas
    pub gas_price: u64,
    pub gas_limit_create: u64,
    pub gas_limit_default: u64,
    pub gas_limit_platform: u64,

    // CORS
    pub cors_allowed_origins: String,

    // Payment monitor
    pub enable_payment_monitor: bool,
    pub payment_monitor_addresses: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            environment: "development".to_string(),
            network: "devnet".to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            chain_id: DEFAULT_CHAIN_ID.to_string(),
            contract_address: None,
            abi_path: DEFAULT_ABI_PATH.to_string(),
            platform_contract_address: None,
            platform_abi_path: DEFAULT_PLATFORM_ABI_PATH.to_string(),
            gas_price: GAS_PRICE_DEFAULT,
            gas_limit_create: GAS_LIMIT_CREATE_SUBSCRIPTION,
            gas_limit_default: GAS_LIMIT_DEFAULT,
            gas_limit_platform: GAS_LIMIT_PLATFORM_CALL,
            cors_allowed_origins: "*".to_string(),
            enable_payment_monitor: false,
            payment_monitor_addresses: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            network: env::var("NETWORK").unwrap_or_else(|_| "devnet".to_string()),
            api_url: env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            chain_id: env::var("CHAIN_ID").unwrap_or_else(|_| DEFAULT_CHAIN_ID.to_string()),

            contract_address: env::var("CONTRACT_ADDRESS").ok(),
            abi_path: env::var("ABI_PATH").unwrap_or_else(|_| DEFAULT_ABI_PATH.to_string()),
            platform_contract_address: env::var("PLATFORM_CONTRACT_ADDRESS").ok(),
            platform_abi_path: env::var("PLATFORM_ABI_PATH")
                .unwrap_or_else(|_| DEFAULT_PLATFORM_ABI_PATH.to_string()),

            gas_price: parse_or("GAS_PRICE", GAS_PRICE_DEFAULT)?,
            gas_limit_create: parse_or("GAS_LIMIT_CREATE", GAS_LIMIT_CREATE_SUBSCRIPTION)?,
            gas_limit_default: parse_or("GAS_LIMIT_DEFAULT", GAS_LIMIT_DEFAULT)?,
            gas_limit_platform: parse_or("GAS_LIMIT_PLATFORM", GAS_LIMIT_PLATFORM_CALL)?,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),

            enable_payment_monitor: env::var("ENABLE_PAYMENT_MONITOR")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
            payment_monitor_addresses: env::var("PAYMENT_MONITOR_ADDRESSES")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_url.trim().is_empty() {
            anyhow::bail!("API_URL is empty");
        }
        url::Url::parse(&self.api_url)
            .map_err(|e| anyhow::anyhow!("API_URL is not a valid URL: {}", e))?;
        if self.chain_id.trim().is_empty() {
            anyhow::bail!("CHAIN_ID is empty");
        }
        if self.gas_price == 0 {
            anyhow::bail!("GAS_PRICE must be > 0");
        }
        if self.gas_limit_create == 0 || self.gas_limit_default == 0 || self.gas_limit_platform == 0
        {
            anyhow::bail!("Gas limits must be > 0");
        }

        if self.contract_address().is_none() {
            tracing::warn!(
                "CONTRACT_ADDRESS not set or is a placeholder; subscription routes will answer 503 until it is configured"
            );
        }
        if self.platform_contract_address.is_some() && self.platform_contract_address().is_none() {
            tracing::warn!("Using placeholder PLATFORM_CONTRACT_ADDRESS");
        }

        if self.enable_payment_monitor && self.payment_monitor_addresses.is_empty() {
            tracing::warn!("Payment monitor enabled without PAYMENT_MONITOR_ADDRESSES");
        }

        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    /// Configured scheduled-payments contract, ignoring placeholders.
    pub fn contract_address(&self) -> Option<&str> {
        usable_address(self.contract_address.as_deref())
    }

    pub fn platform_contract_address(&self) -> Option<&str> {
        usable_address(self.platform_contract_address.as_deref())
    }

    pub fn is_mainnet(&self) -> bool {
        self.network.eq_ignore_ascii_case("mainnet") || self.chain_id == "1"
    }
}

fn usable_address(raw: Option<&str>) -> Option<&str> {
    let value = raw?.trim();
    if value.is_empty() || value.contains("...") {
        return None;
    }
    Some(value)
}

fn parse_or(name: &str, default: u64) -> anyhow::Result<u64> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} is not a valid number: {}", name, e)),
        Err(_) => Ok(default),
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
