use anyhow::{Context, Result};
use regex::Regex;
use std::env;
use std::fmt;
use std::str::FromStr;

use super::constants::{DEFAULT_BASE_URL, MAX_RETRIES, RETRY_DELAY_MS};
use crate::utils::binance_client::Credentials;

/// Minimum length the exchange accepts for either half of a key pair.
pub const MIN_CREDENTIAL_LENGTH: usize = 10;

#[derive(Clone)]
pub struct Env {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub cors_proxy_url: Option<String>,
    pub quote_asset: String,
    pub initial_amount: f64,
    pub target_amount: f64,
    pub trade_speed: u32,
    pub auto_trade_enabled: bool,
    pub preview_mode: bool,
    pub request_timeout_ms: u64,
    pub network_retry_limit: u32,
    pub retry_delay_ms: u64,
    pub balance_refresh_interval_ms: u64,
    pub market_scan_limit: usize,
    pub volatile_market_count: usize,
}

impl Env {
    pub fn credentials(&self) -> Option<Credentials> {
        if self.api_key.is_empty() || self.api_secret.is_empty() {
            return None;
        }
        Some(Credentials::new(&self.api_key, &self.api_secret))
    }

    /// Base URL requests are sent to, with the relay prefix when one is set.
    pub fn effective_base_url(&self) -> String {
        match &self.cors_proxy_url {
            Some(proxy) => format!("{}{}", proxy, self.base_url),
            None => self.base_url.clone(),
        }
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("api_key", &mask_secret(&self.api_key))
            .field("api_secret", &"****")
            .field("base_url", &self.base_url)
            .field("cors_proxy_url", &self.cors_proxy_url)
            .field("quote_asset", &self.quote_asset)
            .field("initial_amount", &self.initial_amount)
            .field("target_amount", &self.target_amount)
            .field("trade_speed", &self.trade_speed)
            .field("auto_trade_enabled", &self.auto_trade_enabled)
            .field("preview_mode", &self.preview_mode)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("network_retry_limit", &self.network_retry_limit)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("balance_refresh_interval_ms", &self.balance_refresh_interval_ms)
            .field("market_scan_limit", &self.market_scan_limit)
            .field("volatile_market_count", &self.volatile_market_count)
            .finish()
    }
}

pub fn mask_secret(value: &str) -> String {
    if value.len() >= 10 && value.is_ascii() {
        format!("{}****{}", &value[..4], &value[value.len() - 4..])
    } else {
        "****".to_string()
    }
}

/// Key and secret must both be present, long enough and alphanumeric.
pub fn is_valid_api_credential(value: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9]+$")
        .map(|re| re.is_match(value))
        .unwrap_or(false)
        && value.len() >= MIN_CREDENTIAL_LENGTH
}

fn parse_var<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse::<T>()
        .with_context(|| format!("Invalid {}", key))
}

fn validate_required_env() -> Result<()> {
    let required = ["BINANCE_API_KEY", "BINANCE_API_SECRET"];

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|key| env::var(key).map(|v| v.trim().is_empty()).unwrap_or(true))
        .collect();

    if !missing.is_empty() {
        eprintln!("\n❌ Configuration Error: Missing required environment variables\n");
        eprintln!("Missing variables: {}\n", missing.join(", "));
        eprintln!("🔧 Quick fix:");
        eprintln!("   1. Run the setup wizard: cargo run --bin setup");
        eprintln!("   2. Or manually create .env file with your Binance API key and secret\n");
        anyhow::bail!("Missing required environment variables: {}", missing.join(", "));
    }

    Ok(())
}

fn validate_credentials() -> Result<()> {
    for key in ["BINANCE_API_KEY", "BINANCE_API_SECRET"] {
        let value = env::var(key).unwrap_or_default();
        if !is_valid_api_credential(value.trim()) {
            eprintln!("\n❌ Invalid {}\n", key);
            eprintln!(
                "Expected at least {} alphanumeric characters (got {})\n",
                MIN_CREDENTIAL_LENGTH,
                value.trim().len()
            );
            eprintln!("Create a key pair at: https://www.binance.com/en/my/settings/api-management\n");
            anyhow::bail!("Invalid {}: keys are too short or contain invalid characters", key);
        }
    }

    Ok(())
}

fn validate_numeric_config() -> Result<()> {
    let initial_amount: f64 = parse_var("INITIAL_AMOUNT", "10")?;
    if initial_amount <= 0.0 {
        anyhow::bail!("Invalid INITIAL_AMOUNT: must be positive");
    }

    let target_amount: f64 = parse_var("TARGET_AMOUNT", "1000")?;
    if target_amount <= initial_amount {
        anyhow::bail!("Invalid TARGET_AMOUNT: must be greater than INITIAL_AMOUNT");
    }

    let trade_speed: u32 = parse_var("TRADE_SPEED", "5")?;
    if !(1..=60).contains(&trade_speed) {
        anyhow::bail!("Invalid TRADE_SPEED: must be between 1 and 60 trades per minute");
    }

    let request_timeout: u64 = parse_var("REQUEST_TIMEOUT_MS", "10000")?;
    if request_timeout < 1000 {
        anyhow::bail!("Invalid REQUEST_TIMEOUT_MS: must be at least 1000ms");
    }

    let network_retry_limit: u32 = parse_var("NETWORK_RETRY_LIMIT", &MAX_RETRIES.to_string())?;
    if !(1..=10).contains(&network_retry_limit) {
        anyhow::bail!("Invalid NETWORK_RETRY_LIMIT: must be between 1 and 10");
    }

    let balance_interval: u64 = parse_var("BALANCE_REFRESH_INTERVAL_MS", "30000")?;
    if balance_interval < 1000 {
        anyhow::bail!("Invalid BALANCE_REFRESH_INTERVAL_MS: must be at least 1000ms");
    }

    let scan_limit: usize = parse_var("MARKET_SCAN_LIMIT", "50")?;
    let keep: usize = parse_var("VOLATILE_MARKET_COUNT", "15")?;
    if scan_limit == 0 || keep == 0 {
        anyhow::bail!("Invalid MARKET_SCAN_LIMIT / VOLATILE_MARKET_COUNT: must be positive");
    }

    Ok(())
}

fn validate_urls() -> Result<()> {
    if let Ok(base_url) = env::var("BINANCE_BASE_URL") {
        if !base_url.starts_with("http") {
            eprintln!("\n❌ Invalid BINANCE_BASE_URL\n");
            eprintln!("Current value: {}", base_url);
            eprintln!("Default value: {}\n", DEFAULT_BASE_URL);
            anyhow::bail!("Invalid BINANCE_BASE_URL: must be a valid HTTP/HTTPS URL");
        }
    }

    if let Ok(proxy_url) = env::var("CORS_PROXY_URL") {
        if !proxy_url.trim().is_empty() && !proxy_url.starts_with("http") {
            eprintln!("\n❌ Invalid CORS_PROXY_URL\n");
            eprintln!("Current value: {}", proxy_url);
            eprintln!("Example: https://cors-anywhere.herokuapp.com/\n");
            anyhow::bail!("Invalid CORS_PROXY_URL: must be a valid HTTP/HTTPS URL");
        }
    }

    Ok(())
}

fn parse_proxy_url() -> Option<String> {
    env::var("CORS_PROXY_URL")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(|v| if v.ends_with('/') { v } else { format!("{}/", v) })
}

pub fn load_env() -> Result<Env> {
    dotenvy::dotenv().ok(); // Load .env file if it exists

    validate_required_env()?;
    validate_credentials()?;
    validate_numeric_config()?;
    validate_urls()?;

    Ok(Env {
        api_key: env::var("BINANCE_API_KEY")
            .context("BINANCE_API_KEY is required")?
            .trim()
            .to_string(),
        api_secret: env::var("BINANCE_API_SECRET")
            .context("BINANCE_API_SECRET is required")?
            .trim()
            .to_string(),
        base_url: env::var("BINANCE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string(),
        cors_proxy_url: parse_proxy_url(),
        quote_asset: env::var("QUOTE_ASSET")
            .unwrap_or_else(|_| "USDT".to_string())
            .to_uppercase(),
        initial_amount: parse_var("INITIAL_AMOUNT", "10")?,
        target_amount: parse_var("TARGET_AMOUNT", "1000")?,
        trade_speed: parse_var("TRADE_SPEED", "5")?,
        auto_trade_enabled: parse_var("AUTO_TRADE_ENABLED", "true").unwrap_or(true),
        preview_mode: parse_var("PREVIEW_MODE", "true").unwrap_or(true),
        request_timeout_ms: parse_var("REQUEST_TIMEOUT_MS", "10000")?,
        network_retry_limit: parse_var("NETWORK_RETRY_LIMIT", &MAX_RETRIES.to_string())?,
        retry_delay_ms: parse_var("RETRY_DELAY_MS", &RETRY_DELAY_MS.to_string())?,
        balance_refresh_interval_ms: parse_var("BALANCE_REFRESH_INTERVAL_MS", "30000")?,
        market_scan_limit: parse_var("MARKET_SCAN_LIMIT", "50")?,
        volatile_market_count: parse_var("VOLATILE_MARKET_COUNT", "15")?,
    })
}
