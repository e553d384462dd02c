use serde::{Deserialize, Serialize};

use crate::config::{Env, LOW_BALANCE_THRESHOLD};
use crate::error::ExchangeError;
use crate::utils::{binance_client::BinanceClient, logger::Logger};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub healthy: bool,
    pub checks: HealthChecks,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthChecks {
    pub proxy: CheckResult,
    pub connectivity: CheckResult,
    pub credentials: CheckResult,
    pub balance: BalanceCheckResult,
    pub exchange_info: CheckResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub status: String, // "ok" | "warning" | "error"
    pub message: String,
}

impl CheckResult {
    fn new(status: &str, message: impl Into<String>) -> Self {
        Self {
            status: status.to_string(),
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceCheckResult {
    pub status: String, // "ok" | "error" | "warning"
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
}

pub async fn perform_health_check(client: &BinanceClient, env: &Env) -> HealthCheckResult {
    // Relay
    let proxy = match client.proxy_url() {
        None => CheckResult::new("ok", "Direct connection (no CORS proxy)"),
        Some(url) => {
            if client.needs_proxy_activation().await {
                CheckResult::new(
                    "error",
                    format!("CORS proxy needs activation, open {}corsdemo", url),
                )
            } else {
                CheckResult::new("ok", format!("CORS proxy active: {}", url))
            }
        }
    };

    let connectivity = if client.ping().await {
        CheckResult::new("ok", "Binance API responding")
    } else {
        CheckResult::new("error", "Binance API unreachable")
    };

    let credentials = match client.validate_api_keys().await {
        Ok(true) => CheckResult::new("ok", "API keys accepted"),
        Ok(false) => CheckResult::new("error", "API keys rejected or missing"),
        Err(ExchangeError::ProxyActivationRequired) => {
            CheckResult::new("error", "CORS proxy needs activation")
        }
        Err(e) => CheckResult::new("error", format!("Key check failed: {}", e)),
    };

    let balance = match client.free_balance(&env.quote_asset).await {
        Ok(balance) if balance <= 0.0 => BalanceCheckResult {
            status: "error".to_string(),
            message: format!("Zero {} balance", env.quote_asset),
            balance: None,
        },
        Ok(balance) if balance < LOW_BALANCE_THRESHOLD => BalanceCheckResult {
            status: "warning".to_string(),
            message: format!("Low balance: {:.2} {}", balance, env.quote_asset),
            balance: Some(balance),
        },
        Ok(balance) => BalanceCheckResult {
            status: "ok".to_string(),
            message: format!("Balance: {:.2} {}", balance, env.quote_asset),
            balance: Some(balance),
        },
        Err(e) => BalanceCheckResult {
            status: "error".to_string(),
            message: format!("Balance check failed: {}", e),
            balance: None,
        },
    };

    let exchange_info = match client.exchange_info().await {
        Ok(info) => CheckResult::new("ok", format!("{} symbols listed", info.symbols.len())),
        Err(e) => CheckResult::new("error", format!("Exchange info failed: {}", e)),
    };

    let checks = HealthChecks {
        proxy,
        connectivity,
        credentials,
        balance,
        exchange_info,
    };

    // Determine overall health
    let healthy = checks.proxy.is_ok()
        && checks.connectivity.is_ok()
        && checks.credentials.is_ok()
        && checks.balance.status != "error"
        && checks.exchange_info.is_ok();

    HealthCheckResult {
        healthy,
        checks,
        timestamp: chrono::Utc::now().timestamp(),
    }
}

fn status_icon(status: &str) -> &'static str {
    match status {
        "ok" => "✅",
        "warning" => "⚠️",
        _ => "❌",
    }
}

pub fn log_health_check(result: &HealthCheckResult) {
    Logger::separator();
    Logger::header("🏥 HEALTH CHECK");
    Logger::info(&format!(
        "Overall Status: {}",
        if result.healthy { "✅ Healthy" } else { "❌ Unhealthy" }
    ));
    let rows = [
        ("CORS proxy", &result.checks.proxy),
        ("Connectivity", &result.checks.connectivity),
        ("API keys", &result.checks.credentials),
    ];
    for (label, check) in rows {
        Logger::info(&format!("{}: {} {}", label, status_icon(&check.status), check.message));
    }
    Logger::info(&format!(
        "Balance: {} {}",
        status_icon(&result.checks.balance.status),
        result.checks.balance.message
    ));
    Logger::info(&format!(
        "Exchange info: {} {}",
        status_icon(&result.checks.exchange_info.status),
        result.checks.exchange_info.message
    ));
    Logger::separator();
}
