//! Common test utilities and helpers
#![allow(dead_code)]

use spot_autotrader::config::{Env, TradeSettings};
use spot_autotrader::utils::{BinanceClient, Credentials, RetryPolicy};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "testApiKey1234567890";
pub const TEST_API_SECRET: &str = "testApiSecret1234567890";

/// Create a temporary .env file for testing
pub fn create_test_env_file() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let env_path = temp_dir.path().join(".env");

    let test_env_content = format!(
        r#"# Test Environment Variables
BINANCE_API_KEY={}
BINANCE_API_SECRET={}
BINANCE_BASE_URL=https://api.binance.com
QUOTE_ASSET=USDT
INITIAL_AMOUNT=10
TARGET_AMOUNT=1000
TRADE_SPEED=5
PREVIEW_MODE=true
"#,
        TEST_API_KEY, TEST_API_SECRET
    );

    fs::write(&env_path, test_env_content).expect("Failed to write test .env file");
    temp_dir
}

/// Client against the mock server with one quick retry and preview orders.
pub fn test_client(server: &MockServer) -> BinanceClient {
    BinanceClient::new(
        &server.uri(),
        Some(Credentials::new(TEST_API_KEY, TEST_API_SECRET)),
        RetryPolicy::new(1, Duration::from_millis(10)),
    )
    .expect("Failed to build client")
    .with_preview(true)
}

pub fn public_test_client(server: &MockServer) -> BinanceClient {
    BinanceClient::new(&server.uri(), None, RetryPolicy::new(1, Duration::from_millis(10)))
        .expect("Failed to build client")
}

/// Configuration pointing at `base_url` with the test keys and no relay.
pub fn test_env(base_url: &str) -> Env {
    Env {
        api_key: TEST_API_KEY.to_string(),
        api_secret: TEST_API_SECRET.to_string(),
        base_url: base_url.to_string(),
        cors_proxy_url: None,
        quote_asset: "USDT".to_string(),
        initial_amount: 10.0,
        target_amount: 1000.0,
        trade_speed: 5,
        auto_trade_enabled: true,
        preview_mode: true,
        request_timeout_ms: 2_000,
        network_retry_limit: 1,
        retry_delay_ms: 10,
        balance_refresh_interval_ms: 30_000,
        market_scan_limit: 10,
        volatile_market_count: 3,
    }
}

/// Default settings without the pauses that would slow tests down.
pub fn fast_settings() -> TradeSettings {
    TradeSettings {
        failure_pause_step_ms: 0,
        new_day_delay_ms: 20,
        ..Default::default()
    }
}

/// Mock HTTP responses for testing
pub mod mocks {
    use serde_json::json;

    pub fn account_response(usdt_free: &str) -> serde_json::Value {
        json!({
            "makerCommission": 10,
            "canTrade": true,
            "accountType": "SPOT",
            "balances": [
                { "asset": "BTC", "free": "0.00100000", "locked": "0.00000000" },
                { "asset": "USDT", "free": usdt_free, "locked": "0.00000000" }
            ]
        })
    }

    pub fn exchange_info_response() -> serde_json::Value {
        json!({
            "timezone": "UTC",
            "serverTime": 1700000000000_i64,
            "symbols": [
                {
                    "symbol": "BTCUSDT",
                    "status": "TRADING",
                    "baseAsset": "BTC",
                    "quoteAsset": "USDT",
                    "isSpotTradingAllowed": true,
                    "filters": [
                        { "filterType": "PRICE_FILTER", "minPrice": "0.01000000", "maxPrice": "1000000.00000000", "tickSize": "0.01000000" },
                        { "filterType": "LOT_SIZE", "minQty": "0.00001000", "maxQty": "9000.00000000", "stepSize": "0.00001000" }
                    ]
                },
                {
                    "symbol": "ETHBTC",
                    "status": "TRADING",
                    "baseAsset": "ETH",
                    "quoteAsset": "BTC",
                    "isSpotTradingAllowed": true,
                    "filters": []
                },
                {
                    "symbol": "OLDUSDT",
                    "status": "BREAK",
                    "baseAsset": "OLD",
                    "quoteAsset": "USDT",
                    "isSpotTradingAllowed": true,
                    "filters": []
                },
                {
                    "symbol": "NOLOTUSDT",
                    "status": "TRADING",
                    "baseAsset": "NOLOT",
                    "quoteAsset": "USDT",
                    "isSpotTradingAllowed": false,
                    "filters": []
                }
            ]
        })
    }

    pub fn ticker_response(symbol: &str, price: &str) -> serde_json::Value {
        json!({ "symbol": symbol, "price": price })
    }

    /// Book with the given best bid/ask and `qty` on each of three levels per side.
    pub fn order_book_response(best_bid: f64, best_ask: f64, qty: &str) -> serde_json::Value {
        json!({
            "lastUpdateId": 1027024,
            "bids": [
                [format!("{:.2}", best_bid), qty],
                [format!("{:.2}", best_bid - 1.0), qty],
                [format!("{:.2}", best_bid - 2.0), qty]
            ],
            "asks": [
                [format!("{:.2}", best_ask), qty],
                [format!("{:.2}", best_ask + 1.0), qty],
                [format!("{:.2}", best_ask + 2.0), qty]
            ]
        })
    }

    pub fn order_response() -> serde_json::Value {
        json!({
            "symbol": "BTCUSDT",
            "orderId": 28,
            "clientOrderId": "6gCrw2kRUAF9CvJDGP16IP",
            "transactTime": 1507725176595_i64,
            "price": "0.00000000",
            "origQty": "0.00125000",
            "executedQty": "0.00125000",
            "status": "FILLED",
            "type": "MARKET",
            "side": "BUY"
        })
    }

    pub const PROXY_ACTIVATION_BODY: &str =
        "See /corsdemo for more info. Missing required request header.";
}
