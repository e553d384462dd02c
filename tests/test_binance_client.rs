//! Exchange client tests against a mock Binance server

mod common;

use common::{mocks, public_test_client, test_client, test_env, TEST_API_KEY, TEST_API_SECRET};
use rust_decimal::Decimal;
use serde_json::json;
use spot_autotrader::error::ExchangeError;
use spot_autotrader::interfaces::OrderSide;
use spot_autotrader::utils::signature::create_signature;
use spot_autotrader::utils::health_check::HealthCheckResult;
use spot_autotrader::utils::{
    fetch_actual_balance, perform_health_check, BinanceClient, Credentials, RetryPolicy,
};
use std::str::FromStr;
use std::time::Duration;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_account(server: &MockServer, usdt_free: &str) {
    Mock::given(method("GET"))
        .and(path("/api/v3/account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::account_response(usdt_free)))
        .mount(server)
        .await;
}

async fn mount_pricing(server: &MockServer, symbol: &str, price: &str) {
    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/price"))
        .and(query_param("symbol", symbol))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::ticker_response(symbol, price)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/exchangeInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::exchange_info_response()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_ping_reports_reachability() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(public_test_client(&server).ping().await);
}

#[tokio::test]
async fn test_ping_false_after_retries() {
    let server = MockServer::start().await;
    // One try plus one retry
    Mock::given(method("GET"))
        .and(path("/api/v3/ping"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .expect(2)
        .mount(&server)
        .await;

    assert!(!public_test_client(&server).ping().await);
}

#[tokio::test]
async fn test_retry_recovers_from_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/exchangeInfo"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/exchangeInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::exchange_info_response()))
        .expect(1)
        .mount(&server)
        .await;

    let info = public_test_client(&server).exchange_info().await.unwrap();
    assert_eq!(info.symbols.len(), 4);
    assert_eq!(info.symbols[0].filter("LOT_SIZE").unwrap().step_size.as_deref(), Some("0.00001000"));
}

#[tokio::test]
async fn test_proxy_activation_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/exchangeInfo"))
        .respond_with(ResponseTemplate::new(403).set_body_string(mocks::PROXY_ACTIVATION_BODY))
        .expect(1)
        .mount(&server)
        .await;

    let client = BinanceClient::new(&server.uri(), None, RetryPolicy::new(3, Duration::from_millis(10))).unwrap();
    let err = client.exchange_info().await.unwrap_err();
    assert!(matches!(err, ExchangeError::ProxyActivationRequired));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_plain_forbidden_is_an_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/exchangeInfo"))
        .respond_with(ResponseTemplate::new(403).set_body_string("WAF limit"))
        .expect(2)
        .mount(&server)
        .await;

    let err = public_test_client(&server).exchange_info().await.unwrap_err();
    match err {
        ExchangeError::Http { status, body } => {
            assert_eq!(status.as_u16(), 403);
            assert_eq!(body, "WAF limit");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_signed_request_carries_key_and_valid_signature() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/account"))
        .and(header("X-MBX-APIKEY", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::account_response("100.00000000")))
        .expect(1)
        .mount(&server)
        .await;

    let balance = test_client(&server).free_balance("USDT").await.unwrap();
    assert!((balance - 100.0).abs() < 1e-9);

    let requests = server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap().to_string();
    let (payload, signature) = query.split_once("&signature=").unwrap();
    assert!(payload.starts_with("timestamp="));
    assert_eq!(signature, create_signature(payload, TEST_API_SECRET));
}

#[tokio::test]
async fn test_signed_request_without_credentials() {
    let server = MockServer::start().await;
    let err = public_test_client(&server).account_info().await.unwrap_err();
    assert!(matches!(err, ExchangeError::MissingCredentials));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_free_balance_of_missing_asset_is_zero() {
    let server = MockServer::start().await;
    mount_account(&server, "5.5").await;
    let client = test_client(&server);

    assert_eq!(client.free_balance("DOGE").await.unwrap(), 0.0);
    assert!((fetch_actual_balance(&client, "USDT").await - 5.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_fetch_actual_balance_is_zero_on_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/account"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"code": -2015, "msg": "Invalid API-key"})))
        .mount(&server)
        .await;

    assert_eq!(fetch_actual_balance(&test_client(&server), "USDT").await, 0.0);
}

#[tokio::test]
async fn test_tradable_pairs_filters_quote_and_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/exchangeInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::exchange_info_response()))
        .mount(&server)
        .await;
    let client = public_test_client(&server);

    assert_eq!(client.tradable_pairs("USDT").await, vec!["BTCUSDT"]);
    assert_eq!(client.tradable_pairs("BTC").await, vec!["ETHBTC"]);
    assert!(client.tradable_pairs("EUR").await.is_empty());
}

#[tokio::test]
async fn test_tradable_pairs_empty_on_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/exchangeInfo"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(public_test_client(&server).tradable_pairs("USDT").await.is_empty());
}

#[tokio::test]
async fn test_current_price_and_order_book() {
    let server = MockServer::start().await;
    mount_pricing(&server, "BTCUSDT", "30000.00000000").await;
    Mock::given(method("GET"))
        .and(path("/api/v3/depth"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::order_book_response(100.0, 101.0, "10")))
        .mount(&server)
        .await;
    let client = public_test_client(&server);

    assert_eq!(client.current_price("BTCUSDT").await.unwrap(), 30000.0);
    let book = client.order_book("BTCUSDT", 20).await.unwrap();
    assert_eq!(book.bids.len(), 3);
    assert_eq!(book.asks[0][0], "101.00");

    // 1% spread over 60 units of volume
    let score = client.calculate_volatility("BTCUSDT").await;
    assert!((score - 60f64.log10()).abs() < 1e-9);
}

#[tokio::test]
async fn test_volatility_is_zero_on_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/depth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"lastUpdateId": 1, "bids": [], "asks": []})))
        .mount(&server)
        .await;

    assert_eq!(public_test_client(&server).calculate_volatility("BTCUSDT").await, 0.0);
}

#[tokio::test]
async fn test_optimal_quantity_snaps_to_lot_size() {
    let server = MockServer::start().await;
    mount_pricing(&server, "BTCUSDT", "30000.00").await;
    let client = public_test_client(&server);

    // 20 USDT at 30000 is 0.000666.., floored to the 0.00001 step
    let quantity = client.calculate_optimal_quantity("BTCUSDT", 100.0, 20.0).await;
    assert_eq!(quantity.to_string(), "0.00066");
}

#[tokio::test]
async fn test_optimal_quantity_lifted_to_min_qty() {
    let server = MockServer::start().await;
    mount_pricing(&server, "BTCUSDT", "10000000.00").await;

    let quantity = public_test_client(&server)
        .calculate_optimal_quantity("BTCUSDT", 10.0, 20.0)
        .await;
    assert_eq!(quantity.to_string(), "0.00001");
}

#[tokio::test]
async fn test_optimal_quantity_falls_back() {
    let server = MockServer::start().await;
    mount_pricing(&server, "OLDUSDT", "2.00").await;
    mount_pricing(&server, "MISSINGUSDT", "2.00").await;
    let client = public_test_client(&server);
    let fallback = Decimal::from_str("0.001").unwrap();

    // No LOT_SIZE filter
    assert_eq!(client.calculate_optimal_quantity("OLDUSDT", 100.0, 25.0).await, fallback);
    // Not listed
    assert_eq!(client.calculate_optimal_quantity("MISSINGUSDT", 100.0, 25.0).await, fallback);
}

#[tokio::test]
async fn test_preview_order_goes_to_test_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/order/test"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("side", "BUY"))
        .and(query_param("type", "MARKET"))
        .and(query_param("quantity", "0.00066"))
        .and(header("X-MBX-APIKEY", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let order = test_client(&server)
        .execute_order("BTCUSDT", OrderSide::Buy, Decimal::from_str("0.00066").unwrap(), None)
        .await
        .unwrap();
    assert_eq!(order.status, "PREVIEW");
    assert_eq!(order.symbol, "BTCUSDT");
    assert_eq!(order.order_type, "MARKET");
    assert_eq!(order.orig_qty, "0.00066");
}

#[tokio::test]
async fn test_live_limit_order_params() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/order"))
        .and(query_param("type", "LIMIT"))
        .and(query_param("timeInForce", "GTC"))
        .and(query_param("price", "29000.5"))
        .and(query_param("side", "SELL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::order_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server).with_preview(false);
    let order = client
        .execute_order(
            "BTCUSDT",
            OrderSide::Sell,
            Decimal::from_str("0.00125").unwrap(),
            Some(Decimal::from_str("29000.5").unwrap()),
        )
        .await
        .unwrap();
    assert_eq!(order.order_id, 28);
    assert_eq!(order.status, "FILLED");
}

#[tokio::test]
async fn test_rejected_order_surfaces_exchange_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v3/order/test"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"code": -1013, "msg": "Filter failure: LOT_SIZE"})),
        )
        .mount(&server)
        .await;

    let err = test_client(&server)
        .execute_order("BTCUSDT", OrderSide::Buy, Decimal::from_str("0.001").unwrap(), None)
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(err.to_string().contains("LOT_SIZE"));
}

#[tokio::test]
async fn test_validate_api_keys_accepts_working_pair() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    mount_account(&server, "1").await;

    assert!(test_client(&server).validate_api_keys().await.unwrap());
}

#[tokio::test]
async fn test_validate_api_keys_rejects_short_keys_offline() {
    let server = MockServer::start().await;
    let client = BinanceClient::new(
        &server.uri(),
        Some(Credentials::new("short", "alsoshort")),
        RetryPolicy::none(),
    )
    .unwrap();

    assert!(!client.validate_api_keys().await.unwrap());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_validate_api_keys_rejected_by_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/account"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"code": -2015, "msg": "Invalid API-key"})))
        .mount(&server)
        .await;

    assert!(!test_client(&server).validate_api_keys().await.unwrap());
}

#[tokio::test]
async fn test_relay_waiting_for_activation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"/api/v3/ping$"))
        .respond_with(ResponseTemplate::new(403).set_body_string(mocks::PROXY_ACTIVATION_BODY))
        .expect(1)
        .mount(&server)
        .await;

    let relayed = BinanceClient::new("https://api.binance.com", None, RetryPolicy::none())
        .unwrap()
        .with_proxy(Some(format!("{}/", server.uri())));
    assert!(relayed.needs_proxy_activation().await);

    let direct = public_test_client(&server);
    assert!(!direct.needs_proxy_activation().await);
}

#[tokio::test]
async fn test_relay_prefixes_endpoint() {
    let client = BinanceClient::new("https://api.binance.com/", None, RetryPolicy::none())
        .unwrap()
        .with_proxy(Some("https://relay.example/".to_string()));
    assert_eq!(
        client.endpoint("/api/v3/ping"),
        "https://relay.example/https://api.binance.com/api/v3/ping"
    );

    let cleared = client.with_proxy(Some(String::new()));
    assert_eq!(cleared.proxy_url(), None);
}

#[tokio::test]
async fn test_unreachable_relay_needs_activation() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let relayed = BinanceClient::new("https://api.binance.com", None, RetryPolicy::none())
        .unwrap()
        .with_proxy(Some(format!("http://127.0.0.1:{}/", port)));

    assert!(relayed.needs_proxy_activation().await);
}

#[tokio::test]
async fn test_active_relay_needs_no_activation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"/api/v3/ping$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let relayed = BinanceClient::new("https://api.binance.com", None, RetryPolicy::none())
        .unwrap()
        .with_proxy(Some(format!("{}/", server.uri())));
    assert!(!relayed.needs_proxy_activation().await);
}

#[tokio::test]
async fn test_unauthorized_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/account"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"code": -2015, "msg": "Invalid API-key"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = BinanceClient::new(
        &server.uri(),
        Some(Credentials::new(TEST_API_KEY, TEST_API_SECRET)),
        RetryPolicy::new(3, Duration::from_millis(10)),
    )
    .unwrap();

    match client.account_info().await {
        Err(e @ ExchangeError::InvalidCredentials(_)) => {
            assert!(!e.is_retryable());
            assert!(e.to_string().contains("Invalid API-key"));
        }
        other => panic!("expected invalid credentials, got {:?}", other),
    }
}

/// Ping, account with `usdt` free and exchange info all answering.
async fn healthy_exchange(usdt: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::account_response(usdt)))
        .mount(&server)
        .await;
    server
}

async fn check_health(server: &MockServer) -> HealthCheckResult {
    let env = test_env(&server.uri());
    let client = BinanceClient::from_env(&env).unwrap();
    perform_health_check(&client, &env).await
}

async fn mount_exchange_info(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v3/exchangeInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mocks::exchange_info_response()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_health_check_all_ok() {
    let server = healthy_exchange("100.00").await;
    mount_exchange_info(&server).await;

    let result = check_health(&server).await;
    assert!(result.healthy);
    assert!(result.checks.proxy.is_ok());
    assert!(result.checks.connectivity.is_ok());
    assert!(result.checks.credentials.is_ok());
    assert!(result.checks.exchange_info.is_ok());
    assert_eq!(result.checks.balance.status, "ok");
    assert_eq!(result.checks.balance.balance, Some(100.0));
}

#[tokio::test]
async fn test_health_check_low_balance_is_a_warning() {
    let server = healthy_exchange("5.00").await;
    mount_exchange_info(&server).await;

    let result = check_health(&server).await;
    assert!(result.healthy);
    assert_eq!(result.checks.balance.status, "warning");
    assert_eq!(result.checks.balance.balance, Some(5.0));
}

#[tokio::test]
async fn test_health_check_zero_balance_is_unhealthy() {
    let server = healthy_exchange("0.00000000").await;
    mount_exchange_info(&server).await;

    let result = check_health(&server).await;
    assert!(!result.healthy);
    assert_eq!(result.checks.balance.status, "error");
    assert_eq!(result.checks.balance.balance, None);
}

#[tokio::test]
async fn test_health_check_fails_without_exchange_info() {
    let server = healthy_exchange("100.00").await;
    Mock::given(method("GET"))
        .and(path("/api/v3/exchangeInfo"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = check_health(&server).await;
    assert!(!result.healthy);
    assert_eq!(result.checks.exchange_info.status, "error");
    assert_eq!(result.checks.balance.status, "ok");
}

#[tokio::test]
async fn test_health_check_reports_locked_relay() {
    let server = healthy_exchange("100.00").await;
    mount_exchange_info(&server).await;
    let relay = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string(mocks::PROXY_ACTIVATION_BODY))
        .mount(&relay)
        .await;

    let env = spot_autotrader::config::Env {
        cors_proxy_url: Some(format!("{}/", relay.uri())),
        ..test_env(&server.uri())
    };
    let client = BinanceClient::from_env(&env).unwrap();
    let result = perform_health_check(&client, &env).await;

    assert!(!result.healthy);
    assert_eq!(result.checks.proxy.status, "error");
    assert!(result.checks.proxy.message.contains("corsdemo"));
}
