use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{Env, PROXY_ACTIVATION_MARKER};
use crate::error::{ExchangeError, ExchangeResult};

/// Fixed-delay retry: `retries` extra attempts after the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    pub fn from_env(env: &Env) -> Self {
        Self::new(env.network_retry_limit, Duration::from_millis(env.retry_delay_ms))
    }

    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            crate::config::MAX_RETRIES,
            Duration::from_millis(crate::config::RETRY_DELAY_MS),
        )
    }
}

/// Sends one request and maps non-2xx replies to `ExchangeError`.
pub async fn send_once(request: RequestBuilder) -> ExchangeResult<Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::FORBIDDEN && body.contains(PROXY_ACTIVATION_MARKER) {
        return Err(ExchangeError::ProxyActivationRequired);
    }
    // Binance rejects unknown keys, bad signatures and missing permissions with 401
    if status == StatusCode::UNAUTHORIZED {
        return Err(ExchangeError::InvalidCredentials(body));
    }
    Err(ExchangeError::Http { status, body })
}

/// Sends the request built by `build`, retrying failed attempts after a fixed
/// delay. Proxy activation and credential errors are returned immediately.
pub async fn fetch_with_retry<F>(build: F, policy: &RetryPolicy) -> ExchangeResult<Response>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        debug!(attempt, "sending request");
        match send_once(build()).await {
            Ok(response) => return Ok(response),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) if attempt <= policy.retries => {
                warn!(
                    attempt,
                    retries = policy.retries,
                    delay_ms = policy.delay.as_millis() as u64,
                    error = %e,
                    "request failed, retrying"
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

pub async fn decode_json<T: DeserializeOwned>(response: Response) -> ExchangeResult<T> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ExchangeError::Decode(format!("{}: {}", e, text)))
}
