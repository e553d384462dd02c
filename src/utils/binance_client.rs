//! Binance spot REST client.
//!
//! Endpoint wrappers live next to the code that uses them (`connectivity`,
//! `get_my_balance`, `market_data`, `post_order`); this module owns the
//! transport: base URL, optional relay prefix, API key header, signing and
//! retries.

use reqwest::Method;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::fetch_data::{decode_json, fetch_with_retry, RetryPolicy};
use super::signature::{sign_query, timestamp_ms};
use crate::config::{is_valid_api_credential, Env, API_KEY_HEADER};
use crate::error::{ExchangeError, ExchangeResult};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: &str, api_secret: &str) -> Self {
        Self {
            api_key: api_key.trim().to_string(),
            api_secret: api_secret.trim().to_string(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn api_secret(&self) -> &str {
        &self.api_secret
    }

    pub fn is_well_formed(&self) -> bool {
        is_valid_api_credential(&self.api_key) && is_valid_api_credential(&self.api_secret)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &crate::config::mask_secret(&self.api_key))
            .field("api_secret", &"****")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct BinanceClient {
    http: reqwest::Client,
    base_url: String,
    proxy_url: Option<String>,
    credentials: Option<Credentials>,
    retry: RetryPolicy,
    preview: bool,
}

impl BinanceClient {
    /// Client for `base_url` with the default timeout, no relay and preview
    /// mode off.
    pub fn new(
        base_url: &str,
        credentials: Option<Credentials>,
        retry: RetryPolicy,
    ) -> ExchangeResult<Self> {
        Self::build(base_url, credentials, retry, DEFAULT_TIMEOUT)
    }

    pub fn from_env(env: &Env) -> ExchangeResult<Self> {
        let client = Self::build(
            &env.base_url,
            env.credentials(),
            RetryPolicy::from_env(env),
            Duration::from_millis(env.request_timeout_ms),
        )?;
        Ok(client
            .with_proxy(env.cors_proxy_url.clone())
            .with_preview(env.preview_mode))
    }

    fn build(
        base_url: &str,
        credentials: Option<Credentials>,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> ExchangeResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            proxy_url: None,
            credentials,
            retry,
            preview: false,
        })
    }

    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn with_proxy(mut self, proxy_url: Option<String>) -> Self {
        self.proxy_url = proxy_url.filter(|p| !p.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy_url.as_deref()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn is_preview(&self) -> bool {
        self.preview
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Full URL for `path`, behind the relay when one is configured.
    pub fn endpoint(&self, path: &str) -> String {
        match &self.proxy_url {
            Some(proxy) => format!("{}{}{}", proxy, self.base_url, path),
            None => format!("{}{}", self.base_url, path),
        }
    }

    pub(crate) async fn public_get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> ExchangeResult<T> {
        let mut url = self.endpoint(path);
        if !params.is_empty() {
            url = format!("{}?{}", url, super::signature::build_query(params));
        }
        debug!(%url, "public GET");

        let response = fetch_with_retry(
            || {
                let request = self.http.get(&url);
                match &self.credentials {
                    Some(creds) => request.header(API_KEY_HEADER, creds.api_key()),
                    None => request,
                }
            },
            &self.retry,
        )
        .await?;
        decode_json(response).await
    }

    /// Signed request. Every attempt gets a fresh timestamp and signature.
    pub(crate) async fn signed_request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> ExchangeResult<T> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or(ExchangeError::MissingCredentials)?;
        let endpoint = self.endpoint(path);
        debug!(%method, path, "signed request");

        let response = fetch_with_retry(
            || {
                let query = sign_query(params, creds.api_secret(), timestamp_ms());
                self.http
                    .request(method.clone(), format!("{}?{}", endpoint, query))
                    .header(API_KEY_HEADER, creds.api_key())
            },
            &self.retry,
        )
        .await?;
        decode_json(response).await
    }
}
