use reqwest::Method;
use tracing::warn;

use super::binance_client::BinanceClient;
use super::fetch_data::send_once;
use crate::config::{ACCOUNT_INFO, TEST_CONNECTIVITY};
use crate::error::{ExchangeError, ExchangeResult};
use crate::interfaces::AccountInfo;

impl BinanceClient {
    /// `GET /api/v3/ping`. Any failure counts as unreachable.
    pub async fn ping(&self) -> bool {
        match self
            .public_get::<serde_json::Value>(TEST_CONNECTIVITY, &[])
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "connectivity test failed");
                false
            }
        }
    }

    /// Whether the configured relay still has to be unlocked by hand.
    /// Always false without a relay. A relay that cannot be reached at all is
    /// treated as needing activation.
    pub async fn needs_proxy_activation(&self) -> bool {
        if self.proxy_url().is_none() {
            return false;
        }

        match send_once(self.http().get(self.endpoint(TEST_CONNECTIVITY))).await {
            Ok(_) => false,
            Err(ExchangeError::ProxyActivationRequired) => true,
            Err(ExchangeError::Http { .. }) => false,
            Err(e) => {
                warn!(error = %e, "error checking CORS proxy");
                true
            }
        }
    }

    /// Checks the key pair end to end: shape, relay, connectivity and a
    /// signed account request. Only a relay that needs activation is
    /// reported as an error, every other failure is `Ok(false)`.
    pub async fn validate_api_keys(&self) -> ExchangeResult<bool> {
        match self.credentials() {
            Some(creds) if creds.is_well_formed() => {}
            _ => {
                warn!("invalid API keys: keys are too short or missing");
                return Ok(false);
            }
        }

        if self.needs_proxy_activation().await {
            warn!("CORS proxy needs activation");
            return Ok(false);
        }

        if !self.ping().await {
            warn!("failed to connect to Binance API");
            return Ok(false);
        }

        match self
            .signed_request::<AccountInfo>(Method::GET, ACCOUNT_INFO, &[])
            .await
        {
            Ok(_) => Ok(true),
            Err(ExchangeError::ProxyActivationRequired) => Err(ExchangeError::ProxyActivationRequired),
            Err(e) => {
                warn!(error = %e, "API key validation failed");
                Ok(false)
            }
        }
    }
}
