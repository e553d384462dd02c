use reqwest::Method;
use tracing::warn;

use super::binance_client::BinanceClient;
use crate::config::ACCOUNT_INFO;
use crate::error::ExchangeResult;
use crate::interfaces::{AccountInfo, AssetBalance};

impl BinanceClient {
    pub async fn account_info(&self) -> ExchangeResult<AccountInfo> {
        self.signed_request(Method::GET, ACCOUNT_INFO, &[]).await
    }

    pub async fn account_balances(&self) -> ExchangeResult<Vec<AssetBalance>> {
        Ok(self.account_info().await?.balances)
    }

    /// Free amount of `asset`, 0 when the account holds none.
    pub async fn free_balance(&self, asset: &str) -> ExchangeResult<f64> {
        let balances = self.account_balances().await?;
        Ok(balances
            .iter()
            .find(|b| b.asset == asset)
            .map(AssetBalance::free_amount)
            .unwrap_or(0.0))
    }
}

/// Free balance of `asset`, or 0 when it cannot be fetched.
pub async fn fetch_actual_balance(client: &BinanceClient, asset: &str) -> f64 {
    match client.free_balance(asset).await {
        Ok(balance) => balance,
        Err(e) => {
            warn!(error = %e, asset, "failed to fetch actual balance");
            0.0
        }
    }
}
