use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::warn;

use super::trading_state::SharedState;
use crate::utils::{BinanceClient, Logger};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefreshOutcome {
    /// A trade is running, the balance was left alone.
    Busy,
    Updated(f64),
    /// The account holds no such asset or the request failed.
    Unchanged,
}

/// Reads the free `asset` balance into the state unless a trade is running.
pub async fn refresh_balance(client: &BinanceClient, state: &SharedState, asset: &str) -> RefreshOutcome {
    if state.lock().await.is_trading {
        return RefreshOutcome::Busy;
    }

    match client.account_balances().await {
        Ok(balances) => match balances.iter().find(|b| b.asset == asset) {
            Some(entry) => {
                let free = entry.free_amount();
                let mut s = state.lock().await;
                // A trade may have started while the request was in flight
                if s.is_trading {
                    return RefreshOutcome::Busy;
                }
                s.current_balance = free;
                RefreshOutcome::Updated(free)
            }
            None => RefreshOutcome::Unchanged,
        },
        Err(e) => {
            warn!(error = %e, asset, "balance refresh failed");
            RefreshOutcome::Unchanged
        }
    }
}

/// Refreshes the balance right away and then every `period`.
pub async fn start_balance_updater(
    client: Arc<BinanceClient>,
    state: SharedState,
    asset: String,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    if !client.has_credentials() {
        return Ok(());
    }

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let RefreshOutcome::Updated(balance) = refresh_balance(&client, &state, &asset).await {
                    Logger::clear_line();
                    Logger::info(&format!("Balance updated: {:.2} {} available", balance, asset));
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    Ok(())
}
