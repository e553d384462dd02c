use rand::Rng;
use std::time::Duration;

use super::trade_executor::{execute_trade, TradeAttempt};
use super::trading_state::SharedState;
use crate::config::TradeSettings;
use crate::utils::{reserve_profit, BinanceClient, Logger};

/// Books the daily target once `balance` reaches it: 30 % is reserved as
/// profit and, if the remaining 70 % still covers the starting amount, a new
/// day starts after a short pause with that remainder as the balance.
///
/// Returns false when the target is not reached or was already handled.
pub async fn handle_daily_target_reached(
    state: &SharedState,
    settings: &TradeSettings,
    balance: f64,
) -> bool {
    {
        let mut s = state.lock().await;
        if balance < settings.target_amount || s.daily_target_reached {
            return false;
        }
        s.daily_target_reached = true;
    }
    Logger::success(&format!(
        "🎯 Daily target reached! Balance hit ${:.2} (target ${:.2})",
        balance, settings.target_amount
    ));

    let reserve_amount = balance * settings.reserve_ratio;
    let profit_amount = balance * settings.profit_ratio();

    let reserved = reserve_profit(profit_amount, &settings.quote_asset);

    let mut s = state.lock().await;
    if reserved {
        s.total_profit_reserved += profit_amount;
        if let Some(latest) = s.history.latest_mut() {
            latest.profit_reserved = Some(profit_amount);
        }
    }

    if reserve_amount >= s.initial_amount {
        s.current_balance = reserve_amount;
        let next_day = s.day_count + 1;
        drop(s);

        let state = state.clone();
        let delay = Duration::from_millis(settings.new_day_delay_ms);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut s = state.lock().await;
            s.daily_target_reached = false;
            s.day_count += 1;
            Logger::info(&format!(
                "☀️  New trading day begins: day {} starts with ${:.2}",
                next_day, reserve_amount
            ));
        });
    }

    true
}

/// Runs one trade and settles the daily target when the trade went through.
pub async fn execute_trade_with_target_check<R: Rng>(
    client: &BinanceClient,
    state: &SharedState,
    settings: &TradeSettings,
    rng: &mut R,
) -> Option<TradeAttempt> {
    let attempt = execute_trade(client, state, settings, rng).await;
    if let Some(result) = attempt {
        if result.success {
            handle_daily_target_reached(state, settings, result.new_balance).await;
        }
    }
    attempt
}
