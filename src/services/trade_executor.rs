use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::prelude::*;

use super::trading_state::{actual_balance, SharedState};
use crate::config::{TradeSettings, DEFAULT_MARKET};
use crate::error::{ExchangeError, ExchangeResult};
use crate::interfaces::{OrderSide, Trade};
use crate::utils::{BinanceClient, Logger};

/// Result of a single order round trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeOutcome {
    pub traded_amount: f64,
    pub new_balance: f64,
    pub success: bool,
}

/// What the auto-trade loop reports after an attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeAttempt {
    pub success: bool,
    pub new_balance: f64,
}

/// A random volatile market, else a random tradable one, else BTCUSDT.
pub fn select_market<R: Rng>(volatile: &[String], available: &[String], rng: &mut R) -> String {
    volatile
        .choose(rng)
        .or_else(|| available.choose(rng))
        .cloned()
        .unwrap_or_else(|| DEFAULT_MARKET.to_string())
}

pub fn choose_side<R: Rng>(settings: &TradeSettings, rng: &mut R) -> OrderSide {
    if rng.gen::<f64>() < settings.buy_probability {
        OrderSide::Buy
    } else {
        OrderSide::Sell
    }
}

/// Share of the balance put into one trade, in percent.
pub fn balance_percent<R: Rng>(settings: &TradeSettings, rng: &mut R) -> f64 {
    let spread = settings.max_balance_percent - settings.min_balance_percent;
    (settings.min_balance_percent + rng.gen::<f64>() * spread).min(settings.max_balance_percent)
}

/// Sizes and places one market order. Ordinary order failures are booked as
/// a low-return trade; relay and credential errors are returned.
pub async fn execute_single_trade<R: Rng>(
    client: &BinanceClient,
    market: &str,
    side: OrderSide,
    balance: f64,
    settings: &TradeSettings,
    rng: &mut R,
) -> ExchangeResult<TradeOutcome> {
    let percent = balance_percent(settings, rng);
    let profit_roll: f64 = rng.gen();

    let result: ExchangeResult<Decimal> = async {
        let quantity = client.calculate_optimal_quantity(market, balance, percent).await;
        if quantity <= Decimal::ZERO {
            return Err(ExchangeError::InvalidQuantity(quantity.to_string()));
        }
        let order = client.execute_order(market, side, quantity, None).await?;
        Logger::order_result(
            true,
            &format!("{} {} {} ({})", side, order.orig_qty, market, order.status),
        );
        Ok(quantity)
    }
    .await;

    match result {
        Ok(quantity) => Ok(TradeOutcome {
            traded_amount: quantity.to_f64().unwrap_or(0.0),
            new_balance: balance * (1.0 + profit_roll * settings.max_profit_factor),
            success: true,
        }),
        Err(e) if !e.is_retryable() => Err(e),
        Err(e) => {
            Logger::order_result(false, &format!("{} on {}: {}", side, market, e));
            Ok(TradeOutcome {
                traded_amount: balance * settings.failed_trade_fraction,
                new_balance: balance * (1.0 + profit_roll * settings.max_fallback_profit_factor),
                success: false,
            })
        }
    }
}

fn side_word(side: OrderSide) -> &'static str {
    match side {
        OrderSide::Buy => "buy",
        OrderSide::Sell => "sell",
    }
}

/// One pass of the auto-trade loop. `None` when nothing was attempted:
/// credentials are missing, a trade is already running or the failure
/// backoff is still active.
pub async fn execute_trade<R: Rng>(
    client: &BinanceClient,
    state: &SharedState,
    settings: &TradeSettings,
    rng: &mut R,
) -> Option<TradeAttempt> {
    if !client.has_credentials() {
        Logger::error("API configuration missing, set your API keys first");
        return None;
    }

    {
        let mut s = state.lock().await;
        if s.is_trading {
            return None;
        }
        if let Some(window) = settings.backoff_window(s.consecutive_failures) {
            let elapsed_ms = s
                .last_failed_attempt
                .map(|at| (Utc::now() - at).num_milliseconds())
                .unwrap_or(i64::MAX);
            if elapsed_ms < window.as_millis() as i64 {
                Logger::info(&format!(
                    "Backoff period active. Waiting {}s before next attempt.",
                    window.as_secs()
                ));
                return None;
            }
        }
        s.is_trading = true;
    }

    let attempt = run_trade(client, state, settings, rng).await;
    state.lock().await.is_trading = false;
    Some(attempt)
}

async fn run_trade<R: Rng>(
    client: &BinanceClient,
    state: &SharedState,
    settings: &TradeSettings,
    rng: &mut R,
) -> TradeAttempt {
    if let Some(balance) = actual_balance(client, settings).await {
        state.lock().await.current_balance = balance;
    }

    let (balance, failures, trade_id, market) = {
        let s = state.lock().await;
        (
            s.current_balance,
            s.consecutive_failures,
            s.trade_count + 1,
            select_market(&s.volatile_markets, &s.available_markets, rng),
        )
    };
    let side = choose_side(settings, rng);
    Logger::info(&format!(
        "Attempting {} on {} with balance {:.2} {}",
        side_word(side),
        market,
        balance,
        settings.quote_asset
    ));

    match execute_single_trade(client, &market, side, balance, settings, rng).await {
        Ok(outcome) => {
            let balance_after = actual_balance(client, settings)
                .await
                .unwrap_or(outcome.new_balance);
            let message = if outcome.success {
                format!("Successful {} order on {}", side_word(side), market)
            } else {
                format!("{} on {} completed with less than optimal return", side, market)
            };
            let trade = Trade {
                id: trade_id,
                timestamp: Utc::now(),
                market,
                side,
                amount: outcome.traded_amount,
                balance_after,
                success: outcome.success,
                message,
                profit_reserved: None,
            };
            Logger::trade(&trade);

            let mut s = state.lock().await;
            s.current_balance = balance_after;
            s.consecutive_failures = 0;
            s.last_failed_attempt = None;
            s.record_trade(trade);

            TradeAttempt {
                success: true,
                new_balance: balance_after,
            }
        }
        Err(e) => {
            let balance_after = balance * settings.failed_trade_haircut;
            let trade = Trade {
                id: trade_id,
                timestamp: Utc::now(),
                market,
                side,
                amount: balance * settings.failed_trade_fraction,
                balance_after,
                success: false,
                message: format!("Trade failed: {}", e),
                profit_reserved: None,
            };
            Logger::trade(&trade);

            {
                let mut s = state.lock().await;
                s.consecutive_failures += 1;
                s.last_failed_attempt = Some(Utc::now());
                s.current_balance = balance_after;
                s.record_trade(trade);
            }

            tokio::time::sleep(settings.failure_pause(failures)).await;

            TradeAttempt {
                success: false,
                new_balance: balance_after,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn market_selection_prefers_volatile() {
        let mut rng = StdRng::seed_from_u64(7);
        let volatile = vec!["SOLUSDT".to_string()];
        let available = vec!["ETHUSDT".to_string()];
        assert_eq!(select_market(&volatile, &available, &mut rng), "SOLUSDT");
        assert_eq!(select_market(&[], &available, &mut rng), "ETHUSDT");
        assert_eq!(select_market(&[], &[], &mut rng), "BTCUSDT");
    }

    #[test]
    fn balance_percent_stays_in_range() {
        let settings = TradeSettings::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            let p = balance_percent(&settings, &mut rng);
            assert!((20.0..=30.0).contains(&p));
        }
    }

    #[test]
    fn side_is_mostly_buy() {
        let settings = TradeSettings::default();
        let mut rng = StdRng::seed_from_u64(3);
        let buys = (0..10_000)
            .filter(|_| choose_side(&settings, &mut rng) == OrderSide::Buy)
            .count();
        assert!((7_000..8_000).contains(&buys));
    }
}
