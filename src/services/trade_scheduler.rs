use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{sleep, Duration};

use super::target_management::execute_trade_with_target_check;
use super::trading_state::SharedState;
use crate::config::TradeSettings;
use crate::utils::{BinanceClient, Logger};

const MAX_INTERVAL_MS: f64 = 60_000.0;
const IDLE_POLL: Duration = Duration::from_secs(1);

/// Time between trades: a minute split by `speed`, stretched by 50 % per
/// consecutive failure and never longer than a minute.
pub fn trade_interval(speed: u32, failures: u32) -> Duration {
    let mut ms = MAX_INTERVAL_MS / speed.max(1) as f64;
    if failures > 0 {
        ms = (ms * (1.0 + failures as f64 * 0.5)).min(MAX_INTERVAL_MS);
    }
    Duration::from_millis(ms as u64)
}

async fn ready_to_trade(state: &SharedState) -> Option<Duration> {
    let s = state.lock().await;
    (s.auto_trade_enabled && !s.daily_target_reached && !s.is_initializing)
        .then(|| trade_interval(s.trade_speed, s.consecutive_failures))
}

/// Sleeps for `wait`; false when shutdown was requested meanwhile.
async fn wait_or_shutdown(wait: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = sleep(wait) => !*shutdown.borrow(),
        changed = shutdown.changed() => changed.is_ok() && !*shutdown.borrow(),
    }
}

/// Auto-trade loop. Trades every `trade_interval` while auto trading is on,
/// the daily target is open and initialisation has finished.
pub async fn start_trade_scheduler(
    client: Arc<BinanceClient>,
    state: SharedState,
    settings: Arc<TradeSettings>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let mut rng = StdRng::from_entropy();
    Logger::success(&format!(
        "Trade scheduler ready: {} trade(s) per minute",
        settings.trade_speed
    ));

    loop {
        if *shutdown.borrow() {
            break;
        }

        let Some(interval) = ready_to_trade(&state).await else {
            if !wait_or_shutdown(IDLE_POLL, &mut shutdown).await {
                break;
            }
            continue;
        };

        if !wait_or_shutdown(interval, &mut shutdown).await {
            break;
        }

        // Conditions may have changed while waiting
        if ready_to_trade(&state).await.is_some() {
            execute_trade_with_target_check(&client, &state, &settings, &mut rng).await;
        }
    }

    Logger::info("Trade scheduler stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_follows_speed() {
        assert_eq!(trade_interval(5, 0), Duration::from_millis(12_000));
        assert_eq!(trade_interval(60, 0), Duration::from_millis(1_000));
    }

    #[test]
    fn failures_stretch_interval_up_to_a_minute() {
        assert_eq!(trade_interval(5, 2), Duration::from_millis(24_000));
        assert_eq!(trade_interval(5, 20), Duration::from_millis(60_000));
        assert_eq!(trade_interval(1, 1), Duration::from_millis(60_000));
    }

    #[test]
    fn zero_speed_is_treated_as_one() {
        assert_eq!(trade_interval(0, 0), Duration::from_millis(60_000));
    }
}
