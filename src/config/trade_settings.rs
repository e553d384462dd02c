use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::env::Env;

/// Knobs of the auto-trade loop.
///
/// The defaults are the numbers the dashboard has always used. Only the
/// amounts, speed and market counts are exposed through the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSettings {
    pub quote_asset: String,
    pub initial_amount: f64,
    pub target_amount: f64,
    /// Trades per minute.
    pub trade_speed: u32,
    pub min_balance_percent: f64,
    pub max_balance_percent: f64,
    /// Probability that a trade is a BUY.
    pub buy_probability: f64,
    pub max_profit_factor: f64,
    pub max_fallback_profit_factor: f64,
    /// Share of the balance booked as traded when an order fails.
    pub failed_trade_fraction: f64,
    pub failed_trade_haircut: f64,
    /// Share of the balance carried into the next day once the target is hit.
    pub reserve_ratio: f64,
    pub history_limit: usize,
    pub failure_threshold: u32,
    pub backoff_step_ms: u64,
    pub max_backoff_ms: u64,
    pub failure_pause_step_ms: u64,
    pub max_failure_pause_ms: u64,
    pub new_day_delay_ms: u64,
    pub market_scan_limit: usize,
    pub volatile_market_count: usize,
}

impl Default for TradeSettings {
    fn default() -> Self {
        Self {
            quote_asset: "USDT".to_string(),
            initial_amount: 10.0,
            target_amount: 1000.0,
            trade_speed: 5,
            min_balance_percent: 20.0,
            max_balance_percent: 30.0,
            buy_probability: 0.75,
            max_profit_factor: 0.05,
            max_fallback_profit_factor: 0.01,
            failed_trade_fraction: 0.1,
            failed_trade_haircut: 0.995,
            reserve_ratio: 0.7,
            history_limit: 15,
            failure_threshold: 3,
            backoff_step_ms: 5_000,
            max_backoff_ms: 60_000,
            failure_pause_step_ms: 1_000,
            max_failure_pause_ms: 10_000,
            new_day_delay_ms: 5_000,
            market_scan_limit: 50,
            volatile_market_count: 15,
        }
    }
}

impl TradeSettings {
    pub fn from_env(env: &Env) -> Self {
        Self {
            quote_asset: env.quote_asset.clone(),
            initial_amount: env.initial_amount,
            target_amount: env.target_amount,
            trade_speed: env.trade_speed,
            market_scan_limit: env.market_scan_limit,
            volatile_market_count: env.volatile_market_count,
            ..Default::default()
        }
    }

    /// Share of the balance taken as profit once the target is hit.
    pub fn profit_ratio(&self) -> f64 {
        1.0 - self.reserve_ratio
    }

    /// How long to hold off after `failures` consecutive failures, or `None`
    /// when the failure count is still below the threshold.
    pub fn backoff_window(&self, failures: u32) -> Option<Duration> {
        if failures < self.failure_threshold {
            return None;
        }
        let ms = (failures as u64 * self.backoff_step_ms).min(self.max_backoff_ms);
        Some(Duration::from_millis(ms))
    }

    /// Pause taken right after a failed order, based on the failure count
    /// before that order.
    pub fn failure_pause(&self, failures: u32) -> Duration {
        Duration::from_millis((failures as u64 * self.failure_pause_step_ms).min(self.max_failure_pause_ms))
    }
}

pub fn validate_trade_settings(settings: &TradeSettings) -> Vec<String> {
    let mut errors = Vec::new();

    if settings.initial_amount <= 0.0 {
        errors.push("initialAmount must be positive".to_string());
    }

    if settings.target_amount <= settings.initial_amount {
        errors.push("targetAmount must be greater than initialAmount".to_string());
    }

    if settings.trade_speed == 0 {
        errors.push("tradeSpeed must be at least 1 trade per minute".to_string());
    }

    if settings.min_balance_percent <= 0.0 || settings.max_balance_percent > 100.0 {
        errors.push("balance percent range must be within (0, 100]".to_string());
    }

    if settings.min_balance_percent > settings.max_balance_percent {
        errors.push("minBalancePercent cannot be greater than maxBalancePercent".to_string());
    }

    if !(0.0..=1.0).contains(&settings.buy_probability) {
        errors.push("buyProbability must be between 0 and 1".to_string());
    }

    if !(0.0..=1.0).contains(&settings.reserve_ratio) {
        errors.push("reserveRatio must be between 0 and 1".to_string());
    }

    if settings.history_limit == 0 {
        errors.push("historyLimit must be positive".to_string());
    }

    errors
}

impl fmt::Display for TradeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${:.2} → ${:.2} {} | {} trades/min | {:.0}-{:.0}% per trade",
            self.initial_amount,
            self.target_amount,
            self.quote_asset,
            self.trade_speed,
            self.min_balance_percent,
            self.max_balance_percent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        assert!(validate_trade_settings(&TradeSettings::default()).is_empty());
    }

    #[test]
    fn rejects_inverted_ranges() {
        let settings = TradeSettings {
            min_balance_percent: 40.0,
            max_balance_percent: 30.0,
            target_amount: 5.0,
            ..Default::default()
        };
        let errors = validate_trade_settings(&settings);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn backoff_kicks_in_at_threshold_and_caps() {
        let settings = TradeSettings::default();
        assert_eq!(settings.backoff_window(2), None);
        assert_eq!(settings.backoff_window(3), Some(Duration::from_millis(15_000)));
        assert_eq!(settings.backoff_window(20), Some(Duration::from_millis(60_000)));
    }

    #[test]
    fn failure_pause_caps_at_ten_seconds() {
        let settings = TradeSettings::default();
        assert_eq!(settings.failure_pause(0), Duration::ZERO);
        assert_eq!(settings.failure_pause(4), Duration::from_millis(4_000));
        assert_eq!(settings.failure_pause(50), Duration::from_millis(10_000));
    }
}
