use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::TradeSettings;
use crate::interfaces::{Trade, TradeFilter};
use crate::utils::{fetch_actual_balance, BinanceClient, Logger};

pub type SharedState = Arc<Mutex<TradingState>>;

/// Most recent trades, newest first.
#[derive(Debug, Clone)]
pub struct TradeHistory {
    trades: VecDeque<Trade>,
    limit: usize,
}

impl TradeHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            trades: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn push(&mut self, trade: Trade) {
        self.trades.push_front(trade);
        self.trades.truncate(self.limit);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter()
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn latest(&self) -> Option<&Trade> {
        self.trades.front()
    }

    pub fn latest_mut(&mut self) -> Option<&mut Trade> {
        self.trades.front_mut()
    }

    pub fn filter<'a>(&'a self, filter: &'a TradeFilter) -> impl Iterator<Item = &'a Trade> + 'a {
        self.trades.iter().filter(move |t| filter.matches(t))
    }
}

#[derive(Debug, Clone)]
pub struct TradingState {
    pub initial_amount: f64,
    pub current_balance: f64,
    pub auto_trade_enabled: bool,
    pub history: TradeHistory,
    pub trade_count: u64,
    pub daily_target_reached: bool,
    pub day_count: u32,
    pub trade_speed: u32,
    pub total_profit_reserved: f64,
    pub available_markets: Vec<String>,
    pub volatile_markets: Vec<String>,
    pub is_initializing: bool,
    pub last_failed_attempt: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    pub is_trading: bool,
}

impl TradingState {
    pub fn new(settings: &TradeSettings) -> Self {
        Self {
            initial_amount: settings.initial_amount,
            current_balance: settings.initial_amount,
            auto_trade_enabled: true,
            history: TradeHistory::new(settings.history_limit),
            trade_count: 0,
            daily_target_reached: false,
            day_count: 1,
            trade_speed: settings.trade_speed,
            total_profit_reserved: 0.0,
            available_markets: Vec::new(),
            volatile_markets: Vec::new(),
            is_initializing: true,
            last_failed_attempt: None,
            consecutive_failures: 0,
            is_trading: false,
        }
    }

    pub fn shared(settings: &TradeSettings) -> SharedState {
        Arc::new(Mutex::new(Self::new(settings)))
    }

    /// Percent of the way to `target`, capped at 100.
    pub fn progress(&self, target: f64) -> f64 {
        if target <= 0.0 {
            return 100.0;
        }
        (self.current_balance / target * 100.0).min(100.0)
    }

    pub fn profit(&self) -> f64 {
        self.current_balance - self.initial_amount
    }

    pub fn profit_percentage(&self) -> f64 {
        if self.initial_amount <= 0.0 {
            return 0.0;
        }
        self.profit() / self.initial_amount * 100.0
    }

    pub fn record_trade(&mut self, trade: Trade) {
        self.history.push(trade);
        self.trade_count += 1;
    }
}

/// Loads tradable pairs and the real balance. The initial amount stays in
/// place when the balance cannot be read.
pub async fn initialize(client: &BinanceClient, state: &SharedState, settings: &TradeSettings) {
    if !client.has_credentials() {
        Logger::error("API configuration missing, set BINANCE_API_KEY and BINANCE_API_SECRET first");
        state.lock().await.is_initializing = false;
        return;
    }

    state.lock().await.is_initializing = true;

    let markets = client.tradable_pairs(&settings.quote_asset).await;
    Logger::info(&format!(
        "{} tradable {} pairs available",
        markets.len(),
        settings.quote_asset
    ));

    match client.free_balance(&settings.quote_asset).await {
        Ok(balance) => {
            Logger::success(&format!(
                "Balance updated: {:.2} {} available",
                balance, settings.quote_asset
            ));
            state.lock().await.current_balance = balance;
        }
        Err(e) => {
            Logger::error(&format!(
                "Could not fetch balance, check your API keys and connection: {}",
                e
            ));
            state.lock().await.current_balance = settings.initial_amount;
        }
    }

    let mut guard = state.lock().await;
    guard.available_markets = markets;
    guard.is_initializing = false;
}

/// Current free quote balance from the exchange, `None` when it reads as 0.
pub async fn actual_balance(client: &BinanceClient, settings: &TradeSettings) -> Option<f64> {
    let balance = fetch_actual_balance(client, &settings.quote_asset).await;
    (balance > 0.0).then_some(balance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::OrderSide;

    fn trade(id: u64, market: &str, side: OrderSide, success: bool) -> Trade {
        Trade {
            id,
            timestamp: Utc::now(),
            market: market.to_string(),
            side,
            amount: 1.0,
            balance_after: 10.0,
            success,
            message: String::new(),
            profit_reserved: None,
        }
    }

    #[test]
    fn history_is_capped_newest_first() {
        let mut history = TradeHistory::new(3);
        for id in 1..=5 {
            history.push(trade(id, "BTCUSDT", OrderSide::Buy, true));
        }
        let ids: Vec<u64> = history.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![5, 4, 3]);
    }

    #[test]
    fn history_filters_combine() {
        let mut history = TradeHistory::new(15);
        history.push(trade(1, "BTCUSDT", OrderSide::Buy, true));
        history.push(trade(2, "ETHUSDT", OrderSide::Sell, false));
        history.push(trade(3, "ETHBTC", OrderSide::Buy, false));

        let filter = TradeFilter {
            search: Some("eth".to_string()),
            side: Some(OrderSide::Buy),
            success: Some(false),
        };
        let ids: Vec<u64> = history.filter(&filter).map(|t| t.id).collect();
        assert_eq!(ids, vec![3]);

        let all: Vec<u64> = history.filter(&TradeFilter::default()).map(|t| t.id).collect();
        assert_eq!(all, vec![3, 2, 1]);
    }

    #[test]
    fn progress_is_capped() {
        let settings = TradeSettings::default();
        let mut state = TradingState::new(&settings);
        assert!((state.progress(1000.0) - 1.0).abs() < 1e-9);
        state.current_balance = 5000.0;
        assert_eq!(state.progress(1000.0), 100.0);
        assert!((state.profit_percentage() - 49_900.0).abs() < 1e-9);
    }
}
