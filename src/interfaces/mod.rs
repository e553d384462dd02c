use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    #[serde(default)]
    pub can_trade: bool,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub balances: Vec<AssetBalance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetBalance {
    pub asset: String,
    pub free: String,
    pub locked: String,
}

impl AssetBalance {
    pub fn free_amount(&self) -> f64 {
        self.free.parse().unwrap_or(0.0)
    }

    pub fn locked_amount(&self) -> f64 {
        self.locked.parse().unwrap_or(0.0)
    }
}

/// `[price, quantity]` as decimal strings.
pub type PriceLevel = [String; 2];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBook {
    #[serde(default)]
    pub last_update_id: u64,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeInfo {
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub server_time: i64,
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub status: String,
    pub base_asset: String,
    pub quote_asset: String,
    #[serde(default = "default_true")]
    pub is_spot_trading_allowed: bool,
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
}

fn default_true() -> bool {
    true
}

impl SymbolInfo {
    pub fn filter(&self, filter_type: &str) -> Option<&SymbolFilter> {
        self.filters.iter().find(|f| f.filter_type == filter_type)
    }
}

/// One entry of a symbol's `filters` array. Only the fields used for lot
/// sizing are kept, the rest of each filter object is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolFilter {
    pub filter_type: String,
    #[serde(default)]
    pub min_qty: Option<String>,
    #[serde(default)]
    pub max_qty: Option<String>,
    #[serde(default)]
    pub step_size: Option<String>,
    #[serde(default)]
    pub tick_size: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerPrice {
    pub symbol: String,
    pub price: String,
}

/// Reply to `POST /api/v3/order`. The test endpoint answers `{}`, so every
/// field has a default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderResponse {
    pub symbol: String,
    pub order_id: i64,
    pub client_order_id: String,
    pub transact_time: i64,
    pub price: String,
    pub orig_qty: String,
    pub executed_qty: String,
    pub status: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub side: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            other => Err(format!("Unknown order side: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Limit,
    Market,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Limit => "LIMIT",
            OrderType::Market => "MARKET",
        }
    }
}

/// A trade as shown in the session history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub market: String,
    pub side: OrderSide,
    pub amount: f64,
    pub balance_after: f64,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_reserved: Option<f64>,
}

/// History page filters. `None` means "all".
#[derive(Debug, Clone, Default)]
pub struct TradeFilter {
    pub search: Option<String>,
    pub side: Option<OrderSide>,
    pub success: Option<bool>,
}

impl TradeFilter {
    pub fn matches(&self, trade: &Trade) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            if !trade.market.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        if let Some(side) = self.side {
            if trade.side != side {
                return false;
            }
        }
        if let Some(success) = self.success {
            if trade.success != success {
                return false;
            }
        }
        true
    }
}
