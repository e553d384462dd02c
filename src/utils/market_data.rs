use tracing::warn;

use super::binance_client::BinanceClient;
use crate::config::{
    DEPTH_LEVELS, DEPTH_PRESSURE_RATIO, EXCHANGE_INFO, ORDER_BOOK, ORDER_BOOK_LIMIT, TICKER_PRICE,
};
use crate::error::{ExchangeError, ExchangeResult};
use crate::interfaces::{ExchangeInfo, OrderBook, OrderSide, PriceLevel, TickerPrice};

impl BinanceClient {
    pub async fn current_price(&self, symbol: &str) -> ExchangeResult<f64> {
        let ticker: TickerPrice = self
            .public_get(TICKER_PRICE, &[("symbol", symbol.to_string())])
            .await?;
        ticker
            .price
            .parse()
            .map_err(|_| ExchangeError::Decode(format!("invalid price for {}: {}", symbol, ticker.price)))
    }

    pub async fn order_book(&self, symbol: &str, limit: u32) -> ExchangeResult<OrderBook> {
        self.public_get(
            ORDER_BOOK,
            &[("symbol", symbol.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    pub async fn exchange_info(&self) -> ExchangeResult<ExchangeInfo> {
        self.public_get(EXCHANGE_INFO, &[]).await
    }

    /// Spot symbols currently trading against `quote`. Empty on error.
    pub async fn tradable_pairs(&self, quote: &str) -> Vec<String> {
        match self.exchange_info().await {
            Ok(info) => info
                .symbols
                .into_iter()
                .filter(|s| s.status == "TRADING" && s.quote_asset == quote && s.is_spot_trading_allowed)
                .map(|s| s.symbol)
                .collect(),
            Err(e) => {
                warn!(error = %e, quote, "failed to get tradable pairs");
                Vec::new()
            }
        }
    }

    /// Volatility score of `symbol` from a 20-level book, 0 on any error.
    pub async fn calculate_volatility(&self, symbol: &str) -> f64 {
        let result = match self.order_book(symbol, ORDER_BOOK_LIMIT).await {
            Ok(book) => volatility_score(symbol, &book),
            Err(e) => Err(e),
        };
        result.unwrap_or_else(|e| {
            warn!(error = %e, symbol, "failed to calculate volatility");
            0.0
        })
    }
}

fn level_quantity(level: &PriceLevel) -> f64 {
    level[1].parse().unwrap_or(0.0)
}

fn level_price(level: &PriceLevel) -> f64 {
    level[0].parse().unwrap_or(0.0)
}

/// Whether the top of the book leans towards `side`.
pub fn analyze_market_depth(book: &OrderBook, side: OrderSide) -> bool {
    let bid_volume: f64 = book.bids.iter().take(DEPTH_LEVELS).map(level_quantity).sum();
    let ask_volume: f64 = book.asks.iter().take(DEPTH_LEVELS).map(level_quantity).sum();

    match side {
        OrderSide::Buy => bid_volume > ask_volume * DEPTH_PRESSURE_RATIO,
        OrderSide::Sell => ask_volume > bid_volume * DEPTH_PRESSURE_RATIO,
    }
}

/// Spread in percent of the best bid, weighted by log10 of the total volume
/// on both sides of the book.
pub fn volatility_score(symbol: &str, book: &OrderBook) -> ExchangeResult<f64> {
    let (best_bid, best_ask) = match (book.bids.first(), book.asks.first()) {
        (Some(bid), Some(ask)) => (level_price(bid), level_price(ask)),
        _ => return Err(ExchangeError::EmptyOrderBook(symbol.to_string())),
    };
    let spread = (best_ask - best_bid) / best_bid * 100.0;

    let total_volume: f64 = book
        .bids
        .iter()
        .chain(book.asks.iter())
        .map(level_quantity)
        .sum();

    Ok(spread * total_volume.log10())
}
