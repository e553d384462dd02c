//! Order sizing and placement.

use reqwest::Method;
use rust_decimal::prelude::*;
use tracing::{info, warn};

use super::binance_client::BinanceClient;
use super::logger::Logger;
use crate::config::{NEW_ORDER, TEST_ORDER};
use crate::error::{ExchangeError, ExchangeResult};
use crate::interfaces::{OrderResponse, OrderSide, OrderType};

const LOT_SIZE: &str = "LOT_SIZE";

/// Quantity used when the lot size cannot be worked out. Small enough for
/// most coins.
pub fn fallback_quantity() -> Decimal {
    Decimal::new(1, 3)
}

/// Floors `quantity` to a multiple of `step`, lifts it to `min_qty` and
/// gives it as many decimals as the step has.
pub fn round_to_step(quantity: Decimal, step: Decimal, min_qty: Decimal) -> ExchangeResult<Decimal> {
    if step <= Decimal::ZERO {
        return Err(ExchangeError::InvalidQuantity(format!("step size {} is not positive", step)));
    }

    let mut rounded = (quantity / step).floor() * step;
    if rounded < min_qty {
        rounded = min_qty;
    }

    let decimals = step.normalize().scale();
    rounded = rounded.round_dp_with_strategy(decimals, RoundingStrategy::ToZero);
    rounded.rescale(decimals);
    Ok(rounded)
}

fn parse_decimal(field: &str, value: Option<&str>) -> ExchangeResult<Decimal> {
    let raw = value.ok_or_else(|| ExchangeError::Decode(format!("missing {}", field)))?;
    Decimal::from_str(raw).map_err(|e| ExchangeError::Decode(format!("invalid {} {}: {}", field, raw, e)))
}

impl BinanceClient {
    async fn lot_sized_quantity(
        &self,
        symbol: &str,
        available_balance: f64,
        percent_of_balance: f64,
    ) -> ExchangeResult<Decimal> {
        let price = self.current_price(symbol).await?;
        let info = self.exchange_info().await?;
        let symbol_info = info
            .symbols
            .iter()
            .find(|s| s.symbol == symbol)
            .ok_or_else(|| ExchangeError::SymbolNotFound(symbol.to_string()))?;
        let lot_size = symbol_info
            .filter(LOT_SIZE)
            .ok_or_else(|| ExchangeError::MissingFilter {
                symbol: symbol.to_string(),
                filter: LOT_SIZE.to_string(),
            })?;
        let min_qty = parse_decimal("minQty", lot_size.min_qty.as_deref())?;
        let step = parse_decimal("stepSize", lot_size.step_size.as_deref())?;

        let amount = available_balance * (percent_of_balance / 100.0);
        let raw_quantity = Decimal::from_f64(amount / price).ok_or_else(|| {
            ExchangeError::InvalidQuantity(format!("{} / {} is not a finite quantity", amount, price))
        })?;

        round_to_step(raw_quantity, step, min_qty)
    }

    /// Quantity of `symbol` worth `percent_of_balance` % of
    /// `available_balance`, snapped to the symbol's lot size. Falls back to
    /// 0.001 when anything goes wrong.
    pub async fn calculate_optimal_quantity(
        &self,
        symbol: &str,
        available_balance: f64,
        percent_of_balance: f64,
    ) -> Decimal {
        match self
            .lot_sized_quantity(symbol, available_balance, percent_of_balance)
            .await
        {
            Ok(quantity) => quantity,
            Err(e) => {
                warn!(error = %e, symbol, "failed to calculate optimal quantity");
                fallback_quantity()
            }
        }
    }

    /// Places a LIMIT GTC order when `price` is given, a MARKET order
    /// otherwise. In preview mode the order is only validated by the
    /// exchange.
    pub async fn execute_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: Decimal,
        price: Option<Decimal>,
    ) -> ExchangeResult<OrderResponse> {
        info!(%side, %quantity, symbol, preview = self.is_preview(), "executing order");

        let order_type = if price.is_some() { OrderType::Limit } else { OrderType::Market };
        let mut params = vec![
            ("symbol", symbol.to_string()),
            ("side", side.as_str().to_string()),
            ("type", order_type.as_str().to_string()),
        ];
        match price {
            Some(price) => {
                params.push(("timeInForce", "GTC".to_string()));
                params.push(("quantity", quantity.to_string()));
                params.push(("price", price.to_string()));
            }
            None => params.push(("quantity", quantity.to_string())),
        }

        if self.is_preview() {
            let mut response: OrderResponse =
                self.signed_request(Method::POST, TEST_ORDER, &params).await?;
            response.symbol = symbol.to_string();
            response.side = side.as_str().to_string();
            response.order_type = order_type.as_str().to_string();
            response.orig_qty = quantity.to_string();
            response.price = price.map(|p| p.to_string()).unwrap_or_default();
            response.status = "PREVIEW".to_string();
            return Ok(response);
        }

        self.signed_request(Method::POST, NEW_ORDER, &params).await
    }
}

/// Funds already sit on the exchange account, so reserving profit only marks
/// it as realised.
pub fn reserve_profit(amount: f64, currency: &str) -> bool {
    Logger::success(&format!(
        "Profit of {:.2} {} marked as realised on your Binance account",
        amount, currency
    ));
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn floors_to_step_and_keeps_step_decimals() {
        let q = round_to_step(dec("0.123456"), dec("0.00100000"), dec("0.00100000")).unwrap();
        assert_eq!(q.to_string(), "0.123");
    }

    #[test]
    fn lifts_to_min_qty() {
        let q = round_to_step(dec("0.0004"), dec("0.001"), dec("0.002")).unwrap();
        assert_eq!(q, dec("0.002"));
    }

    #[test]
    fn whole_unit_steps() {
        let q = round_to_step(dec("17.9"), dec("1.00000000"), dec("1")).unwrap();
        assert_eq!(q.to_string(), "17");
    }

    #[test]
    fn rejects_zero_step() {
        assert!(round_to_step(dec("1"), Decimal::ZERO, Decimal::ZERO).is_err());
    }

    #[test]
    fn reserve_profit_always_succeeds() {
        assert!(reserve_profit(12.5, "USDT"));
    }
}
