//! Place a single order by hand: SYMBOL BUY|SELL [quantity] [price]

use anyhow::{Context, Result};
use colored::*;
use rust_decimal::Decimal;
use spot_autotrader::config::{load_env, ORDER_BOOK_LIMIT};
use spot_autotrader::interfaces::OrderSide;
use spot_autotrader::utils::{analyze_market_depth, init_tracing, BinanceClient, Logger};
use std::io::{self, Write};
use std::str::FromStr;

/// Share of the free balance used when no quantity is given.
const DEFAULT_PERCENT: f64 = 25.0;

fn usage() {
    println!("Usage: manual_order SYMBOL BUY|SELL [quantity] [price]");
    println!("   Without a quantity, {}% of the free quote balance is used.", DEFAULT_PERCENT);
    println!("   With a price the order is LIMIT GTC, otherwise MARKET.");
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        usage();
        return Ok(());
    }

    let symbol = args[0].to_uppercase();
    let side = OrderSide::from_str(&args[1]).map_err(anyhow::Error::msg)?;
    let quantity = args
        .get(2)
        .map(|q| Decimal::from_str(q).with_context(|| format!("Invalid quantity: {}", q)))
        .transpose()?;
    let price = args
        .get(3)
        .map(|p| Decimal::from_str(p).with_context(|| format!("Invalid price: {}", p)))
        .transpose()?;

    let env = load_env()?;
    init_tracing();
    let client = BinanceClient::from_env(&env)?;

    Logger::header("🎯 MANUAL ORDER");

    let quantity = match quantity {
        Some(q) => q,
        None => {
            let balance = client.free_balance(&env.quote_asset).await?;
            Logger::info(&format!("Free balance: {:.2} {}", balance, env.quote_asset));
            client
                .calculate_optimal_quantity(&symbol, balance, DEFAULT_PERCENT)
                .await
        }
    };

    match client.order_book(&symbol, ORDER_BOOK_LIMIT).await {
        Ok(book) if analyze_market_depth(&book, side) => {
            Logger::success(&format!("Order book depth favours a {} on {}", side, symbol));
        }
        Ok(_) => Logger::warning(&format!("Order book depth does not favour a {} on {}", side, symbol)),
        Err(e) => Logger::warning(&format!("Could not read order book: {}", e)),
    }

    let description = match price {
        Some(p) => format!("{} {} {} @ {} (LIMIT GTC)", side, quantity, symbol, p),
        None => format!("{} {} {} (MARKET)", side, quantity, symbol),
    };
    println!("   {}", description.bold());

    if !client.is_preview() && !confirm(&format!("{} ", "Send this LIVE order? (y/N):".red().bold()))? {
        Logger::info("Order cancelled");
        return Ok(());
    }

    match client.execute_order(&symbol, side, quantity, price).await {
        Ok(order) => {
            Logger::order_result(true, &format!("{} [{}]", description, order.status));
            if order.order_id != 0 {
                Logger::info(&format!("Order id: {}", order.order_id));
            }
        }
        Err(e) => {
            Logger::order_result(false, &e.to_string());
            std::process::exit(1);
        }
    }
    Ok(())
}
