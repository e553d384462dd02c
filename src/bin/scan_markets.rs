//! Rank tradable pairs by order book volatility

use anyhow::Result;
use colored::*;
use futures_util::future::join_all;
use spot_autotrader::config::{load_env, ORDER_BOOK_LIMIT};
use spot_autotrader::interfaces::OrderSide;
use spot_autotrader::services::market_analysis::rank_by_volatility;
use spot_autotrader::utils::{analyze_market_depth, init_tracing, volatility_score, BinanceClient, Logger};

#[tokio::main]
async fn main() -> Result<()> {
    let env = load_env()?;
    init_tracing();
    let client = BinanceClient::from_env(&env)?;

    Logger::header("🔍 MARKET SCAN");

    let pairs = client.tradable_pairs(&env.quote_asset).await;
    if pairs.is_empty() {
        Logger::warning(&format!("No tradable {} pairs found", env.quote_asset));
        return Ok(());
    }
    let candidates = &pairs[..pairs.len().min(env.market_scan_limit)];
    Logger::info(&format!(
        "{} {} pairs listed, scanning {}",
        pairs.len(),
        env.quote_asset,
        candidates.len()
    ));

    let books = join_all(candidates.iter().map(|symbol| {
        let client = &client;
        async move { (symbol.clone(), client.order_book(symbol, ORDER_BOOK_LIMIT).await) }
    }))
    .await;

    let mut scores = Vec::new();
    let mut pressure = std::collections::HashMap::new();
    for (symbol, book) in books {
        match book {
            Ok(book) => {
                let score = volatility_score(&symbol, &book).unwrap_or(0.0);
                let buy = analyze_market_depth(&book, OrderSide::Buy);
                let sell = analyze_market_depth(&book, OrderSide::Sell);
                pressure.insert(symbol.clone(), (buy, sell));
                scores.push((symbol, score));
            }
            Err(e) => {
                Logger::warning(&format!("{}: {}", symbol, e));
                scores.push((symbol, 0.0));
            }
        }
    }
    let score_of: std::collections::HashMap<String, f64> = scores.iter().cloned().collect();
    let ranked = rank_by_volatility(scores, env.volatile_market_count);

    println!(
        "\n   {:<4} {:<14} {:>12}  {:<5} {:<5}",
        "#".cyan(),
        "Symbol".cyan(),
        "Score".cyan(),
        "Buy".cyan(),
        "Sell".cyan()
    );
    for (i, symbol) in ranked.iter().enumerate() {
        let (buy, sell) = pressure.get(symbol).copied().unwrap_or((false, false));
        let mark = |ok: bool| if ok { "✓".green() } else { "·".bright_black() };
        println!(
            "   {:<4} {:<14} {:>12.4}  {:<5} {:<5}",
            i + 1,
            symbol,
            score_of.get(symbol).copied().unwrap_or(0.0),
            mark(buy),
            mark(sell)
        );
    }
    println!();
    Ok(())
}
