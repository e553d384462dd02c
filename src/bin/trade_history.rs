//! Run a short preview session and list its trade history with filters.
//!
//! Usage: trade_history [--trades N] [--search ETH] [--side buy|sell] [--status success|failed]

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use spot_autotrader::config::{load_env, TradeSettings};
use spot_autotrader::interfaces::{OrderSide, TradeFilter};
use spot_autotrader::services::{
    execute_trade_with_target_check, identify_volatile_markets, trading_state, TradingState,
};
use spot_autotrader::utils::{init_tracing, BinanceClient, Logger};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_TRADES: u32 = 5;
const PAUSE_BETWEEN_TRADES: Duration = Duration::from_secs(1);

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_filter(args: &[String]) -> Result<TradeFilter> {
    let side = flag_value(args, "--side")
        .filter(|s| !s.eq_ignore_ascii_case("all"))
        .map(OrderSide::from_str)
        .transpose()
        .map_err(anyhow::Error::msg)?;
    let success = match flag_value(args, "--status").map(str::to_lowercase).as_deref() {
        None | Some("all") => None,
        Some("success") | Some("completed") => Some(true),
        Some("failed") => Some(false),
        Some(other) => anyhow::bail!("Unknown status filter: {}", other),
    };
    Ok(TradeFilter {
        search: flag_value(args, "--search").map(str::to_string),
        side,
        success,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let trades: u32 = match flag_value(&args, "--trades") {
        Some(raw) => raw.parse().with_context(|| format!("Invalid --trades: {}", raw))?,
        None => DEFAULT_TRADES,
    };
    let filter = parse_filter(&args)?;

    let env = load_env()?;
    init_tracing();
    // Always test orders here
    let client = BinanceClient::from_env(&env)?.with_preview(true);
    let settings = TradeSettings::from_env(&env);

    Logger::header("📜 PREVIEW SESSION");
    let state = TradingState::shared(&settings);
    trading_state::initialize(&client, &state, &settings).await;
    let markets = state.lock().await.available_markets.clone();
    let volatile = identify_volatile_markets(
        &client,
        &markets,
        settings.market_scan_limit,
        settings.volatile_market_count,
    )
    .await;
    state.lock().await.volatile_markets = volatile;

    let mut rng = StdRng::from_entropy();
    for i in 0..trades {
        if execute_trade_with_target_check(&client, &state, &settings, &mut rng)
            .await
            .is_none()
        {
            Logger::warning("Trade skipped");
        }
        if i + 1 < trades {
            tokio::time::sleep(PAUSE_BETWEEN_TRADES).await;
        }
    }

    let s = state.lock().await;
    let matching: Vec<_> = s.history.filter(&filter).collect();
    Logger::info(&format!(
        "{} of {} trade(s) match the filters",
        matching.len(),
        s.history.len()
    ));
    Logger::trade_history(&matching);
    Logger::balance(s.current_balance, s.initial_amount, &settings.quote_asset);
    Ok(())
}
