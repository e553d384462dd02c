use anyhow::{Context, Result};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use spot_autotrader::config::{load_env, validate_trade_settings, TradeSettings};
use spot_autotrader::services::{
    apply_command, identify_volatile_markets, print_control_help, start_balance_updater,
    start_trade_scheduler, trading_state, ControlCommand, TradingState,
};
use spot_autotrader::utils::{init_tracing, log_health_check, perform_health_check, BinanceClient, Logger};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Duration};

const STATUS_INTERVAL: Duration = Duration::from_secs(15);

/// Forwards stdin lines from a plain thread, so a pending read never holds up
/// runtime shutdown.
fn spawn_command_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    let env = Arc::new(load_env()?);
    init_tracing();

    // Welcome message
    println!("\n{} First time running the bot?", "💡".yellow());
    println!("   Run health check: {}", "cargo run --bin health_check".cyan());
    println!("   Try it offline:   {}\n", "cargo run --bin simulate".cyan());

    let settings = TradeSettings::from_env(&env);
    let problems = validate_trade_settings(&settings);
    if !problems.is_empty() {
        for problem in &problems {
            Logger::error(problem);
        }
        anyhow::bail!("Invalid trade settings: {}", problems.join("; "));
    }
    let settings = Arc::new(settings);

    Logger::startup(&settings, env.preview_mode, &env.api_key);

    let client = Arc::new(BinanceClient::from_env(&env).context("Failed to build Binance client")?);

    // Perform initial health check
    Logger::info("Performing initial health check...");
    let health_result = perform_health_check(&client, &env).await;
    log_health_check(&health_result);

    if !health_result.healthy {
        Logger::warning("Health check failed, but continuing startup...");
    }

    let state = TradingState::shared(&settings);
    state.lock().await.auto_trade_enabled = env.auto_trade_enabled;

    Logger::info("Loading markets and balance...");
    trading_state::initialize(&client, &state, &settings).await;

    let markets = state.lock().await.available_markets.clone();
    Logger::info("Scanning markets for volatility...");
    let volatile = identify_volatile_markets(
        &client,
        &markets,
        settings.market_scan_limit,
        settings.volatile_market_count,
    )
    .await;
    state.lock().await.volatile_markets = volatile;

    Logger::separator();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Start services
    Logger::info("Starting trade scheduler...");
    let scheduler_handle = {
        let client = client.clone();
        let state = state.clone();
        let settings = settings.clone();
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move { start_trade_scheduler(client, state, settings, shutdown).await })
    };

    Logger::info("Starting balance updater...");
    let updater_handle = {
        let client = client.clone();
        let state = state.clone();
        let asset = settings.quote_asset.clone();
        let period = Duration::from_millis(env.balance_refresh_interval_ms);
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move { start_balance_updater(client, state, asset, period, shutdown).await })
    };

    if !env.auto_trade_enabled {
        Logger::warning("Auto trading is disabled (set AUTO_TRADE_ENABLED=true to enable)");
    }

    // Status line and operator commands until shutdown
    print_control_help();
    let mut commands = spawn_command_reader();
    let mut rng = StdRng::from_entropy();
    let mut status = interval(STATUS_INTERVAL);
    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = status.tick() => {
                let s = state.lock().await;
                Logger::clear_line();
                Logger::progress(s.current_balance, settings.target_amount, s.day_count);
                let info = format!(
                    "{} trade(s), {} failure(s) in a row",
                    s.trade_count, s.consecutive_failures
                );
                let next = spot_autotrader::services::trade_interval(s.trade_speed, s.consecutive_failures);
                Logger::waiting(next.as_secs(), Some(&info));
            }
            Some(line) = commands.recv() => {
                if line.trim().is_empty() {
                    continue;
                }
                Logger::clear_line();
                match line.parse::<ControlCommand>() {
                    Ok(command) => {
                        apply_command(command, &client, &state, &settings, &mut rng).await;
                    }
                    Err(e) => Logger::warning(&e),
                }
            }
            result = &mut ctrl_c => {
                Logger::clear_line();
                Logger::separator();
                match result {
                    Ok(()) => Logger::info("Received SIGINT, initiating graceful shutdown..."),
                    Err(err) => eprintln!("Unable to listen for shutdown signal: {}", err),
                }
                break;
            }
        }
    }

    // Graceful shutdown
    Logger::info("Waiting for services to finish current operations...");
    let _ = shutdown_tx.send(true);
    for handle in [scheduler_handle, updater_handle] {
        match handle.await {
            Ok(Err(e)) => Logger::error(&format!("Service stopped with error: {}", e)),
            Err(e) => Logger::error(&format!("Service task failed: {}", e)),
            Ok(Ok(())) => {}
        }
    }

    let s = state.lock().await;
    Logger::header("📊 SESSION SUMMARY");
    Logger::balance(s.current_balance, s.initial_amount, &settings.quote_asset);
    Logger::info(&format!(
        "Trades: {} | Days: {} | Profit reserved: {:.2} {}",
        s.trade_count, s.day_count, s.total_profit_reserved, settings.quote_asset
    ));
    let recent: Vec<_> = s.history.iter().collect();
    Logger::trade_history(&recent);

    Logger::success("Graceful shutdown completed");
    Ok(())
}
