//! Offline "turn $10 into $1000" simulation. No API keys needed.

use anyhow::{Context, Result};
use colored::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use spot_autotrader::services::Simulation;
use spot_autotrader::utils::Logger;
use std::env;

const DEFAULT_MAX_TRADES: u64 = 100;

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match flag_value(args, flag) {
        Some(raw) => raw.parse().with_context(|| format!("Invalid value for {}: {}", flag, raw)),
        None => Ok(default),
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("Usage: simulate [--seed N] [--initial 10] [--target 1000] [--max-trades 100]");
        return Ok(());
    }

    let initial: f64 = parse_flag(&args, "--initial", 10.0)?;
    let target: f64 = parse_flag(&args, "--target", 1000.0)?;
    let max_trades: u64 = parse_flag(&args, "--max-trades", DEFAULT_MAX_TRADES)?;
    let mut rng = match flag_value(&args, "--seed") {
        Some(raw) => StdRng::seed_from_u64(raw.parse().with_context(|| format!("Invalid seed: {}", raw))?),
        None => StdRng::from_entropy(),
    };

    if initial <= 0.0 || target <= initial {
        anyhow::bail!("--target must be greater than --initial and both must be positive");
    }

    Logger::header("🧪 TRADING SIMULATION");
    Logger::info(&format!(
        "Starting with ${:.2}, target ${:.2}, at most {} trades",
        initial, target, max_trades
    ));

    let mut sim = Simulation::new(initial, target);
    sim.start();
    while sim.trade_count < max_trades {
        let Some(trade) = sim.run_trade(&mut rng) else {
            break;
        };
        let factor = format!("×{:.1}", trade.growth_factor);
        let line = format!(
            "   Trade #{:<4} {} {:>8}  ${:.2}",
            sim.trade_count,
            if trade.success { "✓".green() } else { "✗".red() },
            if trade.success { factor.green() } else { factor.red() },
            trade.new_amount
        );
        println!("{}", line);
    }

    Logger::separator();
    Logger::progress(sim.current, sim.target, 1);
    if sim.complete {
        Logger::success(&format!(
            "Target reached after {} trades: ${:.2}",
            sim.trade_count, sim.current
        ));
    } else {
        Logger::warning(&format!(
            "Stopped after {} trades at ${:.2} without reaching the target",
            sim.trade_count, sim.current
        ));
    }

    println!("\n{}", "Last trades:".cyan());
    for entry in &sim.history {
        println!(
            "{}",
            format!(
                "   #{:<4} {} ×{:.1} → ${:.2}",
                entry.id,
                if entry.success { "win " } else { "loss" },
                entry.growth_factor,
                entry.amount
            )
            .bright_black()
        );
    }
    println!();
    Ok(())
}
