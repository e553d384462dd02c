//! Help command - displays all available bot commands

use colored::*;

fn main() {
    println!("{}", "━".repeat(59).cyan().bold());
    println!("{}", "     🤖 SPOT AUTOTRADER - COMMANDS".cyan().bold());
    println!("{}\n", "━".repeat(59).cyan().bold());

    println!("{}\n", "📖 GETTING STARTED".yellow().bold());
    println!("  {}          Interactive configuration wizard", "cargo run --bin setup".green());
    println!("  {}   Verify everything is working", "cargo run --bin health_check".green());
    println!("  {}          Compile Rust project", "cargo build --release".green());
    println!("  {}              Start the trading bot", "cargo run --release".green());
    println!();

    println!("{}\n", "💰 ACCOUNT & MARKETS".yellow().bold());
    println!("  {}  Show free and locked balances", "cargo run --bin check_balance".green());
    println!("  {}   Rank the most volatile pairs", "cargo run --bin scan_markets".green());
    println!();

    println!("{}\n", "🎯 TRADING".yellow().bold());
    println!(
        "  {}   Place one order: SYMBOL BUY|SELL [quantity] [price]",
        "cargo run --bin manual_order".green()
    );
    println!(
        "  {}  Run N preview trades and list the history",
        "cargo run --bin trade_history".green()
    );
    println!("      {}", "--trades N --search ETH --side buy|sell --status success|failed".bright_black());
    println!();

    println!("{}\n", "🧪 SIMULATION".yellow().bold());
    println!("  {}       Offline $10 → $1000 run, no API keys needed", "cargo run --bin simulate".green());
    println!("      {}", "--seed N --initial 10 --target 1000 --max-trades 100".bright_black());
    println!();

    println!("{}\n", "⌨️  WHILE THE BOT RUNS (type + Enter)".yellow().bold());
    println!("  {}       Trades per minute, 1-60", "speed N".green());
    println!("  {}  Stop or restart auto trading", "pause / resume".green());
    println!("  {}         Trade once right now", "trade".green());
    println!("  {}       Re-read the free balance", "refresh".green());
    println!();

    println!("{}\n", "🔧 CONFIGURATION (.env)".yellow().bold());
    println!("  {}  Your API key pair", "BINANCE_API_KEY / BINANCE_API_SECRET".cyan());
    println!("  {}                 Optional relay prefix", "CORS_PROXY_URL".cyan());
    println!("  {}                   true = test orders only (default)", "PREVIEW_MODE".cyan());
    println!("  {}     Narrative start and daily target", "INITIAL_AMOUNT / TARGET_AMOUNT".cyan());
    println!("  {}                    Trades per minute (1-60)", "TRADE_SPEED".cyan());
    println!("  {}                       Extra log output, e.g. RUST_LOG=debug", "RUST_LOG".cyan());
    println!();

    println!("{}\n", "━".repeat(65).blue());
    println!("{}\n", "💡 Quick Tips:".yellow());
    println!("  • New user? Start with: cargo run --bin setup");
    println!("  • Before trading: cargo run --bin health_check");
    println!("  • Logs are written to logs/bot-YYYY-MM-DD.log");
    println!("  • Emergency stop: Press Ctrl+C");
    println!();
    println!("{}\n", "⚠️  Always start with small amounts and monitor regularly!".yellow());
}
