use chrono::Local;
use colored::*;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::TradeSettings;
use crate::interfaces::{OrderSide, Trade};

/// Installs the `tracing` subscriber for HTTP-level diagnostics. Driven by
/// `RUST_LOG`, defaults to `warn`, writes to stderr. Safe to call twice.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub struct Logger;

impl Logger {
    fn get_logs_dir() -> PathBuf {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join("logs")
    }

    fn get_log_file_name() -> PathBuf {
        let date = Local::now().format("%Y-%m-%d").to_string();
        Self::get_logs_dir().join(format!("bot-{}.log", date))
    }

    fn write_to_file(message: &str) {
        let result = (|| -> std::io::Result<()> {
            fs::create_dir_all(Self::get_logs_dir())?;
            let log_entry = format!("[{}] {}\n", Local::now().to_rfc3339(), message);
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(Self::get_log_file_name())?;
            file.write_all(log_entry.as_bytes())
        })();
        // Silently fail to avoid infinite loops
        let _ = result;
    }

    fn colored_side(side: OrderSide) -> ColoredString {
        match side {
            OrderSide::Buy => side.as_str().green().bold(),
            OrderSide::Sell => side.as_str().red().bold(),
        }
    }

    pub fn header(title: &str) {
        println!("\n{}", "━".repeat(70).cyan());
        println!("{}", format!("  {}", title).cyan().bold());
        println!("{}\n", "━".repeat(70).cyan());
        Self::write_to_file(&format!("HEADER: {}", title));
    }

    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
        Self::write_to_file(&format!("INFO: {}", message));
    }

    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
        Self::write_to_file(&format!("SUCCESS: {}", message));
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
        Self::write_to_file(&format!("WARNING: {}", message));
    }

    pub fn error(message: &str) {
        println!("{} {}", "✗".red(), message);
        Self::write_to_file(&format!("ERROR: {}", message));
    }

    pub fn trade(trade: &Trade) {
        let border = if trade.success { "─".repeat(70).magenta() } else { "─".repeat(70).red() };
        println!("\n{}", border);
        println!(
            "{}",
            format!("📊 TRADE #{}", trade.id).magenta().bold()
        );
        println!("{}", format!("Market:  {}", trade.market.white().bold()).bright_black());
        println!("{}", format!("Side:    {}", Self::colored_side(trade.side)).bright_black());
        println!("{}", format!("Amount:  ${:.2}", trade.amount).bright_black());
        println!(
            "{}",
            format!("Balance: {}", format!("${:.2}", trade.balance_after).green()).bright_black()
        );
        let message = if trade.success {
            trade.message.green()
        } else {
            trade.message.red()
        };
        println!("{}", format!("Result:  {}", message).bright_black());
        println!("{}\n", border);

        Self::write_to_file(&format!(
            "TRADE: #{} {} {} | Amount: ${:.2} | Balance: ${:.2} | {} | {}",
            trade.id,
            trade.side,
            trade.market,
            trade.amount,
            trade.balance_after,
            if trade.success { "success" } else { "failed" },
            trade.message
        ));
    }

    pub fn balance(current: f64, initial: f64, quote_asset: &str) {
        let profit = current - initial;
        let percent = if initial > 0.0 { profit / initial * 100.0 } else { 0.0 };
        let sign = if profit >= 0.0 { "+" } else { "" };
        let profit_str = format!("{}{:.2} ({}{:.1}%)", sign, profit, sign, percent);
        let profit_colored = if profit >= 0.0 {
            profit_str.green().bold()
        } else {
            profit_str.red().bold()
        };

        println!("{}", "Capital:".bright_black());
        println!(
            "{}",
            format!("  Current balance: {}", format!("{:.2} {}", current, quote_asset).green().bold())
                .bright_black()
        );
        println!(
            "{}",
            format!("  Starting amount: {:.2} {}", initial, quote_asset).bright_black()
        );
        println!("{}", format!("  Profit:          {}", profit_colored).bright_black());
        Self::write_to_file(&format!(
            "BALANCE: {:.2} {} (start {:.2}, profit {:.2})",
            current, quote_asset, initial, profit
        ));
    }

    pub fn order_result(success: bool, message: &str) {
        if success {
            println!("{} {}", "✓".green(), format!("Order executed: {}", message).green().bold());
            Self::write_to_file(&format!("ORDER SUCCESS: {}", message));
        } else {
            println!("{} {}", "✗".red(), format!("Order failed: {}", message).red().bold());
            Self::write_to_file(&format!("ORDER FAILED: {}", message));
        }
    }

    /// Progress bar towards the daily target.
    pub fn progress(balance: f64, target: f64, day: u32) {
        const WIDTH: usize = 40;
        let percent = if target > 0.0 { (balance / target * 100.0).clamp(0.0, 100.0) } else { 0.0 };
        let filled = ((percent / 100.0) * WIDTH as f64).round() as usize;
        let bar = format!(
            "{}{}",
            "█".repeat(filled).green(),
            "░".repeat(WIDTH - filled).bright_black()
        );
        println!(
            "{} {} {}",
            format!("Day {}", day).cyan().bold(),
            bar,
            format!("{:.1}% (${:.2} / ${:.2})", percent, balance, target).yellow()
        );
        Self::write_to_file(&format!(
            "PROGRESS: day {} | {:.1}% | ${:.2} / ${:.2}",
            day, percent, balance, target
        ));
    }

    pub fn trade_history(trades: &[&Trade]) {
        println!("\n{}", "📜 TRADE HISTORY".magenta().bold());
        if trades.is_empty() {
            println!("{}", "   No trades match the filters".bright_black());
            println!();
            return;
        }

        println!(
            "{}",
            format!(
                "   {:<5} {:<10} {:<12} {:<6} {:>12} {:>14}  {}",
                "#", "Time", "Market", "Side", "Amount", "Balance", "Result"
            )
            .bright_black()
        );
        for trade in trades {
            let result = if trade.success { "✓".green() } else { "✗".red() };
            let reserved = trade
                .profit_reserved
                .map(|p| format!(" (reserved ${:.2})", p).yellow().to_string())
                .unwrap_or_default();
            println!(
                "   {:<5} {:<10} {:<12} {:<15} {:>12} {:>14}  {}{}",
                trade.id,
                trade.timestamp.with_timezone(&Local).format("%H:%M:%S"),
                trade.market,
                Self::colored_side(trade.side),
                format!("${:.2}", trade.amount),
                format!("${:.2}", trade.balance_after),
                result,
                reserved
            );
        }
        println!();
    }

    pub fn startup(settings: &TradeSettings, preview: bool, api_key: &str) {
        println!("\n");
        let banner = [
            r"   ____              _       _         _         _                 _           ",
            r"  / ___| _ __   ___ | |_    / \  _   _| |_ ___  | |_ _ __ __ _  __| | ___ _ __ ",
            r"  \___ \| '_ \ / _ \| __|  / _ \| | | | __/ _ \ | __| '__/ _` |/ _` |/ _ \ '__|",
            r"   ___) | |_) | (_) | |_  / ___ \ |_| | || (_) || |_| | | (_| | (_| |  __/ |   ",
            r"  |____/| .__/ \___/ \__|/_/   \_\__,_|\__\___/  \__|_|  \__,_|\__,_|\___|_|   ",
            r"        |_|                                                                    ",
        ];
        for (i, line) in banner.iter().enumerate() {
            if i < 3 {
                println!("{}", line.cyan());
            } else {
                println!("{}", line.magenta());
            }
        }
        println!(
            "{}",
            format!(
                "               Turn ${:.0} into ${:.0}, one trade at a time\n",
                settings.initial_amount, settings.target_amount
            )
            .bright_black()
        );

        println!("{}", "━".repeat(70).cyan());
        println!("{}", "🎯 Strategy:".cyan());
        println!("{}", format!("   {}", settings).bright_black());
        println!("{}", "\n🔑 API Key:".cyan());
        println!("{}", format!("   {}", crate::config::mask_secret(api_key)).bright_black());
        if preview {
            println!(
                "{}",
                "\n🔍 PREVIEW MODE: orders are validated by the exchange but never filled\n".yellow()
            );
        } else {
            println!("{}", "\n💸 LIVE MODE: orders are sent to the exchange\n".red().bold());
        }
        Self::write_to_file(&format!("STARTUP: {} | preview={}", settings, preview));
    }

    pub fn separator() {
        println!("{}", "─".repeat(70).bright_black());
    }

    pub fn waiting(next_trade_in_secs: u64, extra_info: Option<&str>) {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        let message = match extra_info {
            Some(info) => format!("⏳ Next trade in {}s... ({})", next_trade_in_secs, info),
            None => format!("⏳ Next trade in {}s...", next_trade_in_secs),
        };
        print!("\r{} {}", format!("[{}]", timestamp).bright_black(), message.cyan());
        let _ = std::io::stdout().flush();
    }

    pub fn clear_line() {
        print!("\r{}\r", " ".repeat(100));
        let _ = std::io::stdout().flush();
    }
}
