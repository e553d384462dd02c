//! Interactive setup wizard for creating .env file

use anyhow::Result;
use colored::*;
use spot_autotrader::config::{is_valid_api_credential, DEFAULT_BASE_URL, MIN_CREDENTIAL_LENGTH};
use spot_autotrader::utils::{BinanceClient, Credentials, RetryPolicy};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

fn print_header() {
    println!("{}", "━".repeat(65).cyan().bold());
    println!("{}", "     🤖 SPOT AUTOTRADER - SETUP WIZARD".cyan().bold());
    println!("{}\n", "━".repeat(65).cyan().bold());
    println!("{}", "This wizard will help you create your .env configuration file.".yellow());
    println!("{}", "Press Ctrl+C at any time to cancel.\n".yellow());
}

fn question(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        anyhow::bail!("stdin closed, setup cancelled");
    }
    Ok(input.trim().to_string())
}

fn question_or(prompt: &str, default: &str) -> Result<String> {
    let answer = question(&format!("{} (default: {}): ", prompt, default))?;
    Ok(if answer.is_empty() { default.to_string() } else { answer })
}

fn ask_credential(name: &str) -> Result<String> {
    for _ in 0..MAX_CREDENTIAL_ATTEMPTS {
        let value = question(&format!("Enter your {}: ", name))?;
        if is_valid_api_credential(&value) {
            return Ok(value);
        }
        println!(
            "{}",
            format!(
                "  ❌ Invalid {}. Expected at least {} letters and digits.\n",
                name, MIN_CREDENTIAL_LENGTH
            )
            .red()
        );
    }
    anyhow::bail!("No valid {} after {} attempts", name, MAX_CREDENTIAL_ATTEMPTS)
}

fn render_env(
    api_key: &str,
    api_secret: &str,
    base_url: &str,
    proxy: &str,
    initial_amount: &str,
    target_amount: &str,
    trade_speed: &str,
    preview: bool,
) -> String {
    format!(
        r#"# Spot Autotrader Configuration
# Generated by setup wizard

# Binance API
BINANCE_API_KEY={}
BINANCE_API_SECRET={}
BINANCE_BASE_URL={}
{}

# Trading
QUOTE_ASSET=USDT
INITIAL_AMOUNT={}
TARGET_AMOUNT={}
TRADE_SPEED={}
AUTO_TRADE_ENABLED=true
PREVIEW_MODE={}

# Advanced (optional - defaults will be used if not set)
# REQUEST_TIMEOUT_MS=10000
# NETWORK_RETRY_LIMIT=3
# RETRY_DELAY_MS=1000
# BALANCE_REFRESH_INTERVAL_MS=30000
# MARKET_SCAN_LIMIT=50
# VOLATILE_MARKET_COUNT=15
"#,
        api_key,
        api_secret,
        base_url,
        if proxy.is_empty() {
            "# CORS_PROXY_URL=".to_string()
        } else {
            format!("CORS_PROXY_URL={}", proxy)
        },
        initial_amount,
        target_amount,
        trade_speed,
        preview
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    print_header();

    if Path::new(".env").exists() {
        let overwrite = question("A .env file already exists. Overwrite it? (y/N): ")?;
        if !overwrite.eq_ignore_ascii_case("y") {
            println!("{}", "Keeping the existing .env file.".yellow());
            return Ok(());
        }
    }

    println!("{}", "\n━━━ STEP 1: API KEYS ━━━\n".blue().bold());
    println!("{}", "Create a key pair at:".cyan());
    println!("  • https://www.binance.com/en/my/settings/api-management\n");
    println!("{}", "Tip: for this bot the key needs:".yellow());
    println!("  • \"Enable Reading\"");
    println!("  • \"Enable Spot & Margin Trading\"");
    println!("  • No withdrawal permission\n");

    let api_key = ask_credential("BINANCE_API_KEY")?;
    let api_secret = ask_credential("BINANCE_API_SECRET")?;

    println!("{}", "\n━━━ STEP 2: NETWORK ━━━\n".blue().bold());
    let base_url = question_or("Binance REST URL", DEFAULT_BASE_URL)?;
    let proxy = question("CORS proxy prefix (press Enter for none): ")?;

    println!("{}", "\n━━━ STEP 3: VERIFY KEYS ━━━\n".blue().bold());
    let client = BinanceClient::new(
        &base_url,
        Some(Credentials::new(&api_key, &api_secret)),
        RetryPolicy::default(),
    )?
    .with_proxy((!proxy.is_empty()).then(|| {
        if proxy.ends_with('/') { proxy.clone() } else { format!("{}/", proxy) }
    }));
    match client.validate_api_keys().await {
        Ok(true) => println!("{}", "  ✅ API keys accepted by Binance\n".green()),
        Ok(false) => println!(
            "{}",
            "  ⚠️  Binance did not accept the keys (saved anyway, check permissions)\n".yellow()
        ),
        Err(e) => println!("{}", format!("  ⚠️  {}\n", e).yellow()),
    }

    println!("{}", "\n━━━ STEP 4: TRADING ━━━\n".blue().bold());
    let initial_amount = question_or("Starting amount in USD", "10")?;
    let target_amount = question_or("Daily target in USD", "1000")?;
    let trade_speed = question_or("Trades per minute (1-60)", "5")?;
    let live = question("Send real orders? Type 'live' to disable preview mode: ")?;
    let preview = live != "live";

    let env_content = render_env(
        &api_key,
        &api_secret,
        &base_url,
        &proxy,
        &initial_amount,
        &target_amount,
        &trade_speed,
        preview,
    );
    fs::write(".env", env_content)?;

    println!("\n{}", "━".repeat(65).green());
    println!("{}", "✅ Configuration saved to .env file!".green().bold());
    println!("{}\n", "━".repeat(65).green());
    println!("{}", "Next steps:".yellow());
    println!("  1. Review the .env file");
    println!("  2. Run: cargo run --bin health_check");
    println!("  3. Start the bot: cargo run --release\n");

    Ok(())
}
