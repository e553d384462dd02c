//! Standalone health check utility

use anyhow::Result;
use colored::*;
use spot_autotrader::config::{load_env, Env};
use spot_autotrader::utils::{
    health_check::HealthCheckResult, init_tracing, log_health_check, perform_health_check,
    BinanceClient,
};

fn print_header() {
    println!("\n{}", "━".repeat(59).cyan().bold());
    println!("{}", "     🏥 SPOT AUTOTRADER - HEALTH CHECK".cyan().bold());
    println!("{}\n", "━".repeat(59).cyan().bold());
}

fn print_recommendations(result: &HealthCheckResult, env: &Env) {
    let mut issues = Vec::new();

    if result.checks.proxy.status == "error" {
        issues.push("❌ CORS Proxy Inactive");
        println!("{}\n", "📋 Proxy Issue:".red().bold());
        if let Some(proxy) = &env.cors_proxy_url {
            println!("   • Open {}corsdemo in a browser and request temporary access", proxy);
        }
        println!("   • Or remove CORS_PROXY_URL from .env to connect directly\n");
    }

    if result.checks.connectivity.status == "error" {
        issues.push("❌ Binance API Unreachable");
        println!("{}\n", "📋 Connectivity Issue:".red().bold());
        println!("   • Check your internet connection");
        println!("   • Check BINANCE_BASE_URL in .env (current: {})", env.base_url);
        println!("   • Binance may be blocked in your region, try https://api.binance.us");
        println!("   • Check status: https://www.binance.com/en/support/announcement\n");
    }

    if result.checks.credentials.status == "error" {
        issues.push("❌ API Keys Rejected");
        println!("{}\n", "📋 API Key Issue:".red().bold());
        println!("   • Re-check BINANCE_API_KEY and BINANCE_API_SECRET in .env");
        println!("   • Make sure the key has \"Enable Spot & Margin Trading\" permission");
        println!("   • If the key is IP restricted, whitelist this machine");
        println!("   • Manage keys: https://www.binance.com/en/my/settings/api-management\n");
    }

    if result.checks.balance.status == "error" {
        issues.push("❌ Zero Balance");
        println!("{}\n", "📋 Balance Issue:".red().bold());
        println!("   • Your spot wallet has no free {} to trade with", env.quote_asset);
        println!("   • Deposit or convert funds into {} on Binance\n", env.quote_asset);
    } else if result.checks.balance.status == "warning" {
        println!("{}\n", "⚠️  Low Balance Warning:".yellow().bold());
        if let Some(bal) = result.checks.balance.balance {
            println!("   • Balance: {:.2} {}", bal, env.quote_asset);
        }
        println!("   • Many pairs have a minimum order value around 5-10 {}", env.quote_asset);
        println!("   • Orders below it are rejected by the exchange\n");
    }

    if result.checks.exchange_info.status == "error" {
        issues.push("❌ Exchange Info Failed");
        println!("{}\n", "📋 Market Data Issue:".red().bold());
        println!("   • Market metadata could not be loaded");
        println!("   • Lot sizes fall back to 0.001 until this works\n");
    }

    if issues.is_empty() {
        println!("{}\n", "🎉 All Systems Operational!".green().bold());
        println!("{}", "You're ready to start trading:".cyan());
        println!("   {}\n", "cargo run --release".green());
    } else {
        println!("{}\n", format!("⚠️  {} Issue(s) Found", issues.len()).red().bold());
        println!("{}\n", "Fix the issues above before starting the bot.".yellow());
    }
}

fn print_configuration(env: &Env) {
    println!("{}", "📊 Configuration Summary:".cyan());
    println!();
    println!("   API Key: {}", spot_autotrader::config::mask_secret(&env.api_key));
    println!("   Endpoint: {}", env.effective_base_url());
    println!("   Quote Asset: {}", env.quote_asset);
    println!("   Target: ${:.2} → ${:.2}", env.initial_amount, env.target_amount);
    println!("   Trade Speed: {} trade(s)/min", env.trade_speed);
    println!(
        "   Mode: {}",
        if env.preview_mode { "preview (test orders)" } else { "live" }
    );
    println!();
}

#[tokio::main]
async fn main() -> Result<()> {
    print_header();
    println!("{}\n", "⏳ Running diagnostic checks...".yellow());

    let env = load_env()?;
    init_tracing();
    let client = BinanceClient::from_env(&env)?;
    let result = perform_health_check(&client, &env).await;

    log_health_check(&result);
    print_configuration(&env);
    print_recommendations(&result, &env);

    if result.healthy {
        std::process::exit(0);
    } else {
        std::process::exit(1);
    }
}
