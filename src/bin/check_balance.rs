//! Show free and locked balances of the spot account

use anyhow::Result;
use colored::*;
use spot_autotrader::config::load_env;
use spot_autotrader::utils::{init_tracing, BinanceClient, Logger};

#[tokio::main]
async fn main() -> Result<()> {
    let env = load_env()?;
    init_tracing();
    let client = BinanceClient::from_env(&env)?;

    Logger::header("💰 ACCOUNT BALANCES");

    let account = client.account_info().await?;
    let mut held: Vec<_> = account
        .balances
        .iter()
        .filter(|b| b.free_amount() > 0.0 || b.locked_amount() > 0.0)
        .collect();
    held.sort_by(|a, b| a.asset.cmp(&b.asset));

    println!(
        "{}",
        format!("   Trading enabled: {}", if account.can_trade { "yes" } else { "no" }).bright_black()
    );
    if held.is_empty() {
        println!("{}", "\n   No assets held".bright_black());
    } else {
        println!("\n   {:<10} {:>20} {:>20}", "Asset".cyan(), "Free".cyan(), "Locked".cyan());
        for balance in held {
            let asset = if balance.asset == env.quote_asset {
                balance.asset.yellow().bold()
            } else {
                balance.asset.normal()
            };
            println!("   {:<10} {:>20} {:>20}", asset, balance.free, balance.locked);
        }
    }
    println!();

    let quote = client.free_balance(&env.quote_asset).await?;
    Logger::balance(quote, env.initial_amount, &env.quote_asset);
    Ok(())
}
