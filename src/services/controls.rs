//! Operator commands for a running bot, read line by line from stdin.

use rand::Rng;
use std::fmt;
use std::str::FromStr;

use super::balance_updater::{refresh_balance, RefreshOutcome};
use super::target_management::execute_trade_with_target_check;
use super::trade_executor::TradeAttempt;
use super::trading_state::SharedState;
use crate::config::TradeSettings;
use crate::utils::{BinanceClient, Logger};

pub const MIN_TRADE_SPEED: u32 = 1;
pub const MAX_TRADE_SPEED: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Trades per minute.
    Speed(u32),
    Pause,
    Resume,
    /// One trade right now, outside the schedule.
    Trade,
    Refresh,
    Help,
}

impl FromStr for ControlCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let command = words.next().map(str::to_lowercase).unwrap_or_default();
        let argument = words.next();
        if words.next().is_some() {
            return Err(format!("Too many arguments: {}", s.trim()));
        }

        match (command.as_str(), argument) {
            ("speed", Some(raw)) => {
                let speed: u32 = raw
                    .parse()
                    .map_err(|_| format!("Invalid speed: {}", raw))?;
                if !(MIN_TRADE_SPEED..=MAX_TRADE_SPEED).contains(&speed) {
                    return Err(format!(
                        "Speed must be between {} and {} trades per minute",
                        MIN_TRADE_SPEED, MAX_TRADE_SPEED
                    ));
                }
                Ok(ControlCommand::Speed(speed))
            }
            ("speed", None) => Err("Usage: speed N".to_string()),
            ("pause", None) => Ok(ControlCommand::Pause),
            ("resume", None) => Ok(ControlCommand::Resume),
            ("trade", None) => Ok(ControlCommand::Trade),
            ("refresh", None) => Ok(ControlCommand::Refresh),
            ("help", None) | ("?", None) => Ok(ControlCommand::Help),
            (cmd @ ("pause" | "resume" | "trade" | "refresh" | "help"), Some(_)) => {
                Err(format!("{} takes no arguments", cmd))
            }
            ("", _) => Err("Empty command".to_string()),
            (other, _) => Err(format!("Unknown command: {} (type 'help')", other)),
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlCommand::Speed(n) => write!(f, "speed {}", n),
            ControlCommand::Pause => f.write_str("pause"),
            ControlCommand::Resume => f.write_str("resume"),
            ControlCommand::Trade => f.write_str("trade"),
            ControlCommand::Refresh => f.write_str("refresh"),
            ControlCommand::Help => f.write_str("help"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlOutcome {
    SpeedChanged(u32),
    AutoTrade(bool),
    /// `None` when the trade was skipped.
    Traded(Option<TradeAttempt>),
    Balance(RefreshOutcome),
    Help,
}

pub fn print_control_help() {
    Logger::info("Commands: speed N (1-60) | pause | resume | trade | refresh | help");
}

/// Applies `command` to the shared state and reports what happened.
pub async fn apply_command<R: Rng>(
    command: ControlCommand,
    client: &BinanceClient,
    state: &SharedState,
    settings: &TradeSettings,
    rng: &mut R,
) -> ControlOutcome {
    match command {
        ControlCommand::Speed(speed) => {
            state.lock().await.trade_speed = speed;
            Logger::success(&format!("Trade speed set to {} trade(s) per minute", speed));
            ControlOutcome::SpeedChanged(speed)
        }
        ControlCommand::Pause | ControlCommand::Resume => {
            let enabled = command == ControlCommand::Resume;
            state.lock().await.auto_trade_enabled = enabled;
            if enabled {
                Logger::success("Auto trading resumed");
            } else {
                Logger::warning("Auto trading paused");
            }
            ControlOutcome::AutoTrade(enabled)
        }
        ControlCommand::Trade => {
            let attempt = execute_trade_with_target_check(client, state, settings, rng).await;
            if attempt.is_none() {
                Logger::warning("Trade skipped: another trade is running, backoff is active or keys are missing");
            }
            ControlOutcome::Traded(attempt)
        }
        ControlCommand::Refresh => {
            let outcome = refresh_balance(client, state, &settings.quote_asset).await;
            match outcome {
                RefreshOutcome::Updated(balance) => Logger::success(&format!(
                    "Balance updated: {:.2} {} available",
                    balance, settings.quote_asset
                )),
                RefreshOutcome::Busy => Logger::warning("Cannot refresh the balance while a trade is running"),
                RefreshOutcome::Unchanged => Logger::warning("Balance could not be refreshed"),
            }
            ControlOutcome::Balance(outcome)
        }
        ControlCommand::Help => {
            print_control_help();
            ControlOutcome::Help
        }
    }
}
