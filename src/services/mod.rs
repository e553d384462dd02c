pub mod balance_updater;
pub mod controls;
pub mod market_analysis;
pub mod simulation;
pub mod target_management;
pub mod trade_executor;
pub mod trade_scheduler;
pub mod trading_state;

pub use balance_updater::{refresh_balance, start_balance_updater, RefreshOutcome};
pub use controls::{apply_command, print_control_help, ControlCommand, ControlOutcome};
pub use market_analysis::identify_volatile_markets;
pub use simulation::Simulation;
pub use target_management::{execute_trade_with_target_check, handle_daily_target_reached};
pub use trade_executor::{execute_single_trade, execute_trade, TradeAttempt, TradeOutcome};
pub use trade_scheduler::{start_trade_scheduler, trade_interval};
pub use trading_state::{SharedState, TradeHistory, TradingState};
