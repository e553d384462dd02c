pub mod binance_client;
pub mod connectivity;
pub mod fetch_data;
pub mod get_my_balance;
pub mod health_check;
pub mod logger;
pub mod market_data;
pub mod post_order;
pub mod signature;

pub use binance_client::{BinanceClient, Credentials};
pub use fetch_data::{fetch_with_retry, RetryPolicy};
pub use get_my_balance::fetch_actual_balance;
pub use health_check::{log_health_check, perform_health_check};
pub use logger::{init_tracing, Logger};
pub use market_data::{analyze_market_depth, volatility_score};
pub use post_order::{reserve_profit, round_to_step};
