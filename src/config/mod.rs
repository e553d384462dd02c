pub mod constants;
pub mod env;
pub mod trade_settings;

pub use constants::*;
pub use env::*;
pub use trade_settings::*;
