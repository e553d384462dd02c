// Binance spot REST endpoints
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";
pub const TEST_CONNECTIVITY: &str = "/api/v3/ping";
pub const ACCOUNT_INFO: &str = "/api/v3/account";
pub const NEW_ORDER: &str = "/api/v3/order";
pub const TEST_ORDER: &str = "/api/v3/order/test";
pub const EXCHANGE_INFO: &str = "/api/v3/exchangeInfo";
pub const ORDER_BOOK: &str = "/api/v3/depth";
pub const TICKER_PRICE: &str = "/api/v3/ticker/price";

pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Body fragment served by cors-anywhere style relays that must be unlocked
/// through their web page before they forward anything.
pub const PROXY_ACTIVATION_MARKER: &str = "/corsdemo";

// Retry configuration
pub const MAX_RETRIES: u32 = 3;
pub const RETRY_DELAY_MS: u64 = 1000;

pub const ORDER_BOOK_LIMIT: u32 = 20;
pub const DEPTH_LEVELS: usize = 10;
pub const DEPTH_PRESSURE_RATIO: f64 = 0.8;

pub const DEFAULT_MARKET: &str = "BTCUSDT";
pub const FALLBACK_MARKETS: &[&str] = &["BTCUSDT", "ETHUSDT", "SOLUSDT", "DOGEUSDT", "BNBUSDT"];

pub const LOW_BALANCE_THRESHOLD: f64 = 10.0;
