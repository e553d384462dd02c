use reqwest::StatusCode;

/// Errors returned by the exchange client.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    /// The CORS relay answered 403 with its "/corsdemo" page. Retrying does
    /// not help until the relay has been activated by hand.
    #[error("CORS proxy needs activation")]
    ProxyActivationRequired,
    #[error("HTTP error! status: {status}, message: {body}")]
    Http { status: StatusCode, body: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("API credentials are not configured")]
    MissingCredentials,
    #[error("Invalid API credentials: {0}")]
    InvalidCredentials(String),
    #[error("Symbol {0} information not found")]
    SymbolNotFound(String),
    #[error("Symbol {symbol} has no {filter} filter")]
    MissingFilter { symbol: String, filter: String },
    #[error("Invalid trade quantity: {0}")]
    InvalidQuantity(String),
    #[error("Order book for {0} is empty")]
    EmptyOrderBook(String),
}

impl ExchangeError {
    /// Whether the failure is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ExchangeError::ProxyActivationRequired
                | ExchangeError::MissingCredentials
                | ExchangeError::InvalidCredentials(_)
        )
    }
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;
