//! Error types for quote lookups, ledger storage and the bot runtime

use thiserror::Error;

/// Failure to resolve a ticker symbol to a quote
#[derive(Debug, Error)]
pub enum QuoteError {
    /// The quote source could not be reached (timeout, connection error,
    /// non-success status)
    #[error("quote source unreachable for {symbol}: {reason}")]
    Unreachable { symbol: String, reason: String },

    /// The quote source answered with a body that does not match the
    /// expected three-field format
    #[error("unparseable quote response for {symbol}")]
    Unparseable { symbol: String },
}

impl QuoteError {
    /// Symbol the failed lookup was for
    pub fn symbol(&self) -> &str {
        match self {
            Self::Unreachable { symbol, .. } | Self::Unparseable { symbol } => symbol,
        }
    }
}

/// Ledger storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record rejected before any I/O (non-positive shares or price)
    #[error("invalid purchase record: {0}")]
    InvalidRecord(String),

    /// The backing store failed or returned data it could not decode
    #[error("ledger store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Top-level error for the bot runtime and its adapters
#[derive(Debug, Error)]
pub enum BotError {
    /// Quote lookup failed
    #[error(transparent)]
    Quote(#[from] QuoteError),

    /// Ledger operation failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Chat transport failed to deliver or receive
    #[error("transport error: {0}")]
    Transport(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        BotError::Transport(err.to_string())
    }
}

impl From<agent_utils::EnvError> for BotError {
    fn from(err: agent_utils::EnvError) -> Self {
        BotError::Config(err.to_string())
    }
}

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, BotError>;
