//! Quote source clients
//!
//! The router only sees the [`QuoteSource`] trait; [`yahoo::QuoteClient`] is
//! the HTTP implementation.

pub mod yahoo;

use crate::error::QuoteError;
use async_trait::async_trait;
use rust_decimal::Decimal;

pub use yahoo::{QuoteClient, parse_quote_body, quote_page_url};

/// Direction of the day's price change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSign {
    Up,
    Down,
    Flat,
}

impl ChangeSign {
    /// Derive the sign from the leading marker of a change string
    pub fn from_change_text(change: &str) -> Self {
        match change.trim_start().chars().next() {
            Some('+') => Self::Up,
            Some('-') => Self::Down,
            _ => Self::Flat,
        }
    }
}

/// Latest quote for one symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub symbol: String,
    pub company_name: String,
    pub current_price: Decimal,
    pub change_text: String,
    pub change_sign: ChangeSign,
}

/// Resolves ticker symbols to quotes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the current quote for `symbol`, one request per call
    async fn fetch(&self, symbol: &str) -> Result<Quote, QuoteError>;
}
