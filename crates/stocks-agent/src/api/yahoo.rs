//! Yahoo Finance CSV quote client

use super::{ChangeSign, Quote, QuoteSource};
use crate::config::BotConfig;
use crate::error::{BotError, QuoteError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

/// Human-facing quote page, linked from reply titles
const QUOTE_PAGE_BASE: &str = "https://finance.yahoo.com/quote/";

/// Fields requested from the CSV endpoint: name, change, last trade price
const CSV_FIELDS: &str = "ncl1";

static QUOTE_BODY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"]*)","([0-9+\-. %]*)",\s*([\d.]+)"#).expect("quote pattern is valid")
});

/// Link to the quote page for `symbol`
pub fn quote_page_url(symbol: &str) -> String {
    format!("{QUOTE_PAGE_BASE}{symbol}")
}

/// Parse a `"<company>","<change>",<price>` response body
pub fn parse_quote_body(symbol: &str, body: &str) -> std::result::Result<Quote, QuoteError> {
    let unparseable = || QuoteError::Unparseable {
        symbol: symbol.to_string(),
    };

    let caps = QUOTE_BODY_RE.captures(body).ok_or_else(unparseable)?;
    let current_price = Decimal::from_str(&caps[3]).map_err(|_| unparseable())?;
    let change_text = caps[2].trim().to_string();

    Ok(Quote {
        symbol: symbol.to_string(),
        company_name: caps[1].trim().to_string(),
        current_price,
        change_sign: ChangeSign::from_change_text(&change_text),
        change_text,
    })
}

/// HTTP quote client
#[derive(Debug, Clone)]
pub struct QuoteClient {
    client: Client,
    base_url: Url,
}

impl QuoteClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BotError::Config(format!("invalid quote URL: {e}")))?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    /// Create a client from the bot configuration
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        Self::new(&config.quote_base_url, config.request_timeout)
    }

    /// Request URL for one symbol
    pub fn request_url(&self, symbol: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("s", symbol)
            .append_pair("f", CSV_FIELDS);
        url
    }
}

#[async_trait]
impl QuoteSource for QuoteClient {
    async fn fetch(&self, symbol: &str) -> std::result::Result<Quote, QuoteError> {
        let transport_failure = |reason: String| QuoteError::Unreachable {
            symbol: symbol.to_string(),
            reason,
        };

        let url = self.request_url(symbol);
        tracing::debug!(%symbol, %url, "Requesting quote");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_failure(e.to_string()))?;

        if !response.status().is_success() {
            return Err(transport_failure(format!("HTTP error: {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_failure(e.to_string()))?;

        parse_quote_body(symbol, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quote_body() {
        let quote = parse_quote_body("AAPL", "\"Apple Inc.\",\"+1.23%\",701.10\n").unwrap();
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.company_name, "Apple Inc.");
        assert_eq!(quote.change_text, "+1.23%");
        assert_eq!(quote.current_price, Decimal::from_str("701.10").unwrap());
        assert_eq!(quote.current_price.to_string(), "701.10");
        assert_eq!(quote.change_sign, ChangeSign::Up);
    }

    #[test]
    fn test_parse_quote_body_down_and_flat() {
        let quote =
            parse_quote_body("TSLA", "\"Tesla, Inc.\",\"-3.10 - -0.44%\",698.00").unwrap();
        assert_eq!(quote.company_name, "Tesla, Inc.");
        assert_eq!(quote.change_sign, ChangeSign::Down);

        let quote = parse_quote_body("KO", "\"Coca-Cola Company (The)\",\"0.00 - 0.00%\",60.12")
            .unwrap();
        assert_eq!(quote.change_sign, ChangeSign::Flat);
    }

    #[test]
    fn test_parse_quote_body_mismatch() {
        for body in [
            "",
            "<html>Not Found</html>",
            "\"XXXX\",\"N/A\",N/A",
            "\"Apple Inc.\",\"+1.23%\",",
        ] {
            let err = parse_quote_body("XXXX", body).unwrap_err();
            assert!(matches!(err, QuoteError::Unparseable { .. }), "body: {body:?}");
        }
    }

    #[test]
    fn test_request_url() {
        let client = QuoteClient::new("http://quotes.example.com/d/quotes.csv", Duration::from_secs(1))
            .unwrap();
        assert_eq!(
            client.request_url("GME").as_str(),
            "http://quotes.example.com/d/quotes.csv?s=GME&f=ncl1"
        );
    }

    #[test]
    fn test_quote_page_url() {
        assert_eq!(quote_page_url("MSFT"), "https://finance.yahoo.com/quote/MSFT");
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = QuoteClient::new(&format!("http://{addr}/quotes.csv"), Duration::from_secs(2))
            .unwrap();
        let err = client.fetch("AAPL").await.unwrap_err();
        assert!(matches!(err, QuoteError::Unreachable { .. }));
    }
}
