//! Chat bot for stock quotes and personal purchase ledgers
//!
//! The bot watches chat channels for cashtags and purchase declarations:
//!
//! - `$AAPL` replies with the current quote for every mentioned symbol
//! - `$TSLA 10@$700.50` records a purchase and confirms the resulting position
//! - `portfolio` summarizes every position held by the author
//!
//! # Architecture
//!
//! An [`EventSource`] feeds events to the [`StocksBot`] runner, which hands each
//! one to the [`MessageRouter`] on its own task. The router classifies the event,
//! consults the [`QuoteSource`] and the [`PortfolioLedger`], and posts replies
//! built by the [`ReplyFormatter`] through a [`ReplySink`].
//!
//! # Example
//!
//! ```rust,ignore
//! use stocks_agent::{
//!     BotConfig, BotIdentity, JsonLinesSource, MessageRouter, PortfolioLedger, QuoteClient,
//!     StdoutSink, StocksBot,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BotConfig::from_env()?;
//!     let ledger = PortfolioLedger::connect(&config.database_url).await?;
//!     let quotes = Arc::new(QuoteClient::from_config(&config)?);
//!     let sink = Arc::new(StdoutSink::new());
//!     let identity = BotIdentity::new("UBOT", &config.name);
//!
//!     let router = MessageRouter::new(identity.clone(), quotes, ledger, sink.clone())
//!         .with_config(&config);
//!     StocksBot::new(router, sink)
//!         .run(JsonLinesSource::stdin(identity))
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bot;
pub mod config;
pub mod error;
pub mod interface;
pub mod platforms;
pub mod portfolio;
pub mod router;
pub mod symbols;

pub use api::{ChangeSign, Quote, QuoteClient, QuoteSource};
pub use bot::StocksBot;
pub use config::BotConfig;
pub use error::{BotError, QuoteError, Result, StoreError};
pub use interface::{
    Attachment, BotIdentity, EventSource, InboundMessage, OutboundReply, ReplyContext,
    ReplyFormatter, ReplySink,
};
pub use platforms::{ChannelSink, ChannelSource, JsonLinesSource, SlackClient, StdoutSink};
pub use portfolio::{PortfolioLedger, PositionSummary, PurchaseRecord};
pub use router::{MessageRouter, Route};
pub use symbols::{PurchaseDeclaration, SymbolExtractor};
