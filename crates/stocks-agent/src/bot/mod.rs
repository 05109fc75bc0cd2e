//! Stocks bot runner
//!
//! Pulls events from an [`EventSource`] and hands each one to the
//! [`MessageRouter`] on its own task, so a slow quote lookup never blocks
//! the next message.
//!
//! # Example
//!
//! ```rust,ignore
//! use stocks_agent::bot::StocksBot;
//!
//! let bot = StocksBot::new(router, sink).with_welcome_channel(Some("C024BE91L".into()));
//! bot.run(source).await?;
//! ```

use crate::error::Result;
use crate::interface::{EventSource, ReplyFormatter, ReplySink};
use crate::router::MessageRouter;
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

/// Event loop around a [`MessageRouter`]
pub struct StocksBot {
    router: Arc<MessageRouter>,
    sink: Arc<dyn ReplySink>,
    welcome_channel: Option<String>,
}

impl StocksBot {
    /// Create a bot; `sink` is used for the startup welcome only
    pub fn new(router: MessageRouter, sink: Arc<dyn ReplySink>) -> Self {
        Self {
            router: Arc::new(router),
            sink,
            welcome_channel: None,
        }
    }

    /// Post a usage hint to `channel` when the bot starts
    pub fn with_welcome_channel(mut self, channel: Option<String>) -> Self {
        self.welcome_channel = channel;
        self
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    /// Run until the source is exhausted, then wait for in-flight handlers.
    ///
    /// A source failure stops intake; handlers already dispatched still
    /// finish before the error is returned.
    pub async fn run<S: EventSource>(&self, mut source: S) -> Result<()> {
        info!(
            user_id = %source.identity().user_id,
            name = %source.identity().name,
            "Stocks bot started"
        );

        if let Some(channel) = &self.welcome_channel {
            let welcome = ReplyFormatter::new().welcome(channel);
            if let Err(e) = self.sink.post_message(welcome).await {
                warn!(%channel, error = %e, "Failed to post welcome message");
            }
        }

        let mut in_flight = JoinSet::new();
        let mut dispatched = 0usize;

        let outcome = loop {
            match source.next_event().await {
                Ok(Some(message)) => {
                    while let Some(done) = in_flight.try_join_next() {
                        log_join(done);
                    }

                    let router = Arc::clone(&self.router);
                    in_flight.spawn(async move { router.handle(message).await });
                    dispatched += 1;
                }
                Ok(None) => break Ok(()),
                Err(e) => {
                    error!(error = %e, "Event source failed");
                    break Err(e);
                }
            }
        };

        debug!(pending = in_flight.len(), "Draining in-flight handlers");
        while let Some(done) = in_flight.join_next().await {
            log_join(done);
        }

        info!(dispatched, "Stocks bot stopped");
        outcome
    }
}

fn log_join(result: std::result::Result<(), JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "Message handler panicked");
    }
}
