//! Transport capability traits
//!
//! The bot never talks to a chat platform directly. Adapters implement
//! [`EventSource`] for inbound events and [`ReplySink`] for outbound replies.

use crate::error::{BotError, Result};
use crate::interface::{InboundMessage, OutboundReply, ReplyContext};
use async_trait::async_trait;

/// The agent's own identity on the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    /// Transport user id; events authored by it are ignored
    pub user_id: String,
    /// Display name
    pub name: String,
}

impl BotIdentity {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
        }
    }
}

/// Feed of inbound events
#[async_trait]
pub trait EventSource: Send {
    /// Identity the events are received as
    fn identity(&self) -> &BotIdentity;

    /// Wait for the next event; `Ok(None)` once the feed is exhausted
    async fn next_event(&mut self) -> Result<Option<InboundMessage>>;
}

/// Destination for replies and operator-facing failures
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Post a reply to the channel it names
    async fn post_message(&self, reply: OutboundReply) -> Result<()>;

    /// Surface a failure to the operator, never to the chat channel
    async fn report_error(&self, context: &ReplyContext, error: &BotError) {
        tracing::error!(
            channel = %context.channel_id,
            user = %context.author_id,
            error = %error,
            "Operator attention required"
        );
    }
}
