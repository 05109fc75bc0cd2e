//! In-process adapters backed by tokio channels

use crate::error::{BotError, Result};
use crate::interface::{BotIdentity, EventSource, InboundMessage, OutboundReply, ReplySink};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Event source fed through an mpsc channel; ends when every sender is dropped
pub struct ChannelSource {
    identity: BotIdentity,
    events: mpsc::Receiver<InboundMessage>,
}

impl ChannelSource {
    /// Create a source and the sender that feeds it
    pub fn new(identity: BotIdentity, capacity: usize) -> (mpsc::Sender<InboundMessage>, Self) {
        let (tx, events) = mpsc::channel(capacity);
        (tx, Self { identity, events })
    }
}

#[async_trait]
impl EventSource for ChannelSource {
    fn identity(&self) -> &BotIdentity {
        &self.identity
    }

    async fn next_event(&mut self) -> Result<Option<InboundMessage>> {
        Ok(self.events.recv().await)
    }
}

/// Reply sink that forwards every reply into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    replies: mpsc::UnboundedSender<OutboundReply>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboundReply>) {
        let (replies, rx) = mpsc::unbounded_channel();
        (Self { replies }, rx)
    }
}

#[async_trait]
impl ReplySink for ChannelSink {
    async fn post_message(&self, reply: OutboundReply) -> Result<()> {
        self.replies
            .send(reply)
            .map_err(|_| BotError::Transport("reply receiver dropped".to_string()))
    }
}
