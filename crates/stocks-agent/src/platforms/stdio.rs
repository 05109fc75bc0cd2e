//! Line-oriented JSON adapters
//!
//! Each input line is one event in the chat transport's wire shape, e.g.
//! `{"type":"message","channel":"C1","user":"U1","text":"$AAPL"}`.
//! Replies are written to stdout as one JSON object per line.

use crate::error::{BotError, Result};
use crate::interface::{BotIdentity, EventSource, InboundMessage, OutboundReply, ReplySink};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tracing::warn;

/// Event source reading one JSON event per line
pub struct JsonLinesSource<R> {
    identity: BotIdentity,
    reader: R,
    line: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin + Send> JsonLinesSource<R> {
    pub fn new(identity: BotIdentity, reader: R) -> Self {
        Self {
            identity,
            reader,
            line: Vec::new(),
        }
    }
}

impl JsonLinesSource<BufReader<Stdin>> {
    /// Read events from standard input
    pub fn stdin(identity: BotIdentity) -> Self {
        Self::new(identity, BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> EventSource for JsonLinesSource<R> {
    fn identity(&self) -> &BotIdentity {
        &self.identity
    }

    async fn next_event(&mut self) -> Result<Option<InboundMessage>> {
        loop {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line).await? == 0 {
                return Ok(None);
            }

            let line = self.line.trim_ascii();
            if line.is_empty() {
                continue;
            }

            // Invalid UTF-8 surfaces as a parse error, so it is skipped too
            match serde_json::from_slice(line) {
                Ok(message) => return Ok(Some(message)),
                Err(e) => warn!(error = %e, "Skipping malformed event line"),
            }
        }
    }
}

/// Reply sink printing each reply as a JSON line on stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReplySink for StdoutSink {
    async fn post_message(&self, reply: OutboundReply) -> Result<()> {
        let line = serde_json::to_string(&reply)
            .map_err(|e| BotError::Transport(format!("failed to encode reply: {e}")))?;
        println!("{line}");
        Ok(())
    }
}
