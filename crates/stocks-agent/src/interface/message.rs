//! Message types exchanged with the chat transport

use serde::{Deserialize, Serialize};

/// Kind of inbound event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageKind {
    /// A chat message posted by a user
    Chat,
    /// Any other transport event (presence, typing, reactions, ...)
    Other(String),
}

impl From<String> for MessageKind {
    fn from(value: String) -> Self {
        if value == "message" {
            Self::Chat
        } else {
            Self::Other(value)
        }
    }
}

impl From<MessageKind> for String {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Chat => "message".to_string(),
            MessageKind::Other(value) => value,
        }
    }
}

/// Kind of conversation, derived from the transport's channel id prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Public channel (`C...`)
    Public,
    /// Private channel or group (`G...`)
    Private,
    /// Direct message (`D...`)
    Direct,
    Unknown,
}

impl ChannelKind {
    pub fn from_channel_id(channel_id: &str) -> Self {
        match channel_id.as_bytes().first() {
            Some(b'C') => Self::Public,
            Some(b'G') => Self::Private,
            Some(b'D') => Self::Direct,
            _ => Self::Unknown,
        }
    }
}

/// One inbound event, in the transport's wire shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "channel", default)]
    pub channel_id: String,
    #[serde(rename = "user", default)]
    pub author_id: String,
}

impl InboundMessage {
    /// Create a chat message
    pub fn chat(
        channel_id: impl Into<String>,
        author_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            kind: MessageKind::Chat,
            text: text.into(),
            channel_id: channel_id.into(),
            author_id: author_id.into(),
        }
    }

    /// Chat message with non-empty text
    pub fn is_chat(&self) -> bool {
        self.kind == MessageKind::Chat && !self.text.trim().is_empty()
    }

    pub fn channel_kind(&self) -> ChannelKind {
        ChannelKind::from_channel_id(&self.channel_id)
    }
}

/// Where a reply must go, captured when the message is dispatched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyContext {
    pub channel_id: String,
    pub author_id: String,
}

impl From<&InboundMessage> for ReplyContext {
    fn from(message: &InboundMessage) -> Self {
        Self {
            channel_id: message.channel_id.clone(),
            author_id: message.author_id.clone(),
        }
    }
}

/// Colour-coded rich payload attached to a reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub title: String,
    pub body: String,
    pub color: String,
    pub fallback_text: String,
}

/// Reply handed to the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundReply {
    pub channel_id: String,
    pub text: String,
    pub attachment: Option<Attachment>,
}

impl OutboundReply {
    /// Plain text reply
    pub fn text(channel_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            text: text.into(),
            attachment: None,
        }
    }

    /// Reply whose content is carried by the attachment
    pub fn with_attachment(channel_id: impl Into<String>, attachment: Attachment) -> Self {
        Self {
            channel_id: channel_id.into(),
            text: String::new(),
            attachment: Some(attachment),
        }
    }
}
