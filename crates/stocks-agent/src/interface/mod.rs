//! Bot platform interfaces
//!
//! Platform-agnostic message types, transport traits and reply formatting

pub mod formatter;
pub mod interface;
pub mod message;

pub use formatter::{GAIN_COLOR, LOSS_COLOR, ReplyFormatter};
pub use interface::{BotIdentity, EventSource, ReplySink};
pub use message::{
    Attachment, ChannelKind, InboundMessage, MessageKind, OutboundReply, ReplyContext,
};
