//! Transport adapters implementing [`EventSource`](crate::interface::EventSource)
//! and [`ReplySink`](crate::interface::ReplySink)

pub mod channel;
pub mod slack;
pub mod stdio;

pub use channel::{ChannelSink, ChannelSource};
pub use slack::{SlackClient, SlackConfig};
pub use stdio::{JsonLinesSource, StdoutSink};
