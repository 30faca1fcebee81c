//! # Adapters

pub mod channel;

pub use channel::ChannelClientTransport;
