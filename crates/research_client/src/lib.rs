//! Research client IO: streaming session channel, backend API and the
//! background client handle.
mod api;
mod channel;
mod client;
mod types;

pub use api::{RefinementRequest, ResearchApi, SubredditDiscovery, ThreadAnalysis, ThreadDepth};
pub use channel::{ChannelSettings, NdjsonTransport, ProgressSink, SessionTransport};
pub use client::ClientHandle;
pub use types::{ChannelError, ClientEvent};
