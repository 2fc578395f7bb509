//! Telemetry ingestion for the pursuit controller.
//!
//! A background thread pulls raw messages from a `FeedSource`, decodes them
//! and publishes the newest snapshot into a shared slot. Readers on any
//! thread see either the previous snapshot or the new one, never a mix.

pub mod ingestor;
pub mod source;
pub mod subscriber;

pub use ingestor::{IngestError, IngestStats, IngestorConfig, SnapshotReader, TelemetryIngestor};
pub use source::{ChannelFeed, FeedError, FeedSource, TcpFeed};
pub use subscriber::ZmqFeed;
