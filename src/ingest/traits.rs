//! Event Sink Trait Abstractions
//!
//! The sink trait decouples the ingestion pipeline from its consumer and
//! enables full coverage via MockEventSink.

use async_trait::async_trait;

use super::envelope::NormalizedEvent;

/// Result type for ingestion operations
pub type IngestResult<T> = Result<T, IngestError>;

/// Ingestion errors
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Sink error: {0}")]
    Sink(String),
}

/// Consumer of normalized gateway events.
///
/// The supervisor delivers events in arrival order within one connection.
/// A sink error never reaches the gateway connection: the supervisor logs
/// it and keeps consuming the stream.
#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    /// Deliver one normalized event downstream
    async fn emit(&self, event: NormalizedEvent) -> IngestResult<()>;
}
