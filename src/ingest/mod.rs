//! Gateway Ingestion Module
//!
//! Consumes the Signal gateway's WebSocket event stream and forwards
//! qualifying messages to an [`EventSink`]:
//! - One live connection at a time, supervised by an explicit state machine
//! - Fixed-delay reconnect, unbounded retries, terminal stop
//! - Content filtering and a bounded dedup window keyed on message timestamp

pub mod dedup;
pub mod endpoint;
pub mod envelope;
pub mod filter;
pub mod mock;
pub mod supervisor;
pub mod traits;
pub mod trigger;

pub use dedup::DedupWindow;
pub use envelope::{MessageType, NormalizedEvent, RawEnvelope};
pub use filter::{classify, Decision, DropReason, FilterOptions};
pub use mock::MockEventSink;
pub use supervisor::{Action, ConnEvent, Supervisor, SupervisorState};
pub use traits::{EventSink, IngestError, IngestResult};
pub use trigger::{SignalTrigger, TriggerConfig, TriggerHandle};
