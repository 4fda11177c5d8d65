//! Sigstream - Signal Gateway Ingestion Trigger
//!
//! A resilient WebSocket client that subscribes to a Signal gateway's
//! `/v1/receive/<account>` event stream and forwards qualifying messages
//! to a downstream consumer.
//!
//! Key principles:
//! - NO Signal protocol handling (the gateway decodes; we consume JSON)
//! - One connection at a time, fixed-delay reconnect, retries forever
//! - Bounded dedup window keyed on message timestamp
//! - Terminal stop: no reconnects or emissions after `stop()`

pub mod ingest;
