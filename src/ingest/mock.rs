//! Mock Event Sink for Testing
//!
//! Captures emitted events for assertions without a real downstream
//! consumer. Clones share state, so a clone can be handed to the trigger
//! while the original drives assertions.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::envelope::NormalizedEvent;
use super::traits::{EventSink, IngestError, IngestResult};

/// Mock sink recording every emitted event
#[derive(Clone, Default)]
pub struct MockEventSink {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    events: Vec<NormalizedEvent>,
    fail_message: Option<String>,
}

impl MockEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `emit` fail with the given message
    pub fn fail_with(&self, message: &str) {
        self.state.lock().unwrap().fail_message = Some(message.to_string());
    }

    /// Make subsequent `emit` calls succeed again
    pub fn clear_failure(&self) {
        self.state.lock().unwrap().fail_message = None;
    }

    /// Events emitted so far, in arrival order
    pub fn emitted(&self) -> Vec<NormalizedEvent> {
        self.state.lock().unwrap().events.clone()
    }

    /// Number of events emitted so far
    pub fn count(&self) -> usize {
        self.state.lock().unwrap().events.len()
    }

    /// Timestamps of emitted events, in arrival order
    pub fn timestamps(&self) -> Vec<u64> {
        self.state
            .lock()
            .unwrap()
            .events
            .iter()
            .map(|e| e.timestamp)
            .collect()
    }
}

#[async_trait]
impl EventSink for MockEventSink {
    async fn emit(&self, event: NormalizedEvent) -> IngestResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.fail_message {
            return Err(IngestError::Sink(message.clone()));
        }
        state.events.push(event);
        Ok(())
    }
}
