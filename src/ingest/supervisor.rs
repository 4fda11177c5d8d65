//! Connection supervisor state machine.
//!
//! Transport callbacks (open/message/error/close) are modeled as discrete
//! events fed into an explicit state machine, so the reconnect/terminate
//! race is testable without a live socket. The async driver in `trigger`
//! owns the actual WebSocket, feeds events in, and interprets the returned
//! actions.
//!
//! Reconnect delay is fixed (not exponential) and retries continue
//! indefinitely until `StopRequested`. `Terminated` is absorbing: once
//! reached, no event produces any further action.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::dedup::DedupWindow;
use super::envelope::{NormalizedEvent, RawEnvelope};
use super::filter::{classify, Decision, FilterOptions};
use super::traits::IngestError;

/// Supervisor lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Connecting,
    Connected,
    Reconnecting,
    Terminated,
}

/// Discrete transport and control events
#[derive(Debug)]
pub enum ConnEvent {
    /// Explicit start request
    Started,
    /// Transport opened successfully
    Opened,
    /// One inbound text frame
    Frame(String),
    /// Transport-level failure (connect refused, network error)
    Errored(IngestError),
    /// Transport closed, with close code when known
    Closed(Option<u16>),
    /// The pending reconnect timer fired
    ReconnectDue,
    /// Explicit stop request
    StopRequested,
}

/// Actions for the transport driver to carry out
#[derive(Debug)]
pub enum Action {
    /// Open a new transport connection
    Connect,
    /// Forward a normalized event to the sink
    Emit(Box<NormalizedEvent>),
    /// Arm the single reconnect timer slot
    ScheduleReconnect(Duration),
    /// Close the live transport connection
    Close,
}

/// Owns the connection lifecycle and the filter → dedup → emit dispatch.
///
/// The dedup window lives here for the life of the trigger; it is reset
/// only by a full restart, never by a reconnect.
pub struct Supervisor {
    state: SupervisorState,
    window: DedupWindow,
    filter: FilterOptions,
    reconnect_delay: Duration,
}

impl Supervisor {
    pub fn new(filter: FilterOptions, reconnect_delay: Duration) -> Self {
        Self {
            state: SupervisorState::Idle,
            window: DedupWindow::new(),
            filter,
            reconnect_delay,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == SupervisorState::Terminated
    }

    /// Feed one event through the state machine.
    ///
    /// Returns the actions the driver must carry out. At most one action is
    /// returned per event, except that `Frame` may return an `Emit`.
    pub fn handle(&mut self, event: ConnEvent) -> Vec<Action> {
        use SupervisorState::*;

        if self.state == Terminated {
            return Vec::new();
        }

        match event {
            ConnEvent::Started => {
                if self.state == Idle {
                    self.state = Connecting;
                    vec![Action::Connect]
                } else {
                    Vec::new()
                }
            }
            ConnEvent::Opened => {
                if self.state == Connecting {
                    self.state = Connected;
                    info!("Gateway connection established");
                }
                Vec::new()
            }
            ConnEvent::Frame(text) => {
                if self.state != Connected {
                    return Vec::new();
                }
                match self.process_frame(&text) {
                    Some(event) => vec![Action::Emit(event)],
                    None => Vec::new(),
                }
            }
            ConnEvent::Errored(error) => {
                warn!(%error, "Gateway transport error");
                self.schedule_reconnect()
            }
            ConnEvent::Closed(code) => {
                info!(?code, "Gateway connection closed");
                self.schedule_reconnect()
            }
            ConnEvent::ReconnectDue => {
                if self.state == Reconnecting {
                    self.state = Connecting;
                    vec![Action::Connect]
                } else {
                    Vec::new()
                }
            }
            ConnEvent::StopRequested => {
                let live = matches!(self.state, Connecting | Connected);
                self.state = Terminated;
                info!("Trigger terminated");
                if live {
                    vec![Action::Close]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Only one reconnect timer is outstanding at a time: a second
    /// error/close while already `Reconnecting` arms nothing.
    fn schedule_reconnect(&mut self) -> Vec<Action> {
        match self.state {
            SupervisorState::Connecting | SupervisorState::Connected => {
                self.state = SupervisorState::Reconnecting;
                vec![Action::ScheduleReconnect(self.reconnect_delay)]
            }
            _ => Vec::new(),
        }
    }

    /// Parse → filter → dedup for one inbound frame.
    ///
    /// Malformed frames are logged and discarded without tearing down the
    /// connection.
    fn process_frame(&mut self, text: &str) -> Option<Box<NormalizedEvent>> {
        let frame: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Discarding malformed frame");
                return None;
            }
        };
        let raw: RawEnvelope = match serde_json::from_value(frame.clone()) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Discarding frame with unexpected shape");
                return None;
            }
        };

        match classify(&raw, &frame, &self.filter) {
            Decision::Drop(reason) => {
                debug!(%reason, "Dropping frame");
                None
            }
            Decision::Emit(event) => {
                if self.window.seen(event.timestamp) {
                    debug!(timestamp = event.timestamp, "Duplicate message discarded");
                    return None;
                }
                self.window.record(event.timestamp);
                Some(event)
            }
        }
    }
}
