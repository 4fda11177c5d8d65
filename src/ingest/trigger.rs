//! Trigger lifecycle and transport driver.
//!
//! `SignalTrigger::start` validates configuration, then spawns one task that
//! drives the supervisor state machine against a real `tokio-tungstenite`
//! connection. `TriggerHandle::stop` is idempotent and terminal: the
//! termination flag is set before the driver is woken, so a reconnect timer
//! firing concurrently can never schedule a new attempt.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{info, warn};

use super::endpoint::{client_request, receive_url};
use super::filter::FilterOptions;
use super::supervisor::{Action, ConnEvent, Supervisor, SupervisorState};
use super::traits::{EventSink, IngestError, IngestResult};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Lower bound on the reconnect delay
pub const MIN_RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Upper bound on the reconnect delay
pub const MAX_RECONNECT_DELAY: Duration = Duration::from_secs(60);

/// Default reconnect delay
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Trigger configuration, immutable after start
#[derive(Debug, Clone)]
pub struct TriggerConfig {
    /// Gateway base URL (`http(s)://` or `ws(s)://`)
    pub base_url: String,
    /// Account identifier appended to the receive path
    pub account: String,
    /// Optional bearer token for the upgrade request
    pub auth_token: Option<String>,
    /// Fixed delay between a close/error and the next connect attempt
    pub reconnect_delay: Duration,
    /// Content filter switches
    pub filter: FilterOptions,
}

impl TriggerConfig {
    pub fn new(base_url: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            account: account.into(),
            auth_token: None,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            filter: FilterOptions::default(),
        }
    }

    /// Validate the configuration.
    ///
    /// Failures here are fatal at startup: `SignalTrigger::start` surfaces
    /// them to the caller immediately, with no retry.
    pub fn validate(&self) -> IngestResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(IngestError::Config("Gateway URL is required".to_string()));
        }
        let has_known_scheme = ["https://", "http://", "wss://", "ws://"]
            .iter()
            .any(|scheme| self.base_url.starts_with(scheme));
        if !has_known_scheme {
            return Err(IngestError::Config(format!(
                "Gateway URL '{}' must use an http(s) or ws(s) scheme",
                self.base_url
            )));
        }
        if self.account.trim().is_empty() {
            return Err(IngestError::Config("Account is required".to_string()));
        }
        if self.reconnect_delay < MIN_RECONNECT_DELAY || self.reconnect_delay > MAX_RECONNECT_DELAY
        {
            return Err(IngestError::Config(format!(
                "Reconnect delay must be between {}s and {}s, got {}s",
                MIN_RECONNECT_DELAY.as_secs(),
                MAX_RECONNECT_DELAY.as_secs(),
                self.reconnect_delay.as_secs()
            )));
        }
        Ok(())
    }
}

/// Entry point for starting a trigger instance
pub struct SignalTrigger;

impl SignalTrigger {
    /// Validate `config` and spawn the transport driver.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<S: EventSink>(config: TriggerConfig, sink: S) -> IngestResult<TriggerHandle> {
        config.validate()?;
        // Surface credential problems now rather than on the first attempt
        let url = receive_url(&config.base_url, &config.account);
        client_request(&url, config.auth_token.as_deref())?;

        let stopped = Arc::new(AtomicBool::new(false));
        let stop_notify = Arc::new(Notify::new());
        let task = tokio::spawn(drive(
            config,
            sink,
            Arc::clone(&stopped),
            Arc::clone(&stop_notify),
        ));

        Ok(TriggerHandle {
            stopped,
            stop_notify,
            task: Mutex::new(Some(task)),
        })
    }
}

/// Handle to a running trigger instance
#[derive(Debug)]
pub struct TriggerHandle {
    stopped: Arc<AtomicBool>,
    stop_notify: Arc<Notify>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TriggerHandle {
    /// Request termination. Idempotent; callable at any time after start.
    ///
    /// The termination flag is stored before the driver is woken. The driver
    /// re-checks the flag before scheduling any connect attempt and before
    /// every emission, so no reconnect fires and no event is emitted once it
    /// observes the stop.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.stop_notify.notify_one();
    }

    /// Whether stop has been requested
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Wait for the transport driver to finish shutting down
    pub async fn join(&self) {
        let task = self.task.lock().expect("trigger task lock poisoned").take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}

/// Interpret supervisor actions against the real transport.
///
/// At most one connection is live at a time; reconnection strictly follows
/// close-then-delay-then-reopen.
async fn drive<S: EventSink>(
    config: TriggerConfig,
    sink: S,
    stopped: Arc<AtomicBool>,
    stop_notify: Arc<Notify>,
) {
    let mut supervisor = Supervisor::new(config.filter.clone(), config.reconnect_delay);
    let url = receive_url(&config.base_url, &config.account);

    let mut actions = supervisor.handle(ConnEvent::Started);
    loop {
        if supervisor.is_terminated() {
            break;
        }
        let Some(action) = actions.pop() else {
            break;
        };

        match action {
            Action::Connect => {
                if stopped.load(Ordering::SeqCst) {
                    actions = supervisor.handle(ConnEvent::StopRequested);
                    continue;
                }
                let request = match client_request(&url, config.auth_token.as_deref()) {
                    Ok(request) => request,
                    Err(e) => {
                        actions = supervisor.handle(ConnEvent::Errored(e));
                        continue;
                    }
                };
                info!(%url, "Connecting to gateway");
                tokio::select! {
                    _ = stop_notify.notified() => {
                        actions = supervisor.handle(ConnEvent::StopRequested);
                    }
                    result = connect_async(request) => match result {
                        Ok((ws, _response)) => {
                            supervisor.handle(ConnEvent::Opened);
                            actions = run_connection(
                                &mut supervisor,
                                ws,
                                &sink,
                                &stopped,
                                &stop_notify,
                            )
                            .await;
                        }
                        Err(e) => {
                            actions = supervisor
                                .handle(ConnEvent::Errored(IngestError::Transport(e.to_string())));
                        }
                    }
                }
            }
            Action::ScheduleReconnect(delay) => {
                info!(delay_secs = delay.as_secs(), "Reconnecting after delay");
                tokio::select! {
                    _ = stop_notify.notified() => {
                        actions = supervisor.handle(ConnEvent::StopRequested);
                    }
                    _ = tokio::time::sleep(delay) => {
                        actions = if stopped.load(Ordering::SeqCst) {
                            supervisor.handle(ConnEvent::StopRequested)
                        } else {
                            supervisor.handle(ConnEvent::ReconnectDue)
                        };
                    }
                }
            }
            // Close is carried out where the stream lives (run_connection);
            // reaching it here means the connect attempt was already dropped
            Action::Close | Action::Emit(_) => break,
        }
    }
    info!("Transport driver stopped");
}

/// Pump one live connection until it closes, errors, or stop is requested.
///
/// Returns the follow-up actions for the outer loop (a reconnect schedule,
/// or nothing on termination).
async fn run_connection<S: EventSink>(
    supervisor: &mut Supervisor,
    mut ws: WsStream,
    sink: &S,
    stopped: &AtomicBool,
    stop_notify: &Notify,
) -> Vec<Action> {
    loop {
        tokio::select! {
            _ = stop_notify.notified() => {
                let actions = supervisor.handle(ConnEvent::StopRequested);
                if actions.iter().any(|a| matches!(a, Action::Close)) {
                    let _ = ws.close(None).await;
                }
                return Vec::new();
            }
            frame = ws.next() => {
                let event = match frame {
                    None => ConnEvent::Closed(None),
                    Some(Err(e)) => {
                        ConnEvent::Errored(IngestError::Transport(e.to_string()))
                    }
                    Some(Ok(Message::Text(text))) => ConnEvent::Frame(text.to_string()),
                    Some(Ok(Message::Close(close))) => {
                        ConnEvent::Closed(close.map(|c| u16::from(c.code)))
                    }
                    // Pings are answered by tungstenite internally; binary
                    // frames are not part of the gateway protocol
                    Some(Ok(_)) => continue,
                };

                let mut follow_up = Vec::new();
                for action in supervisor.handle(event) {
                    match action {
                        Action::Emit(event) => {
                            if stopped.load(Ordering::SeqCst) {
                                continue;
                            }
                            if let Err(e) = sink.emit(*event).await {
                                warn!(error = %e, "Sink rejected event");
                            }
                        }
                        other => follow_up.push(other),
                    }
                }

                if supervisor.is_terminated()
                    || supervisor.state() != SupervisorState::Connected
                {
                    return follow_up;
                }
            }
        }
    }
}
