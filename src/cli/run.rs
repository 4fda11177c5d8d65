use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sigstream::ingest::{
    EventSink, IngestError, IngestResult, NormalizedEvent, SignalTrigger,
};

use super::config::{default_config_path, SigstreamConfig};

/// Run the ingestion trigger
///
/// Connects to the configured gateway's WebSocket receive stream and writes
/// one JSON line per qualifying message event to stdout. Runs until Ctrl-C.
///
/// ## Configuration Loading
///
/// Configuration is loaded from one of these sources (in order of precedence):
/// 1. `--config` flag if provided
/// 2. Default config at `~/.local/share/sigstream/config.toml`
///
/// ## Auth Token Loading
///
/// The bearer token is loaded from one of these sources (in order of
/// precedence):
/// 1. `--auth-token-file` flag if provided
/// 2. `SIGSTREAM_AUTH_TOKEN` environment variable
/// 3. `auth_token` in the config file
pub async fn execute(
    config_path: Option<String>,
    auth_token_file: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    let config = SigstreamConfig::load(&config_path)?;

    init_logging(&config.logging.level)?;
    info!(config = %config_path.display(), "Starting sigstream");

    let mut trigger_config = config.to_trigger_config();
    trigger_config.auth_token = resolve_auth_token(auth_token_file, trigger_config.auth_token)?;

    let handle = SignalTrigger::start(trigger_config, StdoutSink)?;

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    handle.stop();
    handle.join().await;

    Ok(())
}

fn init_logging(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    // Logs go to stderr; stdout carries the NDJSON event stream
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Resolve the bearer token: file flag, then environment, then config
fn resolve_auth_token(
    auth_token_file: Option<String>,
    from_config: Option<String>,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    if let Some(path) = auth_token_file {
        let token = std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read auth token file '{}': {}", path, e))?;
        return Ok(Some(token.trim().to_string()));
    }

    if let Ok(token) = std::env::var("SIGSTREAM_AUTH_TOKEN") {
        return Ok(Some(token.trim().to_string()));
    }

    Ok(from_config)
}

/// Sink writing one JSON object per line to stdout
struct StdoutSink;

#[async_trait]
impl EventSink for StdoutSink {
    async fn emit(&self, event: NormalizedEvent) -> IngestResult<()> {
        let line = serde_json::to_string(&event)
            .map_err(|e| IngestError::Sink(format!("Failed to serialize event: {}", e)))?;
        println!("{}", line);
        Ok(())
    }
}
