//! Sigstream configuration file handling
//!
//! Provides default configuration generation and loading for the trigger
//! service. Configuration files are TOML format.
//!
//! The `[gateway]` section carries the required connection settings (URL,
//! account, optional bearer token). `[trigger]` and `[logging]` are
//! optional and default sensibly when absent.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sigstream::ingest::{FilterOptions, TriggerConfig};

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Default reconnect delay in seconds
const DEFAULT_RECONNECT_DELAY_SECS: u64 = 5;

/// Sigstream service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigstreamConfig {
    /// Gateway connection settings
    pub gateway: GatewayConfig,

    /// Trigger behavior settings
    #[serde(default)]
    pub trigger: TriggerSection,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Gateway connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway base URL (e.g., https://signal-gateway.example.org)
    pub url: String,

    /// Account identifier the receive stream is scoped to
    pub account: String,

    /// Optional bearer token sent on every connection attempt
    pub auth_token: Option<String>,
}

/// Trigger behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerSection {
    /// Delay between reconnect attempts, in seconds (1-60)
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,

    /// Drop events carrying message text
    #[serde(default)]
    pub ignore_messages: bool,

    /// Drop events carrying attachments
    #[serde(default)]
    pub ignore_attachments: bool,

    /// Drop events carrying reactions
    #[serde(default)]
    pub ignore_reactions: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

fn default_reconnect_delay_secs() -> u64 {
    DEFAULT_RECONNECT_DELAY_SECS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for TriggerSection {
    fn default() -> Self {
        Self {
            reconnect_delay_secs: DEFAULT_RECONNECT_DELAY_SECS,
            ignore_messages: false,
            ignore_attachments: false,
            ignore_reactions: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl SigstreamConfig {
    /// Create a new configuration for the given gateway URL and account
    #[allow(dead_code)]
    pub fn new(url: String, account: String) -> Self {
        Self {
            gateway: GatewayConfig {
                url,
                account,
                auth_token: None,
            },
            trigger: TriggerSection::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: SigstreamConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    #[allow(dead_code)]
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, contents)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        Ok(())
    }

    /// Build the trigger configuration from the loaded file.
    ///
    /// Range and scheme validation happens in `TriggerConfig::validate`
    /// when the trigger starts.
    pub fn to_trigger_config(&self) -> TriggerConfig {
        TriggerConfig {
            base_url: self.gateway.url.clone(),
            account: self.gateway.account.clone(),
            auth_token: self.gateway.auth_token.clone(),
            reconnect_delay: Duration::from_secs(self.trigger.reconnect_delay_secs),
            filter: FilterOptions {
                ignore_messages: self.trigger.ignore_messages,
                ignore_attachments: self.trigger.ignore_attachments,
                ignore_reactions: self.trigger.ignore_reactions,
            },
        }
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml(url: &str, account: &str) -> String {
        format!(
            r#"# Sigstream Configuration
#
# Connects to a Signal gateway's WebSocket receive stream and forwards
# qualifying message events as NDJSON on stdout.

[gateway]
# Gateway base URL. http(s) schemes are rewritten to ws(s) automatically.
url = "{url}"

# Account identifier the receive stream is scoped to
account = "{account}"

# Bearer token sent as an Authorization header on every connection attempt.
# Leave commented for gateways without authentication.
# auth_token = "..."

[trigger]
# Delay between reconnect attempts, in seconds (1-60)
reconnect_delay_secs = 5

# Content filters: a matching event is dropped even if other filters pass it
ignore_messages = false
ignore_attachments = false
ignore_reactions = false

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (optional, logs to stderr if not specified)
# file = "/var/log/sigstream/sigstream.log"
"#,
        )
    }

    /// Create and save a default configuration file
    pub fn create_default(
        config_path: &Path,
        url: &str,
        account: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let contents = Self::generate_default_toml(url, account);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(config_path, contents).map_err(|e| {
            format!(
                "Failed to write config file '{}': {}",
                config_path.display(),
                e
            )
        })?;

        Ok(())
    }
}

/// Get the default config file path
///
/// - Linux: ~/.local/share/sigstream/config.toml
pub fn default_config_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sigstream")
        .join("config.toml")
}
