use clap::{Parser, Subcommand};

pub mod config;
pub mod init_config;
pub mod run;
pub mod version;

#[derive(Parser)]
#[command(name = "sigstream")]
#[command(author = "Sigstream Project")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Signal gateway WebSocket ingestion trigger", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the ingestion trigger
    Run {
        /// Path to config file (default: ~/.local/share/sigstream/config.toml)
        #[arg(long)]
        config: Option<String>,

        /// Path to file containing the gateway bearer token (container-native)
        /// Overrides the token in the config file and SIGSTREAM_AUTH_TOKEN
        #[arg(long)]
        auth_token_file: Option<String>,
    },

    /// Write a default configuration file
    InitConfig {
        /// Path to write the config file (default: ~/.local/share/sigstream/config.toml)
        #[arg(long)]
        config: Option<String>,

        /// Gateway base URL
        #[arg(long, default_value = "https://localhost:8080")]
        url: String,

        /// Account identifier the receive stream is scoped to
        #[arg(long, default_value = "+16135550123")]
        account: String,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Display version information
    Version,
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Run {
            config,
            auth_token_file,
        } => run::execute(config, auth_token_file).await,
        Commands::InitConfig {
            config,
            url,
            account,
            force,
        } => init_config::execute(config, url, account, force),
        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}
