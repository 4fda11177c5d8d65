use std::path::PathBuf;

use super::config::{default_config_path, SigstreamConfig};

/// Write a default configuration file
///
/// Refuses to overwrite an existing file unless `--force` is given.
pub fn execute(
    config_path: Option<String>,
    url: String,
    account: String,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    if config_path.exists() && !force {
        return Err(format!(
            "Config file '{}' already exists. Use --force to overwrite.",
            config_path.display()
        )
        .into());
    }

    SigstreamConfig::create_default(&config_path, &url, &account)?;

    println!("Created: {}", config_path.display());
    println!("Edit the file to set your gateway URL, account, and auth token.");

    Ok(())
}
