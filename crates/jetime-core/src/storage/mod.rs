mod config;

pub use config::{Config, CountdownConfig, DisplayConfig};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/jetime[-dev]/` based on JETIME_ENV.
///
/// Set JETIME_ENV=dev to use development data directory, or
/// JETIME_CONFIG_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("JETIME_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("JETIME_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("jetime-dev")
            } else {
                base_dir.join("jetime")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
