//! Application settings loaded from config.toml
//!
//! Settings are read once at startup and shared as an `Arc<AppConfig>`; nothing
//! changes them afterwards. Every field has a default, so a missing file just
//! means default settings. The bot token is never part of this file; it is read
//! from `DISCORD_BOT_TOKEN` right before the client starts.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "REMINDER_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Prefix for text commands (e.g. `=remind 1h stretch`)
    pub prefix: String,
    /// Location of the pending reminders document
    pub reminders_file: PathBuf,
    /// Role allowed to use reminder commands without the Mute Members permission
    pub reminder_role_id: Option<u64>,
    /// Colour used for every embed the bot sends
    pub embed_color: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            prefix: "=".to_string(),
            reminders_file: PathBuf::from("data/reminders.json"),
            reminder_role_id: None,
            embed_color: 0x0000_00FF,
        }
    }
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or is not valid TOML.
/// A missing file yields [`AppConfig::default`].
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path);

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No config file at {:?}, using defaults", path);
            return Ok(AppConfig::default());
        }
        Err(e) => {
            return Err(Error::Config {
                message: format!("Failed to read config file {path:?}: {e}"),
            });
        }
    };

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse TOML from config file {path:?}: {e}"),
    })
}

/// Loads configuration from `$REMINDER_CONFIG`, falling back to `./config.toml`.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(path)
}
