mod config;

pub use config::{Config, CueSettings, SessionSettings, STORAGE_KEY};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// `INTERVAL_TIMER_HOME` wins when set. Otherwise `~/.config/interval-timer`,
/// or `~/.config/interval-timer-dev` when `INTERVAL_TIMER_ENV=dev`.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("INTERVAL_TIMER_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env =
                std::env::var("INTERVAL_TIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("interval-timer-dev")
            } else {
                base_dir.join("interval-timer")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
