//! TOML-based configuration store.
//!
//! Stores the last committed session configuration and cue preferences:
//! - work / rest seconds and set count (raw; resolved on read)
//! - whether bells and vibration cues are wanted
//! - the host frame interval
//!
//! The file is `<data_dir>/training-timer.v1.toml`. The version lives in the
//! file name so a future layout can sit next to this one.
//! Writes happen only on explicit commits, never on transient edits.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::timer::{resolve, Configuration};

/// Versioned storage key; doubles as the file stem.
pub const STORAGE_KEY: &str = "training-timer.v1";

/// Session section of the stored config.
///
/// Always holds resolved values. Reading is lenient: floats, negatives and
/// junk are resolved field by field, so one bad value never costs the rest
/// of the file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSettings {
    pub work_seconds: u32,
    pub rest_seconds: u32,
    pub set_count: u32,
}

impl<'de> Deserialize<'de> for SessionSettings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = serde_json::Value::deserialize(deserializer)?;
        Ok(Configuration::resolve_persisted(&record).into())
    }
}

/// Cue and host preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueSettings {
    #[serde(default = "default_true")]
    pub sound: bool,
    #[serde(default = "default_true")]
    pub vibration: bool,
    /// How often the host calls `tick`, in milliseconds.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub cues: CueSettings,
}

fn default_true() -> bool {
    true
}
fn default_frame_interval_ms() -> u64 {
    50
}

impl Default for SessionSettings {
    fn default() -> Self {
        Configuration::default().into()
    }
}

impl Default for CueSettings {
    fn default() -> Self {
        Self {
            sound: true,
            vibration: true,
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

impl From<Configuration> for SessionSettings {
    fn from(cfg: Configuration) -> Self {
        Self {
            work_seconds: cfg.work_seconds(),
            rest_seconds: cfg.rest_seconds(),
            set_count: cfg.set_count(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        let mut current = root;
        if let Some(parent) = parent {
            for part in parent.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }
        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => {
                let n = value
                    .parse::<f64>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                // Whole non-negative numbers stay integers; anything else is
                // left for the section's own deserializer to resolve or reject.
                if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64 {
                    serde_json::Value::Number((n as u64).into())
                } else {
                    serde_json::Number::from_f64(n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            serde_json::Value::Object(_) => return Err(unknown()),
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join(format!("{STORAGE_KEY}.toml")))
    }

    /// Load from the default location, or defaults when there is no file yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory is unusable or the file exists
    /// but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, or defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(cfg)
    }

    /// Load from disk, returning defaults on any failure.
    /// Storage trouble never blocks a session from running.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(error = %e, "config unavailable, using defaults");
                Self::default()
            }
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        tracing::debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key. Session values are re-resolved, so
    /// `session.work_seconds = 44` is stored as 40, `-5` as 10 and `NaN` as
    /// the default. Does not persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is not a number
    /// or bool where one is expected.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| {
            ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }
        })?;
        *self = updated;
        Ok(())
    }

    /// Replace the session section with a committed configuration.
    pub fn commit(&mut self, configuration: Configuration) {
        self.session = configuration.into();
    }

    /// Resolved session configuration.
    pub fn configuration(&self) -> Configuration {
        resolve(
            f64::from(self.session.work_seconds),
            f64::from(self.session.rest_seconds),
            f64::from(self.session.set_count),
        )
    }

    /// Frame interval clamped to something a host can honor.
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.cues.frame_interval_ms.clamp(10, 1000))
    }
}
