//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Countdown tick interval and the preset dial value
//! - How the terminal front-end renders the countdown
//!
//! Configuration is stored at `~/.config/jetime/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::time::Time;
use crate::timer::{CountdownController, DEFAULT_TICK_INTERVAL_MS};

/// Countdown behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub preset_hours: u32,
    #[serde(default)]
    pub preset_minutes: u32,
    #[serde(default)]
    pub preset_seconds: u32,
}

/// Terminal rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub show_ring: bool,
    #[serde(default = "default_ring_width")]
    pub ring_width: u32,
    /// Print JSON lines instead of text.
    #[serde(default)]
    pub json: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/jetime/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub countdown: CountdownConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}
fn default_true() -> bool {
    true
}
fn default_ring_width() -> u32 {
    30
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            preset_hours: 0,
            preset_minutes: 0,
            preset_seconds: 0,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_ring: true,
            ring_width: default_ring_width(),
            json: false,
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
    ) -> std::result::Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    return Err(invalid("cannot set a whole section".into()));
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or create the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit file, writing the default there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("falling back to default config: {e}");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. The new value is typed after the existing
    /// one. Does not save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation. The config is unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.countdown.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "countdown.tick_interval_ms".into(),
                message: "must be greater than 0".into(),
            });
        }

        let preset = [
            ("countdown.preset_hours", self.countdown.preset_hours, 23),
            ("countdown.preset_minutes", self.countdown.preset_minutes, 59),
            ("countdown.preset_seconds", self.countdown.preset_seconds, 59),
        ];
        for (key, value, max) in preset {
            if value > max {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: format!("{value} is out of range (0..={max})"),
                });
            }
        }
        Ok(())
    }

    /// Raw preset dial value.
    pub fn preset(&self) -> Time {
        Time::new(
            self.countdown.preset_hours,
            self.countdown.preset_minutes,
            self.countdown.preset_seconds,
        )
    }

    /// Idle controller showing `time`, using the configured tick interval.
    pub fn controller(&self, time: Time) -> CountdownController {
        CountdownController::with_time(time).with_tick_interval(self.countdown.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.countdown.tick_interval_ms, 1000);
    }

    #[test]
    fn missing_sections_take_defaults() {
        let parsed: Config = toml::from_str("[countdown]\npreset_minutes = 5\n").unwrap();
        assert_eq!(parsed.countdown.preset_minutes, 5);
        assert_eq!(parsed.countdown.tick_interval_ms, 1000);
        assert!(parsed.display.show_ring);
        assert_eq!(parsed.display.ring_width, 30);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("display.show_ring").as_deref(), Some("true"));
        assert_eq!(cfg.get("countdown.tick_interval_ms").as_deref(), Some("1000"));
        assert!(cfg.get("display.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("display.json", "true").unwrap();
        cfg.set("countdown.preset_seconds", "45").unwrap();
        assert!(cfg.display.json);
        assert_eq!(cfg.preset(), Time::new(0, 0, 45));
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("display.nonexistent_key", "value").unwrap_err();
        assert!(matches!(
            err,
            crate::CoreError::Config(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("display.show_ring", "not_a_bool").is_err());
        assert!(cfg.set("countdown.preset_hours", "-1").is_err());
        assert!(cfg.set("countdown", "1").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn set_rejects_zero_tick_interval() {
        let mut cfg = Config::default();
        let err = cfg.set("countdown.tick_interval_ms", "0").unwrap_err();
        assert!(matches!(
            err,
            crate::CoreError::Config(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg.countdown.tick_interval_ms, 1000);
    }

    #[test]
    fn set_rejects_out_of_range_preset() {
        let mut cfg = Config::default();
        for (key, value) in [
            ("countdown.preset_hours", "24"),
            ("countdown.preset_minutes", "90"),
            ("countdown.preset_seconds", "60"),
        ] {
            let err = cfg.set(key, value).unwrap_err();
            assert!(
                matches!(
                    &err,
                    crate::CoreError::Config(ConfigError::InvalidValue { key: k, .. }) if k == key
                ),
                "{key}={value} gave {err}"
            );
        }
        assert_eq!(cfg, Config::default());

        cfg.set("countdown.preset_hours", "23").unwrap();
        cfg.set("countdown.preset_minutes", "59").unwrap();
        assert_eq!(cfg.preset(), Time::new(23, 59, 0));
    }

    #[test]
    fn set_reports_numbers_too_large_for_the_field() {
        let mut cfg = Config::default();
        let err = cfg.set("countdown.preset_hours", "5000000000").unwrap_err();
        assert!(matches!(
            err,
            crate::CoreError::Config(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_rejects_out_of_range_preset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[countdown]\npreset_minutes = 90\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(
            err,
            crate::CoreError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_then_load_preserves_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("display.ring_width", "12").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.display.ring_width, 12);
    }

    #[test]
    fn load_from_reports_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "countdown = [").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(
            err,
            crate::CoreError::Config(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn controller_uses_configured_interval() {
        let mut cfg = Config::default();
        cfg.set("countdown.tick_interval_ms", "250").unwrap();
        let controller = cfg.controller(Time::new(0, 0, 3));
        assert_eq!(controller.tick_interval_ms(), 250);
        assert_eq!(controller.time_left(), Time::new(0, 0, 3));
    }
}
