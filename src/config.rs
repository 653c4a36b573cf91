//! Optional TOML configuration.
//!
//! The game runs with built-in defaults when no file is present. A file may override any
//! subset of the fields:
//!
//! ```toml
//! log_filter = "kart_dash=debug"
//!
//! [tuning]
//! max_speed = 12.0
//!
//! [window]
//! scale = 1.5
//! ```

use crate::game::Tuning;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "KART_DASH_CONFIG";
/// File looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "kart-dash.toml";
/// Log filter used when neither `RUST_LOG` nor the config file sets one.
pub const DEFAULT_LOG_FILTER: &str = "kart_dash=info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),
    #[error("invalid window scale {0}, expected a positive number")]
    InvalidScale(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Multiplier applied to the 800x400 playfield for the initial window size.
    pub scale: f32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub log_filter: Option<String>,
    pub tuning: Tuning,
    pub window: WindowConfig,
}

impl GameConfig {
    /// Parses and validates a config from TOML text.
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Resolves the config the game should start with.
    ///
    /// An explicit path from [`CONFIG_ENV_VAR`] must exist. The default file is optional;
    /// when it is missing the built-in defaults are returned.
    pub fn discover() -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Ok(explicit) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(explicit);
            return Ok((Self::load(&path)?, Some(path)));
        }

        let path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if path.is_file() {
            Ok((Self::load(&path)?, Some(path)))
        } else {
            Ok((Self::default(), None))
        }
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let tuning = &self.tuning;
        let positive = [
            ("player_speed", tuning.player_speed),
            ("max_speed", tuning.max_speed),
            ("acceleration", tuning.acceleration),
            ("deceleration", tuning.deceleration),
            ("track_length", tuning.track_length),
            ("reference_frame_ms", tuning.reference_frame_ms),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidTuning(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(tuning.max_frame_ms.is_finite() && tuning.max_frame_ms >= tuning.reference_frame_ms)
        {
            return Err(ConfigError::InvalidTuning(format!(
                "max_frame_ms ({}) must be at least reference_frame_ms ({})",
                tuning.max_frame_ms, tuning.reference_frame_ms
            )));
        }
        if !(self.window.scale.is_finite() && self.window.scale > 0.0) {
            return Err(ConfigError::InvalidScale(self.window.scale));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<GameConfig, ConfigError> {
        GameConfig::from_toml_str(text, Path::new("test.toml"))
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = parse("").expect("empty config");
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.tuning, Tuning::default());
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_partial_override() {
        let config = parse(
            r#"
            log_filter = "kart_dash=debug"

            [tuning]
            max_speed = 12.0

            [window]
            scale = 1.5
            "#,
        )
        .expect("partial config");
        assert_eq!(config.tuning.max_speed, 12.0);
        assert_eq!(config.tuning.track_length, 2000.0);
        assert_eq!(config.window.scale, 1.5);
        assert!(config.window.vsync);
        assert_eq!(config.log_filter(), "kart_dash=debug");
    }

    #[test]
    fn test_rejects_non_positive_tuning() {
        let err = parse("[tuning]\ntrack_length = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTuning(_)), "{err}");
    }

    #[test]
    fn test_rejects_cap_below_reference_frame() {
        let err = parse("[tuning]\nmax_frame_ms = 8.0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTuning(_)), "{err}");
    }

    #[test]
    fn test_rejects_bad_scale() {
        let err = parse("[window]\nscale = -2.0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidScale(_)));
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = parse("[tuning\nmax_speed = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("test.toml"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = GameConfig::load(Path::new("definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
