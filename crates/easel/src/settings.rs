//! Settings file
//!
//! Optional JSON mirroring the engine and shell configuration. Every field
//! may be left out.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use easel_engine::EngineConfig;
use easel_shell::ShellConfig;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid asset base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Update slices per second
    pub step_hz: Option<f64>,
    /// Cap on simulated time per frame
    pub max_frame_delta_ms: Option<u64>,
    pub debug: bool,
    pub scale: Option<f32>,
    pub asset_root: Option<PathBuf>,
    pub asset_base_url: Option<String>,
    pub font_path: Option<PathBuf>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig {
            debug: self.debug,
            ..Default::default()
        };
        if let Some(hz) = self.step_hz {
            config = config.with_step_hz(hz);
        }
        if let Some(ms) = self.max_frame_delta_ms {
            config.max_frame_delta = Duration::from_millis(ms);
        }
        config
    }

    pub fn shell_config(&self, title: &str) -> Result<ShellConfig, SettingsError> {
        let defaults = ShellConfig::default();
        Ok(ShellConfig {
            title: title.to_string(),
            asset_root: self.asset_root.clone().unwrap_or(defaults.asset_root),
            asset_base_url: self.asset_base_url.as_deref().map(Url::parse).transpose()?,
            font_path: self.font_path.clone(),
            scale: self.scale.unwrap_or(defaults.scale),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings = Settings::parse("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.engine_config(), EngineConfig::default());

        let shell = settings.shell_config("Breakout").unwrap();
        assert_eq!(shell.title, "Breakout");
        assert_eq!(shell.asset_root, PathBuf::from("."));
        assert_eq!(shell.scale, 1.0);
    }

    #[test]
    fn test_timing_fields() {
        let settings = Settings::parse(r#"{ "step_hz": 100, "max_frame_delta_ms": 100, "debug": true }"#).unwrap();
        let config = settings.engine_config();
        assert_eq!(config.fixed_step, Duration::from_millis(10));
        assert_eq!(config.max_frame_delta, Duration::from_millis(100));
        assert!(config.debug);
        assert_eq!(config.max_slices(), 10);
    }

    #[test]
    fn test_unrepresentable_step_rate_falls_back() {
        let settings = Settings::parse(r#"{ "step_hz": 1e-300 }"#).unwrap();
        let config = settings.engine_config();
        assert_eq!(config.fixed_step, EngineConfig::default().fixed_step);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_shell_fields() {
        let settings = Settings::parse(
            r#"{ "asset_base_url": "https://games.example.com/", "scale": 2.0, "font_path": "fonts/mono.ttf" }"#,
        )
        .unwrap();
        let shell = settings.shell_config("Minesweeper").unwrap();
        assert_eq!(shell.asset_base_url.unwrap().as_str(), "https://games.example.com/");
        assert_eq!(shell.scale, 2.0);
        assert_eq!(shell.font_path, Some(PathBuf::from("fonts/mono.ttf")));
    }

    #[test]
    fn test_bad_settings() {
        assert!(matches!(Settings::parse("{ \"fps\": 3 }"), Err(SettingsError::Parse(_))));
        let settings = Settings::parse(r#"{ "asset_base_url": "not a url" }"#).unwrap();
        assert!(matches!(settings.shell_config("x"), Err(SettingsError::BaseUrl(_))));
        assert!(matches!(
            Settings::load(Path::new("/nonexistent-easel.json")),
            Err(SettingsError::Read { .. })
        ));
    }
}
