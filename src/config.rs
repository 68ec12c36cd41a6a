//! Configuration module for diff-panel
//!
//! Loads user configuration from ~/.diff-panel/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::messages::{OutputFormat, RenderConfig};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Id of the container the diff is rendered into
    pub destination: String,
    /// Show the "viewed n/m" footer (default true)
    pub footer: bool,
    pub render: RenderDefaults,
}

/// Renderer settings used when the host leaves them out
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderDefaults {
    pub output_format: OutputFormat,
    /// Render a "viewed" checkbox per file (default true)
    pub file_content_toggle: bool,
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::LineByLine,
            file_content_toggle: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            destination: "diff".to_string(),
            footer: true,
            render: RenderDefaults::default(),
        }
    }
}

impl RenderDefaults {
    /// Fills in the keys the host did not set
    pub fn apply(&self, config: &mut RenderConfig) {
        config.output_format = config.output_format.or(Some(self.output_format));
        config.file_content_toggle = config
            .file_content_toggle
            .or(Some(self.file_content_toggle));
    }
}

impl Config {
    /// Load configuration from default path (~/.diff-panel/config.toml)
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from `path`, falling back to defaults if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Invalid config file: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".diff-panel")
            .join("config.toml")
    }

    /// Merge CLI overrides into config
    pub fn with_overrides(mut self, side_by_side: Option<bool>, destination: Option<String>) -> Self {
        if let Some(sbs) = side_by_side {
            self.render.output_format = if sbs {
                OutputFormat::SideBySide
            } else {
                OutputFormat::LineByLine
            };
        }
        if let Some(dest) = destination {
            self.destination = dest;
        }
        self
    }

    /// Create a default config file at `path`
    pub fn create_default(path: &Path) -> Result<()> {
        let config = Config::default();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(&config)
            .context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.destination, "diff");
        assert!(config.footer);
        assert_eq!(config.render.output_format, OutputFormat::LineByLine);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "destination = \"app\"\n[render]\noutput_format = \"side-by-side\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.destination, "app");
        assert!(config.footer);
        assert_eq!(config.render.output_format, OutputFormat::SideBySide);
        assert!(config.render.file_content_toggle);
    }

    #[test]
    fn test_create_default_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        Config::create_default(&path).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.destination, Config::default().destination);
    }

    #[test]
    fn test_overrides() {
        let config = Config::default().with_overrides(Some(true), Some("main".into()));
        assert_eq!(config.render.output_format, OutputFormat::SideBySide);
        assert_eq!(config.destination, "main");

        let config = config.with_overrides(None, None);
        assert_eq!(config.destination, "main");
    }

    #[test]
    fn test_host_keys_win_over_defaults() {
        let defaults = RenderDefaults {
            output_format: OutputFormat::SideBySide,
            file_content_toggle: false,
        };

        let mut from_host = RenderConfig {
            output_format: Some(OutputFormat::LineByLine),
            ..Default::default()
        };
        defaults.apply(&mut from_host);
        assert_eq!(from_host.output_format(), OutputFormat::LineByLine);
        assert!(!from_host.file_content_toggle());

        let mut empty = RenderConfig::default();
        defaults.apply(&mut empty);
        assert_eq!(empty.output_format(), OutputFormat::SideBySide);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "footer = \"yes\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
