//! Formatter configuration.

use crate::error::ConfigError;
use crate::history::COALESCE_WINDOW_MS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One level of indentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndentUnit {
    #[default]
    Tab,
    TwoSpaces,
    FourSpaces,
}

impl IndentUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            IndentUnit::Tab => "\t",
            IndentUnit::TwoSpaces => "  ",
            IndentUnit::FourSpaces => "    ",
        }
    }

    /// Character repeated by this unit.
    pub fn fill(self) -> char {
        match self {
            IndentUnit::Tab => '\t',
            IndentUnit::TwoSpaces | IndentUnit::FourSpaces => ' ',
        }
    }

    pub fn len_chars(self) -> usize {
        self.as_str().len()
    }
}

/// User preferences consumed by the formatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    pub indent: IndentUnit,
    /// Insert the closing bracket when an opening one is typed.
    pub autoclose_brackets: bool,
    /// Maximum number of undo groups kept.
    pub history_limit: usize,
    /// Typing within this window joins the previous undo group.
    pub coalesce_window_ms: u64,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            indent: IndentUnit::Tab,
            autoclose_brackets: false,
            history_limit: 1000,
            coalesce_window_ms: COALESCE_WINDOW_MS,
        }
    }
}

impl FormatterConfig {
    /// Parses a configuration from JSON; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::debug!("loaded formatter config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FormatterConfig::default();
        assert_eq!(config.indent, IndentUnit::Tab);
        assert!(!config.autoclose_brackets);
        assert_eq!(config.history_limit, 1000);
        assert_eq!(config.coalesce_window_ms, 300);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = FormatterConfig::from_json(r#"{"indent": "four_spaces"}"#).unwrap();
        assert_eq!(config.indent, IndentUnit::FourSpaces);
        assert_eq!(config.indent.as_str(), "    ");
        assert_eq!(config.history_limit, 1000);
    }

    #[test]
    fn test_json_round_trip() {
        let config = FormatterConfig {
            indent: IndentUnit::TwoSpaces,
            autoclose_brackets: true,
            ..FormatterConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(FormatterConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            FormatterConfig::from_json(r#"{"indent": "tabs"}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            FormatterConfig::load("/nonexistent/mdnote/config.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
