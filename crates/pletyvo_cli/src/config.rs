//! CLI configuration file.

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Filter used when neither `RUST_LOG` nor the config file sets one
pub const DEFAULT_LOG_FILTER: &str = "pletyvo=info";

/// Settings read from `--config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CliConfig {
    /// Ed25519 seed file
    pub key_file: PathBuf,
    /// `tracing` filter directives; empty means the built-in default
    pub log_filter: String,
    /// Data type octet for new envelopes
    pub data_type: u8,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            key_file: PathBuf::from("pletyvo.key"),
            log_filter: String::new(),
            data_type: 1,
        }
    }
}

impl CliConfig {
    /// Read a JSON config file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or has unknown or mistyped keys
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .wrap_err_with(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).wrap_err_with(|| format!("parsing config {}", path.display()))
    }

    /// Load `path` if given, defaults otherwise
    ///
    /// # Errors
    ///
    /// Same as [`CliConfig::load`]
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Filter directives to fall back on when `RUST_LOG` is unset
    #[must_use]
    pub fn log_filter(&self) -> &str {
        if self.log_filter.trim().is_empty() {
            DEFAULT_LOG_FILTER
        } else {
            &self.log_filter
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.key_file, PathBuf::from("pletyvo.key"));
        assert_eq!(config.data_type, 1);
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(CliConfig::load_or_default(None).unwrap(), config);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pletyvo.json");
        fs::write(&path, r#"{ "key_file": "/keys/author.key", "log_filter": "pletyvo_dapp=debug" }"#)
            .unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.key_file, PathBuf::from("/keys/author.key"));
        assert_eq!(config.log_filter(), "pletyvo_dapp=debug");
        assert_eq!(config.data_type, 1);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pletyvo.json");
        fs::write(&path, r#"{ "keyfile": "typo.key" }"#).unwrap();
        assert!(CliConfig::load(&path).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CliConfig::load_or_default(Some(&dir.path().join("absent.json"))).is_err());
    }
}
