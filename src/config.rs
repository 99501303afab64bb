//! Decoder configuration file parser.
//!
//! The serializable part of [`DecoderOptions`] can be kept in a TOML file so
//! that applications embedding the decoder let users tune date and key
//! handling without recompiling. The file is optional: a missing file yields
//! `DecoderConfig::default()`. Unknown keys are accepted but logged, since
//! they are usually typos.
//!
//! ```toml
//! date_strategy = "formatted"
//! date_format = "%Y-%m-%d %H:%M:%S"
//! data_strategy = "base64"
//! key_strategy = "snake_case"
//!
//! [non_conforming_floats]
//! positive_infinity = "INF"
//! negative_infinity = "-INF"
//! nan = "NaN"
//! ```
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::options::{
    DataStrategy, DateStrategy, DecoderOptions, KeyStrategy, NonConformingFloatStrategy,
};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// The file parsed but describes options that cannot be built.
    #[error("Invalid decoder configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStrategyName {
    #[default]
    Deferred,
    Seconds,
    Milliseconds,
    Iso8601,
    Formatted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataStrategyName {
    Deferred,
    #[default]
    Base64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategyName {
    #[default]
    AsIs,
    SnakeCase,
}

/// Literals accepted for non-finite floats.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NonConformingFloats {
    pub positive_infinity: String,
    pub negative_infinity: String,
    pub nan: String,
}

/// On-disk form of [`DecoderOptions`].
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Custom strategies have no file representation; install them on the
/// [`DecoderOptions`] returned by [`DecoderConfig::to_options`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub date_strategy: DateStrategyName,

    /// chrono format string, required when `date_strategy = "formatted"`.
    pub date_format: Option<String>,

    pub data_strategy: DataStrategyName,

    pub key_strategy: KeyStrategyName,

    /// Absent means non-finite floats are rejected.
    pub non_conforming_floats: Option<NonConformingFloats>,
}

impl DecoderConfig {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] = [
        "date_strategy",
        "date_format",
        "data_strategy",
        "key_strategy",
        "non_conforming_floats",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(DecoderConfig::default())`
    /// - Empty file → `Ok(DecoderConfig::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading to avoid loading a huge file.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No decoder config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Decoder config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in decoder config, ignoring");
                }
            }
        }

        let config: DecoderConfig = toml::from_str(content)?;
        tracing::info!(
            date = ?config.date_strategy,
            keys = ?config.key_strategy,
            "Loaded decoder configuration"
        );
        Ok(config)
    }

    /// Builds the runtime options this file describes.
    pub fn to_options(&self) -> Result<DecoderOptions, ConfigError> {
        let date = match self.date_strategy {
            DateStrategyName::Deferred => DateStrategy::DeferredToNative,
            DateStrategyName::Seconds => DateStrategy::SecondsSinceEpoch,
            DateStrategyName::Milliseconds => DateStrategy::MillisecondsSinceEpoch,
            DateStrategyName::Iso8601 => DateStrategy::Iso8601,
            DateStrategyName::Formatted => {
                let format = self.date_format.clone().ok_or_else(|| {
                    ConfigError::Invalid(
                        "date_strategy = \"formatted\" requires date_format".to_string(),
                    )
                })?;
                DateStrategy::Formatted(format)
            }
        };
        if self.date_format.is_some() && self.date_strategy != DateStrategyName::Formatted {
            tracing::warn!("date_format is ignored unless date_strategy = \"formatted\"");
        }

        let data = match self.data_strategy {
            DataStrategyName::Deferred => DataStrategy::DeferredToNative,
            DataStrategyName::Base64 => DataStrategy::Base64,
        };
        let keys = match self.key_strategy {
            KeyStrategyName::AsIs => KeyStrategy::UseAsIs,
            KeyStrategyName::SnakeCase => KeyStrategy::ConvertFromSnakeCase,
        };
        let non_conforming_float = match &self.non_conforming_floats {
            None => NonConformingFloatStrategy::Throw,
            Some(literals) => NonConformingFloatStrategy::ConvertFromString {
                positive_infinity: literals.positive_infinity.clone(),
                negative_infinity: literals.negative_infinity.clone(),
                nan: literals.nan.clone(),
            },
        };

        Ok(DecoderOptions {
            date,
            data,
            non_conforming_float,
            keys,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = DecoderConfig::default();
        assert_eq!(config.date_strategy, DateStrategyName::Deferred);
        assert_eq!(config.data_strategy, DataStrategyName::Base64);
        assert_eq!(config.key_strategy, KeyStrategyName::AsIs);
        assert!(config.non_conforming_floats.is_none());

        let options = config.to_options().unwrap();
        assert!(matches!(options.date, DateStrategy::DeferredToNative));
        assert!(matches!(options.data, DataStrategy::Base64));
        assert!(matches!(options.keys, KeyStrategy::UseAsIs));
        assert_eq!(options.non_conforming_float, NonConformingFloatStrategy::Throw);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/skim_decode_test_nonexistent_config.toml");
        let config = DecoderConfig::load(path).unwrap();
        assert_eq!(config, DecoderConfig::default());
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = std::env::temp_dir().join("skim_decode_config_test_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("decoder.toml");
        std::fs::write(&path, "  \n ").unwrap();

        let config = DecoderConfig::load(&path).unwrap();
        assert_eq!(config, DecoderConfig::default());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let dir = std::env::temp_dir().join("skim_decode_config_test_full");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("decoder.toml");

        let content = r#"
date_strategy = "formatted"
date_format = "%Y-%m-%d"
data_strategy = "deferred"
key_strategy = "snake_case"

[non_conforming_floats]
positive_infinity = "INF"
negative_infinity = "-INF"
nan = "NaN"
"#;
        std::fs::write(&path, content).unwrap();

        let config = DecoderConfig::load(&path).unwrap();
        let options = config.to_options().unwrap();
        assert!(matches!(&options.date, DateStrategy::Formatted(f) if f == "%Y-%m-%d"));
        assert!(matches!(options.data, DataStrategy::DeferredToNative));
        assert!(matches!(options.keys, KeyStrategy::ConvertFromSnakeCase));
        assert_eq!(
            options.non_conforming_float,
            NonConformingFloatStrategy::ConvertFromString {
                positive_infinity: "INF".to_string(),
                negative_infinity: "-INF".to_string(),
                nan: "NaN".to_string(),
            }
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_formatted_without_format_is_invalid() {
        let config = DecoderConfig::from_toml("date_strategy = \"formatted\"\n").unwrap();
        let err = config.to_options().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = DecoderConfig::from_toml("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_unknown_strategy_name_returns_error() {
        let err = DecoderConfig::from_toml("key_strategy = \"kebab\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let config =
            DecoderConfig::from_toml("date_strategy = \"seconds\"\nmystery = 1\n").unwrap();
        assert_eq!(config.date_strategy, DateStrategyName::Seconds);
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("skim_decode_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("decoder.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let err = DecoderConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
