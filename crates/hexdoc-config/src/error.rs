use std::{io, path::PathBuf};

use hexdoc_core::ResourceError;
use hexdoc_text::FormatError;
use thiserror::Error;

/// Error type for hexdoc-config operations
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error(
    "Unknown configuration key: '{0}'. See the generated hexdoc.toml for \
     supported keys."
  )]
  UnknownKey(String),

  #[error("Invalid value for '{key}': '{value}'. Expected {expected}")]
  InvalidValue {
    key:      String,
    value:    String,
    expected: &'static str,
  },

  #[error("Invalid config override format: '{0}'. Expected KEY=VALUE")]
  InvalidOverride(String),

  #[error("Failed to read config file {path}: {source}")]
  ReadFile {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to parse TOML config from {path}: {source}")]
  Toml {
    path:   PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("Failed to parse JSON config from {path}: {source}")]
  Json {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("Unsupported config file format: {0}")]
  UnsupportedFormat(String),

  #[error("Invalid book id '{value}': {source}")]
  InvalidBook {
    value:  String,
    #[source]
    source: ResourceError,
  },

  #[error("Invalid spoilered advancement pattern '{pattern}': {source}")]
  InvalidSpoilerPattern {
    pattern: String,
    #[source]
    source:  globset::Error,
  },

  #[error(transparent)]
  Format(#[from] FormatError),

  #[error("Configuration validation errors:\n{0}")]
  Validation(String),

  #[error("I/O error at {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
}
