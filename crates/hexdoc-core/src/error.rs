use std::{fmt::Write, path::PathBuf};

use thiserror::Error;

use crate::union::BoxError;

/// Errors produced while parsing resource identifiers.
#[derive(Debug, Error)]
pub enum ResourceError {
  #[error("invalid resource location `{value}`: {reason}")]
  InvalidLocation { value: String, reason: &'static str },

  #[error("invalid item stack `{value}`: {reason}")]
  InvalidItemStack { value: String, reason: String },

  #[error("path `{path}` is not inside resource root `{root}`")]
  OutsideRoot { path: PathBuf, root: PathBuf },
}

/// Errors produced while loading or querying language tables.
#[derive(Debug, Error)]
pub enum I18nError {
  #[error("failed to read language file `{path}`: {source}")]
  ReadFile {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse language file `{path}`: {source}")]
  Parse {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("missing translation for `{key}` in language `{lang}`")]
  MissingKey { lang: String, key: String },
}

/// A single failed attempt to validate a payload against one union variant.
#[derive(Debug)]
pub struct CandidateFailure {
  pub variant: &'static str,
  pub error:   BoxError,
}

/// Errors produced by [`crate::TypeRegistry`] resolution.
#[derive(Debug, Error)]
pub enum UnionError {
  #[error("{union}: payload is not a JSON object")]
  NotAnObject { union: &'static str },

  #[error("{union}: missing discriminator key `{key}`")]
  MissingKey {
    union: &'static str,
    key:   &'static str,
  },

  #[error("{union}: discriminator `{key}` has invalid value `{value}`")]
  InvalidTag {
    union: &'static str,
    key:   &'static str,
    value: String,
  },

  #[error(
    "{union}: unknown {key} `{tag}` (registered: {})",
    .known.join(", ")
  )]
  UnknownTag {
    union: &'static str,
    key:   &'static str,
    tag:   String,
    known: Vec<String>,
  },

  #[error(
    "{union}: no variant matched {tag}{}",
    format_failures(.failures)
  )]
  NoMatch {
    union:    &'static str,
    tag:      String,
    failures: Vec<CandidateFailure>,
  },

  #[error(
    "{union}: ambiguous match for {tag}, matched {}",
    .matched.join(", ")
  )]
  Ambiguous {
    union:   &'static str,
    tag:     String,
    matched: Vec<&'static str>,
  },

  #[error("{union}: variant `{name}` is registered twice")]
  DuplicateVariant {
    union: &'static str,
    name:  &'static str,
  },
}

fn format_failures(failures: &[CandidateFailure]) -> String {
  let mut out = String::new();
  for failure in failures {
    // Writing to String is infallible
    let _ = write!(out, "\n  - {}: {}", failure.variant, failure.error);
  }
  out
}
