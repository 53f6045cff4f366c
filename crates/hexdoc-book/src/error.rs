use std::path::PathBuf;

use hexdoc_core::{I18nError, ResourceError, ResourceLocation, UnionError};
use hexdoc_text::FormatError;
use thiserror::Error;

/// Errors produced while loading a book.
#[derive(Debug, Error)]
pub enum BookError {
  #[error("failed to read {path}: {source}")]
  ReadFile {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse {path}: {source}")]
  ParseJson {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to walk {path}: {source}")]
  Walk {
    path:   PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("book {id} not found, looked for {searched:?}")]
  BookNotFound {
    id:       ResourceLocation,
    searched: Vec<PathBuf>,
  },

  #[error("invalid id for {path}: {source}")]
  InvalidId {
    path:   PathBuf,
    #[source]
    source: ResourceError,
  },

  #[error("invalid {field} in {context}: {source}")]
  InvalidField {
    context: String,
    field:   &'static str,
    #[source]
    source:  serde_json::Error,
  },

  #[error("failed to resolve {context}: {source}")]
  Union {
    context: String,
    #[source]
    source:  UnionError,
  },

  #[error("failed to format text in {context}: {source}")]
  Format {
    context: String,
    #[source]
    source:  FormatError,
  },

  #[error("entry {entry} belongs to unknown category {category}")]
  UnknownCategory {
    entry:    ResourceLocation,
    category: ResourceLocation,
  },

  #[error("category {category} has unknown parent {parent}")]
  UnknownParent {
    category: ResourceLocation,
    parent:   ResourceLocation,
  },

  #[error("entry {entry} relates to unknown entry {related}")]
  UnknownEntry {
    entry:   ResourceLocation,
    related: ResourceLocation,
  },

  #[error("recipe {id} not found")]
  MissingRecipe { id: ResourceLocation },

  #[error(transparent)]
  I18n(#[from] I18nError),

  #[error(transparent)]
  Registry(#[from] UnionError),
}
