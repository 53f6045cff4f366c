use hexdoc_core::ResourceError;
use thiserror::Error;

/// Errors produced while formatting Patchouli text.
#[derive(Debug, Error)]
pub enum FormatError {
  #[error("unhandled style `$({token})` in {source_string:?}")]
  UnhandledStyle {
    token:         String,
    source_string: String,
  },

  #[error(
    "recursive macro: `{key}` appears in the replacement of `{container}` \
     ({replacement:?})"
  )]
  RecursiveMacro {
    key:         String,
    container:   String,
    replacement: String,
  },

  #[error("invalid book link `{value}`: {source}")]
  InvalidBookLink {
    value:  String,
    #[source]
    source: ResourceError,
  },

  #[error("invalid link override pattern `{pattern}`: {source}")]
  InvalidLinkOverride {
    pattern: String,
    #[source]
    source:  globset::Error,
  },

  #[error("broken link `{link}`: nothing in the book has the key `{key}`")]
  BrokenLink { link: String, key: String },
}
