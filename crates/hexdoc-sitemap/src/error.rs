use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SitemapError {
  #[error("failed to read {path}: {source}")]
  ReadFile {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid sitemap marker {path}: {source}")]
  ParseMarker {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to serialize {what}: {source}")]
  Serialize {
    what:   &'static str,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to walk {path}: {source}")]
  Walk {
    path:   PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("I/O error on {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(
    "refusing to overwrite released output in release mode: {}",
    display_paths(.paths)
  )]
  ReleaseCollision { paths: Vec<PathBuf> },
}

fn display_paths(paths: &[PathBuf]) -> String {
  paths
    .iter()
    .map(|path| path.display().to_string())
    .collect::<Vec<_>>()
    .join(", ")
}
