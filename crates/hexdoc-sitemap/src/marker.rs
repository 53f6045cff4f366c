//! Sitemap marker files.
//!
//! Rendering a book writes one `.sitemap-marker.json` into every site
//! directory. The merge step rebuilds the sitemap from these files alone.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::SitemapError;

pub const MARKER_FILE: &str = ".sitemap-marker.json";

/// Version string used for unreleased builds.
pub const LATEST: &str = "latest";

/// Marker for a released version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionedMarker {
  pub version:           String,
  pub lang:              String,
  pub lang_name:         String,
  pub path:              String,
  pub is_default_lang:   bool,
  pub full_version:      String,
  pub minecraft_version: Option<String>,
  pub redirect_contents: String,
}

/// Marker for the unreleased docs of one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LatestMarker {
  pub version:           String,
  pub lang:              String,
  pub lang_name:         String,
  pub path:              String,
  pub is_default_lang:   bool,
  pub full_version:      String,
  pub minecraft_version: Option<String>,
  pub redirect_contents: String,
  pub branch:            String,
  pub is_default_branch: bool,
}

/// Either marker shape. Deserializing tries the versioned shape first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SitemapMarker {
  Versioned(VersionedMarker),
  Latest(LatestMarker),
}

/// Which of two markers for the same version and language is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MarkerPriority {
  OtherBranch,
  DefaultBranch,
  Versioned,
}

macro_rules! common_field {
  ($self:ident . $field:ident) => {
    match $self {
      Self::Versioned(m) => &m.$field,
      Self::Latest(m) => &m.$field,
    }
  };
}

impl SitemapMarker {
  #[must_use]
  pub fn version(&self) -> &str {
    common_field!(self.version)
  }

  #[must_use]
  pub fn lang(&self) -> &str {
    common_field!(self.lang)
  }

  #[must_use]
  pub fn lang_name(&self) -> &str {
    common_field!(self.lang_name)
  }

  /// Site path relative to the site root, such as `v/1.0/en_us`.
  #[must_use]
  pub fn path(&self) -> &str {
    common_field!(self.path)
  }

  #[must_use]
  pub const fn is_default_lang(&self) -> bool {
    match self {
      Self::Versioned(m) => m.is_default_lang,
      Self::Latest(m) => m.is_default_lang,
    }
  }

  #[must_use]
  pub fn redirect_contents(&self) -> &str {
    common_field!(self.redirect_contents)
  }

  #[must_use]
  pub const fn priority(&self) -> MarkerPriority {
    match self {
      Self::Versioned(_) => MarkerPriority::Versioned,
      Self::Latest(LatestMarker {
        is_default_branch: true,
        ..
      }) => MarkerPriority::DefaultBranch,
      Self::Latest(_) => MarkerPriority::OtherBranch,
    }
  }

  /// Read a marker file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or matches neither marker
  /// shape.
  pub fn read(path: &Path) -> Result<Self, SitemapError> {
    let content = fs::read_to_string(path).map_err(|source| {
      SitemapError::ReadFile {
        path: path.to_path_buf(),
        source,
      }
    })?;
    serde_json::from_str(&content).map_err(|source| {
      SitemapError::ParseMarker {
        path: path.to_path_buf(),
        source,
      }
    })
  }

  /// Write this marker into `site_dir`.
  ///
  /// # Errors
  ///
  /// Returns an error if the directory or file cannot be written.
  pub fn write(&self, site_dir: &Path) -> Result<(), SitemapError> {
    let path = site_dir.join(MARKER_FILE);
    let json = serde_json::to_string_pretty(self).map_err(|source| {
      SitemapError::Serialize {
        what: "sitemap marker",
        source,
      }
    })?;

    fs::create_dir_all(site_dir).map_err(|source| {
      SitemapError::Io {
        path: site_dir.to_path_buf(),
        source,
      }
    })?;
    fs::write(&path, json).map_err(|source| SitemapError::Io { path, source })
  }
}

/// Site path for one rendered language: `v/<version>/<lang>` for releases,
/// `v/latest/<branch>/<lang>` otherwise.
#[must_use]
pub fn site_path(release: bool, version: &str, branch: &str, lang: &str) -> String {
  if release {
    format!("v/{version}/{lang}")
  } else {
    format!("v/{LATEST}/{branch}/{lang}")
  }
}
