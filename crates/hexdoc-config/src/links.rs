use hexdoc_macros::Configurable;
use hexdoc_text::{FormatError, LinkOverrides};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Link handling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Configurable)]
#[serde(default)]
pub struct LinksConfig {
  /// Glob patterns matched against `$(l:...)` values, mapped to the URL
  /// the link should point at instead.
  ///
  /// ```toml
  /// [links.overrides]
  /// "hexal:*" = "https://hexal.hexxy.media/v/latest/main/en_us"
  /// ```
  pub overrides: IndexMap<String, String>,
}

impl LinksConfig {
  /// Compile the override patterns.
  ///
  /// # Errors
  ///
  /// Returns an error if a pattern is not a valid glob.
  pub fn link_overrides(&self) -> Result<LinkOverrides, FormatError> {
    LinkOverrides::new(&self.overrides)
  }
}
