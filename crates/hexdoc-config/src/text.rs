use hexdoc_macros::Configurable;
use hexdoc_text::{FormatError, MacroSet};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Settings for formatting book text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Configurable)]
#[serde(default)]
pub struct TextConfig {
  /// Treat `$(0)` as black instead of "reset color". Some books rely on the
  /// older Patchouli behavior.
  #[config(key = "is_0_black")]
  pub is_0_black: bool,

  /// Render untranslated keys verbatim instead of failing.
  #[config(key = "allow_missing")]
  pub allow_missing: bool,

  /// Extra text macros, applied after the defaults and the book's own.
  pub macros: IndexMap<String, String>,
}

impl Default for TextConfig {
  fn default() -> Self {
    Self {
      is_0_black:    false,
      allow_missing: true,
      macros:        IndexMap::new(),
    }
  }
}

impl TextConfig {
  /// Default macros, then `book_macros`, then the configured macros.
  ///
  /// # Errors
  ///
  /// Returns an error if the combined set is recursive.
  pub fn macro_set<'a, I>(&'a self, book_macros: I) -> Result<MacroSet, FormatError>
  where
    I: IntoIterator<Item = (&'a String, &'a String)>,
  {
    MacroSet::with_defaults(
      book_macros
        .into_iter()
        .chain(&self.macros)
        .map(|(k, v)| (k.clone(), v.clone())),
    )
  }
}
