//! Text macros applied to localized strings before tokenizing.

use indexmap::IndexMap;
use log::trace;

use crate::error::FormatError;

/// Macros every book gets, before book and user macros.
pub const DEFAULT_MACROS: &[(&str, &str)] = &[
  ("$(obf)", "$(k)"),
  ("$(bold)", "$(l)"),
  ("$(strike)", "$(m)"),
  ("$(italic)", "$(o)"),
  ("$(italics)", "$(o)"),
  ("$(list", "$(li"),
  ("$(reset)", "$()"),
  ("$(clear)", "$()"),
  ("$(2br)", "$(br2)"),
  ("$(p)", "$(br2)"),
  ("/$", "$()"),
  ("<br>", "$(br)"),
  ("$(nocolor)", "$(0)"),
  ("$(item)", "$(#b0b)"),
  ("$(thing)", "$(#490)"),
];

/// An ordered, validated set of text macros.
///
/// Expansion replaces every key with its value, in insertion order, until the
/// text stops changing. A set in which any key occurs inside any replacement
/// is rejected when the set is built, so expansion always reaches a fixed
/// point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroSet {
  macros: IndexMap<String, String>,
}

impl MacroSet {
  /// The default macros followed by `extra`, later keys overriding earlier
  /// ones.
  ///
  /// # Errors
  ///
  /// Returns [`FormatError::RecursiveMacro`] if any macro key appears in any
  /// macro's replacement text.
  pub fn with_defaults<I, K, V>(extra: I) -> Result<Self, FormatError>
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    Self::new(
      DEFAULT_MACROS
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .chain(extra.into_iter().map(|(k, v)| (k.into(), v.into()))),
    )
  }

  /// Build a macro set from exactly the given macros.
  ///
  /// # Errors
  ///
  /// Returns [`FormatError::RecursiveMacro`] if any macro key appears in any
  /// macro's replacement text.
  pub fn new<I, K, V>(macros: I) -> Result<Self, FormatError>
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    let macros: IndexMap<String, String> = macros
      .into_iter()
      .map(|(k, v)| (k.into(), v.into()))
      .filter(|(k, _)| !k.is_empty())
      .collect();

    for key in macros.keys() {
      for (container, replacement) in &macros {
        if replacement.contains(key.as_str()) {
          return Err(FormatError::RecursiveMacro {
            key:         key.clone(),
            container:   container.clone(),
            replacement: replacement.clone(),
          });
        }
      }
    }

    Ok(Self { macros })
  }

  #[must_use]
  pub fn get(&self, key: &str) -> Option<&str> {
    self.macros.get(key).map(String::as_str)
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.macros.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.macros.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.macros.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  /// Expand every macro in `text` until nothing changes.
  #[must_use]
  pub fn expand(&self, text: &str) -> String {
    let mut current = text.to_string();

    loop {
      let mut next = current.clone();
      for (key, value) in &self.macros {
        if next.contains(key.as_str()) {
          next = next.replace(key.as_str(), value);
        }
      }
      if next == current {
        return current;
      }
      trace!("Macro pass: {current:?} -> {next:?}");
      current = next;
    }
  }
}

impl Default for MacroSet {
  fn default() -> Self {
    Self {
      macros: DEFAULT_MACROS
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_defaults_are_valid() {
    let built = MacroSet::with_defaults(Vec::<(String, String)>::new()).unwrap();
    assert_eq!(built, MacroSet::default());
    assert_eq!(built.get("$(bold)"), Some("$(l)"));
  }

  #[test]
  fn test_expand_defaults() {
    let macros = MacroSet::default();
    assert_eq!(macros.expand("$(bold)hi/$"), "$(l)hi$()");
    assert_eq!(macros.expand("$(list2)x"), "$(li2)x");
    assert_eq!(macros.expand("a<br>b"), "a$(br)b");
  }

  #[test]
  fn test_user_macros_override_defaults() {
    let macros = MacroSet::with_defaults([("$(item)", "$(#f00)")]).unwrap();
    assert_eq!(macros.expand("$(item)x"), "$(#f00)x");
  }

  #[test]
  fn test_expansion_chains_through_text() {
    // The replacement of one macro completes the key of another only in
    // combination with the surrounding text.
    let macros = MacroSet::new([("ab", "c"), ("xc", "done")]).unwrap();
    assert_eq!(macros.expand("xab"), "done");
  }

  #[test]
  fn test_self_recursive_macro_rejected() {
    let err = MacroSet::new([("$(a)", "x$(a)")]).unwrap_err();
    assert!(matches!(err, FormatError::RecursiveMacro { .. }));
  }

  #[test]
  fn test_mutually_recursive_macro_rejected() {
    let err = MacroSet::with_defaults([("$(a)", "$(b)"), ("$(b)", "$(a)")])
      .unwrap_err();
    match err {
      FormatError::RecursiveMacro { key, container, .. } => {
        assert_eq!(key, "$(a)");
        assert_eq!(container, "$(b)");
      },
      other => panic!("unexpected error: {other}"),
    }
  }
}
