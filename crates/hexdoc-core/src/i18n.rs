use std::{
  collections::{BTreeSet, HashMap},
  fs,
  path::{Path, PathBuf},
};

use log::{debug, warn};
use serde_json::Value;
use walkdir::WalkDir;

use crate::{error::I18nError, resource::ResourceLocation};

/// Localization table for one language.
///
/// Built by merging every `assets/<namespace>/lang/<lang>.json` found in the
/// configured resource directories. Later resource directories override
/// earlier ones. A second table (usually the default language) can be
/// attached as a fallback for keys the language does not translate.
#[derive(Debug, Clone, Default)]
pub struct I18n {
  lang:          String,
  lookup:        HashMap<String, String>,
  fallback:      HashMap<String, String>,
  allow_missing: bool,
}

impl I18n {
  /// Create a table from an in-memory lookup map.
  #[must_use]
  pub fn new(
    lang: impl Into<String>,
    lookup: HashMap<String, String>,
    allow_missing: bool,
  ) -> Self {
    Self {
      lang: lang.into(),
      lookup,
      fallback: HashMap::new(),
      allow_missing,
    }
  }

  /// Load and merge every language file for `lang` under `resource_dirs`.
  ///
  /// # Errors
  ///
  /// Returns an error if a language file exists but cannot be read or is not
  /// a JSON object.
  pub fn load(
    resource_dirs: &[PathBuf],
    lang: &str,
    allow_missing: bool,
  ) -> Result<Self, I18nError> {
    let mut lookup = HashMap::new();
    let file_name = format!("{lang}.json");

    for lang_dir in lang_dirs(resource_dirs) {
      let path = lang_dir.join(&file_name);
      if !path.is_file() {
        continue;
      }
      debug!("Loading language file {}", path.display());
      lookup.extend(read_lang_file(&path)?);
    }

    if lookup.is_empty() {
      warn!("No translations found for language {lang}");
    }

    Ok(Self::new(lang, lookup, allow_missing))
  }

  /// Attach `other` as the fallback table for keys missing from this one.
  #[must_use]
  pub fn with_fallback(mut self, other: &Self) -> Self {
    if other.lang != self.lang {
      self.fallback = other.lookup.clone();
    }
    self
  }

  #[must_use]
  pub fn lang(&self) -> &str {
    &self.lang
  }

  /// Look up a key without any fallback to the key itself.
  #[must_use]
  pub fn get(&self, key: &str) -> Option<&str> {
    self
      .lookup
      .get(key)
      .or_else(|| self.fallback.get(key))
      .map(String::as_str)
  }

  /// Localize a translation key.
  ///
  /// # Errors
  ///
  /// Returns [`I18nError::MissingKey`] if the key is not translated and
  /// missing keys are not allowed. When they are allowed, the key itself is
  /// returned and a warning is logged.
  pub fn localize(&self, key: &str) -> Result<String, I18nError> {
    if let Some(value) = self.get(key) {
      return Ok(value.to_string());
    }

    if self.allow_missing {
      warn!("Missing translation in {}: {key}", self.lang);
      Ok(key.to_string())
    } else {
      Err(I18nError::MissingKey {
        lang: self.lang.clone(),
        key:  key.to_string(),
      })
    }
  }

  /// Localize book text, which may be either a translation key or literal
  /// text. Untranslated values are returned verbatim.
  #[must_use]
  pub fn localize_or_raw(&self, text: &str) -> String {
    self.get(text).unwrap_or(text).to_string()
  }

  /// Localize a keybind name as used by `$(k:use)`.
  #[must_use]
  pub fn localize_key(&self, key: &str) -> String {
    let full_key = if key.starts_with("key.") {
      key.to_string()
    } else {
      format!("key.{key}")
    };
    self.get(&full_key).unwrap_or(key).to_string()
  }

  /// Localize an item or block id.
  ///
  /// Tries `item.<ns>.<path>` and then `block.<ns>.<path>`.
  ///
  /// # Errors
  ///
  /// Returns [`I18nError::MissingKey`] for the item key if neither is
  /// translated and missing keys are not allowed.
  pub fn localize_item(&self, id: &ResourceLocation) -> Result<String, I18nError> {
    let item_key = id.i18n_key("item");
    if let Some(value) = self.get(&item_key) {
      return Ok(value.to_string());
    }
    if let Some(value) = self.get(&id.i18n_key("block")) {
      return Ok(value.to_string());
    }
    self.localize(&item_key)
  }

  /// Display name of this language, from the `language.name` key.
  #[must_use]
  pub fn lang_name(&self) -> String {
    self
      .lookup
      .get("language.name")
      .cloned()
      .unwrap_or_else(|| self.lang.clone())
  }
}

/// Find every language that has at least one language file under the given
/// resource directories.
#[must_use]
pub fn discover_langs(resource_dirs: &[PathBuf]) -> Vec<String> {
  let mut langs = BTreeSet::new();

  for lang_dir in lang_dirs(resource_dirs) {
    let Ok(entries) = fs::read_dir(&lang_dir) else {
      continue;
    };
    for entry in entries.flatten() {
      let path = entry.path();
      if path.extension().is_some_and(|ext| ext == "json")
        && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
      {
        langs.insert(stem.to_string());
      }
    }
  }

  langs.into_iter().collect()
}

/// Every `assets/<namespace>/lang` directory under the resource dirs, in
/// resource dir order.
fn lang_dirs(resource_dirs: &[PathBuf]) -> Vec<PathBuf> {
  let mut dirs = Vec::new();

  for resource_dir in resource_dirs {
    let assets = resource_dir.join("assets");
    for entry in WalkDir::new(&assets)
      .min_depth(2)
      .max_depth(2)
      .sort_by_file_name()
      .into_iter()
      .flatten()
    {
      if entry.file_type().is_dir() && entry.file_name() == "lang" {
        dirs.push(entry.into_path());
      }
    }
  }

  dirs
}

fn read_lang_file(path: &Path) -> Result<HashMap<String, String>, I18nError> {
  let content = fs::read_to_string(path).map_err(|source| {
    I18nError::ReadFile {
      path: path.to_path_buf(),
      source,
    }
  })?;

  let raw: HashMap<String, Value> =
    serde_json::from_str(&content).map_err(|source| {
      I18nError::Parse {
        path: path.to_path_buf(),
        source,
      }
    })?;

  let mut lookup = HashMap::with_capacity(raw.len());
  for (key, value) in raw {
    match value {
      Value::String(s) => {
        lookup.insert(key, s);
      },
      other => {
        warn!(
          "Ignoring non-string translation {key} = {other} in {}",
          path.display()
        );
      },
    }
  }

  Ok(lookup)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  fn table(pairs: &[(&str, &str)], allow_missing: bool) -> I18n {
    I18n::new(
      "en_us",
      pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect(),
      allow_missing,
    )
  }

  #[test]
  fn test_localize_present_and_missing() {
    let i18n = table(&[("hexcasting.title", "Hex Notebook")], false);
    assert_eq!(i18n.localize("hexcasting.title").unwrap(), "Hex Notebook");
    assert!(matches!(
      i18n.localize("nope"),
      Err(I18nError::MissingKey { .. })
    ));

    let lenient = table(&[], true);
    assert_eq!(lenient.localize("nope").unwrap(), "nope");
  }

  #[test]
  fn test_localize_or_raw() {
    let i18n = table(&[("k", "v")], false);
    assert_eq!(i18n.localize_or_raw("k"), "v");
    assert_eq!(i18n.localize_or_raw("Plain text."), "Plain text.");
  }

  #[test]
  fn test_localize_key_adds_prefix() {
    let i18n = table(&[("key.use", "Right Button")], false);
    assert_eq!(i18n.localize_key("use"), "Right Button");
    assert_eq!(i18n.localize_key("key.use"), "Right Button");
    assert_eq!(i18n.localize_key("jump"), "jump");
  }

  #[test]
  fn test_localize_item_falls_back_to_block() {
    let i18n = table(&[("block.minecraft.stone", "Stone")], false);
    let id = "minecraft:stone".parse().unwrap();
    assert_eq!(i18n.localize_item(&id).unwrap(), "Stone");
  }

  #[test]
  fn test_fallback_table() {
    let en = table(&[("a", "A"), ("b", "B")], false);
    let mut ru = table(&[("a", "А")], false);
    ru.lang = "ru_ru".to_string();
    let ru = ru.with_fallback(&en);

    assert_eq!(ru.localize("a").unwrap(), "А");
    assert_eq!(ru.localize("b").unwrap(), "B");
  }
}
