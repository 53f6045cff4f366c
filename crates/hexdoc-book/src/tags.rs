use std::{
  collections::{HashMap, HashSet},
  path::PathBuf,
};

use hexdoc_core::ResourceLocation;
use log::debug;
use serde::Deserialize;

use crate::{
  error::BookError,
  files::{file_id, json_files, namespace_dirs, read_json},
};

/// One entry of a tag's `values` list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagValue {
  Item(ResourceLocation),
  Tag(ResourceLocation),
}

impl TagValue {
  fn parse(raw: &str) -> Result<Self, hexdoc_core::ResourceError> {
    match raw.strip_prefix('#') {
      Some(tag) => Ok(Self::Tag(tag.parse()?)),
      None => Ok(Self::Item(raw.parse()?)),
    }
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
  Plain(String),
  Optional { id: String },
}

#[derive(Deserialize)]
struct RawTag {
  #[serde(default)]
  replace: bool,
  #[serde(default)]
  values:  Vec<RawValue>,
}

/// Item tags from every `data/<ns>/tags/items` directory.
#[derive(Debug, Clone, Default)]
pub struct ItemTags {
  tags: HashMap<ResourceLocation, Vec<TagValue>>,
}

impl ItemTags {
  /// Load every item tag. Later resource directories append to earlier ones
  /// unless they set `replace`.
  ///
  /// # Errors
  ///
  /// Returns an error if a tag file cannot be read or contains an invalid id.
  pub fn load(resource_dirs: &[PathBuf]) -> Result<Self, BookError> {
    let mut tags = Self::default();

    for resource_dir in resource_dirs {
      for (namespace, ns_dir) in namespace_dirs(resource_dir, "data") {
        for folder in ["tags/items", "tags/item"] {
          let root = ns_dir.join(folder);
          for path in json_files(&root)? {
            let id = file_id(&namespace, &root, &path)?;
            let raw: RawTag = serde_json::from_value(read_json(&path)?)
              .map_err(|source| {
                BookError::ParseJson {
                  path: path.clone(),
                  source,
                }
              })?;

            let values = raw
              .values
              .iter()
              .map(|value| {
                let raw = match value {
                  RawValue::Plain(s) | RawValue::Optional { id: s } => s,
                };
                TagValue::parse(raw).map_err(|source| {
                  BookError::InvalidId {
                    path: path.clone(),
                    source,
                  }
                })
              })
              .collect::<Result<Vec<_>, _>>()?;

            tags.insert(id, raw.replace, values);
          }
        }
      }
    }

    debug!("Loaded {} item tags", tags.tags.len());
    Ok(tags)
  }

  /// Add values to a tag, or replace them.
  pub fn insert(
    &mut self,
    id: ResourceLocation,
    replace: bool,
    values: Vec<TagValue>,
  ) {
    let existing = self.tags.entry(id).or_default();
    if replace {
      existing.clear();
    }
    existing.extend(values);
  }

  #[must_use]
  pub fn get(&self, id: &ResourceLocation) -> Option<&[TagValue]> {
    self.tags.get(id).map(Vec::as_slice)
  }

  /// Every item in a tag, following nested tags. Items appear once, in the
  /// order they are first reached. Cycles are not followed twice.
  #[must_use]
  pub fn expand(&self, id: &ResourceLocation) -> Vec<ResourceLocation> {
    let mut items = Vec::new();
    let mut seen_items = HashSet::new();
    let mut seen_tags = HashSet::new();
    self.expand_into(id, &mut items, &mut seen_items, &mut seen_tags);
    items
  }

  fn expand_into(
    &self,
    id: &ResourceLocation,
    items: &mut Vec<ResourceLocation>,
    seen_items: &mut HashSet<ResourceLocation>,
    seen_tags: &mut HashSet<ResourceLocation>,
  ) {
    if !seen_tags.insert(id.clone()) {
      return;
    }

    for value in self.get(id).unwrap_or_default() {
      match value {
        TagValue::Item(item) => {
          if seen_items.insert(item.clone()) {
            items.push(item.clone());
          }
        },
        TagValue::Tag(tag) => {
          self.expand_into(tag, items, seen_items, seen_tags);
        },
      }
    }
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  fn id(s: &str) -> ResourceLocation {
    s.parse().unwrap()
  }

  #[test]
  fn test_expand_follows_nested_tags() {
    let mut tags = ItemTags::default();
    tags.insert(id("c:gems"), false, vec![
      TagValue::Item(id("minecraft:diamond")),
      TagValue::Tag(id("c:amethyst")),
    ]);
    tags.insert(id("c:amethyst"), false, vec![
      TagValue::Item(id("minecraft:amethyst_shard")),
      TagValue::Item(id("minecraft:diamond")),
    ]);

    assert_eq!(tags.expand(&id("c:gems")), vec![
      id("minecraft:diamond"),
      id("minecraft:amethyst_shard")
    ]);
  }

  #[test]
  fn test_expand_is_cycle_safe() {
    let mut tags = ItemTags::default();
    tags.insert(id("a:x"), false, vec![
      TagValue::Tag(id("a:y")),
      TagValue::Item(id("a:one")),
    ]);
    tags.insert(id("a:y"), false, vec![
      TagValue::Tag(id("a:x")),
      TagValue::Item(id("a:two")),
    ]);

    assert_eq!(tags.expand(&id("a:x")), vec![id("a:two"), id("a:one")]);
    assert!(tags.expand(&id("a:missing")).is_empty());
  }

  #[test]
  fn test_replace_clears_earlier_values() {
    let mut tags = ItemTags::default();
    tags.insert(id("a:x"), false, vec![TagValue::Item(id("a:one"))]);
    tags.insert(id("a:x"), false, vec![TagValue::Item(id("a:two"))]);
    assert_eq!(tags.expand(&id("a:x")).len(), 2);

    tags.insert(id("a:x"), true, vec![TagValue::Item(id("a:three"))]);
    assert_eq!(tags.expand(&id("a:x")), vec![id("a:three")]);
  }

  #[test]
  fn test_parse_values() {
    assert_eq!(
      TagValue::parse("#minecraft:logs").unwrap(),
      TagValue::Tag(id("minecraft:logs"))
    );
    assert_eq!(
      TagValue::parse("stick").unwrap(),
      TagValue::Item(id("minecraft:stick"))
    );
  }
}
