use std::{
  fmt,
  path::Path,
  str::FromStr,
  sync::LazyLock,
};

use log::error;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::ResourceError;

/// Namespace used when an identifier is written without one.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

static ITEM_STACK_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(?P<id>[^#{]+)(?:#(?P<count>\d+))?(?P<nbt>\{.*\})?$")
    .unwrap_or_else(|e| {
      error!("Failed to compile ITEM_STACK_RE regex: {e}");
      never_matching_regex()
    })
});

/// Create a regex that never matches anything.
///
/// Used as a fallback when a static pattern fails to compile, so a broken
/// pattern degrades to "no match" instead of a panic.
#[must_use]
pub fn never_matching_regex() -> Regex {
  #[allow(clippy::unwrap_used, reason = "pattern is statically valid")]
  Regex::new(r"[^\s\S]").unwrap()
}

/// A namespaced identifier such as `hexcasting:thehexbook`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceLocation {
  namespace: String,
  path:      String,
}

impl ResourceLocation {
  /// Create a resource location from its two halves, validating both.
  ///
  /// # Errors
  ///
  /// Returns [`ResourceError::InvalidLocation`] if either half contains
  /// characters Minecraft does not allow.
  pub fn new(
    namespace: impl Into<String>,
    path: impl Into<String>,
  ) -> Result<Self, ResourceError> {
    let namespace = namespace.into();
    let path = path.into();

    let invalid = |reason| {
      ResourceError::InvalidLocation {
        value: format!("{namespace}:{path}"),
        reason,
      }
    };

    if namespace.is_empty() {
      return Err(invalid("empty namespace"));
    }
    if path.is_empty() {
      return Err(invalid("empty path"));
    }
    if !namespace.chars().all(is_namespace_char) {
      return Err(invalid("namespace may only contain [a-z0-9_.-]"));
    }
    if !path.chars().all(|c| is_namespace_char(c) || c == '/') {
      return Err(invalid("path may only contain [a-z0-9_./-]"));
    }

    Ok(Self { namespace, path })
  }

  /// Parse `namespace:path`, using `default_namespace` when the namespace is
  /// omitted.
  ///
  /// # Errors
  ///
  /// Returns [`ResourceError::InvalidLocation`] if the result is not a valid
  /// identifier.
  pub fn parse_with_default(
    value: &str,
    default_namespace: &str,
  ) -> Result<Self, ResourceError> {
    match value.split_once(':') {
      Some((namespace, path)) => Self::new(namespace, path),
      None => Self::new(default_namespace, value),
    }
  }

  /// Build the id of a data file from its path relative to a content root.
  ///
  /// `entries/basics/intro.json` under root `entries/` becomes
  /// `namespace:basics/intro`.
  ///
  /// # Errors
  ///
  /// Returns an error if `file` is not under `root`, or the resulting path is
  /// not a valid identifier.
  pub fn from_file(
    namespace: &str,
    root: &Path,
    file: &Path,
  ) -> Result<Self, ResourceError> {
    let rel = file.strip_prefix(root).map_err(|_| {
      ResourceError::OutsideRoot {
        path: file.to_path_buf(),
        root: root.to_path_buf(),
      }
    })?;

    let mut rel = rel.to_path_buf();
    rel.set_extension("");

    let path = rel
      .components()
      .map(|c| c.as_os_str().to_string_lossy())
      .collect::<Vec<_>>()
      .join("/");

    Self::new(namespace, path)
  }

  #[must_use]
  pub fn namespace(&self) -> &str {
    &self.namespace
  }

  #[must_use]
  pub fn path(&self) -> &str {
    &self.path
  }

  /// Same namespace, different path.
  ///
  /// # Errors
  ///
  /// Returns an error if `path` is not a valid resource path.
  pub fn with_path(&self, path: &str) -> Result<Self, ResourceError> {
    Self::new(self.namespace.clone(), path)
  }

  /// Translation key for this id with the given prefix, e.g.
  /// `item.hexcasting.amethyst_dust`.
  #[must_use]
  pub fn i18n_key(&self, prefix: &str) -> String {
    format!(
      "{prefix}.{}.{}",
      self.namespace,
      self.path.replace('/', ".")
    )
  }
}

const fn is_namespace_char(c: char) -> bool {
  matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-')
}

impl FromStr for ResourceLocation {
  type Err = ResourceError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse_with_default(s, DEFAULT_NAMESPACE)
  }
}

impl fmt::Display for ResourceLocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.namespace, self.path)
  }
}

impl Serialize for ResourceLocation {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for ResourceLocation {
  fn deserialize<D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(de::Error::custom)
  }
}

/// An item id with a stack size and optional NBT, as written in Patchouli
/// data: `minecraft:stone`, `minecraft:stone#4`, `hexcasting:focus{...}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ItemStack {
  pub id:    ResourceLocation,
  pub count: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub nbt:   Option<String>,
}

impl ItemStack {
  #[must_use]
  pub const fn new(id: ResourceLocation) -> Self {
    Self {
      id,
      count: 1,
      nbt: None,
    }
  }
}

impl FromStr for ItemStack {
  type Err = ResourceError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let caps = ITEM_STACK_RE.captures(s.trim()).ok_or_else(|| {
      ResourceError::InvalidItemStack {
        value:  s.to_string(),
        reason: "expected `namespace:id[#count][{nbt}]`".to_string(),
      }
    })?;

    let id = caps["id"].parse()?;
    let count = match caps.name("count") {
      Some(count) => {
        count.as_str().parse().map_err(|e| {
          ResourceError::InvalidItemStack {
            value:  s.to_string(),
            reason: format!("invalid count: {e}"),
          }
        })?
      },
      None => 1,
    };
    let nbt = caps.name("nbt").map(|m| m.as_str().to_string());

    Ok(Self { id, count, nbt })
  }
}

impl fmt::Display for ItemStack {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.id)?;
    if self.count != 1 {
      write!(f, "#{}", self.count)?;
    }
    if let Some(nbt) = &self.nbt {
      write!(f, "{nbt}")?;
    }
    Ok(())
  }
}

impl<'de> Deserialize<'de> for ItemStack {
  fn deserialize<D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Self, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
      Str(String),
      Obj {
        #[serde(alias = "id")]
        item:  ResourceLocation,
        #[serde(default = "one")]
        count: u32,
        #[serde(default)]
        nbt:   Option<String>,
      },
    }

    const fn one() -> u32 {
      1
    }

    match Raw::deserialize(deserializer)? {
      Raw::Str(s) => s.parse().map_err(de::Error::custom),
      Raw::Obj { item, count, nbt } => {
        Ok(Self {
          id: item,
          count,
          nbt,
        })
      },
    }
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use std::path::PathBuf;

  use super::*;

  #[test]
  fn test_parse_with_namespace() {
    let id: ResourceLocation = "hexcasting:patterns/basics".parse().unwrap();
    assert_eq!(id.namespace(), "hexcasting");
    assert_eq!(id.path(), "patterns/basics");
    assert_eq!(id.to_string(), "hexcasting:patterns/basics");
  }

  #[test]
  fn test_parse_default_namespace() {
    let id: ResourceLocation = "stone".parse().unwrap();
    assert_eq!(id.to_string(), "minecraft:stone");

    let id = ResourceLocation::parse_with_default("text", "patchouli").unwrap();
    assert_eq!(id.to_string(), "patchouli:text");
  }

  #[test]
  fn test_rejects_uppercase_and_spaces() {
    assert!("Hex:thing".parse::<ResourceLocation>().is_err());
    assert!("hex:some thing".parse::<ResourceLocation>().is_err());
    assert!("hex:".parse::<ResourceLocation>().is_err());
  }

  #[test]
  fn test_from_file() {
    let root = PathBuf::from("/res/entries");
    let file = PathBuf::from("/res/entries/basics/intro.json");
    let id = ResourceLocation::from_file("hexcasting", &root, &file).unwrap();
    assert_eq!(id.to_string(), "hexcasting:basics/intro");

    let outside = PathBuf::from("/elsewhere/intro.json");
    assert!(ResourceLocation::from_file("hexcasting", &root, &outside).is_err());
  }

  #[test]
  fn test_i18n_key() {
    let id: ResourceLocation = "hexcasting:amethyst/dust".parse().unwrap();
    assert_eq!(id.i18n_key("item"), "item.hexcasting.amethyst.dust");
  }

  #[test]
  fn test_item_stack_from_str() {
    let stack: ItemStack = "minecraft:stone#4".parse().unwrap();
    assert_eq!(stack.id.to_string(), "minecraft:stone");
    assert_eq!(stack.count, 4);
    assert!(stack.nbt.is_none());

    let stack: ItemStack =
      r#"hexcasting:focus{data:{"hexcasting:type":"x"}}"#.parse().unwrap();
    assert_eq!(stack.count, 1);
    assert_eq!(stack.nbt.as_deref(), Some(r#"{data:{"hexcasting:type":"x"}}"#));
  }

  #[test]
  fn test_item_stack_deserialize_both_forms() {
    let from_str: ItemStack =
      serde_json::from_str(r#""minecraft:diamond#2""#).unwrap();
    let from_obj: ItemStack =
      serde_json::from_str(r#"{"item": "minecraft:diamond", "count": 2}"#)
        .unwrap();
    assert_eq!(from_str, from_obj);
  }

  #[test]
  fn test_item_stack_display_roundtrip() {
    let stack: ItemStack = "minecraft:stick#16".parse().unwrap();
    assert_eq!(stack.to_string(), "minecraft:stick#16");
  }
}
