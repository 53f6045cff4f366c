//! Book links and link overrides.

use std::fmt;

use globset::{Glob, GlobSet, GlobSetBuilder};
use hexdoc_core::ResourceLocation;
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::FormatError;

/// A link to a category, entry or page inside the book, as written in
/// `$(l:...)`.
///
/// The raw value is lowercased and split once on `#`. The part before it is
/// the target id, read in the book's namespace when it has none. The part
/// after it is the anchor of a page in that entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BookLink {
  pub raw_value: String,
  pub id:        ResourceLocation,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub anchor:    Option<String>,
}

impl BookLink {
  /// Parse a raw link value.
  ///
  /// # Errors
  ///
  /// Returns [`FormatError::InvalidBookLink`] if the id part is not a valid
  /// resource location.
  pub fn parse(raw_value: &str, book_namespace: &str) -> Result<Self, FormatError> {
    let lowered = raw_value.to_lowercase();
    let (id, anchor) = match lowered.split_once('#') {
      Some((id, anchor)) => (id, Some(anchor.to_string())),
      None => (lowered.as_str(), None),
    };

    let id = ResourceLocation::parse_with_default(id, book_namespace).map_err(
      |source| {
        FormatError::InvalidBookLink {
          value: raw_value.to_string(),
          source,
        }
      },
    )?;

    Ok(Self {
      raw_value: raw_value.to_string(),
      id,
      anchor,
    })
  }

  /// Key of this link in [`BookLinks`]: `ns:path` or `ns:path#anchor`.
  #[must_use]
  pub fn book_links_key(&self) -> String {
    book_links_key(&self.id, self.anchor.as_deref())
  }

  /// URL fragment of the link target: `#path` or `#path@anchor`.
  #[must_use]
  pub fn fragment(&self) -> String {
    fragment(&self.id, self.anchor.as_deref())
  }
}

impl fmt::Display for BookLink {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.book_links_key())
  }
}

/// Key under which a category, entry or anchored page is stored in
/// [`BookLinks`].
#[must_use]
pub fn book_links_key(id: &ResourceLocation, anchor: Option<&str>) -> String {
  match anchor {
    Some(anchor) => format!("{id}#{anchor}"),
    None => id.to_string(),
  }
}

/// HTML fragment for a category, entry or anchored page.
#[must_use]
pub fn fragment(id: &ResourceLocation, anchor: Option<&str>) -> String {
  match anchor {
    Some(anchor) => format!("#{}@{anchor}", id.path()),
    None => format!("#{}", id.path()),
  }
}

/// Glob patterns that redirect link values to fixed URLs.
///
/// Consulted before a link is treated as a book link, so an override can
/// point entries of another mod's book at that mod's published site.
#[derive(Debug, Clone)]
pub struct LinkOverrides {
  set:  GlobSet,
  urls: Vec<String>,
}

impl LinkOverrides {
  /// Compile a pattern → URL table. Patterns are tried in sorted order and
  /// the first match wins.
  ///
  /// # Errors
  ///
  /// Returns [`FormatError::InvalidLinkOverride`] if a pattern is not a
  /// valid glob.
  pub fn new<I, K, V>(overrides: I) -> Result<Self, FormatError>
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
  {
    let mut pairs: Vec<(String, String)> = overrides
      .into_iter()
      .map(|(k, v)| (k.into(), v.into()))
      .collect();
    pairs.sort();

    let mut builder = GlobSetBuilder::new();
    let mut urls = Vec::with_capacity(pairs.len());

    for (pattern, url) in pairs {
      let glob = Glob::new(&pattern.to_lowercase()).map_err(|source| {
        FormatError::InvalidLinkOverride {
          pattern: pattern.clone(),
          source,
        }
      })?;
      builder.add(glob);
      urls.push(url);
    }

    let set = builder.build().map_err(|source| {
      FormatError::InvalidLinkOverride {
        pattern: "<all>".to_string(),
        source,
      }
    })?;

    Ok(Self { set, urls })
  }

  /// The replacement URL for a raw link value, if any pattern matches it.
  #[must_use]
  pub fn get(&self, raw_value: &str) -> Option<&str> {
    self
      .set
      .matches(raw_value.to_lowercase())
      .into_iter()
      .min()
      .and_then(|index| self.urls.get(index))
      .map(String::as_str)
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.urls.is_empty()
  }
}

impl Default for LinkOverrides {
  fn default() -> Self {
    Self {
      set:  GlobSet::empty(),
      urls: Vec::new(),
    }
  }
}

/// Every link target in a rendered book, keyed by [`BookLink::book_links_key`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookLinks {
  links: IndexMap<String, String>,
}

impl BookLinks {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a link target. Later registrations replace earlier ones.
  pub fn insert(&mut self, key: impl Into<String>, href: impl Into<String>) {
    self.links.insert(key.into(), href.into());
  }

  #[must_use]
  pub fn get(&self, key: &str) -> Option<&str> {
    self.links.get(key).map(String::as_str)
  }

  /// Resolve a book link to its `href`.
  ///
  /// # Errors
  ///
  /// Returns [`FormatError::BrokenLink`] if nothing in the book was
  /// registered under the link's key.
  pub fn resolve(&self, link: &BookLink) -> Result<&str, FormatError> {
    let key = link.book_links_key();
    self.get(&key).ok_or_else(|| {
      FormatError::BrokenLink {
        link: link.raw_value.clone(),
        key,
      }
    })
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.links.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.links.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.links.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_book_link_with_anchor() {
    let link = BookLink::parse("foo/bar#hexcasting:anchor", "hexcasting").unwrap();
    assert_eq!(link.id.to_string(), "hexcasting:foo/bar");
    assert_eq!(link.anchor.as_deref(), Some("hexcasting:anchor"));
    assert_eq!(link.book_links_key(), "hexcasting:foo/bar#hexcasting:anchor");
    assert_eq!(link.fragment(), "#foo/bar@hexcasting:anchor");
  }

  #[test]
  fn test_book_link_lowercases_and_keeps_namespace() {
    let link = BookLink::parse("Other:Patterns/Basics", "hexcasting").unwrap();
    assert_eq!(link.id.to_string(), "other:patterns/basics");
    assert_eq!(link.anchor, None);
    assert_eq!(link.book_links_key(), "other:patterns/basics");
    assert_eq!(link.fragment(), "#patterns/basics");
    assert_eq!(link.raw_value, "Other:Patterns/Basics");
  }

  #[test]
  fn test_distinct_links_have_distinct_keys() {
    let a = BookLink::parse("a/b#c", "ns").unwrap();
    let b = BookLink::parse("a/b#d", "ns").unwrap();
    let c = BookLink::parse("a/b", "ns").unwrap();
    assert_ne!(a.book_links_key(), b.book_links_key());
    assert_ne!(a.book_links_key(), c.book_links_key());
    assert_ne!(a.fragment(), c.fragment());
  }

  #[test]
  fn test_invalid_book_link() {
    assert!(matches!(
      BookLink::parse("has spaces", "ns"),
      Err(FormatError::InvalidBookLink { .. })
    ));
  }

  #[test]
  fn test_link_overrides_match_globs() {
    let overrides = LinkOverrides::new([
      ("hexal:*", "https://hexal.example/"),
      ("moreiotas:*", "https://moreiotas.example/"),
    ])
    .unwrap();
    assert_eq!(
      overrides.get("hexal:patterns/spells"),
      Some("https://hexal.example/")
    );
    assert_eq!(overrides.get("hexcasting:basics"), None);
  }

  #[test]
  fn test_link_override_bad_pattern() {
    assert!(matches!(
      LinkOverrides::new([("a[", "x")]),
      Err(FormatError::InvalidLinkOverride { .. })
    ));
  }

  #[test]
  fn test_book_links_resolve() {
    let mut links = BookLinks::new();
    links.insert("hexcasting:basics", "#basics");
    let good = BookLink::parse("basics", "hexcasting").unwrap();
    let bad = BookLink::parse("missing", "hexcasting").unwrap();
    assert_eq!(links.resolve(&good).unwrap(), "#basics");
    assert!(matches!(
      links.resolve(&bad),
      Err(FormatError::BrokenLink { .. })
    ));
  }
}
