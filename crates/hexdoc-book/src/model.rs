//! The loaded, localized book.

use hexdoc_core::ResourceLocation;
use hexdoc_text::{BookLinks, FormatTree};
use serde::Serialize;

use crate::{ingredient::ItemRef, page::Page};

/// A category or entry icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Icon {
  Item { item: ItemRef },
  Texture { path: ResourceLocation },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
  pub id:              ResourceLocation,
  pub name:            String,
  pub category:        ResourceLocation,
  pub icon:            Option<Icon>,
  pub pages:           Vec<Page>,
  pub advancement:     Option<ResourceLocation>,
  pub flag:            Option<String>,
  pub priority:        bool,
  pub secret:          bool,
  pub read_by_default: bool,
  pub sortnum:         i32,
  pub is_spoiler:      bool,
  pub fragment:        String,
}

impl Entry {
  /// Priority entries first, then by sort number and name.
  #[must_use]
  pub fn sort_key(&self) -> (bool, i32, &str) {
    (!self.priority, self.sortnum, &self.name)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
  pub id:          ResourceLocation,
  pub name:        String,
  pub description: FormatTree,
  pub icon:        Option<Icon>,
  pub parent:      Option<ResourceLocation>,
  pub flag:        Option<String>,
  pub sortnum:     i32,
  pub secret:      bool,
  pub fragment:    String,
  pub entries:     Vec<Entry>,
  pub children:    Vec<Category>,
}

impl Category {
  #[must_use]
  pub fn sort_key(&self) -> (i32, &str) {
    (self.sortnum, &self.name)
  }

  /// This category and every category nested under it, depth first.
  pub fn walk(&self) -> Box<dyn Iterator<Item = &Self> + '_> {
    Box::new(
      std::iter::once(self).chain(self.children.iter().flat_map(Self::walk)),
    )
  }

  /// A category is a spoiler when all of its entries are.
  #[must_use]
  pub fn is_spoiler(&self) -> bool {
    !self.entries.is_empty() && self.entries.iter().all(|e| e.is_spoiler)
  }
}

/// A book loaded in one language.
#[derive(Debug, Clone, Serialize)]
pub struct Book {
  pub id:           ResourceLocation,
  pub lang:         String,
  pub lang_name:    String,
  pub name:         String,
  pub subtitle:     Option<String>,
  pub landing_text: FormatTree,
  /// Top-level categories, sorted, with nested categories as children.
  pub categories:   Vec<Category>,
  /// Link key to fragment for every category, entry and anchored page.
  pub links:        BookLinks,
}

impl Book {
  /// Every category, depth first.
  pub fn all_categories(&self) -> impl Iterator<Item = &Category> {
    self.categories.iter().flat_map(Category::walk)
  }

  /// Every entry in category order.
  pub fn all_entries(&self) -> impl Iterator<Item = &Entry> {
    self.all_categories().flat_map(|category| category.entries.iter())
  }

  #[must_use]
  pub fn entry(&self, id: &ResourceLocation) -> Option<&Entry> {
    self.all_entries().find(|entry| &entry.id == id)
  }
}
