use std::{
  cell::RefCell,
  collections::HashMap,
  path::{Path, PathBuf},
  sync::Arc,
};

use globset::GlobSet;
use hexdoc_core::{I18n, ItemStack, ResourceLocation, TypeRegistry};
use hexdoc_text::{FormatTree, Formatter};
use indexmap::IndexMap;
use log::{debug, info};
use serde::Deserialize;

use crate::{
  error::BookError,
  files::read_json,
  ingredient::{IngredientChoice, ItemRef, ingredient_registry},
  page::{PageContent, page_registry},
  recipe::{RecipeIndex, RecipeKind, recipe_registry},
  tags::ItemTags,
};

const DEFAULT_LANDING_TEXT: &str = "patchouli.gui.lexicon.landing_info";

/// The parsed `book.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct BookJson {
  pub name:              String,
  #[serde(default = "default_landing_text")]
  pub landing_text:      String,
  pub subtitle:          Option<String>,
  #[serde(default)]
  pub use_resource_pack: bool,
  #[serde(default)]
  pub i18n:              bool,
  #[serde(default)]
  pub macros:            IndexMap<String, String>,
}

fn default_landing_text() -> String {
  DEFAULT_LANDING_TEXT.to_string()
}

/// Type registries for every union in the book format.
pub struct Registries {
  pub pages:       TypeRegistry<PageContent, BookContext>,
  pub recipes:     TypeRegistry<RecipeKind, BookContext>,
  pub ingredients: TypeRegistry<IngredientChoice, BookContext>,
}

impl Registries {
  /// Build every registry.
  ///
  /// # Errors
  ///
  /// Returns an error if any registry is malformed.
  pub fn new() -> Result<Self, BookError> {
    Ok(Self {
      pages:       page_registry()?,
      recipes:     recipe_registry()?,
      ingredients: ingredient_registry()?,
    })
  }
}

/// Everything about a book that does not depend on the language.
pub struct BookSource {
  id:            ResourceLocation,
  resource_dirs: Vec<PathBuf>,
  book:          BookJson,
  recipes:       RecipeIndex,
  tags:          ItemTags,
  registries:    Registries,
}

impl BookSource {
  /// Find `book.json` for `id` and index the recipes and item tags under
  /// `resource_dirs`. The last resource directory that has the book wins.
  ///
  /// # Errors
  ///
  /// Returns an error if the book cannot be found or any data file cannot be
  /// read.
  pub fn open(
    resource_dirs: &[PathBuf],
    id: ResourceLocation,
  ) -> Result<Self, BookError> {
    let searched: Vec<PathBuf> = resource_dirs
      .iter()
      .map(|dir| book_json_path(dir, &id))
      .collect();

    let Some(book_path) = searched.iter().rev().find(|path| path.is_file())
    else {
      return Err(BookError::BookNotFound { id, searched });
    };

    info!("Loading book {id} from {}", book_path.display());
    let book: BookJson =
      serde_json::from_value(read_json(book_path)?).map_err(|source| {
        BookError::ParseJson {
          path: book_path.clone(),
          source,
        }
      })?;

    let recipes = RecipeIndex::load(resource_dirs)?;
    let tags = ItemTags::load(resource_dirs)?;
    debug!(
      "Book {id} has {} macros, {} recipes available",
      book.macros.len(),
      recipes.len()
    );

    Ok(Self {
      id,
      resource_dirs: resource_dirs.to_vec(),
      book,
      recipes,
      tags,
      registries: Registries::new()?,
    })
  }

  /// Build a source from data already in memory.
  ///
  /// # Errors
  ///
  /// Returns an error if the registries are malformed.
  pub fn from_parts(
    id: ResourceLocation,
    resource_dirs: Vec<PathBuf>,
    book: BookJson,
    recipes: RecipeIndex,
    tags: ItemTags,
  ) -> Result<Self, BookError> {
    Ok(Self {
      id,
      resource_dirs,
      book,
      recipes,
      tags,
      registries: Registries::new()?,
    })
  }

  #[must_use]
  pub const fn id(&self) -> &ResourceLocation {
    &self.id
  }

  #[must_use]
  pub fn resource_dirs(&self) -> &[PathBuf] {
    &self.resource_dirs
  }

  #[must_use]
  pub const fn book(&self) -> &BookJson {
    &self.book
  }

  /// Macros defined by the book itself.
  #[must_use]
  pub const fn macros(&self) -> &IndexMap<String, String> {
    &self.book.macros
  }

  #[must_use]
  pub const fn recipes(&self) -> &RecipeIndex {
    &self.recipes
  }

  #[must_use]
  pub const fn tags(&self) -> &ItemTags {
    &self.tags
  }

  #[must_use]
  pub const fn registries(&self) -> &Registries {
    &self.registries
  }

  /// Directory holding the language folders of this book in one resource
  /// directory and namespace.
  #[must_use]
  pub fn content_dir(&self, ns_dir: &Path) -> PathBuf {
    ns_dir.join("patchouli_books").join(self.id.path())
  }

  /// `assets` when the book's content ships in a resource pack, else `data`.
  #[must_use]
  pub const fn content_section(&self) -> &'static str {
    if self.book.use_resource_pack {
      "assets"
    } else {
      "data"
    }
  }
}

fn book_json_path(resource_dir: &Path, id: &ResourceLocation) -> PathBuf {
  resource_dir
    .join("data")
    .join(id.namespace())
    .join("patchouli_books")
    .join(id.path())
    .join("book.json")
}

/// Everything needed to load the book in one language.
pub struct BookContext {
  source:    Arc<BookSource>,
  i18n:      I18n,
  formatter: Formatter,
  spoilers:  GlobSet,
  /// Recipes resolved so far, shared by every page that shows them.
  recipes:   RefCell<HashMap<ResourceLocation, RecipeKind>>,
}

impl BookContext {
  #[must_use]
  pub fn new(source: Arc<BookSource>, i18n: I18n, formatter: Formatter) -> Self {
    Self {
      source,
      i18n,
      formatter,
      spoilers: GlobSet::empty(),
      recipes: RefCell::default(),
    }
  }

  /// Advancements matching `spoilers` mark their entries as spoilers.
  #[must_use]
  pub fn with_spoilers(mut self, spoilers: GlobSet) -> Self {
    self.spoilers = spoilers;
    self
  }

  #[must_use]
  pub fn source(&self) -> &BookSource {
    &self.source
  }

  #[must_use]
  pub fn book_id(&self) -> &ResourceLocation {
    self.source.id()
  }

  #[must_use]
  pub const fn i18n(&self) -> &I18n {
    &self.i18n
  }

  #[must_use]
  pub const fn formatter(&self) -> &Formatter {
    &self.formatter
  }

  #[must_use]
  pub fn lang(&self) -> &str {
    self.i18n.lang()
  }

  #[must_use]
  pub fn is_spoiler(&self, advancement: &ResourceLocation) -> bool {
    self.spoilers.is_match(advancement.to_string())
  }

  /// Localize a name or title, falling back to the raw text.
  #[must_use]
  pub fn localize(&self, key_or_text: &str) -> String {
    self.i18n.localize_or_raw(key_or_text)
  }

  /// Localize and format book text.
  ///
  /// # Errors
  ///
  /// Returns [`BookError::Format`] naming `context` if the text contains an
  /// invalid style.
  pub fn format_text(
    &self,
    key_or_text: &str,
    context: &str,
  ) -> Result<FormatTree, BookError> {
    self
      .formatter
      .format_localized(key_or_text, &self.i18n)
      .map_err(|source| {
        BookError::Format {
          context: context.to_string(),
          source,
        }
      })
  }

  /// A recipe already resolved in this language.
  #[must_use]
  pub fn cached_recipe(&self, id: &ResourceLocation) -> Option<RecipeKind> {
    self.recipes.borrow().get(id).cloned()
  }

  pub fn cache_recipe(&self, id: &ResourceLocation, kind: &RecipeKind) {
    self.recipes.borrow_mut().insert(id.clone(), kind.clone());
  }

  /// An item with its localized name.
  ///
  /// # Errors
  ///
  /// Returns an error if the name is untranslated and missing translations
  /// are not allowed.
  pub fn item_ref(&self, stack: &ItemStack) -> Result<ItemRef, BookError> {
    Ok(ItemRef {
      id:    stack.id.clone(),
      name:  self.i18n.localize_item(&stack.id)?,
      count: stack.count,
    })
  }
}
