//! `hexdoc-book`.
//!
//! The Patchouli book model and the loader that builds it from resource
//! directories.
//!
//! Loading happens in two steps. [`BookSource::open`] reads everything that
//! is the same in every language: `book.json`, recipes and item tags. Then,
//! per language, a [`BookContext`] pairs the source with that language's
//! [`I18n`](hexdoc_core::I18n) table and text [`Formatter`](hexdoc_text::Formatter),
//! and [`load_book`] produces a fully localized [`Book`].
//!
//! Pages, recipes and ingredients are internally tagged unions, resolved
//! through the [`TypeRegistry`](hexdoc_core::TypeRegistry) instances in
//! [`Registries`].

pub mod context;
pub mod error;
mod files;
pub mod ingredient;
pub mod links;
pub mod loader;
pub mod model;
pub mod page;
pub mod recipe;
pub mod tags;

pub use context::{BookContext, BookJson, BookSource, Registries};
pub use error::BookError;
pub use ingredient::{Ingredient, IngredientChoice, ItemRef};
pub use loader::load_book;
pub use model::{Book, Category, Entry, Icon};
pub use page::{EntryRef, Page, PageContent};
pub use recipe::{Recipe, RecipeIndex, RecipeKind};
pub use tags::{ItemTags, TagValue};
