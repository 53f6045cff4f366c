//! `hexdoc-core`.
//!
//! Shared building blocks for the hexdoc crates:
//!
//! - [`ResourceLocation`] and [`ItemStack`], the namespaced identifiers used by
//!   every piece of Minecraft game data.
//! - [`I18n`], the per-language lookup table built from `assets/*/lang`.
//! - [`TypeRegistry`], the explicit registry that resolves internally tagged
//!   JSON unions (pages, recipes, ingredients) into concrete Rust values.
//!
//! # Example
//!
//! ```
//! use hexdoc_core::ResourceLocation;
//!
//! let id: ResourceLocation = "hexcasting:thehexbook".parse().unwrap();
//! assert_eq!(id.namespace(), "hexcasting");
//! assert_eq!(id.path(), "thehexbook");
//! ```

pub mod error;
pub mod i18n;
pub mod resource;
pub mod union;

pub use error::{I18nError, ResourceError, UnionError};
pub use i18n::{I18n, discover_langs};
pub use resource::{ItemStack, ResourceLocation};
pub use union::{
  BoxError,
  Tag,
  TypeRegistry,
  TypeRegistryBuilder,
  UnionInput,
};
