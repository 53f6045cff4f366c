//! Recipe ingredients.
//!
//! An ingredient is either a single object or an array of alternatives. Each
//! object is resolved through a registry keyed on `type`: plain `{"item"}`
//! and `{"tag"}` objects have no discriminator and are told apart by which
//! schema validates.

use hexdoc_core::{
  BoxError,
  ItemStack,
  ResourceLocation,
  Tag,
  TypeRegistry,
  TypeRegistryBuilder,
  UnionError,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::BookContext;

/// An item with its localized name, for rendering placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRef {
  pub id:    ResourceLocation,
  pub name:  String,
  pub count: u32,
}

/// One alternative of an [`Ingredient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IngredientChoice {
  Item {
    item: ItemRef,
  },
  Tag {
    tag:   ResourceLocation,
    items: Vec<ItemRef>,
  },
}

/// Accepted inputs for one recipe slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ingredient {
  pub choices: Vec<IngredientChoice>,
}

impl Ingredient {
  /// Every concrete item this ingredient accepts.
  pub fn items(&self) -> impl Iterator<Item = &ItemRef> {
    self.choices.iter().flat_map(|choice| {
      match choice {
        IngredientChoice::Item { item } => std::slice::from_ref(item),
        IngredientChoice::Tag { items, .. } => items.as_slice(),
      }
    })
  }
}

#[derive(Deserialize)]
struct RawItem {
  item: ResourceLocation,
}

#[derive(Deserialize)]
struct RawTag {
  tag: ResourceLocation,
}

fn item_choice(
  value: &Value,
  ctx: &BookContext,
) -> Result<IngredientChoice, BoxError> {
  let raw: RawItem = serde_json::from_value(value.clone())?;
  let item = ctx.item_ref(&ItemStack::new(raw.item))?;
  Ok(IngredientChoice::Item { item })
}

fn tag_choice(
  value: &Value,
  ctx: &BookContext,
) -> Result<IngredientChoice, BoxError> {
  let raw: RawTag = serde_json::from_value(value.clone())?;
  let items = ctx
    .source()
    .tags()
    .expand(&raw.tag)
    .into_iter()
    .map(|id| ctx.item_ref(&ItemStack::new(id)))
    .collect::<Result<_, _>>()?;
  Ok(IngredientChoice::Tag { tag: raw.tag, items })
}

/// Registry for a single ingredient object.
///
/// # Errors
///
/// Returns an error if the registry is malformed.
pub fn ingredient_registry()
-> Result<TypeRegistry<IngredientChoice, BookContext>, UnionError> {
  TypeRegistryBuilder::new("Ingredient", "type", "minecraft")
    .variant("ItemIngredient", Tag::Absent, item_choice)
    .variant("TagIngredient", Tag::Absent, tag_choice)
    .tagged("NbtIngredient", "forge:nbt", item_choice)
    .build()
}

/// Resolve an ingredient object or array of alternatives.
///
/// # Errors
///
/// Returns an error if any alternative matches no ingredient variant.
pub fn resolve_ingredient(
  value: &Value,
  ctx: &BookContext,
) -> Result<Ingredient, UnionError> {
  let registry = &ctx.source().registries().ingredients;
  let choices = match value {
    Value::Array(values) => {
      values
        .iter()
        .map(|value| registry.resolve_value(value, ctx))
        .collect::<Result<_, _>>()?
    },
    other => vec![registry.resolve_value(other, ctx)?],
  };
  Ok(Ingredient { choices })
}
