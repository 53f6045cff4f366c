//! Recipes referenced by book pages.
//!
//! Recipe files are indexed raw when the book source is opened and only
//! resolved when a page asks for one, so unsupported recipe types elsewhere
//! in the data pack never break a build.

use std::{collections::HashMap, path::PathBuf};

use hexdoc_core::{
  BoxError,
  ItemStack,
  ResourceLocation,
  TypeRegistry,
  TypeRegistryBuilder,
  UnionError,
  UnionInput,
};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  context::BookContext,
  error::BookError,
  files::{file_id, json_files, namespace_dirs, read_json},
  ingredient::{Ingredient, ItemRef, resolve_ingredient},
};

/// Raw recipe files by id.
#[derive(Debug, Clone, Default)]
pub struct RecipeIndex {
  recipes: HashMap<ResourceLocation, (PathBuf, Value)>,
}

impl RecipeIndex {
  /// Index every file under `data/<ns>/recipes` (and the singular
  /// `recipe` folder used by newer versions).
  ///
  /// # Errors
  ///
  /// Returns an error if a recipe file cannot be read or parsed.
  pub fn load(resource_dirs: &[PathBuf]) -> Result<Self, BookError> {
    let mut index = Self::default();

    for resource_dir in resource_dirs {
      for (namespace, ns_dir) in namespace_dirs(resource_dir, "data") {
        for folder in ["recipes", "recipe"] {
          let root = ns_dir.join(folder);
          for path in json_files(&root)? {
            let id = file_id(&namespace, &root, &path)?;
            let value = read_json(&path)?;
            index.insert(id, path, value);
          }
        }
      }
    }

    debug!("Indexed {} recipes", index.recipes.len());
    Ok(index)
  }

  pub fn insert(&mut self, id: ResourceLocation, path: PathBuf, value: Value) {
    self.recipes.insert(id, (path, value));
  }

  #[must_use]
  pub fn get(&self, id: &ResourceLocation) -> Option<&Value> {
    self.recipes.get(id).map(|(_, value)| value)
  }

  #[must_use]
  pub fn path(&self, id: &ResourceLocation) -> Option<&PathBuf> {
    self.recipes.get(id).map(|(path, _)| path)
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.recipes.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.recipes.is_empty()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CookingKind {
  Smelting,
  Blasting,
  Smoking,
  CampfireCooking,
}

impl CookingKind {
  /// Cooking time in ticks when the recipe does not set one.
  #[must_use]
  pub const fn default_time(self) -> u32 {
    match self {
      Self::Smelting => 200,
      Self::Blasting | Self::Smoking => 100,
      Self::CampfireCooking => 600,
    }
  }
}

/// A resolved recipe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
  pub id:   ResourceLocation,
  #[serde(flatten)]
  pub kind: RecipeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecipeKind {
  /// Rows of the pattern, `None` for empty slots.
  CraftingShaped {
    grid:   Vec<Vec<Option<Ingredient>>>,
    result: ItemRef,
  },
  CraftingShapeless {
    ingredients: Vec<Ingredient>,
    result:      ItemRef,
  },
  Cooking {
    kind:         CookingKind,
    ingredient:   Ingredient,
    result:       ItemRef,
    experience:   f64,
    cooking_time: u32,
  },
  Stonecutting {
    ingredient: Ingredient,
    result:     ItemRef,
  },
  SmithingTransform {
    template: Ingredient,
    base:     Ingredient,
    addition: Ingredient,
    result:   ItemRef,
  },
}

impl RecipeKind {
  /// The item this recipe produces.
  #[must_use]
  pub const fn result(&self) -> &ItemRef {
    match self {
      Self::CraftingShaped { result, .. }
      | Self::CraftingShapeless { result, .. }
      | Self::Cooking { result, .. }
      | Self::Stonecutting { result, .. }
      | Self::SmithingTransform { result, .. } => result,
    }
  }
}

#[derive(Deserialize)]
struct RawShaped {
  pattern: Vec<String>,
  key:     IndexMap<String, Value>,
  result:  ItemStack,
}

#[derive(Deserialize)]
struct RawShapeless {
  ingredients: Vec<Value>,
  result:      ItemStack,
}

#[derive(Deserialize)]
struct RawCooking {
  ingredient:  Value,
  result:      ItemStack,
  #[serde(default)]
  experience:  f64,
  cookingtime: Option<u32>,
}

#[derive(Deserialize)]
struct RawStonecutting {
  ingredient: Value,
  result:     ItemStack,
  count:      Option<u32>,
}

#[derive(Deserialize)]
struct RawSmithing {
  template: Value,
  base:     Value,
  addition: Value,
  result:   ItemStack,
}

fn crafting_shaped(
  value: &Value,
  ctx: &BookContext,
) -> Result<RecipeKind, BoxError> {
  let raw: RawShaped = serde_json::from_value(value.clone())?;

  let mut key = HashMap::with_capacity(raw.key.len());
  for (symbol, ingredient) in &raw.key {
    let mut chars = symbol.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
      return Err(format!("pattern key {symbol:?} is not one character").into());
    };
    key.insert(c, resolve_ingredient(ingredient, ctx)?);
  }

  let grid = raw
    .pattern
    .iter()
    .map(|row| {
      row
        .chars()
        .map(|c| {
          if c == ' ' {
            return Ok(None);
          }
          key
            .get(&c)
            .cloned()
            .map(Some)
            .ok_or_else(|| format!("pattern symbol {c:?} is not in the key"))
        })
        .collect::<Result<Vec<_>, _>>()
    })
    .collect::<Result<Vec<_>, _>>()?;

  Ok(RecipeKind::CraftingShaped {
    grid,
    result: ctx.item_ref(&raw.result)?,
  })
}

fn crafting_shapeless(
  value: &Value,
  ctx: &BookContext,
) -> Result<RecipeKind, BoxError> {
  let raw: RawShapeless = serde_json::from_value(value.clone())?;
  let ingredients = raw
    .ingredients
    .iter()
    .map(|ingredient| resolve_ingredient(ingredient, ctx))
    .collect::<Result<_, _>>()?;

  Ok(RecipeKind::CraftingShapeless {
    ingredients,
    result: ctx.item_ref(&raw.result)?,
  })
}

fn cooking(
  kind: CookingKind,
  value: &Value,
  ctx: &BookContext,
) -> Result<RecipeKind, BoxError> {
  let raw: RawCooking = serde_json::from_value(value.clone())?;
  Ok(RecipeKind::Cooking {
    kind,
    ingredient: resolve_ingredient(&raw.ingredient, ctx)?,
    result: ctx.item_ref(&raw.result)?,
    experience: raw.experience,
    cooking_time: raw.cookingtime.unwrap_or_else(|| kind.default_time()),
  })
}

fn smelting(value: &Value, ctx: &BookContext) -> Result<RecipeKind, BoxError> {
  cooking(CookingKind::Smelting, value, ctx)
}

fn blasting(value: &Value, ctx: &BookContext) -> Result<RecipeKind, BoxError> {
  cooking(CookingKind::Blasting, value, ctx)
}

fn smoking(value: &Value, ctx: &BookContext) -> Result<RecipeKind, BoxError> {
  cooking(CookingKind::Smoking, value, ctx)
}

fn campfire_cooking(
  value: &Value,
  ctx: &BookContext,
) -> Result<RecipeKind, BoxError> {
  cooking(CookingKind::CampfireCooking, value, ctx)
}

fn stonecutting(
  value: &Value,
  ctx: &BookContext,
) -> Result<RecipeKind, BoxError> {
  let raw: RawStonecutting = serde_json::from_value(value.clone())?;
  let mut result = raw.result;
  if let Some(count) = raw.count {
    result.count = count;
  }

  Ok(RecipeKind::Stonecutting {
    ingredient: resolve_ingredient(&raw.ingredient, ctx)?,
    result:     ctx.item_ref(&result)?,
  })
}

fn smithing_transform(
  value: &Value,
  ctx: &BookContext,
) -> Result<RecipeKind, BoxError> {
  let raw: RawSmithing = serde_json::from_value(value.clone())?;
  Ok(RecipeKind::SmithingTransform {
    template: resolve_ingredient(&raw.template, ctx)?,
    base:     resolve_ingredient(&raw.base, ctx)?,
    addition: resolve_ingredient(&raw.addition, ctx)?,
    result:   ctx.item_ref(&raw.result)?,
  })
}

/// Registry of the supported vanilla recipe types.
///
/// # Errors
///
/// Returns an error if the registry is malformed.
pub fn recipe_registry()
-> Result<TypeRegistry<RecipeKind, BookContext>, UnionError> {
  TypeRegistryBuilder::new("Recipe", "type", "minecraft")
    .abstract_variant("CraftingRecipe")
    .abstract_variant("CookingRecipe")
    .tagged("ShapedRecipe", "crafting_shaped", crafting_shaped)
    .tagged("ShapelessRecipe", "crafting_shapeless", crafting_shapeless)
    .tagged("SmeltingRecipe", "smelting", smelting)
    .tagged("BlastingRecipe", "blasting", blasting)
    .tagged("SmokingRecipe", "smoking", smoking)
    .tagged("CampfireCookingRecipe", "campfire_cooking", campfire_cooking)
    .tagged("StonecuttingRecipe", "stonecutting", stonecutting)
    .tagged("SmithingTransformRecipe", "smithing_transform", smithing_transform)
    .build()
}

/// Look up and resolve a recipe by id.
///
/// # Errors
///
/// Returns [`BookError::MissingRecipe`] if no recipe file has this id, and
/// [`BookError::Union`] if the file matches no supported recipe type.
pub fn resolve_recipe(
  id: &ResourceLocation,
  ctx: &BookContext,
) -> Result<Recipe, BookError> {
  let recipes = ctx.source().recipes();
  let value = recipes
    .get(id)
    .ok_or_else(|| BookError::MissingRecipe { id: id.clone() })?;

  let input = ctx
    .cached_recipe(id)
    .map_or(UnionInput::Raw(value), UnionInput::Resolved);

  let kind = ctx
    .source()
    .registries()
    .recipes
    .resolve(input, ctx)
    .map_err(|source| {
      BookError::Union {
        context: recipes
          .path(id)
          .map_or_else(|| id.to_string(), |path| path.display().to_string()),
        source,
      }
    })?;

  ctx.cache_recipe(id, &kind);
  Ok(Recipe {
    id: id.clone(),
    kind,
  })
}
