//! Entry pages.
//!
//! Pages are an internally tagged union on `type`. Bare type names are read
//! in the `patchouli` namespace, so `"text"` and `"patchouli:text"` are the
//! same page type. A page written as a plain string is a text page.

use hexdoc_core::{
  BoxError,
  ItemStack,
  ResourceLocation,
  TypeRegistry,
  TypeRegistryBuilder,
  UnionError,
};
use hexdoc_text::FormatTree;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
  context::BookContext,
  error::BookError,
  ingredient::ItemRef,
  recipe::{Recipe, resolve_recipe},
};

/// A page of an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
  pub anchor:      Option<String>,
  pub advancement: Option<ResourceLocation>,
  pub flag:        Option<String>,

  /// Fragment of the anchored page, set when the entry is loaded.
  pub fragment: Option<String>,

  #[serde(flatten)]
  pub content: PageContent,
}

impl Page {
  /// Template used to render this page.
  #[must_use]
  pub fn template_name(&self) -> String {
    format!("pages/{}.html", self.content.type_name())
  }
}

/// A link from a relations page to another entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryRef {
  pub id:       ResourceLocation,
  pub name:     String,
  pub fragment: String,
}

/// Layout of a multiblock structure, top layer first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multiblock {
  pub pattern:     Vec<Vec<String>>,
  pub mapping:     IndexMap<String, String>,
  #[serde(default)]
  pub symmetrical: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageContent {
  Text {
    title: Option<String>,
    text:  Option<FormatTree>,
  },
  Image {
    title:  Option<String>,
    images: Vec<ResourceLocation>,
    border: bool,
    text:   Option<FormatTree>,
  },
  Crafting {
    title:   Option<String>,
    recipes: Vec<Recipe>,
    text:    Option<FormatTree>,
  },
  /// Smelting, blasting, smoking and campfire pages.
  Cooking {
    title:   Option<String>,
    recipes: Vec<Recipe>,
    text:    Option<FormatTree>,
  },
  Stonecutting {
    title:   Option<String>,
    recipes: Vec<Recipe>,
    text:    Option<FormatTree>,
  },
  Smithing {
    title:   Option<String>,
    recipes: Vec<Recipe>,
    text:    Option<FormatTree>,
  },
  Multiblock {
    name:             String,
    multiblock_id:    Option<ResourceLocation>,
    multiblock:       Option<Multiblock>,
    enable_visualize: bool,
    text:             Option<FormatTree>,
  },
  Entity {
    entity: String,
    name:   Option<String>,
    text:   Option<FormatTree>,
  },
  Spotlight {
    title:       Option<String>,
    items:       Vec<ItemRef>,
    link_recipe: bool,
    text:        Option<FormatTree>,
  },
  Link {
    title:     Option<String>,
    url:       String,
    link_text: String,
    text:      Option<FormatTree>,
  },
  Relations {
    title:   Option<String>,
    entries: Vec<EntryRef>,
    text:    Option<FormatTree>,
  },
  Quest {
    title:   Option<String>,
    trigger: Option<ResourceLocation>,
    text:    Option<FormatTree>,
  },
  Empty {
    draw_filler: bool,
  },
}

impl PageContent {
  #[must_use]
  pub const fn type_name(&self) -> &'static str {
    match self {
      Self::Text { .. } => "text",
      Self::Image { .. } => "image",
      Self::Crafting { .. } => "crafting",
      Self::Cooking { .. } => "cooking",
      Self::Stonecutting { .. } => "stonecutting",
      Self::Smithing { .. } => "smithing",
      Self::Multiblock { .. } => "multiblock",
      Self::Entity { .. } => "entity",
      Self::Spotlight { .. } => "spotlight",
      Self::Link { .. } => "link",
      Self::Relations { .. } => "relations",
      Self::Quest { .. } => "quest",
      Self::Empty { .. } => "empty",
    }
  }

  /// The page's formatted body text, if it has one.
  #[must_use]
  pub const fn text(&self) -> Option<&FormatTree> {
    match self {
      Self::Text { text, .. }
      | Self::Image { text, .. }
      | Self::Crafting { text, .. }
      | Self::Cooking { text, .. }
      | Self::Stonecutting { text, .. }
      | Self::Smithing { text, .. }
      | Self::Multiblock { text, .. }
      | Self::Entity { text, .. }
      | Self::Spotlight { text, .. }
      | Self::Link { text, .. }
      | Self::Relations { text, .. }
      | Self::Quest { text, .. } => text.as_ref(),
      Self::Empty { .. } => None,
    }
  }
}

#[derive(Deserialize)]
struct PageCommon {
  anchor:      Option<String>,
  advancement: Option<ResourceLocation>,
  flag:        Option<String>,
}

#[derive(Deserialize)]
struct TitledText {
  title: Option<String>,
  text:  Option<String>,
}

#[derive(Deserialize)]
struct RecipePage {
  title:   Option<String>,
  text:    Option<String>,
  recipe:  ResourceLocation,
  recipe2: Option<ResourceLocation>,
}

fn parse<T: DeserializeOwned>(value: &Value) -> Result<T, BoxError> {
  Ok(serde_json::from_value(value.clone())?)
}

fn title(ctx: &BookContext, title: Option<&String>) -> Option<String> {
  title.map(|title| ctx.localize(title))
}

fn text(
  ctx: &BookContext,
  text: Option<&String>,
) -> Result<Option<FormatTree>, BookError> {
  text.map(|text| ctx.format_text(text, "page text")).transpose()
}

fn text_page(value: &Value, ctx: &BookContext) -> Result<PageContent, BoxError> {
  let raw: TitledText = parse(value)?;
  Ok(PageContent::Text {
    title: title(ctx, raw.title.as_ref()),
    text:  text(ctx, raw.text.as_ref())?,
  })
}

fn image_page(value: &Value, ctx: &BookContext) -> Result<PageContent, BoxError> {
  #[derive(Deserialize)]
  struct Raw {
    title:  Option<String>,
    text:   Option<String>,
    images: Vec<ResourceLocation>,
    #[serde(default)]
    border: bool,
  }

  let raw: Raw = parse(value)?;
  Ok(PageContent::Image {
    title:  title(ctx, raw.title.as_ref()),
    images: raw.images,
    border: raw.border,
    text:   text(ctx, raw.text.as_ref())?,
  })
}

fn recipes(
  ctx: &BookContext,
  raw: &RecipePage,
) -> Result<Vec<Recipe>, BookError> {
  std::iter::once(&raw.recipe)
    .chain(raw.recipe2.as_ref())
    .map(|id| resolve_recipe(id, ctx))
    .collect()
}

macro_rules! recipe_page {
  ($name:ident, $variant:ident) => {
    fn $name(value: &Value, ctx: &BookContext) -> Result<PageContent, BoxError> {
      let raw: RecipePage = parse(value)?;
      Ok(PageContent::$variant {
        title:   title(ctx, raw.title.as_ref()),
        recipes: recipes(ctx, &raw)?,
        text:    text(ctx, raw.text.as_ref())?,
      })
    }
  };
}

recipe_page!(crafting_page, Crafting);
recipe_page!(cooking_page, Cooking);
recipe_page!(stonecutting_page, Stonecutting);
recipe_page!(smithing_page, Smithing);

fn multiblock_page(
  value: &Value,
  ctx: &BookContext,
) -> Result<PageContent, BoxError> {
  #[derive(Deserialize)]
  struct Raw {
    name:             String,
    text:             Option<String>,
    multiblock_id:    Option<ResourceLocation>,
    multiblock:       Option<Multiblock>,
    #[serde(default = "default_true")]
    enable_visualize: bool,
  }

  let raw: Raw = parse(value)?;
  if raw.multiblock_id.is_none() && raw.multiblock.is_none() {
    return Err("one of multiblock_id or multiblock is required".into());
  }

  Ok(PageContent::Multiblock {
    name:             ctx.localize(&raw.name),
    multiblock_id:    raw.multiblock_id,
    multiblock:       raw.multiblock,
    enable_visualize: raw.enable_visualize,
    text:             text(ctx, raw.text.as_ref())?,
  })
}

fn entity_page(value: &Value, ctx: &BookContext) -> Result<PageContent, BoxError> {
  #[derive(Deserialize)]
  struct Raw {
    entity: String,
    name:   Option<String>,
    text:   Option<String>,
  }

  let raw: Raw = parse(value)?;
  Ok(PageContent::Entity {
    entity: raw.entity,
    name:   title(ctx, raw.name.as_ref()),
    text:   text(ctx, raw.text.as_ref())?,
  })
}

fn spotlight_page(
  value: &Value,
  ctx: &BookContext,
) -> Result<PageContent, BoxError> {
  #[derive(Deserialize)]
  struct Raw {
    title:       Option<String>,
    text:        Option<String>,
    item:        String,
    #[serde(default)]
    link_recipe: bool,
  }

  let raw: Raw = parse(value)?;
  let items = raw
    .item
    .split(',')
    .map(str::trim)
    .filter(|item| !item.is_empty())
    .map(|item| -> Result<ItemRef, BoxError> {
      let stack: ItemStack = item.parse()?;
      Ok(ctx.item_ref(&stack)?)
    })
    .collect::<Result<_, BoxError>>()?;

  Ok(PageContent::Spotlight {
    title: title(ctx, raw.title.as_ref()),
    items,
    link_recipe: raw.link_recipe,
    text: text(ctx, raw.text.as_ref())?,
  })
}

fn link_page(value: &Value, ctx: &BookContext) -> Result<PageContent, BoxError> {
  #[derive(Deserialize)]
  struct Raw {
    title:     Option<String>,
    text:      Option<String>,
    url:       String,
    link_text: String,
  }

  let raw: Raw = parse(value)?;
  Ok(PageContent::Link {
    title:     title(ctx, raw.title.as_ref()),
    url:       raw.url,
    link_text: ctx.localize(&raw.link_text),
    text:      text(ctx, raw.text.as_ref())?,
  })
}

fn relations_page(
  value: &Value,
  ctx: &BookContext,
) -> Result<PageContent, BoxError> {
  #[derive(Deserialize)]
  struct Raw {
    title:   Option<String>,
    text:    Option<String>,
    entries: Vec<String>,
  }

  let raw: Raw = parse(value)?;
  let namespace = ctx.book_id().namespace();
  let entries = raw
    .entries
    .iter()
    .map(|entry| -> Result<EntryRef, BoxError> {
      let id = ResourceLocation::parse_with_default(entry, namespace)?;
      Ok(EntryRef {
        name: id.to_string(),
        fragment: hexdoc_text::link::fragment(&id, None),
        id,
      })
    })
    .collect::<Result<_, BoxError>>()?;

  Ok(PageContent::Relations {
    title: title(ctx, raw.title.as_ref()),
    entries,
    text: text(ctx, raw.text.as_ref())?,
  })
}

fn quest_page(value: &Value, ctx: &BookContext) -> Result<PageContent, BoxError> {
  #[derive(Deserialize)]
  struct Raw {
    title:   Option<String>,
    text:    Option<String>,
    trigger: Option<ResourceLocation>,
  }

  let raw: Raw = parse(value)?;
  Ok(PageContent::Quest {
    title:   title(ctx, raw.title.as_ref()),
    trigger: raw.trigger,
    text:    text(ctx, raw.text.as_ref())?,
  })
}

fn empty_page(value: &Value, _: &BookContext) -> Result<PageContent, BoxError> {
  #[derive(Deserialize)]
  struct Raw {
    #[serde(default = "default_true")]
    draw_filler: bool,
  }

  let raw: Raw = parse(value)?;
  Ok(PageContent::Empty {
    draw_filler: raw.draw_filler,
  })
}

const fn default_true() -> bool {
  true
}

/// Registry of the built-in Patchouli page types.
///
/// # Errors
///
/// Returns an error if the registry is malformed.
pub fn page_registry()
-> Result<TypeRegistry<PageContent, BookContext>, UnionError> {
  TypeRegistryBuilder::new("Page", "type", "patchouli")
    .abstract_variant("PageWithText")
    .abstract_variant("PageWithRecipe")
    .tagged("TextPage", "text", text_page)
    .tagged("ImagePage", "image", image_page)
    .tagged("CraftingPage", "crafting", crafting_page)
    .tagged("SmeltingPage", "smelting", cooking_page)
    .tagged("BlastingPage", "blasting", cooking_page)
    .tagged("SmokingPage", "smoking", cooking_page)
    .tagged("CampfireCookingPage", "campfire_cooking", cooking_page)
    .tagged("StonecuttingPage", "stonecutting", stonecutting_page)
    .tagged("SmithingPage", "smithing", smithing_page)
    .tagged("MultiblockPage", "multiblock", multiblock_page)
    .tagged("EntityPage", "entity", entity_page)
    .tagged("SpotlightPage", "spotlight", spotlight_page)
    .tagged("LinkPage", "link", link_page)
    .tagged("RelationsPage", "relations", relations_page)
    .tagged("QuestPage", "quest", quest_page)
    .tagged("EmptyPage", "empty", empty_page)
    .build()
}

/// Resolve one entry of an entry's `pages` list.
///
/// # Errors
///
/// Returns an error if the page's common fields are invalid or the page
/// matches no registered page type.
pub fn resolve_page(
  value: &Value,
  ctx: &BookContext,
  context: &str,
) -> Result<Page, BookError> {
  if let Value::String(raw_text) = value {
    return Ok(Page {
      anchor:      None,
      advancement: None,
      flag:        None,
      fragment:    None,
      content:     PageContent::Text {
        title: None,
        text:  Some(ctx.format_text(raw_text, context)?),
      },
    });
  }

  let common: PageCommon =
    serde_json::from_value(value.clone()).map_err(|source| {
      BookError::InvalidField {
        context: context.to_string(),
        field: "page",
        source,
      }
    })?;

  let content = ctx
    .source()
    .registries()
    .pages
    .resolve_value(value, ctx)
    .map_err(|source| {
      BookError::Union {
        context: context.to_string(),
        source,
      }
    })?;

  Ok(Page {
    anchor: common.anchor,
    advancement: common.advancement,
    flag: common.flag,
    fragment: None,
    content,
  })
}
