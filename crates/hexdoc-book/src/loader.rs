//! Loading categories and entries for one language.

use std::{
  collections::{HashMap, HashSet},
  path::{Path, PathBuf},
};

use hexdoc_core::{ItemStack, ResourceError, ResourceLocation};
use hexdoc_text::link::fragment;
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
  context::BookContext,
  error::BookError,
  files::{file_id, json_files, namespace_dirs, read_json},
  links::build_links,
  model::{Book, Category, Entry, Icon},
  page::{Page, PageContent, resolve_page},
};

#[derive(Deserialize)]
struct RawCategory {
  name:        String,
  #[serde(default)]
  description: String,
  icon:        Option<String>,
  parent:      Option<String>,
  flag:        Option<String>,
  #[serde(default)]
  sortnum:     i32,
  #[serde(default)]
  secret:      bool,
}

#[derive(Deserialize)]
struct RawEntry {
  name:            String,
  category:        String,
  icon:            Option<String>,
  #[serde(default)]
  pages:           Vec<Value>,
  advancement:     Option<ResourceLocation>,
  flag:            Option<String>,
  #[serde(default)]
  priority:        bool,
  #[serde(default)]
  secret:          bool,
  #[serde(default)]
  read_by_default: bool,
  #[serde(default)]
  sortnum:         i32,
}

/// Content files of one kind (`categories` or `entries`) by id.
///
/// Files from `default_lang` are collected first and then overridden by the
/// files of the context's language, so untranslated content falls back to
/// the default language. Later resource directories override earlier ones.
///
/// # Errors
///
/// Returns an error if a content directory cannot be walked or a file name
/// is not a valid id.
pub fn content_files(
  ctx: &BookContext,
  kind: &str,
  default_lang: &str,
) -> Result<IndexMap<ResourceLocation, PathBuf>, BookError> {
  let source = ctx.source();
  let mut langs = vec![default_lang];
  if ctx.lang() != default_lang {
    langs.push(ctx.lang());
  }

  let mut files = IndexMap::new();
  for lang in langs {
    for resource_dir in source.resource_dirs() {
      for (namespace, ns_dir) in
        namespace_dirs(resource_dir, source.content_section())
      {
        let root = source.content_dir(&ns_dir).join(lang).join(kind);
        for path in json_files(&root)? {
          let id = file_id(&namespace, &root, &path)?;
          files.insert(id, path);
        }
      }
    }
  }

  files.sort_unstable_keys();
  Ok(files)
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<T, BookError> {
  serde_json::from_value(read_json(path)?).map_err(|source| {
    BookError::ParseJson {
      path: path.to_path_buf(),
      source,
    }
  })
}

fn parse_icon(ctx: &BookContext, raw: &str) -> Result<Icon, BookError> {
  let invalid = |source: ResourceError| {
    BookError::InvalidId {
      path: PathBuf::from(raw),
      source,
    }
  };

  if raw.ends_with(".png") {
    let path: ResourceLocation = raw.parse().map_err(invalid)?;
    return Ok(Icon::Texture { path });
  }

  let stack: ItemStack = raw.parse().map_err(invalid)?;
  Ok(Icon::Item {
    item: ctx.item_ref(&stack)?,
  })
}

fn book_id(
  ctx: &BookContext,
  raw: &str,
  path: &Path,
) -> Result<ResourceLocation, BookError> {
  ResourceLocation::parse_with_default(raw, ctx.book_id().namespace()).map_err(
    |source| {
      BookError::InvalidId {
        path: path.to_path_buf(),
        source,
      }
    },
  )
}

fn load_category(
  ctx: &BookContext,
  id: ResourceLocation,
  path: &Path,
) -> Result<Category, BookError> {
  let raw: RawCategory = parse_file(path)?;
  let context = format!("category {id}");

  Ok(Category {
    name: ctx.localize(&raw.name),
    description: ctx.format_text(&raw.description, &context)?,
    icon: raw
      .icon
      .as_deref()
      .map(|icon| parse_icon(ctx, icon))
      .transpose()?,
    parent: raw
      .parent
      .as_deref()
      .map(|parent| book_id(ctx, parent, path))
      .transpose()?,
    flag: raw.flag,
    sortnum: raw.sortnum,
    secret: raw.secret,
    fragment: fragment(&id, None),
    entries: Vec::new(),
    children: Vec::new(),
    id,
  })
}

fn load_entry(
  ctx: &BookContext,
  id: ResourceLocation,
  path: &Path,
) -> Result<Entry, BookError> {
  let raw: RawEntry = parse_file(path)?;
  debug!("Loading entry {id} with {} pages", raw.pages.len());

  let pages = raw
    .pages
    .iter()
    .enumerate()
    .map(|(index, value)| -> Result<Page, BookError> {
      let context = format!("entry {id} page {}", index + 1);
      let mut page = resolve_page(value, ctx, &context)?;
      page.fragment = page.anchor.as_deref().map(|a| fragment(&id, Some(a)));
      Ok(page)
    })
    .collect::<Result<Vec<_>, _>>()?;

  let is_spoiler = raw
    .advancement
    .as_ref()
    .is_some_and(|advancement| ctx.is_spoiler(advancement));

  Ok(Entry {
    name: ctx.localize(&raw.name),
    category: book_id(ctx, &raw.category, path)?,
    icon: raw
      .icon
      .as_deref()
      .map(|icon| parse_icon(ctx, icon))
      .transpose()?,
    pages,
    advancement: raw.advancement,
    flag: raw.flag,
    priority: raw.priority,
    secret: raw.secret,
    read_by_default: raw.read_by_default,
    sortnum: raw.sortnum,
    is_spoiler,
    fragment: fragment(&id, None),
    id,
  })
}

type ChildMap = HashMap<Option<ResourceLocation>, Vec<Category>>;

fn attach(
  parent: Option<&ResourceLocation>,
  children: &mut ChildMap,
  visited: &mut HashSet<ResourceLocation>,
) -> Vec<Category> {
  let mut level = children.remove(&parent.cloned()).unwrap_or_default();
  level.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
  for category in &mut level {
    if visited.insert(category.id.clone()) {
      category.children = attach(Some(&category.id), children, visited);
    }
  }
  level
}

/// Nest categories under their parents, sorted at every level.
fn nest_categories(
  categories: IndexMap<ResourceLocation, Category>,
) -> Result<Vec<Category>, BookError> {
  let total = categories.len();
  let mut children = ChildMap::new();

  for category in categories.values() {
    if let Some(parent) = &category.parent
      && !categories.contains_key(parent)
    {
      return Err(BookError::UnknownParent {
        category: category.id.clone(),
        parent:   parent.clone(),
      });
    }
  }

  for (_, category) in categories {
    children
      .entry(category.parent.clone())
      .or_default()
      .push(category);
  }

  let mut visited = HashSet::new();
  let roots = attach(None, &mut children, &mut visited);

  if visited.len() != total {
    let orphans: Vec<String> = children
      .values()
      .flatten()
      .map(|category| category.id.to_string())
      .collect();
    warn!(
      "Skipping categories with cyclic parents: {}",
      orphans.join(", ")
    );
  }

  Ok(roots)
}

fn fill_relations(
  category: &mut Category,
  names: &HashMap<ResourceLocation, String>,
) -> Result<(), BookError> {
  for entry in &mut category.entries {
    for page in &mut entry.pages {
      if let PageContent::Relations { entries, .. } = &mut page.content {
        for related in entries {
          related.name = names.get(&related.id).cloned().ok_or_else(|| {
            BookError::UnknownEntry {
              entry:   entry.id.clone(),
              related: related.id.clone(),
            }
          })?;
        }
      }
    }
  }
  for child in &mut category.children {
    fill_relations(child, names)?;
  }
  Ok(())
}

/// Fill in names of related entries, failing on unknown ones.
fn resolve_relations(categories: &mut [Category]) -> Result<(), BookError> {
  let mut names = HashMap::new();
  for category in categories.iter().flat_map(Category::walk) {
    for entry in &category.entries {
      names.insert(entry.id.clone(), entry.name.clone());
    }
  }

  for category in categories {
    fill_relations(category, &names)?;
  }
  Ok(())
}

/// Load the book in the context's language.
///
/// # Errors
///
/// Returns an error if any category, entry or page fails to load, an entry
/// names an unknown category, or a relations page names an unknown entry.
pub fn load_book(ctx: &BookContext, default_lang: &str) -> Result<Book, BookError> {
  let source = ctx.source();
  let book = source.book();
  info!("Loading {} in {}", source.id(), ctx.lang());

  let mut categories = IndexMap::new();
  for (id, path) in content_files(ctx, "categories", default_lang)? {
    let category = load_category(ctx, id.clone(), &path)?;
    categories.insert(id, category);
  }

  let mut entries = Vec::new();
  for (id, path) in content_files(ctx, "entries", default_lang)? {
    entries.push(load_entry(ctx, id, &path)?);
  }

  for entry in entries {
    let category = categories.get_mut(&entry.category).ok_or_else(|| {
      BookError::UnknownCategory {
        entry:    entry.id.clone(),
        category: entry.category.clone(),
      }
    })?;
    category.entries.push(entry);
  }

  for category in categories.values_mut() {
    category
      .entries
      .sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
  }

  let mut categories = nest_categories(categories)?;
  resolve_relations(&mut categories)?;

  let links = build_links(categories.iter().flat_map(Category::walk));
  debug!("Built {} book links", links.len());

  Ok(Book {
    id: source.id().clone(),
    lang: ctx.lang().to_string(),
    lang_name: ctx.i18n().lang_name(),
    name: ctx.localize(&book.name),
    subtitle: book.subtitle.as_deref().map(|s| ctx.localize(s)),
    landing_text: ctx.format_text(&book.landing_text, "landing text")?,
    categories,
    links,
  })
}
