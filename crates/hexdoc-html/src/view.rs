//! Serializable views of a loaded book, handed to the templates.
//!
//! Formatted text is rendered to HTML here so templates only ever see
//! strings. Categories are flattened depth first, each carrying its nesting
//! depth, so templates never need recursion.

use color_eyre::eyre::{Context, Result};
use hexdoc_book::{Book, Category, Entry, Icon, Page, PageContent};
use hexdoc_core::ResourceLocation;
use hexdoc_text::{BookLinks, FormatTree, to_html};
use serde::Serialize;

/// URL of a texture copied into the site directory, relative to the page.
#[must_use]
pub fn texture_url(id: &ResourceLocation) -> String {
  format!("textures/{}/{}", id.namespace(), id.path())
}

#[derive(Debug, Clone, Serialize)]
pub struct IconView {
  /// Image to show, for texture icons.
  pub url:   Option<String>,
  /// Item name or texture id, used as a tooltip.
  pub label: String,
}

impl From<&Icon> for IconView {
  fn from(icon: &Icon) -> Self {
    match icon {
      Icon::Item { item } => {
        Self {
          url:   None,
          label: item.name.clone(),
        }
      },
      Icon::Texture { path } => {
        Self {
          url:   Some(texture_url(path)),
          label: path.to_string(),
        }
      },
    }
  }
}

#[derive(Debug, Serialize)]
pub struct PageView<'a> {
  #[serde(rename = "type")]
  pub kind:        &'static str,
  pub template:    String,
  pub anchor:      Option<&'a str>,
  pub fragment:    Option<&'a str>,
  pub html_id:     Option<&'a str>,
  pub advancement: Option<String>,
  pub text_html:   Option<String>,
  /// Texture URLs of an image page.
  pub images:      Vec<String>,
  pub content:     &'a PageContent,
  /// The rendered page template, filled in by the renderer.
  pub html:        String,
}

impl<'a> PageView<'a> {
  /// # Errors
  ///
  /// Returns an error if the page text contains a broken book link.
  pub fn new(page: &'a Page, links: &BookLinks) -> Result<Self> {
    let images = match &page.content {
      PageContent::Image { images, .. } => {
        images.iter().map(texture_url).collect()
      },
      _ => Vec::new(),
    };

    Ok(Self {
      kind: page.content.type_name(),
      template: page.template_name(),
      anchor: page.anchor.as_deref(),
      fragment: page.fragment.as_deref(),
      html_id: page.fragment.as_deref().map(html_id),
      advancement: page.advancement.as_ref().map(ToString::to_string),
      text_html: page.content.text().map(|t| to_html(t, links)).transpose()?,
      images,
      content: &page.content,
      html: String::new(),
    })
  }
}

#[derive(Debug, Serialize)]
pub struct EntryView<'a> {
  pub id:          String,
  pub name:        &'a str,
  pub fragment:    &'a str,
  pub html_id:     &'a str,
  pub icon:        Option<IconView>,
  pub advancement: Option<String>,
  pub is_spoiler:  bool,
  pub secret:      bool,
  pub pages:       Vec<PageView<'a>>,
}

impl<'a> EntryView<'a> {
  /// # Errors
  ///
  /// Returns an error naming the entry and page if any page text contains a
  /// broken book link.
  pub fn new(entry: &'a Entry, links: &BookLinks) -> Result<Self> {
    let pages = entry
      .pages
      .iter()
      .enumerate()
      .map(|(index, page)| {
        PageView::new(page, links).wrap_err_with(|| {
          format!("Failed to render entry {} page {}", entry.id, index + 1)
        })
      })
      .collect::<Result<_>>()?;

    Ok(Self {
      id: entry.id.to_string(),
      name: &entry.name,
      fragment: &entry.fragment,
      html_id: html_id(&entry.fragment),
      icon: entry.icon.as_ref().map(IconView::from),
      advancement: entry.advancement.as_ref().map(ToString::to_string),
      is_spoiler: entry.is_spoiler,
      secret: entry.secret,
      pages,
    })
  }
}

#[derive(Debug, Serialize)]
pub struct CategoryView<'a> {
  pub id:               String,
  pub name:             &'a str,
  pub fragment:         &'a str,
  pub html_id:          &'a str,
  pub description_html: String,
  pub icon:             Option<IconView>,
  pub depth:            usize,
  pub is_spoiler:       bool,
  pub secret:           bool,
  pub entries:          Vec<EntryView<'a>>,
}

impl<'a> CategoryView<'a> {
  fn new(
    category: &'a Category,
    depth: usize,
    links: &BookLinks,
  ) -> Result<Self> {
    Ok(Self {
      id: category.id.to_string(),
      name: &category.name,
      fragment: &category.fragment,
      html_id: html_id(&category.fragment),
      description_html: render_text(
        &category.description,
        links,
        &format!("category {}", category.id),
      )?,
      icon: category.icon.as_ref().map(IconView::from),
      depth,
      is_spoiler: category.is_spoiler(),
      secret: category.secret,
      entries: category
        .entries
        .iter()
        .map(|entry| EntryView::new(entry, links))
        .collect::<Result<_>>()?,
    })
  }
}

#[derive(Debug, Serialize)]
pub struct BookView<'a> {
  pub id:           String,
  pub lang:         &'a str,
  pub lang_name:    &'a str,
  pub name:         &'a str,
  pub subtitle:     Option<&'a str>,
  pub landing_html: String,
  /// Every category, depth first.
  pub categories:   Vec<CategoryView<'a>>,
}

impl<'a> BookView<'a> {
  /// Render every text field of `book` through its links table.
  ///
  /// # Errors
  ///
  /// Returns an error naming the category, entry or page whose text
  /// contains a broken book link.
  pub fn new(book: &'a Book) -> Result<Self> {
    let mut categories = Vec::new();
    for category in &book.categories {
      flatten(category, 0, &book.links, &mut categories)?;
    }

    Ok(Self {
      id: book.id.to_string(),
      lang: &book.lang,
      lang_name: &book.lang_name,
      name: &book.name,
      subtitle: book.subtitle.as_deref(),
      landing_html: render_text(
        &book.landing_text,
        &book.links,
        "landing text",
      )?,
      categories,
    })
  }

  /// Every page of every entry.
  pub fn pages_mut(&mut self) -> impl Iterator<Item = &mut PageView<'a>> {
    self
      .categories
      .iter_mut()
      .flat_map(|category| category.entries.iter_mut())
      .flat_map(|entry| entry.pages.iter_mut())
  }
}

fn flatten<'a>(
  category: &'a Category,
  depth: usize,
  links: &BookLinks,
  out: &mut Vec<CategoryView<'a>>,
) -> Result<()> {
  out.push(CategoryView::new(category, depth, links)?);
  for child in &category.children {
    flatten(child, depth + 1, links, out)?;
  }
  Ok(())
}

fn render_text(
  tree: &FormatTree,
  links: &BookLinks,
  what: &str,
) -> Result<String> {
  to_html(tree, links).wrap_err_with(|| format!("Failed to render {what}"))
}

/// Element id for a `#fragment`.
fn html_id(fragment: &str) -> &str {
  fragment.strip_prefix('#').unwrap_or(fragment)
}
