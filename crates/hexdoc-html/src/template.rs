use std::{fs, path::Path};

use color_eyre::eyre::{Context, Result};
use log::debug;
use serde::Serialize;
use tera::Tera;

use crate::view::{BookView, PageView};

/// Metadata about where a book is rendered, exposed to `book.html` as
/// `site`.
#[derive(Debug, Clone, Serialize)]
pub struct SiteView<'a> {
  pub path:              &'a str,
  pub base_url:          &'a str,
  pub version:           &'a str,
  pub full_version:      &'a str,
  pub minecraft_version: Option<&'a str>,
  pub branch:            &'a str,
  pub release:           bool,
}

/// One language of the current build, for the language switcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LangLink {
  pub lang: String,
  pub name: String,
}

/// The tera templates of one build, with user overrides applied.
pub struct Templates {
  tera: Tera,
}

impl Templates {
  /// Load every embedded HTML template, preferring a file of the same name
  /// under `template_dir`.
  ///
  /// # Errors
  ///
  /// Returns an error if an override cannot be read or a template does not
  /// parse.
  pub fn load(template_dir: Option<&Path>) -> Result<Self> {
    let templates = hexdoc_templates::html_templates()
      .into_iter()
      .map(|(name, fallback)| {
        template_content(template_dir, name, fallback).map(|c| (name, c))
      })
      .collect::<Result<Vec<_>>>()?;

    let mut tera = Tera::default();
    tera
      .add_raw_templates(templates)
      .wrap_err("Failed to parse templates")?;

    Ok(Self { tera })
  }

  /// Render one page with its type's template.
  ///
  /// # Errors
  ///
  /// Returns an error if the template fails to render.
  pub fn render_page(&self, page: &PageView) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("page", page);
    self
      .tera
      .render(&page.template, &context)
      .wrap_err_with(|| format!("Failed to render {}", page.template))
  }

  /// Render the whole book. Pages must already be rendered.
  ///
  /// # Errors
  ///
  /// Returns an error if `book.html` fails to render.
  pub fn render_book(
    &self,
    book: &BookView,
    site: &SiteView,
    langs: &[LangLink],
  ) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("book", book);
    context.insert("site", site);
    context.insert("langs", langs);
    self
      .tera
      .render("book.html", &context)
      .wrap_err("Failed to render book.html")
  }

  /// Render a page that sends the browser to `href`.
  ///
  /// # Errors
  ///
  /// Returns an error if `redirect.html` fails to render.
  pub fn render_redirect(&self, href: &str, title: &str) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("href", href);
    context.insert("title", title);
    self
      .tera
      .render("redirect.html", &context)
      .wrap_err("Failed to render redirect.html")
  }
}

/// Read `name` from the template directory if it exists there, otherwise
/// use the embedded `fallback`.
///
/// # Errors
///
/// Returns an error if the override exists but cannot be read.
pub fn template_content(
  template_dir: Option<&Path>,
  name: &str,
  fallback: &str,
) -> Result<String> {
  if let Some(dir) = template_dir {
    let path = dir.join(name);
    if path.is_file() {
      debug!("Using template override {}", path.display());
      return fs::read_to_string(&path).wrap_err_with(|| {
        format!("Failed to read template file: {}", path.display())
      });
    }
  }
  Ok(fallback.to_string())
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_embedded_templates_parse() {
    let templates = Templates::load(None).unwrap();
    let html = templates
      .render_redirect("https://example.com/v/1.0/en_us/", "Hex Book")
      .unwrap();
    assert!(html.contains("url=https://example.com/v/1.0/en_us/"));
    assert!(html.contains("Hex Book"));
  }

  #[test]
  fn test_override_replaces_embedded_template() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("redirect.html"), "go to {{ href | safe }}")
      .unwrap();

    let templates = Templates::load(Some(dir.path())).unwrap();
    assert_eq!(
      templates.render_redirect("/v/latest/main/en_us/", "x").unwrap(),
      "go to /v/latest/main/en_us/"
    );
  }
}
