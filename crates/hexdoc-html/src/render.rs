use std::fs;

use color_eyre::eyre::{Context, Result};
use hexdoc_book::Book;
use hexdoc_config::Config;
use hexdoc_sitemap::{
  LATEST,
  LatestMarker,
  SitemapMarker,
  VersionedMarker,
  site_path,
};
use log::info;

use crate::{
  assets::write_assets,
  postprocess::process_html,
  template::{LangLink, SiteView, Templates},
  view::BookView,
};

/// How one language of the book is rendered.
#[derive(Debug, Clone)]
pub struct SiteOptions<'a> {
  pub release:         bool,
  pub branch:          &'a str,
  pub is_default_lang: bool,
  /// Every language built in this run.
  pub langs:           &'a [LangLink],
}

/// Absolute link to a rendered site path, used by redirect pages.
#[must_use]
pub fn redirect_href(base_url: &str, path: &str) -> String {
  format!("{}/{path}/", base_url.trim_end_matches('/'))
}

/// Render `book` into its site directory under `output_dir`: `index.html`,
/// assets, and the sitemap marker that the merge step reads back.
///
/// # Errors
///
/// Returns an error if the book contains a broken link, a template fails,
/// or any file cannot be written.
pub fn render_site(
  config: &Config,
  templates: &Templates,
  book: &Book,
  site: &SiteOptions,
) -> Result<SitemapMarker> {
  let path = site_path(site.release, &config.version, site.branch, &book.lang);
  let site_dir = config.output_dir.join(&path);
  info!("Rendering {} to {}", book.lang, site_dir.display());

  let mut view = BookView::new(book)
    .wrap_err_with(|| format!("Failed to render book in {}", book.lang))?;
  for page in view.pages_mut() {
    page.html = templates.render_page(page)?;
  }

  let version = if site.release {
    config.version.as_str()
  } else {
    LATEST
  };
  let site_view = SiteView {
    path: &path,
    base_url: &config.base_url,
    version,
    full_version: config.full_version(),
    minecraft_version: config.minecraft_version.as_deref(),
    branch: site.branch,
    release: site.release,
  };

  let html = templates.render_book(&view, &site_view, site.langs)?;
  fs::create_dir_all(&site_dir).wrap_err_with(|| {
    format!("Failed to create site directory {}", site_dir.display())
  })?;
  fs::write(
    site_dir.join("index.html"),
    process_html(&html, &config.postprocess()),
  )
  .wrap_err("Failed to write index.html")?;

  write_assets(config, book, &site_dir)?;

  let redirect_contents = templates
    .render_redirect(&redirect_href(&config.base_url, &path), &book.name)?;

  let marker = if site.release {
    SitemapMarker::Versioned(VersionedMarker {
      version: version.to_string(),
      lang: book.lang.clone(),
      lang_name: book.lang_name.clone(),
      path,
      is_default_lang: site.is_default_lang,
      full_version: config.full_version().to_string(),
      minecraft_version: config.minecraft_version.clone(),
      redirect_contents,
    })
  } else {
    SitemapMarker::Latest(LatestMarker {
      version: version.to_string(),
      lang: book.lang.clone(),
      lang_name: book.lang_name.clone(),
      path,
      is_default_lang: site.is_default_lang,
      full_version: config.full_version().to_string(),
      minecraft_version: config.minecraft_version.clone(),
      redirect_contents,
      branch: site.branch.to_string(),
      is_default_branch: site.branch == config.default_branch,
    })
  };

  marker
    .write(&site_dir)
    .wrap_err("Failed to write sitemap marker")?;
  Ok(marker)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_redirect_href() {
    assert_eq!(
      redirect_href("https://hexdoc.dev/", "v/1.0/en_us"),
      "https://hexdoc.dev/v/1.0/en_us/"
    );
    assert_eq!(redirect_href("", "v/latest/main/en_us"), "/v/latest/main/en_us/");
  }
}
