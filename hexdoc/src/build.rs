//! The build pipeline: load the book once per language, render it, and
//! merge rendered books into the versioned site.

use std::{path::Path, sync::Arc};

use color_eyre::eyre::{Context, Result, bail};
use hexdoc_book::{BookContext, BookSource, load_book};
use hexdoc_config::Config;
use hexdoc_core::{I18n, discover_langs};
use hexdoc_html::{LangLink, SiteOptions, Templates, render_site};
use hexdoc_sitemap::{Sitemap, SitemapMarker};
use hexdoc_text::{FormatOptions, Formatter};
use log::{error, info, warn};

/// Options of one `build` run.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
  pub release: bool,
  /// Branch of unreleased docs. Defaults to the configured branch.
  pub branch:  Option<String>,
  /// Languages to render. Defaults to the configured languages.
  pub langs:   Vec<String>,
}

/// Languages to render: the requested ones, else the configured ones, else
/// every language with a lang file. The default language always comes first
/// and the rest are sorted.
#[must_use]
pub fn build_langs(config: &Config, requested: &[String]) -> Vec<String> {
  let mut langs = if !requested.is_empty() {
    requested.to_vec()
  } else if !config.langs.is_empty() {
    config.langs.clone()
  } else {
    discover_langs(&config.resource_dirs)
  };

  langs.retain(|lang| lang != &config.default_lang);
  langs.sort();
  langs.dedup();
  langs.insert(0, config.default_lang.clone());
  langs
}

/// Render the book in every language.
///
/// The default language is rendered first. Failure in any other language is
/// logged and that language skipped, unless this is a release build.
///
/// # Errors
///
/// Returns an error if the book cannot be opened or if the default language,
/// or any language of a release build, fails to render.
pub fn build(
  config: &Config,
  options: &BuildOptions,
) -> Result<Vec<SitemapMarker>> {
  let book_id = config.book_id()?;
  let branch = options.branch.as_deref().unwrap_or(&config.branch);
  let langs = build_langs(config, &options.langs);
  info!(
    "Building {book_id} ({}) in {} languages",
    if options.release {
      format!("release {}", config.version)
    } else {
      format!("branch {branch}")
    },
    langs.len()
  );

  let source = Arc::new(
    BookSource::open(&config.resource_dirs, book_id.clone())
      .wrap_err_with(|| format!("Failed to open book {book_id}"))?,
  );
  let templates = Templates::load(config.template_dir.as_deref())?;
  let spoilers = config.spoiler_matcher()?;
  let formatter = Formatter::new(
    FormatOptions {
      book_namespace: book_id.namespace().to_string(),
      is_0_black:     config.text.is_0_black,
    },
    config.text.macro_set(source.macros())?,
    config.links.link_overrides()?,
  );

  let default_i18n = I18n::load(
    &config.resource_dirs,
    &config.default_lang,
    config.text.allow_missing,
  )
  .wrap_err("Failed to load default language")?;

  let mut tables = Vec::with_capacity(langs.len());
  for lang in &langs {
    if lang == &config.default_lang {
      tables.push(default_i18n.clone());
      continue;
    }
    match I18n::load(&config.resource_dirs, lang, config.text.allow_missing) {
      Ok(i18n) => tables.push(i18n.with_fallback(&default_i18n)),
      Err(err) if !options.release => {
        error!("Skipping language {lang}: {err}");
      },
      Err(err) => {
        return Err(err).wrap_err_with(|| format!("Failed to load {lang}"));
      },
    }
  }

  let mut books = Vec::with_capacity(tables.len());
  for i18n in tables {
    let lang = i18n.lang().to_string();
    let context =
      BookContext::new(Arc::clone(&source), i18n, formatter.clone())
        .with_spoilers(spoilers.clone());

    match load_book(&context, &config.default_lang) {
      Ok(book) => books.push(book),
      Err(err) if lang != config.default_lang && !options.release => {
        error!("Skipping language {lang}: {err}");
      },
      Err(err) => {
        return Err(err)
          .wrap_err_with(|| format!("Failed to load book in {lang}"));
      },
    }
  }

  // Only rendered languages appear in the language selector. A failed
  // language is dropped and the rest are rendered again without it.
  let mut markers = Vec::with_capacity(books.len());
  loop {
    let lang_links: Vec<LangLink> = books
      .iter()
      .map(|book| {
        LangLink {
          lang: book.lang.clone(),
          name: book.lang_name.clone(),
        }
      })
      .collect();

    markers.clear();
    let mut failed = Vec::new();
    for book in &books {
      let is_default_lang = book.lang == config.default_lang;
      let result = render_site(config, &templates, book, &SiteOptions {
        release: options.release,
        branch,
        is_default_lang,
        langs: &lang_links,
      });

      match result {
        Ok(marker) => markers.push(marker),
        Err(err) if !is_default_lang && !options.release => {
          error!("Skipping language {}: {err:?}", book.lang);
          failed.push(book.lang.clone());
        },
        Err(err) => return Err(err),
      }
    }

    if failed.is_empty() {
      break;
    }
    books.retain(|book| !failed.contains(&book.lang));
    warn!("Rendering again without {}", failed.join(", "));
  }

  if markers.len() < langs.len() {
    warn!("Rendered {} of {} languages", markers.len(), langs.len());
  } else {
    info!("Rendered {} languages", markers.len());
  }

  Ok(markers)
}

/// Merge rendered books from `src` into `dst`.
///
/// # Errors
///
/// Returns an error if `src` does not exist, a release would overwrite an
/// existing book, or the merge fails.
pub fn merge(src: &Path, dst: &Path, release: bool) -> Result<Sitemap> {
  if !src.is_dir() {
    bail!("Nothing to merge: {} does not exist", src.display());
  }

  info!("Merging {} into {}", src.display(), dst.display());
  let sitemap = hexdoc_sitemap::merge(src, dst, release).wrap_err_with(|| {
    format!("Failed to merge {} into {}", src.display(), dst.display())
  })?;

  info!("Sitemap now lists {} versions", sitemap.versions.len());
  Ok(sitemap)
}
