use std::{
  collections::BTreeSet,
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result};
use hexdoc_book::{Book, Icon, PageContent};
use hexdoc_config::Config;
use hexdoc_core::ResourceLocation;
use hexdoc_templates as templates;
use log::{debug, warn};
use walkdir::WalkDir;

use crate::{postprocess, template::template_content};

/// Write `style.css`, `main.js`, referenced textures and the files of
/// `static_dir` into one rendered site directory.
///
/// # Errors
///
/// Returns an error if any asset cannot be read, processed or written.
pub fn write_assets(
  config: &Config,
  book: &Book,
  site_dir: &Path,
) -> Result<()> {
  fs::create_dir_all(site_dir).wrap_err_with(|| {
    format!("Failed to create site directory {}", site_dir.display())
  })?;

  let postprocess = config.postprocess();
  let template_dir = config.template_dir.as_deref();

  let css =
    template_content(template_dir, "style.css", templates::DEFAULT_CSS)?;
  fs::write(
    site_dir.join("style.css"),
    postprocess::process_css(&css, &postprocess)?,
  )
  .wrap_err("Failed to write style.css")?;

  let js = template_content(template_dir, "main.js", templates::MAIN_JS)?;
  fs::write(site_dir.join("main.js"), js).wrap_err("Failed to write main.js")?;

  copy_textures(&config.resource_dirs, &book_textures(book), site_dir)?;

  if let Some(static_dir) = &config.static_dir {
    copy_static(static_dir, site_dir, config)?;
  }

  Ok(())
}

/// Every texture a book shows: category and entry icons and image pages.
#[must_use]
pub fn book_textures(book: &Book) -> BTreeSet<ResourceLocation> {
  let mut textures = BTreeSet::new();

  let icons = book
    .all_categories()
    .map(|category| &category.icon)
    .chain(book.all_entries().map(|entry| &entry.icon));
  for icon in icons.flatten() {
    if let Icon::Texture { path } = icon {
      textures.insert(path.clone());
    }
  }

  for page in book.all_entries().flat_map(|entry| &entry.pages) {
    if let PageContent::Image { images, .. } = &page.content {
      textures.extend(images.iter().cloned());
    }
  }

  textures
}

/// Location of a texture under a resource root.
fn texture_source(resource_dir: &Path, id: &ResourceLocation) -> PathBuf {
  resource_dir
    .join("assets")
    .join(id.namespace())
    .join(id.path())
}

/// Copy each texture from the last resource root that has it to
/// `textures/<namespace>/<path>` under `site_dir`. Missing textures are
/// logged and skipped.
///
/// # Errors
///
/// Returns an error if a texture exists but cannot be copied.
pub fn copy_textures(
  resource_dirs: &[PathBuf],
  textures: &BTreeSet<ResourceLocation>,
  site_dir: &Path,
) -> Result<usize> {
  let mut copied = 0;

  for id in textures {
    let Some(source) = resource_dirs
      .iter()
      .rev()
      .map(|dir| texture_source(dir, id))
      .find(|path| path.is_file())
    else {
      warn!("Texture not found in any resource directory: {id}");
      continue;
    };

    let dest = site_dir
      .join("textures")
      .join(id.namespace())
      .join(id.path());
    if let Some(parent) = dest.parent() {
      fs::create_dir_all(parent).wrap_err_with(|| {
        format!("Failed to create directory {}", parent.display())
      })?;
    }
    fs::copy(&source, &dest).wrap_err_with(|| {
      format!("Failed to copy texture {}", source.display())
    })?;
    copied += 1;
  }

  debug!("Copied {copied} textures");
  Ok(copied)
}

/// Copy `static_dir` into `site_dir`. Stylesheets go through the CSS
/// postprocessor; everything else is copied byte for byte. Hidden files
/// are skipped.
///
/// # Errors
///
/// Returns an error if a file cannot be read, processed or written.
fn copy_static(
  static_dir: &Path,
  site_dir: &Path,
  config: &Config,
) -> Result<()> {
  if !static_dir.is_dir() {
    return Ok(());
  }

  debug!("Copying static files from {}", static_dir.display());
  let postprocess = config.postprocess();

  let walker = WalkDir::new(static_dir).into_iter().filter_entry(|e| {
    e.depth() == 0
      || e.file_name().to_str().is_none_or(|s| !s.starts_with('.'))
  });

  for entry in walker {
    let entry = entry.wrap_err("Failed to walk static directory")?;
    let path = entry.path();
    let rel_path = path
      .strip_prefix(static_dir)
      .wrap_err("Failed to compute relative path")?;
    let dest_path = site_dir.join(rel_path);

    if entry.file_type().is_dir() {
      fs::create_dir_all(&dest_path).wrap_err_with(|| {
        format!("Failed to create directory {}", dest_path.display())
      })?;
      continue;
    }

    #[allow(
      clippy::filetype_is_file,
      reason = "Symlinks and special files are skipped"
    )]
    if !entry.file_type().is_file() {
      continue;
    }

    let is_css = path
      .extension()
      .is_some_and(|ext| ext.eq_ignore_ascii_case("css"));
    if is_css {
      let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read asset {}", path.display()))?;
      fs::write(&dest_path, postprocess::process_css(&content, &postprocess)?)
        .wrap_err_with(|| {
          format!("Failed to write asset to {}", dest_path.display())
        })?;
    } else {
      fs::copy(path, &dest_path).wrap_err_with(|| {
        format!(
          "Failed to copy asset from {} to {}",
          path.display(),
          dest_path.display()
        )
      })?;
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_later_resource_dirs_win_and_missing_textures_are_skipped() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let site = tempfile::tempdir().unwrap();

    let rel = "assets/hexcasting/textures/gui/icon.png";
    for (dir, content) in [(&first, "first"), (&second, "second")] {
      let path = dir.path().join(rel);
      fs::create_dir_all(path.parent().unwrap()).unwrap();
      fs::write(path, content).unwrap();
    }

    let textures: BTreeSet<ResourceLocation> = [
      "hexcasting:textures/gui/icon.png".parse().unwrap(),
      "hexcasting:textures/gui/missing.png".parse().unwrap(),
    ]
    .into();

    let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
    let copied = copy_textures(&dirs, &textures, site.path()).unwrap();

    assert_eq!(copied, 1);
    let written = site
      .path()
      .join("textures/hexcasting/textures/gui/icon.png");
    assert_eq!(fs::read_to_string(written).unwrap(), "second");
  }
}
