//! Merging freshly rendered output into the persistent site tree.

use std::{
  fs,
  path::{Path, PathBuf},
};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::{
  error::SitemapError,
  sitemap::{Sitemap, load_sitemap, marker_files},
};

/// Destination directories that rendered output under `src` would replace.
///
/// Each marker's directory is one language of one version, re-rooted from
/// `src` to `dst`. Only directories that already exist are returned.
///
/// # Errors
///
/// Returns an error if `src` cannot be walked.
pub fn stale_dirs(src: &Path, dst: &Path) -> Result<Vec<PathBuf>, SitemapError> {
  let mut stale = Vec::new();

  for marker in marker_files(src)? {
    let Some(site_dir) = marker.parent() else {
      continue;
    };
    let Ok(rel) = site_dir.strip_prefix(src) else {
      continue;
    };
    let target = dst.join(rel);
    if target.exists() && !stale.contains(&target) {
      stale.push(target);
    }
  }

  Ok(stale)
}

/// Remove destination directories about to be replaced by output in `src`.
///
/// In release mode any existing directory is a collision. Every collision
/// is collected first and reported together before anything is deleted.
///
/// # Errors
///
/// Returns [`SitemapError::ReleaseCollision`] in release mode if any
/// destination already exists, or an I/O error if a directory cannot be
/// removed.
pub fn delete_stale(
  src: &Path,
  dst: &Path,
  release: bool,
) -> Result<Vec<PathBuf>, SitemapError> {
  let stale = stale_dirs(src, dst)?;

  if release && !stale.is_empty() {
    return Err(SitemapError::ReleaseCollision { paths: stale });
  }

  for dir in &stale {
    info!("Removing stale output {}", dir.display());
    fs::remove_dir_all(dir).map_err(|source| {
      SitemapError::Io {
        path: dir.clone(),
        source,
      }
    })?;
  }

  Ok(stale)
}

/// Copy every file under `src` into `dst`, creating directories as needed
/// and overwriting existing files.
///
/// # Errors
///
/// Returns an error if `src` cannot be walked or a file cannot be copied.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize, SitemapError> {
  let mut copied = 0;

  for entry in WalkDir::new(src).sort_by_file_name() {
    let entry = entry.map_err(|source| {
      SitemapError::Walk {
        path: src.to_path_buf(),
        source,
      }
    })?;
    let Ok(rel) = entry.path().strip_prefix(src) else {
      continue;
    };
    let target = dst.join(rel);

    let io_err = |source| {
      SitemapError::Io {
        path: target.clone(),
        source,
      }
    };

    if entry.file_type().is_dir() {
      fs::create_dir_all(&target).map_err(io_err)?;
    } else if entry.file_type().is_file() {
      fs::copy(entry.path(), &target).map_err(io_err)?;
      copied += 1;
    }
  }

  debug!("Copied {copied} files from {}", src.display());
  Ok(copied)
}

/// Merge rendered output from `src` into `dst` and rebuild the sitemap.
///
/// Stale destination directories are removed (or reported, in release
/// mode), the new output is copied, and `meta/sitemap.json` plus redirect
/// pages are regenerated from every marker now under `dst`.
///
/// # Errors
///
/// Returns an error on a release collision or any filesystem failure.
pub fn merge(src: &Path, dst: &Path, release: bool) -> Result<Sitemap, SitemapError> {
  if marker_files(src)?.is_empty() {
    warn!("No rendered books found in {}", src.display());
  }

  delete_stale(src, dst, release)?;
  copy_tree(src, dst)?;

  let sitemap = load_sitemap(dst)?;
  sitemap.write(dst)?;
  sitemap.write_redirects(dst)?;

  Ok(sitemap)
}
