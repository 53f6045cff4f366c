//! Reading JSON data files out of resource directories.

use std::{
  fs,
  path::{Path, PathBuf},
};

use hexdoc_core::ResourceLocation;
use serde_json::Value;
use walkdir::WalkDir;

use crate::error::BookError;

/// Every `.json` file under `dir`, sorted by path. A missing directory has no
/// files.
pub fn json_files(dir: &Path) -> Result<Vec<PathBuf>, BookError> {
  if !dir.is_dir() {
    return Ok(Vec::new());
  }

  let mut files = Vec::new();
  for entry in WalkDir::new(dir).sort_by_file_name() {
    let entry = entry.map_err(|source| {
      BookError::Walk {
        path: dir.to_path_buf(),
        source,
      }
    })?;
    let path = entry.path();
    if entry.file_type().is_file()
      && path.extension().is_some_and(|ext| ext == "json")
    {
      files.push(path.to_path_buf());
    }
  }

  Ok(files)
}

/// Every namespace directory (`<root>/<section>/<namespace>`) in a resource
/// directory, sorted by name.
pub fn namespace_dirs(
  resource_dir: &Path,
  section: &str,
) -> Vec<(String, PathBuf)> {
  let section_dir = resource_dir.join(section);
  let Ok(entries) = fs::read_dir(&section_dir) else {
    return Vec::new();
  };

  let mut dirs: Vec<_> = entries
    .flatten()
    .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
    .filter_map(|entry| {
      let name = entry.file_name().to_str()?.to_string();
      Some((name, entry.path()))
    })
    .collect();
  dirs.sort();
  dirs
}

pub fn read_json(path: &Path) -> Result<Value, BookError> {
  let content = fs::read_to_string(path).map_err(|source| {
    BookError::ReadFile {
      path: path.to_path_buf(),
      source,
    }
  })?;

  serde_json::from_str(&content).map_err(|source| {
    BookError::ParseJson {
      path: path.to_path_buf(),
      source,
    }
  })
}

/// Id of a data file relative to the root of its content directory.
pub fn file_id(
  namespace: &str,
  root: &Path,
  file: &Path,
) -> Result<ResourceLocation, BookError> {
  ResourceLocation::from_file(namespace, root, file).map_err(|source| {
    BookError::InvalidId {
      path: file.to_path_buf(),
      source,
    }
  })
}
