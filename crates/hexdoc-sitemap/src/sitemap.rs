use std::{
  collections::BTreeMap,
  fs,
  path::{Path, PathBuf},
};

use log::{debug, info};
use serde::{Serialize, Serializer};
use walkdir::WalkDir;

use crate::{
  error::SitemapError,
  marker::{LATEST, MARKER_FILE, SitemapMarker},
};

/// Every language rendered for one version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapItem {
  pub default_lang: String,
  pub default_path: String,
  pub markers:      BTreeMap<String, SitemapMarker>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SitemapItemJson<'a> {
  default_lang: &'a str,
  default_path: &'a str,
  lang_names:   BTreeMap<&'a str, &'a str>,
  lang_paths:   BTreeMap<&'a str, &'a str>,
  markers:      &'a BTreeMap<String, SitemapMarker>,
}

impl Serialize for SitemapItem {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    SitemapItemJson {
      default_lang: &self.default_lang,
      default_path: &self.default_path,
      lang_names:   self.lang_names(),
      lang_paths:   self.lang_paths(),
      markers:      &self.markers,
    }
    .serialize(serializer)
  }
}

impl SitemapItem {
  /// Add a marker, keeping whichever marker for its language has the higher
  /// [`priority`](SitemapMarker::priority). On a tie the marker already
  /// present is kept. A winning default-language marker sets the default
  /// language and path.
  ///
  /// Returns whether the marker was kept.
  pub fn add_marker(&mut self, marker: SitemapMarker) -> bool {
    let wins = self
      .markers
      .get(marker.lang())
      .is_none_or(|existing| marker.priority() > existing.priority());

    if !wins {
      debug!(
        "Keeping existing {} marker over {}",
        marker.lang(),
        marker.path()
      );
      return false;
    }

    if marker.is_default_lang() {
      self.default_lang = marker.lang().to_string();
      self.default_path = marker.path().to_string();
    }
    self.markers.insert(marker.lang().to_string(), marker);
    true
  }

  #[must_use]
  pub fn lang_names(&self) -> BTreeMap<&str, &str> {
    self
      .markers
      .iter()
      .map(|(lang, marker)| (lang.as_str(), marker.lang_name()))
      .collect()
  }

  #[must_use]
  pub fn lang_paths(&self) -> BTreeMap<&str, &str> {
    self
      .markers
      .iter()
      .map(|(lang, marker)| (lang.as_str(), marker.path()))
      .collect()
  }

  /// The marker of the default language.
  #[must_use]
  pub fn default_marker(&self) -> Option<&SitemapMarker> {
    self.markers.get(&self.default_lang)
  }
}

/// The merged sitemap, by version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Sitemap {
  pub versions: BTreeMap<String, SitemapItem>,
}

impl Sitemap {
  /// Fold a marker into the item for its version.
  pub fn add_marker(&mut self, marker: SitemapMarker) -> bool {
    self
      .versions
      .entry(marker.version().to_string())
      .or_default()
      .add_marker(marker)
  }

  /// The version the site root should redirect to: the newest released
  /// version by dotted numeric comparison, or `latest` when nothing has
  /// been released.
  #[must_use]
  pub fn newest_version(&self) -> Option<&str> {
    self
      .versions
      .keys()
      .filter(|version| version.as_str() != LATEST)
      .max_by(|a, b| {
        version_key(a)
          .cmp(&version_key(b))
          .then_with(|| is_plain(a).cmp(&is_plain(b)))
      })
      .or_else(|| self.versions.keys().find(|v| v.as_str() == LATEST))
      .map(String::as_str)
  }

  /// Write `meta/sitemap.json` under `root`.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be written.
  pub fn write(&self, root: &Path) -> Result<PathBuf, SitemapError> {
    let meta = root.join("meta");
    fs::create_dir_all(&meta).map_err(|source| {
      SitemapError::Io {
        path: meta.clone(),
        source,
      }
    })?;

    let path = meta.join("sitemap.json");
    let json = serde_json::to_string_pretty(self).map_err(|source| {
      SitemapError::Serialize {
        what: "sitemap",
        source,
      }
    })?;
    fs::write(&path, json).map_err(|source| {
      SitemapError::Io {
        path: path.clone(),
        source,
      }
    })?;

    info!("Wrote sitemap with {} versions", self.versions.len());
    Ok(path)
  }

  /// Write redirect pages: `index.html` in the parent directory of every
  /// default-language site path, and one at `root` pointing at
  /// [`Self::newest_version`].
  ///
  /// # Errors
  ///
  /// Returns an error if a redirect cannot be written.
  pub fn write_redirects(&self, root: &Path) -> Result<(), SitemapError> {
    for item in self.versions.values() {
      for marker in item.markers.values().filter(|m| m.is_default_lang()) {
        let Some(parent) = Path::new(marker.path()).parent() else {
          continue;
        };
        write_redirect(&root.join(parent), marker.redirect_contents())?;
      }
    }

    if let Some(marker) = self
      .newest_version()
      .and_then(|version| self.versions.get(version))
      .and_then(SitemapItem::default_marker)
    {
      info!("Site root redirects to {}", marker.path());
      write_redirect(root, marker.redirect_contents())?;
    }

    Ok(())
  }
}

fn write_redirect(dir: &Path, contents: &str) -> Result<(), SitemapError> {
  fs::create_dir_all(dir).map_err(|source| {
    SitemapError::Io {
      path: dir.to_path_buf(),
      source,
    }
  })?;
  let path = dir.join("index.html");
  debug!("Writing redirect {}", path.display());
  fs::write(&path, contents).map_err(|source| SitemapError::Io { path, source })
}

/// Numeric parts of a dotted version. `0.11.1-pre` compares as `[0, 11, 1]`.
fn version_key(version: &str) -> Vec<u64> {
  version
    .split('.')
    .map(|part| {
      let digits: String =
        part.chars().take_while(char::is_ascii_digit).collect();
      digits.parse().unwrap_or(0)
    })
    .collect()
}

/// Plain versions sort above suffixed ones with the same numbers.
fn is_plain(version: &str) -> bool {
  version.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// Every marker file under `root`, sorted by path.
///
/// # Errors
///
/// Returns an error if the tree cannot be walked.
pub fn marker_files(root: &Path) -> Result<Vec<PathBuf>, SitemapError> {
  if !root.is_dir() {
    return Ok(Vec::new());
  }

  let mut files = Vec::new();
  for entry in WalkDir::new(root).sort_by_file_name() {
    let entry = entry.map_err(|source| {
      SitemapError::Walk {
        path: root.to_path_buf(),
        source,
      }
    })?;
    if entry.file_type().is_file() && entry.file_name() == MARKER_FILE {
      files.push(entry.into_path());
    }
  }
  Ok(files)
}

/// Build the sitemap from every marker file under `root`.
///
/// # Errors
///
/// Returns an error if a marker cannot be read or parsed.
pub fn load_sitemap(root: &Path) -> Result<Sitemap, SitemapError> {
  let mut sitemap = Sitemap::default();
  for path in marker_files(root)? {
    debug!("Found marker {}", path.display());
    sitemap.add_marker(SitemapMarker::read(&path)?);
  }
  Ok(sitemap)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;
  use crate::marker::{LatestMarker, VersionedMarker};

  fn latest(lang: &str, branch: &str, is_default_branch: bool) -> SitemapMarker {
    SitemapMarker::Latest(LatestMarker {
      version: LATEST.to_string(),
      lang: lang.to_string(),
      lang_name: lang.to_uppercase(),
      path: format!("v/latest/{branch}/{lang}"),
      is_default_lang: lang == "en_us",
      full_version: "1.0.0".to_string(),
      minecraft_version: None,
      redirect_contents: format!("to {branch}/{lang}"),
      branch: branch.to_string(),
      is_default_branch,
    })
  }

  fn versioned(version: &str, lang: &str) -> SitemapMarker {
    SitemapMarker::Versioned(VersionedMarker {
      version: version.to_string(),
      lang: lang.to_string(),
      lang_name: lang.to_uppercase(),
      path: format!("v/{version}/{lang}"),
      is_default_lang: lang == "en_us",
      full_version: version.to_string(),
      minecraft_version: Some("1.20.1".to_string()),
      redirect_contents: format!("to {version}/{lang}"),
    })
  }

  #[test]
  fn test_default_branch_wins_in_either_order() {
    let main = latest("en_us", "main", true);
    let dev = latest("en_us", "dev", false);

    let mut first = SitemapItem::default();
    first.add_marker(main.clone());
    first.add_marker(dev.clone());

    let mut second = SitemapItem::default();
    second.add_marker(dev);
    second.add_marker(main.clone());

    assert_eq!(first, second);
    assert_eq!(first.markers["en_us"], main);
    assert_eq!(first.default_path, "v/latest/main/en_us");
  }

  #[test]
  fn test_ties_keep_the_earlier_marker() {
    let mut item = SitemapItem::default();
    assert!(item.add_marker(latest("en_us", "a", false)));
    assert!(!item.add_marker(latest("en_us", "b", false)));
    assert_eq!(item.default_path, "v/latest/a/en_us");
  }

  #[test]
  fn test_versioned_beats_latest() {
    let mut item = SitemapItem::default();
    item.add_marker(latest("en_us", "main", true));
    item.add_marker(versioned("latest", "en_us"));
    assert!(matches!(
      item.markers["en_us"],
      SitemapMarker::Versioned(_)
    ));
  }

  #[test]
  fn test_lang_tables_and_json_shape() {
    let mut sitemap = Sitemap::default();
    sitemap.add_marker(versioned("1.0", "en_us"));
    sitemap.add_marker(versioned("1.0", "ru_ru"));

    let value = serde_json::to_value(&sitemap).unwrap();
    let item = &value["1.0"];
    assert_eq!(item["defaultLang"], "en_us");
    assert_eq!(item["defaultPath"], "v/1.0/en_us");
    assert_eq!(item["langNames"]["ru_ru"], "RU_RU");
    assert_eq!(item["langPaths"]["ru_ru"], "v/1.0/ru_ru");
    assert_eq!(item["markers"]["en_us"]["lang"], "en_us");
  }

  #[test]
  fn test_newest_version_is_numeric() {
    let mut sitemap = Sitemap::default();
    assert_eq!(sitemap.newest_version(), None);

    sitemap.add_marker(latest("en_us", "main", true));
    assert_eq!(sitemap.newest_version(), Some("latest"));

    sitemap.add_marker(versioned("0.9.3", "en_us"));
    sitemap.add_marker(versioned("0.10.0", "en_us"));
    sitemap.add_marker(versioned("0.10.0-pre", "ru_ru"));
    assert_eq!(sitemap.newest_version(), Some("0.10.0"));
  }
}
