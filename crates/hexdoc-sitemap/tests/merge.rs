#![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]

use std::{fs, path::Path};

use hexdoc_sitemap::{
  LATEST,
  LatestMarker,
  SitemapError,
  SitemapMarker,
  VersionedMarker,
  load_sitemap,
  merge,
  site_path,
};

fn render(root: &Path, marker: &SitemapMarker, body: &str) {
  let dir = root.join(marker.path());
  fs::create_dir_all(&dir).unwrap();
  fs::write(dir.join("index.html"), body).unwrap();
  marker.write(&dir).unwrap();
}

fn release(version: &str, lang: &str) -> SitemapMarker {
  SitemapMarker::Versioned(VersionedMarker {
    version:           version.to_string(),
    lang:              lang.to_string(),
    lang_name:         lang.to_string(),
    path:              site_path(true, version, "main", lang),
    is_default_lang:   lang == "en_us",
    full_version:      version.to_string(),
    minecraft_version: None,
    redirect_contents: format!("redirect {version} {lang}"),
  })
}

fn branch(name: &str, lang: &str) -> SitemapMarker {
  SitemapMarker::Latest(LatestMarker {
    version:           LATEST.to_string(),
    lang:              lang.to_string(),
    lang_name:         lang.to_string(),
    path:              site_path(false, LATEST, name, lang),
    is_default_lang:   lang == "en_us",
    full_version:      "1.1.0.dev0".to_string(),
    minecraft_version: None,
    redirect_contents: format!("redirect {name} {lang}"),
    branch:            name.to_string(),
    is_default_branch: name == "main",
  })
}

#[test]
fn test_merge_writes_sitemap_and_redirects() {
  let src = tempfile::tempdir().unwrap();
  let dst = tempfile::tempdir().unwrap();

  render(src.path(), &release("1.0", "en_us"), "one");
  render(src.path(), &release("1.0", "ru_ru"), "один");
  render(src.path(), &branch("main", "en_us"), "main");

  let sitemap = merge::merge(src.path(), dst.path(), false).unwrap();
  assert_eq!(sitemap.versions.len(), 2);

  let json = fs::read_to_string(dst.path().join("meta/sitemap.json")).unwrap();
  let value: serde_json::Value = serde_json::from_str(&json).unwrap();
  assert_eq!(value["1.0"]["defaultPath"], "v/1.0/en_us");
  assert_eq!(value["latest"]["langPaths"]["en_us"], "v/latest/main/en_us");

  assert_eq!(
    fs::read_to_string(dst.path().join("index.html")).unwrap(),
    "redirect 1.0 en_us"
  );
  assert_eq!(
    fs::read_to_string(dst.path().join("v/1.0/index.html")).unwrap(),
    "redirect 1.0 en_us"
  );
  assert_eq!(
    fs::read_to_string(dst.path().join("v/latest/main/index.html")).unwrap(),
    "redirect main en_us"
  );
}

#[test]
fn test_release_collision_leaves_destination_untouched() {
  let src = tempfile::tempdir().unwrap();
  let dst = tempfile::tempdir().unwrap();

  render(dst.path(), &release("1.0", "en_us"), "old");
  render(dst.path(), &release("1.0", "ru_ru"), "старый");
  render(src.path(), &release("1.0", "en_us"), "new");
  render(src.path(), &release("1.0", "ru_ru"), "новый");

  let err = merge::merge(src.path(), dst.path(), true).unwrap_err();
  let SitemapError::ReleaseCollision { paths } = &err else {
    panic!("expected a release collision, got {err}");
  };
  assert_eq!(paths.len(), 2);

  assert_eq!(
    fs::read_to_string(dst.path().join("v/1.0/en_us/index.html")).unwrap(),
    "old"
  );
  assert!(!dst.path().join("meta/sitemap.json").exists());
}

#[test]
fn test_unreleased_merge_replaces_stale_output() {
  let src = tempfile::tempdir().unwrap();
  let dst = tempfile::tempdir().unwrap();

  render(dst.path(), &branch("main", "en_us"), "old");
  fs::write(dst.path().join("v/latest/main/en_us/removed.html"), "gone").unwrap();
  render(dst.path(), &branch("dev", "en_us"), "dev");
  render(src.path(), &branch("main", "en_us"), "new");

  merge::merge(src.path(), dst.path(), false).unwrap();

  let main = dst.path().join("v/latest/main/en_us");
  assert_eq!(fs::read_to_string(main.join("index.html")).unwrap(), "new");
  assert!(!main.join("removed.html").exists());

  // Other branches are not part of this merge.
  assert!(dst.path().join("v/latest/dev/en_us/index.html").exists());

  let sitemap = load_sitemap(dst.path()).unwrap();
  let marker = &sitemap.versions[LATEST].markers["en_us"];
  assert_eq!(marker.path(), "v/latest/main/en_us");
}
