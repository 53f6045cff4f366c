#![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]

use std::{fs, path::Path};

use hexdoc::build::{self, BuildOptions, build_langs};
use hexdoc_config::Config;
use serde_json::{Value, json};
use tempfile::TempDir;

const BOOK: &str = "data/hexcasting/patchouli_books/thehexbook";

fn write(root: &Path, rel: &str, value: &Value) {
  let path = root.join(rel);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn fixture() -> TempDir {
  let dir = tempfile::tempdir().unwrap();
  let root = dir.path();

  write(root, &format!("{BOOK}/book.json"), &json!({
    "name": "hexcasting.book.name",
    "landing_text": "Welcome."
  }));
  write(root, &format!("{BOOK}/en_us/categories/basics.json"), &json!({
    "name": "Basics",
    "description": "The $(bold)basics/$.",
    "icon": "minecraft:book"
  }));
  write(root, &format!("{BOOK}/en_us/entries/basics/intro.json"), &json!({
    "name": "Intro",
    "category": "basics",
    "icon": "minecraft:stick",
    "pages": ["Read $(l:basics/intro)this$(/l) first."]
  }));

  write(root, "assets/hexcasting/lang/en_us.json", &json!({
    "hexcasting.book.name": "Hex Book"
  }));
  write(root, "assets/hexcasting/lang/ru_ru.json", &json!({
    "hexcasting.book.name": "Книга заклинаний"
  }));

  dir
}

fn config(resources: &TempDir, site: &TempDir) -> Config {
  Config {
    modid: "hexcasting".to_string(),
    book: "thehexbook".to_string(),
    resource_dirs: vec![resources.path().to_path_buf()],
    output_dir: site.path().join("_site"),
    merge_dir: site.path().join("_site_merged"),
    base_url: "https://example.com/hexdoc".to_string(),
    version: "1.0".to_string(),
    ..Config::default()
  }
}

#[test]
fn test_discovers_langs_from_lang_files() {
  let resources = fixture();
  let site = tempfile::tempdir().unwrap();
  let config = config(&resources, &site);

  assert_eq!(build_langs(&config, &[]), vec!["en_us", "ru_ru"]);
}

#[test]
fn test_build_then_merge_every_language() {
  let resources = fixture();
  let site = tempfile::tempdir().unwrap();
  let config = config(&resources, &site);

  let markers = build::build(&config, &BuildOptions::default()).unwrap();
  assert_eq!(markers.len(), 2);

  let en = fs::read_to_string(
    config.output_dir.join("v/latest/main/en_us/index.html"),
  )
  .unwrap();
  assert!(en.contains("id=\"lang-select\""));

  let ru = fs::read_to_string(
    config.output_dir.join("v/latest/main/ru_ru/index.html"),
  )
  .unwrap();
  assert!(ru.contains("Книга заклинаний"));
  // Untranslated entries fall back to the default language's files.
  assert!(ru.contains("Intro"));

  let sitemap =
    build::merge(&config.output_dir, &config.merge_dir, false).unwrap();
  let latest = &sitemap.versions["latest"];
  assert_eq!(latest.default_lang, "en_us");
  assert_eq!(latest.lang_paths().len(), 2);

  let json: Value = serde_json::from_str(
    &fs::read_to_string(config.merge_dir.join("meta/sitemap.json")).unwrap(),
  )
  .unwrap();
  assert_eq!(
    json["latest"]["langPaths"]["ru_ru"],
    "v/latest/main/ru_ru"
  );

  let root_redirect =
    fs::read_to_string(config.merge_dir.join("index.html")).unwrap();
  assert!(
    root_redirect.contains("https://example.com/hexdoc/v/latest/main/en_us/")
  );
}

#[test]
fn test_broken_language_skipped_unless_release() {
  let resources = fixture();
  fs::write(
    resources.path().join("assets/hexcasting/lang/ru_ru.json"),
    "{ not json",
  )
  .unwrap();
  let site = tempfile::tempdir().unwrap();
  let config = config(&resources, &site);

  let markers = build::build(&config, &BuildOptions::default()).unwrap();
  assert_eq!(markers.len(), 1);
  assert_eq!(markers[0].lang(), "en_us");

  let result = build::build(&config, &BuildOptions {
    release: true,
    ..BuildOptions::default()
  });
  let Err(err) = result else {
    panic!("a release build must fail on a broken language");
  };
  assert!(format!("{err:?}").contains("ru_ru"));
}

#[test]
fn test_language_failing_to_render_is_left_out_of_the_selector() {
  let resources = fixture();
  write(
    resources.path(),
    &format!("{BOOK}/ru_ru/entries/basics/intro.json"),
    &json!({
      "name": "Введение",
      "category": "basics",
      "pages": ["См. $(l:basics/nowhere)ничего$(/l)."]
    }),
  );
  let site = tempfile::tempdir().unwrap();
  let config = config(&resources, &site);

  let markers = build::build(&config, &BuildOptions::default()).unwrap();
  assert_eq!(markers.len(), 1);
  assert_eq!(markers[0].lang(), "en_us");

  let en = fs::read_to_string(
    config.output_dir.join("v/latest/main/en_us/index.html"),
  )
  .unwrap();
  assert!(!en.contains("lang-select"));
  assert!(!config.output_dir.join("v/latest/main/ru_ru/index.html").exists());
}

#[test]
fn test_merge_without_build_output_fails() {
  let site = tempfile::tempdir().unwrap();
  let err = build::merge(
    &site.path().join("missing"),
    &site.path().join("merged"),
    false,
  )
  .unwrap_err();
  assert!(err.to_string().contains("Nothing to merge"));
}
