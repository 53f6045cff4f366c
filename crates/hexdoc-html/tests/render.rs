#![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]

use std::{fs, path::Path, sync::Arc};

use hexdoc_book::{Book, BookContext, BookSource, load_book};
use hexdoc_config::Config;
use hexdoc_core::I18n;
use hexdoc_html::{LangLink, SiteOptions, Templates, render_site};
use hexdoc_sitemap::{MARKER_FILE, SitemapMarker};
use hexdoc_text::{FormatOptions, Formatter, LinkOverrides, MacroSet};
use serde_json::{Value, json};
use tempfile::TempDir;

const BOOK: &str = "data/hexcasting/patchouli_books/thehexbook";

fn write(root: &Path, rel: &str, value: &Value) {
  let path = root.join(rel);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn fixture(intro_text: &str) -> TempDir {
  let dir = tempfile::tempdir().unwrap();
  let root = dir.path();

  write(root, &format!("{BOOK}/book.json"), &json!({
    "name": "hexcasting.book.name",
    "landing_text": "Welcome, $(l:basics/intro)caster$(/l)."
  }));
  write(root, &format!("{BOOK}/en_us/categories/basics.json"), &json!({
    "name": "Basics",
    "description": "The $(bold)basics/$.",
    "icon": "hexcasting:textures/gui/basics.png"
  }));
  write(root, &format!("{BOOK}/en_us/entries/basics/intro.json"), &json!({
    "name": "Intro",
    "category": "basics",
    "icon": "minecraft:stick",
    "pages": [
      intro_text,
      {
        "type": "patchouli:crafting",
        "recipe": "hexcasting:staff",
        "title": "Staff",
        "anchor": "staff"
      },
      { "type": "relations", "entries": ["basics/intro"] }
    ]
  }));

  write(root, "data/hexcasting/recipes/staff.json", &json!({
    "type": "minecraft:crafting_shaped",
    "pattern": ["s", "p"],
    "key": {
      "s": { "item": "minecraft:stick" },
      "p": { "item": "minecraft:oak_planks" }
    },
    "result": { "item": "hexcasting:staff" }
  }));

  write(root, "assets/hexcasting/lang/en_us.json", &json!({
    "hexcasting.book.name": "Hex Book",
    "item.minecraft.stick": "Stick",
    "item.hexcasting.staff": "Staff",
    "block.minecraft.oak_planks": "Oak Planks"
  }));

  let texture = root.join("assets/hexcasting/textures/gui/basics.png");
  fs::create_dir_all(texture.parent().unwrap()).unwrap();
  fs::write(texture, b"png").unwrap();

  dir
}

fn load(resources: &TempDir) -> Book {
  let dirs = vec![resources.path().to_path_buf()];
  let source = Arc::new(
    BookSource::open(&dirs, "hexcasting:thehexbook".parse().unwrap()).unwrap(),
  );
  let i18n = I18n::load(&dirs, "en_us", true).unwrap();
  let formatter = Formatter::new(
    FormatOptions {
      book_namespace: "hexcasting".to_string(),
      is_0_black:     false,
    },
    MacroSet::with_defaults(source.macros().clone()).unwrap(),
    LinkOverrides::default(),
  );
  load_book(&BookContext::new(source, i18n, formatter), "en_us").unwrap()
}

fn config(resources: &TempDir, output: &TempDir) -> Config {
  Config {
    resource_dirs: vec![resources.path().to_path_buf()],
    output_dir: output.path().to_path_buf(),
    base_url: "https://example.com/hexdoc".to_string(),
    version: "1.0".to_string(),
    ..Config::default()
  }
}

fn langs() -> Vec<LangLink> {
  vec![LangLink {
    lang: "en_us".to_string(),
    name: "English".to_string(),
  }]
}

#[test]
fn test_render_site_writes_book_assets_and_marker() {
  let resources = fixture("Read $(l:basics/intro#staff)this$(/l) first.");
  let output = tempfile::tempdir().unwrap();
  let config = config(&resources, &output);
  let book = load(&resources);
  let templates = Templates::load(None).unwrap();
  let langs = langs();

  let marker = render_site(&config, &templates, &book, &SiteOptions {
    release:         false,
    branch:          "main",
    is_default_lang: true,
    langs:           &langs,
  })
  .unwrap();

  let site_dir = output.path().join("v/latest/main/en_us");
  let html = fs::read_to_string(site_dir.join("index.html")).unwrap();
  assert!(html.contains("<title>Hex Book</title>"));
  assert!(html.contains("<strong>basics</strong>"));
  assert!(html.contains("class=\"page page-crafting\""));
  assert!(html.contains("Oak Planks"));
  assert!(html.contains("Related Chapters"));

  assert!(site_dir.join("style.css").is_file());
  assert!(site_dir.join("main.js").is_file());
  assert!(
    site_dir
      .join("textures/hexcasting/textures/gui/basics.png")
      .is_file()
  );

  let SitemapMarker::Latest(ref latest) = marker else {
    panic!("expected a latest marker");
  };
  assert_eq!(latest.path, "v/latest/main/en_us");
  assert!(latest.is_default_branch);
  assert!(
    latest
      .redirect_contents
      .contains("https://example.com/hexdoc/v/latest/main/en_us/")
  );
  assert_eq!(SitemapMarker::read(&site_dir.join(MARKER_FILE)).unwrap(), marker);
}

#[test]
fn test_release_site_path_uses_version() {
  let resources = fixture("Hello.");
  let output = tempfile::tempdir().unwrap();
  let config = config(&resources, &output);
  let book = load(&resources);
  let templates = Templates::load(None).unwrap();

  let marker = render_site(&config, &templates, &book, &SiteOptions {
    release:         true,
    branch:          "dev",
    is_default_lang: true,
    langs:           &[],
  })
  .unwrap();

  assert!(matches!(marker, SitemapMarker::Versioned(_)));
  assert_eq!(marker.path(), "v/1.0/en_us");
  assert!(output.path().join("v/1.0/en_us/index.html").is_file());
}

#[test]
fn test_broken_link_names_the_page() {
  let resources = fixture("See $(l:basics/nowhere)nothing$(/l).");
  let output = tempfile::tempdir().unwrap();
  let config = config(&resources, &output);
  let book = load(&resources);
  let templates = Templates::load(None).unwrap();

  let err = render_site(&config, &templates, &book, &SiteOptions {
    release:         false,
    branch:          "main",
    is_default_lang: true,
    langs:           &[],
  })
  .unwrap_err();

  let chain: Vec<String> = err.chain().map(ToString::to_string).collect();
  let message = chain.join(": ");
  assert!(
    message.contains("entry hexcasting:basics/intro page 1"),
    "{message}"
  );
  assert!(message.contains("hexcasting:basics/nowhere"), "{message}");
  assert!(!output.path().join("v/latest/main/en_us/index.html").exists());
}
