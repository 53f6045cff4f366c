use std::{
  fs,
  path::{Path, PathBuf},
  sync::OnceLock,
};

use globset::{Glob, GlobSet, GlobSetBuilder};
use hexdoc_core::ResourceLocation;
use hexdoc_macros::Configurable;
use serde::{Deserialize, Serialize};

use crate::{
  error::ConfigError,
  links::LinksConfig,
  postprocess::PostprocessConfig,
  text::TextConfig,
};

/// Configuration for the hexdoc book generator.
///
/// [`Config`] holds every option for rendering a Patchouli book to a static
/// site: where the game data lives, which book and languages to render,
/// version information for the sitemap, and text, link and postprocessing
/// settings. Fields are loaded from a TOML or JSON config file and can be
/// overridden with `--config KEY=VALUE`.
#[derive(Debug, Clone, Serialize, Deserialize, Configurable)]
#[serde(default)]
pub struct Config {
  /// Mod id, used for the page title.
  #[config(key = "modid")]
  pub modid: String,

  /// Id of the Patchouli book to render.
  #[config(key = "book")]
  pub book: String,

  /// Resource roots containing `assets/` and `data/`. Later roots override
  /// earlier ones.
  #[config(key = "resource_dirs")]
  pub resource_dirs: Vec<PathBuf>,

  /// Output directory for rendered books.
  #[config(key = "output_dir")]
  pub output_dir: PathBuf,

  /// Directory the versioned site is merged into.
  #[config(key = "merge_dir")]
  pub merge_dir: PathBuf,

  /// Public URL of the merged site.
  #[config(key = "base_url")]
  pub base_url: String,

  /// Language rendered first, whose failure always aborts the build.
  #[config(key = "default_lang")]
  pub default_lang: String,

  /// Languages to render. Empty means every language with a lang file.
  #[config(key = "langs")]
  pub langs: Vec<String>,

  /// Mod version.
  #[config(key = "version")]
  pub version: String,

  /// Full version string shown on the page. Defaults to `version`.
  #[config(key = "full_version", allow_empty)]
  pub full_version: Option<String>,

  /// Minecraft version the mod targets.
  #[config(key = "minecraft_version", allow_empty)]
  pub minecraft_version: Option<String>,

  /// Git branch of this build.
  #[config(key = "branch")]
  pub branch: String,

  /// Branch whose unreleased docs win over other branches in the sitemap.
  #[config(key = "default_branch")]
  pub default_branch: String,

  /// Directory of template overrides.
  #[config(key = "template_dir", allow_empty)]
  pub template_dir: Option<PathBuf>,

  /// Directory whose files are copied into every rendered book.
  #[config(key = "static_dir", allow_empty)]
  pub static_dir: Option<PathBuf>,

  /// Glob patterns of advancements whose entries are hidden as spoilers.
  #[config(key = "spoilered_advancements")]
  pub spoilered_advancements: Vec<String>,

  /// Text formatting.
  #[config(nested)]
  pub text: TextConfig,

  /// Link handling.
  #[config(nested)]
  pub links: LinksConfig,

  /// Postprocessing configuration for HTML/CSS minification
  #[config(nested)]
  pub postprocess: Option<PostprocessConfig>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      modid:                  "hexdoc".to_string(),
      book:                   "hexdoc:book".to_string(),
      resource_dirs:          vec![PathBuf::from("resources")],
      output_dir:             PathBuf::from("_site"),
      merge_dir:              PathBuf::from("_site_merged"),
      base_url:               String::new(),
      default_lang:           "en_us".to_string(),
      langs:                  Vec::new(),
      version:                "0.0.0".to_string(),
      full_version:           None,
      minecraft_version:      None,
      branch:                 "main".to_string(),
      default_branch:         "main".to_string(),
      template_dir:           None,
      static_dir:             None,
      spoilered_advancements: Vec::new(),
      text:                   TextConfig::default(),
      links:                  LinksConfig::default(),
      postprocess:            None,
    }
  }
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| {
      ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
      }
    })?;

    let ext = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase);

    match ext.as_deref() {
      Some("json") => {
        serde_json::from_str(&content).map_err(|source| {
          ConfigError::Json {
            path: path.to_path_buf(),
            source,
          }
        })
      },
      Some("toml") => {
        toml::from_str(&content).map_err(|source| {
          ConfigError::Toml {
            path: path.to_path_buf(),
            source,
          }
        })
      },
      _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
  }

  /// Load configuration from files and `KEY=VALUE` overrides.
  ///
  /// Explicit config files are merged in order. Without any, a config file
  /// is searched for in the working directory, falling back to defaults.
  /// Overrides are applied last and the result is validated.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded, an override is malformed,
  /// or validation fails.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged_config = Self::from_file(first)?;

      for config_path in rest {
        merged_config.merge(Self::from_file(config_path)?);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }

      merged_config
    } else if let Some(discovered_config) = Self::find_config_file() {
      log::info!(
        "Using discovered config file: {}",
        discovered_config.display()
      );
      Self::from_file(&discovered_config)?
    } else {
      log::warn!("No config file found, using defaults");
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    config.validate()?;

    Ok(config)
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// Nested keys use dots (`text.is_0_black=true`), map entries use the map
  /// key after the field (`links.overrides.hexal:*=https://...`), and list
  /// fields take a comma separated value.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str
        .split_once('=')
        .ok_or_else(|| ConfigError::InvalidOverride(override_str.clone()))?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: Other's [`Some`] value replaces this config's
  ///   value
  /// - [`Vec<T>`] fields: Other's vec is appended to this config's vec
  /// - Map fields: Other's entries are merged in (can override individual
  ///   keys)
  /// - Nested sections: merged field by field with the same rules
  /// - Plain fields (String, bool, etc.): Other's value always replaces
  pub fn merge(&mut self, other: Self) {
    self.merge_fields(other);
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let config_filenames = [
          "hexdoc.toml",
          "hexdoc.json",
          ".hexdoc.toml",
          ".hexdoc.json",
          ".config/hexdoc.toml",
          ".config/hexdoc.json",
        ];

        let current_dir = std::env::current_dir().ok()?;
        config_filenames
          .iter()
          .map(|filename| current_dir.join(filename))
          .find(|path| path.exists())
      })
      .clone()
  }

  /// Id of the book to render.
  ///
  /// # Errors
  ///
  /// Returns an error if `book` is not a valid resource location.
  pub fn book_id(&self) -> Result<ResourceLocation, ConfigError> {
    ResourceLocation::parse_with_default(&self.book, &self.modid).map_err(
      |source| {
        ConfigError::InvalidBook {
          value: self.book.clone(),
          source,
        }
      },
    )
  }

  /// The version string shown on rendered pages.
  #[must_use]
  pub fn full_version(&self) -> &str {
    self.full_version.as_deref().unwrap_or(&self.version)
  }

  /// Compile the spoilered advancement patterns.
  ///
  /// # Errors
  ///
  /// Returns an error if a pattern is not a valid glob.
  pub fn spoiler_matcher(&self) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in &self.spoilered_advancements {
      let glob = Glob::new(pattern).map_err(|source| {
        ConfigError::InvalidSpoilerPattern {
          pattern: pattern.clone(),
          source,
        }
      })?;
      builder.add(glob);
    }
    builder.build().map_err(|source| {
      ConfigError::InvalidSpoilerPattern {
        pattern: self.spoilered_advancements.join(", "),
        source,
      }
    })
  }

  /// Postprocessing settings, defaulted when the section is absent.
  #[must_use]
  pub fn postprocess(&self) -> PostprocessConfig {
    self.postprocess.clone().unwrap_or_default()
  }

  /// Get the path to a template override by name, if a template directory is
  /// configured. This method does not check if the returned path exists.
  #[must_use]
  pub fn get_template_file(&self, name: &str) -> Option<PathBuf> {
    self.template_dir.as_ref().map(|dir| dir.join(name))
  }

  /// Validate everything that can be checked before rendering.
  ///
  /// Every problem is collected and reported together.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::Validation`] listing every problem found.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if let Err(e) = self.book_id() {
      errors.push(e.to_string());
    }

    if let Err(e) = self.text.macro_set(&indexmap::IndexMap::new()) {
      errors.push(e.to_string());
    }

    if let Err(e) = self.links.link_overrides() {
      errors.push(e.to_string());
    }

    if let Err(e) = self.spoiler_matcher() {
      errors.push(e.to_string());
    }

    if self.resource_dirs.is_empty() {
      errors.push("At least one resource directory must be provided".to_string());
    }

    if self.default_lang.is_empty() {
      errors.push("default_lang must not be empty".to_string());
    }

    if let Some(ref template_dir) = self.template_dir
      && !template_dir.is_dir()
    {
      errors.push(format!(
        "Template directory does not exist: {}",
        template_dir.display()
      ));
    }

    if let Some(ref static_dir) = self.static_dir
      && !static_dir.is_dir()
    {
      errors.push(format!(
        "Static directory does not exist: {}",
        static_dir.display()
      ));
    }

    if errors.is_empty() {
      Ok(())
    } else {
      Err(ConfigError::Validation(errors.join("\n")))
    }
  }

  /// Generate a default configuration file with commented explanations
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unsupported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)?;

    fs::write(path, config_content).map_err(|source| {
      ConfigError::Io {
        path: path.to_path_buf(),
        source,
      }
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }

  /// Export embedded templates to a directory for customization
  ///
  /// # Errors
  ///
  /// Returns an error if the output directory cannot be created or a template
  /// cannot be written.
  pub fn export_templates(
    output_dir: &Path,
    force: bool,
  ) -> Result<(), ConfigError> {
    let io_err = |path: &Path| {
      let path = path.to_path_buf();
      move |source| ConfigError::Io { path, source }
    };

    let mut templates: Vec<_> =
      hexdoc_templates::all_templates().into_iter().collect();
    templates.sort_unstable();

    for (filename, content) in templates {
      let file_path = output_dir.join(filename);

      if file_path.exists() && !force {
        log::warn!(
          "File {} already exists. Use --force to overwrite.",
          file_path.display()
        );
        continue;
      }

      if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
      }
      fs::write(&file_path, content).map_err(io_err(&file_path))?;
      log::info!("Exported template: {}", file_path.display());
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  #![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::field_reassign_with_default,
    reason = "Fine in tests"
  )]

  use super::*;

  #[test]
  fn test_defaults_validate() {
    Config::default().validate().unwrap();
  }

  #[test]
  fn test_book_id_uses_modid_namespace() {
    let mut config = Config::default();
    config.modid = "hexcasting".to_string();
    config.book = "thehexbook".to_string();
    assert_eq!(
      config.book_id().unwrap().to_string(),
      "hexcasting:thehexbook"
    );
  }

  #[test]
  fn test_full_version_falls_back() {
    let mut config = Config::default();
    config.version = "1.2.3".to_string();
    assert_eq!(config.full_version(), "1.2.3");
    config.full_version = Some("1.2.3+mc1.20".to_string());
    assert_eq!(config.full_version(), "1.2.3+mc1.20");
  }

  #[test]
  fn test_merge_rules() {
    let mut base = Config::default();
    base.langs = vec!["en_us".to_string()];
    base.minecraft_version = Some("1.20.1".to_string());
    base
      .text
      .macros
      .insert("$(a)".to_string(), "$(l)".to_string());

    let mut other = Config::default();
    other.version = "2.0.0".to_string();
    other.langs = vec!["ru_ru".to_string()];
    other.minecraft_version = None;
    other
      .text
      .macros
      .insert("$(b)".to_string(), "$(o)".to_string());
    other.text.is_0_black = true;

    base.merge(other);

    assert_eq!(base.version, "2.0.0");
    assert_eq!(base.langs, vec!["en_us".to_string(), "ru_ru".to_string()]);
    assert_eq!(base.minecraft_version.as_deref(), Some("1.20.1"));
    assert_eq!(base.text.macros.len(), 2);
    assert!(base.text.is_0_black);
  }

  #[test]
  fn test_apply_overrides() {
    let mut config = Config::default();
    config
      .apply_overrides(&[
        "version=0.11.1".to_string(),
        "text.is_0_black=yes".to_string(),
        "langs=en_us, zh_cn".to_string(),
        "resource_dirs=a,b".to_string(),
        "links.overrides.hexal:*=https://hexal.example".to_string(),
        "text.macros.$(media)=$(#74b3f2)".to_string(),
        "postprocess.minify_html=true".to_string(),
        "postprocess.css.minify=false".to_string(),
        "template_dir=".to_string(),
      ])
      .unwrap();

    assert_eq!(config.version, "0.11.1");
    assert!(config.text.is_0_black);
    assert_eq!(config.langs, vec!["en_us".to_string(), "zh_cn".to_string()]);
    assert_eq!(config.resource_dirs, vec![
      PathBuf::from("a"),
      PathBuf::from("b")
    ]);
    assert_eq!(
      config.links.overrides.get("hexal:*").map(String::as_str),
      Some("https://hexal.example")
    );
    assert_eq!(
      config.text.macros.get("$(media)").map(String::as_str),
      Some("$(#74b3f2)")
    );
    let postprocess = config.postprocess();
    assert!(postprocess.minify_html);
    assert!(!postprocess.css.unwrap().minify);
    assert!(config.template_dir.is_none());
  }

  #[test]
  fn test_apply_overrides_errors() {
    let mut config = Config::default();
    assert!(matches!(
      config.apply_overrides(&["no_equals".to_string()]),
      Err(ConfigError::InvalidOverride(_))
    ));
    assert!(matches!(
      config.apply_overrides(&["nope=1".to_string()]),
      Err(ConfigError::UnknownKey(_))
    ));
    assert!(matches!(
      config.apply_overrides(&["text.allow_missing=maybe".to_string()]),
      Err(ConfigError::InvalidValue { .. })
    ));
  }

  #[test]
  fn test_validate_collects_every_problem() {
    let mut config = Config::default();
    config.book = "Not A Book".to_string();
    config
      .text
      .macros
      .insert("$(x)".to_string(), "$(x)!".to_string());
    config.spoilered_advancements = vec!["a[".to_string()];

    let Err(ConfigError::Validation(message)) = config.validate() else {
      panic!("validation should fail");
    };
    assert!(message.contains("Not A Book"), "{message}");
    assert!(message.contains("recursive macro"), "{message}");
    assert!(message.contains("a["), "{message}");
  }

  #[test]
  fn test_from_file_by_extension() {
    let dir = tempfile::tempdir().unwrap();

    let toml_path = dir.path().join("hexdoc.toml");
    fs::write(&toml_path, "modid = \"hexal\"\n[text]\nis_0_black = true\n")
      .unwrap();
    let config = Config::from_file(&toml_path).unwrap();
    assert_eq!(config.modid, "hexal");
    assert!(config.text.is_0_black);
    assert!(config.text.allow_missing);

    let json_path = dir.path().join("hexdoc.json");
    fs::write(&json_path, r#"{"version": "3.0"}"#).unwrap();
    assert_eq!(Config::from_file(&json_path).unwrap().version, "3.0");

    let yaml_path = dir.path().join("hexdoc.yaml");
    fs::write(&yaml_path, "version: 3").unwrap();
    assert!(matches!(
      Config::from_file(&yaml_path),
      Err(ConfigError::UnsupportedFormat(_))
    ));
  }

  #[test]
  fn test_load_merges_files_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a.toml");
    let second = dir.path().join("b.toml");
    fs::write(&first, "version = \"1.0\"\nbranch = \"dev\"\n").unwrap();
    fs::write(&second, "version = \"1.1\"\nbranch = \"dev\"\n").unwrap();

    let config = Config::load(&[first, second], &["branch=main".to_string()])
      .unwrap();
    assert_eq!(config.version, "1.1");
    assert_eq!(config.branch, "main");
  }

  #[test]
  fn test_export_templates_respects_force() {
    let dir = tempfile::tempdir().unwrap();
    Config::export_templates(dir.path(), false).unwrap();

    let book = dir.path().join("book.html");
    assert!(book.is_file());
    assert!(dir.path().join("pages").is_dir());

    fs::write(&book, "custom").unwrap();
    Config::export_templates(dir.path(), false).unwrap();
    assert_eq!(fs::read_to_string(&book).unwrap(), "custom");

    Config::export_templates(dir.path(), true).unwrap();
    assert_ne!(fs::read_to_string(&book).unwrap(), "custom");
  }
}
