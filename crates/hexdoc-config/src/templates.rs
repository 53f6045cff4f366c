//! Commented default configuration files written by `hexdoc init`.

use crate::error::ConfigError;

/// Default configuration in TOML, with every key explained.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# hexdoc configuration file

# Mod id, used for the page title and the default book namespace
modid = "hexcasting"

# Id of the Patchouli book to render (data/<namespace>/patchouli_books/<path>)
book = "hexcasting:thehexbook"

# Resource roots containing assets/ and data/, later ones take precedence
resource_dirs = ["src/main/resources", "src/generated/resources"]

# Where rendered books are written
output_dir = "_site/src/docs"

# Where `hexdoc merge` assembles the versioned site
merge_dir = "_site/dst/docs"

# Public URL of the merged site (used for absolute links)
# base_url = "https://hexcasting.hexxy.media"

# Languages to render; leave empty to render every language found in assets/*/lang
default_lang = "en_us"
langs = []

# Version of the mod these docs are for
version = "0.11.0"
# full_version = "0.11.0-pre+1.20.1"
# minecraft_version = "1.20.1"

# Git branch of this build, and the branch whose "latest" docs win ties
branch = "main"
default_branch = "main"

# Directory of template overrides (see `hexdoc export-templates`)
# template_dir = "templates"

# Directory whose files are copied into every rendered book
# static_dir = "static"

# Entries locked behind these advancements are hidden as spoilers (glob patterns)
# spoilered_advancements = ["hexcasting:enlightenment", "hexcasting:lore/*"]

[text]
# Treat $(0) as black instead of "reset color"
is_0_black = false

# Render untranslated keys verbatim instead of failing the build
allow_missing = true

# Extra text macros, applied after the defaults and the book's own macros
[text.macros]
# "$(media)" = "$(#74b3f2)"

# Redirect links into other books to their published sites
[links.overrides]
# "hexal:*" = "https://hexal.hexxy.media/v/latest/main/en_us"

[postprocess]
# Minify generated HTML
minify_html = false

# Minify generated CSS
minify_css = false

# [postprocess.html]
# remove_comments = true

# [postprocess.css]
# minify = true
"#;

/// Default configuration in JSON format.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "modid": "hexcasting",
  "book": "hexcasting:thehexbook",
  "resource_dirs": ["src/main/resources", "src/generated/resources"],
  "output_dir": "_site/src/docs",
  "merge_dir": "_site/dst/docs",
  "default_lang": "en_us",
  "langs": [],
  "version": "0.11.0",
  "branch": "main",
  "default_branch": "main",
  "spoilered_advancements": [],
  "text": {
    "is_0_black": false,
    "allow_missing": true,
    "macros": {}
  },
  "links": {
    "overrides": {}
  },
  "postprocess": {
    "minify_html": false,
    "minify_css": false
  }
}
"#;

/// Get the correct configuration template based on the requested format.
///
/// # Errors
///
/// Returns an error if the requested format is not supported.
pub fn get_template(format: &str) -> Result<&'static str, ConfigError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => Err(ConfigError::UnsupportedFormat(format.to_string())),
  }
}
