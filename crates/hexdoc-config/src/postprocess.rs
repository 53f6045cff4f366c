use hexdoc_macros::Configurable;
use serde::{Deserialize, Serialize};

/// Configuration for HTML/CSS postprocessing
///
/// Controls minification of generated output files:
///
/// - HTML: `minify-html`
/// - CSS: `lightningcss`
#[derive(Debug, Clone, Serialize, Deserialize, Default, Configurable)]
#[serde(default)]
pub struct PostprocessConfig {
  /// Whether to minify HTML output
  #[config(key = "minify_html")]
  pub minify_html: bool,

  /// Whether to minify CSS output
  #[config(key = "minify_css")]
  pub minify_css: bool,

  /// Options specific to HTML minification
  #[config(nested)]
  pub html: Option<HtmlMinifyOptions>,

  /// Options specific to CSS minification
  #[config(nested)]
  pub css: Option<CssMinifyOptions>,
}

/// Options for HTML minification
#[derive(Debug, Clone, Serialize, Deserialize, Configurable)]
#[serde(default)]
pub struct HtmlMinifyOptions {
  /// Remove HTML comments
  #[config(key = "remove_comments")]
  pub remove_comments: bool,
}

impl Default for HtmlMinifyOptions {
  fn default() -> Self {
    Self {
      remove_comments: true,
    }
  }
}

/// Options for CSS minification
#[derive(Debug, Clone, Serialize, Deserialize, Configurable)]
#[serde(default)]
pub struct CssMinifyOptions {
  /// Apply whitespace removal and shorthand folding. When off, the
  /// stylesheet is only parsed and reprinted.
  #[config(key = "minify")]
  pub minify: bool,
}

impl Default for CssMinifyOptions {
  fn default() -> Self {
    Self { minify: true }
  }
}

impl PostprocessConfig {
  /// Get HTML minify options or default
  #[must_use]
  pub fn html_options(&self) -> HtmlMinifyOptions {
    self.html.clone().unwrap_or_default()
  }

  /// Get CSS minify options or default
  #[must_use]
  pub fn css_options(&self) -> CssMinifyOptions {
    self.css.clone().unwrap_or_default()
  }
}
