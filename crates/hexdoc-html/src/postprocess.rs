use color_eyre::{Result, eyre::eyre};
use hexdoc_config::postprocess::PostprocessConfig;

/// Minify rendered HTML if `minify_html` is set, otherwise return it as is.
#[must_use]
pub fn process_html(content: &str, config: &PostprocessConfig) -> String {
  if !config.minify_html {
    return content.to_string();
  }

  let cfg = minify_html::Cfg {
    keep_comments: !config.html_options().remove_comments,
    ..minify_html::Cfg::default()
  };

  let minified = minify_html::minify(content.as_bytes(), &cfg);
  String::from_utf8_lossy(&minified).into_owned()
}

/// Minify a stylesheet if `minify_css` is set, otherwise return it as is.
///
/// # Errors
///
/// Returns an error if the stylesheet cannot be parsed or printed.
pub fn process_css(
  content: &str,
  config: &PostprocessConfig,
) -> Result<String> {
  if !config.minify_css {
    return Ok(content.to_string());
  }

  let stylesheet = lightningcss::stylesheet::StyleSheet::parse(
    content,
    lightningcss::stylesheet::ParserOptions::default(),
  )
  .map_err(|e| eyre!("Failed to parse CSS: {e}"))?;

  let result = stylesheet
    .to_css(lightningcss::stylesheet::PrinterOptions {
      minify: config.css_options().minify,
      ..Default::default()
    })
    .map_err(|e| eyre!("Failed to minify CSS: {e}"))?;

  Ok(result.code)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use hexdoc_config::postprocess::HtmlMinifyOptions;

  use super::*;

  #[test]
  fn test_disabled_passes_through() {
    let config = PostprocessConfig::default();
    let html = "<div>  <!-- note -->  text </div>";
    assert_eq!(process_html(html, &config), html);

    let css = "body {  color: red;  }";
    assert_eq!(process_css(css, &config).unwrap(), css);
  }

  #[test]
  fn test_html_minification() {
    let config = PostprocessConfig {
      minify_html: true,
      ..Default::default()
    };
    let html = "<div>\n  <!-- note -->\n  <p>Media</p>\n</div>";
    let result = process_html(html, &config);

    assert!(result.len() < html.len());
    assert!(!result.contains("<!-- note -->"));
    assert!(result.contains("Media"));
  }

  #[test]
  fn test_html_comments_can_be_kept() {
    let config = PostprocessConfig {
      minify_html: true,
      html: Some(HtmlMinifyOptions {
        remove_comments: false,
      }),
      ..Default::default()
    };
    let result = process_html("<div><!-- keep -->Media</div>", &config);
    assert!(result.contains("<!-- keep -->"));
  }

  #[test]
  fn test_embedded_stylesheet_minifies() {
    let config = PostprocessConfig {
      minify_css: true,
      ..Default::default()
    };
    let css = hexdoc_templates::DEFAULT_CSS;
    let result = process_css(css, &config).unwrap();

    assert!(result.len() < css.len());
    assert!(!result.contains("/* Recipes */"));
    assert!(result.contains(".spoilered"));
  }
}
