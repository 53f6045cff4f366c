//! Tokenizing and classifying `$(...)` style tokens.

use std::sync::LazyLock;

use hexdoc_core::{I18n, resource::never_matching_regex};
use log::error;
use regex::Regex;

use crate::{
  error::FormatError,
  link::{BookLink, LinkOverrides},
  macros::MacroSet,
  style::{CommandKind, FunctionKind, LinkTarget, Style, StyleKind, Token, preset_color},
  tree::{FormatTree, Marker},
};

static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\$\(([^)]*)\)").unwrap_or_else(|e| {
    error!("Failed to compile STYLE_RE regex: {e}");
    never_matching_regex()
  })
});

static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^li(\d*)$").unwrap_or_else(|e| {
    error!("Failed to compile LIST_ITEM_RE regex: {e}");
    never_matching_regex()
  })
});

static HEX_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap_or_else(|e| {
    error!("Failed to compile HEX_COLOR_RE regex: {e}");
    never_matching_regex()
  })
});

/// Options for formatting the text of one book.
#[derive(Debug, Clone)]
pub struct FormatOptions {
  /// Namespace used for link targets written without one.
  pub book_namespace: String,

  /// Treat `$(0)` as the color black instead of closing the current color.
  pub is_0_black: bool,
}

impl Default for FormatOptions {
  fn default() -> Self {
    Self {
      book_namespace: hexdoc_core::resource::DEFAULT_NAMESPACE.to_string(),
      is_0_black:     false,
    }
  }
}

/// Turns localized Patchouli strings into [`FormatTree`]s.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
  options:        FormatOptions,
  macros:         MacroSet,
  link_overrides: LinkOverrides,
}

impl Formatter {
  #[must_use]
  pub const fn new(
    options: FormatOptions,
    macros: MacroSet,
    link_overrides: LinkOverrides,
  ) -> Self {
    Self {
      options,
      macros,
      link_overrides,
    }
  }

  #[must_use]
  pub const fn options(&self) -> &FormatOptions {
    &self.options
  }

  #[must_use]
  pub const fn macros(&self) -> &MacroSet {
    &self.macros
  }

  /// Expand macros in `raw`, tokenize it and build its format tree.
  ///
  /// # Errors
  ///
  /// Returns [`FormatError::UnhandledStyle`] for a token that is not a
  /// known style, and [`FormatError::InvalidBookLink`] for a link whose
  /// target is not a valid id.
  pub fn format(&self, raw: &str, i18n: &I18n) -> Result<FormatTree, FormatError> {
    let expanded = self.macros.expand(raw);
    let (first_text, spans) = self.lex(&expanded, i18n)?;
    Ok(FormatTree::build(first_text, spans))
  }

  /// Localize `key_or_text` and format the result.
  ///
  /// # Errors
  ///
  /// See [`Self::format`].
  pub fn format_localized(
    &self,
    key_or_text: &str,
    i18n: &I18n,
  ) -> Result<FormatTree, FormatError> {
    self.format(&i18n.localize_or_raw(key_or_text), i18n)
  }

  /// Split an expanded string into the text before the first style and the
  /// `(marker, text)` pairs after it.
  ///
  /// Literal replacements such as `$(br)` are spliced into the surrounding
  /// text and do not start a new span.
  fn lex(
    &self,
    text: &str,
    i18n: &I18n,
  ) -> Result<(String, Vec<(Marker, String)>), FormatError> {
    let mut markers = Vec::new();
    let mut texts = Vec::new();
    let mut pending = String::new();
    let mut last_end = 0;

    for caps in STYLE_RE.captures_iter(text) {
      let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
        continue;
      };
      pending.push_str(&text[last_end..whole.start()]);
      last_end = whole.end();

      match self.classify(inner.as_str(), text, i18n)? {
        Token::Text(replacement) => pending.push_str(&replacement),
        Token::Style(style) => {
          markers.push(Marker::Open(style));
          texts.push(std::mem::take(&mut pending));
        },
        Token::Close(kind) => {
          markers.push(Marker::Close(kind));
          texts.push(std::mem::take(&mut pending));
        },
      }
    }

    pending.push_str(&text[last_end..]);
    texts.push(pending);

    // texts[0] precedes the first marker, texts[i + 1] follows marker i
    let mut texts = texts.into_iter();
    let first_text = texts.next().unwrap_or_default();
    Ok((first_text, markers.into_iter().zip(texts).collect()))
  }

  /// Classify the inside of one `$(...)` token.
  ///
  /// The order of checks matters: replacements, paragraphs, commands, the
  /// `0` color reset, preset colors, hex colors, colon functions, the empty
  /// reset and finally close tags.
  ///
  /// # Errors
  ///
  /// Returns [`FormatError::UnhandledStyle`] naming the token and
  /// `source_string` when nothing matches.
  pub fn classify(
    &self,
    token: &str,
    source_string: &str,
    i18n: &I18n,
  ) -> Result<Token, FormatError> {
    if let Some(replacement) = replacement(token) {
      return Ok(Token::Text(replacement.to_string()));
    }

    if let Some(style) = paragraph(token) {
      return Ok(Token::Style(style));
    }

    if let Some(kind) = CommandKind::from_token(token) {
      return Ok(Token::Style(Style::Command { kind }));
    }

    if token == "0" && !self.options.is_0_black {
      return Ok(Token::Close(StyleKind::Color));
    }

    if let Some(value) = preset_color(token) {
      return Ok(Token::Style(Style::Color {
        value: value.to_string(),
      }));
    }

    if HEX_COLOR_RE.is_match(token) {
      return Ok(Token::Style(Style::Color {
        value: token[1..].to_lowercase(),
      }));
    }

    if let Some((name, value)) = token.split_once(':') {
      if name == "k" {
        return Ok(Token::Text(i18n.localize_key(value)));
      }
      if name == "l" {
        return Ok(Token::Style(Style::Link {
          target: self.link_target(value)?,
        }));
      }
      if let Some(kind) = FunctionKind::from_name(name) {
        return Ok(Token::Style(Style::Function {
          kind,
          value: value.to_string(),
        }));
      }
    }

    if token.is_empty() {
      return Ok(Token::Close(StyleKind::Base));
    }

    if let Some(name) = token.strip_prefix('/') {
      if name == "l" {
        return Ok(Token::Close(StyleKind::Link));
      }
      if let Some(kind) = FunctionKind::from_name(name) {
        return Ok(Token::Close(StyleKind::Function(kind)));
      }
    }

    Err(FormatError::UnhandledStyle {
      token:         token.to_string(),
      source_string: source_string.to_string(),
    })
  }

  fn link_target(&self, value: &str) -> Result<LinkTarget, FormatError> {
    if let Some(url) = self.link_overrides.get(value) {
      return Ok(LinkTarget::External {
        url: url.to_string(),
      });
    }

    if value.contains("://") {
      return Ok(LinkTarget::External {
        url: value.to_string(),
      });
    }

    BookLink::parse(value, &self.options.book_namespace).map(LinkTarget::Book)
  }
}

fn replacement(token: &str) -> Option<&'static str> {
  match token {
    "br" => Some("\n"),
    "playername" => Some("[Playername]"),
    _ => None,
  }
}

fn paragraph(token: &str) -> Option<Style> {
  if token == "br2" {
    return Some(Style::paragraph());
  }

  let caps = LIST_ITEM_RE.captures(token)?;
  let level = match caps.get(1).map(|m| m.as_str()) {
    None | Some("") => 1,
    // Only digits reach here, so a parse failure is an overflow.
    Some(digits) => digits.parse().unwrap_or(u32::MAX),
  };
  Some(Style::list_item(level))
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::panic, reason = "Fine in tests")]

  use std::collections::HashMap;

  use super::*;
  use crate::tree::Node;

  fn i18n() -> I18n {
    I18n::new(
      "en_us",
      HashMap::from([("key.use".to_string(), "Right Button".to_string())]),
      true,
    )
  }

  fn formatter(is_0_black: bool) -> Formatter {
    Formatter::new(
      FormatOptions {
        book_namespace: "hexcasting".to_string(),
        is_0_black,
      },
      MacroSet::default(),
      LinkOverrides::new([("hexal:*", "https://hexal.example/")]).unwrap(),
    )
  }

  fn classify(token: &str) -> Token {
    formatter(false).classify(token, "", &i18n()).unwrap()
  }

  #[test]
  fn test_replacements_come_first() {
    assert_eq!(classify("br"), Token::Text("\n".to_string()));
    assert_eq!(classify("playername"), Token::Text("[Playername]".to_string()));
  }

  #[test]
  fn test_paragraphs() {
    assert_eq!(classify("br2"), Token::Style(Style::paragraph()));
    assert_eq!(classify("li"), Token::Style(Style::list_item(1)));
    assert_eq!(classify("li3"), Token::Style(Style::list_item(3)));
  }

  #[test]
  fn test_deep_list_items_are_not_errors() {
    assert_eq!(classify("li256"), Token::Style(Style::list_item(256)));
    assert_eq!(
      classify("li99999999999"),
      Token::Style(Style::list_item(u32::MAX))
    );

    let tree = formatter(false).format("a$(li256)b", &i18n()).unwrap();
    assert!(tree.children.iter().any(|node| {
      matches!(node, Node::Tree(child) if child.style == Style::list_item(256))
    }));
  }

  #[test]
  fn test_zero_depends_on_is_0_black() {
    assert_eq!(classify("0"), Token::Close(StyleKind::Color));
    let black = formatter(true).classify("0", "", &i18n()).unwrap();
    assert_eq!(
      black,
      Token::Style(Style::Color {
        value: "000".to_string(),
      })
    );
  }

  #[test]
  fn test_colors() {
    assert_eq!(
      classify("c"),
      Token::Style(Style::Color {
        value: "f55".to_string(),
      })
    );
    assert_eq!(
      classify("#A0B1C2"),
      Token::Style(Style::Color {
        value: "a0b1c2".to_string(),
      })
    );
    assert!(formatter(false).classify("#12", "", &i18n()).is_err());
    assert!(formatter(false).classify("#ggg", "", &i18n()).is_err());
  }

  #[test]
  fn test_keybind_is_localized_text() {
    assert_eq!(classify("k:use"), Token::Text("Right Button".to_string()));
  }

  #[test]
  fn test_links() {
    assert_eq!(
      classify("l:https://example.com"),
      Token::Style(Style::Link {
        target: LinkTarget::External {
          url: "https://example.com".to_string(),
        },
      })
    );
    assert_eq!(
      classify("l:hexal:patterns/spells"),
      Token::Style(Style::Link {
        target: LinkTarget::External {
          url: "https://hexal.example/".to_string(),
        },
      })
    );
    let Token::Style(Style::Link {
      target: LinkTarget::Book(link),
    }) = classify("l:basics/intro#start")
    else {
      panic!("expected a book link");
    };
    assert_eq!(link.book_links_key(), "hexcasting:basics/intro#start");
  }

  #[test]
  fn test_functions_and_closes() {
    assert_eq!(
      classify("t:Hover text"),
      Token::Style(Style::Function {
        kind:  FunctionKind::Tooltip,
        value: "Hover text".to_string(),
      })
    );
    assert_eq!(classify(""), Token::Close(StyleKind::Base));
    assert_eq!(classify("/l"), Token::Close(StyleKind::Link));
    assert_eq!(classify("/t"), Token::Close(StyleKind::Function(FunctionKind::Tooltip)));
    assert_eq!(classify("/c"), Token::Close(StyleKind::Function(FunctionKind::CmdClick)));
  }

  #[test]
  fn test_unhandled_style_names_token_and_string() {
    let err = formatter(false)
      .classify("nope", "some $(nope) text", &i18n())
      .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("$(nope)"), "{message}");
    assert!(message.contains("some $(nope) text"), "{message}");
  }

  #[test]
  fn test_lex_splices_replacements_into_text() {
    let (first, spans) = formatter(false)
      .lex("a$(br)b$(l)c$(br)", &i18n())
      .unwrap();
    assert_eq!(first, "a\nb");
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].1, "c\n");
  }
}
