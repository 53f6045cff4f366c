//! Style types produced by classifying `$(...)` tokens.

use std::fmt;

use serde::Serialize;

use crate::link::BookLink;

/// Single-letter formatting commands, `$(k)` through `$(o)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
  Obfuscated,
  Bold,
  Strikethrough,
  Underline,
  Italic,
}

impl CommandKind {
  /// Look up a command by its token, e.g. `l` for bold.
  #[must_use]
  pub fn from_token(token: &str) -> Option<Self> {
    match token {
      "k" => Some(Self::Obfuscated),
      "l" => Some(Self::Bold),
      "m" => Some(Self::Strikethrough),
      "n" => Some(Self::Underline),
      "o" => Some(Self::Italic),
      _ => None,
    }
  }
}

/// Paragraph-level block styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphKind {
  Paragraph,
  ListItem,
}

/// Functions that take an argument, `$(t:...)` and `$(c:...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
  Tooltip,
  CmdClick,
}

impl FunctionKind {
  /// Look up a function by its name, e.g. `t` for tooltip.
  #[must_use]
  pub fn from_name(name: &str) -> Option<Self> {
    match name {
      "t" => Some(Self::Tooltip),
      "c" => Some(Self::CmdClick),
      _ => None,
    }
  }
}

/// Where a link style points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkTarget {
  /// An absolute URL, either written out or produced by a link override.
  External { url: String },
  /// A category, entry or page of the book being rendered.
  Book(BookLink),
}

impl LinkTarget {
  #[must_use]
  pub const fn is_external(&self) -> bool {
    matches!(self, Self::External { .. })
  }
}

/// A resolved formatting style.
///
/// Every variant except [`Style::Base`] comes from a token in the source
/// text. `Base` is the synthetic root of every [`crate::FormatTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Style {
  Base,
  Command { kind: CommandKind },
  Paragraph {
    kind:  ParagraphKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<u32>,
  },
  /// Hex digits without the leading `#`, either `rgb` or `rrggbb`.
  Color { value: String },
  Function { kind: FunctionKind, value: String },
  Link { target: LinkTarget },
}

impl Style {
  #[must_use]
  pub const fn paragraph() -> Self {
    Self::Paragraph {
      kind:  ParagraphKind::Paragraph,
      level: None,
    }
  }

  #[must_use]
  pub const fn list_item(level: u32) -> Self {
    Self::Paragraph {
      kind:  ParagraphKind::ListItem,
      level: Some(level),
    }
  }

  /// The kind used to match this style against open frames.
  #[must_use]
  pub const fn kind(&self) -> StyleKind {
    match self {
      Self::Base => StyleKind::Base,
      Self::Command { kind } => StyleKind::Command(*kind),
      Self::Paragraph { .. } => StyleKind::Paragraph,
      Self::Color { .. } => StyleKind::Color,
      Self::Function { kind, .. } => StyleKind::Function(*kind),
      Self::Link { .. } => StyleKind::Link,
    }
  }
}

/// The matching key of a style.
///
/// Opening a style whose kind is already open closes the open one first, and
/// a close tag closes the nearest open frame of its kind. All paragraph
/// subtypes share one kind, so a list item ends the current paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
  Base,
  Paragraph,
  Color,
  Link,
  Command(CommandKind),
  Function(FunctionKind),
}

impl fmt::Display for StyleKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Base => f.write_str("base"),
      Self::Paragraph => f.write_str("paragraph"),
      Self::Color => f.write_str("color"),
      Self::Link => f.write_str("link"),
      Self::Command(kind) => write!(f, "{kind:?}"),
      Self::Function(kind) => write!(f, "{kind:?}"),
    }
  }
}

/// The result of classifying the inside of one `$(...)` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
  /// Opens a new style.
  Style(Style),
  /// Closes the nearest open style of this kind. `StyleKind::Base` is the
  /// reset token `$()`.
  Close(StyleKind),
  /// Literal text spliced into the surrounding text.
  Text(String),
}

/// Colors of the sixteen Minecraft formatting codes `$(0)` to `$(f)`.
#[must_use]
pub fn preset_color(code: &str) -> Option<&'static str> {
  let value = match code {
    "0" => "000",
    "1" => "00a",
    "2" => "0a0",
    "3" => "0aa",
    "4" => "a00",
    "5" => "a0a",
    "6" => "fa0",
    "7" => "aaa",
    "8" => "555",
    "9" => "55f",
    "a" => "5f5",
    "b" => "5ff",
    "c" => "f55",
    "d" => "f5f",
    "e" => "ff5",
    "f" => "fff",
    _ => return None,
  };
  Some(value)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_paragraph_subtypes_share_kind() {
    assert_eq!(Style::paragraph().kind(), StyleKind::Paragraph);
    assert_eq!(Style::list_item(2).kind(), StyleKind::Paragraph);
  }

  #[test]
  fn test_command_tokens() {
    assert_eq!(CommandKind::from_token("l"), Some(CommandKind::Bold));
    assert_eq!(CommandKind::from_token("k"), Some(CommandKind::Obfuscated));
    assert_eq!(CommandKind::from_token("x"), None);
  }

  #[test]
  fn test_preset_colors() {
    assert_eq!(preset_color("0"), Some("000"));
    assert_eq!(preset_color("6"), Some("fa0"));
    assert_eq!(preset_color("f"), Some("fff"));
    assert_eq!(preset_color("g"), None);
  }
}
