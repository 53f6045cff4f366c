//! The format tree and the stack-based builder that produces it.

use serde::Serialize;

use crate::style::{Style, StyleKind};

/// A child of a [`FormatTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Node {
  Text(String),
  Tree(FormatTree),
}

/// A styled span of text with nested children.
///
/// The root of every formatted string is a [`Style::Base`] tree whose first
/// child is a paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatTree {
  pub style:    Style,
  pub children: Vec<Node>,
}

/// A style event fed to [`FormatTree::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
  Open(Style),
  Close(StyleKind),
}

impl Marker {
  const fn kind(&self) -> StyleKind {
    match self {
      Self::Open(style) => style.kind(),
      Self::Close(kind) => *kind,
    }
  }
}

impl FormatTree {
  fn frame(style: Style, text: String) -> Self {
    let children = if text.is_empty() {
      Vec::new()
    } else {
      vec![Node::Text(text)]
    };
    Self { style, children }
  }

  /// Build a tree from the text before the first style token and the
  /// `(marker, following text)` pairs after it.
  ///
  /// Opening a style that is already open closes the open frame and every
  /// frame above it, then reopens those intermediate styles. A close tag
  /// does the same without opening anything. `Close(StyleKind::Base)`
  /// closes everything down to the current paragraph. Styles still open at
  /// the end are closed implicitly.
  #[must_use]
  pub fn build<I>(first_text: String, spans: I) -> Self
  where
    I: IntoIterator<Item = (Marker, String)>,
  {
    let mut stack = vec![
      Self {
        style:    Style::Base,
        children: Vec::new(),
      },
      Self::frame(Style::paragraph(), first_text),
    ];

    for (marker, text) in spans {
      let kind = marker.kind();
      let mut reopen = Vec::new();

      if kind == StyleKind::Base {
        while stack.len() > 2
          && stack
            .last()
            .is_some_and(|top| top.style.kind() != StyleKind::Paragraph)
        {
          pop_into_parent(&mut stack);
        }
      } else if stack.iter().any(|frame| frame.style.kind() == kind) {
        while stack.len() >= 2 {
          let Some(popped_kind) = pop_into_parent(&mut stack) else {
            break;
          };
          if popped_kind.0 == kind {
            break;
          }
          reopen.push(popped_kind.1);
        }
      }

      for style in reopen {
        stack.push(Self {
          style,
          children: Vec::new(),
        });
      }

      match marker {
        Marker::Close(_) => {
          if !text.is_empty()
            && let Some(top) = stack.last_mut()
          {
            top.children.push(Node::Text(text));
          }
        },
        Marker::Open(style) => stack.push(Self::frame(style, text)),
      }
    }

    while stack.len() >= 2 {
      pop_into_parent(&mut stack);
    }

    stack.pop().unwrap_or_else(|| {
      Self {
        style:    Style::Base,
        children: Vec::new(),
      }
    })
  }

  /// Concatenated text of every descendant, without styling.
  #[must_use]
  pub fn plain_text(&self) -> String {
    let mut out = String::new();
    self.collect_text(&mut out);
    out
  }

  fn collect_text(&self, out: &mut String) {
    for child in &self.children {
      match child {
        Node::Text(text) => out.push_str(text),
        Node::Tree(tree) => tree.collect_text(out),
      }
    }
  }

  /// Number of trees in this tree, itself included.
  #[must_use]
  pub fn node_count(&self) -> usize {
    1 + self
      .children
      .iter()
      .map(|child| {
        match child {
          Node::Text(_) => 0,
          Node::Tree(tree) => tree.node_count(),
        }
      })
      .sum::<usize>()
  }
}

/// Pop the top frame and append it to the new top. Returns the popped
/// frame's kind and style.
fn pop_into_parent(stack: &mut Vec<FormatTree>) -> Option<(StyleKind, Style)> {
  if stack.len() < 2 {
    return None;
  }
  let popped = stack.pop()?;
  let result = (popped.style.kind(), popped.style.clone());
  stack.last_mut()?.children.push(Node::Tree(popped));
  Some(result)
}
