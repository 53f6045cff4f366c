//! HTML output for format trees.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::{
  error::FormatError,
  link::BookLinks,
  style::{CommandKind, FunctionKind, LinkTarget, ParagraphKind, Style},
  tree::{FormatTree, Node},
};

/// Render a format tree to HTML.
///
/// Book links are resolved through `links`; external links open in a new
/// tab. Text is escaped and newlines become `<br />`.
///
/// # Errors
///
/// Returns [`FormatError::BrokenLink`] if a book link has no entry in
/// `links`.
pub fn to_html(tree: &FormatTree, links: &BookLinks) -> Result<String, FormatError> {
  let mut out = String::new();
  write_tree(&mut out, tree, links)?;
  Ok(out)
}

fn write_children(
  out: &mut String,
  children: &[Node],
  links: &BookLinks,
) -> Result<(), FormatError> {
  for child in children {
    match child {
      Node::Text(text) => write_text(out, text),
      Node::Tree(tree) => write_tree(out, tree, links)?,
    }
  }
  Ok(())
}

fn write_text(out: &mut String, text: &str) {
  let mut lines = text.split('\n');
  if let Some(first) = lines.next() {
    out.push_str(&encode_text(first));
  }
  for line in lines {
    out.push_str("<br />");
    out.push_str(&encode_text(line));
  }
}

// `write!` into a String cannot fail, so its results are ignored.
fn write_tree(
  out: &mut String,
  tree: &FormatTree,
  links: &BookLinks,
) -> Result<(), FormatError> {
  let close = match &tree.style {
    Style::Base => {
      return write_children(out, &tree.children, links);
    },
    Style::Paragraph { kind, level } => {
      if tree.children.is_empty() {
        return Ok(());
      }
      match kind {
        ParagraphKind::Paragraph => out.push_str("<p>"),
        ParagraphKind::ListItem => {
          let _ = write!(
            out,
            "<p class=\"fake-li\" data-level=\"{}\">",
            level.unwrap_or(1)
          );
        },
      }
      "</p>"
    },
    Style::Command { kind } => {
      match kind {
        CommandKind::Bold => {
          out.push_str("<strong>");
          "</strong>"
        },
        CommandKind::Italic => {
          out.push_str("<i>");
          "</i>"
        },
        CommandKind::Strikethrough => {
          out.push_str("<s>");
          "</s>"
        },
        CommandKind::Underline => {
          out.push_str("<span class=\"underline\">");
          "</span>"
        },
        CommandKind::Obfuscated => {
          out.push_str("<span class=\"obfuscated\">");
          "</span>"
        },
      }
    },
    Style::Color { value } => {
      let _ = write!(
        out,
        "<span style=\"color: #{}\">",
        encode_double_quoted_attribute(value)
      );
      "</span>"
    },
    Style::Function { kind, value } => {
      let title = match kind {
        FunctionKind::Tooltip => value.clone(),
        FunctionKind::CmdClick => format!("When clicked, would execute: {value}"),
      };
      let class = match kind {
        FunctionKind::Tooltip => "has-tooltip",
        FunctionKind::CmdClick => "has-cmd_click",
      };
      let _ = write!(
        out,
        "<span class=\"{class}\" title=\"{}\">",
        encode_double_quoted_attribute(&title)
      );
      "</span>"
    },
    Style::Link { target } => {
      match target {
        LinkTarget::External { url } => {
          let _ = write!(
            out,
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">",
            encode_double_quoted_attribute(url)
          );
        },
        LinkTarget::Book(link) => {
          let href = links.resolve(link)?;
          let _ = write!(
            out,
            "<a href=\"{}\">",
            encode_double_quoted_attribute(href)
          );
        },
      }
      "</a>"
    },
  };

  write_children(out, &tree.children, links)?;
  out.push_str(close);
  Ok(())
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;
  use crate::{
    link::BookLink,
    style::StyleKind,
    tree::Marker,
  };

  fn build(spans: Vec<(Marker, &str)>) -> FormatTree {
    FormatTree::build(
      "start ".to_string(),
      spans.into_iter().map(|(m, t)| (m, t.to_string())),
    )
  }

  #[test]
  fn test_escapes_text_and_breaks_lines() {
    let tree = FormatTree::build("a < b\nc".to_string(), Vec::new());
    assert_eq!(
      to_html(&tree, &BookLinks::new()).unwrap(),
      "<p>a &lt; b<br />c</p>"
    );
  }

  #[test]
  fn test_commands_and_colors() {
    let tree = build(vec![
      (
        Marker::Open(Style::Command {
          kind: CommandKind::Bold,
        }),
        "bold",
      ),
      (Marker::Close(StyleKind::Base), " "),
      (
        Marker::Open(Style::Color {
          value: "b0b".to_string(),
        }),
        "purple",
      ),
    ]);
    assert_eq!(
      to_html(&tree, &BookLinks::new()).unwrap(),
      "<p>start <strong>bold</strong> <span style=\"color: \
       #b0b\">purple</span></p>"
    );
  }

  #[test]
  fn test_book_link_resolves_through_table() {
    let link = BookLink::parse("basics", "hexcasting").unwrap();
    let tree = build(vec![(
      Marker::Open(Style::Link {
        target: LinkTarget::Book(link),
      }),
      "here",
    )]);

    let mut links = BookLinks::new();
    links.insert("hexcasting:basics", "#basics");
    assert_eq!(
      to_html(&tree, &links).unwrap(),
      "<p>start <a href=\"#basics\">here</a></p>"
    );

    assert!(matches!(
      to_html(&tree, &BookLinks::new()),
      Err(FormatError::BrokenLink { .. })
    ));
  }

  #[test]
  fn test_external_link_opens_new_tab() {
    let tree = build(vec![(
      Marker::Open(Style::Link {
        target: LinkTarget::External {
          url: "https://x.com/?a=1&b=2".to_string(),
        },
      }),
      "x",
    )]);
    assert_eq!(
      to_html(&tree, &BookLinks::new()).unwrap(),
      "<p>start <a href=\"https://x.com/?a=1&amp;b=2\" target=\"_blank\" \
       rel=\"noopener\">x</a></p>"
    );
  }

  #[test]
  fn test_list_item_and_tooltip() {
    let tree = FormatTree::build(String::new(), vec![
      (Marker::Open(Style::list_item(2)), "item ".to_string()),
      (
        Marker::Open(Style::Function {
          kind:  FunctionKind::Tooltip,
          value: "\"quoted\"".to_string(),
        }),
        "hover".to_string(),
      ),
    ]);
    assert_eq!(
      to_html(&tree, &BookLinks::new()).unwrap(),
      "<p class=\"fake-li\" data-level=\"2\">item <span class=\"has-tooltip\" \
       title=\"&quot;quoted&quot;\">hover</span></p>"
    );
  }
}
