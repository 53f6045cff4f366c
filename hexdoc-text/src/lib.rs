//! # hexdoc-text
//!
//! The Patchouli text formatting engine used by hexdoc.
//!
//! Localized book text carries inline style tokens such as `$(l)` for bold,
//! `$(#b0b)` for a color or `$(l:basics/intro)` for a link to another entry.
//! Formatting a string happens in three steps:
//!
//! 1. [`MacroSet::expand`] applies text macros until the string stops
//!    changing.
//! 2. The [`Formatter`] scans the result for `$(...)` tokens and classifies
//!    each one as a [`Style`], a close tag or literal text.
//! 3. [`FormatTree::build`] turns the token stream into a nested tree, which
//!    [`to_html`] renders.
//!
//! ```
//! use hexdoc_core::I18n;
//! use hexdoc_text::{BookLinks, Formatter, to_html};
//!
//! let formatter = Formatter::default();
//! let i18n = I18n::default();
//! let tree = formatter.format("$(bold)Media$() is everywhere.", &i18n).unwrap();
//! let html = to_html(&tree, &BookLinks::new()).unwrap();
//! assert_eq!(html, "<p><strong>Media</strong> is everywhere.</p>");
//! ```

pub mod error;
pub mod formatter;
pub mod html;
pub mod link;
pub mod macros;
pub mod style;
pub mod tree;

pub use error::FormatError;
pub use formatter::{FormatOptions, Formatter};
pub use html::to_html;
pub use link::{BookLink, BookLinks, LinkOverrides};
pub use macros::MacroSet;
pub use style::{LinkTarget, Style, StyleKind, Token};
pub use tree::{FormatTree, Marker, Node};
