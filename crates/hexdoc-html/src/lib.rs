//! `hexdoc-html`.
//!
//! Renders a loaded [`Book`](hexdoc_book::Book) to a static site directory
//! with tera templates, then writes its assets and sitemap marker.

pub mod assets;
pub mod postprocess;
pub mod render;
pub mod template;
pub mod view;

pub use render::{SiteOptions, redirect_href, render_site};
pub use template::{LangLink, Templates};
pub use view::BookView;
