//! `hexdoc-sitemap`.
//!
//! Every rendered book directory carries a [`SitemapMarker`]. Merging folds
//! the markers found under a site tree into a [`Sitemap`] keyed by version
//! and language, and guards released output against being overwritten.

pub mod error;
pub mod marker;
pub mod merge;
pub mod sitemap;

pub use error::SitemapError;
pub use marker::{
  LATEST,
  LatestMarker,
  MARKER_FILE,
  MarkerPriority,
  SitemapMarker,
  VersionedMarker,
  site_path,
};
pub use merge::{copy_tree, delete_stale, merge};
pub use sitemap::{Sitemap, SitemapItem, load_sitemap};
