//! The book links table.

use hexdoc_text::{
  BookLinks,
  link::{book_links_key, fragment},
};
use log::warn;

use crate::model::Category;

/// Map every category, entry and anchored page to its fragment.
///
/// Categories are inserted before entries, so an entry sharing an id with a
/// category takes over the link.
#[must_use]
pub fn build_links<'a>(
  categories: impl IntoIterator<Item = &'a Category>,
) -> BookLinks {
  let categories: Vec<&Category> = categories.into_iter().collect();
  let mut links = BookLinks::new();

  for category in &categories {
    links.insert(
      book_links_key(&category.id, None),
      fragment(&category.id, None),
    );
  }

  for category in &categories {
    for entry in &category.entries {
      let key = book_links_key(&entry.id, None);
      if links.get(&key).is_some() {
        warn!("Entry {} shadows the category link with the same id", entry.id);
      }
      links.insert(key, fragment(&entry.id, None));

      for anchor in entry.pages.iter().filter_map(|page| page.anchor.as_deref())
      {
        links.insert(
          book_links_key(&entry.id, Some(anchor)),
          fragment(&entry.id, Some(anchor)),
        );
      }
    }
  }

  links
}
