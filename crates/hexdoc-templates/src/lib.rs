use std::collections::HashMap;

pub const BOOK_TEMPLATE: &str = include_str!("../templates/book.html");
pub const REDIRECT_TEMPLATE: &str = include_str!("../templates/redirect.html");
pub const MACROS_TEMPLATE: &str = include_str!("../templates/macros.html");

pub const PAGE_TEMPLATE: &str = include_str!("../templates/pages/page.html");
pub const TEXT_PAGE: &str = include_str!("../templates/pages/text.html");
pub const IMAGE_PAGE: &str = include_str!("../templates/pages/image.html");
pub const CRAFTING_PAGE: &str = include_str!("../templates/pages/crafting.html");
pub const COOKING_PAGE: &str = include_str!("../templates/pages/cooking.html");
pub const STONECUTTING_PAGE: &str =
  include_str!("../templates/pages/stonecutting.html");
pub const SMITHING_PAGE: &str = include_str!("../templates/pages/smithing.html");
pub const MULTIBLOCK_PAGE: &str =
  include_str!("../templates/pages/multiblock.html");
pub const ENTITY_PAGE: &str = include_str!("../templates/pages/entity.html");
pub const SPOTLIGHT_PAGE: &str =
  include_str!("../templates/pages/spotlight.html");
pub const LINK_PAGE: &str = include_str!("../templates/pages/link.html");
pub const RELATIONS_PAGE: &str =
  include_str!("../templates/pages/relations.html");
pub const QUEST_PAGE: &str = include_str!("../templates/pages/quest.html");
pub const EMPTY_PAGE: &str = include_str!("../templates/pages/empty.html");

pub const DEFAULT_CSS: &str = include_str!("../templates/style.css");
pub const MAIN_JS: &str = include_str!("../templates/main.js");

#[must_use]
pub fn all_templates() -> HashMap<&'static str, &'static str> {
  let mut templates = HashMap::new();
  templates.insert("book.html", BOOK_TEMPLATE);
  templates.insert("redirect.html", REDIRECT_TEMPLATE);
  templates.insert("macros.html", MACROS_TEMPLATE);
  templates.insert("pages/page.html", PAGE_TEMPLATE);
  templates.insert("pages/text.html", TEXT_PAGE);
  templates.insert("pages/image.html", IMAGE_PAGE);
  templates.insert("pages/crafting.html", CRAFTING_PAGE);
  templates.insert("pages/cooking.html", COOKING_PAGE);
  templates.insert("pages/stonecutting.html", STONECUTTING_PAGE);
  templates.insert("pages/smithing.html", SMITHING_PAGE);
  templates.insert("pages/multiblock.html", MULTIBLOCK_PAGE);
  templates.insert("pages/entity.html", ENTITY_PAGE);
  templates.insert("pages/spotlight.html", SPOTLIGHT_PAGE);
  templates.insert("pages/link.html", LINK_PAGE);
  templates.insert("pages/relations.html", RELATIONS_PAGE);
  templates.insert("pages/quest.html", QUEST_PAGE);
  templates.insert("pages/empty.html", EMPTY_PAGE);
  templates.insert("style.css", DEFAULT_CSS);
  templates.insert("main.js", MAIN_JS);
  templates
}

/// Every template rendered with tera, sorted by name.
#[must_use]
pub fn html_templates() -> Vec<(&'static str, &'static str)> {
  let mut templates: Vec<_> = all_templates()
    .into_iter()
    .filter(|(name, _)| name.ends_with(".html"))
    .collect();
  templates.sort_unstable();
  templates
}
