#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  reason = "Fine in benchmarks"
)]
use std::{collections::HashMap, hint::black_box};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hexdoc_core::I18n;
use hexdoc_text::{
  BookLinks,
  FormatOptions,
  Formatter,
  LinkOverrides,
  MacroSet,
  to_html,
};

const TEXT_SMALL: &str = "Casting a $(thing)Hex/$ takes $(bold)two/$ hands.";

const TEXT_LARGE: &str = "$(media)Media/$ is a form of mental energy \
  external to a mind. All living creatures generate, use, and store it. \
  $(br2)I am able to use a $(l:items/staff)$(item)Staff/$$(/l) to draw \
  $(thing)patterns/$ in the air. $(li)$(o)first/$, draw the start. \
  $(li)$(6)then/$, the rest. $(li)$(k)secret/$$(br)$(t:A tooltip)hover \
  me$(/t) or $(c:/hexcasting help)click me$(/c). $(#ff00ff)pink$(0)black \
  $(n)underlined$(m)struck$() and $(item)$(l)bold item$() plain. \
  $(p)A new paragraph with $(l:https://example.com)an external \
  link$(/l) and $(k:use) to open.";

fn formatter() -> Formatter {
  Formatter::new(
    FormatOptions {
      book_namespace: "hexcasting".to_string(),
      is_0_black:     false,
    },
    MacroSet::with_defaults([("$(media)", "$(#8d6acc)")]).unwrap(),
    LinkOverrides::default(),
  )
}

fn i18n() -> I18n {
  let lookup = HashMap::from([(
    "key.use".to_string(),
    "Right Click".to_string(),
  )]);
  I18n::new("en_us", lookup, true)
}

fn bench_format(c: &mut Criterion) {
  let mut group = c.benchmark_group("format");
  let formatter = formatter();
  let i18n = i18n();

  for (name, text) in [("small", TEXT_SMALL), ("large", TEXT_LARGE)] {
    group.bench_with_input(BenchmarkId::new("tree", name), &text, |b, text| {
      b.iter(|| formatter.format(black_box(text), black_box(&i18n)).unwrap());
    });
  }

  group.finish();
}

fn bench_to_html(c: &mut Criterion) {
  let mut group = c.benchmark_group("to_html");
  let formatter = formatter();
  let i18n = i18n();

  let mut links = BookLinks::new();
  links.insert("hexcasting:items/staff", "#hexcasting:items/staff");

  for (name, text) in [("small", TEXT_SMALL), ("large", TEXT_LARGE)] {
    let tree = formatter.format(text, &i18n).unwrap();
    group.bench_with_input(BenchmarkId::new("html", name), &tree, |b, tree| {
      b.iter(|| to_html(black_box(tree), black_box(&links)).unwrap());
    });
  }

  group.finish();
}

criterion_group!(benches, bench_format, bench_to_html);
criterion_main!(benches);
