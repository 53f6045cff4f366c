//! Proc-macros for the hexdoc configuration system.
//!
//! Provides the `Configurable` derive, which generates `KEY=VALUE` override
//! handling and field-wise merging for configuration structs.

use proc_macro::TokenStream;
use quote::{ToTokens, quote};
use syn::{Attribute, Data, DeriveInput, Fields, Ident, Type, parse_macro_input};

/// Attribute configuration for a field.
#[derive(Default)]
struct FieldConfig {
  /// The config key name (defaults to field name).
  key: Option<String>,

  /// Whether this field is a nested `Configurable` struct.
  nested: bool,

  /// Whether the field is skipped for overrides.
  skip: bool,

  /// Deprecation info: (version, replacement).
  deprecated: Option<(String, Option<String>)>,

  /// Allow empty values (set to None).
  allow_empty: bool,

  /// Pending replacement value (set before deprecated).
  pending_replacement: Option<String>,
}

impl FieldConfig {
  fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
    let mut config = Self::default();

    for attr in attrs {
      if !attr.path().is_ident("config") {
        continue;
      }

      attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("key") {
          let lit: syn::LitStr = meta.value()?.parse()?;
          config.key = Some(lit.value());
        } else if meta.path.is_ident("deprecated") {
          let lit: syn::LitStr = meta.value()?.parse()?;
          config.deprecated =
            Some((lit.value(), config.pending_replacement.take()));
        } else if meta.path.is_ident("replacement") {
          let lit: syn::LitStr = meta.value()?.parse()?;
          config.pending_replacement = Some(lit.value());
        } else if meta.path.is_ident("allow_empty") {
          config.allow_empty = true;
        } else if meta.path.is_ident("nested") {
          config.nested = true;
        } else if meta.path.is_ident("skip") {
          config.skip = true;
        } else {
          return Err(meta.error("unsupported config attribute"));
        }
        Ok(())
      })?;
    }

    Ok(config)
  }
}

/// The shape of a field type, as far as overriding and merging care.
enum FieldKind {
  Bool,
  String,
  Path,
  OptionOf(String),
  VecOf(String),
  Map,
  Other,
}

impl FieldKind {
  fn of(ty: &Type) -> Self {
    // Token streams print as `Vec < String >`, strip the spacing.
    let type_str: String = ty
      .to_token_stream()
      .to_string()
      .chars()
      .filter(|c| !c.is_whitespace())
      .collect();

    if let Some(inner) = strip_generic(&type_str, "Option") {
      return Self::OptionOf(inner.to_string());
    }
    if let Some(inner) = strip_generic(&type_str, "Vec") {
      return Self::VecOf(inner.to_string());
    }
    if type_str.contains("HashMap<") || type_str.contains("IndexMap<") {
      return Self::Map;
    }
    match type_str.as_str() {
      "bool" => Self::Bool,
      "String" => Self::String,
      s if s.ends_with("PathBuf") => Self::Path,
      _ => Self::Other,
    }
  }
}

fn strip_generic<'a>(type_str: &'a str, outer: &str) -> Option<&'a str> {
  type_str
    .strip_prefix(outer)?
    .strip_prefix('<')?
    .strip_suffix('>')
}

/// Derive macro for configuration structs.
///
/// Generates two inherent methods:
///
/// - `apply_override(&mut self, key, value)`, which parses `value` into the
///   field named by `key`. Nested fields (`#[config(nested)]`) take dotted
///   keys such as `text.is_0_black`, map fields take `field.map_key`, and
///   vector fields take a comma separated list.
/// - `merge_fields(&mut self, other)`, which merges a later configuration
///   into this one. Vectors and maps are extended, options replaced when
///   set, nested structs merged recursively, everything else replaced. An
///   optional nested section is replaced as a whole when the other config
///   sets it.
///
/// The generated code expects `crate::error::ConfigError` to have
/// `UnknownKey` and `InvalidValue` variants.
#[proc_macro_derive(Configurable, attributes(config))]
pub fn derive_configurable(input: TokenStream) -> TokenStream {
  let input = parse_macro_input!(input as DeriveInput);

  match expand(&input) {
    Ok(tokens) => TokenStream::from(tokens),
    Err(e) => e.to_compile_error().into(),
  }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
  let name = &input.ident;
  let (impl_generics, ty_generics, where_clause) =
    input.generics.split_for_impl();

  let Data::Struct(data) = &input.data else {
    return Err(syn::Error::new_spanned(
      input,
      "Configurable can only be derived for structs",
    ));
  };

  let fields = &data.fields;
  let field_handlers = generate_field_handlers(fields)?;
  let merge_handlers = generate_merge_handlers(fields)?;

  Ok(quote! {
    impl #impl_generics #name #ty_generics #where_clause {
      /// Apply a configuration override by key.
      ///
      /// # Errors
      ///
      /// Returns an error if the key is unknown or the value cannot be
      /// parsed for the field it names.
      pub fn apply_override(
        &mut self,
        key: &str,
        value: &str,
      ) -> std::result::Result<(), crate::error::ConfigError> {
        use crate::error::ConfigError;

        #(#field_handlers)*

        Err(ConfigError::UnknownKey(key.to_string()))
      }

      /// Merge another config into this one.
      pub fn merge_fields(&mut self, other: Self) {
        #(#merge_handlers)*
      }
    }
  })
}

fn named_field(field: &syn::Field) -> syn::Result<&Ident> {
  field.ident.as_ref().ok_or_else(|| {
    syn::Error::new_spanned(field, "Configurable requires named fields")
  })
}

fn generate_field_handlers(
  fields: &Fields,
) -> syn::Result<Vec<proc_macro2::TokenStream>> {
  let mut handlers = Vec::new();

  for field in fields {
    let field_config = FieldConfig::from_attrs(&field.attrs)?;
    if field_config.skip {
      continue;
    }

    let field_name = named_field(field)?;
    let field_key = field_config
      .key
      .clone()
      .unwrap_or_else(|| field_name.to_string());

    handlers.push(generate_field_handler(
      field_name,
      &field_key,
      &field.ty,
      &field_config,
    ));
  }

  Ok(handlers)
}

fn generate_field_handler(
  field_name: &Ident,
  field_key: &str,
  field_type: &Type,
  config: &FieldConfig,
) -> proc_macro2::TokenStream {
  let kind = FieldKind::of(field_type);

  if config.nested {
    // Optional sections are created on first use.
    if matches!(kind, FieldKind::OptionOf(_)) {
      return quote! {
        if let Some(subkey) = key.strip_prefix(concat!(#field_key, ".")) {
          return self
            .#field_name
            .get_or_insert_with(Default::default)
            .apply_override(subkey, value);
        }
      };
    }
    return quote! {
      if let Some(subkey) = key.strip_prefix(concat!(#field_key, ".")) {
        return self.#field_name.apply_override(subkey, value);
      }
    };
  }

  if matches!(kind, FieldKind::Map) {
    return quote! {
      if let Some(map_key) = key.strip_prefix(concat!(#field_key, ".")) {
        self.#field_name.insert(map_key.to_string(), value.to_string());
        return Ok(());
      }
    };
  }

  let deprecation_check =
    config.deprecated.as_ref().map(|(version, replacement)| {
      let msg = replacement.as_ref().map_or_else(
        || {
          format!("The '{field_key}' config key is deprecated since {version}.")
        },
        |replacement| {
          format!(
            "The '{field_key}' config key is deprecated since {version}. Use \
             '{replacement}' instead."
          )
        },
      );
      quote! { log::warn!(#msg); }
    });

  let value_assignment = generate_value_assignment(field_name, field_key, &kind, config);

  quote! {
    if key == #field_key {
      #deprecation_check
      #value_assignment
      return Ok(());
    }
  }
}

fn parse_expr(field_key: &str, expected: &str) -> proc_macro2::TokenStream {
  quote! {
    value.parse().map_err(|_| ConfigError::InvalidValue {
      key:      #field_key.to_string(),
      value:    value.to_string(),
      expected: #expected,
    })?
  }
}

fn generate_value_assignment(
  field_name: &Ident,
  field_key: &str,
  kind: &FieldKind,
  config: &FieldConfig,
) -> proc_macro2::TokenStream {
  match kind {
    FieldKind::Bool => {
      quote! {
        self.#field_name = match value.to_lowercase().as_str() {
          "true" | "yes" | "1" => true,
          "false" | "no" | "0" => false,
          _ => {
            return Err(ConfigError::InvalidValue {
              key:      #field_key.to_string(),
              value:    value.to_string(),
              expected: "true/false, yes/no, or 1/0",
            });
          }
        };
      }
    },
    FieldKind::String => quote! { self.#field_name = value.to_string(); },
    FieldKind::Path => {
      quote! { self.#field_name = std::path::PathBuf::from(value); }
    },
    FieldKind::OptionOf(inner) => {
      let parsed = if inner == "String" {
        quote! { value.to_string() }
      } else if inner.ends_with("PathBuf") {
        quote! { std::path::PathBuf::from(value) }
      } else {
        parse_expr(field_key, "a value of the field's type")
      };

      if config.allow_empty {
        quote! {
          self.#field_name = if value.is_empty() { None } else { Some(#parsed) };
        }
      } else {
        quote! { self.#field_name = Some(#parsed); }
      }
    },
    FieldKind::VecOf(inner) => {
      let item = if inner.ends_with("PathBuf") {
        quote! { std::path::PathBuf::from(item) }
      } else {
        quote! { item.to_string() }
      };
      quote! {
        self.#field_name = value
          .split(',')
          .map(str::trim)
          .filter(|item| !item.is_empty())
          .map(|item| #item)
          .collect();
      }
    },
    FieldKind::Map | FieldKind::Other => {
      let parsed = parse_expr(field_key, "a value of the field's type");
      quote! { self.#field_name = #parsed; }
    },
  }
}

fn generate_merge_handlers(
  fields: &Fields,
) -> syn::Result<Vec<proc_macro2::TokenStream>> {
  let mut handlers = Vec::new();

  for field in fields {
    let field_config = FieldConfig::from_attrs(&field.attrs)?;
    let field_name = named_field(field)?;

    let nested_option =
      field_config.nested && matches!(FieldKind::of(&field.ty), FieldKind::OptionOf(_));

    let handler = if field_config.nested && !nested_option {
      quote! {
        self.#field_name.merge_fields(other.#field_name);
      }
    } else {
      match FieldKind::of(&field.ty) {
        FieldKind::OptionOf(_) => {
          quote! {
            if other.#field_name.is_some() {
              self.#field_name = other.#field_name;
            }
          }
        },
        // Later entries take precedence for maps.
        FieldKind::VecOf(_) | FieldKind::Map => {
          quote! {
            self.#field_name.extend(other.#field_name);
          }
        },
        _ => {
          quote! {
            self.#field_name = other.#field_name;
          }
        },
      }
    };

    handlers.push(handler);
  }

  Ok(handlers)
}
