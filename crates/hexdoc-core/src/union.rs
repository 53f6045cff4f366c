//! Internally tagged union resolution.
//!
//! Patchouli and Minecraft data use JSON objects whose concrete shape is
//! selected by a discriminator field, usually `type`. A [`TypeRegistry`] maps
//! discriminator values to the variants registered for them and validates a
//! payload against every candidate, so that a payload matching no variant, or
//! more than one, is reported with every attempt spelled out.
//!
//! Registries are assembled once with a [`TypeRegistryBuilder`] and frozen
//! before any resolution happens; there is no global registration.

use std::{collections::HashMap, fmt};

use serde_json::Value;

use crate::{
  error::{CandidateFailure, UnionError},
  resource::ResourceLocation,
};

/// Error type returned by variant validators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Validates a payload as one concrete variant.
pub type Validator<T, C> = fn(&Value, &C) -> Result<T, BoxError>;

/// Which payloads a variant is a candidate for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
  /// Payloads whose discriminator equals this value.
  Value(ResourceLocation),
  /// Payloads that have no discriminator key at all.
  Absent,
  /// Never a match target. Listed for schema purposes only.
  Abstract,
}

impl fmt::Display for Tag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Value(id) => write!(f, "{id}"),
      Self::Absent => f.write_str("<no discriminator>"),
      Self::Abstract => f.write_str("<abstract>"),
    }
  }
}

/// Input to [`TypeRegistry::resolve`].
///
/// An already resolved value passes through untouched.
#[derive(Debug)]
pub enum UnionInput<'a, T> {
  Raw(&'a Value),
  Resolved(T),
}

struct Variant<T, C> {
  name:     &'static str,
  tag:      Tag,
  validate: Option<Validator<T, C>>,
}

/// Collects variants for one union family before freezing them into a
/// [`TypeRegistry`].
pub struct TypeRegistryBuilder<T, C> {
  union:             &'static str,
  key:               &'static str,
  default_namespace: &'static str,
  variants:          Vec<Variant<T, C>>,
  invalid_tags:      Vec<String>,
}

impl<T, C> TypeRegistryBuilder<T, C> {
  /// Start a registry for the union called `union`, discriminated by `key`.
  /// Bare discriminator values are read in `default_namespace`.
  #[must_use]
  pub const fn new(
    union: &'static str,
    key: &'static str,
    default_namespace: &'static str,
  ) -> Self {
    Self {
      union,
      key,
      default_namespace,
      variants: Vec::new(),
      invalid_tags: Vec::new(),
    }
  }

  /// Register a concrete variant.
  #[must_use]
  pub fn variant(
    mut self,
    name: &'static str,
    tag: Tag,
    validate: Validator<T, C>,
  ) -> Self {
    self.variants.push(Variant {
      name,
      tag,
      validate: Some(validate),
    });
    self
  }

  /// Register a variant under a namespaced discriminator value.
  ///
  /// `tag` must be a valid resource location; invalid values are reported
  /// by [`Self::build`].
  #[must_use]
  pub fn tagged(
    mut self,
    name: &'static str,
    tag: &str,
    validate: Validator<T, C>,
  ) -> Self {
    match ResourceLocation::parse_with_default(tag, self.default_namespace) {
      Ok(id) => self.variant(name, Tag::Value(id), validate),
      Err(_) => {
        self.invalid_tags.push(tag.to_string());
        self
      },
    }
  }

  /// Register a variant that only exists for schema purposes.
  #[must_use]
  pub fn abstract_variant(mut self, name: &'static str) -> Self {
    self.variants.push(Variant {
      name,
      tag: Tag::Abstract,
      validate: None,
    });
    self
  }

  /// Freeze the collected variants into an immutable lookup table.
  ///
  /// # Errors
  ///
  /// Returns [`UnionError::InvalidTag`] if a variant was registered with a
  /// tag that is not a resource location, and
  /// [`UnionError::DuplicateVariant`] if the same variant name was registered
  /// twice.
  pub fn build(self) -> Result<TypeRegistry<T, C>, UnionError> {
    if let Some(tag) = self.invalid_tags.into_iter().next() {
      return Err(UnionError::InvalidTag {
        union: self.union,
        key:   self.key,
        value: tag,
      });
    }

    let mut by_tag: HashMap<Tag, Vec<usize>> = HashMap::new();
    let mut seen = Vec::with_capacity(self.variants.len());

    for (index, variant) in self.variants.iter().enumerate() {
      if seen.contains(&variant.name) {
        return Err(UnionError::DuplicateVariant {
          union: self.union,
          name:  variant.name,
        });
      }
      seen.push(variant.name);

      if variant.tag != Tag::Abstract {
        by_tag.entry(variant.tag.clone()).or_default().push(index);
      }
    }

    Ok(TypeRegistry {
      union: self.union,
      key: self.key,
      default_namespace: self.default_namespace,
      variants: self.variants,
      by_tag,
    })
  }
}

/// Frozen lookup table from discriminator values to variants.
pub struct TypeRegistry<T, C> {
  union:             &'static str,
  key:               &'static str,
  default_namespace: &'static str,
  variants:          Vec<Variant<T, C>>,
  by_tag:            HashMap<Tag, Vec<usize>>,
}

impl<T, C> fmt::Debug for TypeRegistry<T, C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TypeRegistry")
      .field("union", &self.union)
      .field("key", &self.key)
      .field("variants", &self.variant_names().collect::<Vec<_>>())
      .finish_non_exhaustive()
  }
}

impl<T, C> TypeRegistry<T, C> {
  #[must_use]
  pub const fn union_name(&self) -> &'static str {
    self.union
  }

  #[must_use]
  pub const fn key(&self) -> &'static str {
    self.key
  }

  /// Names of every registered variant, abstract ones included.
  pub fn variant_names(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.variants.iter().map(|v| v.name)
  }

  /// Every concrete discriminator value, sorted.
  #[must_use]
  pub fn tags(&self) -> Vec<String> {
    let mut tags: Vec<String> =
      self.by_tag.keys().map(ToString::to_string).collect();
    tags.sort();
    tags
  }

  /// Read the discriminator of a payload.
  ///
  /// # Errors
  ///
  /// Returns an error if the payload is not an object, or its discriminator
  /// is not a valid resource location string.
  pub fn tag_of(&self, value: &Value) -> Result<Tag, UnionError> {
    let object = value.as_object().ok_or(UnionError::NotAnObject {
      union: self.union,
    })?;

    match object.get(self.key) {
      None => Ok(Tag::Absent),
      Some(Value::String(raw)) => {
        ResourceLocation::parse_with_default(raw, self.default_namespace)
          .map(Tag::Value)
          .map_err(|_| {
            UnionError::InvalidTag {
              union: self.union,
              key:   self.key,
              value: raw.clone(),
            }
          })
      },
      Some(other) => {
        Err(UnionError::InvalidTag {
          union: self.union,
          key:   self.key,
          value: other.to_string(),
        })
      },
    }
  }

  /// Resolve a payload, or pass an already resolved value through.
  ///
  /// # Errors
  ///
  /// See [`Self::resolve_with`].
  pub fn resolve(
    &self,
    input: UnionInput<'_, T>,
    ctx: &C,
  ) -> Result<T, UnionError> {
    match input {
      UnionInput::Resolved(value) => Ok(value),
      UnionInput::Raw(value) => self.resolve_with(value, ctx, false),
    }
  }

  /// Resolve a raw payload, requiring exactly one matching variant.
  ///
  /// # Errors
  ///
  /// See [`Self::resolve_with`].
  pub fn resolve_value(&self, value: &Value, ctx: &C) -> Result<T, UnionError> {
    self.resolve_with(value, ctx, false)
  }

  /// Resolve a raw payload against every candidate for its discriminator.
  ///
  /// Every candidate is attempted unless `allow_ambiguous` is set, in which
  /// case the first success is returned. The book loaders always resolve
  /// strictly; the first-match mode is for unions whose variants overlap.
  ///
  /// # Errors
  ///
  /// - [`UnionError::MissingKey`] / [`UnionError::UnknownTag`] when no
  ///   variant is registered for the payload's discriminator.
  /// - [`UnionError::NoMatch`] with every candidate's failure when none
  ///   validates.
  /// - [`UnionError::Ambiguous`] naming every match when several validate.
  pub fn resolve_with(
    &self,
    value: &Value,
    ctx: &C,
    allow_ambiguous: bool,
  ) -> Result<T, UnionError> {
    let tag = self.tag_of(value)?;

    let Some(candidates) = self.by_tag.get(&tag) else {
      return Err(match tag {
        Tag::Absent => {
          UnionError::MissingKey {
            union: self.union,
            key:   self.key,
          }
        },
        other => {
          UnionError::UnknownTag {
            union: self.union,
            key:   self.key,
            tag:   other.to_string(),
            known: self.tags(),
          }
        },
      });
    };

    let mut matched: Vec<(&'static str, T)> = Vec::new();
    let mut failures = Vec::new();

    for &index in candidates {
      let variant = &self.variants[index];
      let Some(validate) = variant.validate else {
        continue;
      };

      match validate(value, ctx) {
        Ok(result) => {
          if allow_ambiguous {
            return Ok(result);
          }
          matched.push((variant.name, result));
        },
        Err(error) => {
          failures.push(CandidateFailure {
            variant: variant.name,
            error,
          });
        },
      }
    }

    if matched.len() > 1 {
      return Err(UnionError::Ambiguous {
        union:   self.union,
        tag:     tag.to_string(),
        matched: matched.into_iter().map(|(name, _)| name).collect(),
      });
    }

    matched.pop().map(|(_, result)| result).ok_or_else(|| {
      UnionError::NoMatch {
        union: self.union,
        tag: tag.to_string(),
        failures,
      }
    })
  }
}
