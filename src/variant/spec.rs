//! Raw output specs and their structured merge.

use std::fmt;

use serde_json::Value;

use super::field::{Field, MetaTransform};
use crate::error::{PlexError, PlexResult};

/// Keys that take part in expansion.
///
/// Any other key in a spec table is ignored by the expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    Name,
    Scale,
    Blur,
    Width,
    Height,
    Mode,
    Format,
    Inline,
}

impl OptionKey {
    pub const ALL: [OptionKey; 8] = [
        Self::Name,
        Self::Scale,
        Self::Blur,
        Self::Width,
        Self::Height,
        Self::Mode,
        Self::Format,
        Self::Inline,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Scale => "scale",
            Self::Blur => "blur",
            Self::Width => "width",
            Self::Height => "height",
            Self::Mode => "mode",
            Self::Format => "format",
            Self::Inline => "inline",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-declared output spec: a preset, a call-site override, or both merged.
///
/// Fields keep their declaration order, which decides the cartesian nesting
/// on expansion: the first declared key varies slowest.
#[derive(Clone, Default)]
pub struct OutputSpec {
    fields: Vec<(OptionKey, Field)>,
    /// Preset id, copied onto every descriptor unexpanded.
    pub preset: Option<String>,
    /// Metadata rewrite applied before derived fields are evaluated.
    pub meta: Option<MetaTransform>,
}

impl OutputSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter. A key that is already declared keeps its position.
    pub fn with(mut self, key: OptionKey, field: impl Into<Field>) -> Self {
        self.set(key, field.into());
        self
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = Some(preset.into());
        self
    }

    pub fn with_meta(mut self, meta: MetaTransform) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn set(&mut self, key: OptionKey, field: Field) {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = field,
            None => self.fields.push((key, field)),
        }
    }

    pub fn get(&self, key: OptionKey) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, field)| field)
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (OptionKey, &Field)> {
        self.fields.iter().map(|(key, field)| (*key, field))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a spec from a config table.
    ///
    /// Returns the spec plus the names of keys that were ignored because they
    /// take no part in expansion (e.g. a top-level `quality`, which belongs
    /// inside `format`).
    pub fn from_value(value: &Value) -> PlexResult<(Self, Vec<String>)> {
        let Value::Object(table) = value else {
            return Err(PlexError::config(format!(
                "output spec must be a table, got {value}"
            )));
        };

        let mut spec = Self::new();
        let mut ignored = Vec::new();
        for (key, value) in table {
            if key == "preset" {
                let preset = value
                    .as_str()
                    .ok_or_else(|| PlexError::config("`preset` must be a string"))?;
                spec.preset = Some(preset.to_string());
            } else if let Some(option) = OptionKey::from_name(key) {
                spec.set(option, Field::Literal(value.clone()));
            } else {
                ignored.push(key.clone());
            }
        }
        Ok((spec, ignored))
    }

    /// Layer `self` over `base`.
    ///
    /// Every field set here wins. Keys already declared in `base` keep their
    /// position; keys only declared here are appended in their own order.
    pub fn merged_over(self, base: &OutputSpec) -> OutputSpec {
        let mut merged = base.clone();
        for (key, field) in self.fields {
            merged.set(key, field);
        }
        if self.preset.is_some() {
            merged.preset = self.preset;
        }
        if self.meta.is_some() {
            merged.meta = self.meta;
        }
        merged
    }
}

impl fmt::Debug for OutputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("OutputSpec");
        for (key, field) in self.fields() {
            s.field(key.as_str(), field);
        }
        s.field("preset", &self.preset)
            .field("meta", &self.meta.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
