//! Expand output specs into concrete variant descriptors.

use serde::{Deserialize, Serialize};

use super::normalize::{OptionValue, normalize};
use super::product::cartesian_product;
use super::spec::{OptionKey, OutputSpec};
use crate::error::PlexResult;
use crate::image::{Fit, FormatSpec, Metadata, format_number};

/// A fully resolved, scalar-valued option set for one variant.
///
/// The JSON form of a descriptor is what gets hashed for cache keys and
/// `[hash]` tokens, so absent fields are skipped rather than written as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Fit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
}

impl VariantDescriptor {
    /// Whether the variant should be embedded as a data URI.
    pub fn is_inline(&self) -> bool {
        self.inline.unwrap_or(false)
    }

    /// Look up a field by name for name templates.
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "name" => self.name.clone(),
            "scale" => self.scale.map(format_number),
            "blur" => self.blur.map(format_number),
            "width" => self.width.map(format_number),
            "height" => self.height.map(format_number),
            "mode" => self.mode.map(|m| m.as_str().to_string()),
            "format" => self.format.as_ref().map(|f| f.id.clone()),
            "inline" => self.inline.map(|b| b.to_string()),
            "preset" => self.preset.clone(),
            _ => None,
        }
    }

    fn set(&mut self, key: OptionKey, value: OptionValue) {
        match (key, value) {
            (OptionKey::Name, OptionValue::Text(s)) => self.name = Some(s),
            (OptionKey::Scale, OptionValue::Number(n)) => self.scale = Some(n),
            (OptionKey::Blur, OptionValue::Number(n)) => self.blur = Some(n),
            (OptionKey::Width, OptionValue::Number(n)) => self.width = Some(n),
            (OptionKey::Height, OptionValue::Number(n)) => self.height = Some(n),
            (OptionKey::Mode, OptionValue::Mode(m)) => self.mode = Some(m),
            (OptionKey::Format, OptionValue::Format(f)) => self.format = Some(f),
            (OptionKey::Inline, OptionValue::Flag(b)) => self.inline = Some(b),
            // normalize() coerces every value to its key's type
            (key, value) => unreachable!("{key} cannot hold {value:?}"),
        }
    }
}

/// Expand one spec into its ordered descriptor list.
///
/// The spec's metadata transform (if any) runs first, then every field is
/// normalized and the allow-listed keys are multiplexed. Same metadata and
/// same spec always give the same list.
pub fn expand(spec: &OutputSpec, meta: &Metadata) -> PlexResult<Vec<VariantDescriptor>> {
    let transformed;
    let meta = match spec.meta.as_ref() {
        Some(transform) => {
            transformed = transform(meta);
            &transformed
        }
        None => meta,
    };

    let normalized = normalize(spec, meta)?;
    let descriptors = cartesian_product(&normalized.lists)
        .into_iter()
        .map(|combo| {
            let mut descriptor = VariantDescriptor {
                preset: normalized.preset.clone(),
                ..Default::default()
            };
            for (key, value) in combo {
                descriptor.set(key, value);
            }
            descriptor
        })
        .collect();

    Ok(descriptors)
}
