//! Turn raw spec fields into per-key value lists ready for expansion.

use serde_json::Value;

use super::spec::{OptionKey, OutputSpec};
use crate::error::{PlexError, PlexResult};
use crate::image::{Fit, FormatSpec, Metadata};

/// One concrete, coerced option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Text(String),
    Number(f64),
    Flag(bool),
    Mode(Fit),
    Format(FormatSpec),
}

/// Value lists in spec declaration order, plus pass-through fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedOptions {
    pub lists: Vec<(OptionKey, Vec<OptionValue>)>,
    pub preset: Option<String>,
}

/// Normalize every expandable field of `spec` against `meta`.
///
/// - derived fields are invoked with `meta` and their result normalized again
/// - arrays drop `null` entries; an array left empty omits the key
/// - scalars become single-element lists
/// - `null` omits the key
pub fn normalize(spec: &OutputSpec, meta: &Metadata) -> PlexResult<NormalizedOptions> {
    let mut lists = Vec::with_capacity(OptionKey::ALL.len());

    for (key, field) in spec.fields() {
        let values = normalize_value(key, &field.resolve(meta))?;
        if !values.is_empty() {
            lists.push((key, values));
        }
    }

    Ok(NormalizedOptions {
        lists,
        preset: spec.preset.clone(),
    })
}

fn normalize_value(key: OptionKey, value: &Value) -> PlexResult<Vec<OptionValue>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(|item| match item {
                Value::Array(_) => Err(PlexError::config(format!(
                    "`{key}` does not accept nested arrays"
                ))),
                _ => coerce(key, item),
            })
            .collect(),
        scalar => Ok(vec![coerce(key, scalar)?]),
    }
}

/// Coerce one scalar to the type its key expects.
fn coerce(key: OptionKey, value: &Value) -> PlexResult<OptionValue> {
    match key {
        OptionKey::Scale | OptionKey::Blur | OptionKey::Width | OptionKey::Height => {
            let number = parse_float(value).ok_or_else(|| {
                PlexError::config(format!("`{key}` must be a number, got {value}"))
            })?;
            let valid = match key {
                OptionKey::Blur => number >= 0.0,
                _ => number > 0.0,
            };
            if !valid {
                return Err(PlexError::config(format!(
                    "`{key}` out of range: {number}"
                )));
            }
            Ok(OptionValue::Number(number))
        }
        OptionKey::Name => value
            .as_str()
            .map(|s| OptionValue::Text(s.to_string()))
            .ok_or_else(|| PlexError::config(format!("`name` must be a string, got {value}"))),
        OptionKey::Mode => match value.as_str() {
            Some("cover") => Ok(OptionValue::Mode(Fit::Cover)),
            Some("contain") => Ok(OptionValue::Mode(Fit::Contain)),
            _ => Err(PlexError::config(format!(
                "unknown mode {value}, expected \"cover\" or \"contain\""
            ))),
        },
        OptionKey::Format => FormatSpec::parse(value).map(OptionValue::Format),
        OptionKey::Inline => value
            .as_bool()
            .map(OptionValue::Flag)
            .ok_or_else(|| PlexError::config(format!("`inline` must be a boolean, got {value}"))),
    }
}

/// Numbers pass through; numeric strings (`"200"`, `" 1.5 "`) are parsed.
fn parse_float(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}
