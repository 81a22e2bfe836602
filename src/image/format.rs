//! Output format designations.
//!
//! A format is written either as a bare string or as a table carrying the
//! format id plus encoder parameters:
//!
//! ```toml
//! format = "webp"
//! format = { format = "jpeg", quality = 60 }
//! format = { id = "jpeg", quality = 60 }   # deprecated alias
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PlexError, PlexResult};

/// Encoder parameters (`quality`, `speed`, ...), passed through to the engine.
pub type FormatOptions = Map<String, Value>;

/// A resolved `(format id, encoder options)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatSpec {
    pub id: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: FormatOptions,
}

impl FormatSpec {
    /// A format without encoder options.
    pub fn new(id: &str) -> Self {
        Self {
            id: normalize_id(id),
            options: FormatOptions::new(),
        }
    }

    /// Parse a string or table designation.
    pub fn parse(raw: &Value) -> PlexResult<Self> {
        match raw {
            Value::String(id) if !id.trim().is_empty() => Ok(Self::new(id)),
            Value::Object(table) => {
                let id = table
                    .get("format")
                    .or_else(|| table.get("id"))
                    .and_then(Value::as_str)
                    .filter(|s| !s.trim().is_empty())
                    .ok_or_else(|| PlexError::config("unable to determine image format"))?;
                let options = table
                    .iter()
                    .filter(|(key, _)| *key != "format" && *key != "id")
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                Ok(Self {
                    id: normalize_id(id),
                    options,
                })
            }
            other => Err(PlexError::config(format!(
                "invalid format designation: {other}"
            ))),
        }
    }

    /// File extension including the leading dot.
    pub fn extension(&self) -> String {
        extension(&self.id)
    }

    /// Integer encoder option, if present and numeric.
    pub fn option_u8(&self, key: &str) -> Option<u8> {
        self.options
            .get(key)
            .and_then(Value::as_f64)
            .map(|v| v.round().clamp(0.0, 255.0) as u8)
    }
}

/// Lower-case a format id and fold common aliases.
pub fn normalize_id(id: &str) -> String {
    let id = id.trim().to_ascii_lowercase();
    match id.as_str() {
        "jpg" => "jpeg".to_string(),
        "tif" => "tiff".to_string(),
        _ => id,
    }
}

/// File extension (with dot) for a format id.
pub fn extension(id: &str) -> String {
    match id {
        "jpeg" => ".jpg".to_string(),
        "tiff" => ".tif".to_string(),
        other => format!(".{other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_string() {
        let spec = FormatSpec::parse(&json!("webp")).unwrap();
        assert_eq!(spec.id, "webp");
        assert!(spec.options.is_empty());
    }

    #[test]
    fn test_parse_object_with_options() {
        let spec = FormatSpec::parse(&json!({"format": "jpeg", "quality": 60})).unwrap();
        assert_eq!(spec.id, "jpeg");
        assert_eq!(spec.options.get("quality"), Some(&json!(60)));
        assert!(!spec.options.contains_key("format"));
        assert_eq!(spec.option_u8("quality"), Some(60));
    }

    #[test]
    fn test_parse_deprecated_id_alias() {
        let spec = FormatSpec::parse(&json!({"id": "png", "compression": 9})).unwrap();
        assert_eq!(spec.id, "png");
        assert!(!spec.options.contains_key("id"));
    }

    #[test]
    fn test_format_wins_over_id() {
        let spec = FormatSpec::parse(&json!({"id": "png", "format": "webp"})).unwrap();
        assert_eq!(spec.id, "webp");
    }

    #[test]
    fn test_parse_missing_format_is_error() {
        let err = FormatSpec::parse(&json!({"quality": 50})).unwrap_err();
        assert!(err.is_config());
        assert!(FormatSpec::parse(&json!(12)).is_err());
        assert!(FormatSpec::parse(&json!("")).is_err());
    }

    #[test]
    fn test_aliases_are_folded() {
        assert_eq!(FormatSpec::new("JPG").id, "jpeg");
        assert_eq!(FormatSpec::new("tif").id, "tiff");
    }

    #[test]
    fn test_extension_table() {
        assert_eq!(extension("jpeg"), ".jpg");
        assert_eq!(extension("webp"), ".webp");
        assert_eq!(FormatSpec::new("avif").extension(), ".avif");
    }
}
