//! Source metadata and produced output info.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Metadata of a source image, as reported by the engine.
///
/// Dimensions are floats because a density suffix (`@2x`) divides them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Pixel density parsed from the file name (`photo@2x.png` → 2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<u32>,
}

impl Metadata {
    pub fn new(width: u32, height: u32, format: impl Into<String>) -> Self {
        Self {
            width: Some(f64::from(width)),
            height: Some(f64::from(height)),
            format: Some(format.into()),
            density: None,
        }
    }

    /// Both dimensions, if known.
    pub fn dimensions(&self) -> Option<(f64, f64)> {
        Some((self.width?, self.height?))
    }

    /// Apply the density encoded in `path`, dividing dimensions by it.
    ///
    /// Returns `self` unchanged if the file name carries no `@Nx` suffix.
    pub fn with_density_of(mut self, path: &Path) -> Self {
        let Some(density) = density_from_path(path) else {
            return self;
        };
        let factor = f64::from(density);
        self.width = self.width.map(|w| w / factor);
        self.height = self.height.map(|h| h / factor);
        self.density = Some(density);
        self
    }

    /// Look up a field by name for name templates.
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "width" => self.width.map(format_number),
            "height" => self.height.map(format_number),
            "format" => self.format.clone(),
            "density" => self.density.map(|d| d.to_string()),
            _ => None,
        }
    }
}

/// What the engine actually produced for one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputInfo {
    pub format: String,
    pub width: u32,
    pub height: u32,
    /// Encoded size in bytes (0 for synthetic output).
    #[serde(default)]
    pub size: usize,
}

impl OutputInfo {
    /// Look up a field by name for name templates.
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "format" => Some(self.format.clone()),
            "width" => Some(self.width.to_string()),
            "height" => Some(self.height.to_string()),
            "size" => Some(self.size.to_string()),
            _ => None,
        }
    }
}

/// Parse the `@Nx` density marker from a file name.
///
/// Only matches the marker directly before the extension: `logo@2x.png`.
pub fn density_from_path(path: &Path) -> Option<u32> {
    let stem = path.file_stem()?.to_str()?;
    let (_, marker) = stem.rsplit_once('@')?;
    let digits = marker.strip_suffix('x')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|d: &u32| *d > 0)
}

/// Strip the `@Nx` density marker from a file stem.
pub fn strip_density(stem: &str) -> &str {
    match stem.rsplit_once('@') {
        Some((base, marker))
            if marker.len() > 1
                && marker.ends_with('x')
                && marker[..marker.len() - 1].bytes().all(|b| b.is_ascii_digit()) =>
        {
            base
        }
        _ => stem,
    }
}

/// Render a number the way templates expect: integral values without `.0`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_density_from_path() {
        assert_eq!(density_from_path(Path::new("img/logo@2x.png")), Some(2));
        assert_eq!(density_from_path(Path::new("logo@12x.jpeg")), Some(12));
        assert_eq!(density_from_path(Path::new("logo.png")), None);
        assert_eq!(density_from_path(Path::new("logo@x.png")), None);
        assert_eq!(density_from_path(Path::new("me@home.png")), None);
        assert_eq!(density_from_path(Path::new("logo@0x.png")), None);
    }

    #[test]
    fn test_strip_density() {
        assert_eq!(strip_density("logo@2x"), "logo");
        assert_eq!(strip_density("logo"), "logo");
        assert_eq!(strip_density("me@home"), "me@home");
        assert_eq!(strip_density("a@x"), "a@x");
    }

    #[test]
    fn test_with_density_divides_dimensions() {
        let meta = Metadata::new(600, 300, "png").with_density_of(&PathBuf::from("hero@2x.png"));
        assert_eq!(meta.dimensions(), Some((300.0, 150.0)));
        assert_eq!(meta.density, Some(2));
    }

    #[test]
    fn test_with_density_without_marker_is_identity() {
        let meta = Metadata::new(600, 300, "png");
        assert_eq!(meta.clone().with_density_of(Path::new("hero.png")), meta);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(200.0), "200");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-3.0), "-3");
    }

    #[test]
    fn test_metadata_json_roundtrip_skips_missing() {
        let meta = Metadata {
            format: Some("png".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(json, r#"{"format":"png"}"#);
        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }
}
