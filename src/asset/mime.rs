//! MIME types of produced image files.

use std::path::Path;

/// Image MIME type constants.
pub mod types {
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const AVIF: &str = "image/avif";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";
    pub const BMP: &str = "image/bmp";
    pub const TIFF: &str = "image/tiff";
    pub const HEIF: &str = "image/heif";
}

/// Guess the MIME type from a file name's extension.
pub fn from_path(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(from_extension)
}

/// Guess the MIME type from an extension or format id (case-insensitive).
pub fn from_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => types::PNG,
        "jpg" | "jpeg" => types::JPEG,
        "gif" => types::GIF,
        "webp" => types::WEBP,
        "avif" => types::AVIF,
        "svg" => types::SVG,
        "ico" => types::ICO,
        "bmp" => types::BMP,
        "tif" | "tiff" => types::TIFF,
        "heif" | "heic" => types::HEIF,
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(from_path(Path::new("a/logo.png")), Some(types::PNG));
        assert_eq!(from_path(Path::new("photo.JPG")), Some(types::JPEG));
        assert_eq!(from_path(Path::new("x.avif")), Some(types::AVIF));
        assert_eq!(from_path(Path::new("unknown.xyz")), None);
        assert_eq!(from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_from_format_id() {
        assert_eq!(from_extension("tiff"), Some(types::TIFF));
        assert_eq!(from_extension(".webp"), Some(types::WEBP));
    }
}
