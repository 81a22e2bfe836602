//! Pure-Rust engine built on `image` and `ravif`.
//!
//! | Step | Implementation |
//! |---|---|
//! | inspect | `ImageReader` with guessed format, header only |
//! | resize `cover` | `resize_to_fill` (center crop), Lanczos3 |
//! | resize `contain` | fit inside, centered on a transparent canvas |
//! | resize one side | exact resize, other side from the aspect ratio |
//! | blur | gaussian, `sigma = blur` |
//! | encode | png, jpeg, webp (lossless), avif |
//!
//! Decoding and encoding are CPU-bound and run on the blocking pool.

use std::io::Cursor;

use async_trait::async_trait;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};

use super::engine::{EngineError, TransformEngine, Transformed};
use super::format::FormatSpec;
use super::meta::{Metadata, OutputInfo};
use super::pipeline::{Fit, PipelineStep};

const DEFAULT_QUALITY: u8 = 80;
const DEFAULT_AVIF_SPEED: u8 = 6;

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeEngine;

impl NativeEngine {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransformEngine for NativeEngine {
    async fn inspect(&self, source: &[u8]) -> Result<Metadata, EngineError> {
        let source = source.to_vec();
        tokio::task::spawn_blocking(move || inspect_blocking(&source))
            .await
            .map_err(|e| EngineError::Join(e.to_string()))?
    }

    async fn apply(&self, source: &[u8], steps: &[PipelineStep]) -> Result<Transformed, EngineError> {
        let source = source.to_vec();
        let steps = steps.to_vec();
        tokio::task::spawn_blocking(move || apply_blocking(&source, &steps))
            .await
            .map_err(|e| EngineError::Join(e.to_string()))?
    }
}

fn inspect_blocking(source: &[u8]) -> Result<Metadata, EngineError> {
    let reader = ImageReader::new(Cursor::new(source))
        .with_guessed_format()
        .map_err(|e| EngineError::Decode(e.to_string()))?;
    let format = reader.format().map(format_id);
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| EngineError::Decode(e.to_string()))?;

    Ok(Metadata {
        width: Some(f64::from(width)),
        height: Some(f64::from(height)),
        format,
        density: None,
    })
}

fn apply_blocking(source: &[u8], steps: &[PipelineStep]) -> Result<Transformed, EngineError> {
    let mut img = image::load_from_memory(source).map_err(|e| EngineError::Decode(e.to_string()))?;
    let mut encoded = None;

    for step in steps {
        match step {
            PipelineStep::Resize { width, height, fit } => {
                img = resize(&img, *width, *height, *fit);
            }
            PipelineStep::Blur { sigma } => img = img.blur(*sigma),
            PipelineStep::Encode { format } => encoded = Some((encode(&img, format)?, format)),
        }
    }

    let (bytes, format) = match encoded {
        Some(done) => done,
        None => {
            return Err(EngineError::Encode {
                format: String::new(),
                message: "pipeline has no encode step".into(),
            });
        }
    };

    let info = OutputInfo {
        format: format.id.clone(),
        width: img.width(),
        height: img.height(),
        size: bytes.len(),
    };
    Ok(Transformed { bytes, info })
}

fn resize(img: &DynamicImage, width: Option<u32>, height: Option<u32>, fit: Option<Fit>) -> DynamicImage {
    let (src_w, src_h) = (img.width().max(1), img.height().max(1));
    match (width, height) {
        (Some(w), Some(h)) => match fit.unwrap_or(Fit::Cover) {
            Fit::Cover => img.resize_to_fill(w, h, FilterType::Lanczos3),
            Fit::Contain => letterbox(img, w, h),
        },
        (Some(w), None) => {
            let h = scaled_side(w, src_h, src_w);
            img.resize_exact(w, h, FilterType::Lanczos3)
        }
        (None, Some(h)) => {
            let w = scaled_side(h, src_w, src_h);
            img.resize_exact(w, h, FilterType::Lanczos3)
        }
        (None, None) => img.clone(),
    }
}

/// Fit inside `w x h` and center on a transparent canvas of exactly that size.
fn letterbox(img: &DynamicImage, w: u32, h: u32) -> DynamicImage {
    let inner = img.resize(w, h, FilterType::Lanczos3).to_rgba8();
    let mut canvas = RgbaImage::new(w, h);
    let x = i64::from((w - inner.width().min(w)) / 2);
    let y = i64::from((h - inner.height().min(h)) / 2);
    imageops::overlay(&mut canvas, &inner, x, y);
    DynamicImage::ImageRgba8(canvas)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled_side(given: u32, other_src: u32, given_src: u32) -> u32 {
    let side = f64::from(given) * f64::from(other_src) / f64::from(given_src);
    (side.round() as u32).max(1)
}

fn encode(img: &DynamicImage, format: &FormatSpec) -> Result<Vec<u8>, EngineError> {
    let encode_err = |e: image::ImageError| EngineError::Encode {
        format: format.id.clone(),
        message: e.to_string(),
    };
    let mut buf = Vec::new();

    match format.id.as_str() {
        "png" => img
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(encode_err)?,
        "jpeg" => {
            let quality = format.option_u8("quality").unwrap_or(DEFAULT_QUALITY).clamp(1, 100);
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(encode_err)?;
        }
        "webp" => {
            let encoder = image::codecs::webp::WebPEncoder::new_lossless(&mut buf);
            DynamicImage::ImageRgba8(img.to_rgba8())
                .write_with_encoder(encoder)
                .map_err(encode_err)?;
        }
        "avif" => buf = encode_avif(img, format)?,
        other => return Err(EngineError::UnsupportedFormat(other.to_string())),
    }

    Ok(buf)
}

fn encode_avif(img: &DynamicImage, format: &FormatSpec) -> Result<Vec<u8>, EngineError> {
    let quality = format.option_u8("quality").unwrap_or(DEFAULT_QUALITY).clamp(1, 100);
    let speed = format.option_u8("speed").unwrap_or(DEFAULT_AVIF_SPEED).clamp(1, 10);

    let rgba = img.to_rgba8();
    let (width, height) = (rgba.width() as usize, rgba.height() as usize);
    let pixels: Vec<ravif::RGBA8> = rgba
        .pixels()
        .map(|p| ravif::RGBA8::new(p[0], p[1], p[2], p[3]))
        .collect();

    let encoded = ravif::Encoder::new()
        .with_quality(f32::from(quality))
        .with_speed(speed)
        .encode_rgba(ravif::Img::new(pixels.as_slice(), width, height))
        .map_err(|e| EngineError::Encode {
            format: "avif".into(),
            message: e.to_string(),
        })?;
    Ok(encoded.avif_file)
}

fn format_id(format: ImageFormat) -> String {
    match format {
        ImageFormat::Png => "png".into(),
        ImageFormat::Jpeg => "jpeg".into(),
        ImageFormat::WebP => "webp".into(),
        ImageFormat::Avif => "avif".into(),
        ImageFormat::Gif => "gif".into(),
        ImageFormat::Tiff => "tiff".into(),
        other => format!("{other:?}").to_ascii_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn png_source(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba([200, 40, 40, 255]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn encode_step(id: &str) -> PipelineStep {
        PipelineStep::Encode {
            format: FormatSpec::new(id),
        }
    }

    #[tokio::test]
    async fn test_inspect_reads_header() {
        let meta = NativeEngine::new().inspect(&png_source(30, 20)).await.unwrap();
        assert_eq!(meta.dimensions(), Some((30.0, 20.0)));
        assert_eq!(meta.format.as_deref(), Some("png"));
    }

    #[tokio::test]
    async fn test_inspect_rejects_garbage() {
        let err = NativeEngine::new().inspect(b"not an image").await.unwrap_err();
        assert!(matches!(err, EngineError::Decode(_)));
    }

    #[tokio::test]
    async fn test_cover_resize_to_jpeg() {
        let steps = [
            PipelineStep::Resize {
                width: Some(10),
                height: Some(10),
                fit: Some(Fit::Cover),
            },
            encode_step("jpeg"),
        ];
        let out = NativeEngine::new().apply(&png_source(30, 20), &steps).await.unwrap();
        assert_eq!((out.info.width, out.info.height), (10, 10));
        assert_eq!(out.info.format, "jpeg");
        assert_eq!(out.info.size, out.bytes.len());
        assert_eq!(&out.bytes[..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_contain_letterboxes_to_exact_box() {
        let steps = [
            PipelineStep::Resize {
                width: Some(12),
                height: Some(12),
                fit: Some(Fit::Contain),
            },
            encode_step("png"),
        ];
        let out = NativeEngine::new().apply(&png_source(30, 20), &steps).await.unwrap();
        assert_eq!((out.info.width, out.info.height), (12, 12));

        let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0)[3], 0);
        assert_eq!(decoded.get_pixel(6, 6)[3], 255);
    }

    #[tokio::test]
    async fn test_single_side_keeps_aspect() {
        let steps = [
            PipelineStep::Resize {
                width: Some(15),
                height: None,
                fit: None,
            },
            PipelineStep::Blur { sigma: 1.0 },
            encode_step("webp"),
        ];
        let out = NativeEngine::new().apply(&png_source(30, 20), &steps).await.unwrap();
        assert_eq!((out.info.width, out.info.height), (15, 10));
        assert_eq!(&out.bytes[..4], b"RIFF");
    }

    #[tokio::test]
    async fn test_unsupported_format() {
        let err = NativeEngine::new()
            .apply(&png_source(4, 4), &[encode_step("heif")])
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedFormat(id) if id == "heif"));
    }

    #[test]
    fn test_format_ids() {
        assert_eq!(format_id(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_id(ImageFormat::WebP), "webp");
    }
}
