//! Translate a variant descriptor into engine steps.
//!
//! Steps always come in the order resize → blur → encode. An absent step is
//! simply skipped; the encode step is always present.

use serde::{Deserialize, Serialize};

use super::format::FormatSpec;
use super::meta::{Metadata, OutputInfo};
use crate::error::{PlexError, PlexResult};
use crate::variant::VariantDescriptor;

/// How a resize fits the requested box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Fill the box, cropping the overflow (centered).
    Cover,
    /// Fit inside the box, letterboxing the rest.
    Contain,
}

impl Fit {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Contain => "contain",
        }
    }
}

/// One engine-agnostic transformation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PipelineStep {
    /// A missing dimension keeps the aspect ratio. `fit: None` is the engine
    /// default, which behaves like `Cover`.
    Resize {
        width: Option<u32>,
        height: Option<u32>,
        fit: Option<Fit>,
    },
    Blur { sigma: f32 },
    #[serde(rename = "toFormat")]
    Encode { format: FormatSpec },
}

impl PipelineStep {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Resize { .. } => "resize",
            Self::Blur { .. } => "blur",
            Self::Encode { .. } => "toFormat",
        }
    }
}

/// Build the step list for one descriptor against source metadata.
///
/// Fails when no output format can be determined, when `scale` is asked
/// for without known source dimensions, or when a requested dimension
/// rounds to zero pixels.
pub fn build_pipeline(desc: &VariantDescriptor, meta: &Metadata) -> PlexResult<Vec<PipelineStep>> {
    let mut steps = Vec::with_capacity(3);

    let (width, height) = match desc.scale {
        Some(scale) => {
            let Some((source_width, source_height)) = meta.dimensions() else {
                return Err(PlexError::config(
                    "`scale` requires known source dimensions",
                ));
            };
            (
                Some(desc.width.unwrap_or(source_width) * scale),
                Some(desc.height.unwrap_or(source_height) * scale),
            )
        }
        None => (desc.width, desc.height),
    };
    let width = width.map(|w| pixels(w, "width")).transpose()?;
    let height = height.map(|h| pixels(h, "height")).transpose()?;

    if width.is_some() || height.is_some() {
        steps.push(PipelineStep::Resize {
            width,
            height,
            fit: desc.mode,
        });
    }

    if let Some(sigma) = desc.blur.filter(|b| *b > 0.0) {
        steps.push(PipelineStep::Blur {
            sigma: sigma as f32,
        });
    }

    let format = match &desc.format {
        Some(format) => format.clone(),
        None => meta
            .format
            .as_deref()
            .map(FormatSpec::new)
            .ok_or_else(|| PlexError::config("unable to determine image format"))?,
    };
    steps.push(PipelineStep::Encode { format });

    Ok(steps)
}

/// Predict output info without running the engine.
///
/// With one resize dimension missing, the other is derived from the source
/// aspect ratio. Size is always 0.
pub fn synthetic_info(steps: &[PipelineStep], meta: &Metadata) -> OutputInfo {
    let mut width = meta.width;
    let mut height = meta.height;
    let mut format = meta.format.clone().unwrap_or_default();

    for step in steps {
        match step {
            PipelineStep::Resize {
                width: w,
                height: h,
                ..
            } => {
                let aspect = meta.dimensions().map(|(mw, mh)| mw / mh);
                match (w, h) {
                    (Some(w), Some(h)) => {
                        width = Some(f64::from(*w));
                        height = Some(f64::from(*h));
                    }
                    (Some(w), None) => {
                        width = Some(f64::from(*w));
                        height = aspect.map(|a| f64::from(*w) / a);
                    }
                    (None, Some(h)) => {
                        height = Some(f64::from(*h));
                        width = aspect.map(|a| f64::from(*h) * a);
                    }
                    (None, None) => {}
                }
            }
            PipelineStep::Blur { .. } => {}
            PipelineStep::Encode { format: f } => format = f.id.clone(),
        }
    }

    OutputInfo {
        format,
        width: width.map_or(0, round_px),
        height: height.map_or(0, round_px),
        size: 0,
    }
}

/// Round a requested dimension, rejecting anything below one pixel.
fn pixels(value: f64, field: &str) -> PlexResult<u32> {
    match round_px(value) {
        0 => Err(PlexError::config(format!(
            "`{field}` of {value} rounds to zero pixels"
        ))),
        px => Ok(px),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_px(value: f64) -> u32 {
    value.round().max(0.0) as u32
}
