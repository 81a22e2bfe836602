//! Per-variant results handed back to callers.

use std::path::PathBuf;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::variant::VariantDescriptor;

/// One produced (or, in synthetic mode, predicted) variant.
///
/// `width`/`height` are logical sizes: divided by `scale` when one was
/// requested, so a `scale = 2` variant reports its CSS size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantResult {
    pub name: String,
    pub url: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime: Option<&'static str>,
    pub width: f64,
    pub height: f64,
    pub format: String,
    pub size: usize,
    pub options: VariantDescriptor,
    /// Served from cache instead of the engine.
    #[serde(skip)]
    pub cached: bool,
    /// Encoded bytes. `None` in synthetic mode.
    #[serde(skip)]
    pub bytes: Option<Vec<u8>>,
}

impl VariantResult {
    pub fn is_inline(&self) -> bool {
        self.options.is_inline()
    }
}

/// All variants of one source, in request order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetResult {
    pub source: PathBuf,
    pub variants: Vec<VariantResult>,
}

impl AssetResult {
    pub fn emitted(&self) -> impl Iterator<Item = &VariantResult> {
        self.variants
            .iter()
            .filter(|v| !v.is_inline() && v.bytes.is_some())
    }
}

/// `data:<mime>;base64,<payload>`
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}
