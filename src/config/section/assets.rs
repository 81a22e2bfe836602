//! `[[assets]]` entries: per-source output selection.
//!
//! ```toml
//! [[assets]]
//! path = "images/hero@2x.png"
//! outputs = ["thumbnail", { preset = "thumbnail", width = 800 }]
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::asset::OutputRequest;
use crate::error::PlexResult;

use super::build::parse_outputs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetEntry {
    /// Source image, relative to the project root.
    pub path: PathBuf,

    /// Outputs for this source; falls back to `build.outputs`.
    #[serde(default)]
    pub outputs: Option<Vec<Value>>,
}

impl AssetEntry {
    pub fn requests(&self) -> PlexResult<Option<Vec<OutputRequest>>> {
        self.outputs
            .as_deref()
            .map(|values| parse_outputs(values).map(|(requests, _)| requests))
            .transpose()
    }
}
