//! The transformation engine seam.

use async_trait::async_trait;
use thiserror::Error;

use super::meta::{Metadata, OutputInfo};
use super::pipeline::PipelineStep;

/// Errors raised by an engine. All of them are fatal for the variant.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to decode source image: {0}")]
    Decode(String),

    #[error("failed to encode `{format}`: {message}")]
    Encode { format: String, message: String },

    #[error("unsupported output format `{0}`")]
    UnsupportedFormat(String),

    /// Seconds the call was allowed to run.
    #[error("engine call timed out after {0}s")]
    Timeout(u64),

    #[error("engine worker failed: {0}")]
    Join(String),
}

/// Encoded bytes plus what was actually produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub bytes: Vec<u8>,
    pub info: OutputInfo,
}

/// An image backend able to inspect and transform encoded images.
///
/// `apply` must work on its own copy of the source; the input slice is never
/// mutated and may be shared between concurrent calls.
#[async_trait]
pub trait TransformEngine: Send + Sync {
    async fn inspect(&self, source: &[u8]) -> Result<Metadata, EngineError>;

    async fn apply(&self, source: &[u8], steps: &[PipelineStep]) -> Result<Transformed, EngineError>;
}
