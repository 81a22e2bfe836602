//! Image model and transformation backends.
//!
//! # Modules
//!
//! - [`format`]: output format designations and extensions
//! - [`meta`]: source metadata and produced output info
//! - [`pipeline`]: descriptor → engine steps
//! - [`engine`]: the [`TransformEngine`] seam
//! - [`native`]: pure-Rust engine (`image` + `ravif`)

pub mod engine;
pub mod format;
pub mod meta;
pub mod native;
pub mod pipeline;

pub use engine::{EngineError, TransformEngine, Transformed};
pub use format::{FormatOptions, FormatSpec};
pub use meta::{Metadata, OutputInfo, density_from_path, format_number, strip_density};
pub use native::NativeEngine;
pub use pipeline::{Fit, PipelineStep, build_pipeline, synthetic_info};
