//! imgplex - multiplex image presets into cached, deterministically named variants.
//!
//! A preset may declare array-valued fields ("one variant per value"). The
//! crate expands every preset into concrete variant descriptors, runs a
//! transform pipeline for each through a [`image::TransformEngine`], names
//! the results from a template and caches transform output by content and
//! options.
//!
//! ```text
//! OutputSpec ─normalize─▶ per-key lists ─product─▶ VariantDescriptor*
//!      VariantDescriptor + Metadata ─pipeline─▶ PipelineStep*
//!      PipelineStep* ─engine (cached)─▶ bytes + OutputInfo ─naming─▶ VariantResult
//! ```

pub mod asset;
pub mod cache;
pub mod cli;
pub mod config;
pub mod digest;
pub mod error;
pub mod image;
pub mod logger;
pub mod naming;
pub mod variant;

pub use asset::{AssetBuilder, AssetResult, EmitMode, OutputRequest, PresetTable, VariantResult};
pub use cache::Cache;
pub use config::PlexConfig;
pub use error::{PlexError, PlexResult};
pub use image::{Metadata, NativeEngine, TransformEngine};
pub use variant::{Field, OptionKey, OutputSpec, VariantDescriptor};
