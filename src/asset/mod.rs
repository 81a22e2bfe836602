//! Asset building: requests → descriptors → processed, emitted variants.

mod build;
mod emit;
pub mod mime;
mod process;
mod request;
mod result;

pub use build::{AssetBuilder, PlannedOutput, ResolvedOutput};
pub use emit::{EmitMode, Emitter, FsEmitter};
pub use process::{DEFAULT_TIMEOUT_SECS, SourceImage, VariantProcessor};
pub use request::{OutputRequest, PresetTable};
pub use result::{AssetResult, VariantResult, data_uri};
