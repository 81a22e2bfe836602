//! Configuration sections of `imgplex.toml`.
//!
//! | Section      | Purpose                                         |
//! |--------------|-------------------------------------------------|
//! | `[build]`    | Output paths, naming, emit mode, timeouts       |
//! | `[cache]`    | Transform cache location                        |
//! | `[[assets]]` | Per-asset output selection and overrides        |
//!
//! `[presets]` has no section type: each preset is kept as a raw table and
//! parsed into an `OutputSpec` when the preset table is built.

mod assets;
mod build;
mod cache;

pub use assets::AssetEntry;
pub use build::{BuildSection, parse_outputs};
pub use cache::{CacheDir, CacheSection};
