//! Content and option digests.

mod content;
mod options;

pub use content::ContentHash;
pub use options::{canonical_json, hash_options, hash_value};
