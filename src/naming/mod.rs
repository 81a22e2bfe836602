//! Output file names from `[token]` templates.
//!
//! | Token | Value |
//! |---|---|
//! | `[name]` | source stem, `@Nx` density marker removed |
//! | `[ext]` | output extension without the dot |
//! | `[hash]` | 16 hex chars of blake3(option digest ‖ source bytes) |
//! | `[hash:N]` | first N (1..=64) hex chars of the same digest |
//! | `[path]` | source directory relative to the context dir, with trailing `/` |
//! | `[width]`, `[format]`, ... | descriptor field, then output info field |
//!
//! Unknown tokens are left as written.

use std::path::{Component, Path, PathBuf};

use crate::digest::{ContentHash, hash_options};
use crate::error::{PlexError, PlexResult};
use crate::image::{OutputInfo, format::extension, strip_density};
use crate::variant::VariantDescriptor;

pub const DEFAULT_TEMPLATE: &str = "[hash].[ext]";

/// Builds names for one build context.
#[derive(Debug, Clone)]
pub struct NameBuilder {
    default_template: Option<String>,
    context: PathBuf,
}

impl NameBuilder {
    pub fn new(context: impl Into<PathBuf>) -> Self {
        Self {
            default_template: None,
            context: context.into(),
        }
    }

    /// Template used when a descriptor carries no `name`.
    pub fn with_default_template(mut self, template: Option<String>) -> Self {
        self.default_template = template;
        self
    }

    /// Name one variant of `source_path`.
    pub fn build(
        &self,
        desc: &VariantDescriptor,
        info: &OutputInfo,
        source_path: &Path,
        source: &[u8],
    ) -> PlexResult<String> {
        let template = desc
            .name
            .as_deref()
            .or(self.default_template.as_deref())
            .unwrap_or(DEFAULT_TEMPLATE);

        let digest = name_digest(desc, source)?;
        let resolve = |token: &str| -> Option<String> {
            match token {
                "name" => Some(source_stem(source_path)),
                "ext" => Some(extension(&info.format).trim_start_matches('.').to_string()),
                "hash" => Some(digest.hex_prefix(16)),
                "path" => Some(self.relative_dir(source_path)),
                _ => token
                    .strip_prefix("hash:")
                    .and_then(|n| n.parse::<usize>().ok())
                    .filter(|n| (1..=64).contains(n))
                    .map(|n| digest.hex_prefix(n))
                    .or_else(|| desc.field(token))
                    .or_else(|| info.field(token)),
            }
        };

        Ok(interpolate(template, resolve))
    }

    fn relative_dir(&self, source_path: &Path) -> String {
        let Some(parent) = source_path.parent() else {
            return String::new();
        };
        let relative = parent.strip_prefix(&self.context).unwrap_or(parent);
        let parts: Vec<_> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                Component::ParentDir => Some("..".to_string()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            String::new()
        } else {
            format!("{}/", parts.join("/"))
        }
    }
}

/// Digest behind `[hash]`: options first, then the source bytes.
fn name_digest(desc: &VariantDescriptor, source: &[u8]) -> PlexResult<ContentHash> {
    let options = hash_options(desc)
        .map_err(|e| PlexError::config(format!("cannot hash variant options: {e}")))?;
    Ok(ContentHash::of_parts(&[options.as_bytes(), source]))
}

fn source_stem(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    strip_density(&stem).to_string()
}

/// Replace each `[token]` for which `resolve` has a value.
fn interpolate(template: &str, resolve: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(']') {
            Some(close) if !after[..close].contains('[') && close > 0 => {
                let token = &after[..close];
                match resolve(token) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('[');
                        out.push_str(token);
                        out.push(']');
                    }
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('[');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
