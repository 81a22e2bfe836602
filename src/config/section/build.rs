//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! output = "dist"                 # Emitted files + manifest (relative to root)
//! public_path = "/static/"        # Prefix of every non-inline url
//! name = "[name].[hash:8].[ext]"  # Default name template
//! context = "."                   # Base directory for the `[path]` token
//! emit = true                     # true | false | "synthetic"
//! outputs = ["thumbnail"]         # Default preset selection (default: all)
//! timeout = 60                    # Seconds per engine call
//! manifest = "manifest.json"      # Relative to `output`
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::asset::{DEFAULT_TIMEOUT_SECS, EmitMode, OutputRequest};
use crate::config::{ConfigDiagnostics, FieldPath};
use crate::error::PlexResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    /// Output directory.
    pub output: PathBuf,

    /// Url prefix joined with each variant name.
    pub public_path: String,

    /// Default name template, layered under every preset.
    pub name: Option<String>,

    /// Base directory for the `[path]` token.
    pub context: PathBuf,

    pub emit: EmitMode,

    /// Default output selection: preset names or inline tables.
    pub outputs: Option<Vec<Value>>,

    /// Seconds an engine call may take.
    pub timeout: u64,

    /// Manifest file name, relative to `output`.
    pub manifest: PathBuf,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            output: "dist".into(),
            public_path: "/".into(),
            name: None,
            context: ".".into(),
            emit: EmitMode::default(),
            outputs: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            manifest: "manifest.json".into(),
        }
    }
}

impl BuildSection {
    pub const TIMEOUT: FieldPath = FieldPath::new("build.timeout");
    pub const NAME: FieldPath = FieldPath::new("build.name");
    pub const PUBLIC_PATH: FieldPath = FieldPath::new("build.public_path");
    pub const MANIFEST: FieldPath = FieldPath::new("build.manifest");
    pub const OUTPUTS: FieldPath = FieldPath::new("build.outputs");

    /// Validate values that need no preset table.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.timeout == 0 {
            diag.error(Self::TIMEOUT, "timeout must be at least 1 second");
        }

        if self.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            diag.error_with_hint(
                Self::NAME,
                "name template is empty",
                "remove `name` to use the default `[hash].[ext]`",
            );
        }

        if !self.public_path.is_empty() && !self.public_path.ends_with('/') {
            diag.warn(
                Self::PUBLIC_PATH,
                format!(
                    "`{}` has no trailing slash, urls are joined without a separator",
                    self.public_path
                ),
            );
        }

        if self.manifest.is_absolute() {
            diag.error(Self::MANIFEST, "manifest path must be relative to `build.output`");
        }
    }

    /// Parsed default outputs, if configured.
    pub fn requests(&self) -> PlexResult<Option<Vec<OutputRequest>>> {
        self.outputs
            .as_deref()
            .map(|values| parse_outputs(values).map(|(requests, _)| requests))
            .transpose()
    }
}

/// Parse an `outputs` list. Also returns ignored keys of inline tables.
pub fn parse_outputs(values: &[Value]) -> PlexResult<(Vec<OutputRequest>, Vec<String>)> {
    let mut requests = Vec::with_capacity(values.len());
    let mut ignored = Vec::new();
    for (i, value) in values.iter().enumerate() {
        let (request, unknown) = OutputRequest::from_value(value)?;
        ignored.extend(unknown.into_iter().map(|key| format!("[{i}].{key}")));
        requests.push(request);
    }
    Ok((requests, ignored))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(content: &str) -> BuildSection {
        #[derive(Deserialize)]
        struct Holder {
            build: BuildSection,
        }
        toml::from_str::<Holder>(content).unwrap().build
    }

    #[test]
    fn test_defaults() {
        let build = parse("[build]");
        assert_eq!(build.output, PathBuf::from("dist"));
        assert_eq!(build.public_path, "/");
        assert_eq!(build.timeout, 60);
        assert_eq!(build.emit, EmitMode::Emit);
        assert!(build.requests().unwrap().is_none());
    }

    #[test]
    fn test_mixed_outputs() {
        let build = parse(
            r#"
            [build]
            emit = "synthetic"
            outputs = ["thumb", { preset = "thumb", width = 800 }]
            "#,
        );
        assert_eq!(build.emit, EmitMode::Synthetic);
        let requests = build.requests().unwrap().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(matches!(&requests[1], OutputRequest::Custom(spec) if spec.preset.as_deref() == Some("thumb")));
    }

    #[test]
    fn test_parse_outputs_reports_unknown_keys() {
        let (_, ignored) = parse_outputs(&[json!("a"), json!({"width": 10, "dpi": 2})]).unwrap();
        assert_eq!(ignored, vec!["[1].dpi".to_string()]);
    }

    #[test]
    fn test_validate() {
        let mut build = BuildSection {
            timeout: 0,
            name: Some("  ".into()),
            public_path: "/static".into(),
            ..Default::default()
        };
        let mut diag = ConfigDiagnostics::new();
        build.validate(&mut diag);
        assert_eq!(diag.len(), 2);
        assert_eq!(diag.warnings().len(), 1);

        build = BuildSection::default();
        let mut diag = ConfigDiagnostics::new();
        build.validate(&mut diag);
        assert!(diag.is_empty());
    }
}
