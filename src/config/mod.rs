//! Project configuration management for `imgplex.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [build], [cache], [[assets]]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # config discovery, path helpers
//! └── mod.rs         # PlexConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section          | Purpose                                        |
//! |------------------|------------------------------------------------|
//! | `[build]`        | Output, naming, emit mode, timeouts            |
//! | `[cache]`        | Transform cache location                       |
//! | `[presets.NAME]` | Named output specs, in declaration order       |
//! | `[[assets]]`     | Per-asset output selection                     |

pub mod section;
pub mod types;
mod util;

pub use section::{AssetEntry, BuildSection, CacheDir, CacheSection};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};
pub use util::{find_config_file, normalize_path};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::asset::{AssetBuilder, EmitMode, FsEmitter, OutputRequest, PresetTable, VariantProcessor};
use crate::cache::Cache;
use crate::error::PlexResult;
use crate::image::TransformEngine;
use crate::log;
use crate::naming::NameBuilder;
use crate::variant::{Field, OptionKey, OutputSpec};

/// Default config file name.
pub const CONFIG_FILE: &str = "imgplex.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing imgplex.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlexConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub cache: CacheSection,

    /// Raw preset tables, parsed on demand by [`PlexConfig::presets`].
    #[serde(default)]
    pub presets: Map<String, Value>,

    #[serde(default)]
    pub assets: Vec<AssetEntry>,
}

/// Overrides collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub output: Option<PathBuf>,
    pub outputs: Option<Vec<String>>,
    pub no_cache: bool,
    pub emit: Option<EmitMode>,
}

impl PlexConfig {
    /// Find `config_name` upward from cwd, apply CLI overrides, validate.
    ///
    /// The project root is the config file's parent directory.
    pub fn load(config_name: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
        let config_path = find_config_file(config_name)
            .ok_or_else(|| ConfigError::NotFound(config_name.to_path_buf()))?;
        let mut config = Self::from_path(&config_path)?;

        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.config_path = normalize_path(&config_path);
        config.set_root(&root);
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    ///
    /// Unknown keys inside presets and inline outputs are included, e.g.
    /// `presets.thumb.quality`.
    pub fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config: Self = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        ignored.extend(config.unknown_option_keys());
        Ok((config, ignored))
    }

    /// Unknown keys of raw option tables. Malformed tables are left to `validate`.
    fn unknown_option_keys(&self) -> Vec<String> {
        let mut ignored = Vec::new();
        if let Ok((_, keys)) = PresetTable::from_map(&self.presets) {
            ignored.extend(keys.into_iter().map(|key| format!("presets.{key}")));
        }
        if let Some(values) = &self.build.outputs
            && let Ok((_, keys)) = section::parse_outputs(values)
        {
            ignored.extend(keys.into_iter().map(|key| format!("build.outputs{key}")));
        }
        for (i, entry) in self.assets.iter().enumerate() {
            if let Some(values) = &entry.outputs
                && let Ok((_, keys)) = section::parse_outputs(values)
            {
                ignored.extend(keys.into_iter().map(|key| format!("assets[{i}].outputs{key}")));
            }
        }
        ignored
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Set the root directory and resolve relative paths against it.
    pub fn set_root(&mut self, path: &Path) {
        let root = normalize_path(path);
        self.build.output = root.join(&self.build.output);
        self.build.context = root.join(&self.build.context);
        for entry in &mut self.assets {
            entry.path = root.join(&entry.path);
        }
        self.root = root;
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Where the manifest is written.
    pub fn manifest_path(&self) -> PathBuf {
        self.build.output.join(&self.build.manifest)
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-line overrides. Relative paths resolve against cwd.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(output) = &overrides.output {
            self.build.output = normalize_path(output);
        }
        if let Some(names) = &overrides.outputs {
            self.build.outputs = Some(names.iter().cloned().map(Value::String).collect());
        }
        if overrides.no_cache {
            self.cache.dir = CacheDir::Enabled(false);
        }
        Self::update_option(&mut self.build.emit, overrides.emit.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // runtime objects
    // ========================================================================

    /// Parse `[presets]` in declaration order.
    pub fn presets(&self) -> PlexResult<PresetTable> {
        PresetTable::from_map(&self.presets).map(|(table, _)| table)
    }

    /// Global defaults layered under every preset.
    pub fn defaults(&self) -> OutputSpec {
        match &self.build.name {
            Some(name) => OutputSpec::new().with(OptionKey::Name, Field::literal(name.as_str())),
            None => OutputSpec::new(),
        }
    }

    /// Outputs configured for `source`, if it has an `[[assets]]` entry.
    pub fn asset_outputs(&self, source: &Path) -> PlexResult<Option<Vec<OutputRequest>>> {
        let source = normalize_path(source);
        match self
            .assets
            .iter()
            .find(|entry| normalize_path(&entry.path) == source)
        {
            Some(entry) => entry.requests(),
            None => Ok(None),
        }
    }

    /// Sources listed under `[[assets]]`.
    pub fn asset_paths(&self) -> Vec<PathBuf> {
        self.assets.iter().map(|entry| entry.path.clone()).collect()
    }

    pub fn open_cache(&self) -> Cache {
        self.cache.open(&self.root)
    }

    /// Wire an `AssetBuilder` from this configuration.
    pub fn asset_builder(&self, engine: Arc<dyn TransformEngine>) -> PlexResult<AssetBuilder> {
        let processor = VariantProcessor::new(engine, self.open_cache())
            .with_names(NameBuilder::new(&self.build.context))
            .with_public_path(self.build.public_path.clone())
            .with_mode(self.build.emit)
            .with_timeout(Duration::from_secs(self.build.timeout));

        Ok(AssetBuilder::new(processor, self.presets()?)
            .with_defaults(self.defaults())
            .with_default_outputs(self.build.requests()?)
            .with_emitter(Arc::new(FsEmitter::new(&self.build.output))))
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        self.build.validate(&mut diag);
        self.cache.validate(&self.root, &mut diag);

        match self.presets() {
            Ok(presets) => self.validate_requests(&presets, &mut diag),
            Err(err) => diag.error(FieldPath::new("presets"), err.to_string()),
        }

        for (i, entry) in self.assets.iter().enumerate() {
            if !entry.path.exists() {
                diag.warn(
                    FieldPath::owned(format!("assets[{i}].path")),
                    format!("`{}` does not exist", self.root_relative(&entry.path).display()),
                );
            }
        }

        diag.print_warnings();
        diag.into_result().map_err(ConfigError::Diagnostics)
    }

    /// Every output list must parse and name only declared presets.
    fn validate_requests(&self, presets: &PresetTable, diag: &mut ConfigDiagnostics) {
        let mut lists = vec![(FieldPath::new("build.outputs"), self.build.requests())];
        lists.extend(self.assets.iter().enumerate().map(|(i, entry)| {
            (FieldPath::owned(format!("assets[{i}].outputs")), entry.requests())
        }));

        for (field, requests) in lists {
            let requests = match requests {
                Ok(Some(requests)) => requests,
                Ok(None) => continue,
                Err(err) => {
                    diag.error(field, err.to_string());
                    continue;
                }
            };
            for request in &requests {
                let name = match request {
                    OutputRequest::Preset(name) => Some(name.as_str()),
                    OutputRequest::Custom(spec) => spec.preset.as_deref(),
                };
                if let Some(name) = name
                    && presets.get(name).is_none()
                {
                    let declared = presets.names().collect::<Vec<_>>().join(", ");
                    diag.error_with_hint(
                        field.clone(),
                        format!("unknown preset `{name}`"),
                        format!("declared presets: [{declared}]"),
                    );
                }
            }
        }
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse config and panic on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PlexConfig {
    let (parsed, ignored) = PlexConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
        [build]
        name = "[name]-[width].[ext]"
        outputs = ["thumb"]

        [presets.thumb]
        format = ["webp", "jpeg"]
        width = [200, 400]

        [presets.hero]
        width = 1200

        [[assets]]
        path = "images/hero.png"
        outputs = ["hero", { preset = "thumb", width = 800 }]
    "#;

    #[test]
    fn test_parse_sample() {
        let config = test_parse_config(SAMPLE);
        let presets = config.presets().unwrap();
        assert_eq!(presets.names().collect::<Vec<_>>(), ["thumb", "hero"]);
        assert_eq!(config.build.requests().unwrap().unwrap().len(), 1);
        assert!(config.defaults().get(OptionKey::Name).is_some());
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (_, ignored) = PlexConfig::parse_with_ignored(
            r#"
            [build]
            minify = true

            [presets.thumb]
            width = 100
            quality = 80

            [[assets]]
            path = "a.png"
            outputs = [{ width = 10, dpi = 2 }]
            "#,
        )
        .unwrap();
        assert!(ignored.contains(&"build.minify".to_string()));
        assert!(ignored.contains(&"presets.thumb.quality".to_string()));
        assert!(ignored.contains(&"assets[0].outputs[0].dpi".to_string()));
    }

    #[test]
    fn test_unknown_preset_fails_validation() {
        let mut config = test_parse_config(
            r#"
            [build]
            outputs = ["missing"]

            [presets.thumb]
            width = 100
            "#,
        );
        let dir = TempDir::new().unwrap();
        config.set_root(dir.path());

        let Err(ConfigError::Diagnostics(diag)) = config.validate() else {
            panic!("expected diagnostics");
        };
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.errors()[0].field.as_str(), "build.outputs");
        assert!(diag.errors()[0].message.contains("missing"));
    }

    #[test]
    fn test_malformed_preset_fails_validation() {
        let mut config = test_parse_config("[presets]\nthumb = 5\n");
        let dir = TempDir::new().unwrap();
        config.set_root(dir.path());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_set_root_resolves_paths() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/hero.png"), b"png").unwrap();

        let mut config = test_parse_config(SAMPLE);
        config.set_root(dir.path());
        config.validate().unwrap();

        let root = config.root.clone();
        assert_eq!(config.build.output, root.join("dist"));
        assert_eq!(config.manifest_path(), root.join("dist/manifest.json"));

        let outputs = config
            .asset_outputs(&dir.path().join("images/hero.png"))
            .unwrap()
            .unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].label(), "hero");
        assert!(config.asset_outputs(&dir.path().join("other.png")).unwrap().is_none());
    }

    #[test]
    fn test_load_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[presets.thumb]\nwidth = 100\n").unwrap();

        let config = PlexConfig::load(&path, &Overrides::default()).unwrap();
        assert_eq!(config.root, normalize_path(dir.path()));
        assert_eq!(config.presets().unwrap().len(), 1);

        let missing =
            PlexConfig::load(&dir.path().join("nope.toml"), &Overrides::default()).unwrap_err();
        assert!(matches!(missing, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_overrides() {
        let mut config = test_parse_config(SAMPLE);
        config.apply_overrides(&Overrides {
            outputs: Some(vec!["hero".into()]),
            no_cache: true,
            emit: Some(EmitMode::Synthetic),
            ..Default::default()
        });
        assert_eq!(config.build.emit, EmitMode::Synthetic);
        assert_eq!(config.cache.dir, CacheDir::Enabled(false));
        assert!(!config.open_cache().is_enabled());
        let requests = config.build.requests().unwrap().unwrap();
        assert_eq!(requests[0].label(), "hero");
    }
}
