//! Output requests and the preset table they resolve against.

use serde_json::{Map, Value};

use crate::error::{PlexError, PlexResult};
use crate::variant::OutputSpec;

/// One entry of an `outputs` list.
#[derive(Debug, Clone)]
pub enum OutputRequest {
    /// `"thumbnail"`
    Preset(String),
    /// `{ preset = "thumbnail", width = 800 }` or a standalone spec.
    Custom(OutputSpec),
}

impl OutputRequest {
    /// Parse a string or table entry. Also returns ignored table keys.
    pub fn from_value(value: &Value) -> PlexResult<(Self, Vec<String>)> {
        match value {
            Value::String(name) => Ok((Self::Preset(name.clone()), Vec::new())),
            Value::Object(_) => {
                let (spec, ignored) = OutputSpec::from_value(value)?;
                Ok((Self::Custom(spec), ignored))
            }
            other => Err(PlexError::config(format!(
                "output entry must be a preset name or a table, got {other}"
            ))),
        }
    }

    /// Label used in error messages and the manifest.
    pub fn label(&self) -> &str {
        match self {
            Self::Preset(name) => name,
            Self::Custom(spec) => spec.preset.as_deref().unwrap_or("custom"),
        }
    }

    /// Parse a comma-separated list of preset names (CLI `--outputs`).
    pub fn parse_list(list: &str) -> Vec<Self> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Self::Preset(s.to_string()))
            .collect()
    }
}

/// Named presets in declaration order.
#[derive(Debug, Clone, Default)]
pub struct PresetTable {
    presets: Vec<(String, OutputSpec)>,
}

impl PresetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a `[presets]` table. Returns `(table, ignored "preset.key" paths)`.
    pub fn from_map(map: &Map<String, Value>) -> PlexResult<(Self, Vec<String>)> {
        let mut table = Self::new();
        let mut ignored = Vec::new();
        for (name, raw) in map {
            let (spec, unknown) = OutputSpec::from_value(raw)
                .map_err(|e| PlexError::config(format!("preset `{name}`: {e}")))?;
            ignored.extend(unknown.into_iter().map(|key| format!("{name}.{key}")));
            table.insert(name.clone(), spec);
        }
        Ok((table, ignored))
    }

    /// Add or replace a preset; a replaced preset keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, spec: OutputSpec) {
        let name = name.into();
        match self.presets.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = spec,
            None => self.presets.push((name, spec)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&OutputSpec> {
        self.presets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, spec)| spec)
    }

    /// Lookup that treats an unknown name as a configuration error.
    pub fn require(&self, name: &str) -> PlexResult<&OutputSpec> {
        self.get(name)
            .ok_or_else(|| PlexError::config(format!("unknown preset `{name}`")))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
