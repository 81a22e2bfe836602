//! Emission of produced files.

use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Whether variants are transformed and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitMode {
    /// Transform and emit every non-inline variant.
    #[default]
    Emit,
    /// Transform but do not emit.
    Skip,
    /// Dry run: no transform, predicted output info, nothing emitted.
    Synthetic,
}

impl EmitMode {
    pub const fn transforms(self) -> bool {
        !matches!(self, Self::Synthetic)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "true" => Some(Self::Emit),
            "false" => Some(Self::Skip),
            "synthetic" => Some(Self::Synthetic),
            _ => None,
        }
    }
}

/// `true | false | "synthetic"` in config.
impl<'de> Deserialize<'de> for EmitMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(true) => Ok(Self::Emit),
            Raw::Flag(false) => Ok(Self::Skip),
            Raw::Text(s) => Self::parse(&s).ok_or_else(|| {
                serde::de::Error::custom(format!(
                    "invalid emit mode `{s}`, expected true, false or \"synthetic\""
                ))
            }),
        }
    }
}

impl Serialize for EmitMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Emit => serializer.serialize_bool(true),
            Self::Skip => serializer.serialize_bool(false),
            Self::Synthetic => serializer.serialize_str("synthetic"),
        }
    }
}

/// Sink for produced files.
#[async_trait]
pub trait Emitter: Send + Sync {
    async fn emit(&self, name: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Writes files under an output directory, creating parents as needed.
#[derive(Debug, Clone)]
pub struct FsEmitter {
    root: PathBuf,
}

impl FsEmitter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Target path for `name`; names escaping the root are rejected.
    pub fn target(&self, name: &str) -> io::Result<PathBuf> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("output name `{name}` leaves the output directory"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl Emitter for FsEmitter {
    async fn emit(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.target(name)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Deserialize)]
    struct Holder {
        emit: EmitMode,
    }

    #[test]
    fn test_emit_mode_from_toml() {
        let parse = |s: &str| toml::from_str::<Holder>(s).map(|h| h.emit);
        assert_eq!(parse("emit = true").unwrap(), EmitMode::Emit);
        assert_eq!(parse("emit = false").unwrap(), EmitMode::Skip);
        assert_eq!(parse("emit = \"synthetic\"").unwrap(), EmitMode::Synthetic);
        assert!(parse("emit = \"sometimes\"").is_err());
    }

    #[test]
    fn test_emit_mode_serializes_back() {
        assert_eq!(serde_json::to_string(&EmitMode::Synthetic).unwrap(), "\"synthetic\"");
        assert_eq!(serde_json::to_string(&EmitMode::Skip).unwrap(), "false");
        assert!(!EmitMode::Synthetic.transforms());
    }

    #[tokio::test]
    async fn test_fs_emitter_writes_nested() {
        let dir = TempDir::new().unwrap();
        let emitter = FsEmitter::new(dir.path());
        emitter.emit("img/a.webp", b"data").await.unwrap();
        assert_eq!(std::fs::read(dir.path().join("img/a.webp")).unwrap(), b"data");
    }

    #[tokio::test]
    async fn test_fs_emitter_rejects_escape() {
        let dir = TempDir::new().unwrap();
        let emitter = FsEmitter::new(dir.path());
        assert!(emitter.emit("../evil.png", b"x").await.is_err());
        assert!(emitter.emit("/abs.png", b"x").await.is_err());
    }
}
