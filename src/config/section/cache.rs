//! `[cache]` section configuration.
//!
//! ```toml
//! [cache]
//! dir = true            # default location under the project root
//! # dir = false         # disable caching
//! # dir = "~/.cache/imgplex"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cache::{CACHE_DIR, Cache};
use crate::config::util::expand_path;
use crate::config::{ConfigDiagnostics, FieldPath};

/// `true`, `false` or a directory path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheDir {
    Enabled(bool),
    Path(PathBuf),
}

impl Default for CacheDir {
    fn default() -> Self {
        Self::Enabled(true)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub dir: CacheDir,
}

impl CacheSection {
    pub const DIR: FieldPath = FieldPath::new("cache.dir");

    /// Cache directory, or `None` when caching is off.
    pub fn resolve(&self, root: &Path) -> Option<PathBuf> {
        match &self.dir {
            CacheDir::Enabled(false) => None,
            CacheDir::Enabled(true) => Some(root.join(CACHE_DIR)),
            CacheDir::Path(path) => Some(expand_path(path, root)),
        }
    }

    pub fn validate(&self, root: &Path, diag: &mut ConfigDiagnostics) {
        if let Some(dir) = self.resolve(root)
            && dir.exists()
            && !dir.is_dir()
        {
            diag.error_with_hint(
                Self::DIR,
                format!("`{}` exists but is not a directory", dir.display()),
                "point `cache.dir` at a directory, or set it to false",
            );
        }
    }

    /// Open the configured cache handle.
    pub fn open(&self, root: &Path) -> Cache {
        match self.resolve(root) {
            Some(dir) => Cache::on_disk(dir),
            None => Cache::disabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(content: &str) -> CacheSection {
        #[derive(Deserialize)]
        struct Holder {
            cache: CacheSection,
        }
        toml::from_str::<Holder>(content).unwrap().cache
    }

    #[test]
    fn test_dir_settings() {
        let root = Path::new("/project");
        assert_eq!(
            parse("[cache]").resolve(root),
            Some(root.join(".imgplex/cache"))
        );
        assert_eq!(parse("[cache]\ndir = false").resolve(root), None);
        assert_eq!(
            parse("[cache]\ndir = \"tmp/c\"").resolve(root),
            Some(PathBuf::from("/project/tmp/c"))
        );
        assert!(!parse("[cache]\ndir = false").open(root).is_enabled());
    }

    #[test]
    fn test_file_as_cache_dir_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("occupied"), "").unwrap();
        let section = CacheSection {
            dir: CacheDir::Path("occupied".into()),
        };
        let mut diag = ConfigDiagnostics::new();
        section.validate(dir.path(), &mut diag);
        assert_eq!(diag.len(), 1);

        let section = CacheSection {
            dir: CacheDir::Path("fresh".into()),
        };
        let mut diag = ConfigDiagnostics::new();
        section.validate(dir.path(), &mut diag);
        assert!(diag.is_empty());
    }
}
