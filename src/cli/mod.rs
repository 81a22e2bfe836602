//! Command-line interface module.

mod args;
pub mod build;
pub mod plan;

pub use args::{BuildArgs, Cli, Commands, PlanArgs};

use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::config::{PlexConfig, normalize_path};

/// Format count with noun, handling pluralization
///
/// - `plural_count(1, "asset")` -> `"1 asset"`
/// - `plural_count(5, "asset")` -> `"5 assets"`
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}

/// Sources given on the command line, or every `[[assets]]` entry.
pub fn collect_sources(config: &PlexConfig, files: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let sources = if files.is_empty() {
        config.asset_paths()
    } else {
        files.iter().map(|f| normalize_path(f)).collect()
    };
    if sources.is_empty() {
        bail!("no source images: pass FILE arguments or declare [[assets]] in the config");
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(0, "variant"), "0 variants");
        assert_eq!(plural_count(1, "variant"), "1 variant");
    }

    #[test]
    fn test_collect_sources() {
        let config = PlexConfig::default();
        assert!(collect_sources(&config, &[]).is_err());
        let sources = collect_sources(&config, &[PathBuf::from("a.png")]).unwrap();
        assert!(sources[0].is_absolute());
    }
}
