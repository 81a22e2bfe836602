//! `imgplex build`: process sources concurrently and write the manifest.
//!
//! Phases:
//! - **Collect** - CLI files, else every `[[assets]]` entry
//! - **Process** - one `AssetBuilder::build` per source, all in flight at once
//! - **Finalize** - report failures, write the manifest

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use futures::future::join_all;
use serde_json::{Map, Value};

use crate::asset::{AssetBuilder, AssetResult};
use crate::config::PlexConfig;
use crate::image::{NativeEngine, TransformEngine};
use crate::logger::ProgressLine;
use crate::{debug, log};

use super::{collect_sources, plural_count};

/// Totals reported after a build.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub assets: usize,
    pub variants: usize,
    pub cached: usize,
    pub emitted: usize,
}

impl BuildStats {
    fn record(&mut self, result: &AssetResult) {
        self.assets += 1;
        self.variants += result.variants.len();
        self.cached += result.variants.iter().filter(|v| v.cached).count();
        self.emitted += result.emitted().count();
    }
}

/// Build with the native engine.
pub async fn run(config: &PlexConfig, files: &[PathBuf]) -> Result<BuildStats> {
    build_with(config, Arc::new(NativeEngine::new()), files, false).await
}

/// Build every source against `engine`, then write the manifest.
///
/// A failing source is logged and the build fails after every other
/// source has finished; the manifest is only written on full success.
pub async fn build_with(
    config: &PlexConfig,
    engine: Arc<dyn TransformEngine>,
    files: &[PathBuf],
    quiet: bool,
) -> Result<BuildStats> {
    let sources = collect_sources(config, files)?;
    let builder = config.asset_builder(engine)?;

    let progress = (!quiet).then(|| ProgressLine::new(&[("assets", sources.len())]));
    let jobs = sources.iter().map(|source| {
        let builder = &builder;
        let progress = progress.as_ref();
        async move {
            let result = build_one(config, builder, source).await;
            if let Some(progress) = progress {
                progress.inc("assets");
            }
            (source, result)
        }
    });
    let outcomes = join_all(jobs).await;

    if let Some(progress) = progress {
        progress.finish();
    }

    let mut stats = BuildStats::default();
    let mut results = Vec::with_capacity(outcomes.len());
    let mut failed = 0;
    for (source, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                stats.record(&result);
                results.push(result);
            }
            Err(err) => {
                failed += 1;
                log!("error"; "{}: {:#}", config.root_relative(source).display(), err);
            }
        }
    }
    if failed > 0 {
        bail!("{} failed", plural_count(failed, "asset"));
    }

    write_manifest(config, &results)?;

    if !quiet {
        log!(
            "build";
            "{} from {} ({} cached, {} emitted)",
            plural_count(stats.variants, "variant"),
            plural_count(stats.assets, "asset"),
            stats.cached,
            stats.emitted
        );
    }
    Ok(stats)
}

async fn build_one(config: &PlexConfig, builder: &AssetBuilder, source: &Path) -> Result<AssetResult> {
    let requests = config.asset_outputs(source)?;
    let result = builder.build(source, requests.as_deref()).await?;
    debug!("build"; "{} -> {}", source.display(), plural_count(result.variants.len(), "variant"));
    Ok(result)
}

/// Manifest: `{ "<source relative to root>": [variant results...] }`.
pub fn manifest_json(config: &PlexConfig, results: &[AssetResult]) -> Result<Value> {
    let mut manifest = Map::new();
    for result in results {
        let key = config
            .root_relative(&result.source)
            .to_string_lossy()
            .replace('\\', "/");
        manifest.insert(key, serde_json::to_value(&result.variants)?);
    }
    Ok(Value::Object(manifest))
}

fn write_manifest(config: &PlexConfig, results: &[AssetResult]) -> Result<()> {
    let path = config.manifest_path();
    let manifest = manifest_json(config, results)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(&path, content)
        .with_context(|| format!("failed to write manifest `{}`", path.display()))?;

    debug!("manifest"; "{}", path.display());
    Ok(())
}
