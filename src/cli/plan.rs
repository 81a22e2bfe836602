//! `imgplex plan`: expand requests into descriptors without transforming.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde_json::{Value, json};

use crate::config::PlexConfig;
use crate::image::{NativeEngine, TransformEngine};

use super::collect_sources;

pub async fn run(config: &PlexConfig, files: &[PathBuf], pretty: bool) -> Result<()> {
    let plan = plan_with(config, Arc::new(NativeEngine::new()), files).await?;
    let output = if pretty {
        serde_json::to_string_pretty(&plan)?
    } else {
        serde_json::to_string(&plan)?
    };
    println!("{output}");
    Ok(())
}

/// `[{ source, width, height, outputs: [{ label, variants }] }]` per source.
///
/// Sources are still read and inspected (through the cache) since derived
/// fields and scale need their metadata.
pub async fn plan_with(
    config: &PlexConfig,
    engine: Arc<dyn TransformEngine>,
    files: &[PathBuf],
) -> Result<Value> {
    let sources = collect_sources(config, files)?;
    let builder = config.asset_builder(engine)?;

    let mut entries = Vec::with_capacity(sources.len());
    for path in &sources {
        let requests = config.asset_outputs(path)?;
        let source = builder.load(path).await?;
        let outputs = builder
            .plan(&source, requests.as_deref())?
            .into_iter()
            .map(|output| json!({ "label": output.label, "variants": output.variants }))
            .collect::<Vec<_>>();

        entries.push(json!({
            "source": config.root_relative(path).to_string_lossy().replace('\\', "/"),
            "width": source.meta.width,
            "height": source.meta.height,
            "outputs": outputs,
        }));
    }
    Ok(Value::Array(entries))
}
