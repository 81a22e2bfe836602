//! Build every requested variant of one source image.

use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;

use crate::cache::CacheKey;
use crate::digest::ContentHash;
use crate::error::{PlexError, PlexResult};
use crate::image::Metadata;
use crate::variant::{OutputSpec, VariantDescriptor, expand};

use super::emit::{EmitMode, Emitter};
use super::process::{SourceImage, VariantProcessor};
use super::request::{OutputRequest, PresetTable};
use super::result::{AssetResult, VariantResult};

/// A request resolved to its merged spec.
#[derive(Debug, Clone)]
pub struct ResolvedOutput {
    pub label: String,
    pub spec: OutputSpec,
}

/// Expanded descriptors of one resolved output.
#[derive(Debug, Clone)]
pub struct PlannedOutput {
    pub label: String,
    pub variants: Vec<VariantDescriptor>,
}

/// Resolves requests against presets and drives the processor.
#[derive(Clone)]
pub struct AssetBuilder {
    processor: VariantProcessor,
    presets: PresetTable,
    defaults: OutputSpec,
    default_outputs: Option<Vec<OutputRequest>>,
    emitter: Option<Arc<dyn Emitter>>,
}

impl AssetBuilder {
    pub fn new(processor: VariantProcessor, presets: PresetTable) -> Self {
        Self {
            processor,
            presets,
            defaults: OutputSpec::new(),
            default_outputs: None,
            emitter: None,
        }
    }

    /// Global defaults, layered under every preset.
    pub fn with_defaults(mut self, defaults: OutputSpec) -> Self {
        self.defaults = defaults;
        self
    }

    /// Outputs used when an asset does not list its own.
    pub fn with_default_outputs(mut self, outputs: Option<Vec<OutputRequest>>) -> Self {
        self.default_outputs = outputs;
        self
    }

    pub fn with_emitter(mut self, emitter: Arc<dyn Emitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn presets(&self) -> &PresetTable {
        &self.presets
    }

    pub fn processor(&self) -> &VariantProcessor {
        &self.processor
    }

    /// Read a source file and inspect it.
    pub async fn load(&self, path: &Path) -> PlexResult<SourceImage> {
        let (hash, bytes) = ContentHash::of_file(path)
            .await
            .map_err(|source| PlexError::Source {
                path: path.to_path_buf(),
                source,
            })?;
        self.load_bytes(path, bytes.into(), hash).await
    }

    /// Inspect already-loaded bytes. `path` only feeds names and cache keys.
    pub async fn load_bytes(
        &self,
        path: &Path,
        bytes: Arc<[u8]>,
        hash: ContentHash,
    ) -> PlexResult<SourceImage> {
        let meta = self.inspect(path, &bytes, hash).await?.with_density_of(path);
        Ok(SourceImage {
            path: path.to_path_buf(),
            bytes,
            hash,
            meta,
        })
    }

    /// Source metadata, cached per path and content.
    async fn inspect(&self, path: &Path, bytes: &[u8], hash: ContentHash) -> PlexResult<Metadata> {
        let cache = self.processor.cache();
        let key = CacheKey::new("meta", path, hash, &());

        if let Some(meta) = cache.read_json::<Metadata>(key.as_ref()).await {
            return Ok(meta);
        }

        let engine = self.processor.engine();
        let meta = self.processor.timed(engine.inspect(bytes)).await?;
        cache.write_json(key.as_ref(), &meta).await;
        Ok(meta)
    }

    /// Merge each request with its preset and the global defaults.
    ///
    /// Requests fall back to the configured default outputs, then to every
    /// preset in declaration order.
    pub fn resolve(&self, requests: Option<&[OutputRequest]>) -> PlexResult<Vec<ResolvedOutput>> {
        let fallback;
        let requests = match requests.or(self.default_outputs.as_deref()) {
            Some(requests) => requests,
            None => {
                fallback = self
                    .presets
                    .names()
                    .map(|name| OutputRequest::Preset(name.to_string()))
                    .collect::<Vec<_>>();
                &fallback
            }
        };

        requests
            .iter()
            .map(|request| {
                let spec = match request {
                    OutputRequest::Preset(name) => self.preset_spec(name)?,
                    OutputRequest::Custom(spec) => {
                        let base = match spec.preset.as_deref() {
                            Some(name) => self.preset_spec(name)?,
                            None => self.defaults.clone(),
                        };
                        spec.clone().merged_over(&base)
                    }
                };
                Ok(ResolvedOutput {
                    label: request.label().to_string(),
                    spec,
                })
            })
            .collect()
    }

    fn preset_spec(&self, name: &str) -> PlexResult<OutputSpec> {
        let preset = self.presets.require(name)?;
        Ok(preset
            .clone()
            .with_preset(name)
            .merged_over(&self.defaults))
    }

    /// Expand without transforming.
    pub fn plan(
        &self,
        source: &SourceImage,
        requests: Option<&[OutputRequest]>,
    ) -> PlexResult<Vec<PlannedOutput>> {
        self.resolve(requests)?
            .into_iter()
            .map(|output| {
                let variants = expand(&output.spec, &source.meta)
                    .map_err(|e| e.at_variant(&output.label, 0))?;
                Ok(PlannedOutput {
                    label: output.label,
                    variants,
                })
            })
            .collect()
    }

    /// Load, process and emit one source file.
    pub async fn build(&self, path: &Path, requests: Option<&[OutputRequest]>) -> PlexResult<AssetResult> {
        let source = self.load(path).await?;
        let variants = self.build_source(&source, requests).await?;
        Ok(AssetResult {
            source: source.path,
            variants,
        })
    }

    /// Process every variant concurrently, then emit.
    ///
    /// Any failing variant fails the whole asset and nothing is emitted.
    pub async fn build_source(
        &self,
        source: &SourceImage,
        requests: Option<&[OutputRequest]>,
    ) -> PlexResult<Vec<VariantResult>> {
        let plan = self.plan(source, requests)?;

        let jobs = plan.iter().flat_map(|output| {
            output.variants.iter().enumerate().map(move |(index, desc)| async move {
                self.processor
                    .process(source, desc)
                    .await
                    .map_err(|e| e.at_variant(&output.label, index))
            })
        });
        let results = join_all(jobs)
            .await
            .into_iter()
            .collect::<PlexResult<Vec<_>>>()?;

        if self.processor.mode() == EmitMode::Emit {
            self.emit(&results).await?;
        }
        Ok(results)
    }

    async fn emit(&self, results: &[VariantResult]) -> PlexResult<()> {
        let Some(emitter) = &self.emitter else {
            return Ok(());
        };
        for result in results.iter().filter(|r| !r.is_inline()) {
            let Some(bytes) = &result.bytes else { continue };
            emitter
                .emit(&result.name, bytes)
                .await
                .map_err(|source| PlexError::Emit {
                    name: result.name.clone(),
                    source,
                })?;
            crate::debug!("emit"; "{}", result.name);
        }
        Ok(())
    }
}
