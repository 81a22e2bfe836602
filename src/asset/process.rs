//! Turn one variant descriptor into a named, addressable result.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{Cache, CacheKey};
use crate::digest::ContentHash;
use crate::error::{PlexError, PlexResult};
use crate::image::{
    EngineError, Metadata, OutputInfo, PipelineStep, TransformEngine, Transformed, build_pipeline,
    synthetic_info,
};
use crate::naming::NameBuilder;
use crate::variant::VariantDescriptor;

use super::emit::EmitMode;
use super::mime;
use super::result::{VariantResult, data_uri};

/// Seconds an engine call may take by default.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// A loaded source image.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub path: PathBuf,
    pub bytes: Arc<[u8]>,
    pub hash: ContentHash,
    /// Metadata after density adjustment.
    pub meta: Metadata,
}

/// Processes descriptors against one engine and cache.
#[derive(Clone)]
pub struct VariantProcessor {
    engine: Arc<dyn TransformEngine>,
    cache: Cache,
    names: NameBuilder,
    public_path: String,
    mode: EmitMode,
    timeout: Duration,
}

impl VariantProcessor {
    pub fn new(engine: Arc<dyn TransformEngine>, cache: Cache) -> Self {
        Self {
            engine,
            cache,
            names: NameBuilder::new("."),
            public_path: "/".to_string(),
            mode: EmitMode::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_names(mut self, names: NameBuilder) -> Self {
        self.names = names;
        self
    }

    pub fn with_public_path(mut self, public_path: impl Into<String>) -> Self {
        self.public_path = public_path.into();
        self
    }

    pub fn with_mode(mut self, mode: EmitMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn mode(&self) -> EmitMode {
        self.mode
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn engine(&self) -> &dyn TransformEngine {
        self.engine.as_ref()
    }

    /// Run an engine call under the configured timeout.
    pub async fn timed<T>(
        &self,
        call: impl Future<Output = Result<T, EngineError>>,
    ) -> Result<T, EngineError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| EngineError::Timeout(self.timeout.as_secs()))?
    }

    /// Produce the result for one descriptor.
    ///
    /// Configuration problems in the descriptor surface before the cache or
    /// the engine are touched.
    pub async fn process(
        &self,
        source: &SourceImage,
        desc: &VariantDescriptor,
    ) -> PlexResult<VariantResult> {
        let steps = build_pipeline(desc, &source.meta)?;

        let (info, bytes, cached) = if self.mode.transforms() {
            let (out, cached) = self.transform(source, desc, &steps).await?;
            (out.info, Some(out.bytes), cached)
        } else {
            (synthetic_info(&steps, &source.meta), None, false)
        };

        let name = self
            .names
            .build(desc, &info, &source.path, &source.bytes)?;
        let mime = mime::from_path(Path::new(&name)).or_else(|| mime::from_extension(&info.format));

        let url = if desc.is_inline() {
            let Some(bytes) = bytes.as_deref() else {
                return Err(PlexError::InlineWithoutBytes { name });
            };
            let mime = mime.ok_or_else(|| {
                PlexError::config(format!("unable to determine image type of `{name}`"))
            })?;
            data_uri(mime, bytes)
        } else {
            format!("{}{}", self.public_path, name)
        };

        let scale = desc.scale.unwrap_or(1.0);
        Ok(VariantResult {
            width: f64::from(info.width) / scale,
            height: f64::from(info.height) / scale,
            format: info.format,
            size: info.size,
            name,
            url,
            mime,
            options: desc.clone(),
            cached,
            bytes,
        })
    }

    /// Cached transform: both the info and data entries must hit.
    async fn transform(
        &self,
        source: &SourceImage,
        desc: &VariantDescriptor,
        steps: &[PipelineStep],
    ) -> PlexResult<(Transformed, bool)> {
        let info_key = CacheKey::new("info", &source.path, source.hash, desc);
        let data_key = CacheKey::new("data", &source.path, source.hash, desc);

        let (info, bytes) = tokio::join!(
            self.cache.read_json::<OutputInfo>(info_key.as_ref()),
            self.cache.read_buffer(data_key.as_ref()),
        );
        if let (Some(info), Some(bytes)) = (info, bytes) {
            crate::debug!("cache"; "hit {} ({})", source.path.display(), info.format);
            return Ok((Transformed { bytes, info }, true));
        }

        let out = self.timed(self.engine.apply(&source.bytes, steps)).await?;
        tokio::join!(
            self.cache.write_buffer(data_key.as_ref(), &out.bytes),
            self.cache.write_json(info_key.as_ref(), &out.info),
        );
        Ok((out, false))
    }
}
