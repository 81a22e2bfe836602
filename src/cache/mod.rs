//! Persistent cache for source metadata and transformed variants.
//!
//! Entries are addressed by the digest of a [`CacheKey`]. The cache handle is
//! cheap to clone and injected wherever it is needed; a disabled cache turns
//! every read into a miss and every write into a no-op.

mod store;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::digest::{ContentHash, hash_value};

pub use store::{CacheStore, DiskStore, MemoryStore};

/// Cache directory name (inside project root)
pub const CACHE_DIR: &str = ".imgplex/cache";

/// What a cache entry is about.
///
/// The source content hash is part of the key, so editing a source file
/// invalidates its entries even when the path stays the same.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheKey {
    pub namespace: &'static str,
    /// Hex of the path's raw bytes; file names need not be UTF-8.
    pub source: String,
    pub content: String,
    pub options: Value,
}

impl CacheKey {
    /// `None` when `options` has no JSON form; such entries are not cached.
    pub fn new<T: Serialize + ?Sized>(
        namespace: &'static str,
        source: &Path,
        content: ContentHash,
        options: &T,
    ) -> Option<Self> {
        let options = match serde_json::to_value(options) {
            Ok(options) => options,
            Err(e) => {
                crate::debug!("cache"; "uncacheable {} key for {}: {}", namespace, source.display(), e);
                return None;
            }
        };
        Some(Self {
            namespace,
            source: hex::encode(source.as_os_str().as_encoded_bytes()),
            content: content.to_hex(),
            options,
        })
    }

    /// Stable hex digest of the whole key.
    pub fn digest(&self) -> String {
        hash_value(&json!({
            "namespace": self.namespace,
            "source": self.source,
            "content": self.content,
            "options": self.options,
        }))
    }
}

/// Shared cache handle.
#[derive(Clone, Default)]
pub struct Cache {
    store: Option<Arc<dyn CacheStore>>,
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl Cache {
    pub fn disabled() -> Self {
        Self { store: None }
    }

    pub fn on_disk(dir: impl Into<PathBuf>) -> Self {
        Self::with_store(Arc::new(DiskStore::new(dir)))
    }

    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<dyn CacheStore>) -> Self {
        Self { store: Some(store) }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Exact-match lookup. `Ok(None)` on a miss or when disabled.
    pub async fn read(&self, key: &CacheKey) -> io::Result<Option<Vec<u8>>> {
        match &self.store {
            Some(store) => store.read(&key.digest()).await,
            None => Ok(None),
        }
    }

    /// Replace the entry for `key`. No-op when disabled.
    pub async fn write(&self, key: &CacheKey, bytes: &[u8]) -> io::Result<()> {
        match &self.store {
            Some(store) => store.write(&key.digest(), bytes).await,
            None => Ok(()),
        }
    }

    /// Like [`Cache::read`], with failures degraded to a miss.
    ///
    /// A missing key (see [`CacheKey::new`]) is always a miss.
    pub async fn read_buffer(&self, key: Option<&CacheKey>) -> Option<Vec<u8>> {
        let key = key?;
        match self.read(key).await {
            Ok(data) => data,
            Err(e) => {
                crate::debug!("cache"; "read {} failed: {}", key.namespace, e);
                None
            }
        }
    }

    /// Read and decode a JSON entry; undecodable entries count as a miss.
    pub async fn read_json<T: DeserializeOwned>(&self, key: Option<&CacheKey>) -> Option<T> {
        let key = key?;
        let data = self.read_buffer(Some(key)).await?;
        match serde_json::from_slice(&data) {
            Ok(value) => Some(value),
            Err(e) => {
                crate::debug!("cache"; "corrupt {} entry ignored: {}", key.namespace, e);
                None
            }
        }
    }

    /// Like [`Cache::write`], with failures logged and dropped.
    pub async fn write_buffer(&self, key: Option<&CacheKey>, bytes: &[u8]) {
        let Some(key) = key else { return };
        if let Err(e) = self.write(key, bytes).await {
            crate::debug!("cache"; "write {} failed: {}", key.namespace, e);
        }
    }

    pub async fn write_json<T: Serialize + ?Sized>(&self, key: Option<&CacheKey>, value: &T) {
        match serde_json::to_vec(value) {
            Ok(data) => self.write_buffer(key, &data).await,
            Err(e) => crate::debug!("cache"; "encode {} failed: {}", key.map_or("", |k| k.namespace), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(options: Value) -> CacheKey {
        CacheKey::new("data", Path::new("img/a.png"), ContentHash::of(b"src"), &options).unwrap()
    }

    #[test]
    fn test_key_digest_ignores_option_key_order() {
        let a = key(json!({"width": 100, "format": "webp"}));
        let b = key(json!({"format": "webp", "width": 100}));
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn test_key_digest_covers_every_part() {
        let base = key(json!({"width": 100}));
        let other_options = key(json!({"width": 101}));
        let other_content = CacheKey::new(
            "data",
            Path::new("img/a.png"),
            ContentHash::of(b"edited"),
            &json!({"width": 100}),
        )
        .unwrap();
        let other_source = CacheKey::new(
            "data",
            Path::new("img/b.png"),
            ContentHash::of(b"src"),
            &json!({"width": 100}),
        )
        .unwrap();
        let mut other_namespace = base.clone();
        other_namespace.namespace = "info";

        assert_ne!(base.digest(), other_options.digest());
        assert_ne!(base.digest(), other_content.digest());
        assert_ne!(base.digest(), other_source.digest());
        assert_ne!(base.digest(), other_namespace.digest());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_paths_keep_keys_apart() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let hero = Path::new(OsStr::from_bytes(b"img/\xffhero.png"));
        let other = Path::new(OsStr::from_bytes(b"other/\xfe.png"));
        let hash = ContentHash::of(b"src");

        let data = CacheKey::new("data", hero, hash, &json!({"width": 100})).unwrap();
        let info = CacheKey::new("info", hero, hash, &json!({"width": 100})).unwrap();
        let wider = CacheKey::new("data", hero, hash, &json!({"width": 999})).unwrap();
        let meta = CacheKey::new("meta", other, ContentHash::of(b"other"), &()).unwrap();

        let digests = [data.digest(), info.digest(), wider.digest(), meta.digest()];
        for (i, a) in digests.iter().enumerate() {
            for b in &digests[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(data.source, hex::encode(b"img/\xffhero.png"));
    }

    #[tokio::test]
    async fn test_unrepresentable_options_are_not_cached() {
        let mut options = std::collections::BTreeMap::new();
        options.insert((1, 2), "tuple key");
        let k = CacheKey::new("info", Path::new("a.png"), ContentHash::of(b"src"), &options);
        assert!(k.is_none());

        let cache = Cache::in_memory();
        cache.write_buffer(k.as_ref(), b"bytes").await;
        assert_eq!(cache.read_buffer(k.as_ref()).await, None);
    }

    #[tokio::test]
    async fn test_disk_cache_roundtrip() {
        let dir = TempDir::new().unwrap();
        let cache = Cache::on_disk(dir.path());
        let k = key(json!({"w": 1}));

        assert_eq!(cache.read(&k).await.unwrap(), None);
        cache.write_buffer(Some(&k), b"bytes").await;
        assert_eq!(cache.read_buffer(Some(&k)).await, Some(b"bytes".to_vec()));
    }

    #[tokio::test]
    async fn test_json_roundtrip() {
        let cache = Cache::in_memory();
        let k = key(json!({"w": 2}));
        cache.write_json(Some(&k), &json!({"width": 10})).await;
        let back: Option<Value> = cache.read_json(Some(&k)).await;
        assert_eq!(back, Some(json!({"width": 10})));
    }

    #[tokio::test]
    async fn test_corrupt_json_is_a_miss() {
        let cache = Cache::in_memory();
        let k = key(json!({}));
        cache.write_buffer(Some(&k), b"{not json").await;
        let back: Option<Value> = cache.read_json(Some(&k)).await;
        assert_eq!(back, None);
    }

    #[tokio::test]
    async fn test_disabled_cache_never_hits() {
        let cache = Cache::disabled();
        let k = key(json!({}));
        cache.write(&k, b"x").await.unwrap();
        assert_eq!(cache.read(&k).await.unwrap(), None);
        assert!(!cache.is_enabled());
    }

    #[tokio::test]
    async fn test_io_failure_degrades_to_miss() {
        let dir = TempDir::new().unwrap();
        // a file where the cache directory should be
        let blocker = dir.path().join("cache");
        std::fs::write(&blocker, b"").unwrap();
        let cache = Cache::on_disk(&blocker);
        let k = key(json!({}));

        assert!(cache.write(&k, b"x").await.is_err());
        cache.write_buffer(Some(&k), b"x").await;
        assert_eq!(cache.read_buffer(Some(&k)).await, None);
    }
}
