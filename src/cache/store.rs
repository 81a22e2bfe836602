//! Cache backends keyed by hex digest.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

/// Byte store addressed by a digest string.
///
/// `read` yields `Ok(None)` for an absent entry; errors are reserved for real
/// I/O failures. `write` replaces the entry as a whole.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn read(&self, digest: &str) -> io::Result<Option<Vec<u8>>>;

    async fn write(&self, digest: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Counter for temp file names, unique within this process.
static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// One file per digest in a flat directory.
///
/// Writes go to a unique temp file that is renamed onto the final path, so a
/// reader sees either the old entry or the new one, never a partial file.
#[derive(Debug, Clone)]
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, digest: &str) -> PathBuf {
        self.dir.join(digest)
    }
}

#[async_trait]
impl CacheStore for DiskStore {
    async fn read(&self, digest: &str) -> io::Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.entry_path(digest)).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn write(&self, digest: &str, bytes: &[u8]) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp_path = self
            .dir
            .join(format!(".{digest}.{}.{seq}.tmp", std::process::id()));

        tokio::fs::write(&tmp_path, bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp_path, self.entry_path(digest)).await {
            tokio::fs::remove_file(&tmp_path).await.ok();
            return Err(e);
        }
        Ok(())
    }
}

/// In-process store for tests and embedders.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn read(&self, digest: &str) -> io::Result<Option<Vec<u8>>> {
        Ok(self.entries.get(digest).map(|entry| entry.value().clone()))
    }

    async fn write(&self, digest: &str, bytes: &[u8]) -> io::Result<()> {
        self.entries.insert(digest.to_string(), bytes.to_vec());
        Ok(())
    }
}
