//! Content hashing using blake3.

use std::path::Path;

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash a byte slice.
    pub fn of(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    /// Hash several parts as one stream.
    pub fn of_parts(parts: &[&[u8]]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(part);
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Read and hash a file.
    pub async fn of_file(path: &Path) -> std::io::Result<(Self, Vec<u8>)> {
        let bytes = tokio::fs::read(path).await?;
        Ok((Self::of(&bytes), bytes))
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }

    /// First `len` hex chars (clamped to 1..=64).
    pub fn hex_prefix(self, len: usize) -> String {
        let mut hex = self.to_hex();
        hex.truncate(len.clamp(1, 64));
        hex
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // first 16 hex chars
        write!(f, "{}", self.hex_prefix(16))
    }
}
