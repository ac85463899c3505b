//! 64-bit hashing helpers
//!
//! Persisted hashes (descriptor hashes, annotation content hashes) truncate a
//! Blake3 digest to 64 bits: stable across processes and platforms. A
//! collision is an accepted, unreported risk traded for compact storage and
//! cheap equality.
//!
//! In-process bucketing (`diff_hash_code`) uses FxHash, which is fast but
//! never persisted.

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

fn truncate(hash: &blake3::Hash) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(buf)
}

/// One-shot stable 64-bit hash
pub fn hash64(bytes: &[u8]) -> u64 {
    truncate(&blake3::hash(bytes))
}

/// Stable hash of a raw JVM descriptor, stored in field/method usages
/// instead of the descriptor text
pub fn descriptor_hash(descriptor: &str) -> u64 {
    hash64(descriptor.as_bytes())
}

/// In-process hash for identity bucketing
pub fn fx_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Order-sensitive streaming 64-bit hash
///
/// Every fold is length- or tag-delimited so adjacent values cannot blur
/// into each other (`"ab" + "c"` differs from `"a" + "bc"`).
#[derive(Debug, Clone, Default)]
pub struct StreamingHash64 {
    hasher: blake3::Hasher,
}

impl StreamingHash64 {
    pub fn new() -> Self {
        Self {
            hasher: blake3::Hasher::new(),
        }
    }

    pub fn update_tag(&mut self, tag: u8) -> &mut Self {
        self.hasher.update(&[tag]);
        self
    }

    pub fn update_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.hasher.update(&(bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
        self
    }

    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.update_bytes(s.as_bytes())
    }

    pub fn update_u64(&mut self, value: u64) -> &mut Self {
        self.hasher.update(&value.to_le_bytes());
        self
    }

    pub fn finish(&self) -> u64 {
        truncate(&self.hasher.finalize())
    }
}
