//! Persistence for generated signals and the dedup history that keeps the
//! engine from re-alerting on the same story.

use sha2::{Digest, Sha256};

pub mod memory;
pub mod sqlite;

pub use memory::{MemoryHistoryStore, MemorySignalStore};
pub use sqlite::{SqliteHistoryStore, SqliteSignalStore};

/// Stable fingerprint for a source article, used for audit rather than
/// as the dedup key.
pub fn article_hash(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
