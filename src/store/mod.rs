//! Store Module
//!
//! The keyed store every component shares, and an in-process implementation of it.
//!
//! Each call on [`KeyStore`] is atomic on its own. Nothing here groups several calls into a
//! transaction, and callers must be correct under any interleaving of individual calls.

mod entry;
mod memory;
mod sorted;
mod stats;


use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

// Re-export public types
pub use entry::{StoreEntry, Value};
pub use memory::MemoryStore;
pub use sorted::{normalize_range, SortedSet};
pub use stats::StoreStats;

/// A connection to the shared store. Each worker holds its own.
pub type StoreHandle = Arc<dyn KeyStore>;

// == Key Store ==
/// Operations consumed from the keyed store.
///
/// Rank ranges are inclusive and accept negative indices counted from the end.
#[async_trait]
pub trait KeyStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    /// Stores a string, clearing any previous expiry.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Stores a string that disappears after `ttl_seconds`.
    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()>;
    /// Removes keys of any type. Returns how many existed.
    async fn delete(&self, keys: &[String]) -> Result<usize>;
    /// Returns false when the key does not exist.
    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<bool>;

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>>;
    /// Returns true if the field is new.
    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<bool>;
    async fn hash_delete(&self, key: &str, fields: &[String]) -> Result<usize>;
    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>>;
    async fn hash_len(&self, key: &str) -> Result<usize>;

    async fn set_add(&self, key: &str, member: &str) -> Result<bool>;
    async fn set_is_member(&self, key: &str, member: &str) -> Result<bool>;

    /// Returns true if the member is new.
    async fn sorted_add(&self, key: &str, score: f64, member: &str) -> Result<bool>;
    async fn sorted_score(&self, key: &str, member: &str) -> Result<Option<f64>>;
    async fn sorted_rank(&self, key: &str, member: &str) -> Result<Option<usize>>;
    async fn sorted_range_by_rank(&self, key: &str, start: isize, stop: isize)
        -> Result<Vec<String>>;
    async fn sorted_range_by_rank_with_scores(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<(String, f64)>>;
    async fn sorted_range_by_score_with_scores(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> Result<Vec<(String, f64)>>;
    async fn sorted_remove(&self, key: &str, members: &[String]) -> Result<usize>;
    async fn sorted_cardinality(&self, key: &str) -> Result<usize>;
    /// Returns the member's new score.
    async fn sorted_increment_score(&self, key: &str, delta: f64, member: &str) -> Result<f64>;
    async fn sorted_remove_range_by_rank(&self, key: &str, start: isize, stop: isize)
        -> Result<usize>;
}
