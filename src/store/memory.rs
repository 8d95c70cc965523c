//! Memory Store Module
//!
//! In-process keyspace implementing [`KeyStore`]. Every call takes the keyspace lock once,
//! so single operations are atomic and sequences of operations are not.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{CacheError, Result};
use crate::store::{KeyStore, StoreEntry, StoreHandle, StoreStats, Value};

// == Keyspace ==
#[derive(Debug, Default)]
struct Keyspace {
    entries: HashMap<String, StoreEntry>,
    stats: StoreStats,
}

impl Keyspace {
    fn purge_if_expired(&mut self, key: &str) {
        if self.entries.get(key).is_some_and(|e| e.is_expired()) {
            self.entries.remove(key);
            self.stats.record_expired();
        }
    }

    /// Live value of `key` projected to the expected type.
    fn lookup<T>(&mut self, key: &str, project: fn(&Value) -> Option<&T>) -> Result<Option<&T>> {
        self.purge_if_expired(key);
        match self.entries.get(key) {
            None => Ok(None),
            Some(entry) => project(&entry.value)
                .map(Some)
                .ok_or_else(|| CacheError::WrongType(key.to_string())),
        }
    }

    /// Like `lookup`, mutably, without creating the key.
    fn existing_mut<T>(
        &mut self,
        key: &str,
        project: fn(&mut Value) -> Option<&mut T>,
    ) -> Result<Option<&mut T>> {
        self.purge_if_expired(key);
        match self.entries.get_mut(key) {
            None => Ok(None),
            Some(entry) => project(&mut entry.value)
                .map(Some)
                .ok_or_else(|| CacheError::WrongType(key.to_string())),
        }
    }

    /// Mutable value of `key`, created empty when absent.
    fn upsert<T>(
        &mut self,
        key: &str,
        create: fn() -> Value,
        project: fn(&mut Value) -> Option<&mut T>,
    ) -> Result<&mut T> {
        self.purge_if_expired(key);
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| StoreEntry::new(create()));
        project(&mut entry.value).ok_or_else(|| CacheError::WrongType(key.to_string()))
    }

    fn drop_if_empty(&mut self, key: &str) {
        if self
            .entries
            .get(key)
            .is_some_and(|e| e.value.is_empty_collection())
        {
            self.entries.remove(key);
        }
    }

    fn purge_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before - self.entries.len();
        for _ in 0..removed {
            self.stats.record_expired();
        }
        removed
    }

    fn live_keys(&self) -> usize {
        self.entries.values().filter(|e| !e.is_expired()).count()
    }
}

// == Memory Store ==
/// Shared in-memory keyspace. Clones are independent handles onto the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    keyspace: Arc<RwLock<Keyspace>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh connection onto this keyspace.
    pub fn handle(&self) -> StoreHandle {
        Arc::new(self.clone())
    }

    // == Cleanup Expired ==
    /// Removes every expired key. Returns the number removed.
    pub async fn purge_expired(&self) -> usize {
        self.keyspace.write().await.purge_expired()
    }

    // == Stats ==
    pub async fn stats(&self) -> StoreStats {
        let keyspace = self.keyspace.read().await;
        let mut stats = keyspace.stats.clone();
        stats.set_total_keys(keyspace.live_keys());
        stats
    }

    /// Number of live keys.
    pub async fn key_count(&self) -> usize {
        self.keyspace.read().await.live_keys()
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut ks = self.keyspace.write().await;
        let found = ks.lookup(key, Value::as_str)?.cloned();
        if found.is_some() {
            ks.stats.record_hit();
        } else {
            ks.stats.record_miss();
        }
        Ok(found)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut ks = self.keyspace.write().await;
        ks.entries.insert(
            key.to_string(),
            StoreEntry::new(Value::Str(value.to_string())),
        );
        Ok(())
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let mut entry = StoreEntry::new(Value::Str(value.to_string()));
        entry.expire_in(ttl_seconds);
        self.keyspace
            .write()
            .await
            .entries
            .insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<usize> {
        let mut ks = self.keyspace.write().await;
        let mut removed = 0;
        for key in keys {
            ks.purge_if_expired(key);
            if ks.entries.remove(key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<bool> {
        let mut ks = self.keyspace.write().await;
        ks.purge_if_expired(key);
        match ks.entries.get_mut(key) {
            Some(entry) => {
                entry.expire_in(ttl_seconds);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        let mut ks = self.keyspace.write().await;
        Ok(ks
            .lookup(key, Value::as_hash)?
            .and_then(|hash| hash.get(field).cloned()))
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<bool> {
        let mut ks = self.keyspace.write().await;
        let hash = ks.upsert(key, Value::new_hash, Value::as_hash_mut)?;
        Ok(hash.insert(field.to_string(), value.to_string()).is_none())
    }

    async fn hash_delete(&self, key: &str, fields: &[String]) -> Result<usize> {
        let mut ks = self.keyspace.write().await;
        let removed = match ks.existing_mut(key, Value::as_hash_mut)? {
            Some(hash) => fields
                .iter()
                .filter(|field| hash.remove(field.as_str()).is_some())
                .count(),
            None => 0,
        };
        ks.drop_if_empty(key);
        Ok(removed)
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>> {
        let mut ks = self.keyspace.write().await;
        Ok(ks.lookup(key, Value::as_hash)?.cloned().unwrap_or_default())
    }

    async fn hash_len(&self, key: &str) -> Result<usize> {
        let mut ks = self.keyspace.write().await;
        Ok(ks.lookup(key, Value::as_hash)?.map_or(0, |hash| hash.len()))
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<bool> {
        let mut ks = self.keyspace.write().await;
        let set = ks.upsert(key, Value::new_set, Value::as_set_mut)?;
        Ok(set.insert(member.to_string()))
    }

    async fn set_is_member(&self, key: &str, member: &str) -> Result<bool> {
        let mut ks = self.keyspace.write().await;
        Ok(ks
            .lookup(key, Value::as_set)?
            .is_some_and(|set| set.contains(member)))
    }

    async fn sorted_add(&self, key: &str, score: f64, member: &str) -> Result<bool> {
        let mut ks = self.keyspace.write().await;
        let sorted = ks.upsert(key, Value::new_sorted, Value::as_sorted_mut)?;
        Ok(sorted.insert(member, score))
    }

    async fn sorted_score(&self, key: &str, member: &str) -> Result<Option<f64>> {
        let mut ks = self.keyspace.write().await;
        Ok(ks
            .lookup(key, Value::as_sorted)?
            .and_then(|sorted| sorted.score(member)))
    }

    async fn sorted_rank(&self, key: &str, member: &str) -> Result<Option<usize>> {
        let mut ks = self.keyspace.write().await;
        Ok(ks
            .lookup(key, Value::as_sorted)?
            .and_then(|sorted| sorted.rank(member)))
    }

    async fn sorted_range_by_rank(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<String>> {
        Ok(self
            .sorted_range_by_rank_with_scores(key, start, stop)
            .await?
            .into_iter()
            .map(|(member, _)| member)
            .collect())
    }

    async fn sorted_range_by_rank_with_scores(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<(String, f64)>> {
        let mut ks = self.keyspace.write().await;
        Ok(ks
            .lookup(key, Value::as_sorted)?
            .map(|sorted| sorted.range_by_rank(start, stop))
            .unwrap_or_default())
    }

    async fn sorted_range_by_score_with_scores(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> Result<Vec<(String, f64)>> {
        let mut ks = self.keyspace.write().await;
        Ok(ks
            .lookup(key, Value::as_sorted)?
            .map(|sorted| sorted.range_by_score(min, max))
            .unwrap_or_default())
    }

    async fn sorted_remove(&self, key: &str, members: &[String]) -> Result<usize> {
        let mut ks = self.keyspace.write().await;
        let removed = match ks.existing_mut(key, Value::as_sorted_mut)? {
            Some(sorted) => members
                .iter()
                .filter(|member| sorted.remove(member.as_str()))
                .count(),
            None => 0,
        };
        ks.drop_if_empty(key);
        Ok(removed)
    }

    async fn sorted_cardinality(&self, key: &str) -> Result<usize> {
        let mut ks = self.keyspace.write().await;
        Ok(ks.lookup(key, Value::as_sorted)?.map_or(0, |sorted| sorted.len()))
    }

    async fn sorted_increment_score(&self, key: &str, delta: f64, member: &str) -> Result<f64> {
        let mut ks = self.keyspace.write().await;
        let sorted = ks.upsert(key, Value::new_sorted, Value::as_sorted_mut)?;
        Ok(sorted.increment(member, delta))
    }

    async fn sorted_remove_range_by_rank(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<usize> {
        let mut ks = self.keyspace.write().await;
        let removed = match ks.existing_mut(key, Value::as_sorted_mut)? {
            Some(sorted) => sorted.remove_range_by_rank(start, stop),
            None => 0,
        };
        ks.drop_if_empty(key);
        Ok(removed)
    }
}
