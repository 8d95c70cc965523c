//! Popularity Index Module
//!
//! Items ordered by view count. Each view lowers an item's score by one, so rank 0 is the
//! most viewed item. Retention never removes entries here.

use crate::error::Result;
use crate::keys;
use crate::store::StoreHandle;

#[derive(Clone)]
pub struct PopularityIndex {
    store: StoreHandle,
}

impl PopularityIndex {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Counts one view of `item`. Returns the new score.
    pub async fn record_view(&self, item: &str) -> Result<f64> {
        self.store
            .sorted_increment_score(keys::VIEWED, -1.0, item)
            .await
    }

    pub async fn score(&self, item: &str) -> Result<Option<f64>> {
        self.store.sorted_score(keys::VIEWED, item).await
    }

    /// Zero-based popularity rank, None for never-viewed items.
    pub async fn rank(&self, item: &str) -> Result<Option<usize>> {
        self.store.sorted_rank(keys::VIEWED, item).await
    }

    /// The `count` most viewed items with their scores.
    pub async fn top(&self, count: usize) -> Result<Vec<(String, f64)>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        self.store
            .sorted_range_by_rank_with_scores(keys::VIEWED, 0, count as isize - 1)
            .await
    }
}
