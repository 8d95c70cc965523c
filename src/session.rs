//! Session Tracking Module
//!
//! Records login tokens, their last activity and each token's recently viewed items.
//! Every view also feeds the popularity index.

use tracing::debug;

use crate::clock::unix_now;
use crate::error::{CacheError, Result};
use crate::keys;
use crate::popularity::PopularityIndex;
use crate::store::StoreHandle;

/// Number of recently viewed items kept per token.
pub const VIEWED_HISTORY_LIMIT: usize = 25;

// == Session Tracker ==
#[derive(Clone)]
pub struct SessionTracker {
    store: StoreHandle,
    popularity: PopularityIndex,
}

impl SessionTracker {
    pub fn new(store: StoreHandle) -> Self {
        Self {
            popularity: PopularityIndex::new(store.clone()),
            store,
        }
    }

    // == Check Token ==
    /// Returns the user logged in under `token`, if any.
    pub async fn check_token(&self, token: &str) -> Result<Option<String>> {
        self.store.hash_get(keys::LOGIN, token).await
    }

    // == Update Token ==
    /// Refreshes `token` for `user` and records a view of `item` when given.
    ///
    /// The popularity of `item` drops by one on every call, even when the view falls
    /// outside the token's retained history.
    pub async fn update_token(&self, token: &str, user: &str, item: Option<&str>) -> Result<()> {
        if token.is_empty() {
            return Err(CacheError::InvalidRequest("Token cannot be empty".to_string()));
        }

        let now = unix_now() as f64;
        self.store.hash_set(keys::LOGIN, token, user).await?;
        self.store.sorted_add(keys::RECENT, now, token).await?;

        if let Some(item) = item {
            let viewed = keys::viewed(token);
            self.store.sorted_add(&viewed, now, item).await?;
            let trimmed = self
                .store
                .sorted_remove_range_by_rank(&viewed, 0, -(VIEWED_HISTORY_LIMIT as isize) - 1)
                .await?;
            self.popularity.record_view(item).await?;
            debug!(token, item, trimmed, "Recorded view");
        }

        Ok(())
    }

    // == Viewed Items ==
    /// The token's retained history, oldest first.
    pub async fn viewed_items(&self, token: &str) -> Result<Vec<String>> {
        self.store
            .sorted_range_by_rank(&keys::viewed(token), 0, -1)
            .await
    }

    /// Number of tokens with a recorded activity.
    pub async fn active_sessions(&self) -> Result<usize> {
        self.store.sorted_cardinality(keys::RECENT).await
    }
}
