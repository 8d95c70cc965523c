//! Session Retention Worker
//!
//! Trims the `recent:` ordering down to a session limit, oldest first, dropping each evicted
//! token's login, viewed history and (optionally) shopping cart.
//!
//! The batch is read and then deleted in separate store calls. A token refreshed between the
//! two is still evicted; the loop does not try to detect that. A failure part way through can
//! likewise leave a login without its `recent:` entry, or the reverse.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::keys;
use crate::store::StoreHandle;
use crate::tasks::{QuitSignal, WorkerHandle};

/// Most sessions evicted in one pass.
pub const MAX_BATCH: usize = 100;
/// Idle sleep once the population is within the limit.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// What an eviction cascades to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionMode {
    /// Login and viewed history.
    Sessions,
    /// Login, viewed history and shopping cart.
    SessionsAndCarts,
}

/// Outcome of a single pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionTick {
    /// Population within the limit.
    Idle,
    /// Number of tokens evicted.
    Trimmed(usize),
}

// == Retention Worker ==
pub struct RetentionWorker {
    store: StoreHandle,
    limit: usize,
    mode: RetentionMode,
    backoff: Duration,
}

impl RetentionWorker {
    pub fn new(store: StoreHandle, limit: usize, mode: RetentionMode) -> Self {
        Self {
            store,
            limit,
            mode,
            backoff: DEFAULT_BACKOFF,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    fn name(&self) -> &'static str {
        match self.mode {
            RetentionMode::Sessions => "session-retention",
            RetentionMode::SessionsAndCarts => "full-retention",
        }
    }

    // == Tick ==
    /// Evicts up to [`MAX_BATCH`] of the oldest tokens above the limit.
    pub async fn tick(&self) -> Result<RetentionTick> {
        let size = self.store.sorted_cardinality(keys::RECENT).await?;
        if size <= self.limit {
            return Ok(RetentionTick::Idle);
        }

        let excess = (size - self.limit).min(MAX_BATCH);
        let tokens = self
            .store
            .sorted_range_by_rank(keys::RECENT, 0, excess as isize - 1)
            .await?;

        // An empty token would name the popularity index itself.
        let live_tokens = tokens.iter().filter(|token| !token.is_empty());
        let mut session_keys: Vec<String> = live_tokens.clone().map(|t| keys::viewed(t)).collect();
        if self.mode == RetentionMode::SessionsAndCarts {
            session_keys.extend(live_tokens.map(|t| keys::cart(t)));
        }

        self.store.delete(&session_keys).await?;
        self.store.hash_delete(keys::LOGIN, &tokens).await?;
        self.store.sorted_remove(keys::RECENT, &tokens).await?;

        Ok(RetentionTick::Trimmed(tokens.len()))
    }

    // == Run ==
    /// Loops until `quit` is raised, sleeping only while there is nothing to evict.
    pub async fn run(self, quit: QuitSignal) {
        info!(
            worker = self.name(),
            limit = self.limit,
            "Starting session retention"
        );

        while !quit.is_raised() {
            match self.tick().await {
                Ok(RetentionTick::Trimmed(evicted)) => {
                    debug!(worker = self.name(), evicted, "Evicted sessions");
                }
                Ok(RetentionTick::Idle) => {
                    quit.sleep(self.backoff).await;
                }
                Err(e) => {
                    warn!(worker = self.name(), error = %e, "Retention pass aborted");
                    quit.sleep(self.backoff).await;
                }
            }
        }

        info!(worker = self.name(), "Session retention stopped");
    }

    pub fn spawn(self) -> WorkerHandle {
        WorkerHandle::spawn(self.name(), |quit| self.run(quit))
    }
}
