//! Row Refresh Scheduler
//!
//! Rows are scheduled with a refresh interval. The worker repeatedly peeks the single
//! earliest entry of `schedule:`; when it is due, the row is rebuilt from its source and
//! republished under `inv:<row>`. An interval of zero or less cancels the row and removes the
//! published copy.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::unix_now;
use crate::error::Result;
use crate::keys;
use crate::store::StoreHandle;
use crate::tasks::{QuitSignal, WorkerHandle};

/// Idle sleep while no row is due.
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(50);

// == Row Source ==
/// Authoritative source of row content.
pub trait RowSource: Send + Sync + 'static {
    type Row: Serialize;

    fn load(&self, row_id: &str) -> Result<Self::Row>;
}

/// Inventory snapshot published for a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub id: String,
    pub data: String,
    /// Unix seconds at which the snapshot was taken
    pub time: i64,
}

impl Inventory {
    pub fn get(id: &str) -> Self {
        Self {
            id: id.to_string(),
            data: "data to cache...".to_string(),
            time: unix_now(),
        }
    }
}

/// Stock source producing [`Inventory`] snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventorySource;

impl RowSource for InventorySource {
    type Row = Inventory;

    fn load(&self, row_id: &str) -> Result<Inventory> {
        Ok(Inventory::get(row_id))
    }
}

// == Row Schedule ==
/// Caller-facing side of row scheduling.
#[derive(Clone)]
pub struct RowSchedule {
    store: StoreHandle,
}

impl RowSchedule {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Sets the refresh interval of `row_id` and makes it due immediately.
    ///
    /// An interval of zero or less cancels the row on its next turn.
    pub async fn schedule_row_cache(&self, row_id: &str, interval_secs: i64) -> Result<()> {
        self.store
            .sorted_add(keys::DELAY, interval_secs as f64, row_id)
            .await?;
        self.store
            .sorted_add(keys::SCHEDULE, unix_now() as f64, row_id)
            .await?;
        debug!(row_id, interval_secs, "Row scheduled");
        Ok(())
    }

    pub async fn interval(&self, row_id: &str) -> Result<Option<i64>> {
        let delay = self.store.sorted_score(keys::DELAY, row_id).await?;
        Ok(delay.map(|d| d as i64))
    }

    pub async fn next_run(&self, row_id: &str) -> Result<Option<i64>> {
        let at = self.store.sorted_score(keys::SCHEDULE, row_id).await?;
        Ok(at.map(|t| t as i64))
    }

    /// Rows due at or before `until`, earliest first.
    pub async fn due_rows(&self, until: i64) -> Result<Vec<(String, i64)>> {
        let due = self
            .store
            .sorted_range_by_score_with_scores(keys::SCHEDULE, f64::NEG_INFINITY, until as f64)
            .await?;
        Ok(due.into_iter().map(|(row, at)| (row, at as i64)).collect())
    }

    /// Currently published content of `row_id`.
    pub async fn published(&self, row_id: &str) -> Result<Option<String>> {
        self.store.get(&keys::inventory(row_id)).await
    }
}

/// Outcome of a single scheduler pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowTick {
    /// Nothing due.
    Idle,
    /// Row rebuilt and republished.
    Refreshed(String),
    /// Row unscheduled and its published copy removed.
    Cancelled(String),
}

// == Row Scheduler ==
pub struct RowScheduler<S: RowSource> {
    store: StoreHandle,
    source: S,
    backoff: Duration,
}

impl<S: RowSource> RowScheduler<S> {
    pub fn new(store: StoreHandle, source: S) -> Self {
        Self {
            store,
            source,
            backoff: DEFAULT_BACKOFF,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    // == Tick ==
    /// Handles at most one row: the earliest scheduled, if it is due.
    pub async fn tick(&self) -> Result<RowTick> {
        let next = self
            .store
            .sorted_range_by_rank_with_scores(keys::SCHEDULE, 0, 0)
            .await?;
        let now = unix_now();
        let (row_id, due_at) = match next.into_iter().next() {
            Some((row_id, due_at)) if due_at <= now as f64 => (row_id, due_at),
            _ => return Ok(RowTick::Idle),
        };

        let delay = self.store.sorted_score(keys::DELAY, &row_id).await?;
        let delay = match delay {
            Some(delay) if delay > 0.0 => delay,
            // A missing interval is treated like a cancelled one.
            _ => {
                let ids = [row_id.clone()];
                self.store.sorted_remove(keys::DELAY, &ids).await?;
                self.store.sorted_remove(keys::SCHEDULE, &ids).await?;
                self.store.delete(&[keys::inventory(&row_id)]).await?;
                debug!(row_id = %row_id, "Row cancelled");
                return Ok(RowTick::Cancelled(row_id));
            }
        };

        let content = serde_json::to_string(&self.source.load(&row_id)?)?;
        // Reschedule before publishing: a failed publish leaves the old copy in place.
        self.store
            .sorted_add(keys::SCHEDULE, now as f64 + delay, &row_id)
            .await?;
        self.store.set(&keys::inventory(&row_id), &content).await?;
        debug!(row_id = %row_id, late_by = now as f64 - due_at, "Row refreshed");

        Ok(RowTick::Refreshed(row_id))
    }

    // == Run ==
    /// Loops until `quit` is raised, sleeping only while nothing is due.
    pub async fn run(self, quit: QuitSignal) {
        info!(backoff = ?self.backoff, "Starting row scheduler");

        while !quit.is_raised() {
            match self.tick().await {
                Ok(RowTick::Idle) => {
                    quit.sleep(self.backoff).await;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "Row refresh aborted");
                    quit.sleep(self.backoff).await;
                }
            }
        }

        info!("Row scheduler stopped");
    }

    pub fn spawn(self) -> WorkerHandle {
        WorkerHandle::spawn("row-scheduler", |quit| self.run(quit))
    }
}
