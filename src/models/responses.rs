//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::HashMap;

use serde::Serialize;

use crate::store::StoreStats;

/// Response body for GET /tokens/:token and POST /tokens
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user: String,
}

impl TokenResponse {
    pub fn new(token: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user: user.into(),
        }
    }
}

/// Response body for GET and PUT /carts/:token
#[derive(Debug, Clone, Serialize)]
pub struct CartResponse {
    pub token: String,
    /// Item -> quantity
    pub items: HashMap<String, i64>,
}

impl CartResponse {
    pub fn new(token: impl Into<String>, items: HashMap<String, i64>) -> Self {
        Self {
            token: token.into(),
            items,
        }
    }
}

/// Response body for PUT /rows/:row_id/schedule
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResponse {
    pub row_id: String,
    pub interval: i64,
    /// Whether the interval cancels the row
    pub cancelled: bool,
}

impl ScheduleResponse {
    pub fn new(row_id: impl Into<String>, interval: i64) -> Self {
        Self {
            row_id: row_id.into(),
            interval,
            cancelled: interval <= 0,
        }
    }
}

/// Response body for GET /rows/:row_id
#[derive(Debug, Clone, Serialize)]
pub struct RowResponse {
    pub row_id: String,
    /// Published row content as stored
    pub content: String,
    pub interval: Option<i64>,
    pub next_run: Option<i64>,
    /// Popularity score of the item behind the row, None if never viewed
    pub popularity: Option<f64>,
}

/// Response body for GET /page
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse {
    pub request: String,
    pub cacheable: bool,
    pub content: Option<String>,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Scalar reads that found a value
    pub hits: u64,
    /// Scalar reads that found nothing
    pub misses: u64,
    /// Keys dropped on expiry
    pub expired: u64,
    /// Live keys in the store
    pub total_keys: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Tokens currently tracked in `recent:`
    pub active_sessions: usize,
    /// Scheduled rows whose refresh time has passed
    pub due_rows: usize,
    /// Most viewed items, best first
    pub top_items: Vec<TopItem>,
}

/// One entry of the popularity ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopItem {
    pub item: String,
    pub score: f64,
}

impl StatsResponse {
    pub fn new(
        stats: &StoreStats,
        active_sessions: usize,
        due_rows: usize,
        top_items: Vec<(String, f64)>,
    ) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            expired: stats.expired,
            total_keys: stats.total_keys,
            hit_rate: stats.hit_rate(),
            active_sessions,
            due_rows,
            top_items: top_items
                .into_iter()
                .map(|(item, score)| TopItem { item, score })
                .collect(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
