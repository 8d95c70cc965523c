//! API Handlers
//!
//! HTTP request handlers for each admin endpoint.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::cart::CartStore;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    AddToCartRequest, CartResponse, HealthResponse, PageQuery, PageResponse, RowResponse,
    ScheduleResponse, ScheduleRowRequest, StatsResponse, TokenResponse, UpdateTokenRequest,
};
use crate::clock::unix_now;
use crate::popularity::PopularityIndex;
use crate::request_cache::RequestCache;
use crate::session::SessionTracker;
use crate::store::MemoryStore;
use crate::tasks::RowSchedule;

/// Number of items listed in the stats ranking.
const TOP_ITEMS: usize = 10;

/// Application state shared across all handlers.
///
/// Every component holds its own handle onto the same store.
#[derive(Clone)]
pub struct AppState {
    pub store: MemoryStore,
    pub sessions: SessionTracker,
    pub popularity: PopularityIndex,
    pub carts: CartStore,
    pub rows: RowSchedule,
    pub pages: RequestCache,
}

impl AppState {
    /// Creates a new AppState with default request caching limits.
    pub fn new(store: MemoryStore) -> Self {
        Self::from_config(store, &Config::default())
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(store: MemoryStore, config: &Config) -> Self {
        Self {
            sessions: SessionTracker::new(store.handle()),
            popularity: PopularityIndex::new(store.handle()),
            carts: CartStore::new(store.handle()),
            rows: RowSchedule::new(store.handle()),
            pages: RequestCache::from_config(store.handle(), config),
            store,
        }
    }
}

/// Stand-in page renderer used when a page is not served from cache.
fn render_page(request: &str) -> Option<String> {
    Some(format!("content for {request}"))
}

/// Handler for POST /tokens
pub async fn update_token_handler(
    State(state): State<AppState>,
    Json(req): Json<UpdateTokenRequest>,
) -> Result<Json<TokenResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state
        .sessions
        .update_token(&req.token, &req.user, req.item.as_deref())
        .await?;

    Ok(Json(TokenResponse::new(req.token, req.user)))
}

/// Handler for GET /tokens/:token
pub async fn check_token_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<TokenResponse>> {
    let user = state
        .sessions
        .check_token(&token)
        .await?
        .ok_or_else(|| CacheError::NotFound(format!("token {token}")))?;

    Ok(Json(TokenResponse::new(token, user)))
}

/// Handler for PUT /carts/:token
pub async fn add_to_cart_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<CartResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.carts.add_to_cart(&token, &req.item, req.count).await?;
    let items = state.carts.cart_contents(&token).await?;

    Ok(Json(CartResponse::new(token, items)))
}

/// Handler for GET /carts/:token
pub async fn cart_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<CartResponse>> {
    let items = state.carts.cart_contents(&token).await?;
    Ok(Json(CartResponse::new(token, items)))
}

/// Handler for PUT /rows/:row_id/schedule
pub async fn schedule_row_handler(
    State(state): State<AppState>,
    Path(row_id): Path<String>,
    Json(req): Json<ScheduleRowRequest>,
) -> Result<Json<ScheduleResponse>> {
    state.rows.schedule_row_cache(&row_id, req.interval).await?;
    Ok(Json(ScheduleResponse::new(row_id, req.interval)))
}

/// Handler for GET /rows/:row_id
pub async fn row_handler(
    State(state): State<AppState>,
    Path(row_id): Path<String>,
) -> Result<Json<RowResponse>> {
    let content = state
        .rows
        .published(&row_id)
        .await?
        .ok_or_else(|| CacheError::NotFound(format!("row {row_id}")))?;

    Ok(Json(RowResponse {
        interval: state.rows.interval(&row_id).await?,
        next_run: state.rows.next_run(&row_id).await?,
        popularity: state.popularity.score(&row_id).await?,
        row_id,
        content,
    }))
}

/// Handler for GET /page?request=<url>
pub async fn page_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse>> {
    let page = state
        .pages
        .fetch_page(&query.request, Some(&render_page))
        .await?;

    Ok(Json(PageResponse {
        request: query.request,
        cacheable: page.cacheable,
        content: page.content,
    }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.store.stats().await;
    let active_sessions = state.sessions.active_sessions().await?;
    let due_rows = state.rows.due_rows(unix_now()).await?.len();
    let top_items = state.popularity.top(TOP_ITEMS).await?;

    Ok(Json(StatsResponse::new(
        &stats,
        active_sessions,
        due_rows,
        top_items,
    )))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
