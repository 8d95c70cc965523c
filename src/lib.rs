//! Storefront Cache - background maintenance and request caching for a content site
//!
//! Keeps derived rows refreshed on a schedule, trims session and cart state to a retention
//! limit, and serves pages for popular items from a keyed store.

pub mod api;
pub mod cart;
pub mod clock;
pub mod config;
pub mod error;
pub mod keys;
pub mod models;
pub mod popularity;
pub mod request_cache;
pub mod session;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{CacheError, Result};
pub use request_cache::RequestCache;
pub use store::{KeyStore, MemoryStore, StoreHandle};
