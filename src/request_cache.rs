//! Request Cache Module
//!
//! Serves pages for popular items from the store instead of rebuilding them.
//!
//! A request is cacheable when it is a well-formed URL naming an `item`, carries no `_`
//! parameter, and the item ranks below the configured popularity cutoff. Cached pages
//! expire after a fixed lifetime; nothing else invalidates them.
//!
//! Query values are percent-decoded before the `item` lookup, with `+` read as a space. Older
//! deployments matched the raw query text instead, so `?item=a%20b` looks up `a b` here where
//! they looked up `a%20b`.

use std::collections::HashMap;

use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::Result;
use crate::keys;
use crate::popularity::PopularityIndex;
use crate::store::StoreHandle;

/// Default lifetime of a cached page in seconds.
pub const DEFAULT_PAGE_TTL: u64 = 300;
/// Default popularity rank cutoff.
pub const DEFAULT_RANK_LIMIT: usize = 10_000;

/// Builds page content for a request. Supplied per call.
pub type Producer<'a> = &'a (dyn Fn(&str) -> Option<String> + Send + Sync);

/// Result of a page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Whether the request qualified for caching when it was served
    pub cacheable: bool,
    pub content: Option<String>,
}

// == Request Cache ==
#[derive(Clone)]
pub struct RequestCache {
    store: StoreHandle,
    popularity: PopularityIndex,
    ttl: u64,
    rank_limit: usize,
}

impl RequestCache {
    pub fn new(store: StoreHandle) -> Self {
        Self::with_limits(store, DEFAULT_PAGE_TTL, DEFAULT_RANK_LIMIT)
    }

    pub fn from_config(store: StoreHandle, config: &Config) -> Self {
        Self::with_limits(store, config.request_cache_ttl, config.cache_rank_limit)
    }

    pub fn with_limits(store: StoreHandle, ttl: u64, rank_limit: usize) -> Self {
        Self {
            popularity: PopularityIndex::new(store.clone()),
            store,
            ttl,
            rank_limit,
        }
    }

    // == Fetch ==
    /// Returns the page for `request`, from the store when possible.
    ///
    /// Without a producer, a miss yields `None`; nothing is written.
    pub async fn fetch(
        &self,
        request: &str,
        producer: Option<Producer<'_>>,
    ) -> Result<Option<String>> {
        Ok(self.fetch_page(request, producer).await?.content)
    }

    /// Like [`RequestCache::fetch`], also reporting whether the cache was consulted.
    pub async fn fetch_page(
        &self,
        request: &str,
        producer: Option<Producer<'_>>,
    ) -> Result<Page> {
        if !self.can_cache(request).await? {
            return Ok(Page {
                cacheable: false,
                content: producer.and_then(|produce| produce(request)),
            });
        }

        let page_key = keys::page(hash_request(request));
        if let Some(content) = self.store.get(&page_key).await? {
            debug!(request, "Page served from cache");
            return Ok(Page {
                cacheable: true,
                content: Some(content),
            });
        }

        let content = producer.and_then(|produce| produce(request));
        if let Some(content) = &content {
            self.store
                .set_with_expiry(&page_key, content, self.ttl)
                .await?;
            debug!(request, ttl = self.ttl, "Page cached");
        }
        Ok(Page {
            cacheable: true,
            content,
        })
    }

    // == Can Cache ==
    pub async fn can_cache(&self, request: &str) -> Result<bool> {
        let Some(params) = query_params(request) else {
            return Ok(false);
        };
        let item = match params.get("item") {
            Some(item) if !item.is_empty() => item,
            _ => return Ok(false),
        };
        if params.contains_key("_") {
            return Ok(false);
        }

        let rank = self.popularity.rank(item).await?;
        Ok(rank.is_some_and(|rank| rank < self.rank_limit))
    }
}

/// Decoded query parameters, or None when `request` is not a URL. Later duplicates win.
fn query_params(request: &str) -> Option<HashMap<String, String>> {
    let url = Url::parse(request).ok()?;
    Some(url.query_pairs().into_owned().collect())
}

// == Hash Request ==
/// 32-bit polynomial string hash over UTF-16 code units (`h = 31 * h + unit`, wrapping).
///
/// Existing deployments key cached pages by this value, so it must stay stable.
pub fn hash_request(request: &str) -> i32 {
    request
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32))
}
