//! Keyspace layout.
//!
//! These names are shared with every other client of the store and must not change.

/// Token -> user hash.
pub const LOGIN: &str = "login:";
/// Token -> last activity sorted set.
pub const RECENT: &str = "recent:";
/// Item -> popularity sorted set. Per-token histories live under the same prefix.
pub const VIEWED: &str = "viewed:";
/// Row -> next run timestamp.
pub const SCHEDULE: &str = "schedule:";
/// Row -> refresh interval in seconds.
pub const DELAY: &str = "delay:";

pub fn viewed(token: &str) -> String {
    format!("viewed:{token}")
}

pub fn cart(token: &str) -> String {
    format!("cart:{token}")
}

pub fn inventory(row_id: &str) -> String {
    format!("inv:{row_id}")
}

pub fn page(request_hash: i32) -> String {
    format!("cache:{request_hash}")
}
