//! Wall clock helpers shared by the workers and the store.

use chrono::Utc;

/// Current Unix time in whole seconds, as used for every score in the keyspace.
pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// Current Unix time in milliseconds.
pub fn unix_now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
