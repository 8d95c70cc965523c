//! Store Entry Module
//!
//! Defines the typed values held by the keyspace and their expiry metadata.

use std::collections::{HashMap, HashSet};

use crate::clock::unix_now_ms;
use crate::store::SortedSet;

// == Value ==
/// The kinds of value a key can hold.
#[derive(Debug, Clone)]
pub enum Value {
    Str(String),
    Hash(HashMap<String, String>),
    Set(HashSet<String>),
    Sorted(SortedSet),
}

impl Value {
    pub fn new_hash() -> Self {
        Value::Hash(HashMap::new())
    }

    pub fn new_set() -> Self {
        Value::Set(HashSet::new())
    }

    pub fn new_sorted() -> Self {
        Value::Sorted(SortedSet::new())
    }

    pub fn as_str(&self) -> Option<&String> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&HashMap<String, String>> {
        match self {
            Value::Hash(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_hash_mut(&mut self) -> Option<&mut HashMap<String, String>> {
        match self {
            Value::Hash(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&HashSet<String>> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_set_mut(&mut self) -> Option<&mut HashSet<String>> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sorted(&self) -> Option<&SortedSet> {
        match self {
            Value::Sorted(z) => Some(z),
            _ => None,
        }
    }

    pub fn as_sorted_mut(&mut self) -> Option<&mut SortedSet> {
        match self {
            Value::Sorted(z) => Some(z),
            _ => None,
        }
    }

    /// Collections vanish once their last member is removed; strings never do.
    pub fn is_empty_collection(&self) -> bool {
        match self {
            Value::Str(_) => false,
            Value::Hash(h) => h.is_empty(),
            Value::Set(s) => s.is_empty(),
            Value::Sorted(z) => z.is_empty(),
        }
    }
}

// == Store Entry ==
/// A single key's value with optional absolute expiry.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// The stored value
    pub value: Value,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<i64>,
}

impl StoreEntry {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    // == Expire ==
    /// Sets the entry to expire `ttl_seconds` from now.
    pub fn expire_in(&mut self, ttl_seconds: u64) {
        self.expires_at = Some(unix_now_ms() + (ttl_seconds as i64) * 1000);
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its expiration time.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => unix_now_ms() >= expires,
            None => false,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = StoreEntry::new(Value::Str("content".to_string()));

        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_with_ttl() {
        let mut entry = StoreEntry::new(Value::Str("content".to_string()));
        entry.expire_in(300);

        let remaining = entry.expires_at.unwrap() - unix_now_ms();
        assert!(!entry.is_expired());
        assert!(remaining <= 300_000);
        assert!(remaining >= 299_000);
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = StoreEntry {
            value: Value::Str("content".to_string()),
            expires_at: Some(unix_now_ms()),
        };

        assert!(entry.is_expired(), "Entry should be expired at boundary");
    }

    #[test]
    fn test_empty_collections() {
        assert!(Value::new_hash().is_empty_collection());
        assert!(Value::new_set().is_empty_collection());
        assert!(Value::new_sorted().is_empty_collection());
        assert!(!Value::Str(String::new()).is_empty_collection());
    }
}
