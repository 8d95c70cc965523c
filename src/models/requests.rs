//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

/// Maximum accepted token length.
pub const MAX_TOKEN_LENGTH: usize = 256;

/// Request body for POST /tokens
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTokenRequest {
    /// Session token
    pub token: String,
    /// User logged in under the token
    pub user: String,
    /// Item viewed with this activity, if any
    #[serde(default)]
    pub item: Option<String>,
}

impl UpdateTokenRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.token.is_empty() {
            return Some("Token cannot be empty".to_string());
        }
        if self.token.len() > MAX_TOKEN_LENGTH {
            return Some(format!(
                "Token exceeds maximum length of {MAX_TOKEN_LENGTH} characters"
            ));
        }
        if self.item.as_deref() == Some("") {
            return Some("Item cannot be empty".to_string());
        }
        None
    }
}

/// Request body for PUT /carts/:token
#[derive(Debug, Clone, Deserialize)]
pub struct AddToCartRequest {
    pub item: String,
    /// New quantity; zero or less removes the item
    pub count: i64,
}

impl AddToCartRequest {
    pub fn validate(&self) -> Option<String> {
        if self.item.is_empty() {
            return Some("Item cannot be empty".to_string());
        }
        None
    }
}

/// Request body for PUT /rows/:row_id/schedule
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRowRequest {
    /// Refresh interval in seconds; zero or less cancels the row
    pub interval: i64,
}

/// Query string for GET /page
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    /// Full request URL, including its query string
    pub request: String,
}
