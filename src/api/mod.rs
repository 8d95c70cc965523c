//! API Module
//!
//! HTTP handlers and routing for the admin API.
//!
//! # Endpoints
//! - `POST /tokens` - Record session activity
//! - `GET /tokens/:token` - Look up the user behind a token
//! - `PUT /carts/:token` / `GET /carts/:token` - Shopping cart
//! - `PUT /rows/:row_id/schedule` - Schedule or cancel a cached row
//! - `GET /rows/:row_id` - Published row content
//! - `GET /page?request=<url>` - Fetch a page through the request cache
//! - `GET /stats` - Store statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
