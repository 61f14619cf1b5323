//! HTTP API layer for DailyFlip.
//!
//! - **Endpoints**: JSON routes for accounts, friends, posts and comments
//! - **Extractors**: bearer-token authentication
//! - **Middleware**: session resolution and shared application state
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
