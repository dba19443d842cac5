//! HTTP application wiring (Axum router).
//!
//! - `routes/`: handlers
//! - `errors.rs`: envelope-shaped error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod errors;
pub mod routes;

/// Process-wide facts the handlers report.
#[derive(Debug, Clone)]
pub struct AppInfo {
    pub service_name: String,
    pub version: &'static str,
}

impl AppInfo {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(info: AppInfo) -> Router {
    Router::new()
        .route("/", get(routes::system::root))
        .route("/health", get(routes::system::health))
        .fallback(routes::system::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::trace_requests))
                .layer(Extension(Arc::new(info))),
        )
}
