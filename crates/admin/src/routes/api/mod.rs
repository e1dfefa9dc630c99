//! Public storefront API.
//!
//! Read-only JSON endpoints consumed by the storefront widget. No merchant
//! header is required; every lookup is scoped by the `shop` query parameter.

pub mod bundle_data;

use axum::{Router, http::Method, routing::get};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Build the public API router with permissive CORS.
pub fn router() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS]);

    Router::new()
        .route("/api/bundleData", get(bundle_data::bundle_data))
        .route("/api/bundleData/settings", get(bundle_data::bundle_settings))
        .layer(cors)
}
