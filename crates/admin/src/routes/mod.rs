//! HTTP route handlers for the bundle builder.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database ping)
//!
//! # Admin (X-Shop-Domain header required)
//! GET    /app/bundles                                         - List bundles
//! POST   /app/bundles                                         - Create bundle with defaults
//! GET    /app/bundles/{bundle_id}                             - Bundle with step summaries
//! PATCH  /app/bundles/{bundle_id}                             - Update bundle fields
//! DELETE /app/bundles/{bundle_id}                             - Delete bundle
//! POST   /app/bundles/{bundle_id}/steps                       - Append or insert a step
//! GET    /app/bundles/{bundle_id}/steps/{step_number}         - Step with payload
//! PUT    /app/bundles/{bundle_id}/steps/{step_number}         - Validate and update step
//! DELETE /app/bundles/{bundle_id}/steps/{step_number}         - Delete step
//! POST   /app/bundles/{bundle_id}/steps/{step_number}/duplicate
//! PUT    /app/bundles/{bundle_id}/steps/{step_number}/products
//! GET    /app/bundles/{bundle_id}/settings                    - Bundle settings
//! PUT    /app/bundles/{bundle_id}/settings                    - Validate and update settings
//!
//! # Public (cached, CORS *)
//! GET  /api/bundleData?shop=&bundleId=[&stepNum=]
//! GET  /api/bundleData/settings?shop=&bundleId=
//! ```

pub mod api;
pub mod bundles;
pub mod health;
pub mod settings;
pub mod steps;

use axum::{Router, middleware::from_fn, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use neat_bundle_core::{BundleId, ShopDomain};

use crate::db::BundleRepository;
use crate::error::AppError;
use crate::middleware::request_id_middleware;
use crate::models::Bundle;
use crate::state::AppState;

/// Build all builder routes (without state).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(bundles::router())
        .merge(steps::router())
        .merge(settings::router())
        .merge(api::router())
}

/// Build the complete application: routes, request IDs and HTTP tracing.
///
/// Sentry layers are added by the binary so tests can use this router as is.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        shop = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Load a bundle owned by `shop`, or fail with `NotFound`.
pub(crate) async fn owned_bundle(
    state: &AppState,
    shop: &ShopDomain,
    bundle_id: BundleId,
) -> Result<Bundle, AppError> {
    BundleRepository::new(state.pool())
        .get(shop, bundle_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("bundle {bundle_id}")))
}
