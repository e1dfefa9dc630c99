//! Integration tests for Neat Bundle Builder.
//!
//! # Running Tests
//!
//! ```bash
//! # Tests that need no database
//! cargo test -p neat-bundle-integration-tests
//!
//! # Postgres-backed scenarios (DATABASE_URL must point at a scratch server)
//! cargo test -p neat-bundle-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `step_validation` - Field errors of step drafts
//! - `cache_aside` - Cache service semantics and key invalidation sets
//! - `public_api` - Router behavior that never reaches the database
//! - `step_sequencer` - Step numbering under add, delete and duplicate (database)
//! - `admin_flow` - Admin and public API end to end (database)
//!
//! This library holds the shared fixtures.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use neat_bundle_admin::cache::{CacheService, MemoryStore};
use neat_bundle_admin::models::{SelectedProduct, StepDraft};
use neat_bundle_admin::routes;
use neat_bundle_admin::state::AppState;
use neat_bundle_core::ShopDomain;

/// Shop used by most tests.
pub const DEMO_SHOP: &str = "demo-store.myshopify.com";

/// Parsed [`DEMO_SHOP`].
#[must_use]
pub fn demo_shop() -> ShopDomain {
    ShopDomain::parse(DEMO_SHOP).unwrap()
}

/// Cache service over a fresh in-process store.
#[must_use]
pub fn memory_cache() -> CacheService {
    CacheService::new(Arc::new(MemoryStore::new(None)))
}

/// Pool that never connects. Requests that reach it fail with a 500.
#[must_use]
pub fn unreachable_pool() -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy("postgres://localhost:1/unreachable")
        .unwrap()
}

/// The full application router over `pool` and `cache`.
#[must_use]
pub fn app(pool: PgPool, cache: CacheService) -> Router {
    routes::app(AppState::new(pool, cache))
}

/// Send one request and decode the JSON envelope.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// GET with the merchant header set.
#[must_use]
pub fn admin_get(uri: &str) -> Request<Body> {
    Request::get(uri)
        .header("x-shop-domain", DEMO_SHOP)
        .body(Body::empty())
        .unwrap()
}

/// Request with a JSON body and the merchant header set.
#[must_use]
pub fn admin_json(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-shop-domain", DEMO_SHOP)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Public GET without any merchant header.
#[must_use]
pub fn public_get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

/// A selectable product with a deterministic id.
#[must_use]
pub fn product(n: u32) -> SelectedProduct {
    SelectedProduct {
        shopify_product_id: format!("gid://shopify/Product/{n}"),
        handle: format!("product-{n}"),
        title: format!("Product {n}"),
    }
}

/// Product step draft with the given bounds and `selected` products.
#[must_use]
pub fn product_draft(title: &str, min: i32, max: i32, selected: u32) -> StepDraft {
    let mut draft = StepDraft::default_product(1);
    draft.title = title.to_owned();
    draft.product_input.min_products_on_step = min;
    draft.product_input.max_products_on_step = max;
    draft.product_input.products = (1..=selected).map(product).collect();
    draft
}
