//! End-to-end admin and public API flows against Postgres.
//!
//! Run with `cargo test -p neat-bundle-integration-tests -- --ignored`
//! and `DATABASE_URL` pointing at a scratch server.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use neat_bundle_integration_tests::{
    admin_get, admin_json, app, memory_cache, public_get, send,
};

async fn create_bundle(app: &axum::Router) -> i64 {
    let (status, body) = send(app, admin_json("POST", "/app/bundles", &json!({"title": "Gift box"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_i64().unwrap()
}

// =============================================================================
// Bundles
// =============================================================================

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_created_bundle_has_defaults(pool: PgPool) {
    let app = app(pool, memory_cache());
    let id = create_bundle(&app).await;

    let (status, body) = send(&app, admin_get(&format!("/app/bundles/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Gift box");
    assert_eq!(body["data"]["steps"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"]["steps"][2]["title"], "Step 3");

    let (_, body) = send(&app, admin_get(&format!("/app/bundles/{id}/settings"))).await;
    assert_eq!(body["data"]["allowBackNavigation"], true);
    assert_eq!(body["data"]["bundleColors"]["titleAndDESC"], "#000000");
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_other_shop_cannot_see_bundle(pool: PgPool) {
    let app = app(pool, memory_cache());
    let id = create_bundle(&app).await;

    let request = axum::http::Request::get(format!("/app/bundles/{id}"))
        .header("x-shop-domain", "other.myshopify.com")
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        public_get(&format!("/api/bundleData?shop=other.myshopify.com&bundleId={id}")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_percentage_discount_over_100_is_field_error(pool: PgPool) {
    let app = app(pool, memory_cache());
    let id = create_bundle(&app).await;
    let uri = format!("/app/bundles/{id}");

    let (status, body) = send(&app, admin_json("PATCH", &uri, &json!({"discountValue": "150"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["fieldId"], "discountValue");

    let (status, body) = send(
        &app,
        admin_json("PATCH", &uri, &json!({"discountType": "FIXED", "discountValue": "150"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["discountType"], "FIXED");
}

// =============================================================================
// Steps
// =============================================================================

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_step_update_validation_errors(pool: PgPool) {
    let app = app(pool, memory_cache());
    let id = create_bundle(&app).await;

    let draft = json!({
        "title": "Pick",
        "description": "Pick things",
        "stepType": "PRODUCT",
        "productInput": {
            "minProductsOnStep": 3,
            "maxProductsOnStep": 2,
            "allowProductDuplicates": false,
            "showProductPrice": true,
            "products": []
        }
    });
    let (status, body) = send(&app, admin_json("PUT", &format!("/app/bundles/{id}/steps/1"), &draft)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let ids: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["fieldId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["maxProducts", "products"]);
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_step_update_switches_type_and_keeps_products(pool: PgPool) {
    let app = app(pool, memory_cache());
    let id = create_bundle(&app).await;
    let uri = format!("/app/bundles/{id}/steps/2");

    let mut draft = json!({
        "title": "Message",
        "description": "Write a note",
        "stepType": "CONTENT",
        "productInput": {
            "minProductsOnStep": 1,
            "maxProductsOnStep": 3,
            "allowProductDuplicates": false,
            "showProductPrice": true,
            "products": [{"shopifyProductId": "gid://shopify/Product/1", "handle": "tea", "title": "Tea"}]
        }
    });
    let (status, body) = send(&app, admin_json("PUT", &uri, &draft)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stepType"], "CONTENT");
    assert_eq!(body["data"]["stepNumber"], 2);
    assert_eq!(body["data"]["title"], "Message");

    let (_, body) = send(&app, admin_get(&format!("/app/bundles/{id}"))).await;
    assert_eq!(body["data"]["steps"][1]["stepType"], "CONTENT");

    draft["stepType"] = json!("PRODUCT");
    let (status, body) = send(&app, admin_json("PUT", &uri, &draft)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stepType"], "PRODUCT");
    assert_eq!(
        body["data"]["productInput"]["products"][0]["handle"],
        "tea"
    );
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_update_of_missing_step_is_not_found(pool: PgPool) {
    let app = app(pool, memory_cache());
    let id = create_bundle(&app).await;

    let draft = json!({"title": "Late", "description": "Too far", "stepType": "CONTENT"});
    let (status, body) = send(&app, admin_json("PUT", &format!("/app/bundles/{id}/steps/9"), &draft)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["ok"], false);
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_past_limit_is_rejected(pool: PgPool) {
    let app = app(pool, memory_cache());
    let id = create_bundle(&app).await;
    let uri = format!("/app/bundles/{id}/steps/1/duplicate");

    for _ in 0..2 {
        let (status, _) = send(&app, admin_json("POST", &uri, &json!({}))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, body) = send(&app, admin_json("POST", &uri, &json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["fieldId"], "stepsLength");
}

// =============================================================================
// Cache-Aside
// =============================================================================

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_public_reads_are_cached_until_invalidated(pool: PgPool) {
    let app = app(pool, memory_cache());
    let id = create_bundle(&app).await;
    let public = format!("/api/bundleData?shop=demo-store.myshopify.com&bundleId={id}&stepNum=1");

    let (_, first) = send(&app, public_get(&public)).await;
    let (_, second) = send(&app, public_get(&public)).await;
    assert_eq!(first["fromCache"], false);
    assert_eq!(second["fromCache"], true);
    assert_eq!(first["data"], second["data"]);

    let (status, _) = send(
        &app,
        admin_json(
            "PUT",
            &format!("/app/bundles/{id}/steps/1/products"),
            &json!({"products": [{"shopifyProductId": "gid://shopify/Product/7", "handle": "mug", "title": "Mug"}]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, third) = send(&app, public_get(&public)).await;
    assert_eq!(third["fromCache"], false);
    assert_eq!(third["data"]["productInput"]["products"][0]["handle"], "mug");
}

#[sqlx::test(migrations = "../admin/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_settings_update_invalidates_public_settings(pool: PgPool) {
    let app = app(pool, memory_cache());
    let id = create_bundle(&app).await;
    let public = format!("/api/bundleData/settings?shop=demo-store.myshopify.com&bundleId={id}");

    let (_, cached) = send(&app, public_get(&public)).await;
    let mut settings = cached["data"].clone();
    settings["skipTheCart"] = json!(true);
    settings["bundleLabels"]["nextStepBtn"] = json!("Continue");

    let (status, _) = send(&app, admin_json("PUT", &format!("/app/bundles/{id}/settings"), &settings)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, fresh) = send(&app, public_get(&public)).await;
    assert_eq!(fresh["fromCache"], false);
    assert_eq!(fresh["data"]["skipTheCart"], true);
    assert_eq!(fresh["data"]["bundleLabels"]["nextStepBtn"], "Continue");
}
