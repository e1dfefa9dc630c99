//! Bundle CRUD handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;

use neat_bundle_core::{BundleId, DiscountType};

use crate::cache::CacheKeys;
use crate::db::BundleRepository;
use crate::error::AppError;
use crate::middleware::{ApiJson, ApiPath, CurrentShop};
use crate::models::{Bundle, BundleUpdate, BundleWithSteps, FieldError, JsonEnvelope, NewBundle};
use crate::state::AppState;

/// Build the bundle router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/app/bundles", get(index).post(create))
        .route(
            "/app/bundles/{bundle_id}",
            get(show).patch(update).delete(destroy),
        )
}

/// List the shop's bundles.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn index(
    CurrentShop(shop): CurrentShop,
    State(state): State<AppState>,
) -> Result<Json<JsonEnvelope<Vec<Bundle>>>, AppError> {
    let bundles = BundleRepository::new(state.pool()).list(&shop).await?;
    Ok(Json(JsonEnvelope::success(
        "Bundles retrieved successfully.",
        bundles,
    )))
}

/// Create a bundle with default settings and three default steps.
///
/// # Errors
///
/// Returns a validation error for a blank title, or an error if the
/// database transaction fails.
pub async fn create(
    CurrentShop(shop): CurrentShop,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewBundle>,
) -> Result<(StatusCode, Json<JsonEnvelope<BundleWithSteps>>), AppError> {
    if input.title.trim().is_empty() {
        return Err(AppError::Validation(vec![blank_title_error()]));
    }

    let bundle = BundleRepository::new(state.pool())
        .create(&shop, &input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(JsonEnvelope::success("Bundle created successfully.", bundle)),
    ))
}

/// Show a bundle with its step summaries.
///
/// # Errors
///
/// Returns `NotFound` if the shop has no such bundle.
pub async fn show(
    CurrentShop(shop): CurrentShop,
    State(state): State<AppState>,
    ApiPath(bundle_id): ApiPath<BundleId>,
) -> Result<Json<JsonEnvelope<BundleWithSteps>>, AppError> {
    let bundle = BundleRepository::new(state.pool())
        .get_with_steps(&shop, bundle_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("bundle {bundle_id}")))?;

    Ok(Json(JsonEnvelope::success(
        "Bundle retrieved successfully.",
        bundle,
    )))
}

/// Update a bundle's title, publish flag or pricing.
///
/// # Errors
///
/// Returns a validation error for invalid fields, `NotFound` if the shop has
/// no such bundle, or an error if the database query fails.
pub async fn update(
    CurrentShop(shop): CurrentShop,
    State(state): State<AppState>,
    ApiPath(bundle_id): ApiPath<BundleId>,
    ApiJson(input): ApiJson<BundleUpdate>,
) -> Result<Json<JsonEnvelope<Bundle>>, AppError> {
    let repo = BundleRepository::new(state.pool());
    let current = repo
        .get(&shop, bundle_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("bundle {bundle_id}")))?;

    let errors = validate_update(&input, &current);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let bundle = repo.update(&shop, bundle_id, &input).await?;

    state
        .cache()
        .invalidate(&CacheKeys::for_shop(&shop).bundle_data(bundle_id))
        .await;

    Ok(Json(JsonEnvelope::success(
        "Bundle updated successfully.",
        bundle,
    )))
}

/// Delete a bundle and every cache entry it occupies.
///
/// # Errors
///
/// Returns `NotFound` if the shop has no such bundle.
pub async fn destroy(
    CurrentShop(shop): CurrentShop,
    State(state): State<AppState>,
    ApiPath(bundle_id): ApiPath<BundleId>,
) -> Result<Json<JsonEnvelope<()>>, AppError> {
    BundleRepository::new(state.pool())
        .delete(&shop, bundle_id)
        .await?;

    state
        .cache()
        .invalidate_many(&CacheKeys::for_shop(&shop).bundle_scope(bundle_id))
        .await;

    Ok(Json(JsonEnvelope::success("Bundle deleted successfully.", ())))
}

fn blank_title_error() -> FieldError {
    FieldError::new("bundleTitle", "Bundle title", "Bundle title is required.")
}

/// Largest amount a `NUMERIC(10, 2)` column holds.
const MAX_DISCOUNT_VALUE: Decimal = Decimal::from_parts(0x540B_E3FF, 2, 0, false, 2);

/// Validate an update against the bundle it applies to, so a discount type
/// change is checked against the stored value and vice versa.
fn validate_update(input: &BundleUpdate, current: &Bundle) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if input.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        errors.push(blank_title_error());
    }

    if input.discount_type.is_some() || input.discount_value.is_some() {
        let discount_type = input.discount_type.unwrap_or(current.discount_type);
        let value = input.discount_value.unwrap_or(current.discount_value);

        let message = if value < Decimal::ZERO {
            Some("Discount value cannot be negative.".to_string())
        } else if discount_type == DiscountType::Percentage && value > Decimal::ONE_HUNDRED {
            Some("A percentage discount cannot exceed 100.".to_string())
        } else if value > MAX_DISCOUNT_VALUE {
            Some(format!("Discount value cannot exceed {MAX_DISCOUNT_VALUE}."))
        } else {
            None
        };

        if let Some(message) = message {
            errors.push(FieldError::new("discountValue", "Discount value", message));
        }
    }

    errors
}
