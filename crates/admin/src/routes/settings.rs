//! Bundle settings handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};

use neat_bundle_core::BundleId;

use crate::cache::CacheKeys;
use crate::db::SettingsRepository;
use crate::error::AppError;
use crate::middleware::{ApiJson, ApiPath, CurrentShop};
use crate::models::{BundleSettings, JsonEnvelope, SettingsUpdate};
use crate::services::validate_settings;
use crate::state::AppState;

use super::owned_bundle;

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/app/bundles/{bundle_id}/settings",
        get(show).put(update),
    )
}

/// Show display options, colors and labels of a bundle.
///
/// # Errors
///
/// Returns `NotFound` if the bundle or its settings don't exist.
pub async fn show(
    CurrentShop(shop): CurrentShop,
    State(state): State<AppState>,
    ApiPath(bundle_id): ApiPath<BundleId>,
) -> Result<Json<JsonEnvelope<BundleSettings>>, AppError> {
    owned_bundle(&state, &shop, bundle_id).await?;

    let settings = SettingsRepository::new(state.pool())
        .get(bundle_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("settings of bundle {bundle_id}")))?;

    Ok(Json(JsonEnvelope::success(
        "Bundle settings retrieved successfully.",
        settings,
    )))
}

/// Validate and save display options, colors and labels.
///
/// # Errors
///
/// Returns a validation error for malformed colors or blank labels, or
/// `NotFound` if the bundle or its settings don't exist.
pub async fn update(
    CurrentShop(shop): CurrentShop,
    State(state): State<AppState>,
    ApiPath(bundle_id): ApiPath<BundleId>,
    ApiJson(input): ApiJson<SettingsUpdate>,
) -> Result<Json<JsonEnvelope<BundleSettings>>, AppError> {
    let errors = validate_settings(&input);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    owned_bundle(&state, &shop, bundle_id).await?;

    let settings = SettingsRepository::new(state.pool())
        .update(bundle_id, &input)
        .await?;

    state
        .cache()
        .invalidate_many(&CacheKeys::for_shop(&shop).after_settings_update(bundle_id))
        .await;

    tracing::info!(bundle_id = %bundle_id, "Bundle settings updated");

    Ok(Json(JsonEnvelope::success(
        "Bundle settings updated successfully.",
        settings,
    )))
}
