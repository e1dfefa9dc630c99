//! Step handlers.
//!
//! Structural changes (add, delete, duplicate) go through the
//! [`StepSequencer`]; content edits go through the [`StepRepository`] and
//! never touch the step number.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use serde::Deserialize;
use tracing::instrument;

use neat_bundle_core::BundleId;

use crate::cache::CacheKeys;
use crate::db::{RepositoryError, StepRepository, StepSequencer};
use crate::error::AppError;
use crate::middleware::{ApiJson, ApiPath, CurrentShop};
use crate::models::{JsonEnvelope, SelectedProduct, Step, StepDraft, StepSummary};
use crate::services::{validate_new_step, validate_step};
use crate::state::AppState;

use super::owned_bundle;

/// Build the step router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/app/bundles/{bundle_id}/steps", post(create))
        .route(
            "/app/bundles/{bundle_id}/steps/{step_number}",
            get(show).put(update).delete(destroy),
        )
        .route(
            "/app/bundles/{bundle_id}/steps/{step_number}/duplicate",
            post(duplicate),
        )
        .route(
            "/app/bundles/{bundle_id}/steps/{step_number}/products",
            put(replace_products),
        )
}

/// Body of `POST /app/bundles/{bundle_id}/steps`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStepRequest {
    /// Insert after this step number (`0` = front). Appends when absent.
    #[serde(default)]
    pub after_step_number: Option<i32>,
    #[serde(flatten)]
    pub draft: StepDraft,
}

/// Body of `PUT /app/bundles/{bundle_id}/steps/{step_number}/products`.
#[derive(Debug, Deserialize)]
pub struct ReplaceProductsRequest {
    pub products: Vec<SelectedProduct>,
}

/// Add a step, either at the end or after a given step.
///
/// # Errors
///
/// Returns a validation error for an invalid draft, `LimitExceeded` if the
/// bundle is full, or `NotFound` for an unknown bundle or anchor step.
#[instrument(skip_all, fields(bundle_id = %bundle_id))]
pub async fn create(
    CurrentShop(shop): CurrentShop,
    State(state): State<AppState>,
    ApiPath(bundle_id): ApiPath<BundleId>,
    ApiJson(body): ApiJson<NewStepRequest>,
) -> Result<(StatusCode, Json<JsonEnvelope<StepSummary>>), AppError> {
    let errors = validate_new_step(&body.draft);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    owned_bundle(&state, &shop, bundle_id).await?;

    let sequencer = StepSequencer::new(state.pool());
    let step = match body.after_step_number {
        Some(after) => sequencer.insert_step_after(bundle_id, after, &body.draft).await?,
        None => sequencer.append_step(bundle_id, &body.draft).await?,
    };

    state
        .cache()
        .invalidate_many(&CacheKeys::for_shop(&shop).after_step_reorder(bundle_id))
        .await;

    Ok((
        StatusCode::CREATED,
        Json(JsonEnvelope::success("Step created successfully.", step)),
    ))
}

/// Show a step with its payload.
///
/// # Errors
///
/// Returns `NotFound` if the bundle or step doesn't exist.
pub async fn show(
    CurrentShop(shop): CurrentShop,
    State(state): State<AppState>,
    ApiPath((bundle_id, step_number)): ApiPath<(BundleId, i32)>,
) -> Result<Json<JsonEnvelope<Step>>, AppError> {
    owned_bundle(&state, &shop, bundle_id).await?;

    let step = StepRepository::new(state.pool())
        .get(bundle_id, step_number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("step {step_number}")))?;

    Ok(Json(JsonEnvelope::success(
        "Step retrieved successfully.",
        step,
    )))
}

/// Validate and save a step's content, including its type.
///
/// Both payloads are saved whatever the type, so switching a step from
/// product to content and back keeps its product configuration.
///
/// # Errors
///
/// Returns a validation error with one entry per invalid field, or
/// `NotFound` if the bundle or step doesn't exist.
#[instrument(skip_all, fields(bundle_id = %bundle_id, step_number = step_number))]
pub async fn update(
    CurrentShop(shop): CurrentShop,
    State(state): State<AppState>,
    ApiPath((bundle_id, step_number)): ApiPath<(BundleId, i32)>,
    ApiJson(draft): ApiJson<StepDraft>,
) -> Result<Json<JsonEnvelope<Step>>, AppError> {
    owned_bundle(&state, &shop, bundle_id).await?;

    let errors = validate_step(&draft);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let step = StepRepository::new(state.pool())
        .update_content(bundle_id, step_number, &draft)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound(format!("step {step_number}")),
            other => other.into(),
        })?;

    state
        .cache()
        .invalidate_many(&CacheKeys::for_shop(&shop).after_step_update(bundle_id, step_number))
        .await;

    Ok(Json(JsonEnvelope::success("Step updated successfully.", step)))
}

/// Delete a step; later steps move down by one.
///
/// # Errors
///
/// Returns `NotFound` if the bundle or step doesn't exist.
#[instrument(skip_all, fields(bundle_id = %bundle_id, step_number = step_number))]
pub async fn destroy(
    CurrentShop(shop): CurrentShop,
    State(state): State<AppState>,
    ApiPath((bundle_id, step_number)): ApiPath<(BundleId, i32)>,
) -> Result<Json<JsonEnvelope<()>>, AppError> {
    owned_bundle(&state, &shop, bundle_id).await?;

    StepSequencer::new(state.pool())
        .delete_step(bundle_id, step_number)
        .await?;

    state
        .cache()
        .invalidate_many(&CacheKeys::for_shop(&shop).after_step_reorder(bundle_id))
        .await;

    Ok(Json(JsonEnvelope::success("Step deleted successfully.", ())))
}

/// Duplicate a step into the slot right after it.
///
/// # Errors
///
/// Returns `LimitExceeded` if the bundle is full, or `NotFound` if the
/// bundle or step doesn't exist.
#[instrument(skip_all, fields(bundle_id = %bundle_id, step_number = step_number))]
pub async fn duplicate(
    CurrentShop(shop): CurrentShop,
    State(state): State<AppState>,
    ApiPath((bundle_id, step_number)): ApiPath<(BundleId, i32)>,
) -> Result<(StatusCode, Json<JsonEnvelope<StepSummary>>), AppError> {
    owned_bundle(&state, &shop, bundle_id).await?;

    let copy = StepSequencer::new(state.pool())
        .duplicate_step(bundle_id, step_number)
        .await?;

    state
        .cache()
        .invalidate_many(&CacheKeys::for_shop(&shop).after_step_reorder(bundle_id))
        .await;

    Ok((
        StatusCode::CREATED,
        Json(JsonEnvelope::success("Step duplicated successfully.", copy)),
    ))
}

/// Replace the products selected on a step.
///
/// # Errors
///
/// Returns `NotFound` if the bundle or step doesn't exist.
pub async fn replace_products(
    CurrentShop(shop): CurrentShop,
    State(state): State<AppState>,
    ApiPath((bundle_id, step_number)): ApiPath<(BundleId, i32)>,
    ApiJson(body): ApiJson<ReplaceProductsRequest>,
) -> Result<Json<JsonEnvelope<Step>>, AppError> {
    owned_bundle(&state, &shop, bundle_id).await?;

    let step = StepRepository::new(state.pool())
        .replace_selected_products(bundle_id, step_number, &body.products)
        .await?;

    state
        .cache()
        .invalidate_many(&CacheKeys::for_shop(&shop).after_step_update(bundle_id, step_number))
        .await;

    Ok(Json(JsonEnvelope::success(
        "Selected products updated successfully.",
        step,
    )))
}
