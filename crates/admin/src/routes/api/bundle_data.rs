//! Cached bundle reads for the storefront.
//!
//! Both handlers are cache-aside: a hit is returned with `fromCache: true`,
//! a miss is loaded from Postgres, written back, and returned fresh.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use neat_bundle_core::{BundleId, ShopDomain};

use crate::cache::CacheKeys;
use crate::db::{BundleRepository, SettingsRepository, StepRepository};
use crate::error::AppError;
use crate::models::{FieldError, JsonEnvelope};
use crate::state::AppState;

const BUNDLE_MESSAGE: &str = "Bundle retrieved successfully.";
const STEP_MESSAGE: &str = "Step retrieved successfully.";
const SETTINGS_MESSAGE: &str = "Bundle settings retrieved successfully.";

/// Raw query string. Everything is optional here so missing and malformed
/// values can be reported as field errors instead of a bare 400.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleDataParams {
    pub shop: Option<String>,
    pub bundle_id: Option<String>,
    pub step_num: Option<String>,
}

/// Validated public lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleDataQuery {
    pub shop: ShopDomain,
    pub bundle_id: BundleId,
    pub step_number: Option<i32>,
}

impl BundleDataParams {
    /// Validate the raw parameters.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` listing every bad parameter.
    pub fn parse(self) -> Result<BundleDataQuery, AppError> {
        let mut errors = Vec::new();

        let shop = match self.shop.as_deref().map(ShopDomain::parse) {
            Some(Ok(shop)) => Some(shop),
            Some(Err(e)) => {
                errors.push(FieldError::new("shop", "Shop", e.to_string()));
                None
            }
            None => {
                errors.push(FieldError::new("shop", "Shop", "Shop is required."));
                None
            }
        };

        let bundle_id = match self.bundle_id.as_deref() {
            Some(raw) => positive_int(raw, "bundleId", "Bundle id", &mut errors).map(BundleId::new),
            None => {
                errors.push(FieldError::new(
                    "bundleId",
                    "Bundle id",
                    "Bundle id is required.",
                ));
                None
            }
        };

        let step_number = self
            .step_num
            .as_deref()
            .and_then(|raw| positive_int(raw, "stepNum", "Step number", &mut errors));

        match (shop, bundle_id) {
            (Some(shop), Some(bundle_id)) if errors.is_empty() => Ok(BundleDataQuery {
                shop,
                bundle_id,
                step_number,
            }),
            _ => Err(AppError::Validation(errors)),
        }
    }
}

fn positive_int(
    raw: &str,
    field_id: &str,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<i32> {
    match raw.trim().parse::<i32>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            errors.push(FieldError::new(
                field_id,
                field,
                format!("{field} must be a positive integer."),
            ));
            None
        }
    }
}

/// `GET /api/bundleData`: a bundle with its step summaries, or one step with
/// its payload when `stepNum` is given.
///
/// # Errors
///
/// Returns a validation error for bad query parameters, or `NotFound` if the
/// shop has no such bundle or step.
pub async fn bundle_data(
    State(state): State<AppState>,
    Query(params): Query<BundleDataParams>,
) -> Result<Json<JsonEnvelope<serde_json::Value>>, AppError> {
    let query = params.parse()?;
    let keys = CacheKeys::for_shop(&query.shop);

    let (key, message) = match query.step_number {
        Some(n) => (keys.step(query.bundle_id, n), STEP_MESSAGE),
        None => (keys.bundle_data(query.bundle_id), BUNDLE_MESSAGE),
    };

    if let Some(cached) = state.cache().read(&key).await {
        return Ok(Json(JsonEnvelope::cached(message, cached)));
    }

    let bundles = BundleRepository::new(state.pool());
    let data = match query.step_number {
        Some(step_number) => {
            bundles
                .get(&query.shop, query.bundle_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("bundle {}", query.bundle_id)))?;

            let step = StepRepository::new(state.pool())
                .get(query.bundle_id, step_number)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("step {step_number}")))?;
            to_value(&step)?
        }
        None => {
            let bundle = bundles
                .get_with_steps(&query.shop, query.bundle_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("bundle {}", query.bundle_id)))?;
            to_value(&bundle)?
        }
    };

    state.cache().write(&key, &data).await;

    Ok(Json(JsonEnvelope::success(message, data)))
}

/// `GET /api/bundleData/settings`: display options, colors and labels.
///
/// # Errors
///
/// Returns a validation error for bad query parameters, or `NotFound` if the
/// shop has no such bundle.
pub async fn bundle_settings(
    State(state): State<AppState>,
    Query(params): Query<BundleDataParams>,
) -> Result<Json<JsonEnvelope<serde_json::Value>>, AppError> {
    let query = params.parse()?;
    let key = CacheKeys::for_shop(&query.shop).settings(query.bundle_id);

    if let Some(cached) = state.cache().read(&key).await {
        return Ok(Json(JsonEnvelope::cached(SETTINGS_MESSAGE, cached)));
    }

    BundleRepository::new(state.pool())
        .get(&query.shop, query.bundle_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("bundle {}", query.bundle_id)))?;

    let settings = SettingsRepository::new(state.pool())
        .get(query.bundle_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("settings of bundle {}", query.bundle_id)))?;
    let data = to_value(&settings)?;

    state.cache().write(&key, &data).await;

    Ok(Json(JsonEnvelope::success(SETTINGS_MESSAGE, data)))
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(shop: Option<&str>, bundle_id: Option<&str>, step_num: Option<&str>) -> BundleDataParams {
        BundleDataParams {
            shop: shop.map(String::from),
            bundle_id: bundle_id.map(String::from),
            step_num: step_num.map(String::from),
        }
    }

    fn field_ids(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(errors) => errors.into_iter().map(|e| e.field_id).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_valid_query() {
        let query = params(Some("Demo-Store.myshopify.com"), Some("12"), Some("3"))
            .parse()
            .unwrap();

        assert_eq!(query.shop.as_str(), "demo-store.myshopify.com");
        assert_eq!(query.bundle_id, BundleId::new(12));
        assert_eq!(query.step_number, Some(3));
    }

    #[test]
    fn test_parse_without_step() {
        let query = params(Some("demo.myshopify.com"), Some("1"), None)
            .parse()
            .unwrap();
        assert_eq!(query.step_number, None);
    }

    #[test]
    fn test_parse_reports_every_bad_field() {
        let err = params(None, Some("abc"), Some("0")).parse().unwrap_err();
        assert_eq!(field_ids(err), vec!["shop", "bundleId", "stepNum"]);
    }

    #[test]
    fn test_parse_rejects_foreign_domain() {
        let err = params(Some("example.com"), Some("1"), None)
            .parse()
            .unwrap_err();
        assert_eq!(field_ids(err), vec!["shop"]);
    }

    #[test]
    fn test_parse_requires_bundle_id() {
        let err = params(Some("demo.myshopify.com"), None, None)
            .parse()
            .unwrap_err();
        assert_eq!(field_ids(err), vec!["bundleId"]);
    }
}
