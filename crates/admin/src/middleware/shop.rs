//! Merchant identity extractor.
//!
//! The embedded admin app forwards the authenticated shop in the
//! `X-Shop-Domain` header. Every admin query is scoped by that shop.

use axum::{extract::FromRequestParts, http::request::Parts};

use neat_bundle_core::ShopDomain;

use crate::error::AppError;

/// The HTTP header carrying the merchant's shop domain.
pub const SHOP_DOMAIN_HEADER: &str = "x-shop-domain";

/// Extractor that requires a valid `*.myshopify.com` shop domain.
///
/// # Example
///
/// ```rust,ignore
/// async fn list(CurrentShop(shop): CurrentShop) -> impl IntoResponse {
///     format!("Bundles of {shop}")
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentShop(pub ShopDomain);

impl<S> FromRequestParts<S> for CurrentShop
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SHOP_DOMAIN_HEADER)
            .ok_or_else(|| AppError::Unauthorized("missing X-Shop-Domain header".to_string()))?
            .to_str()
            .map_err(|_| AppError::Unauthorized("X-Shop-Domain is not valid text".to_string()))?;

        let shop = ShopDomain::parse(raw)
            .map_err(|e| AppError::Unauthorized(format!("invalid shop domain: {e}")))?;

        tracing::Span::current().record("shop", shop.as_str());
        Ok(Self(shop))
    }
}
