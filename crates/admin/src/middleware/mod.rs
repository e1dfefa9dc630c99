//! HTTP middleware and extractors for the builder API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//!
//! Admin routes additionally extract [`CurrentShop`] from the
//! `X-Shop-Domain` header, and read bodies and paths through [`ApiJson`]
//! and [`ApiPath`].

pub mod extract;
pub mod request_id;
pub mod shop;

pub use extract::{ApiJson, ApiPath};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use shop::{CurrentShop, SHOP_DOMAIN_HEADER};
