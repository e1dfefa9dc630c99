//! Neat Bundle Core - Shared types library.
//!
//! This crate provides common types used across all Neat Bundle Builder components:
//! - `admin` - Merchant-facing bundle configuration API and public bundle-data API
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, shop domains, and bundle/step enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
