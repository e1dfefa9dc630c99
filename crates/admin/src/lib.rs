//! Neat Bundle Builder admin library.
//!
//! The merchant-facing bundle configuration API and the cached public
//! bundle-data API, exposed as a library so the binary, the CLI and the
//! integration tests share one implementation.
//!
//! # Layers
//!
//! - [`routes`] - axum handlers (admin JSON API, public API, health)
//! - [`services`] - step and settings validation
//! - [`db`] - repositories and the step sequencer
//! - [`cache`] - cache-aside service over Redis or an in-process store

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
