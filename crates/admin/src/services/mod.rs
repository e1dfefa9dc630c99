//! Business logic services for the bundle builder.
//!
//! # Services
//!
//! - `step_validation` - Field-level validation of step drafts
//! - `settings_validation` - Color and label validation of bundle settings

pub mod settings_validation;
pub mod step_validation;

pub use settings_validation::validate_settings;
pub use step_validation::{validate_new_step, validate_step};
