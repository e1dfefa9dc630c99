//! Domain models for the bundle builder.
//!
//! All models serialize with camelCase keys, matching what the admin UI and
//! the storefront widget expect.

pub mod bundle;
pub mod envelope;
pub mod settings;
pub mod step;

pub use bundle::{Bundle, BundleUpdate, BundleWithSteps, NewBundle};
pub use envelope::{EnvelopeStatus, FieldError, JsonEnvelope};
pub use settings::{BundleColors, BundleLabels, BundleSettings, DisplayOptions, SettingsUpdate};
pub use step::{ContentInput, ProductInput, SelectedProduct, Step, StepDraft, StepSummary};
