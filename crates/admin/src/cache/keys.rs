//! Cache key derivation and invalidation sets.
//!
//! Layout:
//!
//! ```text
//! bundle-builder:{shop}:bundle:{bundle_id}
//! bundle-builder:{shop}:bundle:{bundle_id}:step:{step_number}
//! bundle-builder:{shop}:bundle:{bundle_id}:settings
//! ```
//!
//! `{shop}` is the normalized (trimmed, lowercase) shop domain, so the same
//! resource always maps to the same key.

use neat_bundle_core::{BundleId, MAX_STEPS_PER_BUNDLE, ShopDomain};

const NAMESPACE: &str = "bundle-builder";

/// Key builder for one shop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeys {
    prefix: String,
}

impl CacheKeys {
    #[must_use]
    pub fn for_shop(shop: &ShopDomain) -> Self {
        Self {
            prefix: format!("{NAMESPACE}:{shop}"),
        }
    }

    /// Key of a bundle with its step summaries.
    #[must_use]
    pub fn bundle_data(&self, bundle_id: BundleId) -> String {
        format!("{}:bundle:{bundle_id}", self.prefix)
    }

    /// Key of a single step with its payload.
    #[must_use]
    pub fn step(&self, bundle_id: BundleId, step_number: i32) -> String {
        format!("{}:step:{step_number}", self.bundle_data(bundle_id))
    }

    /// Key of a bundle's settings.
    #[must_use]
    pub fn settings(&self, bundle_id: BundleId) -> String {
        format!("{}:settings", self.bundle_data(bundle_id))
    }

    /// Keys of every step slot a bundle can have.
    #[must_use]
    pub fn all_steps(&self, bundle_id: BundleId) -> Vec<String> {
        (1..=MAX_STEPS_PER_BUNDLE)
            .map(|step_number| self.step(bundle_id, step_number))
            .collect()
    }

    /// Keys to drop after a step's content changed in place.
    #[must_use]
    pub fn after_step_update(&self, bundle_id: BundleId, step_number: i32) -> Vec<String> {
        vec![self.bundle_data(bundle_id), self.step(bundle_id, step_number)]
    }

    /// Keys to drop after steps were added, removed or renumbered.
    #[must_use]
    pub fn after_step_reorder(&self, bundle_id: BundleId) -> Vec<String> {
        let mut keys = vec![self.bundle_data(bundle_id)];
        keys.extend(self.all_steps(bundle_id));
        keys
    }

    /// Keys to drop after settings changed.
    #[must_use]
    pub fn after_settings_update(&self, bundle_id: BundleId) -> Vec<String> {
        vec![self.bundle_data(bundle_id), self.settings(bundle_id)]
    }

    /// Every key a bundle can occupy.
    #[must_use]
    pub fn bundle_scope(&self, bundle_id: BundleId) -> Vec<String> {
        let mut keys = self.after_step_reorder(bundle_id);
        keys.push(self.settings(bundle_id));
        keys
    }
}
