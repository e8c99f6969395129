//! Cache key normalization.
//!
//! Keys are derived from the *resolved* language, never the requested
//! one. All unsupported-language spellings of the same component
//! collapse onto the fallback language's slot, so one logical artifact
//! never occupies more than one entry per tier.

use crate::domain::registry::LocalizationRegistry;

/// Build the normalized cache key for a lookup.
pub fn artifact_key(
    localization: &LocalizationRegistry,
    component_type: &str,
    requested_language: &str,
) -> String {
    let resolved = localization.resolve(requested_language);
    format!("component:{component_type}:{resolved}")
}
