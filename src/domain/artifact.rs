//! The artifact delivered per (component, resolved-language) pair.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Metadata attached to every generated artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Unique per generation; two generations of the same pair differ here.
    pub artifact_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    pub required_keys: Vec<String>,
}

/// A rendered, localized component artifact.
///
/// Immutable after generation: the lookup path clones it into cache
/// tiers and responses instead of mutating a shared instance.
/// Crosses the remote tier wire as JSON, hence the serde derives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub component_name: String,
    pub component_kind: String,
    /// The language actually used for rendering. When the requested
    /// language has no localization table this records the fallback,
    /// never the request.
    pub language: String,
    /// Rendered template text with localized values interpolated.
    pub body: String,
    pub localized_values: BTreeMap<String, String>,
    pub metadata: ArtifactMetadata,
    /// Stamped by the lookup service at response time, not by the
    /// generator.
    #[serde(default, skip_serializing_if = "is_false")]
    pub served_from_cache: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}
