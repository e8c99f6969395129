//! Artifact generation: template interpolation with language fallback.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::artifact::{Artifact, ArtifactMetadata};
use crate::domain::registry::{LocalizationRegistry, TemplateRegistry};

use super::error::GenerateError;

/// Matches `{l10n.key}` markers. Built once and shared across all
/// generations; never rebuilt per key or per request.
static L10N_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{l10n\.([A-Za-z_]+)\}").expect("l10n marker pattern is valid"));

/// Pure generation step: deterministic output for a given registry
/// state, modulo the artifact id and timestamp.
pub struct ArtifactGenerator {
    templates: TemplateRegistry,
    localization: LocalizationRegistry,
}

impl ArtifactGenerator {
    pub fn new(templates: TemplateRegistry, localization: LocalizationRegistry) -> Self {
        Self {
            templates,
            localization,
        }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn localization(&self) -> &LocalizationRegistry {
        &self.localization
    }

    /// Render an artifact for `component_type` in `requested_language`.
    ///
    /// An unsupported language falls back to the default language and
    /// the artifact records the language actually used — the cache
    /// key, the response field, and the stored artifact must agree on
    /// it. A required key missing from the resolved table degrades to
    /// a bracketed placeholder instead of failing the generation.
    pub fn generate(
        &self,
        component_type: &str,
        requested_language: &str,
    ) -> Result<Artifact, GenerateError> {
        let template =
            self.templates
                .get(component_type)
                .ok_or_else(|| GenerateError::UnknownComponent {
                    requested: component_type.to_string(),
                })?;

        let language = self.localization.resolve(requested_language).to_string();
        let table = self.localization.table(&language);

        let localized_values: BTreeMap<String, String> = template
            .required_keys
            .iter()
            .map(|key| {
                let value = table
                    .and_then(|table| table.get(key))
                    .cloned()
                    .unwrap_or_else(|| format!("[{key}]"));
                (key.clone(), value)
            })
            .collect();

        let body = interpolate(&template.template, &localized_values);

        Ok(Artifact {
            component_name: template.component_name.clone(),
            component_kind: template.kind.clone(),
            language,
            body,
            localized_values,
            metadata: ArtifactMetadata {
                artifact_id: Uuid::new_v4().to_string(),
                generated_at: OffsetDateTime::now_utc(),
                required_keys: template.required_keys.clone(),
            },
            served_from_cache: false,
        })
    }
}

/// Replace each matched marker with the quoted localized value.
/// Markers whose key is not in `values` are left verbatim.
fn interpolate(template: &str, values: &BTreeMap<String, String>) -> String {
    L10N_MARKER
        .replace_all(template, |caps: &Captures<'_>| match values.get(&caps[1]) {
            Some(value) => format!("\"{value}\""),
            None => caps[0].to_string(),
        })
        .into_owned()
}
