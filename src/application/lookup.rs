//! Lookup orchestration across the cache tiers and the generator.
//!
//! Per-request state machine: local tier, then remote tier, then
//! generation, populating the tiers that missed on the way back out.
//! Remote failures of any kind degrade to a tier miss; the only
//! caller-visible failures are `UnknownComponent` and `Overloaded`.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::{debug, warn};

use crate::cache::{ArtifactStore, RemoteError, RemoteTier, artifact_key};
use crate::domain::artifact::Artifact;

use super::error::{GenerateError, LookupError};
use super::generator::ArtifactGenerator;

pub struct LookupService {
    generator: ArtifactGenerator,
    local: Arc<ArtifactStore>,
    remote: Option<Arc<dyn RemoteTier>>,
    remote_ttl: Duration,
}

impl LookupService {
    pub fn new(
        generator: ArtifactGenerator,
        local: Arc<ArtifactStore>,
        remote: Option<Arc<dyn RemoteTier>>,
        remote_ttl: Duration,
    ) -> Self {
        Self {
            generator,
            local,
            remote,
            remote_ttl,
        }
    }

    pub fn local(&self) -> &ArtifactStore {
        &self.local
    }

    pub fn remote(&self) -> Option<&Arc<dyn RemoteTier>> {
        self.remote.as_ref()
    }

    pub fn default_language(&self) -> &str {
        self.generator.localization().default_language()
    }

    pub fn available_components(&self) -> Vec<String> {
        self.generator.templates().component_types()
    }

    /// Resolve an artifact for `(component_type, requested_language)`.
    ///
    /// The returned artifact's `served_from_cache` flag reflects which
    /// branch answered. A local hit performs no remote write — the
    /// remote entry keeps its own clock.
    pub async fn lookup(
        &self,
        component_type: &str,
        requested_language: &str,
    ) -> Result<Artifact, LookupError> {
        let key = artifact_key(
            self.generator.localization(),
            component_type,
            requested_language,
        );

        if let Some(mut artifact) = self.local.get(&key) {
            counter!("favella_lookup_local_hit_total").increment(1);
            artifact.served_from_cache = true;
            return Ok(artifact);
        }
        counter!("favella_lookup_local_miss_total").increment(1);

        if let Some(remote) = &self.remote {
            match remote.fetch(&key).await {
                Ok(mut artifact) => {
                    counter!("favella_lookup_remote_hit_total").increment(1);
                    self.local.put(key.clone(), artifact.clone());
                    // Cheaper than re-sending the payload on every hit.
                    if let Err(error) = remote.refresh_ttl(&key, self.remote_ttl).await {
                        warn!(
                            target = "favella::lookup",
                            key = %key,
                            error = %error,
                            "failed to refresh remote TTL"
                        );
                    }
                    artifact.served_from_cache = true;
                    return Ok(artifact);
                }
                Err(RemoteError::Missing) => {
                    debug!(target = "favella::lookup", key = %key, "remote tier miss");
                }
                Err(error) => {
                    // Timeout, unreachability, malformed payload: all
                    // degrade to a miss.
                    warn!(
                        target = "favella::lookup",
                        key = %key,
                        error = %error,
                        "remote tier error treated as miss"
                    );
                }
            }
            counter!("favella_lookup_remote_miss_total").increment(1);
        }

        let artifact = self
            .generator
            .generate(component_type, requested_language)
            .map_err(|error| match error {
                GenerateError::UnknownComponent { requested } => LookupError::UnknownComponent {
                    requested,
                    available: self.available_components(),
                },
            })?;
        counter!("favella_lookup_generated_total").increment(1);

        self.local.put(key.clone(), artifact.clone());
        if let Some(remote) = &self.remote {
            if let Err(error) = remote.store(&key, &artifact, self.remote_ttl).await {
                warn!(
                    target = "favella::lookup",
                    key = %key,
                    error = %error,
                    "failed to store artifact in remote tier"
                );
            }
        }

        Ok(artifact)
    }
}
