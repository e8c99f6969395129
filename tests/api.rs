use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use favella::application::generator::ArtifactGenerator;
use favella::application::lookup::LookupService;
use favella::cache::{AdmissionGate, ArtifactStore, RemoteError, RemoteTier};
use favella::domain::artifact::Artifact;
use favella::domain::registry;
use favella::infra::http::{AppState, build_router};

/// Remote fake that fails every operation, as if Redis were down.
struct BrokenRemote;

#[async_trait]
impl RemoteTier for BrokenRemote {
    async fn fetch(&self, _key: &str) -> Result<Artifact, RemoteError> {
        Err(RemoteError::Timeout(Duration::from_millis(1)))
    }

    async fn store(
        &self,
        _key: &str,
        _artifact: &Artifact,
        _ttl: Duration,
    ) -> Result<(), RemoteError> {
        Err(RemoteError::Timeout(Duration::from_millis(1)))
    }

    async fn refresh_ttl(&self, _key: &str, _ttl: Duration) -> Result<(), RemoteError> {
        Err(RemoteError::Timeout(Duration::from_millis(1)))
    }

    async fn ping(&self) -> bool {
        false
    }
}

fn build_state(concurrency_limit: usize, remote: Option<Arc<dyn RemoteTier>>) -> AppState {
    let (templates, localization) = registry::builtin();
    let generator = ArtifactGenerator::new(templates, localization);
    let local = Arc::new(ArtifactStore::new(
        NonZeroUsize::new(16).expect("capacity"),
        Duration::from_secs(60),
    ));
    let lookup = Arc::new(LookupService::new(
        generator,
        local,
        remote,
        Duration::from_secs(120),
    ));
    AppState {
        lookup,
        gate: AdmissionGate::new(concurrency_limit),
    }
}

fn build_app(state: AppState) -> Router {
    build_router(state)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, value)
}

#[tokio::test]
async fn component_lookup_returns_artifact_and_caches_it() {
    let app = build_app(build_state(2, None));

    let (status, first) = get_json(&app, "/api/component/welcome?lang=es").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["component_name"], "WelcomeComponent");
    assert_eq!(first["language"], "es");
    assert!(first.get("served_from_cache").is_none());
    assert!(
        first["body"]
            .as_str()
            .expect("body")
            .contains("\"Bienvenido a Nuestra App\"")
    );

    let (status, second) = get_json(&app, "/api/component/welcome?lang=es").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["served_from_cache"], true);
    assert_eq!(
        second["metadata"]["artifact_id"],
        first["metadata"]["artifact_id"]
    );
}

#[tokio::test]
async fn missing_lang_parameter_defaults_to_baseline_language() {
    let app = build_app(build_state(2, None));

    let (status, body) = get_json(&app, "/api/component/footer").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language"], "en");
}

#[tokio::test]
async fn unsupported_languages_collapse_onto_one_artifact() {
    let state = build_state(2, None);
    let app = build_app(state.clone());

    let (_, zh) = get_json(&app, "/api/component/welcome?lang=zh").await;
    let (_, ja) = get_json(&app, "/api/component/welcome?lang=ja").await;

    assert_eq!(zh["language"], "en");
    assert_eq!(ja["language"], "en");
    assert_eq!(ja["served_from_cache"], true);
    assert_eq!(state.lookup.local().len(), 1);
}

#[tokio::test]
async fn unknown_component_lists_valid_identifiers() {
    let app = build_app(build_state(2, None));

    let (status, body) = get_json(&app, "/api/component/nonexistent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let available = body["available_components"]
        .as_array()
        .expect("available_components array");
    assert!(!available.is_empty());
    assert!(available.iter().any(|value| value == "welcome"));
}

#[tokio::test]
async fn saturated_gate_sheds_lookups_but_not_health() {
    let state = build_state(1, None);
    let app = build_app(state.clone());

    // Hold the only token, as an in-flight request would.
    let held = state.gate.try_enter().expect("token available");

    let (status, body) = get_json(&app, "/api/component/welcome").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(
        body["error"]
            .as_str()
            .expect("error message")
            .contains("capacity")
    );

    // The health probe bypasses the gate entirely.
    let (status, health) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");

    drop(held);
    let (status, _) = get_json(&app, "/api/component/welcome").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn health_reports_cache_and_gate_state() {
    let state = build_state(2, None);
    let app = build_app(state.clone());

    let (_, _) = get_json(&app, "/api/component/welcome").await;

    let (status, health) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["service"], "favella");
    assert_eq!(health["cache_size"], 1);
    assert_eq!(health["concurrency_limit"], 2);
    assert_eq!(health["remote_status"], "disabled");
}

#[tokio::test]
async fn broken_remote_never_fails_a_request() {
    let app = build_app(build_state(2, Some(Arc::new(BrokenRemote))));

    let (status, body) = get_json(&app, "/api/component/user_profile?lang=de").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language"], "de");

    let (status, body) = get_json(&app, "/api/component/user_profile?lang=de").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["served_from_cache"], true);

    let (status, health) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["remote_status"], "disconnected");
}
