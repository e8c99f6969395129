//! Public HTTP surface: the gated component lookup and the ungated
//! health probe.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::application::error::LookupError;
use crate::application::lookup::LookupService;
use crate::cache::AdmissionGate;
use crate::domain::artifact::Artifact;

use super::middleware;

#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<LookupService>,
    pub gate: AdmissionGate,
}

/// Build the service router. `/health` is registered outside the gated
/// subtree so monitors can always observe the service, even at
/// saturation.
pub fn build_router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/api/component/{component_type}", get(get_component))
        .layer(from_fn_with_state(state.clone(), middleware::admission_gate));

    Router::new()
        .route("/health", get(health))
        .merge(gated)
        .layer(from_fn(middleware::log_responses))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ComponentQuery {
    lang: Option<String>,
}

async fn get_component(
    State(state): State<AppState>,
    Path(component_type): Path<String>,
    Query(query): Query<ComponentQuery>,
) -> Result<Json<Artifact>, LookupError> {
    let language = query
        .lang
        .as_deref()
        .unwrap_or_else(|| state.lookup.default_language());

    let artifact = state.lookup.lookup(&component_type, language).await?;
    Ok(Json(artifact))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let remote_status = match state.lookup.remote() {
        Some(remote) => {
            if remote.ping().await {
                "connected"
            } else {
                "disconnected"
            }
        }
        None => "disabled",
    };

    Json(json!({
        "status": "healthy",
        "service": "favella",
        "version": env!("CARGO_PKG_VERSION"),
        "cache_size": state.lookup.local().len(),
        "concurrency_limit": state.gate.limit(),
        "remote_status": remote_status,
    }))
}
