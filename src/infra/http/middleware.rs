use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::application::error::{ErrorReport, LookupError};

use super::public::AppState;

/// Admission control for the lookup path. Non-blocking: a request that
/// finds no token is answered with the overloaded response right away.
/// The permit is held across the inner handler and released on drop,
/// whatever path the handler takes.
pub async fn admission_gate(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match state.gate.try_enter() {
        Some(_permit) => next.run(request).await,
        None => LookupError::Overloaded.into_response(),
    }
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let elapsed_ms = start.elapsed().as_millis() as u64;
        let report = response.extensions_mut().remove::<ErrorReport>();
        let (source, detail) = match report {
            Some(report) => (report.source, report.detail),
            None => ("unknown", "no diagnostic available".to_string()),
        };

        if status.is_server_error() {
            error!(
                target = "favella::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                "request failed",
            );
        } else {
            warn!(
                target = "favella::http::response",
                status = status.as_u16(),
                method = %method,
                path = %uri.path(),
                query = uri.query().unwrap_or(""),
                elapsed_ms = elapsed_ms,
                source = source,
                detail = %detail,
                "client request error",
            );
        }
    }

    response
}
