use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Diagnostic attached to error responses for the logging middleware.
/// The public body stays terse; the report carries the detail.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub detail: String,
}

impl ErrorReport {
    pub fn new(source: &'static str, status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            source,
            status,
            detail: detail.into(),
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Failures of the pure generation step.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("component type `{requested}` not found")]
    UnknownComponent { requested: String },
}

/// Caller-visible failures of the lookup path.
///
/// Only these two conditions ever reach a caller. Remote tier failures
/// are absorbed inside the lookup service and logged, never surfaced.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The requested component has no registered template. Carries the
    /// valid identifiers so the caller can correct the request.
    #[error("component type `{requested}` not found")]
    UnknownComponent {
        requested: String,
        available: Vec<String>,
    },
    /// The admission gate shed this request. Distinct from any data
    /// error so callers can back off.
    #[error("server is at capacity")]
    Overloaded,
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        match self {
            LookupError::UnknownComponent {
                requested,
                available,
            } => {
                let detail = format!("component type `{requested}` not found");
                let mut response = (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": detail,
                        "available_components": available,
                    })),
                )
                    .into_response();
                ErrorReport::new("application::lookup", StatusCode::NOT_FOUND, detail)
                    .attach(&mut response);
                response
            }
            LookupError::Overloaded => {
                let mut response = (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({
                        "error": "server is at capacity, please try again later",
                    })),
                )
                    .into_response();
                ErrorReport::new(
                    "infra::http::admission",
                    StatusCode::SERVICE_UNAVAILABLE,
                    "admission gate shed request",
                )
                .attach(&mut response);
                response
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_component_maps_to_not_found() {
        let response = LookupError::UnknownComponent {
            requested: "missing".to_string(),
            available: vec!["welcome".to_string()],
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn overloaded_maps_to_service_unavailable() {
        let response = LookupError::Overloaded.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
