//! Handler outcomes
//!
//! Handlers answer with an [`Outcome`]; status codes are chosen here only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::error::ApiError;

/// Result of a municipality operation
#[derive(Debug)]
pub enum Outcome<T> {
    /// Data to return (200)
    Found(T),
    /// Operation succeeded with nothing to return (204)
    Done,
    /// Nothing matched (404)
    Empty,
    /// Operation failed; carries the raw error text (400)
    Failed(String),
}

impl<T> Outcome<T> {
    /// Log a failure for `operation` and wrap its message
    pub fn failed(operation: &'static str, err: impl Into<ApiError>) -> Self {
        let err = err.into();
        error!(operation, "{} failed: {}", operation, err);
        Outcome::Failed(err.to_string())
    }

    /// Settle a handler result: errors become [`Outcome::Failed`], and the
    /// final outcome is counted under `operation`
    pub fn settle(operation: &'static str, result: Result<Self, ApiError>) -> Self {
        result
            .unwrap_or_else(|err| Self::failed(operation, err))
            .observe(operation)
    }

    /// Short label used in metrics
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Found(_) => "found",
            Outcome::Done => "done",
            Outcome::Empty => "empty",
            Outcome::Failed(_) => "failed",
        }
    }

    /// Count this outcome under `operation`
    pub fn observe(self, operation: &'static str) -> Self {
        metrics::counter!(
            "municipios_requests_total",
            "operation" => operation,
            "outcome" => self.label()
        )
        .increment(1);
        self
    }
}

impl<T: Serialize> IntoResponse for Outcome<T> {
    fn into_response(self) -> Response {
        match self {
            Outcome::Found(data) => (StatusCode::OK, Json(data)).into_response(),
            Outcome::Done => StatusCode::NO_CONTENT.into_response(),
            Outcome::Empty => StatusCode::NOT_FOUND.into_response(),
            Outcome::Failed(message) => (StatusCode::BAD_REQUEST, message).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use upstream::FetchError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Outcome::Found(vec![1]).into_response().status(), StatusCode::OK);
        assert_eq!(Outcome::<()>::Done.into_response().status(), StatusCode::NO_CONTENT);
        assert_eq!(Outcome::<()>::Empty.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Outcome::<()>::Failed("boom".to_string()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_failed_keeps_error_text() {
        let outcome = Outcome::<()>::failed("ingest", FetchError::UpstreamUnavailable { status: 502 });
        match outcome {
            Outcome::Failed(message) => assert_eq!(message, "Upstream unavailable: HTTP 502"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_settle_maps_errors() {
        let ok = Outcome::settle("list", Ok(Outcome::Found(3)));
        assert!(matches!(ok, Outcome::Found(3)));

        let err: Outcome<()> = Outcome::settle("update", Err(ApiError::InvalidPayload("eof".to_string())));
        assert!(matches!(err, Outcome::Failed(ref m) if m == "Invalid payload: eof"));
    }
}
