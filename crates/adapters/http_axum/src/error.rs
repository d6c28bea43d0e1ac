//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use greenguard_domain::error::{GreenGuardError, ValidationError, error_chain};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`GreenGuardError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(GreenGuardError);

impl From<GreenGuardError> for ApiError {
    fn from(err: GreenGuardError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            GreenGuardError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            GreenGuardError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            GreenGuardError::Storage(_) | GreenGuardError::Generation(_) => {
                tracing::error!(error = %error_chain(&self.0), "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenguard_domain::error::{GenerationError, NotFoundError};
    use http_body_util::BodyExt;

    async fn render(err: GreenGuardError) -> (StatusCode, serde_json::Value) {
        let response = ApiError::from(err).into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn should_map_validation_error_to_bad_request() {
        let (status, body) = render(ValidationError::StateUnavailable { device: "Fan" }.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Fan data not available");
    }

    #[tokio::test]
    async fn should_map_not_found_error_to_404() {
        let (status, body) = render(
            NotFoundError {
                entity: "Schedule",
                id: "alice/day-1".to_string(),
            }
            .into(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Schedule alice/day-1 not found");
    }

    #[tokio::test]
    async fn should_hide_storage_and_generation_details() {
        for err in [
            GreenGuardError::Storage("disk full".into()),
            GenerationError::Unavailable("timeout".to_string()).into(),
        ] {
            let (status, body) = render(err).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["error"], "internal server error");
        }
    }
}
