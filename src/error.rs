use crate::openai::LlmError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// Errors surfaced by the request orchestrator and HTTP handlers.
///
/// Only `InvalidRequest` carries its message to the caller; the server-side
/// variants answer with a generic `detail` and log the cause instead.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{detail}: {source}")]
    Upstream {
        detail: &'static str,
        #[source]
        source: LlmError,
    },

    #[error("{detail}: {source:#}")]
    Persistence {
        detail: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidRequest(message.into())
    }

    pub fn upstream(source: LlmError) -> Self {
        AppError::Upstream {
            detail: "Translation failed",
            source,
        }
    }

    pub fn persistence(detail: &'static str, source: anyhow::Error) -> Self {
        AppError::Persistence { detail, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { .. } | AppError::Persistence { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show the caller
    pub fn detail(&self) -> &str {
        match self {
            AppError::InvalidRequest(message) => message,
            AppError::Upstream { detail, .. } | AppError::Persistence { detail, .. } => detail,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            error!("{}", self);
        }
        (self.status(), Json(json!({ "detail": self.detail() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn test_invalid_request_is_400_with_message() {
        let response = AppError::invalid("Text cannot be empty").into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "Text cannot be empty"})
        );
    }

    #[tokio::test]
    async fn test_upstream_is_opaque_500() {
        let err = AppError::upstream(LlmError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: "invalid api key sk-secret".to_string(),
        });
        assert!(err.to_string().contains("401"));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body, json!({"detail": "Translation failed"}));
        assert!(!body.to_string().contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_persistence_is_opaque_500() {
        let err = AppError::persistence(
            "Failed to fetch history",
            anyhow::anyhow!("connection refused").context("Failed to fetch translation history"),
        );
        assert!(err.to_string().contains("connection refused"));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "Failed to fetch history"})
        );
    }
}
