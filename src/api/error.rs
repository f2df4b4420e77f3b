//! Mapping of analysis failures onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, info};

use crate::error::AnalysisError;

/// Errors returned by HTTP handlers. Rendered as `{"detail": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// The body could not be decoded; keeps the extractor's status.
    #[error("Requisição inválida: {message}")]
    InvalidBody { status: StatusCode, message: String },
}

impl ApiError {
    pub fn invalid_body(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError::InvalidBody {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Analysis(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidBody { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %detail, "Email analysis failed");
        } else {
            info!(status = status.as_u16(), error = %detail, "Rejected analysis request");
        }

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::from(AnalysisError::MissingInput).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AnalysisError::UnsupportedFormat {
                filename: "a.docx".into()
            })
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AnalysisError::Provider(LlmError::AuthFailed {
                provider: "openai".into()
            }))
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::invalid_body(StatusCode::PAYLOAD_TOO_LARGE, "too big").status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn detail_is_the_analysis_message() {
        let err = ApiError::from(AnalysisError::EmptyOrTooShort);
        assert_eq!(err.to_string(), "O email está vazio ou muito curto.");
    }
}
