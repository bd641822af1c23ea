//! Error responses for the HTTP layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::ChatClientError;
use crate::prompt::PromptError;

/// JSON body returned with every error status.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] PromptError),

    #[error("Invalid request body: {message}")]
    InvalidBody { status: StatusCode, message: String },

    #[error(transparent)]
    Upstream(#[from] ChatClientError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidBody { status, .. } => *status,
            Self::Upstream(e) => match e {
                ChatClientError::InvalidPrompt(_) => StatusCode::BAD_REQUEST,
                ChatClientError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
                ChatClientError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                ChatClientError::Transport(_)
                | ChatClientError::Provider { .. }
                | ChatClientError::Decode(_)
                | ChatClientError::EmptyCompletion => StatusCode::BAD_GATEWAY,
            },
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidBody { .. } => "invalid_request",
            Self::Upstream(e) => match e {
                ChatClientError::InvalidPrompt(_) => "invalid_request",
                ChatClientError::NotConfigured(_) => "provider_not_configured",
                ChatClientError::Timeout(_) => "provider_timeout",
                _ => "provider_error",
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = ErrorResponse {
            error: self.to_string(),
            code: self.error_code().to_string(),
        };
        (self.status_code(), Json(error)).into_response()
    }
}
