//! # Erros da API
//!
//! Todo erro de handler vira uma resposta JSON `{ "error": ..., "code": ... }`.
//!
//! | Variante | Status |
//! |----------|--------|
//! | `Repository`, `InvalidField`, `Multipart` | 400 |
//! | `Consultation(NotFound)` | 404 |
//! | `Consultation(_)` | 400 |
//! | `Internal` | 500 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::error::RepositoryError;
use crate::orchestrator::ConsultationError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("repositório inválido: {0}")]
    Repository(#[from] RepositoryError),

    #[error("{0}")]
    Consultation(#[from] ConsultationError),

    #[error("campo inválido '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("erro no upload: {0}")]
    Multipart(String),

    #[error("erro interno: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Repository(_) => StatusCode::BAD_REQUEST,
            ApiError::Consultation(ConsultationError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Consultation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidField { .. } => StatusCode::BAD_REQUEST,
            ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "falha interna na API");
        }
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });
        (status, body).into_response()
    }
}
