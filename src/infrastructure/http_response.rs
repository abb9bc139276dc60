// HTTP response mapping for analysis errors
use crate::application::error::AnalysisError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AnalysisError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AnalysisError::InsufficientVariables { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AnalysisError::AlignmentTooLong { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AnalysisError::UnknownVariable(_) => StatusCode::BAD_REQUEST,
            AnalysisError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
