use crate::server::ApiResponse;
use crate::utils::error::ShowreelError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, warn};

impl ShowreelError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShowreelError::NotFound(_) => StatusCode::NOT_FOUND,
            ShowreelError::Validation(_) | ShowreelError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ShowreelError::SourceUnavailable(_) | ShowreelError::Http(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to clients
    fn public_message(&self) -> String {
        match self {
            ShowreelError::NotFound(message) | ShowreelError::InvalidInput(message) => message.clone(),
            ShowreelError::Validation(errors) => match errors.first() {
                Some(first) => first.message.to_string(),
                None => self.to_string(),
            },
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ShowreelError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        (status, Json(ApiResponse::<()>::failure(self.public_message()))).into_response()
    }
}
