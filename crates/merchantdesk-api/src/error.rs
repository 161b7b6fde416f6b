//! Error types for merchantdesk-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use merchantdesk_core::{CoreError, ErrorCode, ErrorDetails, ValidationErrors};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("{0}")]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Core(error) => match error.code() {
                ErrorCode::MerchantNotFound => StatusCode::NOT_FOUND,
                ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::PersistenceFailed => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// JSON body of the error response
    fn body(&self) -> serde_json::Value {
        match self {
            ApiError::BadRequest { .. } => serde_json::json!({
                "code": "BAD_REQUEST",
                "message": self.to_string(),
            }),
            ApiError::Core(error) => serialize_details(error.to_details()),
        }
    }
}

fn serialize_details(details: ErrorDetails) -> serde_json::Value {
    serde_json::to_value(&details).unwrap_or_else(|_| {
        serde_json::json!({ "code": details.code.to_string(), "message": details.message })
    })
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Core(errors.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!(target: "merchantdesk::api", "{}", self);
        }
        (status, Json(self.body())).into_response()
    }
}
