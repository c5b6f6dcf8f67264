use actix_web::{error, http::header::ContentType, http::StatusCode, HttpResponse};
use derive_more::{Display, Error};
use serde_json::json;

/// Error taxonomy for the API. Every error is converted into the uniform
/// response envelope at the route boundary; nothing escapes as plain text.
#[derive(Debug, Display, Error)]
pub enum ApiError {
    #[display("{message}")]
    Validation { message: String },

    #[display("invalid email or password")]
    BadCredentials,

    #[display("token missing or malformed, expected: Bearer <token>")]
    TokenMissing,

    #[display("token expired")]
    TokenExpired,

    #[display("token invalid")]
    TokenInvalid,

    #[display("{message}")]
    Conflict { message: String },

    #[display("{resource} not found")]
    NotFound { resource: &'static str },

    #[display("internal server error")]
    Internal,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
        }
    }
}

impl error::ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .json(json!({
                "success": false,
                "data": null,
                "message": self.to_string(),
                "httpStatus": status.as_u16(),
            }))
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::BadCredentials
            | ApiError::TokenMissing
            | ApiError::TokenExpired
            | ApiError::TokenInvalid => StatusCode::UNAUTHORIZED,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        log::error!("database error: {err}");
        ApiError::Internal
    }
}

impl<T> From<std::sync::PoisonError<T>> for ApiError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        log::error!("database mutex poisoned");
        ApiError::Internal
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        log::error!("bcrypt error: {err}");
        ApiError::Internal
    }
}
