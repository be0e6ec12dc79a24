//! Domain error taxonomy and its mapping onto HTTP responses.
//!
//! Every failure leaving a handler is an [`ApiError`]; actix renders it
//! through [`ResponseError`] as the standard envelope
//! `{"error": {"code", "message", "details"}}`. No retries happen
//! server-side; a failed request is isolated to that request.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request: bad field values, bad paging parameters.
    #[error("{message}")]
    Validation { code: &'static str, message: String },

    /// Missing/invalid/expired token, or bad login credentials.
    #[error("{message}")]
    Unauthorized { code: &'static str, message: String },

    /// Authenticated but not permitted (wrong owner / wrong recipient).
    #[error("{0}")]
    Forbidden(String),

    /// The referenced resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// State changed concurrently; the request is no longer satisfiable
    /// as submitted (e.g. game ownership shifted under a pending offer).
    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    /// Semantically invalid operation: self-trade, duplicate game ids,
    /// deciding an already-decided offer.
    #[error("{message}")]
    InvalidOperation { code: &'static str, message: String },

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("token encoding failed")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("password hashing failed")]
    Hashing(#[from] bcrypt::BcryptError),
}

impl ApiError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            code,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_operation(code: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            code,
            message: message.into(),
        }
    }

    /// Machine-readable code carried inside the envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { code, .. }
            | Self::Unauthorized { code, .. }
            | Self::Conflict { code, .. }
            | Self::InvalidOperation { code, .. } => *code,
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) | Self::Token(_) | Self::Hashing(_) => "INTERNAL",
        }
    }

    fn public_message(&self) -> String {
        match self {
            // Never leak driver/library details to clients.
            Self::Database(_) | Self::Token(_) | Self::Hashing(_) => "internal server error".into(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::InvalidOperation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database(_) | Self::Token(_) | Self::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Database(e) = self {
            log::error!("database error: {e}");
        }
        HttpResponse::build(self.status_code()).json(json!({
            "error": {
                "code": self.code(),
                "message": self.public_message(),
                "details": {},
            }
        }))
    }
}

/// Rewrites actix's own deserialization failures (bad JSON body, bad
/// query string, bad path segment) into the standard envelope.
pub fn input_error<E: std::fmt::Display>(err: E) -> actix_web::Error {
    ApiError::validation("VALIDATION_ERROR", err.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn taxonomy_maps_onto_the_documented_status_codes() {
        let cases = [
            (ApiError::validation("BAD_PAGING", "x"), 400),
            (ApiError::unauthorized("INVALID_TOKEN", "x"), 401),
            (ApiError::forbidden("x"), 403),
            (ApiError::not_found("x"), 404),
            (ApiError::conflict("OWNERSHIP_CHANGED", "x"), 409),
            (ApiError::invalid_operation("INVALID_OFFER", "x"), 422),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{}", err.code());
        }
    }

    #[actix_web::test]
    async fn envelope_carries_code_message_and_details() {
        let err = ApiError::conflict("EMAIL_IN_USE", "That email address is already registered");
        let resp = err.error_response();
        assert_eq!(resp.status().as_u16(), 409);

        let bytes = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "EMAIL_IN_USE");
        assert_eq!(
            body["error"]["message"],
            "That email address is already registered"
        );
        assert!(body["error"]["details"].is_object());
    }

    #[actix_web::test]
    async fn internal_errors_never_leak_driver_detail() {
        let err = ApiError::Database(sqlx::Error::PoolClosed);
        let resp = err.error_response();
        assert_eq!(resp.status().as_u16(), 500);

        let bytes = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "INTERNAL");
        assert_eq!(body["error"]["message"], "internal server error");
    }
}
