use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Schema or validation failure on an inbound payload.
    #[error("{0}")]
    InvalidInput(String),

    /// Duplicate participant name.
    #[error("{0}")]
    Conflict(String),

    /// Unknown message id or participant.
    #[error("{0}")]
    NotFound(String),

    /// Mutation attempted by someone other than the owner.
    #[error("{0}")]
    Forbidden(String),

    /// The underlying document store failed.
    #[error("storage unavailable: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type Result<T> = core::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            // 401, not 403: the `user` header is the whole identity story
            Error::Forbidden(_) => StatusCode::UNAUTHORIZED,
            Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": {
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}
