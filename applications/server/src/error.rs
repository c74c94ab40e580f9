/// Server error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cadence_core::{CadenceError, SongId};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Cadence(#[from] CadenceError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<cadence_storage::StorageError> for ServerError {
    fn from(err: cadence_storage::StorageError) -> Self {
        ServerError::Cadence(err.into())
    }
}

impl ServerError {
    /// Status, client-facing message and offending song IDs
    fn parts(self) -> (StatusCode, String, Vec<SongId>) {
        match self {
            ServerError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg, Vec::new()),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, Vec::new()),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, Vec::new()),
            ServerError::Cadence(err) => cadence_parts(err),
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                    Vec::new(),
                )
            }
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Vec::new(),
                )
            }
            ServerError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "IO error".to_string(),
                    Vec::new(),
                )
            }
        }
    }
}

fn cadence_parts(err: CadenceError) -> (StatusCode, String, Vec<SongId>) {
    let message = err.to_string();
    match err {
        CadenceError::NotFound { .. } => (StatusCode::NOT_FOUND, message, Vec::new()),
        CadenceError::SongsNotFound(ids) => (StatusCode::NOT_FOUND, message, ids),
        CadenceError::PermissionDenied => (StatusCode::FORBIDDEN, message, Vec::new()),
        CadenceError::AlreadyMember { song, .. } => (StatusCode::CONFLICT, message, vec![song]),
        CadenceError::SongsConflict(ids) => (StatusCode::CONFLICT, message, ids),
        CadenceError::Conflict(_) => (StatusCode::CONFLICT, message, Vec::new()),
        CadenceError::InvalidInput(_) => (StatusCode::BAD_REQUEST, message, Vec::new()),
        CadenceError::Busy(_) => {
            tracing::warn!("Database busy after retries: {}", message);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Database busy, try again".to_string(),
                Vec::new(),
            )
        }
        CadenceError::Storage(_) | CadenceError::Database(_) => {
            tracing::error!("Database error: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
                Vec::new(),
            )
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_message, ids) = self.parts();

        let body = if ids.is_empty() {
            json!({ "error": error_message })
        } else {
            json!({ "error": error_message, "ids": ids })
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_errors_map_to_statuses() {
        let cases = [
            (CadenceError::not_found("Album", "a1"), StatusCode::NOT_FOUND),
            (CadenceError::PermissionDenied, StatusCode::FORBIDDEN),
            (
                CadenceError::SongsConflict(vec![SongId::new("s1")]),
                StatusCode::CONFLICT,
            ),
            (CadenceError::invalid_input("dup"), StatusCode::BAD_REQUEST),
            (CadenceError::Busy("locked".into()), StatusCode::SERVICE_UNAVAILABLE),
            (
                CadenceError::Database("disk full".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ServerError::from(err).parts().0, status);
        }
    }

    #[test]
    fn missing_songs_are_listed() {
        let err = ServerError::from(CadenceError::SongsNotFound(vec![
            SongId::new("a"),
            SongId::new("b"),
        ]));
        let (status, _, ids) = err.parts();

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(ids, vec![SongId::new("a"), SongId::new("b")]);
    }

    #[test]
    fn internal_details_are_hidden() {
        let err = ServerError::from(CadenceError::Database("secret path".into()));
        let (_, message, _) = err.parts();
        assert_eq!(message, "Database error");
    }
}
