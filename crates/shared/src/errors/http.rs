use crate::errors::{error::ErrorResponse, repository::RepositoryError, service::ServiceError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    Internal(String),
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => HttpError::BadRequest(errors.join("; ")),

            // Client mistakes about the catalog are reported as bad requests,
            // not 404/409.
            ServiceError::NotFound(msg) => HttpError::BadRequest(msg),
            err @ ServiceError::InsufficientStock { .. } => HttpError::BadRequest(err.to_string()),

            ServiceError::Repo(repo_err) => {
                error!("❌ Storage failure surfaced to HTTP: {repo_err:?}");
                match repo_err {
                    RepositoryError::LockTimeout => {
                        HttpError::Internal("Timed out waiting for product lock".into())
                    }
                    _ => HttpError::Internal("Database error".into()),
                }
            }

            ServiceError::Internal(msg) => {
                error!("❌ Internal failure surfaced to HTTP: {msg}");
                HttpError::Internal("Internal server error".into())
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            HttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse {
            status: "error".into(),
            message: msg,
        });

        (status, body).into_response()
    }
}
