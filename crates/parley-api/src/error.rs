use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use parley_directory::DirectoryError;
use parley_types::api::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Query string or body could not be extracted
    #[error("{1}")]
    Malformed(StatusCode, String),

    #[error("worker task failed: {0}")]
    Join(#[source] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Directory(e) => match e {
                DirectoryError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
                DirectoryError::NotFound(_) => StatusCode::NOT_FOUND,
                DirectoryError::Conflict(_) => StatusCode::CONFLICT,
                DirectoryError::Unauthorized(_) => StatusCode::FORBIDDEN,
                DirectoryError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Malformed(status, _) => *status,
            Self::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-caused failures are logged as warnings, the rest as errors.
    pub fn is_rejection(&self) -> bool {
        match self {
            Self::Directory(e) => e.is_rejection(),
            Self::Malformed(..) => true,
            Self::Join(_) => false,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Malformed(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::UNSUPPORTED_MEDIA_TYPE => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::Malformed(status, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if !self.is_rejection() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected ({}): {}", status.as_u16(), self);
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_errors_map_to_distinct_statuses() {
        let cases = [
            (DirectoryError::InvalidArgument("x".into()), StatusCode::BAD_REQUEST),
            (DirectoryError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (DirectoryError::Conflict("x".into()), StatusCode::CONFLICT),
            (DirectoryError::Unauthorized("x".into()), StatusCode::FORBIDDEN),
            (
                DirectoryError::Store(anyhow::anyhow!("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn only_infrastructure_failures_are_not_rejections() {
        assert!(ApiError::from(DirectoryError::Unauthorized("x".into())).is_rejection());
        assert!(ApiError::Malformed(StatusCode::BAD_REQUEST, "x".into()).is_rejection());
        let err = ApiError::from(DirectoryError::Store(anyhow::anyhow!("disk full")));
        assert!(!err.is_rejection());
        assert!(err.status().is_server_error());
    }

    #[test]
    fn message_is_the_directory_description() {
        let err = ApiError::from(DirectoryError::NotFound("room 42".into()));
        assert_eq!(err.to_string(), "not found: room 42");
    }
}
