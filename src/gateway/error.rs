use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Caller-visible failures at the HTTP edge.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No identity where one is required.
    #[error("Not authenticated")]
    Unauthenticated,

    /// Malformed request (e.g. empty file identifier).
    #[error("Bad request: {0}")]
    BadRequest(&'static str),

    /// Unknown file, or a lookup that failed. The two are not distinguished.
    #[error("Not found")]
    NotFound,

    /// Server-side failure. Details are logged, never returned.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()).into_response(),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
            Self::NotFound => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            Self::Internal(_) => {
                tracing::error!(error = %self, "Gateway internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

impl From<crate::error::Error> for ApiError {
    fn from(e: crate::error::Error) -> Self {
        Self::Internal(e.to_string())
    }
}
