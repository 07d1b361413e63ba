use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// The small, closed set of ways a redirect request can fail.
#[derive(Debug)]
pub enum GitHttpError {
    /// Import path did not match the forge grammar.
    MalformedPath,
    /// No ref satisfied the requested version.
    NoMatchingRef,
    /// The upstream `info/refs` stream did not look like a git advertisement.
    MalformedAdvertisement(String),
    /// Upstream returned an error or was unreachable.
    UpstreamFailure(String),
    /// Anything else that should surface as a 500.
    Internal(String),
}

impl IntoResponse for GitHttpError {
    fn into_response(self) -> Response {
        match self {
            GitHttpError::MalformedPath => (StatusCode::NOT_FOUND, "not found").into_response(),
            GitHttpError::NoMatchingRef => (StatusCode::NOT_FOUND, "no matching ref").into_response(),
            GitHttpError::MalformedAdvertisement(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
            }
            GitHttpError::UpstreamFailure(msg) => (StatusCode::BAD_GATEWAY, msg).into_response(),
            GitHttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
        }
    }
}

impl std::fmt::Display for GitHttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitHttpError::MalformedPath => write!(f, "malformed import path"),
            GitHttpError::NoMatchingRef => write!(f, "no matching ref"),
            GitHttpError::MalformedAdvertisement(msg) => write!(f, "malformed advertisement: {msg}"),
            GitHttpError::UpstreamFailure(msg) => write!(f, "upstream failure: {msg}"),
            GitHttpError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for GitHttpError {}
