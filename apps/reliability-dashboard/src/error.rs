use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt::Display;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

pub fn internal_error(err: impl Display) -> AppError {
    tracing::error!(error = %err, "internal error");
    AppError::internal("Internal server error")
}

/// Upstream failures are logged in full; callers only see which fetch failed.
pub fn map_upstream_error(err: anyhow::Error, what: &str) -> AppError {
    tracing::warn!(error = %format!("{err:#}"), what, "upstream request failed");
    AppError::new(StatusCode::BAD_GATEWAY, format!("Failed to fetch {what} from upstream"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_errors_do_not_leak_details() {
        let err = map_upstream_error(anyhow::anyhow!("connect refused 10.0.0.5:5000"), "analysis");
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
        assert!(!err.message.contains("10.0.0.5"));
        assert!(err.message.contains("analysis"));
    }

    #[test]
    fn internal_errors_are_generic() {
        let err = internal_error("boom");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
    }
}
