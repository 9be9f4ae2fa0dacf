use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::fetcher::FetchError;
use crate::services::station::ExtractError;
use crate::services::stations::StationError;

/// Failure envelope: `{code, msg}`, where `code` matches the HTTP status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP-style status code
    pub code: u16,
    /// Human-readable error message
    pub msg: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Station(#[from] StationError),
}

impl AppError {
    /// Status code carried in the envelope body and the HTTP response.
    pub fn code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::BadRequest(_) => 400,
            AppError::RateLimited => 429,
            AppError::Fetch(err) => err.status_code(),
            AppError::Extract(_) | AppError::Station(_) => 500,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        match &self {
            AppError::NotFound(_) | AppError::BadRequest(_) | AppError::RateLimited => {
                tracing::debug!("Request rejected ({}): {}", code, self)
            }
            _ => tracing::error!("Request failed ({}): {}", code, self),
        }

        // Upstream codes are passed through verbatim; anything axum cannot
        // represent as a status becomes a 500 on the wire.
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            code,
            msg: self.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_errors_keep_their_codes() {
        assert_eq!(AppError::from(FetchError::Timeout).code(), 504);
        assert_eq!(
            AppError::from(FetchError::Network("reset".to_string())).code(),
            500
        );
        assert_eq!(AppError::from(FetchError::Upstream(403)).code(), 403);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            AppError::from(FetchError::Timeout).to_string(),
            "Request timed out"
        );
        assert_eq!(
            AppError::from(ExtractError::MissingTable).to_string(),
            "Weather data table not found"
        );
        assert_eq!(
            AppError::from(FetchError::Upstream(503)).to_string(),
            "Server returned status code 503"
        );
    }

    #[test]
    fn test_rate_limited() {
        let err = AppError::RateLimited;
        assert_eq!(err.code(), 429);
        assert_eq!(err.to_string(), "Rate limit exceeded");
    }

    #[test]
    fn test_into_response_uses_code_as_status() {
        let response = AppError::from(FetchError::Upstream(418)).into_response();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);

        let response = AppError::NotFound("missing".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
