pub mod alerts;
pub mod health;
pub mod stations;
pub mod weather;

use std::sync::Arc;

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::services::fetcher::ImdClient;
use crate::services::stations::{StationDirectory, StationError};

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) client: ImdClient,
    pub(crate) stations: Arc<Result<StationDirectory, StationError>>,
}

impl AppState {
    /// The station directory, or the error it failed to load with.
    pub(crate) fn stations(&self) -> Result<&StationDirectory, AppError> {
        (*self.stations)
            .as_ref()
            .map_err(|e| AppError::Station(e.clone()))
    }
}

/// Success envelope: `{code: 200, result}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// HTTP-style status code (always 200)
    pub code: u16,
    pub result: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(result: T) -> Json<Self> {
        Json(Self { code: 200, result })
    }
}

/// Parse a station ID path segment.
pub(crate) fn parse_station_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid station ID format".to_string()))
}
