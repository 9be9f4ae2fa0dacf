//! Station directory endpoints.
//!
//! - GET /station/all
//! - GET /station/:id

use axum::extract::{Path, State};
use axum::Json;

use super::{parse_station_id, ApiResponse, AppState};
use crate::errors::{AppError, ErrorResponse};
use crate::services::stations::StationRecord;

/// List every station in the directory.
#[utoipa::path(
    get,
    path = "/station/all",
    tag = "Stations",
    responses(
        (status = 200, description = "All known stations", body = ApiResponse<Vec<StationRecord>>),
        (status = 500, description = "Station directory unavailable", body = ErrorResponse),
    )
)]
pub async fn list_stations(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<StationRecord>>>, AppError> {
    tracing::debug!("Station list requested");
    let directory = state.stations()?;
    Ok(ApiResponse::ok(directory.all().to_vec()))
}

/// Get one station descriptor by ID.
#[utoipa::path(
    get,
    path = "/station/{id}",
    tag = "Stations",
    params(
        ("id" = i64, Path, description = "Station ID"),
    ),
    responses(
        (status = 200, description = "Station descriptor", body = ApiResponse<StationRecord>),
        (status = 400, description = "Invalid station ID format", body = ErrorResponse),
        (status = 404, description = "Station not found", body = ErrorResponse),
        (status = 500, description = "Station directory unavailable", body = ErrorResponse),
    )
)]
pub async fn get_station(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<StationRecord>>, AppError> {
    tracing::debug!("Station request received for ID: {}", id);
    let station_id = parse_station_id(&id)?;
    let station = state
        .stations()?
        .get(station_id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("No station with ID {} found", station_id)))?;
    Ok(ApiResponse::ok(station))
}
