//! GET /weather/:id: current weather and forecast for one station.

use axum::extract::{Path, State};
use axum::Json;

use super::{parse_station_id, ApiResponse, AppState};
use crate::errors::{AppError, ErrorResponse};
use crate::services::portal;
use crate::services::station::WeatherReading;

/// Scrape current weather for a station.
///
/// The station must exist in the directory; the portal page is fetched fresh
/// on every call. Missing fields on the page degrade to zero values.
#[utoipa::path(
    get,
    path = "/weather/{id}",
    tag = "Weather",
    params(
        ("id" = i64, Path, description = "Station ID"),
    ),
    responses(
        (status = 200, description = "Station weather", body = ApiResponse<WeatherReading>),
        (status = 400, description = "Invalid station ID format", body = ErrorResponse),
        (status = 404, description = "Station not found", body = ErrorResponse),
        (status = 500, description = "Network error or page without weather table", body = ErrorResponse),
        (status = 504, description = "Portal timed out", body = ErrorResponse),
    )
)]
pub async fn get_station_weather(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<WeatherReading>>, AppError> {
    tracing::debug!("Weather request received for station ID: {}", id);
    let station_id = parse_station_id(&id)?;
    let reading = portal::station_weather(&state.client, state.stations()?, station_id).await?;
    Ok(ApiResponse::ok(reading))
}
