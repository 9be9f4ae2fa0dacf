//! Alert endpoints.
//!
//! - GET /alerts
//! - GET /alerts/state/:state
//! - GET /alerts/summary

use axum::extract::{Path, State};
use axum::Json;

use super::{ApiResponse, AppState};
use crate::errors::{AppError, ErrorResponse};
use crate::services::alerts::AlertCollection;
use crate::services::portal::{self, StateAlerts};
use crate::services::summary::AlertsSummary;

/// All current weather alerts, grouped by state.
#[utoipa::path(
    get,
    path = "/alerts",
    tag = "Alerts",
    responses(
        (status = 200, description = "Current alerts", body = ApiResponse<AlertCollection>),
        (status = 500, description = "Network error", body = ErrorResponse),
        (status = 504, description = "Portal timed out", body = ErrorResponse),
    )
)]
pub async fn get_all_alerts(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AlertCollection>>, AppError> {
    tracing::debug!("Weather alerts request received");
    Ok(ApiResponse::ok(portal::alerts(&state.client).await?))
}

/// Current alerts for one state (case-insensitive).
#[utoipa::path(
    get,
    path = "/alerts/state/{state}",
    tag = "Alerts",
    params(
        ("state" = String, Path, description = "State name, e.g. \"Kerala\""),
    ),
    responses(
        (status = 200, description = "Alerts for the state", body = ApiResponse<StateAlerts>),
        (status = 404, description = "No alerts for the state", body = ErrorResponse),
        (status = 500, description = "Network error", body = ErrorResponse),
        (status = 504, description = "Portal timed out", body = ErrorResponse),
    )
)]
pub async fn get_state_alerts(
    State(state): State<AppState>,
    Path(region): Path<String>,
) -> Result<Json<ApiResponse<StateAlerts>>, AppError> {
    tracing::debug!("Weather alerts request received for state: {}", region);
    Ok(ApiResponse::ok(
        portal::state_alerts(&state.client, &region).await?,
    ))
}

/// Alert counts per severity level.
#[utoipa::path(
    get,
    path = "/alerts/summary",
    tag = "Alerts",
    responses(
        (status = 200, description = "Alert summary", body = ApiResponse<AlertsSummary>),
        (status = 500, description = "Network error", body = ErrorResponse),
        (status = 504, description = "Portal timed out", body = ErrorResponse),
    )
)]
pub async fn get_alerts_summary(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AlertsSummary>>, AppError> {
    tracing::debug!("Weather alerts summary request received");
    Ok(ApiResponse::ok(portal::alerts_summary(&state.client).await?))
}
