use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use super::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status ("ok", or "degraded" when the station directory failed to load)
    pub status: String,
    /// API version
    pub version: String,
    /// Number of stations in the directory
    pub stations: usize,
}

/// Health check endpoint.
///
/// Does not contact the portal. Returns status "degraded" (still 200) when
/// the station directory could not be loaded.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health_of(&state))
}

fn health_of(state: &AppState) -> HealthResponse {
    let stations = state.stations().map(|d| d.len()).ok();
    HealthResponse {
        status: if stations.is_some() {
            "ok".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        stations: stations.unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::services::fetcher::ImdClient;
    use crate::services::stations::{StationDirectory, StationError};

    fn state(stations: Result<StationDirectory, StationError>) -> AppState {
        AppState {
            client: ImdClient::new(
                "http://localhost/?id={id}",
                "http://localhost/",
                Duration::from_secs(1),
            ),
            stations: Arc::new(stations),
        }
    }

    #[test]
    fn test_health_ok() {
        let directory = StationDirectory::from_json(r#"[{"stationId": 1}]"#).unwrap();
        let health = health_of(&state(Ok(directory)));
        assert_eq!(health.status, "ok");
        assert_eq!(health.stations, 1);
    }

    #[test]
    fn test_health_degraded_without_directory() {
        let health = health_of(&state(Err(StationError::FileNotFound)));
        assert_eq!(health.status, "degraded");
        assert_eq!(health.stations, 0);
    }
}
