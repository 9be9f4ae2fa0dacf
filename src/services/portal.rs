//! Request-level operations: one upstream fetch, then pure extraction.
//!
//! Every call fetches fresh; nothing is cached between requests.

use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::AppError;
use crate::services::alerts::{extract_alerts, AlertCollection, AlertRecord};
use crate::services::fetcher::ImdClient;
use crate::services::station::{extract_station_weather, WeatherReading};
use crate::services::stations::StationDirectory;
use crate::services::summary::{summarize, AlertsSummary};

/// Alerts for a single state.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StateAlerts {
    pub state: String,
    pub alerts: Vec<AlertRecord>,
    pub total_alerts: usize,
    pub last_updated: Option<String>,
}

/// Current weather for a station known to `directory`.
///
/// Unknown stations are rejected before any upstream request is made.
pub async fn station_weather(
    client: &ImdClient,
    directory: &StationDirectory,
    station_id: i64,
) -> Result<WeatherReading, AppError> {
    if directory.get(station_id).is_none() {
        return Err(AppError::NotFound(format!(
            "No station with ID {} found",
            station_id
        )));
    }

    let html = client.fetch_station_page(station_id).await?;
    Ok(extract_station_weather(&html)?)
}

/// All current alerts.
pub async fn alerts(client: &ImdClient) -> Result<AlertCollection, AppError> {
    let html = client.fetch_alerts_page().await?;
    Ok(extract_alerts(&html))
}

/// Alerts for one state, matched case-insensitively.
pub async fn state_alerts(client: &ImdClient, state: &str) -> Result<StateAlerts, AppError> {
    let collection = alerts(client).await?;
    select_state(&collection, state)
}

/// Per-level summary of all current alerts.
pub async fn alerts_summary(client: &ImdClient) -> Result<AlertsSummary, AppError> {
    let collection = alerts(client).await?;
    Ok(summarize(&collection))
}

fn select_state(collection: &AlertCollection, state: &str) -> Result<StateAlerts, AppError> {
    let (name, alerts) = collection
        .alerts_by_state
        .get_ignore_case(state)
        .filter(|(_, alerts)| !alerts.is_empty())
        .ok_or_else(|| {
            AppError::NotFound(format!("No alerts found for state: {}", state.to_lowercase()))
        })?;

    Ok(StateAlerts {
        state: name.to_string(),
        alerts: alerts.to_vec(),
        total_alerts: alerts.len(),
        last_updated: collection.last_updated.clone(),
    })
}
