//! Static station directory, loaded once from a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StationError {
    #[error("Station data file not found")]
    FileNotFound,
    #[error("Error reading station data")]
    Decode(String),
    #[error("Error retrieving station data: {0}")]
    Io(String),
}

/// One station descriptor. Fields other than `stationId` are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StationRecord {
    #[serde(rename = "stationId")]
    pub station_id: i64,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub details: Map<String, Value>,
}

/// Read-only list of known stations.
#[derive(Debug, Clone, Default)]
pub struct StationDirectory {
    stations: Vec<StationRecord>,
}

impl StationDirectory {
    pub fn load(path: &Path) -> Result<Self, StationError> {
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StationError::FileNotFound,
            _ => StationError::Io(e.to_string()),
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, StationError> {
        let stations: Vec<StationRecord> =
            serde_json::from_str(raw).map_err(|e| StationError::Decode(e.to_string()))?;
        Ok(Self { stations })
    }

    pub fn all(&self) -> &[StationRecord] {
        &self.stations
    }

    pub fn get(&self, station_id: i64) -> Option<&StationRecord> {
        self.stations.iter().find(|s| s.station_id == station_id)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
