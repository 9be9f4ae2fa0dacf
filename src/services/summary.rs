//! Alert summary: counts per severity tier. Pure, no I/O.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::alerts::{AlertCollection, AlertLevel};

/// Alert counts for each recognised tier; absent tiers count zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct AlertLevelCounts {
    #[serde(rename = "No Warning")]
    pub no_warning: usize,
    #[serde(rename = "Watch")]
    pub watch: usize,
    #[serde(rename = "Alert")]
    pub alert: usize,
    #[serde(rename = "Warning")]
    pub warning: usize,
}

impl AlertLevelCounts {
    /// Count `level` if it is one of the four tiers.
    fn record(&mut self, level: &AlertLevel) {
        let slot = match level {
            AlertLevel::NoWarning => &mut self.no_warning,
            AlertLevel::Watch => &mut self.watch,
            AlertLevel::Alert => &mut self.alert,
            AlertLevel::Warning => &mut self.warning,
            AlertLevel::Unknown | AlertLevel::Other(_) => return,
        };
        *slot += 1;
    }

    pub fn get(&self, level: &AlertLevel) -> usize {
        match level {
            AlertLevel::NoWarning => self.no_warning,
            AlertLevel::Watch => self.watch,
            AlertLevel::Alert => self.alert,
            AlertLevel::Warning => self.warning,
            AlertLevel::Unknown | AlertLevel::Other(_) => 0,
        }
    }

    pub fn total(&self) -> usize {
        AlertLevel::TIERS.iter().map(|level| self.get(level)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AlertsSummary {
    pub total_alerts: usize,
    pub states_affected: usize,
    pub alert_levels: AlertLevelCounts,
    pub last_updated: Option<String>,
    /// When this summary was generated (RFC 3339)
    pub timestamp: String,
}

/// Summarise `collection`, stamped with the current time.
pub fn summarize(collection: &AlertCollection) -> AlertsSummary {
    summarize_at(collection, Utc::now())
}

/// Summarise `collection`, stamped with `generated_at`.
pub fn summarize_at(collection: &AlertCollection, generated_at: DateTime<Utc>) -> AlertsSummary {
    let mut alert_levels = AlertLevelCounts::default();
    for alert in &collection.alerts {
        alert_levels.record(&alert.alert_level);
    }

    let uncounted = collection.alerts.len() - alert_levels.total();

    if uncounted > 0 {
        tracing::debug!("{} alerts have no recognised level", uncounted);
    }

    AlertsSummary {
        total_alerts: collection.alerts.len(),
        states_affected: collection.alerts_by_state.len(),
        alert_levels,
        last_updated: collection.last_updated.clone(),
        timestamp: generated_at.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::alerts::AlertRecord;

    fn alert(state: &str, level: AlertLevel) -> AlertRecord {
        AlertRecord {
            location: format!("{} town", state),
            state: state.to_string(),
            alert_level: level,
            warning_type: "Rain".to_string(),
            details: String::new(),
            valid_time: None,
            coordinates: None,
        }
    }

    #[test]
    fn test_empty_collection_is_zero_filled() {
        let collection = AlertCollection::new(None, Vec::new());
        let summary = summarize(&collection);
        assert_eq!(summary.total_alerts, 0);
        assert_eq!(summary.states_affected, 0);
        assert_eq!(summary.alert_levels, AlertLevelCounts::default());

        let json = serde_json::to_value(&summary.alert_levels).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"No Warning": 0, "Watch": 0, "Alert": 0, "Warning": 0})
        );
    }

    #[test]
    fn test_counts_per_level() {
        let collection = AlertCollection::new(
            Some("Last Updated: 10:00".to_string()),
            vec![
                alert("Kerala", AlertLevel::Warning),
                alert("Kerala", AlertLevel::Watch),
                alert("Assam", AlertLevel::Warning),
                alert("Goa", AlertLevel::NoWarning),
            ],
        );
        let generated_at = "2026-10-14T08:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let summary = summarize_at(&collection, generated_at);

        assert_eq!(summary.total_alerts, 4);
        assert_eq!(summary.states_affected, 3);
        assert_eq!(summary.alert_levels.warning, 2);
        assert_eq!(summary.alert_levels.watch, 1);
        assert_eq!(summary.alert_levels.no_warning, 1);
        assert_eq!(summary.alert_levels.alert, 0);
        assert_eq!(summary.alert_levels.total(), summary.total_alerts);
        assert_eq!(summary.last_updated.as_deref(), Some("Last Updated: 10:00"));
        assert_eq!(summary.timestamp, "2026-10-14T08:00:00+00:00");
    }

    #[test]
    fn test_unrecognised_levels_count_only_in_total() {
        let collection = AlertCollection::new(
            None,
            vec![
                alert("Bihar", AlertLevel::Unknown),
                alert("Bihar", AlertLevel::Other("Severe".to_string())),
                alert("Bihar", AlertLevel::Alert),
            ],
        );
        let summary = summarize(&collection);
        assert_eq!(summary.total_alerts, 3);
        assert_eq!(summary.alert_levels.total(), 1);
        assert!(summary.alert_levels.total() <= summary.total_alerts);
    }
}
