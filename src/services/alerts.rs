//! National alert extraction.
//!
//! Alerts are read from the inline marker array the map script embeds. When no
//! script yields any alert, the HTML alert table is used instead. Broken
//! markers or rows are skipped; extraction itself never fails.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::helpers::BestEffort;
use crate::services::document::{element_text, row_cells, Document};
use crate::services::literal::parse_loose_array;

/// State/group name used when an alert carries none.
pub const UNKNOWN_STATE: &str = "Unknown";

/// Script variables that may hold the marker array, highest priority first.
pub const MARKER_VARIABLES: &[&str] = &["markers", "points", "locations"];

/// Colour keywords and the level they denote. The first keyword found in the
/// style text wins.
pub static COLOR_LEVELS: [(&str, AlertLevel); 4] = [
    ("green", AlertLevel::NoWarning),
    ("yellow", AlertLevel::Watch),
    ("orange", AlertLevel::Alert),
    ("red", AlertLevel::Warning),
];

static MARKER_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    MARKER_VARIABLES
        .iter()
        .map(|name| {
            let pattern = format!(r"(?s)\b(?:var|let|const)\s+{}\s*=\s*(\[.*?\]);", name);
            (*name, Regex::new(&pattern).expect("valid marker pattern"))
        })
        .collect()
});
static LAST_UPDATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Last Updated.*").expect("valid pattern"));

static SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("valid selector"));
static ALERT_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.table, table.alert-table").expect("valid selector"));
static TR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("valid selector"));
static TD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("valid selector"));
static DIV: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div").expect("valid selector"));

/// Alert severity tier.
///
/// Marker data carries its level as free text; labels outside the four tiers
/// are kept verbatim in `Other` and count towards no tier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AlertLevel {
    NoWarning,
    Watch,
    Alert,
    Warning,
    Unknown,
    Other(String),
}

impl AlertLevel {
    /// The four recognised tiers, least to most severe.
    pub const TIERS: [AlertLevel; 4] = [
        AlertLevel::NoWarning,
        AlertLevel::Watch,
        AlertLevel::Alert,
        AlertLevel::Warning,
    ];

    /// Interpret a level label exactly as written.
    pub fn from_label(label: &str) -> Self {
        match label {
            "No Warning" => AlertLevel::NoWarning,
            "Watch" => AlertLevel::Watch,
            "Alert" => AlertLevel::Alert,
            "Warning" => AlertLevel::Warning,
            "Unknown" => AlertLevel::Unknown,
            other => AlertLevel::Other(other.to_string()),
        }
    }

    /// Map a colour/class/style string to a level via [`COLOR_LEVELS`].
    pub fn from_color(color: &str) -> Self {
        let color = color.trim().to_lowercase();
        COLOR_LEVELS
            .iter()
            .find(|(keyword, _)| color.contains(keyword))
            .map(|(_, level)| level.clone())
            .unwrap_or(AlertLevel::Unknown)
    }

    pub fn as_str(&self) -> &str {
        match self {
            AlertLevel::NoWarning => "No Warning",
            AlertLevel::Watch => "Watch",
            AlertLevel::Alert => "Alert",
            AlertLevel::Warning => "Warning",
            AlertLevel::Unknown => "Unknown",
            AlertLevel::Other(label) => label,
        }
    }
}

impl Serialize for AlertLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// One alert for one location.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AlertRecord {
    pub location: String,
    pub state: String,
    /// "No Warning", "Watch", "Alert", "Warning" or "Unknown"
    #[schema(value_type = String)]
    pub alert_level: AlertLevel,
    pub warning_type: String,
    pub details: String,
    pub valid_time: Option<String>,
    /// Present for alerts read from map markers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// Alerts grouped by state, in order of each state's first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateGroups(Vec<(String, Vec<AlertRecord>)>);

impl StateGroups {
    pub fn from_alerts(alerts: &[AlertRecord]) -> Self {
        let mut groups: Vec<(String, Vec<AlertRecord>)> = Vec::new();
        for alert in alerts {
            let state = if alert.state.is_empty() {
                UNKNOWN_STATE
            } else {
                alert.state.as_str()
            };
            match groups.iter_mut().find(|(name, _)| name == state) {
                Some((_, members)) => members.push(alert.clone()),
                None => groups.push((state.to_string(), vec![alert.clone()])),
            }
        }
        Self(groups)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AlertRecord])> {
        self.0
            .iter()
            .map(|(name, alerts)| (name.as_str(), alerts.as_slice()))
    }

    /// Case-insensitive lookup; returns the stored state name with its alerts.
    pub fn get_ignore_case(&self, state: &str) -> Option<(&str, &[AlertRecord])> {
        let wanted = state.trim().to_lowercase();
        self.iter().find(|(name, _)| name.to_lowercase() == wanted)
    }
}

impl Serialize for StateGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (state, alerts) in &self.0 {
            map.serialize_entry(state, alerts)?;
        }
        map.end()
    }
}

/// Where the alerts of a collection were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSource {
    Markers(&'static str),
    Table,
    None,
}

/// Every alert on the national alerts page.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AlertCollection {
    /// "Last Updated ..." banner text, if present
    pub last_updated: Option<String>,
    pub alerts: Vec<AlertRecord>,
    /// Alerts keyed by state, in first-seen order
    #[schema(value_type = Object)]
    pub alerts_by_state: StateGroups,
    pub total_alerts: usize,
    pub states_affected: usize,
    #[serde(skip)]
    pub skipped_records: usize,
    #[serde(skip)]
    pub source: AlertSource,
}

impl AlertCollection {
    pub fn new(last_updated: Option<String>, alerts: Vec<AlertRecord>) -> Self {
        let alerts_by_state = StateGroups::from_alerts(&alerts);
        Self {
            last_updated,
            total_alerts: alerts.len(),
            states_affected: alerts_by_state.len(),
            alerts,
            alerts_by_state,
            skipped_records: 0,
            source: AlertSource::None,
        }
    }
}

/// Extract all alerts from the national alerts page.
pub fn extract_alerts(html: &str) -> AlertCollection {
    let doc = Document::parse(html);

    let (alerts, skipped, source) = match alerts_from_scripts(&doc) {
        Some((name, collector)) if !collector.is_empty() => {
            let (alerts, skipped) = collector.into_parts();
            (alerts, skipped, AlertSource::Markers(name))
        }
        script_result => {
            let script_skips = script_result.map(|(_, c)| c.skipped()).unwrap_or(0);
            match alerts_from_table(&doc) {
                Some(collector) => {
                    let (alerts, skipped) = collector.into_parts();
                    (alerts, skipped + script_skips, AlertSource::Table)
                }
                None => (Vec::new(), script_skips, AlertSource::None),
            }
        }
    };

    let last_updated = doc
        .find_element_with_own_text(&DIV, &LAST_UPDATED)
        .map(element_text);

    let mut collection = AlertCollection::new(last_updated, alerts);
    collection.skipped_records = skipped;
    collection.source = source;

    if collection.alerts_by_state.is_empty() {
        tracing::warn!("No alerts found on the alerts page");
    }

    tracing::debug!(
        "Successfully extracted {} alerts from {} states ({} skipped, source {:?})",
        collection.total_alerts,
        collection.states_affected,
        collection.skipped_records,
        collection.source
    );

    collection
}

/// Scan inline scripts for the first parseable marker array.
///
/// Scripts are tried in document order and variables in [`MARKER_VARIABLES`]
/// order; the first array that parses ends the scan, even if every marker in
/// it is rejected.
fn alerts_from_scripts(doc: &Document) -> Option<(&'static str, BestEffort<AlertRecord>)> {
    for script in doc.select_all(&SCRIPT) {
        let source = element_text(script);
        if source.is_empty() {
            continue;
        }

        for (name, pattern) in MARKER_PATTERNS.iter() {
            let Some(captures) = pattern.captures(&source) else {
                continue;
            };
            match parse_loose_array(&captures[1]) {
                Ok(markers) => {
                    let mut collector = BestEffort::new("markers");
                    for marker in &markers {
                        collector.collect(alert_from_marker(marker));
                    }
                    return Some((*name, collector));
                }
                Err(e) => tracing::error!("Error parsing `{}` map data: {}", name, e),
            }
        }
    }
    None
}

fn alert_from_marker(marker: &Value) -> Result<AlertRecord, &'static str> {
    let fields = marker.as_object().ok_or("marker is not an object")?;

    let location = text_field(fields, "location");
    if location.is_empty() {
        return Err("marker has no location");
    }

    let state = match text_field(fields, "state") {
        s if s.is_empty() => UNKNOWN_STATE.to_string(),
        s => s,
    };

    let alert_level = match fields.get("alertLevel") {
        None | Some(Value::Null) => AlertLevel::Unknown,
        Some(Value::String(label)) => AlertLevel::from_label(label),
        Some(other) => AlertLevel::Other(other.to_string()),
    };

    Ok(AlertRecord {
        location,
        state,
        alert_level,
        warning_type: text_field(fields, "warningType"),
        details: text_field(fields, "description"),
        valid_time: Some(text_field(fields, "validTime")),
        coordinates: Some(Coordinates {
            lat: number_field(fields, "lat"),
            lng: number_field(fields, "lng"),
        }),
    })
}

/// Trimmed string value of `key`; numbers and booleans are stringified.
fn text_field(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
        _ => String::new(),
    }
}

/// Float value of `key`, accepting numeric strings; 0 when absent or invalid.
fn number_field(fields: &Map<String, Value>, key: &str) -> f64 {
    match fields.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Read alerts from the alert table, skipping its header row.
fn alerts_from_table(doc: &Document) -> Option<BestEffort<AlertRecord>> {
    let table = doc.select_first(&ALERT_TABLE)?;
    let mut collector = BestEffort::new("alert table");

    for row in table.select(&TR).skip(1) {
        let cells = row_cells(row, &TD);
        if cells.len() < 3 {
            collector.skip(format!("row has {} cells", cells.len()));
            continue;
        }
        collector.push(alert_from_row(&cells));
    }
    Some(collector)
}

fn alert_from_row(cells: &[ElementRef<'_>]) -> AlertRecord {
    let color = cells
        .iter()
        .filter_map(|cell| cell.value().attr("style"))
        .find(|style| style.to_lowercase().contains("background"))
        .unwrap_or("");

    AlertRecord {
        location: element_text(cells[0]),
        state: UNKNOWN_STATE.to_string(),
        alert_level: AlertLevel::from_color(color),
        warning_type: element_text(cells[1]),
        details: element_text(cells[2]),
        valid_time: cells.get(3).map(|cell| element_text(*cell)),
        coordinates: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> String {
        format!("<html><head></head><body>{}</body></html>", body)
    }

    #[test]
    fn test_color_mapping() {
        assert_eq!(
            AlertLevel::from_color("Background: RED; color:#fff"),
            AlertLevel::Warning
        );
        assert_eq!(
            AlertLevel::from_color("background-color: Orange"),
            AlertLevel::Alert
        );
        assert_eq!(AlertLevel::from_color("bg-yellow"), AlertLevel::Watch);
        assert_eq!(AlertLevel::from_color(" GREEN "), AlertLevel::NoWarning);
        assert_eq!(AlertLevel::from_color("background: #ff00ff"), AlertLevel::Unknown);
        assert_eq!(AlertLevel::from_color(""), AlertLevel::Unknown);
    }

    #[test]
    fn test_color_first_keyword_wins() {
        // Table order is green, yellow, orange, red.
        assert_eq!(
            AlertLevel::from_color("red border, green fill"),
            AlertLevel::NoWarning
        );
    }

    #[test]
    fn test_level_labels_round_trip_verbatim() {
        assert_eq!(AlertLevel::from_label("No Warning"), AlertLevel::NoWarning);
        assert_eq!(
            AlertLevel::from_label("warning"),
            AlertLevel::Other("warning".to_string())
        );
        assert_eq!(
            serde_json::to_value(AlertLevel::Other("Severe".to_string())).unwrap(),
            "Severe"
        );
        assert_eq!(serde_json::to_value(AlertLevel::NoWarning).unwrap(), "No Warning");
    }

    #[test]
    fn test_single_marker() {
        let html = page(
            "<script>var markers = [{location:'X', state:'Y', alertLevel:'Warning', lat:10, lng:20}];</script>",
        );
        let collection = extract_alerts(&html);

        assert_eq!(collection.source, AlertSource::Markers("markers"));
        assert_eq!(collection.total_alerts, 1);
        let alert = &collection.alerts[0];
        assert_eq!(alert.location, "X");
        assert_eq!(alert.state, "Y");
        assert_eq!(alert.alert_level, AlertLevel::Warning);
        assert_eq!(alert.coordinates, Some(Coordinates { lat: 10.0, lng: 20.0 }));
        assert_eq!(alert.valid_time.as_deref(), Some(""));
    }

    #[test]
    fn test_markers_take_priority_over_points() {
        let html = page(
            r#"<script>
                var points = [{location: 'From points', state: 'P'}];
                var markers = [{location: 'From markers', state: 'M'}];
            </script>"#,
        );
        let collection = extract_alerts(&html);
        assert_eq!(collection.source, AlertSource::Markers("markers"));
        assert_eq!(collection.alerts.len(), 1);
        assert_eq!(collection.alerts[0].location, "From markers");
    }

    #[test]
    fn test_first_matching_script_ends_scan() {
        let html = page(
            r#"<script>var a = 1;</script>
               <script>let locations = [{location: 'First', state: 'A'}];</script>
               <script>var markers = [{location: 'Second', state: 'B'}];</script>"#,
        );
        let collection = extract_alerts(&html);
        assert_eq!(collection.source, AlertSource::Markers("locations"));
        assert_eq!(collection.alerts.len(), 1);
        assert_eq!(collection.alerts[0].location, "First");
    }

    #[test]
    fn test_broken_literal_falls_through_to_next_pattern() {
        let html = page(
            r#"<script>
                var markers = [{location: 'Broken', lat: }];
                var points = [{location: 'Good', state: 'Kerala'}];
            </script>"#,
        );
        let collection = extract_alerts(&html);
        assert_eq!(collection.source, AlertSource::Markers("points"));
        assert_eq!(collection.alerts[0].location, "Good");
    }

    #[test]
    fn test_marker_field_mapping() {
        let html = page(
            r#"<script>
            var markers = [
              {
                location: '  Chennai ',
                state: 'Tamil Nadu',
                alertLevel: 'Orange-ish',
                warningType: ' Heavy Rain ',
                description: 'Heavy rain at\nisolated places',
                validTime: 'till 0830 IST',
                lat: '13.08',
                lng: 'n/a'
              },
              {location: '', state: 'Skipped'},
              {state: 'Also skipped'},
              'not an object'
            ];
            </script>"#,
        );
        let collection = extract_alerts(&html);

        assert_eq!(collection.total_alerts, 1);
        assert_eq!(collection.skipped_records, 3);
        let alert = &collection.alerts[0];
        assert_eq!(alert.location, "Chennai");
        assert_eq!(alert.alert_level, AlertLevel::Other("Orange-ish".to_string()));
        assert_eq!(alert.warning_type, "Heavy Rain");
        assert_eq!(alert.details, "Heavy rain at\nisolated places");
        assert_eq!(alert.valid_time.as_deref(), Some("till 0830 IST"));
        assert_eq!(alert.coordinates, Some(Coordinates { lat: 13.08, lng: 0.0 }));
    }

    #[test]
    fn test_missing_level_and_state_default_to_unknown() {
        let html = page("<script>var markers = [{location: 'Leh'}];</script>");
        let collection = extract_alerts(&html);
        assert_eq!(collection.alerts[0].alert_level, AlertLevel::Unknown);
        assert_eq!(collection.alerts[0].state, UNKNOWN_STATE);
        let (name, _) = collection.alerts_by_state.get_ignore_case("unknown").unwrap();
        assert_eq!(name, UNKNOWN_STATE);
    }

    #[test]
    fn test_table_fallback() {
        let html = page(
            r#"<table class="alert-table">
                 <tr><th>Location</th><th>Type</th><th>Details</th></tr>
                 <tr><td>Loc</td><td style="background:orange">Thunderstorm</td><td>Gusty winds</td></tr>
                 <tr><td>Pune</td><td>Rain</td><td>Light rain</td><td>till 18:00</td></tr>
                 <tr><td>Too short</td><td>x</td></tr>
               </table>"#,
        );
        let collection = extract_alerts(&html);

        assert_eq!(collection.source, AlertSource::Table);
        assert_eq!(collection.total_alerts, 2);
        assert_eq!(collection.skipped_records, 1);

        let first = &collection.alerts[0];
        assert_eq!(first.location, "Loc");
        assert_eq!(first.alert_level, AlertLevel::Alert);
        assert_eq!(first.warning_type, "Thunderstorm");
        assert_eq!(first.details, "Gusty winds");
        assert_eq!(first.valid_time, None);
        assert_eq!(first.coordinates, None);

        let second = &collection.alerts[1];
        assert_eq!(second.alert_level, AlertLevel::Unknown);
        assert_eq!(second.valid_time.as_deref(), Some("till 18:00"));
        assert_eq!(collection.alerts_by_state.len(), 1);
    }

    #[test]
    fn test_table_rows_keep_empty_locations() {
        let html = page(
            r#"<table class="table">
                 <tr><td>header</td></tr>
                 <tr><td></td><td>Fog</td><td>Dense fog</td></tr>
               </table>"#,
        );
        let collection = extract_alerts(&html);
        assert_eq!(collection.total_alerts, 1);
        assert_eq!(collection.alerts[0].location, "");
    }

    #[test]
    fn test_markers_with_no_valid_records_fall_back_to_table() {
        let html = page(
            r#"<script>var markers = [{location: ''}];</script>
               <table class="table">
                 <tr><th>h</th></tr>
                 <tr><td>Goa</td><td>Rain</td><td>Heavy</td></tr>
               </table>"#,
        );
        let collection = extract_alerts(&html);
        assert_eq!(collection.source, AlertSource::Table);
        assert_eq!(collection.alerts[0].location, "Goa");
        assert_eq!(collection.skipped_records, 1);
    }

    #[test]
    fn test_empty_page() {
        let collection = extract_alerts("");
        assert_eq!(collection.source, AlertSource::None);
        assert_eq!(collection.total_alerts, 0);
        assert_eq!(collection.states_affected, 0);
        assert!(collection.alerts_by_state.is_empty());
        assert_eq!(collection.last_updated, None);
    }

    #[test]
    fn test_last_updated() {
        let html = page(
            r#"<div class="banner"><div>  Last Updated: 14 Oct 2026 10:00 IST </div></div>"#,
        );
        let collection = extract_alerts(&html);
        assert_eq!(
            collection.last_updated.as_deref(),
            Some("Last Updated: 14 Oct 2026 10:00 IST")
        );
    }

    #[test]
    fn test_grouping_preserves_first_seen_order() {
        let html = page(
            r#"<script>var markers = [
                {location: 'a', state: 'Kerala'},
                {location: 'b', state: 'Assam'},
                {location: 'c', state: 'Kerala'},
                {location: 'd'}
            ];</script>"#,
        );
        let collection = extract_alerts(&html);
        let states: Vec<&str> = collection.alerts_by_state.iter().map(|(s, _)| s).collect();
        assert_eq!(states, vec!["Kerala", "Assam", UNKNOWN_STATE]);

        let grouped: usize = collection
            .alerts_by_state
            .iter()
            .map(|(_, alerts)| alerts.len())
            .sum();
        assert_eq!(grouped, collection.alerts.len());
        assert_eq!(collection.states_affected, collection.alerts_by_state.len());

        let (_, kerala) = collection.alerts_by_state.get_ignore_case("Kerala").unwrap();
        assert_eq!(kerala[0].location, "a");
        assert_eq!(kerala[1].location, "c");

        let (name, _) = collection.alerts_by_state.get_ignore_case(" kerala").unwrap();
        assert_eq!(name, "Kerala");
    }

    #[test]
    fn test_serialized_shape() {
        let html = page(
            "<script>var markers = [{location:'X', state:'Y', alertLevel:'Watch', lat:1, lng:2}];</script>",
        );
        let value = serde_json::to_value(extract_alerts(&html)).unwrap();
        assert_eq!(value["total_alerts"], 1);
        assert_eq!(value["states_affected"], 1);
        assert_eq!(value["alerts_by_state"]["Y"][0]["alert_level"], "Watch");
        assert_eq!(value["alerts"][0]["coordinates"]["lat"], 1.0);
        assert!(value.get("skipped_records").is_none());
    }
}
