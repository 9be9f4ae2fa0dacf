/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// JSON file holding the static station directory.
    pub stations_file: String,
    /// Station page URL; `{id}` is replaced with the station ID.
    pub station_url_template: String,
    /// National alerts page URL.
    pub alerts_url: String,
    /// Upstream request timeout in seconds.
    pub request_timeout_secs: u64,
    pub rate_limit_daily: u32,
    pub rate_limit_hourly: u32,
}

const DEFAULT_STATION_URL: &str =
    "https://mausam.imd.gov.in/responsive/stationWiseNowcastGIS.php?id={id}";
const DEFAULT_ALERTS_URL: &str = "https://mausam.imd.gov.in/responsive/stationWiseNowcastGIS.php";

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: parse_env("PORT", 1875),
            stations_file: std::env::var("STATIONS_FILE")
                .unwrap_or_else(|_| "stations.json".to_string()),
            station_url_template: std::env::var("IMD_STATION_URL")
                .unwrap_or_else(|_| DEFAULT_STATION_URL.to_string()),
            alerts_url: std::env::var("IMD_ALERTS_URL")
                .unwrap_or_else(|_| DEFAULT_ALERTS_URL.to_string()),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30),
            rate_limit_daily: parse_env("RATE_LIMIT_DAILY", 1000),
            rate_limit_hourly: parse_env("RATE_LIMIT_HOURLY", 100),
        }
    }
}

/// Read a numeric environment variable, keeping `default` when unset or invalid.
fn parse_env<T: std::str::FromStr + std::fmt::Display + Copy>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("{} has invalid value '{}', using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
