//! Station weather extraction.
//!
//! Turns one station page into a [`WeatherReading`]. Values are located by
//! their label text (see [`LabelSet`]); a missing label degrades to `"0"`
//! instead of failing the page. Only a page without the main data table is an
//! error.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use scraper::Selector;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::helpers::{safe_float, BestEffort};
use crate::services::document::{
    element_text, enclosing_cell, enclosing_row, next_sibling_cell, row_cells, Document,
};

/// Number of forecast days published per station.
pub const FORECAST_DAYS: u8 = 7;

/// Value used for any label that cannot be found on the page.
const MISSING_VALUE: &str = "0";

static MAIN_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.table").expect("valid selector"));
static TD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("valid selector"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Weather data table not found")]
    MissingTable,
}

/// Label patterns used to locate each station field.
///
/// Patterns are regular expressions matched case-insensitively against text
/// nodes. `forecast_day` is matched case-sensitively with `{n}` replaced by
/// the day number.
#[derive(Debug, Clone)]
pub struct LabelSet {
    pub max_temperature: String,
    pub min_temperature: String,
    pub max_departure: String,
    pub min_departure: String,
    pub humidity_morning: String,
    pub humidity_evening: String,
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: String,
    pub moonset: String,
    pub forecast_day: String,
}

impl Default for LabelSet {
    fn default() -> Self {
        Self {
            max_temperature: "Maximum Temperature".to_string(),
            min_temperature: "Minimum Temperature".to_string(),
            max_departure: "Departure from Normal Max".to_string(),
            min_departure: "Departure from Normal Min".to_string(),
            humidity_morning: "Relative Humidity.*0830".to_string(),
            humidity_evening: "Relative Humidity.*1730".to_string(),
            sunrise: "Sunrise".to_string(),
            sunset: "Sunset".to_string(),
            moonrise: "Moonrise".to_string(),
            moonset: "Moonset".to_string(),
            forecast_day: "Day {n}".to_string(),
        }
    }
}

/// A measured value and its departure from the climatological normal.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TemperatureValue {
    pub value: f64,
    pub departure: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Temperature {
    pub max: TemperatureValue,
    pub min: TemperatureValue,
}

/// Relative humidity at 0830 (morning) and 1730 (evening), in percent.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Humidity {
    pub morning: f64,
    pub evening: f64,
}

/// Rise/set times as printed on the page.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Astronomical {
    pub sunrise: String,
    pub sunset: String,
    pub moonrise: String,
    pub moonset: String,
}

/// One row of the multi-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ForecastDay {
    /// Day number, 1..=7
    pub day: u8,
    pub date: String,
    pub min: f64,
    pub max: f64,
    pub condition: String,
}

/// Current weather for one station.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WeatherReading {
    pub temperature: Temperature,
    pub humidity: Humidity,
    pub astronomical: Astronomical,
    /// Forecast days that could be read, in day order
    pub forecast: Vec<ForecastDay>,
    /// Forecast days that were absent or malformed
    #[serde(skip)]
    pub skipped_forecast_days: usize,
}

/// Extract a station's weather using the default [`LabelSet`].
pub fn extract_station_weather(html: &str) -> Result<WeatherReading, ExtractError> {
    extract_station_weather_with(html, &LabelSet::default())
}

/// Extract a station's weather, locating fields with `labels`.
pub fn extract_station_weather_with(
    html: &str,
    labels: &LabelSet,
) -> Result<WeatherReading, ExtractError> {
    let doc = Document::parse(html);

    if doc.select_first(&MAIN_TABLE).is_none() {
        tracing::error!("No table found in the response");
        return Err(ExtractError::MissingTable);
    }

    let number = |pattern: &str| safe_float(&find_value_by_label(&doc, pattern), 0.0);

    let temperature = Temperature {
        max: TemperatureValue {
            value: number(&labels.max_temperature),
            departure: number(&labels.max_departure),
        },
        min: TemperatureValue {
            value: number(&labels.min_temperature),
            departure: number(&labels.min_departure),
        },
    };

    let humidity = Humidity {
        morning: number(&labels.humidity_morning),
        evening: number(&labels.humidity_evening),
    };

    let astronomical = Astronomical {
        sunrise: find_value_by_label(&doc, &labels.sunrise),
        sunset: find_value_by_label(&doc, &labels.sunset),
        moonrise: find_value_by_label(&doc, &labels.moonrise),
        moonset: find_value_by_label(&doc, &labels.moonset),
    };

    let mut forecast = BestEffort::new("forecast");
    for day in 1..=FORECAST_DAYS {
        forecast.collect(forecast_day(&doc, &labels.forecast_day, day));
    }
    if forecast.is_empty() {
        tracing::warn!("No forecast data found");
    }
    let (forecast, skipped_forecast_days) = forecast.into_parts();

    tracing::debug!(
        "Extracted station weather with {} forecast days ({} skipped)",
        forecast.len(),
        skipped_forecast_days
    );

    Ok(WeatherReading {
        temperature,
        humidity,
        astronomical,
        forecast,
        skipped_forecast_days,
    })
}

/// Trimmed text of the cell following the first label matching `pattern`,
/// or `"0"` when the label or its value cell is missing.
fn find_value_by_label(doc: &Document, pattern: &str) -> String {
    let regex = match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(regex) => regex,
        Err(e) => {
            tracing::error!("Invalid label pattern '{}': {}", pattern, e);
            return MISSING_VALUE.to_string();
        }
    };

    doc.find_text_matching(&regex)
        .and_then(enclosing_cell)
        .and_then(next_sibling_cell)
        .map(element_text)
        .unwrap_or_else(|| {
            tracing::debug!("No value found for label '{}'", pattern);
            MISSING_VALUE.to_string()
        })
}

fn forecast_day(doc: &Document, template: &str, day: u8) -> Result<ForecastDay, String> {
    let pattern = template.replace("{n}", &day.to_string());
    let regex = Regex::new(&pattern).map_err(|e| format!("day {}: {}", day, e))?;

    let label = doc
        .find_text_matching(&regex)
        .ok_or_else(|| format!("day {}: label not found", day))?;
    let row = enclosing_row(label).ok_or_else(|| format!("day {}: label not in a row", day))?;

    let cells = row_cells(row, &TD);
    if cells.len() < 4 {
        return Err(format!("day {}: only {} cells", day, cells.len()));
    }

    Ok(ForecastDay {
        day,
        date: element_text(cells[0]),
        min: safe_float(&element_text(cells[1]), 0.0),
        max: safe_float(&element_text(cells[2]), 0.0),
        condition: element_text(cells[3]),
    })
}
