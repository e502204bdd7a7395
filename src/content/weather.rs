//! Current weather from openweathermap.org
//!
//! https://openweathermap.org/current

use super::{ContentGenerator, ContentHandler};
use crate::config::Section;
use async_trait::async_trait;
use chrono::{Datelike, Local, TimeZone};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, warn};

pub const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org";
pub const CONNECT_FAILURE: &str = "Failed to connect to openweathermap.org. ";
pub const READ_FAILURE: &str = "Failed to read openweathermap.org. ";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Beaufort scale in km/h, highest threshold exceeded wins
const BEAUFORT: [(f64, &str); 12] = [
    (1.0, "with light air"),
    (5.0, "with a light breeze"),
    (12.0, "with a gentle breeze"),
    (20.0, "with a moderate breeze"),
    (29.0, "with a fresh breeze"),
    (39.0, "with a strong breeze"),
    (50.0, "with high winds at"),
    (62.0, "with gale force winds at"),
    (75.0, "with a strong gale at"),
    (89.0, "with storm winds at"),
    (103.0, "with violent storm winds at"),
    (118.0, "with hurricane force winds at"),
];

/// Speeds from this threshold on are spoken with their value
const SPOKEN_SPEED_FROM: f64 = 50.0;

/// Qualitative wind description for a speed in km/h
pub fn beaufort_phrase(kmh: f64) -> String {
    if !(kmh > 0.0) {
        return String::new();
    }

    match BEAUFORT.iter().rev().find(|(threshold, _)| kmh > *threshold) {
        None => "and calm".to_string(),
        Some((threshold, phrase)) if *threshold >= SPOKEN_SPEED_FROM => {
            format!("{} {:.0} kilometres per hour", phrase, kmh)
        }
        Some((_, phrase)) => phrase.to_string(),
    }
}

pub fn ms_to_kmh(speed: f64) -> f64 {
    speed * 3.6
}

/// Wind chill for a temperature in Celsius and wind speed in km/h.
/// See https://en.wikipedia.org/wiki/Wind_chill
pub fn wind_chill(temp: f64, kmh: f64) -> f64 {
    let v = kmh.powf(0.16);
    13.12 + 0.6215 * temp - 11.37 * v + 0.3965 * temp * v
}

/// Unix timestamp to a local time suited for speech, like "06:43 AM"
pub fn timestamp_to_time_str(ts: i64) -> Option<String> {
    Local
        .timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.format("%I:%M %p").to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Metric,
    Imperial,
}

impl Units {
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "imperial" => Units::Imperial,
            "metric" => Units::Metric,
            other => {
                warn!("⚠️ Unsupported weather units '{}', using metric", other);
                Units::Metric
            }
        }
    }

    fn api_name(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    main: MainReading,
    weather: Vec<Condition>,
    #[serde(default)]
    wind: Option<Wind>,
    sys: SunTimes,
}

#[derive(Debug, Deserialize)]
struct MainReading {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct Wind {
    #[serde(default)]
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SunTimes {
    sunrise: i64,
    sunset: i64,
}

/// Weather readings in the configured units, wind always in m/s and km/h
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub temp: f64,
    pub conditions: String,
    pub wind_speed_ms: f64,
    pub wind_speed_kmh: f64,
    pub wind_chill: i64,
    pub sunrise: String,
    pub sunset: String,
}

impl WeatherReport {
    fn from_response(response: WeatherResponse, units: Units) -> Option<Self> {
        let conditions = response.weather.into_iter().next()?.description;
        let speed = response.wind.and_then(|w| w.speed).unwrap_or(0.0);
        let (wind_speed_ms, temp_c) = match units {
            Units::Metric => (speed, response.main.temp),
            Units::Imperial => (speed * 0.44704, (response.main.temp - 32.0) * 5.0 / 9.0),
        };
        let wind_speed_kmh = ms_to_kmh(wind_speed_ms);

        let chill_c = wind_chill(temp_c, wind_speed_kmh);
        let chill = match units {
            Units::Metric => chill_c,
            Units::Imperial => chill_c * 9.0 / 5.0 + 32.0,
        };

        Some(Self {
            temp: response.main.temp,
            conditions,
            wind_speed_ms,
            wind_speed_kmh,
            wind_chill: chill.round() as i64,
            sunrise: timestamp_to_time_str(response.sys.sunrise)?,
            sunset: timestamp_to_time_str(response.sys.sunset)?,
        })
    }

    /// Spoken weather for the given month (1-12). The wind chill is only
    /// mentioned from November to March.
    pub fn describe(&self, month: u32) -> String {
        let mut text = format!(
            "Weather for today is {}. It is currently {} degrees",
            self.conditions,
            self.temp.trunc() as i64
        );

        let gust = beaufort_phrase(self.wind_speed_kmh);
        if !gust.is_empty() {
            text.push(' ');
            text.push_str(&gust);
        }
        text.push_str(". ");

        if self.wind_speed_ms > 5.0 && !(4..=10).contains(&month) {
            text.push_str(&format!(
                "There is a wind chill of {} degrees. ",
                self.wind_chill
            ));
        }

        text.push_str(&format!(
            "The sun rises at {} and sets at {}.",
            self.sunrise, self.sunset
        ));
        text
    }
}

/// Why a weather report could not be produced
#[derive(Debug)]
pub enum FetchError {
    /// The service could not be reached
    Connect(String),
    /// The response was not a usable weather report
    Read(String),
}

#[derive(Debug)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    credentials: Option<String>,
    city_id: Option<String>,
    units: Units,
}

impl OpenWeatherClient {
    pub fn new(section: &Section<ContentHandler>) -> Self {
        Self {
            client: Client::new(),
            base_url: section.get_str_or("base_url", DEFAULT_BASE_URL),
            credentials: section.get_str("credentials").filter(|s| !s.is_empty()),
            city_id: section.get_str("city_id").filter(|s| !s.is_empty()),
            units: Units::parse(&section.get_str_or("units", "metric")),
        }
    }

    /// Fetch and convert current conditions
    pub async fn fetch(&self) -> Result<WeatherReport, FetchError> {
        let (Some(key), Some(city_id)) = (&self.credentials, &self.city_id) else {
            return Err(FetchError::Read(
                "credentials and city_id are required".to_string(),
            ));
        };

        let url = format!("{}/data/2.5/weather", self.base_url.trim_end_matches('/'));
        let body = self
            .client
            .get(&url)
            .query(&[
                ("appid", key.as_str()),
                ("id", city_id.as_str()),
                ("units", self.units.api_name()),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| FetchError::Connect(e.to_string()))?
            .text()
            .await
            .map_err(|e| FetchError::Connect(e.to_string()))?;

        debug!("🌦️ Weather response: {}", body);

        let response: WeatherResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Read(e.to_string()))?;
        WeatherReport::from_response(response, self.units)
            .ok_or_else(|| FetchError::Read("incomplete weather data".to_string()))
    }
}

#[async_trait]
impl ContentGenerator for OpenWeatherClient {
    async fn generate(&self) -> String {
        match self.fetch().await {
            Ok(report) => report.describe(Local::now().month()),
            Err(FetchError::Connect(e)) => {
                error!("❌ Weather request failed: {}", e);
                CONNECT_FAILURE.to_string()
            }
            Err(FetchError::Read(e)) => {
                warn!("⚠️ Could not read weather response: {}", e);
                READ_FAILURE.to_string()
            }
        }
    }

    fn name(&self) -> &str {
        "openweather"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beaufort_ladder_around_each_breakpoint() {
        let ladder = [
            (1.0, "and calm", "with light air"),
            (5.0, "with light air", "with a light breeze"),
            (12.0, "with a light breeze", "with a gentle breeze"),
            (20.0, "with a gentle breeze", "with a moderate breeze"),
            (29.0, "with a moderate breeze", "with a fresh breeze"),
            (39.0, "with a fresh breeze", "with a strong breeze"),
            (50.0, "with a strong breeze", "with high winds at"),
            (62.0, "with high winds at", "with gale force winds at"),
            (75.0, "with gale force winds at", "with a strong gale at"),
            (89.0, "with a strong gale at", "with storm winds at"),
            (103.0, "with storm winds at", "with violent storm winds at"),
            (118.0, "with violent storm winds at", "with hurricane force winds at"),
        ];

        for (breakpoint, at, above) in ladder {
            assert!(
                beaufort_phrase(breakpoint - 0.5).starts_with(at),
                "{} km/h gave '{}'",
                breakpoint - 0.5,
                beaufort_phrase(breakpoint - 0.5)
            );
            assert!(
                beaufort_phrase(breakpoint).starts_with(at),
                "{} km/h gave '{}'",
                breakpoint,
                beaufort_phrase(breakpoint)
            );
            assert!(
                beaufort_phrase(breakpoint + 0.5).starts_with(above),
                "{} km/h gave '{}'",
                breakpoint + 0.5,
                beaufort_phrase(breakpoint + 0.5)
            );
        }
    }

    #[test]
    fn test_beaufort_calm_and_absent() {
        assert_eq!(beaufort_phrase(0.5), "and calm");
        assert_eq!(beaufort_phrase(0.0), "");
        assert_eq!(beaufort_phrase(f64::NAN), "");
    }

    #[test]
    fn test_strong_winds_include_speed() {
        assert_eq!(
            beaufort_phrase(64.8),
            "with gale force winds at 65 kilometres per hour"
        );
        assert_eq!(beaufort_phrase(25.0), "with a moderate breeze");
    }

    #[test]
    fn test_wind_chill() {
        // -10 °C at 20 km/h is about -18 °C
        assert_eq!(wind_chill(-10.0, 20.0).round(), -18.0);
        assert!((ms_to_kmh(10.0) - 36.0).abs() < f64::EPSILON);
    }

    fn report(wind_speed_ms: f64) -> WeatherReport {
        WeatherReport {
            temp: -3.7,
            conditions: "light snow".to_string(),
            wind_speed_ms,
            wind_speed_kmh: ms_to_kmh(wind_speed_ms),
            wind_chill: -11,
            sunrise: "08:51 AM".to_string(),
            sunset: "03:32 PM".to_string(),
        }
    }

    #[test]
    fn test_wind_chill_only_in_winter() {
        let windy = report(7.0);
        assert!(windy.describe(1).contains("There is a wind chill of -11 degrees."));
        assert!(windy.describe(11).contains("wind chill"));
        assert!(!windy.describe(7).contains("wind chill"));

        let still = report(3.0);
        assert!(!still.describe(1).contains("wind chill"));
    }

    #[test]
    fn test_describe_layout() {
        let text = report(7.0).describe(6);
        assert_eq!(
            text,
            "Weather for today is light snow. It is currently -3 degrees with a moderate breeze. \
             The sun rises at 08:51 AM and sets at 03:32 PM."
        );
    }

    #[test]
    fn test_report_requires_conditions() {
        let response: WeatherResponse = serde_json::from_value(serde_json::json!({
            "main": { "temp": 4.0 },
            "weather": [],
            "sys": { "sunrise": 1_700_000_000, "sunset": 1_700_030_000 }
        }))
        .unwrap();
        assert!(WeatherReport::from_response(response, Units::Metric).is_none());
    }

    #[test]
    fn test_imperial_units_converted() {
        let response: WeatherResponse = serde_json::from_value(serde_json::json!({
            "main": { "temp": 41.0 },
            "weather": [{ "description": "overcast clouds" }],
            "wind": { "speed": 20.0 },
            "sys": { "sunrise": 1_700_000_000, "sunset": 1_700_030_000 }
        }))
        .unwrap();
        let report = WeatherReport::from_response(response, Units::Imperial).unwrap();

        assert_eq!(report.temp, 41.0);
        assert!((report.wind_speed_ms - 8.9408).abs() < 1e-6);
        assert!((report.wind_speed_kmh - 32.18688).abs() < 1e-6);
        // 5 C at 32 km/h is about -0.1 C, spoken back in Fahrenheit
        assert_eq!(report.wind_chill, 32);

        let text = report.describe(1);
        assert!(text.starts_with(
            "Weather for today is overcast clouds. It is currently 41 degrees with a fresh breeze. "
        ));
        assert!(text.contains("There is a wind chill of 32 degrees. "));
    }
}
