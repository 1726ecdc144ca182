/*
 *  weather/client.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  OpenWeatherMap current weather and 5 day / 3 hour forecast client
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::time::Duration;

use chrono::NaiveDateTime;
use log::{debug, info};
use reqwest::{header, Client};
use serde::Deserialize;

use crate::condition::ConditionCode;
use crate::config::WeatherConfig;
use crate::weather::{ConditionSource, FetchError};

const CURRENT_ENDPOINT: &str = "weather";
const FORECAST_ENDPOINT: &str = "forecast";

// see https://openweathermap.org/weather-conditions
#[derive(Debug, Clone, Deserialize)]
struct Weather {
    main: String,
    #[serde(default)]
    description: String,
}

// see https://openweathermap.org/current
#[derive(Debug, Deserialize)]
struct CurrentWeatherResult {
    #[serde(default)]
    weather: Vec<Weather>,
}

// see https://openweathermap.org/forecast5
#[derive(Debug, Deserialize)]
struct ForecastResult {
    #[serde(default)]
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    #[serde(default)]
    weather: Vec<Weather>,
    #[serde(default)]
    dt_txt: String,
}

/// One forecast step as reported by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastStep {
    pub condition: ConditionCode,
    /// Start of the 3 hour window (UTC), when the provider sent one
    pub time: Option<NaiveDateTime>,
}

/// First weather entry of a current-weather document.
pub fn parse_current(body: &str) -> Result<ConditionCode, FetchError> {
    let result: CurrentWeatherResult = serde_json::from_str(body)?;
    let first = result
        .weather
        .first()
        .ok_or_else(|| FetchError::MissingData("current result has no weather entry".into()))?;
    debug!("current: {} ({})", first.main, first.description);
    Ok(ConditionCode::parse(&first.main))
}

/// Forecast entries `1..=steps` of a forecast document.
///
/// Entry 0 is the window already in progress and is skipped.
pub fn parse_forecast(body: &str, steps: usize) -> Result<Vec<ForecastStep>, FetchError> {
    let result: ForecastResult = serde_json::from_str(body)?;
    if result.list.len() <= steps {
        return Err(FetchError::MissingData(format!(
            "forecast has {} entries, need {}",
            result.list.len(),
            steps + 1
        )));
    }

    result.list[1..=steps]
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let first = entry.weather.first().ok_or_else(|| {
                FetchError::MissingData(format!("forecast entry {} has no weather entry", i + 1))
            })?;
            Ok(ForecastStep {
                condition: ConditionCode::parse(&first.main),
                time: NaiveDateTime::parse_from_str(&entry.dt_txt, "%Y-%m-%d %H:%M:%S").ok(),
            })
        })
        .collect()
}

/// OpenWeatherMap client. No retries: a failed call fails the cycle.
#[derive(Debug)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    lat: f64,
    lon: f64,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, FetchError> {
        const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(VERSION));
        headers.insert("Accept", header::HeaderValue::from_static("application/json"));
        headers.insert("Connection", header::HeaderValue::from_static("close"));

        let timeout = Duration::from_millis(config.timeout_ms);
        let client = Client::builder()
            .connect_timeout(timeout.min(Duration::from_secs(3)))
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            lat: config.lat,
            lon: config.lon,
        })
    }

    async fn get(&self, endpoint: &str) -> Result<String, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let lat = self.lat.to_string();
        let lon = self.lon.to_string();
        let params = [
            ("APPID", self.api_key.as_str()),
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
        ];

        let response = self.client.get(&url).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    /// Forecast steps with their timestamps
    pub async fn forecast_steps(&self, steps: usize) -> Result<Vec<ForecastStep>, FetchError> {
        let body = self.get(FORECAST_ENDPOINT).await?;
        parse_forecast(&body, steps)
    }
}

impl ConditionSource for WeatherClient {
    fn name(&self) -> &str {
        "openweathermap"
    }

    async fn fetch_current(&mut self) -> Result<ConditionCode, FetchError> {
        let body = self.get(CURRENT_ENDPOINT).await?;
        parse_current(&body)
    }

    async fn fetch_forecast(&mut self, steps: usize) -> Result<Vec<ConditionCode>, FetchError> {
        let forecast = self.forecast_steps(steps).await?;
        for step in &forecast {
            match step.time {
                Some(t) => info!("weather: {}, {}", step.condition, t.format("%Y-%m-%d %H:%M")),
                None => info!("weather: {}", step.condition),
            }
        }
        Ok(forecast.into_iter().map(|s| s.condition).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRENT: &str = r#"{
        "coord": {"lon": 139.69, "lat": 35.69},
        "weather": [
            {"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"},
            {"id": 701, "main": "Mist", "description": "mist", "icon": "50d"}
        ],
        "name": "Tokyo"
    }"#;

    fn forecast_body(mains: &[&str]) -> String {
        let entries: Vec<String> = mains
            .iter()
            .enumerate()
            .map(|(i, m)| {
                format!(
                    r#"{{"dt": {}, "weather": [{{"id": 800, "main": "{}", "description": "x", "icon": "01d"}}], "dt_txt": "2024-06-01 {:02}:00:00"}}"#,
                    1717200000 + i * 10800,
                    m,
                    i * 3
                )
            })
            .collect();
        format!(r#"{{"cod": "200", "cnt": {}, "list": [{}]}}"#, mains.len(), entries.join(","))
    }

    #[test]
    fn test_parse_current_uses_first_entry() {
        assert_eq!(parse_current(CURRENT).unwrap(), ConditionCode::Rain);
    }

    #[test]
    fn test_parse_current_empty_weather() {
        let err = parse_current(r#"{"weather": []}"#).unwrap_err();
        assert!(matches!(err, FetchError::MissingData(_)));
        assert!(matches!(parse_current("{}").unwrap_err(), FetchError::MissingData(_)));
    }

    #[test]
    fn test_parse_current_bad_json() {
        assert!(matches!(parse_current("<html>").unwrap_err(), FetchError::Decode(_)));
    }

    #[test]
    fn test_parse_forecast_skips_first_entry() {
        let body = forecast_body(&["Clear", "Rain", "Snow", "Clouds", "Clear"]);
        let steps = parse_forecast(&body, 3).unwrap();
        let codes: Vec<ConditionCode> = steps.iter().map(|s| s.condition).collect();
        assert_eq!(codes, vec![ConditionCode::Rain, ConditionCode::Snow, ConditionCode::Clouds]);
        assert_eq!(
            steps[0].time.map(|t| t.format("%H:%M").to_string()),
            Some("03:00".to_string())
        );
    }

    #[test]
    fn test_parse_forecast_too_short() {
        let body = forecast_body(&["Clear", "Rain", "Snow"]);
        assert!(matches!(parse_forecast(&body, 3).unwrap_err(), FetchError::MissingData(_)));
        assert_eq!(parse_forecast(&body, 2).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_forecast_bad_timestamp_is_not_fatal() {
        let body = r#"{"list": [
            {"weather": [{"main": "Clear"}], "dt_txt": "now"},
            {"weather": [{"main": "Drizzle"}], "dt_txt": "soon"}
        ]}"#;
        let steps = parse_forecast(body, 1).unwrap();
        assert_eq!(steps[0].condition, ConditionCode::Drizzle);
        assert_eq!(steps[0].time, None);
    }

    #[test]
    fn test_parse_forecast_entry_without_weather() {
        let body = r#"{"list": [{"weather": [{"main": "Clear"}]}, {"weather": []}]}"#;
        assert!(matches!(parse_forecast(body, 1).unwrap_err(), FetchError::MissingData(_)));
    }
}
