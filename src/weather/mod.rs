/*
 *  weather/mod.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Sources of weather conditions
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

use thiserror::Error;

use crate::condition::ConditionCode;

pub mod canned;
pub mod client;

pub use canned::{FixedSource, RandomSource};
pub use client::WeatherClient;

/// Anything that went wrong getting conditions. The refresh loop shows the
/// error LED and tries again next cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("weather service answered HTTP {0}")]
    Status(u16),

    #[error("JSON deserialization error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("missing weather data: {0}")]
    MissingData(String),
}

/// Where the refresh loop gets its conditions from.
///
/// One call per cycle each; implementations do not retry.
#[allow(async_fn_in_trait)]
pub trait ConditionSource {
    /// Short name for log lines
    fn name(&self) -> &str;

    async fn fetch_current(&mut self) -> Result<ConditionCode, FetchError>;

    /// Exactly `steps` upcoming conditions, nearest first
    async fn fetch_forecast(&mut self, steps: usize) -> Result<Vec<ConditionCode>, FetchError>;
}
