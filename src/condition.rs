/*
 *  condition.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Weather condition categories as reported by the provider
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

use std::fmt::{self, Display};
use log::warn;

/// Condition group, see https://openweathermap.org/weather-conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionCode {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Atmosphere,
    Clear,
    Clouds,
    Extreme,
    Additional,
    Unknown,
}

impl ConditionCode {
    /// Every category, `Unknown` last.
    pub const ALL: [ConditionCode; 10] = [
        ConditionCode::Thunderstorm,
        ConditionCode::Drizzle,
        ConditionCode::Rain,
        ConditionCode::Snow,
        ConditionCode::Atmosphere,
        ConditionCode::Clear,
        ConditionCode::Clouds,
        ConditionCode::Extreme,
        ConditionCode::Additional,
        ConditionCode::Unknown,
    ];

    /// Parse the provider's `main` field.
    ///
    /// Matching is exact. Anything unrecognized is logged and becomes
    /// [`ConditionCode::Unknown`]; this never fails.
    pub fn parse(main: &str) -> Self {
        match main {
            "Thunderstorm" => ConditionCode::Thunderstorm,
            "Drizzle" => ConditionCode::Drizzle,
            "Rain" => ConditionCode::Rain,
            "Snow" => ConditionCode::Snow,
            "Atmosphere" => ConditionCode::Atmosphere,
            "Clear" => ConditionCode::Clear,
            "Clouds" => ConditionCode::Clouds,
            "Extreme" => ConditionCode::Extreme,
            "Additional" => ConditionCode::Additional,
            other => {
                warn!("unknown weather: {}", other);
                ConditionCode::Unknown
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionCode::Thunderstorm => "Thunderstorm",
            ConditionCode::Drizzle => "Drizzle",
            ConditionCode::Rain => "Rain",
            ConditionCode::Snow => "Snow",
            ConditionCode::Atmosphere => "Atmosphere",
            ConditionCode::Clear => "Clear",
            ConditionCode::Clouds => "Clouds",
            ConditionCode::Extreme => "Extreme",
            ConditionCode::Additional => "Additional",
            ConditionCode::Unknown => "Unknown",
        }
    }
}

impl Display for ConditionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
