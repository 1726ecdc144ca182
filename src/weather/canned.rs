/*
 *  weather/canned.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Offline condition sources: random demo and fixed diagnostic
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

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::condition::ConditionCode;
use crate::weather::{ConditionSource, FetchError};

/// Shop-window demo: mostly sunny, some clouds, some rain.
#[derive(Debug)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    pub fn new() -> Self {
        Self { rng: StdRng::from_os_rng() }
    }

    /// Reproducible sequence, for tests
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    fn pick(&mut self) -> ConditionCode {
        // 3 in 5 clear, 1 in 5 clouds, 1 in 5 rain
        match self.rng.random_range(0..5) {
            0..=2 => ConditionCode::Clear,
            3 => ConditionCode::Clouds,
            _ => ConditionCode::Rain,
        }
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionSource for RandomSource {
    fn name(&self) -> &str {
        "random"
    }

    async fn fetch_current(&mut self) -> Result<ConditionCode, FetchError> {
        Ok(self.pick())
    }

    async fn fetch_forecast(&mut self, steps: usize) -> Result<Vec<ConditionCode>, FetchError> {
        Ok((0..steps).map(|_| self.pick()).collect())
    }
}

/// Fixed conditions per slot, for checking wiring and colours.
#[derive(Debug, Clone)]
pub struct FixedSource {
    current: ConditionCode,
    forecast: Vec<ConditionCode>,
}

impl FixedSource {
    pub fn new(current: ConditionCode, forecast: Vec<ConditionCode>) -> Self {
        Self { current, forecast }
    }

    /// Build from provider-style names, unknown names become `Unknown`
    pub fn from_names<S: AsRef<str>>(current: &str, forecast: &[S]) -> Self {
        Self {
            current: ConditionCode::parse(current),
            forecast: forecast.iter().map(|s| ConditionCode::parse(s.as_ref())).collect(),
        }
    }
}

impl ConditionSource for FixedSource {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn fetch_current(&mut self) -> Result<ConditionCode, FetchError> {
        Ok(self.current)
    }

    async fn fetch_forecast(&mut self, steps: usize) -> Result<Vec<ConditionCode>, FetchError> {
        if self.forecast.len() < steps {
            return Err(FetchError::MissingData(format!(
                "{} fixed forecast conditions, need {}",
                self.forecast.len(),
                steps
            )));
        }
        Ok(self.forecast[..steps].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_random_only_demo_conditions() {
        let mut source = RandomSource::with_seed(7);
        let codes = source.fetch_forecast(200).await.unwrap();
        assert_eq!(codes.len(), 200);
        assert!(codes.iter().all(|c| matches!(
            c,
            ConditionCode::Clear | ConditionCode::Clouds | ConditionCode::Rain
        )));
        // heavily weighted towards clear
        let clear = codes.iter().filter(|c| **c == ConditionCode::Clear).count();
        assert!(clear > 80, "only {} clear of 200", clear);
    }

    #[tokio::test]
    async fn test_random_seed_is_reproducible() {
        let mut a = RandomSource::with_seed(42);
        let mut b = RandomSource::with_seed(42);
        assert_eq!(a.fetch_forecast(10).await.unwrap(), b.fetch_forecast(10).await.unwrap());
    }

    #[tokio::test]
    async fn test_fixed_source() {
        let mut source = FixedSource::from_names("Snow", &["Clear", "Rain", "Bogus"]);
        assert_eq!(source.fetch_current().await.unwrap(), ConditionCode::Snow);
        assert_eq!(
            source.fetch_forecast(3).await.unwrap(),
            vec![ConditionCode::Clear, ConditionCode::Rain, ConditionCode::Unknown]
        );
        assert_eq!(source.fetch_forecast(1).await.unwrap(), vec![ConditionCode::Clear]);
        assert!(source.fetch_forecast(4).await.is_err());
    }
}
