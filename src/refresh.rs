/*
 *  refresh.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Fetch, map, display, sleep
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

use log::{debug, error, info};

use crate::condition::ConditionCode;
use crate::display::color::{map_to_color, map_to_dim_color, ColorRGB};
use crate::display::{DisplayController, DisplaySlot, LedDriver};
use crate::weather::{ConditionSource, FetchError};

/// How forecast slots are told apart from the current slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastEmphasis {
    /// Same colour and brightness as current
    Full,
    /// Colour channels divided by 8
    Dim,
    /// Full colour at a lower LED brightness, scaled by the strip brightness
    Brightness(u8),
}

/// Parameters of one refresh loop variant
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshConfig {
    pub interval: Duration,
    /// Forecast slots to fill, 0 for current only
    pub forecast_steps: usize,
    pub emphasis: ForecastEmphasis,
    /// Run a single cycle and return
    pub one_shot: bool,
}

impl RefreshConfig {
    /// Live weather every 30s, dimmed forecast
    pub fn polling() -> Self {
        Self {
            interval: Duration::from_secs(30),
            forecast_steps: 3,
            emphasis: ForecastEmphasis::Dim,
            one_shot: false,
        }
    }

    /// Random conditions every 10s
    pub fn demo() -> Self {
        Self {
            interval: Duration::from_secs(10),
            forecast_steps: 3,
            emphasis: ForecastEmphasis::Full,
            one_shot: false,
        }
    }

    /// Render once and stop
    pub fn diagnostic() -> Self {
        Self {
            interval: Duration::ZERO,
            forecast_steps: 3,
            emphasis: ForecastEmphasis::Full,
            one_shot: true,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self::polling()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Fetching,
    Mapping,
    Committing,
    Sleeping,
}

/// What a single cycle ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// New conditions are on the strip
    Displayed,
    /// No data; error LED lit, slots untouched
    FetchFailed,
    /// Data staged but the strip write failed
    RenderFailed,
}

/// The application loop. Single task, owns both collaborators.
pub struct RefreshLoop<S: ConditionSource, D: LedDriver> {
    source: S,
    display: DisplayController<D>,
    config: RefreshConfig,
    state: RefreshState,
    cycles: u64,
}

impl<S: ConditionSource, D: LedDriver> RefreshLoop<S, D> {
    pub fn new(source: S, display: DisplayController<D>, mut config: RefreshConfig) -> Self {
        let wired = display.slot_map().forecast_slots();
        if config.forecast_steps > wired {
            debug!(
                "only {} forecast slots wired, showing {} of {} steps",
                wired, wired, config.forecast_steps
            );
            config.forecast_steps = wired;
        }
        Self {
            source,
            display,
            config,
            state: RefreshState::Idle,
            cycles: 0,
        }
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }

    /// Completed cycles, including failed ones
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn display(&self) -> &DisplayController<D> {
        &self.display
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_parts(self) -> (S, DisplayController<D>) {
        (self.source, self.display)
    }

    fn transition(&mut self, next: RefreshState) {
        debug!("refresh: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    async fn fetch(&mut self) -> Result<(ConditionCode, Vec<ConditionCode>), FetchError> {
        let current = self.source.fetch_current().await?;
        info!("current weather: {}", current);

        let forecast = if self.config.forecast_steps > 0 {
            self.source.fetch_forecast(self.config.forecast_steps).await?
        } else {
            Vec::new()
        };
        Ok((current, forecast))
    }

    fn stage(&mut self, current: ConditionCode, forecast: &[ConditionCode]) {
        let full = self.display.brightness();
        self.display.set_slot(DisplaySlot::Current, map_to_color(current));
        self.display.set_slot_brightness(DisplaySlot::Current, full);

        for (i, &code) in forecast.iter().enumerate().take(self.config.forecast_steps) {
            let slot = DisplaySlot::Forecast((i + 1) as u8);
            let (color, brightness) = match self.config.emphasis {
                ForecastEmphasis::Full => (map_to_color(code), full),
                ForecastEmphasis::Dim => (map_to_dim_color(code), full),
                ForecastEmphasis::Brightness(b) => {
                    (map_to_color(code), ColorRGB::scale_channel(b, full))
                }
            };
            self.display.set_slot(slot, color);
            self.display.set_slot_brightness(slot, brightness);
        }
    }

    /// One pass from Idle to just before Sleeping.
    ///
    /// The error LED is cleared first. A fetch failure lights it and skips
    /// the slot writes, so a half-updated frame is never shown. A commit
    /// failure is logged only.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        self.transition(RefreshState::Fetching);
        // commit errors are logged by the controller
        self.display.set_error_indicator(false).ok();

        let (current, forecast) = match self.fetch().await {
            Ok(data) => data,
            Err(e) => {
                error!("{} fetch failed: {}", self.source.name(), e);
                self.display.set_error_indicator(true).ok();
                return CycleOutcome::FetchFailed;
            }
        };

        self.transition(RefreshState::Mapping);
        self.stage(current, &forecast);

        self.transition(RefreshState::Committing);
        match self.display.commit() {
            Ok(()) => CycleOutcome::Displayed,
            Err(_) => CycleOutcome::RenderFailed,
        }
    }

    /// A cycle followed by the interval sleep.
    pub async fn step(&mut self) -> CycleOutcome {
        let outcome = self.run_cycle().await;
        self.cycles += 1;
        self.transition(RefreshState::Sleeping);
        tokio::time::sleep(self.config.interval).await;
        self.transition(RefreshState::Idle);
        outcome
    }

    /// Run until the process is stopped, or once when `one_shot` is set.
    pub async fn run(&mut self) -> CycleOutcome {
        info!(
            "refresh loop: source {}, every {}s, {} forecast steps",
            self.source.name(),
            self.config.interval.as_secs(),
            self.config.forecast_steps
        );
        loop {
            if self.config.one_shot {
                let outcome = self.run_cycle().await;
                self.cycles += 1;
                self.transition(RefreshState::Idle);
                return outcome;
            }
            self.step().await;
        }
    }
}
