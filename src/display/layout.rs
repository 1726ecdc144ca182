/*
 *  display/layout.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Semantic slots and their physical LED indices
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

use std::collections::HashSet;
use std::fmt::{self, Display};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::display::error::InitError;

/// Maximum number of forecast slots
pub const MAX_FORECAST_SLOTS: usize = 3;

/// Semantic role of a group of LEDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplaySlot {
    Current,
    /// Forecast step, 1-based
    Forecast(u8),
    Error,
}

impl Display for DisplaySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplaySlot::Current => write!(f, "current"),
            DisplaySlot::Forecast(n) => write!(f, "forecast{}", n),
            DisplaySlot::Error => write!(f, "error"),
        }
    }
}

/// Slot to LED index table. Built once at startup, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotMap {
    pub current: Vec<usize>,
    #[serde(default)]
    pub forecast: Vec<Vec<usize>>,
    pub error: Vec<usize>,
}

/// Built-in wiring presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LayoutPreset {
    /// Five single LEDs: error, current, three forecasts
    Strip5,
    /// 26 LEDs in four clusters; the error LED sits inside the current cluster
    Matrix26,
}

impl LayoutPreset {
    pub fn slot_map(&self) -> SlotMap {
        match self {
            LayoutPreset::Strip5 => SlotMap {
                error: vec![0],
                current: vec![1],
                forecast: vec![vec![2], vec![3], vec![4]],
            },
            LayoutPreset::Matrix26 => SlotMap {
                current: (20..=25).collect(),
                forecast: vec![
                    (14..=19).collect(),
                    (7..=13).collect(),
                    (0..=6).collect(),
                ],
                error: vec![20],
            },
        }
    }

    pub fn led_count(&self) -> usize {
        match self {
            LayoutPreset::Strip5 => 5,
            LayoutPreset::Matrix26 => 26,
        }
    }
}

impl SlotMap {
    /// LED indices for a slot; empty if the slot is not wired
    pub fn leds(&self, slot: DisplaySlot) -> &[usize] {
        match slot {
            DisplaySlot::Current => &self.current,
            DisplaySlot::Error => &self.error,
            DisplaySlot::Forecast(n) => {
                let n = n as usize;
                if n == 0 {
                    return &[];
                }
                self.forecast.get(n - 1).map(Vec::as_slice).unwrap_or(&[])
            }
        }
    }

    pub fn forecast_slots(&self) -> usize {
        self.forecast.len()
    }

    /// Every wired slot, current first
    pub fn slots(&self) -> Vec<DisplaySlot> {
        let mut slots = vec![DisplaySlot::Current];
        slots.extend((1..=self.forecast.len()).map(|n| DisplaySlot::Forecast(n as u8)));
        slots.push(DisplaySlot::Error);
        slots
    }

    /// Check the table against a strip of `led_count` LEDs.
    ///
    /// Weather slots must be pairwise disjoint. The error indicator may only
    /// share LEDs with the current slot.
    pub fn validate(&self, led_count: usize) -> Result<(), InitError> {
        if self.current.is_empty() {
            return Err(InitError::InvalidLayout("current slot has no LEDs".into()));
        }
        if self.error.is_empty() {
            return Err(InitError::InvalidLayout("error slot has no LEDs".into()));
        }
        if self.forecast.len() > MAX_FORECAST_SLOTS {
            return Err(InitError::InvalidLayout(format!(
                "at most {} forecast slots, got {}",
                MAX_FORECAST_SLOTS,
                self.forecast.len()
            )));
        }

        let mut owned: HashSet<usize> = HashSet::new();
        for slot in self.slots() {
            let leds = self.leds(slot);
            if slot != DisplaySlot::Current && slot != DisplaySlot::Error && leds.is_empty() {
                return Err(InitError::InvalidLayout(format!("{} slot has no LEDs", slot)));
            }
            let mut seen: HashSet<usize> = HashSet::new();
            for &led in leds {
                if led >= led_count {
                    return Err(InitError::InvalidLayout(format!(
                        "{} slot uses LED {} but the strip has {}",
                        slot, led, led_count
                    )));
                }
                if !seen.insert(led) {
                    return Err(InitError::InvalidLayout(format!(
                        "{} slot lists LED {} twice",
                        slot, led
                    )));
                }
                if slot == DisplaySlot::Error {
                    if owned.contains(&led) && !self.current.contains(&led) {
                        return Err(InitError::InvalidLayout(format!(
                            "error LED {} overlaps a forecast slot",
                            led
                        )));
                    }
                } else if !owned.insert(led) {
                    return Err(InitError::InvalidLayout(format!(
                        "LED {} is assigned to more than one slot",
                        led
                    )));
                }
            }
        }
        Ok(())
    }
}
