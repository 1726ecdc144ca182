/*
 *  lib.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
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

//! Current and forecast weather shown as colours on an addressable LED strip.

pub mod condition;
pub mod config;
pub mod display;
pub mod refresh;
pub mod weather;

pub use condition::ConditionCode;
pub use refresh::{CycleOutcome, ForecastEmphasis, RefreshConfig, RefreshLoop};
