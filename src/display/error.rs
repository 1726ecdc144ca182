/*
 *  display/error.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error types for the LED subsystem
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

/// Hardware could not be brought up. Fatal for the process.
#[derive(Debug, Error)]
pub enum InitError {
    /// The strip needs at least one LED
    #[error("LED count must be > 0")]
    NoLeds,

    /// The backend cannot drive data out of this GPIO
    #[error("GPIO {0} cannot drive the strip (use 10 for SPI0 or 20 for SPI1)")]
    UnsupportedPin(u8),

    /// Slot table does not fit the strip or violates the overlap rule
    #[error("invalid LED layout: {0}")]
    InvalidLayout(String),

    /// Driver-level failure (permissions, bus busy, ...)
    #[error("LED hardware initialization failed: {0}")]
    Hardware(String),
}

/// A frame could not be written. Recoverable; the next cycle retries.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("LED index {index} out of range (strip has {count})")]
    IndexOutOfRange { index: usize, count: usize },

    /// Driver was used before `init`
    #[error("LED driver not initialized")]
    NotInitialized,

    #[error("LED render failed: {0}")]
    Hardware(String),
}

#[cfg(feature = "pi")]
impl From<rppal::spi::Error> for InitError {
    fn from(err: rppal::spi::Error) -> Self {
        InitError::Hardware(err.to_string())
    }
}

#[cfg(feature = "pi")]
impl From<rppal::spi::Error> for RenderError {
    fn from(err: rppal::spi::Error) -> Self {
        RenderError::Hardware(err.to_string())
    }
}
