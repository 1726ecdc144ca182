/*
 *  display/traits.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definition for LED driver abstraction
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

use crate::display::error::{InitError, RenderError};

/// Minimal hardware abstraction - every LED backend implements this trait
///
/// Pixel and brightness writes are staged inside the driver and only become
/// visible on [`LedDriver::render`]. The controller always writes a whole
/// frame before rendering, so a render is one hardware transaction.
pub trait LedDriver {
    /// Short name for log lines
    fn name(&self) -> &str;

    /// Acquire the hardware
    ///
    /// `pin` is the BCM GPIO number carrying the data line, `count` the number
    /// of LEDs on the strip and `brightness` the initial brightness for every LED.
    fn init(&mut self, pin: u8, count: usize, brightness: u8) -> Result<(), InitError>;

    /// Stage a packed colour (see [`crate::display::ColorRGB::pack`])
    fn set_pixel(&mut self, index: usize, color: u32) -> Result<(), RenderError>;

    /// Stage a per-LED brightness (0-255)
    fn set_brightness(&mut self, index: usize, value: u8) -> Result<(), RenderError>;

    /// Transmit the staged state to the strip
    fn render(&mut self) -> Result<(), RenderError>;
}

impl<D: LedDriver + ?Sized> LedDriver for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn init(&mut self, pin: u8, count: usize, brightness: u8) -> Result<(), InitError> {
        (**self).init(pin, count, brightness)
    }

    fn set_pixel(&mut self, index: usize, color: u32) -> Result<(), RenderError> {
        (**self).set_pixel(index, color)
    }

    fn set_brightness(&mut self, index: usize, value: u8) -> Result<(), RenderError> {
        (**self).set_brightness(index, value)
    }

    fn render(&mut self) -> Result<(), RenderError> {
        (**self).render()
    }
}
