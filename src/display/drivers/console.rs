/*
 *  display/drivers/console.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Emulated strip that renders into the log
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

use std::fmt::Write;

use log::info;

use crate::display::color::ColorRGB;
use crate::display::error::{InitError, RenderError};
use crate::display::framebuffer::Pixel;
use crate::display::traits::LedDriver;

/// Prints each rendered frame as a row of truecolor blocks.
///
/// Used for development on machines without a strip attached.
#[derive(Debug, Default)]
pub struct ConsoleDriver {
    pixels: Vec<Pixel>,
    ansi: bool,
}

impl ConsoleDriver {
    pub fn new(ansi: bool) -> Self {
        Self { pixels: Vec::new(), ansi }
    }

    /// One line describing the strip, brightness applied
    pub fn line(&self) -> String {
        let mut out = String::with_capacity(self.pixels.len() * 24);
        for p in &self.pixels {
            let c = ColorRGB::unpack(p.color);
            let r = ColorRGB::scale_channel(c.red, p.brightness);
            let g = ColorRGB::scale_channel(c.green, p.brightness);
            let b = ColorRGB::scale_channel(c.blue, p.brightness);
            if self.ansi {
                write!(out, "\x1b[38;2;{};{};{}m\u{25CF}\x1b[0m", r, g, b).ok();
            } else {
                write!(out, "[{:02x}{:02x}{:02x}]", r, g, b).ok();
            }
        }
        out
    }

    fn pixel_mut(&mut self, index: usize) -> Result<&mut Pixel, RenderError> {
        let count = self.pixels.len();
        self.pixels
            .get_mut(index)
            .ok_or(RenderError::IndexOutOfRange { index, count })
    }
}

impl LedDriver for ConsoleDriver {
    fn name(&self) -> &str {
        "console"
    }

    fn init(&mut self, _pin: u8, count: usize, brightness: u8) -> Result<(), InitError> {
        self.pixels = vec![Pixel { color: 0, brightness }; count];
        Ok(())
    }

    fn set_pixel(&mut self, index: usize, color: u32) -> Result<(), RenderError> {
        self.pixel_mut(index)?.color = color;
        Ok(())
    }

    fn set_brightness(&mut self, index: usize, value: u8) -> Result<(), RenderError> {
        self.pixel_mut(index)?.brightness = value;
        Ok(())
    }

    fn render(&mut self) -> Result<(), RenderError> {
        if self.pixels.is_empty() {
            return Err(RenderError::NotInitialized);
        }
        info!("strip {}", self.line());
        Ok(())
    }
}
