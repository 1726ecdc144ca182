/*
 *  display/drivers/spi.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  WS281x strip on a Raspberry Pi SPI MOSI pin
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

use log::debug;
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

use crate::display::drivers::ws2812::{self, SPI_CLOCK_HZ};
use crate::display::error::{InitError, RenderError};
use crate::display::framebuffer::Pixel;
use crate::display::traits::LedDriver;

/// Strip driven from SPI0 (GPIO 10) or SPI1 (GPIO 20).
///
/// Needs `dtparam=spi=on` (and `dtoverlay=spi1-1cs` for SPI1) and a core
/// clock that does not scale, otherwise the bit timing drifts.
#[derive(Default)]
pub struct SpiDriver {
    spi: Option<Spi>,
    pixels: Vec<Pixel>,
}

impl SpiDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn bus_for_pin(pin: u8) -> Result<Bus, InitError> {
        match pin {
            10 => Ok(Bus::Spi0),
            20 => Ok(Bus::Spi1),
            other => Err(InitError::UnsupportedPin(other)),
        }
    }

    fn pixel_mut(&mut self, index: usize) -> Result<&mut Pixel, RenderError> {
        let count = self.pixels.len();
        self.pixels
            .get_mut(index)
            .ok_or(RenderError::IndexOutOfRange { index, count })
    }
}

impl LedDriver for SpiDriver {
    fn name(&self) -> &str {
        "spi"
    }

    fn init(&mut self, pin: u8, count: usize, brightness: u8) -> Result<(), InitError> {
        let bus = Self::bus_for_pin(pin)?;
        let spi = Spi::new(bus, SlaveSelect::Ss0, SPI_CLOCK_HZ, Mode::Mode0)?;
        self.spi = Some(spi);
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
        let buffer = ws2812::encode_frame(&self.pixels);
        let spi = self.spi.as_mut().ok_or(RenderError::NotInitialized)?;
        let written = spi.write(&buffer)?;
        if written != buffer.len() {
            return Err(RenderError::Hardware(format!(
                "short SPI write: {} of {} bytes",
                written,
                buffer.len()
            )));
        }
        debug!("spi wrote {} bytes", written);
        Ok(())
    }
}
