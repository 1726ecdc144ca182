/*
 *  display/controller.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Slot addressing, frame staging and commit
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

use log::{debug, error, info};

use crate::config::StripConfig;
use crate::display::color::{self, ColorRGB};
use crate::display::error::{InitError, RenderError};
use crate::display::framebuffer::FrameBuffer;
use crate::display::layout::{DisplaySlot, SlotMap};
use crate::display::traits::LedDriver;

/// Owns the LED driver, the slot table and the staged frame.
///
/// Writes go to the frame buffer first and reach the strip only on
/// [`DisplayController::commit`].
pub struct DisplayController<D: LedDriver> {
    driver: D,
    slots: SlotMap,
    frame: FrameBuffer,
}

impl<D: LedDriver> DisplayController<D> {
    /// Validate the layout and bring the hardware up.
    pub fn initialize(mut driver: D, strip: &StripConfig, slots: SlotMap) -> Result<Self, InitError> {
        if strip.led_count == 0 {
            return Err(InitError::NoLeds);
        }
        slots.validate(strip.led_count)?;

        driver.init(strip.gpio_pin, strip.led_count, strip.brightness)?;
        info!(
            "{} driver up: GPIO {}, {} LEDs, brightness {}",
            driver.name(),
            strip.gpio_pin,
            strip.led_count,
            strip.brightness
        );

        Ok(Self {
            driver,
            slots,
            frame: FrameBuffer::new(strip.led_count, strip.brightness),
        })
    }

    /// Stage `color` on every LED of `slot`
    pub fn set_slot(&mut self, slot: DisplaySlot, color: ColorRGB) {
        let packed = color.pack();
        for &led in self.slots.leds(slot) {
            self.frame.set_color(led, packed);
        }
    }

    /// Stage a brightness on every LED of `slot`, colour untouched
    pub fn set_slot_brightness(&mut self, slot: DisplaySlot, brightness: u8) {
        for &led in self.slots.leds(slot) {
            self.frame.set_brightness(led, brightness);
        }
    }

    /// Push the whole frame to the driver and render once.
    pub fn commit(&mut self) -> Result<(), RenderError> {
        let result = self.flush();
        if let Err(e) = &result {
            error!("Failed to commit LED frame: {}", e);
        }
        result
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        for (index, pixel) in self.frame.as_slice().iter().enumerate() {
            self.driver.set_brightness(index, pixel.brightness)?;
            self.driver.set_pixel(index, pixel.color)?;
        }
        self.driver.render()?;
        debug!("committed {} LEDs", self.frame.len());
        Ok(())
    }

    /// Full brightness for this strip, as configured at initialize
    pub fn brightness(&self) -> u8 {
        self.frame.default_brightness()
    }

    /// Light (red) or clear (black) the error LEDs at strip brightness and
    /// commit straight away.
    pub fn set_error_indicator(&mut self, active: bool) -> Result<(), RenderError> {
        let color = if active { color::ERROR } else { color::BLACK };
        self.set_slot_brightness(DisplaySlot::Error, self.brightness());
        self.set_slot(DisplaySlot::Error, color);
        self.commit()
    }

    /// Turn every LED off.
    pub fn blank(&mut self) -> Result<(), RenderError> {
        self.frame.clear();
        self.commit()
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn slot_map(&self) -> &SlotMap {
        &self.slots
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Give the driver back
    pub fn into_driver(self) -> D {
        self.driver
    }
}
