/*
 *  display/framebuffer.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Staged per-LED colour and brightness
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

/// One LED's staged state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixel {
    /// Packed colour, see [`crate::display::ColorRGB::pack`]
    pub color: u32,
    pub brightness: u8,
}

/// Frame awaiting commit. Owned by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Vec<Pixel>,
    default_brightness: u8,
}

impl FrameBuffer {
    pub fn new(count: usize, brightness: u8) -> Self {
        Self {
            pixels: vec![Pixel { color: 0, brightness }; count],
            default_brightness: brightness,
        }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Out of range indices are ignored; the slot table is validated up front.
    pub fn set_color(&mut self, index: usize, color: u32) {
        if let Some(p) = self.pixels.get_mut(index) {
            p.color = color;
        }
    }

    pub fn set_brightness(&mut self, index: usize, brightness: u8) {
        if let Some(p) = self.pixels.get_mut(index) {
            p.brightness = brightness;
        }
    }

    /// Brightness the strip was initialized with
    pub fn default_brightness(&self) -> u8 {
        self.default_brightness
    }

    pub fn get(&self, index: usize) -> Option<Pixel> {
        self.pixels.get(index).copied()
    }

    /// All black at the initial brightness
    pub fn clear(&mut self) {
        let brightness = self.default_brightness;
        self.pixels.iter_mut().for_each(|p| {
            p.color = 0;
            p.brightness = brightness;
        });
    }

    pub fn as_slice(&self) -> &[Pixel] {
        &self.pixels
    }
}
