/*
 *  display/drivers/ws2812.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  WS2812 bit encoding for an SPI MOSI line
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

use crate::display::color::ColorRGB;
use crate::display::framebuffer::Pixel;

/// SPI clock giving 312.5ns per SPI bit
pub const SPI_CLOCK_HZ: u32 = 3_200_000;

/// Zero bytes after a frame; 140 bytes at 3.2MHz is ~350us of low line,
/// enough for the longer latch of newer WS2812B parts.
pub const RESET_LEN: usize = 140;

/// Bytes per LED on the wire: 3 data bytes, 4 SPI bytes each
pub const BYTES_PER_LED: usize = 12;

// Two data bits per SPI byte, `1000` for a 0 and `1110` for a 1, MSB first.
const PATTERNS: [u8; 4] = [0b1000_1000, 0b1000_1110, 0b1110_1000, 0b1110_1110];

/// Expand one data byte into four SPI bytes
#[inline]
pub fn encode_byte(mut value: u8, out: &mut Vec<u8>) {
    for _ in 0..4 {
        out.push(PATTERNS[((value & 0b1100_0000) >> 6) as usize]);
        value <<= 2;
    }
}

/// Encode a whole frame, brightness applied, reset gap appended.
///
/// The packed colour is already in wire order (G, R, B), so its bytes
/// go out high to low.
pub fn encode_frame(pixels: &[Pixel]) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len() * BYTES_PER_LED + RESET_LEN);
    for p in pixels {
        for shift in [16u32, 8, 0] {
            let channel = ((p.color >> shift) & 0xFF) as u8;
            encode_byte(ColorRGB::scale_channel(channel, p.brightness), &mut out);
        }
    }
    out.resize(out.len() + RESET_LEN, 0);
    out
}
