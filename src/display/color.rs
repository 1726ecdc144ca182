/*
 *  display/color.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Colour values, driver packing and the condition colour table
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

use crate::condition::ConditionCode;

/// 8-bit per channel colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorRGB {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

pub const CLEAR: ColorRGB = ColorRGB::new(255, 170, 0);
pub const CLOUDS: ColorRGB = ColorRGB::new(170, 170, 170);
pub const RAIN: ColorRGB = ColorRGB::new(0, 65, 255);
pub const SNOW: ColorRGB = ColorRGB::new(242, 242, 255);
pub const UNKNOWN: ColorRGB = ColorRGB::new(255, 0, 0);

pub const BLACK: ColorRGB = ColorRGB::new(0, 0, 0);
pub const ERROR: ColorRGB = ColorRGB::new(0xFF, 0, 0);

impl ColorRGB {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Pack for the LED driver.
    ///
    /// Green occupies the high byte, red the middle and blue the low byte.
    /// That is the order WS281x parts shift in, so the driver can emit the
    /// bytes as-is. Do not "fix" this to 0xRRGGBB.
    pub const fn pack(self) -> u32 {
        ((self.green as u32) << 16) | ((self.red as u32) << 8) | (self.blue as u32)
    }

    /// Inverse of [`ColorRGB::pack`]; bits above 24 are ignored.
    pub const fn unpack(packed: u32) -> Self {
        Self {
            red: ((packed >> 8) & 0xFF) as u8,
            green: ((packed >> 16) & 0xFF) as u8,
            blue: (packed & 0xFF) as u8,
        }
    }

    /// Each channel divided by 8, truncating.
    pub const fn dim(self) -> Self {
        Self {
            red: self.red / 8,
            green: self.green / 8,
            blue: self.blue / 8,
        }
    }

    /// Channel value after the driver's brightness scaling.
    #[inline]
    pub const fn scale_channel(value: u8, brightness: u8) -> u8 {
        ((value as u16 * (brightness as u16 + 1)) >> 8) as u8
    }
}

/// Colour for a condition.
///
/// The palette follows the JMA weather colour guide
/// (http://www.jma.go.jp/jma/kishou/info/colorguide/120524_hpcolorguide.pdf).
pub fn map_to_color(condition: ConditionCode) -> ColorRGB {
    match condition {
        ConditionCode::Clear => CLEAR,
        ConditionCode::Clouds | ConditionCode::Atmosphere => CLOUDS,
        ConditionCode::Thunderstorm | ConditionCode::Drizzle | ConditionCode::Rain => RAIN,
        ConditionCode::Snow => SNOW,
        ConditionCode::Extreme | ConditionCode::Additional | ConditionCode::Unknown => UNKNOWN,
    }
}

/// Lower-emphasis colour used for forecast slots
pub fn map_to_dim_color(condition: ConditionCode) -> ColorRGB {
    map_to_color(condition).dim()
}

/// Parse provider text and map it in one step.
pub fn color_for_main(main: &str) -> ColorRGB {
    map_to_color(ConditionCode::parse(main))
}
