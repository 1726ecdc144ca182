/*
 *  display/mod.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  LED display subsystem
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

pub mod color;
pub mod controller;
pub mod drivers;
pub mod error;
pub mod framebuffer;
pub mod layout;
pub mod traits;

pub use color::{map_to_color, map_to_dim_color, ColorRGB};
pub use controller::DisplayController;
pub use error::{InitError, RenderError};
pub use framebuffer::{FrameBuffer, Pixel};
pub use layout::{DisplaySlot, LayoutPreset, SlotMap};
pub use traits::LedDriver;

/// Driver chosen at runtime
pub type BoxedDriver = Box<dyn LedDriver>;
