/*
 *  display/drivers/mock.rs
 *
 *  wxstrip - weather at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock LED driver for testing without hardware
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
use crate::display::framebuffer::Pixel;
use crate::display::traits::LedDriver;

use std::sync::{Arc, Mutex};

/// Mock LED driver for testing
///
/// This driver simulates a strip without requiring hardware. It's useful for:
/// - Unit tests
/// - Integration tests
/// - Development without hardware
///
/// Staged writes and every rendered frame are recorded in a shared state
/// so tests can inspect them after handing the driver to a controller.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockDriverState>>,
}

/// Internal state for the mock driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDriverState {
    /// Number of times init() was called
    pub init_count: usize,

    /// Pin passed to the last init()
    pub pin: Option<u8>,

    /// Writes since the last render
    pub staged: Vec<Pixel>,

    /// What the strip shows after the last render
    pub pixels: Vec<Pixel>,

    /// Number of successful renders
    pub render_count: usize,

    /// Every rendered frame, oldest first
    pub frames: Vec<Vec<Pixel>>,

    /// Simulate failures (for error testing)
    pub simulate_init_failure: bool,
    pub simulate_render_failure: bool,
}

impl MockDriverState {
    /// Packed colour currently shown on `index` (0 when dark or out of range)
    pub fn rendered(&self, index: usize) -> u32 {
        self.pixels.get(index).map(|p| p.color).unwrap_or(0)
    }
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MockDriverState>, RenderError> {
        self.state
            .lock()
            .map_err(|_| RenderError::Hardware("mock state poisoned".to_string()))
    }
}

impl LedDriver for MockDriver {
    fn name(&self) -> &str {
        "mock"
    }

    fn init(&mut self, pin: u8, count: usize, brightness: u8) -> Result<(), InitError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| InitError::Hardware("mock state poisoned".to_string()))?;

        if state.simulate_init_failure {
            return Err(InitError::Hardware("Simulated init failure".to_string()));
        }

        state.init_count += 1;
        state.pin = Some(pin);
        state.staged = vec![Pixel { color: 0, brightness }; count];
        state.pixels = state.staged.clone();
        Ok(())
    }

    fn set_pixel(&mut self, index: usize, color: u32) -> Result<(), RenderError> {
        let mut state = self.lock()?;
        let count = state.staged.len();
        let pixel = state
            .staged
            .get_mut(index)
            .ok_or(RenderError::IndexOutOfRange { index, count })?;
        pixel.color = color;
        Ok(())
    }

    fn set_brightness(&mut self, index: usize, value: u8) -> Result<(), RenderError> {
        let mut state = self.lock()?;
        let count = state.staged.len();
        let pixel = state
            .staged
            .get_mut(index)
            .ok_or(RenderError::IndexOutOfRange { index, count })?;
        pixel.brightness = value;
        Ok(())
    }

    fn render(&mut self) -> Result<(), RenderError> {
        let mut state = self.lock()?;

        if state.simulate_render_failure {
            return Err(RenderError::Hardware("Simulated render failure".to_string()));
        }
        if state.init_count == 0 {
            return Err(RenderError::NotInitialized);
        }

        let frame = state.staged.clone();
        state.pixels = frame.clone();
        state.frames.push(frame);
        state.render_count += 1;
        Ok(())
    }
}
