// SPDX-FileCopyrightText: 2025 Felix Gruber
//
// SPDX-License-Identifier: GPL-3.0-or-later

use minifb::{Key, Window, WindowOptions};
use tracing::info;

use super::error::PongError;
use super::hardware::PaddleChannel;
use super::simulator::Picture;

// Scan lines are much wider than tall on a TV, so pixels are stretched.
const PIXEL_WIDTH: usize = 8;
const LINE_HEIGHT: usize = 2;
const SET: u32 = 0xFFFFFF;
const UNSET: u32 = 0;

/// A window showing what a TV would make of the generated signal.
pub struct TvWindow {
    display_buffer: Vec<u32>,
    window: Window,
    width: usize,
    height: usize,
}

impl TvWindow {
    pub fn new(width: usize, height: usize,
               refresh_rate: usize) -> Result<Self, PongError> {
        let mut window = Window::new(
            "NTSC Pong",
            width * PIXEL_WIDTH,
            height * LINE_HEIGHT,
            WindowOptions::default(),
        ).map_err(|e| PongError::Window(e.to_string()))?;
        window.set_target_fps(refresh_rate);
        info!(width, height, refresh_rate, "TV window opened");
        Ok(Self {
            display_buffer: vec![UNSET; width * height
                                        * PIXEL_WIDTH * LINE_HEIGHT],
            window,
            width,
            height,
        })
    }

    pub fn refresh(&mut self, picture: &Picture) -> Result<(), PongError> {
        let buffer_width = self.width * PIXEL_WIDTH;
        for line in 0..self.height.min(picture.height()) {
            let buffer_line_start = line * LINE_HEIGHT * buffer_width;
            let buffer_line_range
                = buffer_line_start..(buffer_line_start + buffer_width);
            let buffer_line = &mut self.display_buffer[buffer_line_range
                                                       .clone()];
            for (col, &pixel) in picture.line(line).iter()
                                        .take(self.width).enumerate() {
                let color = if pixel { SET } else { UNSET };
                buffer_line[col*PIXEL_WIDTH..(col+1)*PIXEL_WIDTH].fill(color);
            }
            for i in 1..LINE_HEIGHT {
                self.display_buffer.copy_within(
                    buffer_line_range.clone(),
                    buffer_line_start + i * buffer_width);
            }
        }
        self.window
            .update_with_buffer(&self.display_buffer,
                                self.width * PIXEL_WIDTH,
                                self.height * LINE_HEIGHT)
            .map_err(|e| PongError::Window(e.to_string()))
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn is_esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Paddle knob movement requested by the keyboard: W/S for the left
    /// paddle, Up/Down for the right one. Negative turns toward 0.
    pub fn paddle_movement(&self, channel: PaddleChannel) -> i16 {
        let (up, down) = match channel {
            PaddleChannel::Left => (Key::W, Key::S),
            PaddleChannel::Right => (Key::Up, Key::Down),
        };
        match (self.window.is_key_down(up), self.window.is_key_down(down)) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }
}
