// SPDX-FileCopyrightText: 2025 Felix Gruber
//
// SPDX-License-Identifier: GPL-3.0-or-later

use super::error::ConfigError;
use super::timing::{FieldTiming, SyncPulses};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VideoConfig {
    pub field: FieldTiming,
    pub pulses: SyncPulses,
    pub line_time_ns: u32,
    pub sync_and_back_porch_ns: u32,
    pub bit_time_ns: u32,
    /// Scan lines showing the same framebuffer row.
    pub line_repeat: u16,
    /// Pixel bytes per scan line, 8 pixels each.
    pub row_bytes: u16,
    /// Invert pixel bytes for an inverting buffer on the pixel pin.
    pub invert_pixels: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            field: FieldTiming::NTSC,
            pulses: SyncPulses::NTSC_8MHZ,
            line_time_ns: 63_500,
            sync_and_back_porch_ns: 10_900,
            bit_time_ns: 500,
            line_repeat: 4,
            row_bytes: 11,
            invert_pixels: false,
        }
    }
}

impl VideoConfig {
    /// Pixels per scan line.
    pub fn width(&self) -> u32 {
        self.row_bytes as u32 * 8
    }

    pub fn height(&self) -> u16 {
        self.field.active_lines / self.line_repeat.max(1)
    }

    pub fn active_video_ns(&self) -> u32 {
        self.line_time_ns - self.sync_and_back_porch_ns
    }

    /// Bits that fit into the visible part of a scan line.
    pub fn line_bit_budget(&self) -> u32 {
        self.active_video_ns() / self.bit_time_ns
    }

    /// Bits shifted out per scan line, padding byte included.
    pub fn line_bits(&self) -> u32 {
        (self.row_bytes as u32 + 1) * 8
    }

    /// Time the game logic has before the picture starts again.
    pub fn game_budget_ns(&self) -> u32 {
        let field = &self.field;
        let blank_lines = field.total_lines() - field.active_lines;
        blank_lines as u32 * self.line_time_ns
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let field = &self.field;
        if field.active_lines == 0 {
            return Err(ConfigError::NoActivePicture);
        }
        if field.vsync_lines == 0 {
            return Err(ConfigError::NoVerticalSync);
        }
        if field.post_render_lines <= field.equalizing_lines
           || field.pre_render_lines < field.equalizing_lines {
            return Err(ConfigError::Equalizing {
                equalizing: field.equalizing_lines,
                post_render: field.post_render_lines,
                pre_render: field.pre_render_lines,
            });
        }
        if self.line_repeat == 0
           || field.active_lines % self.line_repeat != 0 {
            return Err(ConfigError::LineRepeat {
                repeat: self.line_repeat,
                active_lines: field.active_lines,
            });
        }
        if self.row_bytes == 0 {
            return Err(ConfigError::EmptyLine);
        }
        let bits = self.line_bits();
        let budget = self.line_bit_budget();
        if bits > budget {
            return Err(ConfigError::SerialOverrun { bits, budget });
        }
        Ok(())
    }
}

const SERVE_CYCLE: i32 = 20;
const BALL_VELOCITY: u8 = 3;
const HALF_PADDLE: i32 = 3;

/// Playfield geometry and game tuning, in framebuffer pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    /// Row of the top boundary line.
    pub top: i32,
    /// Row of the bottom boundary line.
    pub bottom: i32,
    pub left_column: i32,
    pub right_column: i32,
    pub half_paddle: i32,
    pub paddle_start: i32,
    /// The ball moves one pixel every `ball_velocity` fields.
    pub ball_velocity: u8,
    /// Serves aim at the center column ± this offset.
    pub serve_cycle: i32,
    pub score_row: i32,
    pub left_score_column: i32,
    pub right_score_column: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        let video = VideoConfig::default();
        Self::for_screen(video.width(), video.height())
    }
}

impl GameConfig {
    pub fn for_screen(width: u32, height: u16) -> Self {
        let width = width as i32;
        let height = height as i32;
        let top = 1;
        let bottom = height - 1;
        Self {
            width,
            height,
            top,
            bottom,
            left_column: 1,
            right_column: width - 2,
            half_paddle: HALF_PADDLE,
            paddle_start: (top + bottom) / 2,
            ball_velocity: BALL_VELOCITY,
            serve_cycle: SERVE_CYCLE.min(width / 2 - 4).max(0),
            score_row: 3,
            left_score_column: width / 2 - 12,
            right_score_column: width / 2 + 4,
        }
    }

    pub fn center_column(&self) -> i32 {
        self.width / 2
    }

    /// Column the ball occupies when it touches the left paddle.
    pub fn left_face(&self) -> i32 {
        self.left_column + 1
    }

    pub fn right_face(&self) -> i32 {
        self.right_column - 1
    }

    pub fn left_wall(&self) -> i32 {
        0
    }

    pub fn right_wall(&self) -> i32 {
        self.width - 1
    }

    /// First row the ball may occupy.
    pub fn top_row(&self) -> i32 {
        self.top + 1
    }

    /// Last row the ball may occupy.
    pub fn bottom_row(&self) -> i32 {
        self.bottom - 1
    }

    /// Range of paddle centers keeping the paddle off the boundary lines.
    pub fn paddle_range(&self) -> (i32, i32) {
        (self.top_row() + self.half_paddle,
         self.bottom_row() - self.half_paddle)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ball_velocity == 0 {
            return Err(ConfigError::BallVelocity);
        }
        let (low, high) = self.paddle_range();
        if low > high
           || self.top < 0 || self.bottom >= self.height
           || self.left_column <= self.left_wall()
           || self.right_column >= self.right_wall()
           || self.right_face() - self.left_face() < 2 {
            return Err(ConfigError::PlayfieldTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        let center = self.center_column();
        if self.serve_cycle < 0
           || center - self.serve_cycle <= self.left_face()
           || center + self.serve_cycle >= self.right_face() {
            return Err(ConfigError::ServeRange {
                serve_cycle: self.serve_cycle,
            });
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub video: VideoConfig,
    pub game: GameConfig,
}

impl Config {
    /// Video settings with the game geometry derived from their screen.
    pub fn new(video: VideoConfig) -> Self {
        Self {
            video,
            game: GameConfig::for_screen(video.width(), video.height()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.video.validate()?;
        self.game.validate()
    }
}
