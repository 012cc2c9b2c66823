// SPDX-FileCopyrightText: 2025 Felix Gruber
//
// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

/// A configuration that cannot hold its real-time deadlines or geometry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("the field has no active picture lines")]
    NoActivePicture,

    #[error("the field has no vertical sync lines")]
    NoVerticalSync,

    #[error("line repeat factor {repeat} does not divide {active_lines} active lines")]
    LineRepeat { repeat: u16, active_lines: u16 },

    #[error("a scan line needs at least one pixel byte")]
    EmptyLine,

    #[error("{bits} bits per line exceed the active video budget of {budget} bits")]
    SerialOverrun { bits: u32, budget: u32 },

    #[error("{equalizing} equalizing lines leave no blank line for the game \
             after {post_render} post-render and {pre_render} pre-render lines")]
    Equalizing { equalizing: u16, post_render: u16, pre_render: u16 },

    #[error("a {width}x{height} playfield is too small for the paddles")]
    PlayfieldTooSmall { width: i32, height: i32 },

    #[error("serve angle range ±{serve_cycle} reaches past the paddles")]
    ServeRange { serve_cycle: i32 },

    #[error("ball velocity divisor must be at least 1")]
    BallVelocity,
}

#[derive(Error, Debug)]
pub enum PongError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("could not open TV window: {0}")]
    Window(String),
}
