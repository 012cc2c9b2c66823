// SPDX-FileCopyrightText: 2025 Felix Gruber
//
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod commandline;
pub mod config;
pub mod error;
pub mod fonts;
pub mod framebuffer;
pub mod game;
pub mod hardware;
pub mod scheduler;
pub mod serializer;
pub mod simulator;
pub mod timing;
pub mod tv_window;

use tracing::info;

use config::Config;
use error::ConfigError;
use framebuffer::FrameBuffer;
use game::GameEngine;
use hardware::Hardware;
use scheduler::Scheduler;
use serializer::LineSerializer;
use timing::{ScanLine, TimingController};

pub const FIELD_RATE: usize = 60;

/// Video generator and Pong game sharing one line timer.
pub struct TvPong<H> {
    hardware: H,
    scheduler: Scheduler,
    framebuffer: FrameBuffer,
    game: GameEngine,
}

impl<H: Hardware> TvPong<H> {
    /// Validate `config`, allocate the framebuffer and draw the court.
    pub fn new(config: Config, hardware: H) -> Result<Self, ConfigError> {
        config.validate()?;
        let video = &config.video;
        let mut framebuffer = FrameBuffer::new();
        // Validated lines are at most a few dozen bytes wide.
        framebuffer.init(video.width() as u16, video.height());
        let game = GameEngine::new(config.game);
        game.draw_court(&mut framebuffer);
        let scheduler = Scheduler::new(
            TimingController::new(video.field, video.pulses),
            LineSerializer::new(video.line_repeat, video.height(),
                                video.invert_pixels),
        );
        info!(width = video.width(), height = video.height(),
              line_repeat = video.line_repeat,
              lines = video.field.total_lines(),
              line_bits = video.line_bits(),
              bit_budget = video.line_bit_budget(),
              game_budget_us = video.game_budget_ns() / 1000,
              "video generator configured");
        Ok(Self {
            hardware,
            scheduler,
            framebuffer,
            game,
        })
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn game(&self) -> &GameEngine {
        &self.game
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Handle one timer tick.
    pub fn tick(&mut self) -> ScanLine {
        self.scheduler.tick(&mut self.hardware, &mut self.framebuffer,
                            &mut self.game)
    }

    /// Handle ticks up to and including the last line of the field.
    pub fn run_field(&mut self) {
        let last_line = self.scheduler.timing().field().total_lines() - 1;
        while self.tick().index != last_line {}
    }

    /// The device main loop; it never returns.
    pub fn run(&mut self) -> ! {
        loop {
            self.tick();
        }
    }
}
