// SPDX-FileCopyrightText: 2025 Felix Gruber
//
// SPDX-License-Identifier: GPL-3.0-or-later

use super::framebuffer::FrameBuffer;
use super::game::GameEngine;
use super::hardware::Hardware;
use super::serializer::LineSerializer;
use super::timing::{Phase, ScanLine, TimingController};

/// The work done after a timer tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Routine {
    Idle,
    Render,
    Game,
}

/// Dispatches each scan line to the serializer, the game or nothing.
///
/// Rendering only happens on active picture lines and the game only runs on
/// the first blank line after the picture, so the two never touch the
/// framebuffer at the same time.
pub struct Scheduler {
    timing: TimingController,
    serializer: LineSerializer,
    routine: Routine,
}

impl Scheduler {
    pub fn new(timing: TimingController, serializer: LineSerializer) -> Self {
        Self {
            timing,
            serializer,
            routine: Routine::Idle,
        }
    }

    pub fn timing(&self) -> &TimingController {
        &self.timing
    }

    pub fn routine(&self) -> Routine {
        self.routine
    }

    /// Wait for the next line period and handle it.
    pub fn tick<H: Hardware + ?Sized>(&mut self, hardware: &mut H,
                                      framebuffer: &mut FrameBuffer,
                                      game: &mut GameEngine) -> ScanLine {
        hardware.wait_for_tick();
        let line = self.timing.advance();
        if let Some(width) = line.rearm() {
            hardware.program_pulse(width);
        }
        if line.entered {
            self.routine = self.routine_for(&line);
        }

        match self.routine {
            Routine::Render => {
                let row = self.serializer.row_for_line(line.index);
                self.serializer.emit_line(hardware, framebuffer.row(row));
            }
            Routine::Game => {
                hardware.toggle_marker();
                game.run_field(framebuffer, hardware);
                hardware.toggle_marker();
                self.routine = Routine::Idle;
            }
            Routine::Idle => {}
        }
        line
    }

    fn routine_for(&self, line: &ScanLine) -> Routine {
        match line.phase {
            Phase::ActivePicture => Routine::Render,
            Phase::Blank
                if line.index == self.timing.field().post_render_start() => {
                Routine::Game
            }
            _ => Routine::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tv_pong::config::Config;
    use crate::tv_pong::simulator::{ManualPaddles, SimulatedHardware};

    #[test]
    fn game_runs_once_on_the_first_blank_line() {
        let config = Config::default();
        let video = &config.video;
        let mut hardware = SimulatedHardware::new(video, ManualPaddles::default());
        let mut framebuffer = FrameBuffer::with_size(video.width() as u16,
                                                  video.height());
        let mut game = GameEngine::new(config.game);
        let mut scheduler = Scheduler::new(
            TimingController::new(video.field, video.pulses),
            LineSerializer::new(video.line_repeat, video.height(), false),
        );

        let mut game_lines = Vec::new();
        for _ in 0..2 * video.field.total_lines() {
            let toggles = hardware.marker_toggles();
            let line = scheduler.tick(&mut hardware, &mut framebuffer, &mut game);
            if hardware.marker_toggles() != toggles {
                assert_eq!(hardware.marker_toggles(), toggles + 2);
                game_lines.push(line.index);
            }
            let expected = if line.phase == Phase::ActivePicture {
                Routine::Render
            } else {
                Routine::Idle
            };
            assert_eq!(scheduler.routine(), expected);
        }
        assert_eq!(game_lines, vec![240, 240]);
    }
}
