// SPDX-FileCopyrightText: 2025 Felix Gruber
//
// SPDX-License-Identifier: GPL-3.0-or-later

use tracing::debug;

use super::config::GameConfig;
use super::framebuffer::{FrameBuffer, LineCursor};
use super::hardware::{PaddleChannel, PaddleInput};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn channel(self) -> PaddleChannel {
        match self {
            Side::Left => PaddleChannel::Left,
            Side::Right => PaddleChannel::Right,
        }
    }
}

/// Whether the ball is in play or has to be served on its next move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ServeState {
    InPlay,
    FromLeft,
    FromRight,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ServeDirection {
    Up,
    Down,
}

impl ServeDirection {
    fn toggled(self) -> Self {
        match self {
            ServeDirection::Up => ServeDirection::Down,
            ServeDirection::Down => ServeDirection::Up,
        }
    }
}

/// A vertical paddle of `2 * half_height + 1` pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Paddle {
    column: i32,
    center: i32,
    target: i32,
    half_height: i32,
}

impl Paddle {
    pub fn new(column: i32, center: i32, half_height: i32) -> Self {
        Self {
            column,
            center,
            target: center,
            half_height,
        }
    }

    pub fn column(&self) -> i32 {
        self.column
    }

    pub fn center(&self) -> i32 {
        self.center
    }

    pub fn target(&self) -> i32 {
        self.target
    }

    pub fn covers(&self, y: i32) -> bool {
        (self.center - self.half_height..=self.center + self.half_height)
            .contains(&y)
    }

    pub fn aim(&mut self, target: i32) {
        self.target = target;
    }

    pub fn draw(&self, framebuffer: &mut FrameBuffer) {
        framebuffer.line(self.column, self.center - self.half_height,
                         self.column, self.center + self.half_height);
    }

    /// Move one pixel toward the target.
    ///
    /// Only the trailing end pixel is cleared and the new leading end pixel
    /// set; the rest of the paddle stays untouched.
    pub fn step(&mut self, framebuffer: &mut FrameBuffer) -> bool {
        if self.center > self.target {
            framebuffer.pflip(self.column, self.center + self.half_height);
            self.center -= 1;
            framebuffer.pflip(self.column, self.center - self.half_height);
            true
        } else if self.center < self.target {
            framebuffer.pflip(self.column, self.center - self.half_height);
            self.center += 1;
            framebuffer.pflip(self.column, self.center + self.half_height);
            true
        } else {
            false
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Score {
    left: u8,
    right: u8,
}

impl Score {
    pub fn left(&self) -> u8 {
        self.left
    }

    pub fn right(&self) -> u8 {
        self.right
    }

    pub fn get(&self, side: Side) -> u8 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Give `side` a point; scores wrap from 9 to 0.
    pub fn award(&mut self, side: Side) -> u8 {
        let score = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        *score += 1;
        if *score == 10 {
            *score = 0;
        }
        *score
    }
}

/// A one pixel ball following a Bresenham trajectory.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ball {
    cursor: LineCursor,
    visible: bool,
}

impl Ball {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            cursor: LineCursor::new(x, y, x, y),
            visible: false,
        }
    }

    pub fn position(&self) -> (i32, i32) {
        self.cursor.position()
    }

    pub fn trajectory(&self) -> &LineCursor {
        &self.cursor
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn place(&mut self, x: i32, y: i32) {
        self.cursor = LineCursor::new(x, y, x, y);
    }

    /// Aim from the current position at (x, y).
    pub fn launch(&mut self, x: i32, y: i32) {
        let (x0, y0) = self.position();
        self.cursor = LineCursor::new(x0, y0, x, y);
    }

    pub fn step(&mut self) {
        self.cursor.step();
    }

    // The ball is XORed onto the picture so it crosses the center line
    // without erasing it.
    fn show(&mut self, framebuffer: &mut FrameBuffer) {
        if !self.visible {
            let (x, y) = self.position();
            framebuffer.pflip(x, y);
            self.visible = true;
        }
    }

    fn hide(&mut self, framebuffer: &mut FrameBuffer) {
        if self.visible {
            let (x, y) = self.position();
            framebuffer.pflip(x, y);
            self.visible = false;
        }
    }
}

/// Paddle, ball and score logic, run once per field during vertical blank.
pub struct GameEngine {
    config: GameConfig,
    left: Paddle,
    right: Paddle,
    ball: Ball,
    score: Score,
    serve: ServeState,
    serve_offset: i32,
    serve_direction: ServeDirection,
    skip_cycles: u8,
}

impl GameEngine {
    pub fn new(config: GameConfig) -> Self {
        Self {
            left: Paddle::new(config.left_column, config.paddle_start,
                              config.half_paddle),
            right: Paddle::new(config.right_column, config.paddle_start,
                               config.half_paddle),
            ball: Ball::new(config.right_face(), config.paddle_start),
            score: Score::default(),
            serve: ServeState::FromRight,
            serve_offset: -config.serve_cycle,
            serve_direction: ServeDirection::Up,
            skip_cycles: 0,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn paddle_mut(&mut self, side: Side) -> &mut Paddle {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn serve_state(&self) -> ServeState {
        self.serve
    }

    pub fn serve_offset(&self) -> i32 {
        self.serve_offset
    }

    pub fn serve_direction(&self) -> ServeDirection {
        self.serve_direction
    }

    /// Paddle center for a paddle reading, linear over the paddle range.
    pub fn paddle_target(&self, reading: u8) -> i32 {
        let (low, high) = self.config.paddle_range();
        low + reading as i32 * (high - low) / 255
    }

    /// Draw the static court: boundaries, center line, paddles and scores.
    pub fn draw_court(&self, framebuffer: &mut FrameBuffer) {
        let config = &self.config;
        framebuffer.clear(0);
        framebuffer.line(0, config.top, config.width - 1, config.top);
        framebuffer.line(0, config.bottom, config.width - 1, config.bottom);
        let center = config.center_column();
        for y in (config.top..=config.bottom).step_by(4) {
            framebuffer.line(center, y, center, y + 1);
        }
        self.left.draw(framebuffer);
        self.right.draw(framebuffer);
        framebuffer.write_digit(config.left_score_column, config.score_row,
                                self.score.left());
        framebuffer.write_digit(config.right_score_column, config.score_row,
                                self.score.right());
    }

    /// Game logic for one field.
    ///
    /// Returns the side that scored a point, if any.
    pub fn run_field<I: PaddleInput + ?Sized>(&mut self,
                                              framebuffer: &mut FrameBuffer,
                                              input: &mut I) -> Option<Side> {
        let readings = [input.sample(Side::Left.channel()),
                        input.sample(Side::Right.channel())];
        for (side, reading) in [Side::Left, Side::Right].into_iter()
                                                        .zip(readings) {
            let target = self.paddle_target(reading);
            let paddle = self.paddle_mut(side);
            paddle.aim(target);
            paddle.step(framebuffer);
        }

        self.skip_cycles += 1;
        if self.skip_cycles < self.config.ball_velocity {
            return None;
        }
        self.skip_cycles = 0;
        self.advance_ball(framebuffer)
    }

    fn advance_ball(&mut self, framebuffer: &mut FrameBuffer) -> Option<Side> {
        self.ball.hide(framebuffer);

        self.serve_offset += 1;
        if self.serve_offset > self.config.serve_cycle {
            self.serve_offset = -self.config.serve_cycle;
        }
        self.serve_direction = self.serve_direction.toggled();

        let point = match self.serve {
            ServeState::InPlay => self.collide(),
            ServeState::FromLeft => {
                self.serve_ball(Side::Left);
                None
            }
            ServeState::FromRight => {
                self.serve_ball(Side::Right);
                None
            }
        };

        if self.serve == ServeState::InPlay {
            self.ball.step();
            self.ball.show(framebuffer);
        }

        if let Some(side) = point {
            let digit = self.score.award(side);
            let column = match side {
                Side::Left => self.config.left_score_column,
                Side::Right => self.config.right_score_column,
            };
            framebuffer.write_digit(column, self.config.score_row, digit);
            debug!(?side, left = self.score.left, right = self.score.right,
                   "point scored");
        }
        point
    }

    /// Check the ball against back walls, paddles and boundaries and
    /// re-aim it on a bounce.
    fn collide(&mut self) -> Option<Side> {
        let config = self.config;
        let (x, y) = self.ball.position();
        let (sx, sy) = self.ball.trajectory().direction();

        if x <= config.left_wall() {
            self.serve = ServeState::FromLeft;
            return Some(Side::Right);
        }
        if x >= config.right_wall() {
            self.serve = ServeState::FromRight;
            return Some(Side::Left);
        }

        if (sx < 0 && x == config.left_face() && self.left.covers(y))
           || (sx > 0 && x == config.right_face() && self.right.covers(y)) {
            self.bounce_off_paddle();
        } else if (sy < 0 && y <= config.top_row())
                  || (sy > 0 && y >= config.bottom_row()) {
            self.bounce_off_wall();
        }
        None
    }

    /// Send the ball back across the court, aiming at the boundary it was
    /// heading for and keeping the slope.
    fn bounce_off_paddle(&mut self) {
        let config = &self.config;
        let (x, y) = self.ball.position();
        let (dx, dy) = self.ball.trajectory().delta();
        let (sx, sy) = self.ball.trajectory().direction();
        let (toward, away) = if sy > 0 {
            (config.bottom_row(), config.top_row())
        } else {
            (config.top_row(), config.bottom_row())
        };
        // In a corner the ball also leaves the boundary it touches.
        let target_y = if toward == y { away } else { toward };
        let run = ((target_y - y).abs() * dx / dy.max(1)).max(1);
        let target_x = (x - sx * run).clamp(config.left_face(),
                                            config.right_face());
        self.ball.launch(target_x, target_y);
    }

    /// Mirror the vertical direction, aiming at the paddle column ahead.
    fn bounce_off_wall(&mut self) {
        let config = &self.config;
        let (x, y) = self.ball.position();
        let (dx, dy) = self.ball.trajectory().delta();
        let (sx, sy) = self.ball.trajectory().direction();
        let target_x = if sx > 0 {
            if x < config.right_face() {
                config.right_face()
            } else {
                config.right_wall()
            }
        } else if x > config.left_face() {
            config.left_face()
        } else {
            config.left_wall()
        };
        let rise = ((target_x - x).abs() * dy / dx.max(1)).max(1);
        let target_y = (y - sy * rise).clamp(config.top_row(),
                                             config.bottom_row());
        self.ball.launch(target_x, target_y);
    }

    fn serve_ball(&mut self, side: Side) {
        let config = &self.config;
        let x = match side {
            Side::Left => config.left_face(),
            Side::Right => config.right_face(),
        };
        let y = self.paddle(side).center()
                    .clamp(config.top_row(), config.bottom_row());
        let target_x = config.center_column() + self.serve_offset;
        let target_y = match self.serve_direction {
            ServeDirection::Up => config.top_row(),
            ServeDirection::Down => config.bottom_row(),
        };
        self.ball.place(x, y);
        self.ball.launch(target_x, target_y);
        self.serve = ServeState::InPlay;
        debug!(?side, target_x, target_y, "serve");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tv_pong::simulator::ManualPaddles;

    fn engine_with_velocity(ball_velocity: u8) -> (GameEngine, FrameBuffer) {
        let config = GameConfig { ball_velocity, ..GameConfig::default() };
        let engine = GameEngine::new(config);
        let mut framebuffer = FrameBuffer::with_size(config.width as u16,
                                                     config.height as u16);
        engine.draw_court(&mut framebuffer);
        (engine, framebuffer)
    }

    fn column_pixels(framebuffer: &FrameBuffer, x: i32) -> Vec<i32> {
        (0..framebuffer.height() as i32).filter(|&y| framebuffer.pixel(x, y))
                                        .collect()
    }

    #[test]
    fn paddle_moves_one_pixel_per_field() {
        let mut framebuffer = FrameBuffer::with_size(88, 60);
        let mut paddle = Paddle::new(1, 30, 3);
        paddle.draw(&mut framebuffer);
        paddle.aim(29);
        assert!(paddle.step(&mut framebuffer));
        assert_eq!(paddle.center(), 29);
        assert_eq!(column_pixels(&framebuffer, 1), (26..=32).collect::<Vec<_>>());
        assert!(!paddle.step(&mut framebuffer));
        paddle.aim(31);
        assert!(paddle.step(&mut framebuffer));
        assert_eq!(column_pixels(&framebuffer, 1), (27..=33).collect::<Vec<_>>());
    }

    #[test]
    fn paddle_targets_stay_off_the_boundaries() {
        let (engine, _) = engine_with_velocity(3);
        assert_eq!(engine.paddle_target(0), 5);
        assert_eq!(engine.paddle_target(128), 30);
        assert_eq!(engine.paddle_target(255), 55);
    }

    #[test]
    fn ball_moves_every_nth_field() {
        let (mut engine, mut framebuffer) = engine_with_velocity(3);
        let mut paddles = ManualPaddles::default();
        for _ in 0..2 {
            assert_eq!(engine.run_field(&mut framebuffer, &mut paddles), None);
            assert_eq!(engine.serve_state(), ServeState::FromRight);
            assert_eq!(engine.serve_offset(), -20);
        }
        engine.run_field(&mut framebuffer, &mut paddles);
        assert_eq!(engine.serve_state(), ServeState::InPlay);
        assert_eq!(engine.serve_offset(), -19);
        assert_eq!(engine.serve_direction(), ServeDirection::Down);
        assert_eq!(engine.ball().trajectory().end(), (25, 58));
        assert_eq!(engine.ball().position(), (84, 30));
        assert!(engine.ball().is_visible());
        assert!(framebuffer.pixel(84, 30));
    }

    #[test]
    fn serve_offset_cycles_through_its_range() {
        let (mut engine, mut framebuffer) = engine_with_velocity(1);
        let mut paddles = ManualPaddles::default();
        for _ in 0..40 {
            engine.run_field(&mut framebuffer, &mut paddles);
        }
        assert_eq!(engine.serve_offset(), 20);
        engine.run_field(&mut framebuffer, &mut paddles);
        assert_eq!(engine.serve_offset(), -20);
    }

    #[test]
    fn paddle_hit_keeps_vertical_direction_and_slope() {
        let (mut engine, mut framebuffer) = engine_with_velocity(1);
        let mut paddles = ManualPaddles::default();
        engine.serve = ServeState::InPlay;
        engine.ball.cursor = LineCursor::new(2, 30, -8, 35);
        assert_eq!(engine.run_field(&mut framebuffer, &mut paddles), None);
        let trajectory = engine.ball().trajectory();
        assert_eq!(trajectory.end(), (58, 58));
        assert_eq!(trajectory.direction(), (1, 1));
        assert_eq!(engine.ball().position(), (3, 30));
    }

    #[test]
    fn wall_hit_keeps_horizontal_direction() {
        let (mut engine, mut framebuffer) = engine_with_velocity(1);
        let mut paddles = ManualPaddles::default();
        engine.serve = ServeState::InPlay;
        engine.ball.cursor = LineCursor::new(40, 2, 50, -3);
        engine.run_field(&mut framebuffer, &mut paddles);
        assert_eq!(engine.ball().trajectory().end(), (85, 24));
        assert_eq!(engine.ball().trajectory().direction(), (1, 1));
        assert_eq!(engine.ball().position(), (41, 2));
        // Still on the boundary row but already moving away from it.
        engine.run_field(&mut framebuffer, &mut paddles);
        assert_eq!(engine.ball().trajectory().end(), (85, 24));
    }

    #[test]
    fn right_paddle_hit_mirrors_the_left_one() {
        let (mut engine, mut framebuffer) = engine_with_velocity(1);
        let mut paddles = ManualPaddles::default();
        engine.serve = ServeState::InPlay;
        engine.ball.cursor = LineCursor::new(85, 30, 95, 35);
        assert_eq!(engine.run_field(&mut framebuffer, &mut paddles), None);
        let trajectory = engine.ball().trajectory();
        assert_eq!(trajectory.end(), (29, 58));
        assert_eq!(trajectory.direction(), (-1, 1));
        assert_eq!(engine.ball().position(), (84, 30));
    }

    #[test]
    fn bottom_wall_hit_keeps_horizontal_direction() {
        let (mut engine, mut framebuffer) = engine_with_velocity(1);
        let mut paddles = ManualPaddles::default();
        engine.serve = ServeState::InPlay;
        engine.ball.cursor = LineCursor::new(40, 58, 30, 63);
        engine.run_field(&mut framebuffer, &mut paddles);
        assert_eq!(engine.ball().trajectory().end(), (2, 39));
        assert_eq!(engine.ball().trajectory().direction(), (-1, -1));
        assert_eq!(engine.ball().position(), (39, 58));
        engine.run_field(&mut framebuffer, &mut paddles);
        assert_eq!(engine.ball().trajectory().end(), (2, 39));
    }

    #[test]
    fn corner_hit_leaves_paddle_and_boundary() {
        let (mut engine, mut framebuffer) = engine_with_velocity(1);
        let mut paddles = ManualPaddles::new(255, 128);
        engine.left = Paddle::new(1, 55, 3);
        engine.serve = ServeState::InPlay;
        engine.ball.cursor = LineCursor::new(2, 58, -8, 63);
        assert_eq!(engine.run_field(&mut framebuffer, &mut paddles), None);
        assert_eq!(engine.paddle(Side::Left).center(), 55);
        let trajectory = engine.ball().trajectory();
        assert_eq!(trajectory.end(), (85, 2));
        assert_eq!(trajectory.direction(), (1, -1));
        assert_eq!(engine.ball().position(), (3, 57));
    }

    #[test]
    fn miss_at_right_wall_scores_for_left() {
        let (mut engine, mut framebuffer) = engine_with_velocity(1);
        let mut paddles = ManualPaddles::default();
        engine.serve = ServeState::InPlay;
        engine.ball.place(87, 10);
        let mut expected = framebuffer.clone();
        expected.write_digit(32, 3, 1);

        assert_eq!(engine.run_field(&mut framebuffer, &mut paddles),
                   Some(Side::Left));
        assert_eq!(engine.score(), Score { left: 1, right: 0 });
        assert_eq!(engine.serve_state(), ServeState::FromRight);
        assert_eq!(framebuffer.as_bytes(), expected.as_bytes());

        assert_eq!(engine.run_field(&mut framebuffer, &mut paddles), None);
        assert_eq!(engine.serve_state(), ServeState::InPlay);
        assert_eq!(engine.ball().position().0, 84);
    }

    #[test]
    fn miss_at_left_wall_scores_for_right() {
        let (mut engine, mut framebuffer) = engine_with_velocity(1);
        let mut paddles = ManualPaddles::default();
        engine.serve = ServeState::InPlay;
        engine.ball.place(0, 40);
        assert_eq!(engine.run_field(&mut framebuffer, &mut paddles),
                   Some(Side::Right));
        assert_eq!(engine.score(), Score { left: 0, right: 1 });
        assert_eq!(engine.serve_state(), ServeState::FromLeft);
    }

    #[test]
    fn scores_wrap_after_nine() {
        let mut score = Score::default();
        let awarded: Vec<u8> = (0..10).map(|_| score.award(Side::Right))
                                      .collect();
        assert_eq!(awarded, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 0]);
        assert_eq!(score.get(Side::Right), 0);
        assert_eq!(score.get(Side::Left), 0);
    }

    #[test]
    fn serve_upward_reaches_the_top_row_without_overshoot() {
        let (mut engine, mut framebuffer) = engine_with_velocity(1);
        let mut paddles = ManualPaddles::new(128, 255);
        engine.right = Paddle::new(86, 55, 3);
        engine.serve_offset = -1;
        engine.serve_direction = ServeDirection::Down;

        engine.run_field(&mut framebuffer, &mut paddles);
        assert_eq!(engine.ball().trajectory().end(), (44, 2));
        for _ in 1..53 {
            assert!(engine.ball().position().0 >= 44);
            engine.run_field(&mut framebuffer, &mut paddles);
        }
        assert_eq!(engine.ball().position(), (44, 2));
    }
}
