// SPDX-FileCopyrightText: 2025 Felix Gruber
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Host-side stand-ins for the board and the TV set it drives.

use std::fmt;
use std::mem;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{trace, warn};

use super::config::VideoConfig;
use super::hardware::{
    PaddleChannel, PaddleInput, ScopeMarker, SerialOutput, SyncPin, TickSource,
};

/// The decoded picture, one entry per scan line of active video.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Picture {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
}

impl Picture {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.pixels[y * self.width + x]
    }

    pub fn line(&self, y: usize) -> &[bool] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    fn set_line(&mut self, y: usize, bytes: &[u8], inverted: bool) {
        let width = self.width;
        let line = &mut self.pixels[y * width..(y + 1) * width];
        for (x, pixel) in line.iter_mut().enumerate() {
            let byte = bytes.get(x / 8)
                            .map(|&b| if inverted { !b } else { b })
                            .unwrap_or(0);
            *pixel = byte & (0x80 >> (x % 8)) != 0;
        }
    }
}

impl fmt::Display for Picture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for &pixel in self.line(y) {
                write!(f, "{}", if pixel { '*' } else { ' ' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// What the receiver saw between two vertical sync pulses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldStats {
    pub lines: u32,
    pub long_pulses: u32,
    pub video_lines: u32,
    pub widest_line_bits: u32,
    pub overruns: u32,
}

/// Decodes the sync and pixel stream like a monitor would.
///
/// A pulse longer than halfway between horizontal and vertical sync width
/// counts as vertical sync. The first one of a run ends the field and
/// moves the raster back to the top; every line carrying pixel data after
/// that is drawn on the next raster line.
pub struct TvReceiver {
    picture: Picture,
    vsync_threshold: u16,
    bit_budget: u32,
    inverted: bool,
    in_vsync: bool,
    raster: usize,
    fields: u64,
    current: FieldStats,
    last: FieldStats,
}

impl TvReceiver {
    pub fn new(config: &VideoConfig) -> Self {
        let pulses = &config.pulses;
        Self {
            picture: Picture::new(config.width() as usize,
                                  config.field.active_lines as usize),
            vsync_threshold: (pulses.horizontal + pulses.vertical) / 2,
            bit_budget: config.line_bit_budget(),
            inverted: config.invert_pixels,
            in_vsync: false,
            raster: 0,
            fields: 0,
            current: FieldStats::default(),
            last: FieldStats::default(),
        }
    }

    pub fn picture(&self) -> &Picture {
        &self.picture
    }

    /// Number of vertical sync runs seen so far.
    pub fn fields(&self) -> u64 {
        self.fields
    }

    pub fn last_field(&self) -> FieldStats {
        self.last
    }

    pub fn receive_line(&mut self, pulse_width: u16, bytes: &[u8]) {
        if pulse_width >= self.vsync_threshold {
            if !self.in_vsync {
                self.in_vsync = true;
                self.finish_field();
            }
            self.current.long_pulses += 1;
        } else {
            self.in_vsync = false;
        }
        self.current.lines += 1;

        if bytes.is_empty() {
            return;
        }
        let bits = bytes.len() as u32 * 8;
        self.current.video_lines += 1;
        self.current.widest_line_bits = self.current.widest_line_bits.max(bits);
        if bits > self.bit_budget {
            self.current.overruns += 1;
            warn!(line = self.raster, bits, budget = self.bit_budget,
                  "pixel data overran the active video window");
        }
        if self.raster < self.picture.height() {
            self.picture.set_line(self.raster, bytes, self.inverted);
        }
        self.raster += 1;
    }

    fn finish_field(&mut self) {
        self.last = mem::take(&mut self.current);
        self.fields += 1;
        self.raster = 0;
        trace!(field = self.fields, lines = self.last.lines,
               video_lines = self.last.video_lines, "field received");
    }
}

/// Board model feeding a [`TvReceiver`].
///
/// The sync compare value is double buffered: a width programmed during one
/// line period applies to the next. Each poll of the transmitter's ready
/// flag shifts out the byte waiting in the data register.
pub struct SimulatedHardware<P> {
    receiver: TvReceiver,
    paddles: P,
    pending_pulse: u16,
    line_pulse: u16,
    transmitter_enabled: bool,
    data_register: Option<u8>,
    complete: bool,
    line: Vec<u8>,
    ticks: u64,
    marker_toggles: u64,
}

impl<P> SimulatedHardware<P> {
    pub fn new(config: &VideoConfig, paddles: P) -> Self {
        Self {
            receiver: TvReceiver::new(config),
            paddles,
            pending_pulse: config.pulses.horizontal,
            line_pulse: config.pulses.horizontal,
            transmitter_enabled: false,
            data_register: None,
            complete: false,
            line: Vec::with_capacity(config.row_bytes as usize + 1),
            ticks: 0,
            marker_toggles: 0,
        }
    }

    pub fn receiver(&self) -> &TvReceiver {
        &self.receiver
    }

    pub fn paddles_mut(&mut self) -> &mut P {
        &mut self.paddles
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn marker_toggles(&self) -> u64 {
        self.marker_toggles
    }

    fn shift_out(&mut self) {
        if let Some(byte) = self.data_register.take() {
            self.line.push(byte);
            self.complete = true;
        }
    }

    fn finish_line(&mut self) {
        if self.transmitter_enabled {
            warn!(tick = self.ticks, "transmitter still enabled at end of line");
            self.shift_out();
        }
        if self.complete {
            warn!(tick = self.ticks, "transmission complete flag left set");
            self.complete = false;
        }
        self.receiver.receive_line(self.line_pulse, &self.line);
        self.line.clear();
    }
}

impl<P> TickSource for SimulatedHardware<P> {
    fn wait_for_tick(&mut self) {
        if self.ticks > 0 {
            self.finish_line();
        }
        self.line_pulse = self.pending_pulse;
        self.ticks += 1;
    }
}

impl<P> SyncPin for SimulatedHardware<P> {
    fn program_pulse(&mut self, width: u16) {
        self.pending_pulse = width;
    }
}

impl<P> SerialOutput for SimulatedHardware<P> {
    fn enable_transmitter(&mut self) {
        self.transmitter_enabled = true;
        self.complete = false;
    }

    fn disable_transmitter(&mut self) {
        if self.data_register.take().is_some() {
            warn!(tick = self.ticks, "transmitter disabled with a byte pending");
        }
        self.transmitter_enabled = false;
    }

    fn is_ready(&mut self) -> bool {
        if self.transmitter_enabled {
            self.shift_out();
        }
        self.data_register.is_none()
    }

    fn write_byte(&mut self, byte: u8) {
        if self.data_register.is_some() {
            warn!(tick = self.ticks, "byte written before the transmitter was ready");
        }
        self.data_register = Some(byte);
    }

    fn clear_transmission_complete(&mut self) {
        self.complete = false;
    }
}

impl<P: PaddleInput> PaddleInput for SimulatedHardware<P> {
    fn sample(&mut self, channel: PaddleChannel) -> u8 {
        self.paddles.sample(channel)
    }
}

impl<P> ScopeMarker for SimulatedHardware<P> {
    fn toggle_marker(&mut self) {
        self.marker_toggles += 1;
    }
}

/// Paddle readings set by hand, e.g. from the keyboard.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ManualPaddles {
    readings: [u8; 2],
}

impl Default for ManualPaddles {
    fn default() -> Self {
        Self::new(128, 128)
    }
}

impl ManualPaddles {
    pub fn new(left: u8, right: u8) -> Self {
        Self {
            readings: [left, right],
        }
    }

    pub fn reading(&self, channel: PaddleChannel) -> u8 {
        self.readings[channel.index()]
    }

    pub fn set(&mut self, channel: PaddleChannel, reading: u8) {
        self.readings[channel.index()] = reading;
    }

    pub fn nudge(&mut self, channel: PaddleChannel, delta: i16) {
        let reading = &mut self.readings[channel.index()];
        *reading = (*reading as i16 + delta).clamp(0, 255) as u8;
    }
}

impl PaddleInput for ManualPaddles {
    fn sample(&mut self, channel: PaddleChannel) -> u8 {
        self.reading(channel)
    }
}

/// Adds reproducible jitter of up to ±`amplitude` to another paddle source,
/// like a noisy potentiometer would.
pub struct NoisyPaddles<P> {
    inner: P,
    amplitude: u8,
    rng: ChaCha8Rng,
}

impl<P> NoisyPaddles<P> {
    pub fn new(inner: P, amplitude: u8, seed: u64) -> Self {
        Self {
            inner,
            amplitude,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn inner_mut(&mut self) -> &mut P {
        &mut self.inner
    }
}

impl<P: PaddleInput> PaddleInput for NoisyPaddles<P> {
    fn sample(&mut self, channel: PaddleChannel) -> u8 {
        let reading = self.inner.sample(channel);
        if self.amplitude == 0 {
            return reading;
        }
        let amplitude = self.amplitude as i16;
        let jitter = self.rng.random_range(-amplitude..=amplitude);
        (reading as i16 + jitter).clamp(0, 255) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tv_pong::serializer::LineSerializer;

    #[test]
    fn serialized_line_leaves_the_transmitter_idle() {
        let config = VideoConfig::default();
        let mut hardware = SimulatedHardware::new(&config,
                                                  ManualPaddles::default());
        let serializer = LineSerializer::new(config.line_repeat,
                                             config.height(), false);
        hardware.wait_for_tick();
        serializer.emit_line(&mut hardware, &[0xFF; 11]);
        assert!(!hardware.transmitter_enabled);
        assert!(!hardware.complete);
        assert_eq!(hardware.line.len(), 12);
        assert_eq!(hardware.line.last(), Some(&0));
    }

    #[test]
    fn unacknowledged_completion_is_dropped_at_end_of_line() {
        let config = VideoConfig::default();
        let mut hardware = SimulatedHardware::new(&config,
                                                  ManualPaddles::default());
        hardware.wait_for_tick();
        hardware.write_byte(0xF0);
        hardware.enable_transmitter();
        assert!(hardware.is_ready());
        hardware.disable_transmitter();
        assert!(hardware.complete);
        hardware.wait_for_tick();
        assert!(!hardware.complete);
        assert_eq!(hardware.receiver().picture().line(0)[..8],
                   [true, true, true, true, false, false, false, false]);
    }

    #[test]
    fn receiver_restarts_raster_on_vertical_sync() {
        let config = VideoConfig::default();
        let mut receiver = TvReceiver::new(&config);
        let mut row = vec![0u8; 12];
        row[0] = 0x80;
        receiver.receive_line(35, &row);
        receiver.receive_line(435, &[]);
        receiver.receive_line(435, &[]);
        row[0] = 0x01;
        receiver.receive_line(35, &row);
        assert_eq!(receiver.fields(), 1);
        assert_eq!(receiver.last_field(), FieldStats {
            lines: 1,
            long_pulses: 0,
            video_lines: 1,
            widest_line_bits: 96,
            overruns: 0,
        });
        assert!(receiver.picture().pixel(7, 0));
        assert!(!receiver.picture().pixel(0, 0));
    }

    #[test]
    fn noisy_paddles_stay_within_amplitude() {
        let mut paddles = NoisyPaddles::new(ManualPaddles::new(0, 250), 4, 7);
        for _ in 0..100 {
            assert!(paddles.sample(PaddleChannel::Left) <= 4);
            assert!(paddles.sample(PaddleChannel::Right) >= 246);
        }
    }
}
