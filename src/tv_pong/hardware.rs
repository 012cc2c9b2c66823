// SPDX-FileCopyrightText: 2025 Felix Gruber
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Capabilities the video generator and the game need from the board.
//!
//! Register programming lives behind these traits; the core only ever
//! busy-waits on flags the hardware raises itself.

/// Periodic timer firing once per scan line.
pub trait TickSource {
    /// Idle until the next line period starts.
    fn wait_for_tick(&mut self);
}

/// Sync output driven by the line timer's compare unit.
pub trait SyncPin {
    /// Set the sync pulse width, in timer counts, for the next line period.
    fn program_pulse(&mut self, width: u16);
}

/// Synchronous serial transmitter shifting out pixels, MSB first.
pub trait SerialOutput {
    fn enable_transmitter(&mut self);

    fn disable_transmitter(&mut self);

    /// "Data register empty": the next byte may be written.
    fn is_ready(&mut self) -> bool;

    fn write_byte(&mut self, byte: u8);

    /// Acknowledge the "transmission complete" flag raised by the last
    /// shifted byte.
    fn clear_transmission_complete(&mut self);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PaddleChannel {
    Left,
    Right,
}

impl PaddleChannel {
    pub fn index(self) -> usize {
        match self {
            PaddleChannel::Left => 0,
            PaddleChannel::Right => 1,
        }
    }
}

/// Analog paddle sampler.
pub trait PaddleInput {
    /// Latest reading of `channel`, 0 at one end of the knob, 255 at the other.
    fn sample(&mut self, channel: PaddleChannel) -> u8;
}

/// Spare output pin for an oscilloscope trigger.
pub trait ScopeMarker {
    fn toggle_marker(&mut self);
}

pub trait Hardware: TickSource + SyncPin + SerialOutput + PaddleInput + ScopeMarker {}

impl<T> Hardware for T
where
    T: TickSource + SyncPin + SerialOutput + PaddleInput + ScopeMarker,
{}

/// Poll the transmitter until it accepts the next byte.
///
/// The wait is bounded by the serial bit clock once transmission started.
pub fn wait_until_ready<S: SerialOutput + ?Sized>(serial: &mut S) {
    while !serial.is_ready() {
        std::hint::spin_loop();
    }
}
