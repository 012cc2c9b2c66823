// SPDX-FileCopyrightText: 2025 Felix Gruber
//
// SPDX-License-Identifier: GPL-3.0-or-later

use super::hardware::{wait_until_ready, SerialOutput};

/// Streams framebuffer rows out of the serial transmitter.
pub struct LineSerializer {
    line_repeat: u16,
    rows: u16,
    invert: bool,
}

impl LineSerializer {
    pub fn new(line_repeat: u16, rows: u16, invert: bool) -> Self {
        Self {
            line_repeat: line_repeat.max(1),
            rows: rows.max(1),
            invert,
        }
    }

    /// Framebuffer row shown on scan line `active_line` of the picture.
    ///
    /// Each row is shown on `line_repeat` consecutive lines.
    pub fn row_for_line(&self, active_line: u16) -> usize {
        ((active_line / self.line_repeat) % self.rows) as usize
    }

    /// Shift out one row followed by a blank padding byte.
    ///
    /// The first byte is loaded before the transmitter is enabled so the
    /// pixels start right at the end of the back porch.
    pub fn emit_line<S: SerialOutput + ?Sized>(&self, serial: &mut S,
                                              row: &[u8]) {
        let mut bytes = row.iter();
        if let Some(&first) = bytes.next() {
            serial.write_byte(self.encode(first));
        }
        serial.enable_transmitter();
        for &byte in bytes {
            wait_until_ready(serial);
            serial.write_byte(self.encode(byte));
        }
        wait_until_ready(serial);
        serial.write_byte(self.encode(0));
        // Once the padding byte moved to the shift register the last
        // pixel byte is out and the pin stays black until disabled.
        wait_until_ready(serial);
        serial.disable_transmitter();
        serial.clear_transmission_complete();
    }

    fn encode(&self, pixels: u8) -> u8 {
        if self.invert {
            !pixels
        } else {
            pixels
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSerial {
        enabled: bool,
        sent: Vec<u8>,
        sent_while_disabled: usize,
        cleared: bool,
    }

    impl SerialOutput for RecordingSerial {
        fn enable_transmitter(&mut self) {
            self.enabled = true;
        }

        fn disable_transmitter(&mut self) {
            self.enabled = false;
        }

        fn is_ready(&mut self) -> bool {
            true
        }

        fn write_byte(&mut self, byte: u8) {
            if !self.enabled {
                self.sent_while_disabled += 1;
            }
            self.sent.push(byte);
        }

        fn clear_transmission_complete(&mut self) {
            self.cleared = true;
        }
    }

    #[test]
    fn row_is_followed_by_blank_padding() {
        let serializer = LineSerializer::new(4, 60, false);
        let mut serial = RecordingSerial::default();
        serializer.emit_line(&mut serial, &[0xF0, 0x0F, 0xAA]);
        assert_eq!(serial.sent, vec![0xF0, 0x0F, 0xAA, 0x00]);
        assert_eq!(serial.sent_while_disabled, 1);
        assert!(!serial.enabled);
        assert!(serial.cleared);
    }

    #[test]
    fn inverted_output_keeps_padding_black() {
        let serializer = LineSerializer::new(4, 60, true);
        let mut serial = RecordingSerial::default();
        serializer.emit_line(&mut serial, &[0xF0, 0x00]);
        assert_eq!(serial.sent, vec![0x0F, 0xFF, 0xFF]);
    }

    #[test]
    fn each_row_is_repeated_line_repeat_times() {
        let serializer = LineSerializer::new(3, 16, false);
        let rows: Vec<usize> = (0..48).map(|line| serializer.row_for_line(line))
                                      .collect();
        for (row, lines) in rows.chunks(3).enumerate() {
            assert_eq!(lines, &[row, row, row]);
        }
        assert_eq!(serializer.row_for_line(48), 0);
    }
}
