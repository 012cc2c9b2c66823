// SPDX-FileCopyrightText: 2025 Felix Gruber
//
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt;

use super::fonts;

const BIT_MASK: [u8; 8] = [0x80, 0x40, 0x20, 0x10, 0x08, 0x04, 0x02, 0x01];

/// A packed monochrome bitmap, one bit per pixel, MSB first.
///
/// The corners of a W×H buffer have the following coordinates:
/// (0,   0) (W-1,   0)
/// (0, H-1) (W-1, H-1)
///
/// Every drawing primitive silently ignores coordinates outside the
/// buffer, and does nothing at all until [`FrameBuffer::init`] was called.
#[derive(Clone, Default)]
pub struct FrameBuffer {
    bytes: Vec<u8>,
    width: u16,
    height: u16,
    row_bytes: usize,
    initialized: bool,
}

impl FrameBuffer {
    /// An uninitialized buffer; all drawing is a no-op until `init`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(width: u16, height: u16) -> Self {
        let mut buffer = Self::new();
        buffer.init(width, height);
        buffer
    }

    pub fn init(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.row_bytes = (width as usize).div_ceil(8);
        self.bytes = vec![0; self.row_bytes * height as usize];
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The packed bytes of row `y`, empty if there is no such row.
    pub fn row(&self, y: usize) -> &[u8] {
        if !self.initialized || y >= self.height as usize {
            return &[];
        }
        &self.bytes[y * self.row_bytes..(y + 1) * self.row_bytes]
    }

    pub fn pixel(&self, x: i32, y: i32) -> bool {
        match self.locate(x, y) {
            Some((index, mask)) => self.bytes[index] & mask != 0,
            None => false,
        }
    }

    pub fn clear(&mut self, pattern: u8) {
        if !self.initialized {
            return;
        }
        self.bytes.fill(pattern);
    }

    pub fn pset(&mut self, x: i32, y: i32) {
        if let Some((index, mask)) = self.locate(x, y) {
            self.bytes[index] |= mask;
        }
    }

    pub fn preset(&mut self, x: i32, y: i32) {
        if let Some((index, mask)) = self.locate(x, y) {
            self.bytes[index] &= !mask;
        }
    }

    pub fn pflip(&mut self, x: i32, y: i32) {
        if let Some((index, mask)) = self.locate(x, y) {
            self.bytes[index] ^= mask;
        }
    }

    /// Draw a line between (x0, y0) and (x1, y1), both endpoints included.
    ///
    /// Parts of the line outside the buffer are clipped.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        if !self.initialized {
            return;
        }
        for (x, y) in LineCursor::new(x0, y0, x1, y1).points() {
            self.pset(x, y);
        }
    }

    /// Blit score digit `digit` with its top left corner at (x, y).
    ///
    /// The whole 8 pixel wide glyph cell is overwritten, so a new digit
    /// replaces the previous one. Anything but 0–9 is ignored.
    pub fn write_digit(&mut self, x: i32, y: i32, digit: u8) {
        if !self.initialized {
            return;
        }
        let Some(glyph) = fonts::digit(digit) else {
            return;
        };
        for (dy, bits) in glyph.iter().enumerate() {
            let row = y + dy as i32;
            for (dx, mask) in BIT_MASK.iter().enumerate() {
                let column = x + dx as i32;
                if bits & mask != 0 {
                    self.pset(column, row);
                } else {
                    self.preset(column, row);
                }
            }
        }
    }

    fn locate(&self, x: i32, y: i32) -> Option<(usize, u8)> {
        if !self.initialized
           || x < 0 || y < 0
           || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        Some((y * self.row_bytes + x / 8, BIT_MASK[x % 8]))
    }
}

impl fmt::Display for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if self.pixel(x, y) {
                    write!(f, "*")?;
                } else {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Integer Bresenham state for walking a straight line one pixel at a time.
///
/// The cursor keeps going past the end point on the same slope, which is
/// what the ball relies on when it misses a paddle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LineCursor {
    x: i32,
    y: i32,
    end_x: i32,
    end_y: i32,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
}

impl LineCursor {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        Self {
            x: x0,
            y: y0,
            end_x: x1,
            end_y: y1,
            dx,
            dy,
            sx: if x0 < x1 { 1 } else { -1 },
            sy: if y0 < y1 { 1 } else { -1 },
            err: (if dx > dy { dx } else { -dy }) / 2,
        }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn end(&self) -> (i32, i32) {
        (self.end_x, self.end_y)
    }

    /// Absolute distances (dx, dy) between start and end point.
    pub fn delta(&self) -> (i32, i32) {
        (self.dx, self.dy)
    }

    /// Step signs (sx, sy), each ±1.
    pub fn direction(&self) -> (i32, i32) {
        (self.sx, self.sy)
    }

    pub fn is_at_end(&self) -> bool {
        self.x == self.end_x && self.y == self.end_y
    }

    pub fn step(&mut self) {
        let e2 = self.err;
        if e2 > -self.dx {
            self.err -= self.dy;
            self.x += self.sx;
        }
        if e2 < self.dy {
            self.err += self.dx;
            self.y += self.sy;
        }
    }

    /// All points from the current position up to and including the end.
    pub fn points(self) -> Points {
        Points { cursor: self, done: false }
    }
}

pub struct Points {
    cursor: LineCursor,
    done: bool,
}

impl Iterator for Points {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let point = self.cursor.position();
        if self.cursor.is_at_end() {
            self.done = true;
        } else {
            self.cursor.step();
        }
        Some(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_stride_rounds_up_to_whole_bytes() {
        let buffer = FrameBuffer::with_size(13, 4);
        assert_eq!(buffer.row_bytes(), 2);
        assert_eq!(buffer.as_bytes().len(), 8);
        assert_eq!(buffer.row(3).len(), 2);
        assert!(buffer.row(4).is_empty());
    }

    #[test]
    fn uninitialized_buffer_ignores_drawing() {
        let mut buffer = FrameBuffer::new();
        buffer.clear(0xFF);
        buffer.pset(0, 0);
        buffer.line(0, 0, 10, 10);
        buffer.write_digit(0, 0, 8);
        assert!(!buffer.is_initialized());
        assert!(buffer.as_bytes().is_empty());
        assert!(!buffer.pixel(0, 0));
    }

    #[test]
    fn pixels_are_msb_first() {
        let mut buffer = FrameBuffer::with_size(16, 2);
        buffer.pset(0, 0);
        buffer.pset(9, 1);
        assert_eq!(buffer.as_bytes(), &[0x80, 0x00, 0x00, 0x40]);
    }

    #[test]
    fn cursor_continues_past_the_end_point() {
        let mut cursor = LineCursor::new(0, 0, 2, 1);
        let mut visited = vec![cursor.position()];
        for _ in 0..4 {
            cursor.step();
            visited.push(cursor.position());
        }
        assert_eq!(visited, vec![(0, 0), (1, 0), (2, 1), (3, 1), (4, 2)]);
    }
}
