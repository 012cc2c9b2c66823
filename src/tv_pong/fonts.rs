// SPDX-FileCopyrightText: 2025 Felix Gruber
//
// SPDX-License-Identifier: GPL-3.0-or-later

pub const GLYPH_HEIGHT: usize = 7;

/// Score digits 0–9, one byte per row, MSB is the leftmost pixel.
///
/// Glyphs are 5 pixels wide; the low bits stay clear so neighbouring
/// glyphs never touch.
pub const DIGITS: [[u8; GLYPH_HEIGHT]; 10] = [
    [0x70, 0x88, 0x98, 0xA8, 0xC8, 0x88, 0x70],  // 0
    [0x20, 0x60, 0x20, 0x20, 0x20, 0x20, 0x70],  // 1
    [0x70, 0x88, 0x08, 0x10, 0x20, 0x40, 0xF8],  // 2
    [0xF8, 0x10, 0x20, 0x10, 0x08, 0x88, 0x70],  // 3
    [0x10, 0x30, 0x50, 0x90, 0xF8, 0x10, 0x10],  // 4
    [0xF8, 0x80, 0xF0, 0x08, 0x08, 0x88, 0x70],  // 5
    [0x30, 0x40, 0x80, 0xF0, 0x88, 0x88, 0x70],  // 6
    [0xF8, 0x08, 0x10, 0x20, 0x40, 0x40, 0x40],  // 7
    [0x70, 0x88, 0x88, 0x70, 0x88, 0x88, 0x70],  // 8
    [0x70, 0x88, 0x88, 0x78, 0x08, 0x10, 0x60],  // 9
];

pub fn digit(index: u8) -> Option<&'static [u8; GLYPH_HEIGHT]> {
    DIGITS.get(index as usize)
}
