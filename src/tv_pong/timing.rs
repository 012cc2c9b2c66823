// SPDX-FileCopyrightText: 2025 Felix Gruber
//
// SPDX-License-Identifier: GPL-3.0-or-later

/// What a scan line carries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Equalizing,
    VerticalSync,
    ActivePicture,
    Blank,
}

/// Scan line layout of one non-interlaced field.
///
/// Line   Region
/// ----   ------
/// 0      active picture (`active_lines`)
/// ...    post-render blank (`post_render_lines`)
/// ...    vertical sync (`vsync_lines`)
/// ...    pre-render blank (`pre_render_lines`)
///
/// Equalizing lines, if any, are taken from the end of the post-render and
/// the start of the pre-render run, so the field length does not change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FieldTiming {
    pub active_lines: u16,
    pub post_render_lines: u16,
    pub vsync_lines: u16,
    pub pre_render_lines: u16,
    pub equalizing_lines: u16,
}

impl Default for FieldTiming {
    fn default() -> Self {
        Self::NTSC
    }
}

impl FieldTiming {
    /// 262 line NTSC field: 240 + 5 + 3 + 14.
    pub const NTSC: FieldTiming = FieldTiming {
        active_lines: 240,
        post_render_lines: 5,
        vsync_lines: 3,
        pre_render_lines: 14,
        equalizing_lines: 0,
    };

    pub fn with_equalizing(mut self, lines: u16) -> Self {
        self.equalizing_lines = lines;
        self
    }

    pub fn total_lines(&self) -> u16 {
        self.active_lines
            + self.post_render_lines
            + self.vsync_lines
            + self.pre_render_lines
    }

    pub fn post_render_start(&self) -> u16 {
        self.active_lines
    }

    pub fn vsync_start(&self) -> u16 {
        self.post_render_start() + self.post_render_lines
    }

    pub fn pre_render_start(&self) -> u16 {
        self.vsync_start() + self.vsync_lines
    }

    /// Phase of scan line `line`.
    ///
    /// Panics if `line` lies outside the field.
    pub fn phase(&self, line: u16) -> Phase {
        assert!(line < self.total_lines(),
                "scan line {} outside of a {} line field",
                line, self.total_lines());
        let vsync_start = self.vsync_start();
        let pre_render_start = self.pre_render_start();
        if line < self.post_render_start() {
            Phase::ActivePicture
        } else if line < vsync_start - self.equalizing_lines {
            Phase::Blank
        } else if line < vsync_start {
            Phase::Equalizing
        } else if line < pre_render_start {
            Phase::VerticalSync
        } else if line < pre_render_start + self.equalizing_lines {
            Phase::Equalizing
        } else {
            Phase::Blank
        }
    }
}

/// Sync pulse widths in timer compare counts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SyncPulses {
    pub line_period: u16,
    pub horizontal: u16,
    pub vertical: u16,
    pub equalizing: u16,
}

impl Default for SyncPulses {
    fn default() -> Self {
        Self::NTSC_8MHZ
    }
}

impl SyncPulses {
    /// Counts for a timer clocked at 8 MHz. The line period is trimmed
    /// from 508 to make up for interrupt entry latency.
    pub const NTSC_8MHZ: SyncPulses = SyncPulses {
        line_period: 495,
        horizontal: 35,
        vertical: 435,
        equalizing: 17,
    };

    pub fn width(&self, phase: Phase) -> u16 {
        match phase {
            Phase::ActivePicture | Phase::Blank => self.horizontal,
            Phase::VerticalSync => self.vertical,
            Phase::Equalizing => self.equalizing,
        }
    }
}

/// Everything the scheduler needs to know about one scan line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScanLine {
    pub index: u16,
    pub phase: Phase,
    /// Sync width to program for the following line.
    pub pulse_width: u16,
    /// First line of a run of lines with this phase.
    pub entered: bool,
}

impl ScanLine {
    /// The compare value to re-arm the sync timer with, only on phase entry.
    pub fn rearm(&self) -> Option<u16> {
        if self.entered {
            Some(self.pulse_width)
        } else {
            None
        }
    }
}

pub struct TimingController {
    field: FieldTiming,
    pulses: SyncPulses,
    scan_line: u16,
}

impl TimingController {
    pub fn new(field: FieldTiming, pulses: SyncPulses) -> Self {
        Self {
            field,
            pulses,
            scan_line: 0,
        }
    }

    pub fn field(&self) -> &FieldTiming {
        &self.field
    }

    pub fn scan_line(&self) -> u16 {
        self.scan_line
    }

    /// Classify `line` without touching the counter.
    pub fn classify(&self, line: u16) -> ScanLine {
        let phase = self.field.phase(line);
        let previous = if line == 0 {
            self.field.total_lines() - 1
        } else {
            line - 1
        };
        ScanLine {
            index: line,
            phase,
            pulse_width: self.pulses.width(phase),
            entered: self.field.phase(previous) != phase,
        }
    }

    /// Classify the current scan line and move the counter to the next one,
    /// wrapping to 0 at the end of the field.
    pub fn advance(&mut self) -> ScanLine {
        let line = self.classify(self.scan_line);
        self.scan_line += 1;
        if self.scan_line == self.field.total_lines() {
            self.scan_line = 0;
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ntsc_region_boundaries() {
        let field = FieldTiming::NTSC;
        assert_eq!(field.total_lines(), 262);
        assert_eq!(field.phase(0), Phase::ActivePicture);
        assert_eq!(field.phase(239), Phase::ActivePicture);
        assert_eq!(field.phase(240), Phase::Blank);
        assert_eq!(field.phase(244), Phase::Blank);
        assert_eq!(field.phase(245), Phase::VerticalSync);
        assert_eq!(field.phase(247), Phase::VerticalSync);
        assert_eq!(field.phase(248), Phase::Blank);
        assert_eq!(field.phase(261), Phase::Blank);
    }

    #[test]
    fn equalizing_lines_surround_vertical_sync() {
        let field = FieldTiming::NTSC.with_equalizing(2);
        assert_eq!(field.total_lines(), 262);
        assert_eq!(field.phase(242), Phase::Blank);
        assert_eq!(field.phase(243), Phase::Equalizing);
        assert_eq!(field.phase(244), Phase::Equalizing);
        assert_eq!(field.phase(245), Phase::VerticalSync);
        assert_eq!(field.phase(248), Phase::Equalizing);
        assert_eq!(field.phase(249), Phase::Equalizing);
        assert_eq!(field.phase(250), Phase::Blank);
    }

    #[test]
    #[should_panic]
    fn line_outside_field_is_a_bug() {
        FieldTiming::NTSC.phase(262);
    }
}
