//! Character display adapter (16x2 LCD on an I²C backpack).
//!
//! Composes the two text lines from an [`OccupancyReport`]:
//!
//! ```text
//!   ┌────────────────┐
//!   │Free: 1/3       │
//!   │S1:X S2:- S3:X  │
//!   └────────────────┘
//! ```
//!
//! `X` marks an occupied slot, `-` a free one.  The glyph-level driver is
//! outside this crate; the adapter keeps the composed frame and logs it
//! whenever it changes.

use core::fmt::Write;

use log::info;

use crate::app::ports::DisplayPort;
use crate::model::OccupancyReport;

pub const DISPLAY_COLS: usize = 16;

pub type DisplayLine = heapless::String<DISPLAY_COLS>;

/// Compose both lines for one report.
pub fn compose(report: &OccupancyReport) -> [DisplayLine; 2] {
    let mut top = DisplayLine::new();
    // "Free: n/3" is at most 9 columns; cannot overflow.
    let _ = write!(top, "Free: {}/{}", report.available_count(), report.total());

    let mut bottom = DisplayLine::new();
    for reading in report.readings() {
        let glyph = if reading.state.is_occupied() { 'X' } else { '-' };
        let sep = if reading.slot.index() == 0 { "" } else { " " };
        let _ = write!(bottom, "{}S{}:{}", sep, reading.slot.number(), glyph);
    }
    [top, bottom]
}

pub struct TextDisplay {
    i2c_addr: u8,
    frame: Option<[DisplayLine; 2]>,
}

impl TextDisplay {
    pub fn new(i2c_addr: u8) -> Self {
        info!("LCD | 16x2 display at I2C 0x{:02X}", i2c_addr);
        Self { i2c_addr, frame: None }
    }

    pub fn i2c_addr(&self) -> u8 {
        self.i2c_addr
    }

    /// Last frame shown, if any.
    pub fn frame(&self) -> Option<&[DisplayLine; 2]> {
        self.frame.as_ref()
    }
}

impl DisplayPort for TextDisplay {
    fn show_occupancy(&mut self, report: &OccupancyReport) {
        let frame = compose(report);
        if self.frame.as_ref() != Some(&frame) {
            info!("LCD | {} | {}", frame[0], frame[1]);
        }
        self.frame = Some(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SlotState;

    #[test]
    fn composes_free_count_and_glyphs() {
        let report = OccupancyReport::from_states([
            SlotState::Occupied,
            SlotState::Empty,
            SlotState::Occupied,
        ]);
        let [top, bottom] = compose(&report);
        assert_eq!(top.as_str(), "Free: 1/3");
        assert_eq!(bottom.as_str(), "S1:X S2:- S3:X");
    }

    #[test]
    fn keeps_last_frame() {
        let mut lcd = TextDisplay::new(0x27);
        assert!(lcd.frame().is_none());
        lcd.show_occupancy(&OccupancyReport::from_states([SlotState::Empty; 3]));
        let frame = lcd.frame().unwrap();
        assert_eq!(frame[0].as_str(), "Free: 3/3");
        assert_eq!(frame[1].as_str(), "S1:- S2:- S3:-");
    }
}
