//! Shadow copies of write-only controller registers
//!
//! The controller's Display Control and Entry Mode registers cannot be read
//! back, so the driver keeps the last value written and changes one flag at
//! a time. [`Cursor`] tracks where the next character lands.

use crate::command::{
    CTRL_BLINK_ON, CTRL_CURSOR_ON, CTRL_DISPLAY_ON, DISPLAY_CONTROL, ENTRY_INCREMENT, ENTRY_MODE_SET,
    ENTRY_SHIFT,
};
use crate::config::Geometry;

/// Display Control register (display, cursor, blink)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayControl(u8);

impl DisplayControl {
    /// Everything off, the state after initialization
    pub const fn new() -> Self {
        Self(0)
    }

    /// Whether the display is on
    pub const fn display_on(self) -> bool {
        self.0 & CTRL_DISPLAY_ON != 0
    }

    /// Whether the underline cursor is shown
    pub const fn cursor_on(self) -> bool {
        self.0 & CTRL_CURSOR_ON != 0
    }

    /// Whether the cursor cell blinks
    pub const fn blink_on(self) -> bool {
        self.0 & CTRL_BLINK_ON != 0
    }

    /// Switch the display
    pub fn set_display(&mut self, on: bool) {
        set_flag(&mut self.0, CTRL_DISPLAY_ON, on);
    }

    /// Switch the underline cursor
    pub fn set_cursor(&mut self, on: bool) {
        set_flag(&mut self.0, CTRL_CURSOR_ON, on);
    }

    /// Switch blinking
    pub fn set_blink(&mut self, on: bool) {
        set_flag(&mut self.0, CTRL_BLINK_ON, on);
    }

    /// Flag bits without the instruction code
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Display Control instruction for the current flags
    pub const fn command(self) -> u8 {
        DISPLAY_CONTROL | self.0
    }
}

/// Entry Mode register (address direction, display shift)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EntryMode(u8);

impl EntryMode {
    /// Left to right, no display shift
    pub const fn new() -> Self {
        Self(ENTRY_INCREMENT)
    }

    /// Whether the address counter increments after each write
    pub const fn left_to_right(self) -> bool {
        self.0 & ENTRY_INCREMENT != 0
    }

    /// Whether the display shifts with each write
    pub const fn autoscroll(self) -> bool {
        self.0 & ENTRY_SHIFT != 0
    }

    /// Set the text direction
    pub fn set_left_to_right(&mut self, on: bool) {
        set_flag(&mut self.0, ENTRY_INCREMENT, on);
    }

    /// Switch display shift on write
    pub fn set_autoscroll(&mut self, on: bool) {
        set_flag(&mut self.0, ENTRY_SHIFT, on);
    }

    /// Flag bits without the instruction code
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Entry Mode Set instruction for the current flags
    pub const fn command(self) -> u8 {
        ENTRY_MODE_SET | self.0
    }
}

impl Default for EntryMode {
    fn default() -> Self {
        Self::new()
    }
}

fn set_flag(bits: &mut u8, flag: u8, on: bool) {
    if on {
        *bits |= flag;
    } else {
        *bits &= !flag;
    }
}

/// Logical cursor position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    /// Column, 0-based
    pub column: u8,
    /// Row, 0-based
    pub row: u8,
}

impl Cursor {
    /// Cursor at a cell
    pub const fn new(column: u8, row: u8) -> Self {
        Self { column, row }
    }

    /// Cell after this one in reading order
    ///
    /// Wraps to the next row after the last column and to the top-left cell
    /// after the last row. A cursor outside the panel wraps the same way.
    pub const fn advance(self, geometry: Geometry) -> Self {
        let column = self.column.saturating_add(1);
        if column < geometry.columns() {
            Self::new(column, self.row)
        } else {
            self.next_line(geometry)
        }
    }

    /// First cell of the following row, wrapping to the top
    ///
    /// A cursor below the last row also wraps to the top.
    pub const fn next_line(self, geometry: Geometry) -> Self {
        let row = self.row.saturating_add(1);
        if row < geometry.rows() {
            Self::new(0, row)
        } else {
            Self::new(0, 0)
        }
    }
}
