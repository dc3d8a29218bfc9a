//! HD44780 command definitions
//!
//! This module defines the instruction bytes and flag bits understood by
//! HD44780-compatible controllers. Instructions are written with the RS line
//! low; character and glyph bytes are written with RS high.
//!
//! ## Command Structure
//!
//! Every instruction is a single byte whose highest set bit selects the
//! instruction and whose lower bits carry its flags:
//!
//! | Instruction          | Byte                  |
//! |----------------------|-----------------------|
//! | Clear display        | `0000 0001`           |
//! | Return home          | `0000 001x`           |
//! | Entry mode set       | `0000 01 I/D S`       |
//! | Display control      | `0000 1 D C B`        |
//! | Cursor/display shift | `0001 S/C R/L xx`     |
//! | Function set         | `001 DL N F FT1 FT0`  |
//! | Set CGRAM address    | `01aa aaaa`           |
//! | Set DDRAM address    | `1aaa aaaa`           |
//!
//! ## Example
//!
//! ```
//! use hd44780_text::command;
//!
//! // Display on, cursor off, blink off
//! let byte = command::DISPLAY_CONTROL | command::CTRL_DISPLAY_ON;
//! assert_eq!(byte, 0x0C);
//!
//! // Address of the first glyph row in CGRAM slot 2
//! assert_eq!(command::SET_CGRAM_ADDR | (2 << 3), 0x50);
//! ```

// Instructions

/// Clear display command (0x01)
///
/// Fills DDRAM with spaces and resets the address counter to 0. This is the
/// slowest instruction (≥6.2ms on WS0010, 1.52ms on HD44780).
pub const CLEAR_DISPLAY: u8 = 0b0000_0001;

/// Return home command (0x02)
///
/// Resets the address counter and undoes any display shift (≥1.52ms).
pub const RETURN_HOME: u8 = 0b0000_0010;

/// Entry mode set command (0x04)
///
/// Combine with [`ENTRY_INCREMENT`] and [`ENTRY_SHIFT`].
pub const ENTRY_MODE_SET: u8 = 0b0000_0100;

/// Display on/off control command (0x08)
///
/// Combine with [`CTRL_DISPLAY_ON`], [`CTRL_CURSOR_ON`] and [`CTRL_BLINK_ON`].
pub const DISPLAY_CONTROL: u8 = 0b0000_1000;

/// Cursor or display shift command (0x10)
pub const CURSOR_SHIFT: u8 = 0b0001_0000;

/// Function set command (0x20)
///
/// Selects the interface width, line count and character size. On WS0010
/// OLED controllers the two lowest bits also select the font table.
pub const FUNCTION_SET: u8 = 0b0010_0000;

/// Set CGRAM address command (0x40)
///
/// The lower six bits address glyph rows: `slot << 3 | row`.
pub const SET_CGRAM_ADDR: u8 = 0b0100_0000;

/// Set DDRAM address command (0x80)
///
/// The lower seven bits are the character cell address.
pub const SET_DDRAM_ADDR: u8 = 0b1000_0000;

// Display control flags

/// Display on (D)
pub const CTRL_DISPLAY_ON: u8 = 0b100;
/// Underline cursor on (C)
pub const CTRL_CURSOR_ON: u8 = 0b010;
/// Blinking block cursor on (B)
pub const CTRL_BLINK_ON: u8 = 0b001;

// Entry mode flags

/// Address counter increments after each write (I/D), text flows left to right
pub const ENTRY_INCREMENT: u8 = 0b10;
/// Shift the whole display on each write (S)
pub const ENTRY_SHIFT: u8 = 0b01;

// Cursor/display shift flags

/// Shift the display instead of the cursor (S/C)
pub const SHIFT_DISPLAY: u8 = 0b1000;
/// Shift to the right (R/L)
pub const SHIFT_RIGHT: u8 = 0b0100;

// Function set flags

/// 8-bit interface (DL)
pub const FN_8BIT: u8 = 0b1_0000;
/// Two display lines (N)
pub const FN_2LINE: u8 = 0b1000;
/// 5x10 dot characters (F)
pub const FN_5X10_DOTS: u8 = 0b0100;

// Power-on synchronization patterns

/// Upper nibble of an 8-bit Function Set, sent three times to force 8-bit mode
pub const SYNC_8BIT_NIBBLE: u8 = 0b0011;
/// Upper nibble of a 4-bit Function Set, switches the interface to 4-bit mode
pub const SYNC_4BIT_NIBBLE: u8 = 0b0010;
/// All-zero nibble used to resynchronize WS0010 controllers
pub const SYNC_RESET_NIBBLE: u8 = 0b0000;
/// Number of [`SYNC_RESET_NIBBLE`] pulses needed by WS0010 controllers
pub const SYNC_RESET_PULSES: usize = 5;

/// Busy flag position in the nibble returned by a status read (DB7)
pub const BUSY_FLAG: u8 = 0b1000;

/// Number of CGRAM glyph slots
pub const GLYPH_SLOTS: u8 = 8;
/// Bytes per glyph bitmap
pub const GLYPH_ROWS: usize = 8;
