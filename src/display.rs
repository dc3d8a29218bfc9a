//! Core display operations

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::bus::{Bus, BusWidth};
use crate::command::{
    CLEAR_DISPLAY, CURSOR_SHIFT, GLYPH_ROWS, GLYPH_SLOTS, RETURN_HOME, SET_CGRAM_ADDR,
    SHIFT_DISPLAY, SHIFT_RIGHT,
};
use crate::config::{Config, ReadinessStrategy};
use crate::error::Error;
use crate::pcf8574::Pcf8574Bus;
use crate::protocol::Protocol;
use crate::registers::{Cursor, DisplayControl, EntryMode};
use crate::timing::Wait;

type DisplayResult<E> = core::result::Result<(), Error<E>>;

/// Display mode change
///
/// Each mode updates one flag of a shadow register and resends the whole
/// register, or shifts the display window by one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Show DDRAM contents
    DisplayOn,
    /// Blank the panel, DDRAM is kept
    DisplayOff,
    /// Show the underline cursor
    CursorOn,
    /// Hide the underline cursor
    CursorOff,
    /// Blink the cursor cell
    BlinkOn,
    /// Stop blinking
    BlinkOff,
    /// Shift the display window one cell left
    ScrollLeft,
    /// Shift the display window one cell right
    ScrollRight,
    /// Text runs left to right (address counter increments)
    LeftToRight,
    /// Text runs right to left (address counter decrements)
    RightToLeft,
    /// Shift the display with every character written
    ScrollOn,
    /// Keep the display still while writing
    ScrollOff,
}

/// Unconfigured controller
///
/// Holds the bus, delay and configuration until [`Hd44780::init`] runs the
/// power-on sequence. Text operations only exist on the [`Display`] it
/// returns.
pub struct Hd44780<B, D> {
    /// Line-level bus
    bus: B,
    /// Delay provider
    delay: D,
    /// Display configuration
    config: Config,
}

impl<B, D> Hd44780<B, D>
where
    B: Bus,
    D: DelayNs,
{
    /// Create a new controller handle
    ///
    /// Nothing is sent until [`Hd44780::init`].
    pub fn new(bus: B, delay: D, config: Config) -> Self {
        Self { bus, delay, config }
    }

    /// Synchronize and configure the controller
    ///
    /// Runs the power-on handshake, commits the function set, then switches
    /// the display off, clears it, returns home and selects left-to-right
    /// entry. The display stays off until [`Mode::DisplayOn`].
    ///
    /// # Errors
    ///
    /// - `Error::BusyFlagUnsupported` if busy-flag polling was requested on
    ///   a bus that cannot read, before any bus traffic
    /// - `Error::Bus` or `Error::BusyTimeout` from the bus
    pub fn init(self) -> Result<Display<B, D>, Error<B::Error>> {
        let config = self.config;
        let readiness = match config.readiness {
            Some(ReadinessStrategy::BusyFlag) if !self.bus.supports_read() => {
                log::warn!("busy flag polling requested on a write-only bus");
                return Err(Error::BusyFlagUnsupported);
            }
            Some(readiness) => readiness,
            None if self.bus.supports_read() => ReadinessStrategy::BusyFlag,
            None => ReadinessStrategy::FixedDelay,
        };
        log::debug!(
            "init {:?} {:?}, readiness {:?}",
            config.controller,
            config.geometry,
            readiness
        );

        let mut protocol = Protocol::new(self.bus, self.delay, readiness, config.busy_timeout_us);
        protocol.synchronize(config.controller)?;

        let eight_bit = protocol.width() == BusWidth::Eight;
        protocol.write_command(config.function_set(eight_bit), Wait::Command)?;

        let control = DisplayControl::new();
        protocol.write_command(control.command(), Wait::Command)?;
        protocol.write_command(CLEAR_DISPLAY, Wait::ClearDisplay)?;
        protocol.write_command(RETURN_HOME, Wait::ReturnHome)?;

        let entry = EntryMode::new();
        protocol.write_command(entry.command(), Wait::Command)?;
        log::debug!("display ready");

        Ok(Display {
            protocol,
            config,
            control,
            entry,
            cursor: Cursor::default(),
        })
    }
}

/// Initialized character display
///
/// Owns the bus and delay. Created by [`Hd44780::init`].
pub struct Display<B, D> {
    /// Bus, delay and readiness strategy
    protocol: Protocol<B, D>,
    /// Display configuration
    config: Config,
    /// Display Control shadow
    control: DisplayControl,
    /// Entry Mode shadow
    entry: EntryMode,
    /// Next cell for [`Display::write_stream`]
    cursor: Cursor,
}

impl<B, D> Display<B, D>
where
    B: Bus,
    D: DelayNs,
{
    /// Write a character code to a cell
    ///
    /// Addresses the cell explicitly; the stream cursor does not move.
    pub fn write_character_at(&mut self, column: u8, row: u8, code: u8) -> DisplayResult<B::Error> {
        let address = self.address_of(column, row)?;
        self.protocol.write_command(address, Wait::Command)?;
        self.protocol.write_data(code)
    }

    /// Write a character at the cursor and advance it
    ///
    /// The cursor wraps to the next row after the last column and back to
    /// the top after the last row. `b'\n'` moves to the start of the next
    /// row without writing anything.
    pub fn write_stream(&mut self, byte: u8) -> DisplayResult<B::Error> {
        let geometry = self.config.geometry;
        if byte == b'\n' {
            self.cursor = self.cursor.next_line(geometry);
            return Ok(());
        }
        let Cursor { column, row } = self.cursor;
        self.write_character_at(column, row, byte)?;
        self.cursor = self.cursor.advance(geometry);
        Ok(())
    }

    /// Move the stream cursor
    ///
    /// Only the driver's cursor changes; the next stream write addresses
    /// the cell.
    pub fn move_to(&mut self, column: u8, row: u8) -> DisplayResult<B::Error> {
        self.address_of(column, row)?;
        self.cursor = Cursor::new(column, row);
        Ok(())
    }

    /// Clear the display and move the cursor to the top-left cell
    pub fn clear(&mut self) -> DisplayResult<B::Error> {
        self.protocol.write_command(CLEAR_DISPLAY, Wait::ClearDisplay)?;
        self.cursor = Cursor::default();
        Ok(())
    }

    /// Undo any display shift and move the cursor to the top-left cell
    pub fn home(&mut self) -> DisplayResult<B::Error> {
        self.protocol.write_command(RETURN_HOME, Wait::ReturnHome)?;
        self.cursor = Cursor::default();
        Ok(())
    }

    /// Apply a display mode
    ///
    /// The shadow registers only change once the controller has accepted
    /// the instruction.
    pub fn set_mode(&mut self, mode: Mode) -> DisplayResult<B::Error> {
        let mut control = self.control;
        let mut entry = self.entry;
        let command = match mode {
            Mode::DisplayOn | Mode::DisplayOff => {
                control.set_display(mode == Mode::DisplayOn);
                control.command()
            }
            Mode::CursorOn | Mode::CursorOff => {
                control.set_cursor(mode == Mode::CursorOn);
                control.command()
            }
            Mode::BlinkOn | Mode::BlinkOff => {
                control.set_blink(mode == Mode::BlinkOn);
                control.command()
            }
            Mode::ScrollLeft => CURSOR_SHIFT | SHIFT_DISPLAY,
            Mode::ScrollRight => CURSOR_SHIFT | SHIFT_DISPLAY | SHIFT_RIGHT,
            Mode::LeftToRight | Mode::RightToLeft => {
                entry.set_left_to_right(mode == Mode::LeftToRight);
                entry.command()
            }
            Mode::ScrollOn | Mode::ScrollOff => {
                entry.set_autoscroll(mode == Mode::ScrollOn);
                entry.command()
            }
        };
        self.protocol.write_command(command, Wait::Command)?;
        self.control = control;
        self.entry = entry;
        Ok(())
    }

    /// Store a custom glyph in CGRAM
    ///
    /// Slots 0-7 map to character codes 0-7. Each bitmap row uses the low
    /// five bits. Slots above 7 are ignored.
    pub fn define_glyph(&mut self, slot: u8, bitmap: &[u8; GLYPH_ROWS]) -> DisplayResult<B::Error> {
        if slot >= GLYPH_SLOTS {
            log::debug!("ignoring glyph slot {}", slot);
            return Ok(());
        }
        self.protocol
            .write_command(SET_CGRAM_ADDR | (slot << 3), Wait::Command)?;
        for &row in bitmap {
            self.protocol.write_data(row)?;
        }
        Ok(())
    }

    /// Number of character columns
    pub fn columns(&self) -> u8 {
        self.config.geometry.columns()
    }

    /// Number of character rows
    pub fn rows(&self) -> u8 {
        self.config.geometry.rows()
    }

    /// Position of the next stream write
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Display Control shadow
    pub fn control(&self) -> DisplayControl {
        self.control
    }

    /// Entry Mode shadow
    pub fn entry_mode(&self) -> EntryMode {
        self.entry
    }

    /// Readiness strategy in use
    pub fn readiness(&self) -> ReadinessStrategy {
        self.protocol.readiness()
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Release the bus and delay
    pub fn release(self) -> (B, D) {
        self.protocol.release()
    }

    fn address_of(&self, column: u8, row: u8) -> Result<u8, Error<B::Error>> {
        self.config.geometry.address_of(column, row).ok_or_else(|| {
            log::warn!("cell ({}, {}) is outside the panel", column, row);
            Error::OutOfRange { column, row }
        })
    }
}

impl<I2C, D> Display<Pcf8574Bus<I2C>, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Switch the backpack backlight
    pub fn set_backlight(&mut self, on: bool) -> DisplayResult<I2C::Error> {
        self.protocol
            .bus_mut()
            .set_backlight(on)
            .map_err(Error::Bus)
    }

    /// Whether the backpack backlight is on
    pub fn backlight(&self) -> bool {
        self.protocol.bus().backlight()
    }
}
