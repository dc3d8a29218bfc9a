//! PCF8574 I2C backpack realization of [`Bus`]
//!
//! The ubiquitous "I2C LCD backpack" multiplexes every display line into the
//! single 8-bit output latch of a PCF8574 expander. Each bus primitive updates
//! one bit group of a shadow latch byte and writes the whole byte in one I2C
//! transaction, so the adapter works unchanged behind shared-bus wrappers
//! such as `embedded_hal_bus::i2c::RefCellDevice`.
//!
//! ## Pin Maps
//!
//! | Line      | [`PinMap::Standard`] | [`PinMap::Alternate`] |
//! |-----------|----------------------|-----------------------|
//! | RS        | P0                   | P6                    |
//! | R/W       | P1                   | P5                    |
//! | E         | P2                   | P4                    |
//! | Backlight | P3, active high      | P7, active low        |
//! | D4..D7    | P4..P7               | P0..P3                |
//!
//! ## Reads
//!
//! PCF8574 ports are quasi-bidirectional: a port written high is weakly
//! pulled up and can be driven low by the display. Busy-flag polling is
//! therefore possible when the backpack routes R/W to the expander, which
//! many boards do not. Reads are disabled until [`Pcf8574Bus::with_reads`]
//! is called.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::i2c::{I2c, Operation};
//! use hd44780_text::{PinMap, Pcf8574Bus};
//! # use core::convert::Infallible;
//! # struct MockI2c;
//! # impl embedded_hal::i2c::ErrorType for MockI2c { type Error = Infallible; }
//! # impl I2c for MockI2c {
//! #     fn transaction(
//! #         &mut self,
//! #         _address: u8,
//! #         _operations: &mut [Operation<'_>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! let mut bus = Pcf8574Bus::new(MockI2c, PinMap::Standard);
//! let _ = bus.set_backlight(true);
//! assert_eq!(bus.latch(), 0b0000_1000);
//! ```

use embedded_hal::i2c::I2c;

use crate::bus::{Bus, Direction};

/// Default 7-bit address of PCF8574 backpacks (A0..A2 pulled high)
pub const DEFAULT_ADDRESS: u8 = 0x27;

/// Assignment of display lines to expander ports
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMap {
    /// RS=P0, R/W=P1, E=P2, backlight=P3 (active high), D4..D7=P4..P7
    #[default]
    Standard,
    /// D4..D7=P0..P3, E=P4, R/W=P5, RS=P6, backlight=P7 (active low)
    Alternate,
}

impl PinMap {
    const fn register_select(self) -> u8 {
        match self {
            Self::Standard => 0b0000_0001,
            Self::Alternate => 0b0100_0000,
        }
    }

    const fn read_write(self) -> u8 {
        match self {
            Self::Standard => 0b0000_0010,
            Self::Alternate => 0b0010_0000,
        }
    }

    const fn enable(self) -> u8 {
        match self {
            Self::Standard => 0b0000_0100,
            Self::Alternate => 0b0001_0000,
        }
    }

    const fn backlight(self) -> u8 {
        match self {
            Self::Standard => 0b0000_1000,
            Self::Alternate => 0b1000_0000,
        }
    }

    const fn backlight_active_low(self) -> bool {
        matches!(self, Self::Alternate)
    }

    const fn data_shift(self) -> u8 {
        match self {
            Self::Standard => 4,
            Self::Alternate => 0,
        }
    }

    const fn data(self) -> u8 {
        0x0F << self.data_shift()
    }

    /// Latch value with every line low and the backlight off
    const fn idle(self) -> u8 {
        if self.backlight_active_low() {
            self.backlight()
        } else {
            0
        }
    }
}

/// I2C expander realization of [`Bus`]
///
/// Generic over any [`I2c`] implementation. Pass `&mut i2c` to borrow a bus
/// owned elsewhere, or a shared-bus device to interleave with other
/// peripherals.
pub struct Pcf8574Bus<I2C> {
    /// I2C bus
    i2c: I2C,
    /// 7-bit device address
    address: u8,
    /// Line assignment
    pin_map: PinMap,
    /// Last value written to the expander
    latch: u8,
    /// Whether R/W and the data ports can be read back
    readable: bool,
}

impl<I2C> Pcf8574Bus<I2C>
where
    I2C: I2c,
{
    /// Create a bus at [`DEFAULT_ADDRESS`]
    ///
    /// Nothing is written until the first primitive is called.
    pub fn new(i2c: I2C, pin_map: PinMap) -> Self {
        Self::with_address(i2c, pin_map, DEFAULT_ADDRESS)
    }

    /// Create a bus at a custom 7-bit address
    pub fn with_address(i2c: I2C, pin_map: PinMap, address: u8) -> Self {
        Self {
            i2c,
            address,
            pin_map,
            latch: pin_map.idle(),
            readable: false,
        }
    }

    /// Enable status reads
    ///
    /// Only valid when the backpack wires R/W to the expander.
    pub fn with_reads(mut self) -> Self {
        self.readable = true;
        self
    }

    /// Switch the backlight
    ///
    /// Only the backlight bit of the latch changes.
    pub fn set_backlight(&mut self, on: bool) -> Result<(), I2C::Error> {
        let level = on != self.pin_map.backlight_active_low();
        self.update(self.pin_map.backlight(), level)
    }

    /// Whether the backlight is on
    pub fn backlight(&self) -> bool {
        (self.latch & self.pin_map.backlight() != 0) != self.pin_map.backlight_active_low()
    }

    /// Last value written to the expander
    pub fn latch(&self) -> u8 {
        self.latch
    }

    /// Device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Line assignment
    pub fn pin_map(&self) -> PinMap {
        self.pin_map
    }

    /// Release the I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn update(&mut self, mask: u8, high: bool) -> Result<(), I2C::Error> {
        if high {
            self.latch |= mask;
        } else {
            self.latch &= !mask;
        }
        self.flush()
    }

    fn flush(&mut self) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[self.latch])
    }
}

impl<I2C> Bus for Pcf8574Bus<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn write4(&mut self, nibble: u8) -> Result<(), Self::Error> {
        let data = self.pin_map.data();
        self.latch = (self.latch & !data) | ((nibble & 0x0F) << self.pin_map.data_shift());
        self.flush()
    }

    fn write8(&mut self, byte: u8) -> Result<(), Self::Error> {
        // Only D4..D7 are wired
        self.write4(byte >> 4)
    }

    fn read4(&mut self) -> Result<u8, Self::Error> {
        let mut port = [0u8];
        self.i2c.read(self.address, &mut port)?;
        Ok((port[0] >> self.pin_map.data_shift()) & 0x0F)
    }

    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        match direction {
            // Quasi-bidirectional ports read back only while written high
            Direction::Input => self.update(self.pin_map.data(), true),
            Direction::Output => Ok(()),
        }
    }

    fn set_enable(&mut self, high: bool) -> Result<(), Self::Error> {
        self.update(self.pin_map.enable(), high)
    }

    fn set_register_select(&mut self, high: bool) -> Result<(), Self::Error> {
        self.update(self.pin_map.register_select(), high)
    }

    fn set_read_write(&mut self, high: bool) -> Result<(), Self::Error> {
        self.update(self.pin_map.read_write(), high)
    }

    fn supports_read(&self) -> bool {
        self.readable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = DEFAULT_ADDRESS;

    #[test]
    fn test_initial_latch_has_backlight_off() {
        let mut i2c = I2cMock::new(&[]);
        let standard = Pcf8574Bus::new(i2c.clone(), PinMap::Standard);
        assert_eq!(standard.latch(), 0x00);
        assert!(!standard.backlight());

        let alternate = Pcf8574Bus::new(i2c.clone(), PinMap::Alternate);
        assert_eq!(alternate.latch(), 0x80);
        assert!(!alternate.backlight());
        i2c.done();
    }

    #[test]
    fn test_backlight_sets_only_bit_3() {
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0b0000_0001]),
            I2cTransaction::write(ADDR, vec![0b0000_1001]),
            I2cTransaction::write(ADDR, vec![0b0000_0001]),
        ]);
        let mut bus = Pcf8574Bus::new(i2c.clone(), PinMap::Standard);
        bus.set_register_select(true).unwrap();
        bus.set_backlight(true).unwrap();
        assert!(bus.backlight());
        bus.set_backlight(false).unwrap();
        assert!(!bus.backlight());
        i2c.done();
    }

    #[test]
    fn test_alternate_backlight_is_active_low() {
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0b0000_0000]),
            I2cTransaction::write(ADDR, vec![0b1000_0000]),
        ]);
        let mut bus = Pcf8574Bus::new(i2c.clone(), PinMap::Alternate);
        bus.set_backlight(true).unwrap();
        assert!(bus.backlight());
        bus.set_backlight(false).unwrap();
        i2c.done();
    }

    #[test]
    fn test_standard_map_line_positions() {
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0b1010_0000]),
            I2cTransaction::write(ADDR, vec![0b1010_0100]),
            I2cTransaction::write(ADDR, vec![0b1010_0110]),
            I2cTransaction::write(ADDR, vec![0b1010_0111]),
        ]);
        let mut bus = Pcf8574Bus::new(i2c.clone(), PinMap::Standard);
        bus.write4(0b1010).unwrap();
        bus.set_enable(true).unwrap();
        bus.set_read_write(true).unwrap();
        bus.set_register_select(true).unwrap();
        i2c.done();
    }

    #[test]
    fn test_alternate_map_line_positions() {
        // Backlight off keeps P7 high
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0b1000_0101]),
            I2cTransaction::write(ADDR, vec![0b1001_0101]),
            I2cTransaction::write(ADDR, vec![0b1011_0101]),
            I2cTransaction::write(ADDR, vec![0b1111_0101]),
        ]);
        let mut bus = Pcf8574Bus::new(i2c.clone(), PinMap::Alternate);
        bus.write4(0b0101).unwrap();
        bus.set_enable(true).unwrap();
        bus.set_read_write(true).unwrap();
        bus.set_register_select(true).unwrap();
        i2c.done();
    }

    #[test]
    fn test_read_releases_data_ports() {
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0b1111_0000]),
            I2cTransaction::read(ADDR, vec![0b1000_0010]),
        ]);
        let mut bus = Pcf8574Bus::new(i2c.clone(), PinMap::Standard).with_reads();
        assert!(bus.supports_read());
        bus.set_direction(Direction::Input).unwrap();
        assert_eq!(bus.read4().unwrap(), 0b1000);
        i2c.done();
    }

    #[test]
    fn test_alternate_read_uses_low_nibble() {
        let mut i2c = I2cMock::new(&[I2cTransaction::read(ADDR, vec![0b1111_0110])]);
        let mut bus = Pcf8574Bus::new(i2c.clone(), PinMap::Alternate).with_reads();
        assert_eq!(bus.read4().unwrap(), 0b0110);
        i2c.done();
    }

    #[test]
    fn test_nack_is_reported() {
        let mut i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0b0000_1000]).with_error(ErrorKind::Other)
        ]);
        let mut bus = Pcf8574Bus::new(i2c.clone(), PinMap::Standard);
        assert_eq!(bus.set_backlight(true), Err(ErrorKind::Other));
        i2c.done();
    }

    #[test]
    fn test_shared_bus_device() {
        use core::cell::RefCell;
        use embedded_hal_bus::i2c::RefCellDevice;

        let i2c = I2cMock::new(&[
            I2cTransaction::write(ADDR, vec![0b0000_1000]),
            I2cTransaction::write(0x50, vec![0xAA]),
            I2cTransaction::write(ADDR, vec![0b0000_0000]),
        ]);
        let shared = RefCell::new(i2c);

        let mut lcd = Pcf8574Bus::new(RefCellDevice::new(&shared), PinMap::Standard);
        let mut other = RefCellDevice::new(&shared);
        lcd.set_backlight(true).unwrap();
        other.write(0x50, &[0xAA]).unwrap();
        lcd.set_backlight(false).unwrap();

        drop(lcd);
        shared.into_inner().done();
    }

    #[test]
    fn test_custom_address() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write(0x3F, vec![0b0000_0100])]);
        let mut bus = Pcf8574Bus::with_address(i2c.clone(), PinMap::Standard, 0x3F);
        assert_eq!(bus.address(), 0x3F);
        assert!(!bus.supports_read());
        bus.set_enable(true).unwrap();
        i2c.done();
    }
}
