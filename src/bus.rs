//! Bus capability abstraction
//!
//! This module provides the [`Bus`] trait, the line-level contract the
//! protocol engine drives, and [`ParallelBus`], its direct-GPIO realization.
//! The I2C expander realization lives in [`crate::pcf8574`].
//!
//! ## Hardware Requirements
//!
//! A parallel HD44780 connection uses:
//! - **RS**: Register select (output, low=instruction, high=data)
//! - **R/W**: Read/write (output, optional, high=read)
//! - **E**: Enable (output, falling edge latches)
//! - **D4..D7** or **D0..D7**: Data lines
//!
//! Reading the busy flag needs the R/W line and data pins that can be both
//! driven and sampled, e.g. open-drain outputs with pull-ups or flex pins.
//! Setting the data direction to input releases every data line high so the
//! controller can pull it low.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hd44780_text::{Bus, Direction, ParallelBus};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::{InputPin, OutputPin};
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! # }
//! // RS, R/W, E and D4..D7
//! let mut bus = ParallelBus::with_read_write(
//!     MockPin,
//!     MockPin,
//!     MockPin,
//!     [MockPin, MockPin, MockPin, MockPin],
//! );
//! assert!(bus.supports_read());
//!
//! let _ = bus.set_register_select(false);
//! let _ = bus.write4(0b0011);
//! let _ = bus.set_direction(Direction::Input);
//! let _ = bus.read4();
//! ```

use core::fmt::Debug;
use core::marker::PhantomData;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

type BusResult<T, E> = core::result::Result<T, E>;

/// Electrical direction of the data lines
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Lines released so the controller can drive them
    Input,
    /// Lines driven by the host
    #[default]
    Output,
}

/// Number of data lines wired to the controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusWidth {
    /// D4..D7, every byte is sent as two nibbles
    Four,
    /// D0..D7, every byte is sent at once
    Eight,
}

/// Trait for the line-level connection to an HD44780 controller
///
/// Each call is a blocking hardware access. The implementation owns no
/// protocol state: sequencing, enable pulses and timing are done by the
/// driver.
///
/// ## Implementing
///
/// For most cases, use [`ParallelBus`] or [`Pcf8574Bus`](crate::Pcf8574Bus).
/// Implement this trait on your own type for other wirings, such as a
/// shift register or a different I2C expander.
pub trait Bus {
    /// Error type for bus operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Drive D4..D7 with the lower four bits of `nibble`
    ///
    /// The data direction must be [`Direction::Output`].
    fn write4(&mut self, nibble: u8) -> BusResult<(), Self::Error>;

    /// Drive D0..D7 with `byte`
    ///
    /// The data direction must be [`Direction::Output`].
    fn write8(&mut self, byte: u8) -> BusResult<(), Self::Error>;

    /// Sample D4..D7 into the lower four bits of the result
    ///
    /// Only called when [`Bus::supports_read`] returns true, with the data
    /// direction set to [`Direction::Input`].
    fn read4(&mut self) -> BusResult<u8, Self::Error>;

    /// Switch the electrical direction of the data lines
    fn set_direction(&mut self, direction: Direction) -> BusResult<(), Self::Error>;

    /// Drive the enable (E) line
    fn set_enable(&mut self, high: bool) -> BusResult<(), Self::Error>;

    /// Drive the register select (RS) line
    fn set_register_select(&mut self, high: bool) -> BusResult<(), Self::Error>;

    /// Drive the read/write (R/W) line
    fn set_read_write(&mut self, high: bool) -> BusResult<(), Self::Error>;

    /// Number of data lines
    fn width(&self) -> BusWidth {
        BusWidth::Four
    }

    /// Whether status reads are possible on this wiring
    fn supports_read(&self) -> bool {
        false
    }
}

impl<T: Bus + ?Sized> Bus for &mut T {
    type Error = T::Error;

    fn write4(&mut self, nibble: u8) -> BusResult<(), Self::Error> {
        T::write4(self, nibble)
    }

    fn write8(&mut self, byte: u8) -> BusResult<(), Self::Error> {
        T::write8(self, byte)
    }

    fn read4(&mut self) -> BusResult<u8, Self::Error> {
        T::read4(self)
    }

    fn set_direction(&mut self, direction: Direction) -> BusResult<(), Self::Error> {
        T::set_direction(self, direction)
    }

    fn set_enable(&mut self, high: bool) -> BusResult<(), Self::Error> {
        T::set_enable(self, high)
    }

    fn set_register_select(&mut self, high: bool) -> BusResult<(), Self::Error> {
        T::set_register_select(self, high)
    }

    fn set_read_write(&mut self, high: bool) -> BusResult<(), Self::Error> {
        T::set_read_write(self, high)
    }

    fn width(&self) -> BusWidth {
        T::width(self)
    }

    fn supports_read(&self) -> bool {
        T::supports_read(self)
    }
}

/// Placeholder for an unconnected R/W line
///
/// Panels wired with R/W tied to ground are write-only; setting the line is
/// a no-op.
#[derive(Debug)]
pub struct NoPin<E>(PhantomData<E>);

impl<E> NoPin<E> {
    /// Create a placeholder pin
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<E> Default for NoPin<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: embedded_hal::digital::Error> ErrorType for NoPin<E> {
    type Error = E;
}

impl<E: embedded_hal::digital::Error> OutputPin for NoPin<E> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Direct GPIO realization of [`Bus`]
///
/// ## Type Parameters
///
/// * `RS` - Register select pin implementing [`OutputPin`]
/// * `RW` - Read/write pin implementing [`OutputPin`], or [`NoPin`]
/// * `EN` - Enable pin implementing [`OutputPin`]
/// * `D` - Data pin implementing [`OutputPin`] and [`InputPin`]
/// * `N` - Number of data pins, 4 (D4..D7) or 8 (D0..D7)
pub struct ParallelBus<RS, RW, EN, D, const N: usize> {
    /// Register select pin
    rs: RS,
    /// Read/write pin
    rw: RW,
    /// Enable pin
    en: EN,
    /// Data pins, lowest line first
    data: [D; N],
    /// Whether the R/W line is wired
    readable: bool,
    /// Current data direction
    direction: Direction,
}

impl<RS, RW, EN, D, const N: usize> ParallelBus<RS, RW, EN, D, N> {
    fn from_parts(rs: RS, rw: RW, en: EN, data: [D; N], readable: bool) -> Self {
        Self {
            rs,
            rw,
            en,
            data,
            readable,
            direction: Direction::Output,
        }
    }

    /// Current data direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Release the pins
    pub fn release(self) -> (RS, RW, EN, [D; N]) {
        (self.rs, self.rw, self.en, self.data)
    }
}

impl<RS, EN, D, E> ParallelBus<RS, NoPin<E>, EN, D, 4>
where
    RS: OutputPin<Error = E>,
    EN: OutputPin<Error = E>,
    D: OutputPin<Error = E> + InputPin,
    E: embedded_hal::digital::Error,
{
    /// Create a write-only 4-bit bus (R/W tied to ground)
    ///
    /// `data` holds D4..D7 in that order.
    pub fn new(rs: RS, en: EN, data: [D; 4]) -> Self {
        Self::from_parts(rs, NoPin::new(), en, data, false)
    }
}

impl<RS, EN, D, E> ParallelBus<RS, NoPin<E>, EN, D, 8>
where
    RS: OutputPin<Error = E>,
    EN: OutputPin<Error = E>,
    D: OutputPin<Error = E> + InputPin,
    E: embedded_hal::digital::Error,
{
    /// Create a write-only 8-bit bus (R/W tied to ground)
    ///
    /// `data` holds D0..D7 in that order.
    pub fn new_8bit(rs: RS, en: EN, data: [D; 8]) -> Self {
        Self::from_parts(rs, NoPin::new(), en, data, false)
    }
}

impl<RS, RW, EN, D> ParallelBus<RS, RW, EN, D, 4>
where
    RS: OutputPin,
    RW: OutputPin,
    EN: OutputPin,
    D: OutputPin + InputPin,
{
    /// Create a readable 4-bit bus
    ///
    /// `data` holds D4..D7 in that order.
    pub fn with_read_write(rs: RS, rw: RW, en: EN, data: [D; 4]) -> Self {
        Self::from_parts(rs, rw, en, data, true)
    }
}

impl<RS, RW, EN, D> ParallelBus<RS, RW, EN, D, 8>
where
    RS: OutputPin,
    RW: OutputPin,
    EN: OutputPin,
    D: OutputPin + InputPin,
{
    /// Create a readable 8-bit bus
    ///
    /// `data` holds D0..D7 in that order.
    pub fn with_read_write_8bit(rs: RS, rw: RW, en: EN, data: [D; 8]) -> Self {
        Self::from_parts(rs, rw, en, data, true)
    }
}

fn drive<P: OutputPin>(pins: &mut [P], bits: u8) -> BusResult<(), P::Error> {
    for (index, pin) in pins.iter_mut().enumerate() {
        if bits & (1 << index) != 0 {
            pin.set_high()?;
        } else {
            pin.set_low()?;
        }
    }
    Ok(())
}

fn set_line<P: OutputPin>(pin: &mut P, high: bool) -> BusResult<(), P::Error> {
    if high { pin.set_high() } else { pin.set_low() }
}

impl<RS, RW, EN, D, E, const N: usize> Bus for ParallelBus<RS, RW, EN, D, N>
where
    RS: OutputPin<Error = E>,
    RW: OutputPin<Error = E>,
    EN: OutputPin<Error = E>,
    D: OutputPin<Error = E> + InputPin,
    E: Debug,
{
    type Error = E;

    fn write4(&mut self, nibble: u8) -> BusResult<(), Self::Error> {
        drive(&mut self.data[N - 4..], nibble & 0x0F)
    }

    fn write8(&mut self, byte: u8) -> BusResult<(), Self::Error> {
        if N == 8 {
            drive(&mut self.data, byte)
        } else {
            // Only D4..D7 are wired
            self.write4(byte >> 4)
        }
    }

    fn read4(&mut self) -> BusResult<u8, Self::Error> {
        let mut nibble = 0;
        for (index, pin) in self.data[N - 4..].iter_mut().enumerate() {
            if pin.is_high()? {
                nibble |= 1 << index;
            }
        }
        Ok(nibble)
    }

    fn set_direction(&mut self, direction: Direction) -> BusResult<(), Self::Error> {
        if direction == Direction::Input {
            for pin in &mut self.data {
                pin.set_high()?;
            }
        }
        self.direction = direction;
        Ok(())
    }

    fn set_enable(&mut self, high: bool) -> BusResult<(), Self::Error> {
        set_line(&mut self.en, high)
    }

    fn set_register_select(&mut self, high: bool) -> BusResult<(), Self::Error> {
        set_line(&mut self.rs, high)
    }

    fn set_read_write(&mut self, high: bool) -> BusResult<(), Self::Error> {
        set_line(&mut self.rw, high)
    }

    fn width(&self) -> BusWidth {
        if N == 8 { BusWidth::Eight } else { BusWidth::Four }
    }

    fn supports_read(&self) -> bool {
        self.readable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};

    fn idle() -> PinMock {
        PinMock::new(&[])
    }

    fn done(pins: &mut [PinMock]) {
        for pin in pins {
            pin.done();
        }
    }

    #[test]
    fn test_write_only_bus_capabilities() {
        let mut pins = [idle(), idle(), idle(), idle(), idle(), idle()];
        let bus = ParallelBus::new(
            pins[0].clone(),
            pins[1].clone(),
            [
                pins[2].clone(),
                pins[3].clone(),
                pins[4].clone(),
                pins[5].clone(),
            ],
        );
        assert!(!bus.supports_read());
        assert_eq!(bus.width(), BusWidth::Four);
        assert_eq!(bus.direction(), Direction::Output);
        done(&mut pins);
    }

    #[test]
    fn test_write4_drives_d4_to_d7() {
        let mut d4 = PinMock::new(&[PinTransaction::set(State::Low)]);
        let mut d5 = PinMock::new(&[PinTransaction::set(State::High)]);
        let mut d6 = PinMock::new(&[PinTransaction::set(State::Low)]);
        let mut d7 = PinMock::new(&[PinTransaction::set(State::High)]);
        let mut others = [idle(), idle()];

        let mut bus = ParallelBus::new(
            others[0].clone(),
            others[1].clone(),
            [d4.clone(), d5.clone(), d6.clone(), d7.clone()],
        );
        bus.write4(0b1010).unwrap();

        d4.done();
        d5.done();
        d6.done();
        d7.done();
        done(&mut others);
    }

    #[test]
    fn test_read_releases_lines_and_samples_upper_nibble() {
        let mut d4 = PinMock::new(&[
            PinTransaction::set(State::High),
            PinTransaction::get(State::Low),
        ]);
        let mut d5 = PinMock::new(&[
            PinTransaction::set(State::High),
            PinTransaction::get(State::Low),
        ]);
        let mut d6 = PinMock::new(&[
            PinTransaction::set(State::High),
            PinTransaction::get(State::High),
        ]);
        let mut d7 = PinMock::new(&[
            PinTransaction::set(State::High),
            PinTransaction::get(State::High),
        ]);
        let mut rs = idle();
        let mut rw = PinMock::new(&[PinTransaction::set(State::High)]);
        let mut en = idle();

        let mut bus = ParallelBus::with_read_write(
            rs.clone(),
            rw.clone(),
            en.clone(),
            [d4.clone(), d5.clone(), d6.clone(), d7.clone()],
        );
        assert!(bus.supports_read());
        bus.set_direction(Direction::Input).unwrap();
        bus.set_read_write(true).unwrap();
        assert_eq!(bus.read4().unwrap(), 0b1100);
        assert_eq!(bus.direction(), Direction::Input);

        for pin in [&mut d4, &mut d5, &mut d6, &mut d7, &mut rs, &mut rw, &mut en] {
            pin.done();
        }
    }

    #[test]
    fn test_eight_bit_bus_writes_full_byte() {
        let expected = 0xA5u8;
        let mut data: [PinMock; 8] = core::array::from_fn(|bit| {
            let state = if expected & (1 << bit) != 0 {
                State::High
            } else {
                State::Low
            };
            PinMock::new(&[PinTransaction::set(state)])
        });
        let mut rs = idle();
        let mut en = PinMock::new(&[PinTransaction::set(State::High)]);

        let mut bus = ParallelBus::new_8bit(rs.clone(), en.clone(), data.clone());
        assert_eq!(bus.width(), BusWidth::Eight);
        bus.write8(expected).unwrap();
        bus.set_enable(true).unwrap();

        done(&mut data);
        rs.done();
        en.done();
    }

    #[test]
    fn test_no_pin_accepts_writes() {
        let mut pin: NoPin<embedded_hal::digital::ErrorKind> = NoPin::new();
        assert!(pin.set_high().is_ok());
        assert!(pin.set_low().is_ok());
    }
}
