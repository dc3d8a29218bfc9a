//! HD44780 Character Display Driver
//!
//! A driver for HD44780-compatible character LCD and OLED controllers, wired
//! directly to GPIO pins or through a PCF8574 I2C backpack.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support
//! - 4-bit and 8-bit parallel buses, with or without the R/W line
//! - PCF8574 I2C backpacks with both common pin maps and backlight control
//! - Busy-flag polling or fixed worst-case delays
//! - 8x2, 16x2, 20x2, 20x4 and 40x2 panels
//! - Winstar WS0010 OLED controllers with font table selection
//! - Eight custom glyphs
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use hd44780_text::{Builder, Geometry, Hd44780, Mode, ParallelBus};
//!
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
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let (rs, en) = (MockPin, MockPin);
//! # let (d4, d5, d6, d7) = (MockPin, MockPin, MockPin, MockPin);
//! # let delay = MockDelay;
//! let bus = ParallelBus::new(rs, en, [d4, d5, d6, d7]);
//! let config = match Builder::new().geometry(Geometry::Size16x2).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let mut display = match Hd44780::new(bus, delay, config).init() {
//!     Ok(display) => display,
//!     Err(_) => return,
//! };
//! let _ = display.set_mode(Mode::DisplayOn);
//! for byte in b"Hello\nworld" {
//!     let _ = display.write_stream(*byte);
//! }
//! ```

#![no_std]

#[cfg(test)]
extern crate alloc;

/// Bus capability abstraction
pub mod bus;
/// HD44780 command definitions
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// PCF8574 I2C backpack bus
pub mod pcf8574;
/// Shadow registers and cursor
pub mod registers;
/// Controller timing constants
pub mod timing;

mod protocol;

pub use bus::{Bus, BusWidth, Direction, NoPin, ParallelBus};
pub use config::{Builder, CharSize, Config, Controller, FontTable, Geometry, ReadinessStrategy};
pub use display::{Display, Hd44780, Mode};
pub use error::{BuilderError, Error};
pub use pcf8574::{DEFAULT_ADDRESS, Pcf8574Bus, PinMap};
pub use registers::{Cursor, DisplayControl, EntryMode};
