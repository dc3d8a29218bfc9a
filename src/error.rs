//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and display operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors during display operations, generic over the
//!   bus error so the underlying GPIO or I2C failure can be matched on
//!
//! ## Example
//!
//! ```
//! use hd44780_text::{Builder, BuilderError, Controller, FontTable, Geometry};
//!
//! // Missing geometry
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingGeometry)));
//!
//! // WS0010 OLED panels have at most two rows
//! let result = Builder::new()
//!     .geometry(Geometry::Size20x4)
//!     .controller(Controller::Ws0010 { font: FontTable::Japanese })
//!     .build();
//! assert!(result.is_err());
//! ```

use crate::config::{Controller, Geometry};

/// Errors that can occur when interacting with the display
///
/// Generic over the bus error type, see [`Bus::Error`](crate::bus::Bus::Error).
#[derive(Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// Bus error (GPIO pin or I2C acknowledge failure)
    ///
    /// The controller state is unknown afterwards; re-initialize the display.
    Bus(E),
    /// Cell outside the configured geometry
    ///
    /// Reported before any command is sent.
    OutOfRange {
        /// Requested column
        column: u8,
        /// Requested row
        row: u8,
    },
    /// Busy-flag polling requested on a bus that cannot read
    ///
    /// Use [`ReadinessStrategy::FixedDelay`](crate::config::ReadinessStrategy::FixedDelay)
    /// or wire the R/W line.
    BusyFlagUnsupported,
    /// Busy flag did not clear within the configured timeout
    BusyTimeout,
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "Bus error: {e:?}"),
            Self::OutOfRange { column, row } => {
                write!(f, "Cell out of range: column {column}, row {row}")
            }
            Self::BusyFlagUnsupported => {
                write!(f, "Busy flag polling requires a readable bus")
            }
            Self::BusyTimeout => write!(f, "Timeout waiting for busy flag"),
        }
    }
}

impl<E: core::fmt::Debug> core::error::Error for Error<E> {}

#[cfg(feature = "defmt")]
impl<E> defmt::Format for Error<E> {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Bus(_) => defmt::write!(fmt, "Bus error"),
            Self::OutOfRange { column, row } => {
                defmt::write!(fmt, "Cell out of range: column {}, row {}", column, row);
            }
            Self::BusyFlagUnsupported => {
                defmt::write!(fmt, "Busy flag polling requires a readable bus");
            }
            Self::BusyTimeout => defmt::write!(fmt, "Timeout waiting for busy flag"),
        }
    }
}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the display is created.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BuilderError {
    /// Geometry was not specified
    ///
    /// [`Builder::geometry()`](crate::config::Builder::geometry) must be called before building.
    MissingGeometry,
    /// Geometry not available for the selected controller
    UnsupportedGeometry {
        /// Requested geometry
        geometry: Geometry,
        /// Selected controller
        controller: Controller,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingGeometry => write!(f, "Geometry must be specified"),
            Self::UnsupportedGeometry {
                geometry,
                controller,
            } => write!(f, "Geometry {geometry:?} is not supported by {controller:?}"),
        }
    }
}

impl core::error::Error for BuilderError {}
