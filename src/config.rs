//! Display configuration types and builder

pub use crate::error::BuilderError;
use crate::command::{FN_2LINE, FN_5X10_DOTS, FN_8BIT, FUNCTION_SET, SET_DDRAM_ADDR};
use crate::timing::DEFAULT_BUSY_TIMEOUT_US;

/// Panel geometry
///
/// Determines the column and row bounds and how a cell maps to a DDRAM
/// address. Every supported geometry runs the controller in two-line mode;
/// four-line panels are one 40-character line pair folded into four rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Geometry {
    /// 8 columns, 2 rows
    Size8x2,
    /// 16 columns, 2 rows
    Size16x2,
    /// 20 columns, 2 rows
    Size20x2,
    /// 20 columns, 4 rows
    Size20x4,
    /// 40 columns, 2 rows
    Size40x2,
}

/// DDRAM offset of the second line in two-line mode
const LINE_OFFSET: u8 = 0x40;

/// Row start addresses of a 20x4 panel
///
/// Rows 2 and 3 continue rows 0 and 1 after the 20th character.
const ROW_OFFSETS_20X4: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

impl Geometry {
    /// Number of character columns
    pub const fn columns(self) -> u8 {
        match self {
            Self::Size8x2 => 8,
            Self::Size16x2 => 16,
            Self::Size20x2 | Self::Size20x4 => 20,
            Self::Size40x2 => 40,
        }
    }

    /// Number of character rows
    pub const fn rows(self) -> u8 {
        match self {
            Self::Size20x4 => 4,
            _ => 2,
        }
    }

    /// Whether `(column, row)` lies on the panel
    pub const fn contains(self, column: u8, row: u8) -> bool {
        column < self.columns() && row < self.rows()
    }

    /// Raw DDRAM address of a cell
    ///
    /// Returns `None` for cells outside the panel.
    ///
    /// ```
    /// use hd44780_text::Geometry;
    ///
    /// assert_eq!(Geometry::Size16x2.ddram_address(3, 1), Some(0x43));
    /// assert_eq!(Geometry::Size20x4.ddram_address(0, 2), Some(0x14));
    /// assert_eq!(Geometry::Size16x2.ddram_address(16, 0), None);
    /// ```
    pub const fn ddram_address(self, column: u8, row: u8) -> Option<u8> {
        if !self.contains(column, row) {
            return None;
        }
        let start = match self {
            Self::Size20x4 => ROW_OFFSETS_20X4[row as usize],
            _ => row * LINE_OFFSET,
        };
        Some(start + column)
    }

    /// Set DDRAM address command for a cell
    ///
    /// This is [`Self::ddram_address`] with the command bit (0x80) set.
    ///
    /// ```
    /// use hd44780_text::Geometry;
    ///
    /// assert_eq!(Geometry::Size20x4.address_of(0, 2), Some(0x94));
    /// assert_eq!(Geometry::Size20x4.address_of(0, 3), Some(0xD4));
    /// ```
    pub const fn address_of(self, column: u8, row: u8) -> Option<u8> {
        match self.ddram_address(column, row) {
            Some(address) => Some(SET_DDRAM_ADDR | address),
            None => None,
        }
    }
}

/// How the driver learns that the controller finished an instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadinessStrategy {
    /// Poll the busy flag with a status read (needs a readable bus and an R/W line)
    BusyFlag,
    /// Wait the worst-case execution time of each instruction
    FixedDelay,
}

/// Font table of WS0010 OLED controllers (FT1, FT0)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FontTable {
    /// English/Japanese
    #[default]
    Japanese = 0b00,
    /// Western European I
    WesternEuropeanI = 0b01,
    /// English/Russian
    Russian = 0b10,
    /// Western European II
    WesternEuropeanII = 0b11,
}

/// Controller variant
///
/// Selects the power-on synchronization sequence and any vendor-specific
/// Function Set bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Controller {
    /// Hitachi HD44780 and compatible LCD controllers
    #[default]
    Hd44780,
    /// Winstar WS0010 OLED controller
    ///
    /// Does not reliably reset on power-up and needs five zero nibbles to
    /// resynchronize the 4-bit interface.
    Ws0010 {
        /// Built-in font table
        font: FontTable,
    },
}

/// Character cell size
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CharSize {
    /// 5x8 dots
    #[default]
    Dots5x8,
    /// 5x10 dots (only honored by controllers in one-line mode)
    Dots5x10,
}

/// Display configuration
///
/// Use [`Builder`] to create a Config.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Panel geometry
    pub geometry: Geometry,
    /// Readiness strategy, or `None` to derive it from the bus
    pub readiness: Option<ReadinessStrategy>,
    /// Controller variant
    pub controller: Controller,
    /// Character cell size
    pub char_size: CharSize,
    /// Upper bound on busy-flag polling in microseconds
    pub busy_timeout_us: u32,
}

impl Config {
    /// Function Set command committing the interface width and font options
    pub fn function_set(&self, eight_bit: bool) -> u8 {
        let mut command = FUNCTION_SET | FN_2LINE;
        if eight_bit {
            command |= FN_8BIT;
        }
        if self.char_size == CharSize::Dots5x10 {
            command |= FN_5X10_DOTS;
        }
        if let Controller::Ws0010 { font } = self.controller {
            command |= font as u8;
        }
        command
    }
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```
/// use hd44780_text::{Builder, Geometry, ReadinessStrategy};
///
/// let config = match Builder::new()
///     .geometry(Geometry::Size20x4)
///     .readiness(ReadinessStrategy::FixedDelay)
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// assert_eq!(config.geometry.columns(), 20);
/// ```
#[must_use]
pub struct Builder {
    /// Panel geometry (required)
    geometry: Option<Geometry>,
    /// Readiness strategy
    readiness: Option<ReadinessStrategy>,
    /// Controller variant
    controller: Controller,
    /// Character cell size
    char_size: CharSize,
    /// Busy-flag polling bound
    busy_timeout_us: u32,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            geometry: None,
            // Derived from the bus at init
            readiness: None,
            controller: Controller::Hd44780,
            char_size: CharSize::Dots5x8,
            busy_timeout_us: DEFAULT_BUSY_TIMEOUT_US,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set panel geometry (required)
    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Force a readiness strategy
    ///
    /// Without this, busy-flag polling is used whenever the bus can read.
    pub fn readiness(mut self, readiness: ReadinessStrategy) -> Self {
        self.readiness = Some(readiness);
        self
    }

    /// Set the controller variant
    pub fn controller(mut self, controller: Controller) -> Self {
        self.controller = controller;
        self
    }

    /// Set the character cell size
    pub fn char_size(mut self, char_size: CharSize) -> Self {
        self.char_size = char_size;
        self
    }

    /// Set the busy-flag polling bound in microseconds
    ///
    /// Default is 10,000us. Set to 0 to poll without a bound.
    pub fn busy_timeout_us(mut self, timeout_us: u32) -> Self {
        self.busy_timeout_us = timeout_us;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// - `BuilderError::MissingGeometry` if no geometry was set
    /// - `BuilderError::UnsupportedGeometry` for a WS0010 with four rows
    pub fn build(self) -> Result<Config, BuilderError> {
        let geometry = self.geometry.ok_or(BuilderError::MissingGeometry)?;
        if matches!(self.controller, Controller::Ws0010 { .. }) && geometry.rows() > 2 {
            return Err(BuilderError::UnsupportedGeometry {
                geometry,
                controller: self.controller,
            });
        }
        Ok(Config {
            geometry,
            readiness: self.readiness,
            controller: self.controller,
            char_size: self.char_size,
            busy_timeout_us: self.busy_timeout_us,
        })
    }
}
