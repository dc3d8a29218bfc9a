//! Controller timing constants
//!
//! Every delay the driver applies is defined here. Values are datasheet
//! minimums with margin; shortening any of them produces controllers that
//! silently drop or corrupt instructions, which cannot be detected at run time.
//!
//! All values are in microseconds.

/// Wait after power-on before the first synchronization pulse (datasheet: >40ms)
pub const POWER_ON_US: u32 = 50_000;

/// Wait after the first 8-bit synchronization pulse (datasheet: >4.1ms)
pub const SYNC_FIRST_US: u32 = 5_000;

/// Wait after the second and third 8-bit synchronization pulses (datasheet: >100us)
pub const SYNC_FOLLOWING_US: u32 = 120;

/// Enable line held low before the rising edge
pub const ENABLE_SETUP_US: u32 = 2;

/// Enable pulse width (high time)
pub const ENABLE_PULSE_US: u32 = 2;

/// Hold time after the falling edge before the next transfer is valid
pub const ENABLE_HOLD_US: u32 = 40;

/// Fixed wait for ordinary instructions and data writes (datasheet: 37us)
pub const COMMAND_US: u32 = 40;

/// Fixed wait after Return Home (datasheet: 1.52ms)
pub const RETURN_HOME_US: u32 = 2_000;

/// Fixed wait after Clear Display (datasheet: 6.2ms on WS0010)
pub const CLEAR_DISPLAY_US: u32 = 7_000;

/// Enable low time before a status read
pub const STATUS_SETUP_US: u32 = 1;

/// Data output delay after the enable rising edge of a status read
pub const STATUS_READ_US: u32 = 10;

/// Default upper bound on busy-flag polling
///
/// Longer than the slowest instruction, so a controller that never clears
/// its busy flag is reported instead of blocking forever.
pub const DEFAULT_BUSY_TIMEOUT_US: u32 = 10_000;

/// Kind of wait required after an instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Wait {
    /// Ordinary instruction or data write
    Command,
    /// Return Home
    ReturnHome,
    /// Clear Display
    ClearDisplay,
}

impl Wait {
    /// Worst-case execution time used by fixed-delay readiness
    pub const fn fixed_us(self) -> u32 {
        match self {
            Self::Command => COMMAND_US,
            Self::ReturnHome => RETURN_HOME_US,
            Self::ClearDisplay => CLEAR_DISPLAY_US,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_waits_cover_datasheet_minimums() {
        assert!(Wait::Command.fixed_us() >= 37);
        assert!(Wait::ReturnHome.fixed_us() >= 1_520);
        assert!(Wait::ClearDisplay.fixed_us() >= 6_200);
    }

    #[test]
    fn test_busy_timeout_exceeds_slowest_instruction() {
        assert!(DEFAULT_BUSY_TIMEOUT_US > CLEAR_DISPLAY_US);
    }
}
