//! HD44780 transfer protocol
//!
//! Turns instruction and data bytes into enable-latched bus transfers and
//! waits for the controller to finish each one.

use embedded_hal::delay::DelayNs;

use crate::bus::{Bus, BusWidth, Direction};
use crate::command::{
    BUSY_FLAG, SYNC_4BIT_NIBBLE, SYNC_8BIT_NIBBLE, SYNC_RESET_NIBBLE, SYNC_RESET_PULSES,
};
use crate::config::{Controller, ReadinessStrategy};
use crate::error::Error;
use crate::timing::{
    ENABLE_HOLD_US, ENABLE_PULSE_US, ENABLE_SETUP_US, POWER_ON_US, STATUS_READ_US,
    STATUS_SETUP_US, SYNC_FIRST_US, SYNC_FOLLOWING_US, Wait,
};

type ProtocolResult<E> = core::result::Result<(), Error<E>>;

/// Time spent in one enable pulse
const PULSE_US: u32 = ENABLE_SETUP_US + ENABLE_PULSE_US + ENABLE_HOLD_US;

/// Bus and delay with the readiness strategy resolved
pub(crate) struct Protocol<B, D> {
    /// Line-level bus
    bus: B,
    /// Delay provider
    delay: D,
    /// Readiness strategy for every instruction
    readiness: ReadinessStrategy,
    /// Busy-flag polling bound, 0 disables it
    busy_timeout_us: u32,
}

impl<B, D> Protocol<B, D>
where
    B: Bus,
    D: DelayNs,
{
    pub(crate) fn new(bus: B, delay: D, readiness: ReadinessStrategy, busy_timeout_us: u32) -> Self {
        Self {
            bus,
            delay,
            readiness,
            busy_timeout_us,
        }
    }

    pub(crate) fn readiness(&self) -> ReadinessStrategy {
        self.readiness
    }

    pub(crate) fn width(&self) -> BusWidth {
        self.bus.width()
    }

    pub(crate) fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub(crate) fn bus(&self) -> &B {
        &self.bus
    }

    #[cfg(test)]
    pub(crate) fn delay(&self) -> &D {
        &self.delay
    }

    pub(crate) fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }

    /// Bring the controller interface into a known width after power-on
    ///
    /// The controller may power up in either width or, on a 4-bit bus, half
    /// way through a byte. The busy flag is not valid until this completes.
    pub(crate) fn synchronize(&mut self, controller: Controller) -> ProtocolResult<B::Error> {
        self.bus.set_enable(false).map_err(Error::Bus)?;
        self.bus.set_register_select(false).map_err(Error::Bus)?;
        self.bus.set_read_write(false).map_err(Error::Bus)?;
        self.delay.delay_us(POWER_ON_US);

        match (controller, self.bus.width()) {
            (Controller::Hd44780, BusWidth::Four) => {
                self.write_nibble(SYNC_8BIT_NIBBLE)?;
                self.delay.delay_us(SYNC_FIRST_US);
                self.write_nibble(SYNC_8BIT_NIBBLE)?;
                self.delay.delay_us(SYNC_FOLLOWING_US);
                self.write_nibble(SYNC_8BIT_NIBBLE)?;
                self.delay.delay_us(SYNC_FOLLOWING_US);
                self.write_nibble(SYNC_4BIT_NIBBLE)?;
            }
            (Controller::Hd44780, BusWidth::Eight) => {
                let byte = SYNC_8BIT_NIBBLE << 4;
                self.write_byte(byte)?;
                self.delay.delay_us(SYNC_FIRST_US);
                self.write_byte(byte)?;
                self.delay.delay_us(SYNC_FOLLOWING_US);
                self.write_byte(byte)?;
                self.delay.delay_us(SYNC_FOLLOWING_US);
            }
            (Controller::Ws0010 { .. }, BusWidth::Four) => {
                for _ in 0..SYNC_RESET_PULSES {
                    self.write_nibble(SYNC_RESET_NIBBLE)?;
                }
                self.write_nibble(SYNC_4BIT_NIBBLE)?;
            }
            (Controller::Ws0010 { .. }, BusWidth::Eight) => {}
        }
        Ok(())
    }

    /// Send an instruction and wait until it has executed
    pub(crate) fn write_command(&mut self, command: u8, wait: Wait) -> ProtocolResult<B::Error> {
        log::trace!("command {:#04x}", command);
        self.bus.set_register_select(false).map_err(Error::Bus)?;
        self.transfer(command)?;
        self.wait_ready(wait)
    }

    /// Write a byte to DDRAM or CGRAM and wait until it is stored
    pub(crate) fn write_data(&mut self, data: u8) -> ProtocolResult<B::Error> {
        self.bus.set_register_select(true).map_err(Error::Bus)?;
        self.transfer(data)?;
        self.wait_ready(Wait::Command)
    }

    fn transfer(&mut self, byte: u8) -> ProtocolResult<B::Error> {
        match self.bus.width() {
            BusWidth::Four => {
                self.write_nibble(byte >> 4)?;
                self.write_nibble(byte & 0x0F)
            }
            BusWidth::Eight => self.write_byte(byte),
        }
    }

    fn write_nibble(&mut self, nibble: u8) -> ProtocolResult<B::Error> {
        self.bus.write4(nibble).map_err(Error::Bus)?;
        self.pulse_enable()
    }

    fn write_byte(&mut self, byte: u8) -> ProtocolResult<B::Error> {
        self.bus.write8(byte).map_err(Error::Bus)?;
        self.pulse_enable()
    }

    /// Latch the current lines on the falling edge of E
    fn pulse_enable(&mut self) -> ProtocolResult<B::Error> {
        self.bus.set_enable(false).map_err(Error::Bus)?;
        self.delay.delay_us(ENABLE_SETUP_US);
        self.bus.set_enable(true).map_err(Error::Bus)?;
        self.delay.delay_us(ENABLE_PULSE_US);
        self.bus.set_enable(false).map_err(Error::Bus)?;
        self.delay.delay_us(ENABLE_HOLD_US);
        Ok(())
    }

    fn wait_ready(&mut self, wait: Wait) -> ProtocolResult<B::Error> {
        match self.readiness {
            ReadinessStrategy::FixedDelay => {
                self.delay.delay_us(wait.fixed_us());
                Ok(())
            }
            ReadinessStrategy::BusyFlag => self.poll_busy_flag(),
        }
    }

    /// Read the status register until the busy flag clears
    ///
    /// The lines are returned to write mode before any timeout is reported.
    fn poll_busy_flag(&mut self) -> ProtocolResult<B::Error> {
        self.bus
            .set_direction(Direction::Input)
            .map_err(Error::Bus)?;
        self.bus.set_register_select(false).map_err(Error::Bus)?;
        self.bus.set_read_write(true).map_err(Error::Bus)?;

        let four_bit = self.bus.width() == BusWidth::Four;
        let step_us = STATUS_SETUP_US + STATUS_READ_US + if four_bit { PULSE_US } else { 0 };
        let mut elapsed_us = 0u32;
        let mut timed_out = false;

        loop {
            self.bus.set_enable(false).map_err(Error::Bus)?;
            self.delay.delay_us(STATUS_SETUP_US);
            self.bus.set_enable(true).map_err(Error::Bus)?;
            self.delay.delay_us(STATUS_READ_US);
            let busy = self.bus.read4().map_err(Error::Bus)? & BUSY_FLAG != 0;
            self.bus.set_enable(false).map_err(Error::Bus)?;

            if four_bit {
                // Clock out the address counter nibble
                self.pulse_enable()?;
            }

            if !busy {
                break;
            }

            elapsed_us = elapsed_us.saturating_add(step_us);
            if self.busy_timeout_us > 0 && elapsed_us >= self.busy_timeout_us {
                timed_out = true;
                break;
            }
        }

        self.bus
            .set_direction(Direction::Output)
            .map_err(Error::Bus)?;
        self.bus.set_read_write(false).map_err(Error::Bus)?;

        if timed_out {
            log::warn!("busy flag still set after {}us", elapsed_us);
            return Err(Error::BusyTimeout);
        }
        Ok(())
    }
}

/// Recording bus and delay shared by the driver tests
#[cfg(test)]
pub(crate) mod mock {
    use alloc::vec::Vec;
    use embedded_hal::delay::DelayNs;

    use crate::bus::{Bus, BusWidth, Direction};

    /// Error reported once [`MockBus::fail`] is set
    #[derive(Debug, PartialEq, Eq)]
    pub(crate) struct MockError;

    /// Bus that records every value latched by a falling enable edge
    pub(crate) struct MockBus {
        pub(crate) width: BusWidth,
        pub(crate) readable: bool,
        pub(crate) rs: bool,
        pub(crate) rw: bool,
        pub(crate) en: bool,
        pub(crate) data: u8,
        pub(crate) direction: Direction,
        /// (RS, data lines) at each write latch
        pub(crate) latched: Vec<(bool, u8)>,
        /// Status reads that still report busy
        pub(crate) busy_reads: usize,
        /// Report busy forever
        pub(crate) stuck_busy: bool,
        /// Status reads performed
        pub(crate) reads: usize,
        /// Every primitive call
        pub(crate) calls: usize,
        /// Reject every primitive with [`MockError`]
        pub(crate) fail: bool,
    }

    impl MockBus {
        pub(crate) fn new(width: BusWidth) -> Self {
            Self {
                width,
                readable: false,
                rs: false,
                rw: false,
                en: false,
                data: 0,
                direction: Direction::Output,
                latched: Vec::new(),
                busy_reads: 0,
                stuck_busy: false,
                reads: 0,
                calls: 0,
                fail: false,
            }
        }

        pub(crate) fn readable(mut self) -> Self {
            self.readable = true;
            self
        }

        /// Pair latched nibbles into (RS, byte) transfers
        pub(crate) fn transfers(&self) -> Vec<(bool, u8)> {
            match self.width {
                BusWidth::Eight => self.latched.clone(),
                BusWidth::Four => self
                    .latched
                    .chunks(2)
                    .map(|pair| match pair {
                        [(rs, high), (_, low)] => (*rs, (*high << 4) | *low),
                        [(rs, high)] => (*rs, *high << 4),
                        _ => unreachable!(),
                    })
                    .collect(),
            }
        }

        /// Instruction bytes among the transfers
        pub(crate) fn commands(&self) -> Vec<u8> {
            self.transfers()
                .into_iter()
                .filter(|(rs, _)| !rs)
                .map(|(_, byte)| byte)
                .collect()
        }

        fn touch(&mut self) -> Result<(), MockError> {
            self.calls += 1;
            if self.fail { Err(MockError) } else { Ok(()) }
        }

        pub(crate) fn reset_log(&mut self) {
            self.latched.clear();
            self.reads = 0;
            self.calls = 0;
        }
    }

    impl Bus for MockBus {
        type Error = MockError;

        fn write4(&mut self, nibble: u8) -> Result<(), Self::Error> {
            self.touch()?;
            self.data = nibble & 0x0F;
            Ok(())
        }

        fn write8(&mut self, byte: u8) -> Result<(), Self::Error> {
            self.touch()?;
            self.data = byte;
            Ok(())
        }

        fn read4(&mut self) -> Result<u8, Self::Error> {
            self.touch()?;
            self.reads += 1;
            if self.stuck_busy {
                return Ok(0b1000);
            }
            if self.busy_reads > 0 {
                self.busy_reads -= 1;
                return Ok(0b1000);
            }
            Ok(0)
        }

        fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
            self.touch()?;
            self.direction = direction;
            Ok(())
        }

        fn set_enable(&mut self, high: bool) -> Result<(), Self::Error> {
            self.touch()?;
            if self.en && !high && !self.rw {
                self.latched.push((self.rs, self.data));
            }
            self.en = high;
            Ok(())
        }

        fn set_register_select(&mut self, high: bool) -> Result<(), Self::Error> {
            self.touch()?;
            self.rs = high;
            Ok(())
        }

        fn set_read_write(&mut self, high: bool) -> Result<(), Self::Error> {
            self.touch()?;
            self.rw = high;
            Ok(())
        }

        fn width(&self) -> BusWidth {
            self.width
        }

        fn supports_read(&self) -> bool {
            self.readable
        }
    }

    /// Delay that only accumulates the requested time
    #[derive(Default)]
    pub(crate) struct MockDelay {
        pub(crate) total_ns: u64,
    }

    impl MockDelay {
        pub(crate) fn total_us(&self) -> u64 {
            self.total_ns / 1_000
        }
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }
}
