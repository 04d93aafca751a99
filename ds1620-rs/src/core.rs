use core::fmt::Debug;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::{Command, Configuration, DataLine, Direction, Error, Temperature, temperature};

/// Default clock half-period, in milliseconds.
pub const DEFAULT_CLOCK_PERIOD_MS: u32 = 1;

/// Time units RST is held around the power-on sync pulse.
const RESET_SYNC_UNITS: u32 = 3;
/// Time units RST is held low so a configuration write latches.
const CONFIG_LATCH_UNITS: u32 = 1;
/// Magnitude bits clocked out of a temperature reading.
const TEMPERATURE_BITS: u32 = 8;
/// Sign bits clocked out after the magnitude.
const SIGN_BITS: u32 = 1;

/// Represents a DS1620 on a bit-banged three-wire bus.
///
/// `CLK` and `RST` are host-driven output lines; `DQ` is the shared
/// bidirectional data line. The driver owns all three for its lifetime
/// and returns them on [`Ds1620::release`].
pub struct Ds1620<CLK, DQ, RST> {
    clk: CLK,
    dq: DQ,
    rst: RST,
    period_ms: u32,
}

#[derive(Debug)]
/// Builder for a DS1620 driver.
pub struct Ds1620Builder {
    period_ms: u32,
}

impl Default for Ds1620Builder {
    fn default() -> Self {
        Self {
            period_ms: DEFAULT_CLOCK_PERIOD_MS,
        }
    }
}

impl Ds1620Builder {
    /// Set the clock half-period in milliseconds. Must stay at or above
    /// the device's minimum setup/hold time.
    pub fn with_clock_period_ms(mut self, period_ms: u32) -> Self {
        self.period_ms = period_ms;
        self
    }

    /// Take ownership of the three lines and run the initialization
    /// sequence: reset/sync pulse, configuration write (CPU mode,
    /// continuous conversion), latch pulse, start conversion, bus idle.
    pub fn build<E, CLK, DQ, RST, D>(
        self,
        clk: CLK,
        dq: DQ,
        rst: RST,
        delay: &mut D,
    ) -> Result<Ds1620<CLK, DQ, RST>, Error<E>>
    where
        E: Debug,
        CLK: ErrorType<Error = E> + OutputPin,
        DQ: DataLine<Error = E>,
        RST: ErrorType<Error = E> + OutputPin,
        D: DelayNs,
    {
        let mut dev = Ds1620 {
            clk,
            dq,
            rst,
            period_ms: self.period_ms,
        };
        dev.initialize(delay)?;
        Ok(dev)
    }
}

impl<E, CLK, DQ, RST> Ds1620<CLK, DQ, RST>
where
    E: Debug,
    CLK: ErrorType<Error = E> + OutputPin,
    DQ: DataLine<Error = E>,
    RST: ErrorType<Error = E> + OutputPin,
{
    fn initialize<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<E>> {
        // Power-on sync pulse
        self.rst.set_low()?;
        self.clk.set_high()?;
        self.wait(delay, RESET_SYNC_UNITS);
        self.rst.set_high()?;
        self.wait(delay, RESET_SYNC_UNITS);

        self.write_command(delay, Command::WriteConfig)?;
        self.write_byte(delay, Configuration::new().into_bits())?;

        // The configuration write latches on the next reset pulse
        self.rst.set_low()?;
        self.wait(delay, CONFIG_LATCH_UNITS);
        self.rst.set_high()?;
        self.wait(delay, RESET_SYNC_UNITS);

        self.write_command(delay, Command::StartConversion)?;

        // Leave the bus idle
        self.rst.set_low()?;
        self.clk.set_low()?;
        self.wait(delay, CONFIG_LATCH_UNITS);
        Ok(())
    }

    /// Runs one temperature-read transaction and decodes the result.
    ///
    /// Blocks for the full bit-banged exchange: one command byte out,
    /// eight magnitude bits and one sign bit back, bracketed by RST.
    pub fn read_temperature<D: DelayNs>(&mut self, delay: &mut D) -> Result<Temperature, Error<E>> {
        self.rst.set_high()?;
        self.write_command(delay, Command::ReadTemperature)?;
        let magnitude = self.read_bits(delay, TEMPERATURE_BITS)?;
        let sign = self.read_bits(delay, SIGN_BITS)? != 0;
        self.rst.set_low()?;
        Ok(temperature::decode(magnitude, sign))
    }

    /// Shifts a command byte onto DQ.
    pub fn write_command<D: DelayNs>(&mut self, delay: &mut D, cmd: Command) -> Result<(), Error<E>> {
        self.write_byte(delay, cmd.op_code())
    }

    /// Shifts a raw byte onto DQ, least-significant bit first.
    ///
    /// The device samples DQ on the rising clock edge, so each bit is
    /// driven while the clock is low and the clock raised afterwards.
    pub fn write_byte<D: DelayNs>(&mut self, delay: &mut D, byte: u8) -> Result<(), Error<E>> {
        self.dq.set_direction(Direction::Output)?;
        let mut byte = byte;
        for _ in 0..8 {
            self.clk.set_low()?;
            self.wait(delay, 1);
            self.dq.write(byte & 0x01 != 0)?;
            self.clk.set_high()?;
            self.wait(delay, 1);
            byte >>= 1;
        }
        Ok(())
    }

    /// Samples `bits` bits from DQ, least-significant bit first, and
    /// returns them right-justified (a 1-bit read yields 0 or 1).
    ///
    /// The host samples DQ on the falling clock edge, the opposite edge
    /// convention from transmission.
    pub fn read_bits<D: DelayNs>(&mut self, delay: &mut D, bits: u32) -> Result<u8, Error<E>> {
        self.dq.set_direction(Direction::Input)?;
        let mut value = 0u8;
        for i in (1..=bits).rev() {
            self.clk.set_high()?;
            self.wait(delay, 1);
            self.clk.set_low()?;
            self.wait(delay, 1);
            if self.dq.read()? {
                value |= 1 << (bits - i);
            }
        }
        Ok(value)
    }

    /// The configured clock half-period in milliseconds.
    pub fn clock_period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Parks the clock, data and reset lines low, in that order, and
    /// hands the pins back. Best effort: teardown never fails.
    pub fn release(mut self) -> (CLK, DQ, RST) {
        let _ = self.clk.set_low();
        let _ = self.dq.set_direction(Direction::Output);
        let _ = self.dq.write(false);
        let _ = self.rst.set_low();
        (self.clk, self.dq, self.rst)
    }

    fn wait<D: DelayNs>(&self, delay: &mut D, units: u32) {
        delay.delay_ms(units * self.period_ms);
    }
}
