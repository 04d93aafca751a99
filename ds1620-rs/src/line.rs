use core::fmt::Debug;

use embedded_hal::digital::{InputPin, OutputPin};

/// Direction of the shared DQ line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The host samples the line.
    Input,
    /// The host drives the line.
    Output,
}

/// The bidirectional data line of the three-wire interface.
///
/// The driver switches the line to output before transmitting a command
/// and to input before sampling a reading; implementations that cannot
/// reconfigure a pin at runtime (e.g. open-drain wiring) may treat the
/// direction switch as a no-op.
pub trait DataLine {
    /// Line-level I/O error.
    type Error: Debug;

    /// Reconfigures the line for the given direction.
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;

    /// Drives the line high or low. Only meaningful in output mode.
    fn write(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Samples the line. Only meaningful in input mode.
    fn read(&mut self) -> Result<bool, Self::Error>;
}

/// Open-drain wiring: a pin that is readable and writable at all times
/// needs no direction switching.
impl<P> DataLine for P
where
    P: InputPin + OutputPin,
{
    type Error = P::Error;

    fn set_direction(&mut self, _direction: Direction) -> Result<(), Self::Error> {
        Ok(())
    }

    fn write(&mut self, high: bool) -> Result<(), Self::Error> {
        if high { self.set_high() } else { self.set_low() }
    }

    fn read(&mut self) -> Result<bool, Self::Error> {
        self.is_high()
    }
}
