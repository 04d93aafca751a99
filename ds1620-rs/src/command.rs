/// DS1620 protocol commands, per the datasheet command table.
///
/// Every command is shifted onto DQ least-significant-bit first. The
/// driver only issues [`Command::WriteConfig`], [`Command::StartConversion`]
/// and [`Command::ReadTemperature`]; the remaining opcodes document the
/// rest of the wire vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    /// Read the last completed temperature conversion.
    ReadTemperature = 0xAA,
    /// Write the high-temperature alarm threshold (TH).
    WriteTh = 0x01,
    /// Write the low-temperature alarm threshold (TL).
    WriteTl = 0x02,
    /// Read the TH register.
    ReadTh = 0xA1,
    /// Read the TL register.
    ReadTl = 0xA2,
    /// Read the remaining-count register (for high-resolution math).
    ReadCounter = 0xA0,
    /// Read the slope accumulator (for high-resolution math).
    ReadSlope = 0xA9,
    /// Begin temperature conversion.
    StartConversion = 0xEE,
    /// Halt temperature conversion.
    StopConversion = 0x22,
    /// Write the configuration register.
    WriteConfig = 0x0C,
    /// Read the configuration register.
    ReadConfig = 0xAC,
}

impl Command {
    /// The opcode byte sent on the wire.
    pub const fn op_code(self) -> u8 {
        self as u8
    }
}
