use bitfield_struct::bitfield;

#[bitfield(u8)]
/// The DS1620 configuration/status register.
///
/// The driver writes this register once during initialization with the
/// defaults below: `cpu` set selects the three-wire host interface and
/// `oneshot` clear selects continuous conversion, i.e. the byte `0x02`.
/// The upper status bits are read-only on the device and are written as
/// zero.
pub struct Configuration {
    #[bits(1, default = false)]
    /// One-shot conversion mode; clear for continuous conversion.
    pub oneshot: bool,
    #[bits(1, default = true)]
    /// CPU mode: conversions are commanded over the three-wire interface.
    pub cpu: bool,
    #[bits(2)]
    reserved: u8,
    #[bits(1, default = false)]
    /// Nonvolatile memory busy flag (read-only on the device).
    pub nvb: bool,
    #[bits(1, default = false)]
    /// Low-temperature alarm flag (read-only on the device).
    pub tlf: bool,
    #[bits(1, default = false)]
    /// High-temperature alarm flag (read-only on the device).
    pub thf: bool,
    #[bits(1, default = false)]
    /// Conversion-done flag (read-only on the device).
    pub done: bool,
}
