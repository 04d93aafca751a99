//! Serialized owner of the device sequencer and its configuration.
//!
//! Every external request — attribute read, attribute write, temperature
//! transaction — goes through one mutex, so two transactions can never
//! interleave their bit sequences on the wire.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use ds1620::{Ds1620, Ds1620Builder};
use linux_embedded_hal::Delay;
use thiserror::Error;

use crate::gpio::{self, BidirLine, ClaimError, GpioError, OutputLine};

type Device = Ds1620<OutputLine, BidirLine, OutputLine>;

#[derive(Debug, Clone)]
/// The line set and clock period the sequencer runs with.
pub struct LineConfig {
    /// Path to the GPIO character device.
    pub chip: PathBuf,
    /// Line offset of the clock line.
    pub clk: u32,
    /// Line offset of the shared data line.
    pub dq: u32,
    /// Line offset of the reset/enable line.
    pub rst: u32,
    /// Clock half-period in milliseconds.
    pub period_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The attribute surface: three read-write line ids and one read-only
/// computed value.
pub enum Attribute {
    /// Clock line offset (read-write).
    ClkPin,
    /// Data line offset (read-write).
    DqPin,
    /// Reset line offset (read-write).
    RstPin,
    /// Current temperature (read-only; every read runs a transaction).
    Temperature,
}

impl FromStr for Attribute {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, ControlError> {
        match s {
            "clk_pin" => Ok(Self::ClkPin),
            "dq_pin" => Ok(Self::DqPin),
            "rst_pin" => Ok(Self::RstPin),
            "temperature" => Ok(Self::Temperature),
            _ => Err(ControlError::UnknownAttribute(s.into())),
        }
    }
}

#[derive(Debug, Error)]
/// Errors surfaced through the attribute surface.
pub enum ControlError {
    /// No such attribute.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),
    /// Writes to a computed attribute are rejected.
    #[error("attribute {0} is read-only")]
    ReadOnly(&'static str),
    /// A line id must be a bare unsigned integer.
    #[error("invalid line id: {0:?}")]
    InvalidValue(String),
    /// A line could not be claimed.
    #[error(transparent)]
    Claim(#[from] ClaimError),
    /// Line I/O failed mid-transaction.
    #[error("three-wire transaction failed: {0}")]
    Bus(ds1620::Error<GpioError>),
    /// The device is down after a failed reconfiguration.
    #[error("driver is not initialized")]
    NotInitialized,
}

impl From<ds1620::Error<GpioError>> for ControlError {
    fn from(e: ds1620::Error<GpioError>) -> Self {
        ControlError::Bus(e)
    }
}

struct Inner {
    config: LineConfig,
    device: Option<Device>,
}

/// Owns the sequencer behind a single lock.
pub struct Controller {
    inner: Mutex<Inner>,
}

impl Controller {
    /// Claims the configured lines and runs the initialization sequence.
    /// On failure nothing stays claimed.
    pub fn new(config: LineConfig) -> Result<Self, ControlError> {
        let device = bring_up(&config)?;
        Ok(Self {
            inner: Mutex::new(Inner {
                config,
                device: Some(device),
            }),
        })
    }

    /// Reads an attribute. Reading `temperature` runs a fresh transaction;
    /// readings are never cached.
    pub fn get(&self, attribute: Attribute) -> Result<String, ControlError> {
        let mut inner = self.inner.lock().expect("controller lock poisoned");
        match attribute {
            Attribute::ClkPin => Ok(inner.config.clk.to_string()),
            Attribute::DqPin => Ok(inner.config.dq.to_string()),
            Attribute::RstPin => Ok(inner.config.rst.to_string()),
            Attribute::Temperature => {
                let device = inner
                    .device
                    .as_mut()
                    .ok_or(ControlError::NotInitialized)?;
                let reading = device.read_temperature(&mut Delay)?;
                Ok(reading.to_string())
            }
        }
    }

    /// Rewires a line attribute: validates the value, releases the
    /// current line set, then re-claims and re-initializes with the new
    /// offset. A claim failure leaves the device down with nothing
    /// claimed.
    pub fn set(&self, attribute: Attribute, value: &str) -> Result<(), ControlError> {
        if attribute == Attribute::Temperature {
            return Err(ControlError::ReadOnly("temperature"));
        }
        let offset = parse_line_offset(value)?;
        let mut inner = self.inner.lock().expect("controller lock poisoned");
        if let Some(device) = inner.device.take() {
            let _ = device.release();
        }
        match attribute {
            Attribute::ClkPin => inner.config.clk = offset,
            Attribute::DqPin => inner.config.dq = offset,
            Attribute::RstPin => inner.config.rst = offset,
            Attribute::Temperature => {}
        }
        inner.device = Some(bring_up(&inner.config)?);
        log::info!(
            "[CTL] Lines reconfigured: clk={} dq={} rst={}",
            inner.config.clk,
            inner.config.dq,
            inner.config.rst
        );
        Ok(())
    }

    /// Parks all lines low and releases them. Idempotent.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock().expect("controller lock poisoned");
        if let Some(device) = inner.device.take() {
            let _ = device.release();
            log::info!("[CTL] Lines parked low and released");
        }
    }
}

fn bring_up(config: &LineConfig) -> Result<Device, ControlError> {
    let mut chip = gpio::open_chip(&config.chip)?;
    let clk = gpio::claim_output(&mut chip, config.clk)?;
    let dq = gpio::claim_data(&mut chip, config.dq)?;
    let rst = gpio::claim_output(&mut chip, config.rst)?;
    let device = Ds1620Builder::default()
        .with_clock_period_ms(config.period_ms)
        .build(clk, dq, rst, &mut Delay)?;
    Ok(device)
}

/// Strict numeric parse for line ids; anything but a bare unsigned
/// integer is rejected rather than partially applied.
pub fn parse_line_offset(value: &str) -> Result<u32, ControlError> {
    value
        .trim()
        .parse()
        .map_err(|_| ControlError::InvalidValue(value.into()))
}

#[cfg(test)]
mod tests {
    use super::{Attribute, ControlError, parse_line_offset};

    #[test]
    fn attribute_names() {
        assert_eq!("clk_pin".parse::<Attribute>().unwrap(), Attribute::ClkPin);
        assert_eq!("dq_pin".parse::<Attribute>().unwrap(), Attribute::DqPin);
        assert_eq!("rst_pin".parse::<Attribute>().unwrap(), Attribute::RstPin);
        assert_eq!(
            "temperature".parse::<Attribute>().unwrap(),
            Attribute::Temperature
        );
        assert!(matches!(
            "humidity".parse::<Attribute>(),
            Err(ControlError::UnknownAttribute(_))
        ));
    }

    #[test]
    fn line_offsets_parse_strictly() {
        assert_eq!(parse_line_offset("48").unwrap(), 48);
        assert_eq!(parse_line_offset(" 115\n").unwrap(), 115);
        assert!(matches!(
            parse_line_offset("48u"),
            Err(ControlError::InvalidValue(_))
        ));
        assert!(matches!(
            parse_line_offset("-3"),
            Err(ControlError::InvalidValue(_))
        ));
        assert!(matches!(
            parse_line_offset(""),
            Err(ControlError::InvalidValue(_))
        ));
    }
}
