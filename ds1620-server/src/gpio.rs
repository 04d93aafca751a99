//! Physical line interface over the GPIO character device.
//!
//! A claimed line is a live `LineHandle`; dropping the handle releases
//! the line, so a partially claimed set unwinds on its own when a later
//! claim fails.

use std::path::{Path, PathBuf};

use ds1620::{DataLine, Direction};
use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin};
use linux_embedded_hal::gpio_cdev::{
    Chip, Line, LineHandle, LineRequestFlags, errors::Error as CdevError,
};
use thiserror::Error;

const CONSUMER: &str = "ds1620";

#[derive(Debug, Error)]
/// A requested line could not be claimed (in use or invalid offset).
pub enum ClaimError {
    #[error("failed to open gpio chip {path}: {source}")]
    Chip { path: PathBuf, source: CdevError },
    #[error("gpio line {offset} unavailable: {source}")]
    Line { offset: u32, source: CdevError },
}

#[derive(Debug, Error)]
/// Line-level I/O failure.
pub enum GpioError {
    #[error("gpio line i/o failed: {0}")]
    Cdev(#[from] CdevError),
    #[error("data line lost its claim during a direction switch")]
    Unclaimed,
}

impl digital::Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Opens the GPIO character device.
pub fn open_chip(path: &Path) -> Result<Chip, ClaimError> {
    Chip::new(path).map_err(|source| ClaimError::Chip {
        path: path.to_path_buf(),
        source,
    })
}

/// Claims a host-driven line (CLK or RST), initially low.
pub fn claim_output(chip: &mut Chip, offset: u32) -> Result<OutputLine, ClaimError> {
    let handle = chip
        .get_line(offset)
        .and_then(|line| line.request(LineRequestFlags::OUTPUT, 0, CONSUMER))
        .map_err(|source| ClaimError::Line { offset, source })?;
    Ok(OutputLine { handle })
}

/// Claims the shared data line, initially as an input.
pub fn claim_data(chip: &mut Chip, offset: u32) -> Result<BidirLine, ClaimError> {
    let line = chip
        .get_line(offset)
        .map_err(|source| ClaimError::Line { offset, source })?;
    let handle = line
        .request(LineRequestFlags::INPUT, 0, CONSUMER)
        .map_err(|source| ClaimError::Line { offset, source })?;
    Ok(BidirLine {
        line,
        handle: Some(handle),
        direction: Direction::Input,
    })
}

/// A claimed output-only line.
pub struct OutputLine {
    handle: LineHandle,
}

impl ErrorType for OutputLine {
    type Error = GpioError;
}

impl OutputPin for OutputLine {
    fn set_low(&mut self) -> Result<(), GpioError> {
        self.handle.set_value(0).map_err(GpioError::from)
    }

    fn set_high(&mut self) -> Result<(), GpioError> {
        self.handle.set_value(1).map_err(GpioError::from)
    }
}

/// The shared data line; direction switches re-request the line with the
/// new flags.
pub struct BidirLine {
    line: Line,
    handle: Option<LineHandle>,
    direction: Direction,
}

impl DataLine for BidirLine {
    type Error = GpioError;

    fn set_direction(&mut self, direction: Direction) -> Result<(), GpioError> {
        if self.handle.is_some() && self.direction == direction {
            return Ok(());
        }
        // The kernel refuses a second request while the old handle is
        // live, so drop it first.
        self.handle = None;
        let flags = match direction {
            Direction::Input => LineRequestFlags::INPUT,
            Direction::Output => LineRequestFlags::OUTPUT,
        };
        self.handle = Some(self.line.request(flags, 0, CONSUMER)?);
        self.direction = direction;
        Ok(())
    }

    fn write(&mut self, high: bool) -> Result<(), GpioError> {
        self.handle
            .as_ref()
            .ok_or(GpioError::Unclaimed)?
            .set_value(high as u8)
            .map_err(GpioError::from)
    }

    fn read(&mut self) -> Result<bool, GpioError> {
        let value = self
            .handle
            .as_ref()
            .ok_or(GpioError::Unclaimed)?
            .get_value()?;
        Ok(value != 0)
    }
}
