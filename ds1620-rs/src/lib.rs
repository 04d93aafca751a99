#![no_std]
#![deny(missing_docs)]
//! # DS1620
//!
//! A no-std driver for the Dallas DS1620 digital thermometer. The DS1620
//! has no bus controller of its own: the host bit-bangs a synchronous
//! three-wire interface (CLK, bidirectional DQ, RST) by toggling discrete
//! lines, pacing every clock edge with a fixed half-cycle delay.
//!
//! Commands go out LSB-first with the device sampling DQ on the rising
//! clock edge; readings come back LSB-first with the host sampling DQ on
//! the falling edge. The temperature arrives as an 8-bit magnitude byte
//! (bit 0 carries half-degree resolution) plus a separately clocked sign
//! bit, decoded by [`temperature::decode`].

mod command;
mod config;
mod core;
mod error;
mod line;
pub mod temperature;

pub use command::Command;
pub use config::Configuration;
pub use core::{DEFAULT_CLOCK_PERIOD_MS, Ds1620, Ds1620Builder};
pub use error::Error;
pub use line::{DataLine, Direction};
pub use temperature::{Degrees, Temperature, decode};
