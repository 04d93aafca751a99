//! Decode of the DS1620 split magnitude/sign temperature encoding.

use core::fmt;

use fixed::types::I15F1;

/// Fixed-point degrees Celsius with half-degree resolution.
pub type Degrees = I15F1;

/// A decoded temperature reading.
///
/// The device reports sign and magnitude separately: an 8-bit magnitude
/// byte whose bit 0 carries half-degree resolution, then a single sign
/// bit clocked out after it. This is not a composed two's-complement
/// word, so the value is kept as the pair the decoder produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Temperature {
    whole: i16,
    half_degree: bool,
}

impl Temperature {
    /// Whole degrees Celsius, negative when the sign bit was set.
    pub fn whole_degrees(&self) -> i16 {
        self.whole
    }

    /// Whether the reading carries an extra half degree of magnitude.
    pub fn half_degree(&self) -> bool {
        self.half_degree
    }

    /// The reading as fixed-point degrees; the half degree adds to the
    /// magnitude, away from zero.
    pub fn to_degrees(self) -> Degrees {
        let mut value = Degrees::from_num(self.whole);
        if self.half_degree {
            if self.whole < 0 {
                value -= Degrees::from_bits(1);
            } else {
                value += Degrees::from_bits(1);
            }
        }
        value
    }
}

/// Formats as the attribute-surface string, e.g. `23.5` or `-10.0`.
impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}",
            self.whole,
            if self.half_degree { 5 } else { 0 }
        )
    }
}

/// Decodes a raw reading into a [`Temperature`].
///
/// Bit 0 of `magnitude` is the half-degree flag; the remaining bits are
/// whole degrees after an arithmetic (sign-preserving) right shift, and
/// `sign` negates the whole part.
pub fn decode(magnitude: u8, sign: bool) -> Temperature {
    let half_degree = magnitude & 0x01 != 0;
    let mut whole = ((magnitude as i8) >> 1) as i16;
    if sign {
        whole = -whole;
    }
    Temperature { whole, half_degree }
}
