use core::fmt::{self, Debug};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Errors raised while driving the three-wire bus.
///
/// The bit-banged protocol itself has no failure mode: a transaction is a
/// fixed, fully deterministic bit sequence, so the only thing that can go
/// wrong is the line-level I/O underneath it.
pub enum Error<E> {
    /// A clock, data or reset line operation failed.
    Pin(E),
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Pin(e)
    }
}

impl<E: Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Pin(e) => write!(f, "line i/o failed: {e:?}"),
        }
    }
}
