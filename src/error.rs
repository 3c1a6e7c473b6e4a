//! The error type shared by every fallible board operation.

use core::fmt;

/// Errors produced by the driver. `E` is the error type of the underlying `BoardInterface`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error<E> {
    /// The transport failed while talking to the board.
    Bus(E),
    /// An input pin index outside `0..8` was requested.
    InvalidPin(u8),
    /// An output bit outside `0..4` was requested. No bus traffic was generated.
    InvalidOutput(u8),
    /// Equality was requested against an analogue pin.
    UnsupportedComparison,
    /// A predicate was built with the wrong number of operands.
    OperandCount,
    /// The board never confirmed an output write within the configured number of attempts.
    VerifyFailed {
        /// The mask that was written.
        wanted: u8,
        /// The mask the board last reported.
        read: u8,
    },
    /// The caller stopped a write-verify loop before the board confirmed it.
    Cancelled,
}

impl<E> Error<E> {
    pub(crate) fn bus(e: E) -> Self {
        Error::Bus(e)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Bus(ref e) => write!(f, "bus error: {:?}", e),
            Error::InvalidPin(index) => write!(f, "no input pin {}", index),
            Error::InvalidOutput(bit) => write!(f, "no output bit {}", bit),
            Error::UnsupportedComparison => {
                write!(f, "analogue pins cannot be tested for equality")
            }
            Error::OperandCount => write!(f, "wrong number of predicate operands"),
            Error::VerifyFailed { wanted, read } => write!(
                f,
                "output write not confirmed: wrote {:#06b}, read back {:#06b}",
                wanted, read
            ),
            Error::Cancelled => write!(f, "output write cancelled"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> ::std::error::Error for Error<E> {}
