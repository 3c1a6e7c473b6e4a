//! Watches the whole digital input port and reports which sensitive pins changed.

use error::Error;
use notify::{Notification, PinId, Poll, Value};
use pin::BoardIO;
use registers::valid_input;

/// Pins a new watch reports on.
pub const DEFAULT_SENSITIVE: u8 = 0b0000_1111;

/// Compares the digital input port against its previous reading once per tick and reports every
/// changed pin that is in its sensitivity set, with that pin's new value.
///
/// Unlike pin handles, a watch keeps its own copy of the last port reading, so it neither sees
/// nor consumes edges observed through `DigitalPin`s.
pub struct InputWatch<'io, IO: BoardIO + 'io> {
    io: &'io IO,
    last: u8,
    sensitive: u8,
}

impl<'io, IO: BoardIO> InputWatch<'io, IO> {
    pub(crate) fn new(io: &'io IO) -> Result<Self, Error<IO::BusError>> {
        let last = io.sample_inputs()?;
        Ok(InputWatch {
            io,
            last,
            sensitive: DEFAULT_SENSITIVE,
        })
    }

    /// Start reporting changes on digital input `index`.
    pub fn sensitive(&mut self, index: u8) -> Result<(), Error<IO::BusError>> {
        let index = valid_input(index).ok_or(Error::InvalidPin(index))?;
        self.sensitive |= 1 << index;
        Ok(())
    }

    /// Stop reporting changes on digital input `index`.
    pub fn insensitive(&mut self, index: u8) -> Result<(), Error<IO::BusError>> {
        let index = valid_input(index).ok_or(Error::InvalidPin(index))?;
        self.sensitive &= !(1 << index);
        Ok(())
    }

    /// Whether changes on digital input `index` are reported. Always false for invalid indices.
    pub fn is_sensitive(&self, index: u8) -> bool {
        valid_input(index).map_or(false, |i| self.sensitive & (1 << i) != 0)
    }
}

impl<'io, IO: BoardIO> Poll for InputWatch<'io, IO> {
    type Error = Error<IO::BusError>;

    fn eval(&mut self) -> Result<Option<Notification>, Self::Error> {
        let now = self.io.sample_inputs()?;
        let changed = (self.last ^ now) & self.sensitive;
        self.last = now;
        if changed == 0 {
            return Ok(None);
        }
        let mut n = Notification::new();
        for index in (0..8).filter(|i| changed & (1 << i) != 0) {
            n.record(PinId::digital(index), Value::Digital(i32::from((now >> index) & 1)));
        }
        debug!("Inputs changed: {:#010b}", changed);
        Ok(Some(n))
    }
}
