//! Handles for individual board pins, and the `BoardIO` indirection they read through.
//!
//! Handles are cheap `Copy` references into an I/O adapter. Edge history is kept by the adapter
//! per physical pin, so every handle on the same input agrees about what the last observed value
//! was: whichever handle is evaluated first after a change reports it, and the others do not.

use core::fmt;

#[cfg(feature = "unproven")]
use hal::digital::v2::InputPin;
use hal::digital::v2::OutputPin;

use error::Error;
use notify::{Notification, PinId, Poll, Value};
use registers::{sample_to_volts, valid_input, valid_output};

/// An indirection between pin handles and the board, implemented by [`JointIO`].
///
/// [`JointIO`]: ../board/io/struct.JointIO.html
pub trait BoardIO {
    /// The error type of the underlying transport.
    type BusError;

    /// Live read of `pin` as a raw sample (0/1, or the ADC word).
    fn sample(&self, pin: PinId) -> Result<u16, Error<Self::BusError>>;

    /// Live read of `pin`, returning the sample only if it differs from the pin's history, and
    /// recording it as the new history.
    fn sample_edge(&self, pin: PinId) -> Result<Option<u16>, Error<Self::BusError>>;

    /// Read `pin` and record it as its history if it has none yet.
    fn seed(&self, pin: PinId) -> Result<(), Error<Self::BusError>>;

    /// Live read of the whole digital input port.
    fn sample_inputs(&self) -> Result<u8, Error<Self::BusError>>;

    /// Drive an output bit and wait for the board to confirm.
    fn set_output(&self, bit: u8, high: bool) -> Result<(), Error<Self::BusError>>;
}

/// Observes one digital input.
pub struct DigitalPin<'io, IO: BoardIO + 'io> {
    io: &'io IO,
    index: u8,
}

impl<'io, IO: BoardIO> DigitalPin<'io, IO> {
    pub(crate) fn new(io: &'io IO, index: u8) -> Result<Self, Error<IO::BusError>> {
        let index = valid_input(index).ok_or(Error::InvalidPin(index))?;
        io.seed(PinId::digital(index))?;
        Ok(Self { io, index })
    }

    /// The input index this handle observes.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// The physical pin this handle observes.
    pub fn id(&self) -> PinId {
        PinId::digital(self.index)
    }

    /// Read the pin now: 0 or 1. Does not touch the edge history.
    pub fn value(&self) -> Result<i32, Error<IO::BusError>> {
        self.io.sample(self.id()).map(i32::from)
    }
}

impl<'io, IO: BoardIO> Poll for DigitalPin<'io, IO> {
    type Error = Error<IO::BusError>;

    /// Report the pin's new value on the tick it changes.
    fn eval(&mut self) -> Result<Option<Notification>, Self::Error> {
        Ok(self.io.sample_edge(self.id())?.map(|sample| {
            let value = Value::Digital(i32::from(sample));
            debug!("{} changed to {}", self.id(), value);
            Notification::single(self.id(), value)
        }))
    }
}

#[cfg(feature = "unproven")]
impl<'io, IO: BoardIO> InputPin for DigitalPin<'io, IO> {
    type Error = Error<IO::BusError>;

    fn is_high(&self) -> Result<bool, Self::Error> {
        self.value().map(|v| v == 1)
    }
    fn is_low(&self) -> Result<bool, Self::Error> {
        self.value().map(|v| v == 0)
    }
}

/// Observes one analogue input. Values are volts, `sample / 1023 * 3.3`.
pub struct AnaloguePin<'io, IO: BoardIO + 'io> {
    io: &'io IO,
    index: u8,
}

impl<'io, IO: BoardIO> AnaloguePin<'io, IO> {
    pub(crate) fn new(io: &'io IO, index: u8) -> Result<Self, Error<IO::BusError>> {
        let index = valid_input(index).ok_or(Error::InvalidPin(index))?;
        io.seed(PinId::analogue(index))?;
        Ok(Self { io, index })
    }

    /// The input index this handle observes.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// The physical pin this handle observes.
    pub fn id(&self) -> PinId {
        PinId::analogue(self.index)
    }

    /// Read the pin now, in volts. Does not touch the edge history.
    pub fn value(&self) -> Result<f64, Error<IO::BusError>> {
        self.sample().map(sample_to_volts)
    }

    /// Read the raw ADC word.
    pub fn sample(&self) -> Result<u16, Error<IO::BusError>> {
        self.io.sample(self.id())
    }
}

impl<'io, IO: BoardIO> Poll for AnaloguePin<'io, IO> {
    type Error = Error<IO::BusError>;

    /// Report the pin's new voltage whenever its raw sample changes. The history is updated on
    /// every report, same as for digital pins.
    fn eval(&mut self) -> Result<Option<Notification>, Self::Error> {
        Ok(self.io.sample_edge(self.id())?.map(|sample| {
            let value = Value::Analogue(sample_to_volts(sample));
            debug!("{} changed to {}", self.id(), value);
            Notification::single(self.id(), value)
        }))
    }
}

/// Drives one digital output. Every write waits for the board to confirm, per the board's
/// verify policy.
pub struct OutputLine<'io, IO: BoardIO + 'io> {
    io: &'io IO,
    bit: u8,
}

impl<'io, IO: BoardIO> OutputLine<'io, IO> {
    pub(crate) fn new(io: &'io IO, bit: u8) -> Result<Self, Error<IO::BusError>> {
        let bit = valid_output(bit).ok_or(Error::InvalidOutput(bit))?;
        Ok(Self { io, bit })
    }

    /// The output bit this handle drives.
    pub fn bit(&self) -> u8 {
        self.bit
    }

    /// Drive the output high or low and wait for the board to confirm.
    pub fn set(&mut self, high: bool) -> Result<(), Error<IO::BusError>> {
        self.io.set_output(self.bit, high)
    }
}

impl<'io, IO: BoardIO> OutputPin for OutputLine<'io, IO> {
    type Error = Error<IO::BusError>;

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true)
    }
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false)
    }
}

// Manual impls: deriving would demand `IO: Clone`/`IO: Debug` of the adapter.

impl<'io, IO: BoardIO> Clone for DigitalPin<'io, IO> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'io, IO: BoardIO> Copy for DigitalPin<'io, IO> {}

impl<'io, IO: BoardIO> Clone for AnaloguePin<'io, IO> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'io, IO: BoardIO> Copy for AnaloguePin<'io, IO> {}

impl<'io, IO: BoardIO> fmt::Debug for DigitalPin<'io, IO> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "DigitalPin({})", self.index)
    }
}

impl<'io, IO: BoardIO> fmt::Debug for AnaloguePin<'io, IO> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AnaloguePin({})", self.index)
    }
}
