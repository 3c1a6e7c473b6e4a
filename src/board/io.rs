//! The I/O adapter that pin handles, predicates and watches read through.

use core::marker::PhantomData;

use board::Board;
use error::Error;
use interface::BoardInterface;
use mutex::BoardMutex;
use notify::PinId;
use pin::{AnaloguePin, BoardIO, DigitalPin, OutputLine};
use watch::InputWatch;

/// This I/O adapter captures the `Board` behind a mutex and provides a factory for pin handles.
/// Every read through a handle is an immediate bus transaction; nothing is cached between reads
/// except the per-pin history used for edge detection.
///
/// ```
/// # use jointio::interface::noop::NoopInterface;
/// # use jointio::{Board, DefaultMutex, Poll};
/// let io = Board::new(NoopInterface::new()).into_io::<DefaultMutex<_>>();
/// let mut bumper = io.digital_pin(0).unwrap();
/// let battery = io.analogue_pin(7).unwrap();
///
/// assert_eq!(bumper.eval().unwrap(), None);
/// assert_eq!(battery.value().unwrap(), 0.0);
/// io.set_output(2, true).unwrap();
/// ```
pub struct JointIO<M, BI>(M, PhantomData<BI>)
where
    M: BoardMutex<Board<BI>>,
    BI: BoardInterface;

impl<M, BI> JointIO<M, BI>
where
    M: BoardMutex<Board<BI>>,
    BI: BoardInterface,
{
    pub(crate) fn new(board: Board<BI>) -> Self {
        JointIO(M::new(board), PhantomData)
    }

    /// Create a handle observing digital input `index` (in the range `0..8`). The pin is read once
    /// immediately to establish its history, unless another handle on the same input already did.
    pub fn digital_pin<'io>(
        &'io self,
        index: u8,
    ) -> Result<DigitalPin<'io, Self>, Error<BI::Error>> {
        DigitalPin::new(self, index)
    }

    /// Create a handle observing analogue input `index` (in the range `0..8`).
    pub fn analogue_pin<'io>(
        &'io self,
        index: u8,
    ) -> Result<AnaloguePin<'io, Self>, Error<BI::Error>> {
        AnaloguePin::new(self, index)
    }

    /// Create a handle driving output `bit` (in the range `0..4`).
    pub fn output_line<'io>(&'io self, bit: u8) -> Result<OutputLine<'io, Self>, Error<BI::Error>> {
        OutputLine::new(self, bit)
    }

    /// Create a watch over the whole digital input port.
    pub fn input_watch<'io>(&'io self) -> Result<InputWatch<'io, Self>, Error<BI::Error>> {
        InputWatch::new(self)
    }

    /// Drive output `bit` high or low and wait for the board to confirm. See
    /// [`Board::set_output`].
    pub fn set_output(&self, bit: u8, high: bool) -> Result<(), Error<BI::Error>> {
        self.0.lock(|board| board.set_output(bit, high))
    }

    /// Run `f` with exclusive access to the board, for operations the adapter does not wrap.
    pub fn with_board<R, F: FnOnce(&mut Board<BI>) -> R>(&self, f: F) -> R {
        self.0.lock(f)
    }
}

impl<M, BI> BoardIO for JointIO<M, BI>
where
    M: BoardMutex<Board<BI>>,
    BI: BoardInterface,
{
    type BusError = BI::Error;

    fn sample(&self, pin: PinId) -> Result<u16, Error<BI::Error>> {
        self.0.lock(|board| board.sample(pin))
    }
    fn sample_edge(&self, pin: PinId) -> Result<Option<u16>, Error<BI::Error>> {
        self.0.lock(|board| board.sample_edge(pin))
    }
    fn seed(&self, pin: PinId) -> Result<(), Error<BI::Error>> {
        self.0.lock(|board| board.seed(pin))
    }
    fn sample_inputs(&self) -> Result<u8, Error<BI::Error>> {
        self.0.lock(|board| board.read_digital_input())
    }
    fn set_output(&self, bit: u8, high: bool) -> Result<(), Error<BI::Error>> {
        self.0.lock(|board| board.set_output(bit, high))
    }
}
