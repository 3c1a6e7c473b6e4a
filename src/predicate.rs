//! Comparison predicates over pins and constants.
//!
//! A [`Predicate`] is built with one of the builder functions in this module and then polled
//! once per tick like any other node. Unlike a single pin, a predicate has no edge detection: it
//! notifies on *every* tick its condition holds, carrying the values of its pin operands.
//!
//! ```
//! # use jointio::interface::noop::NoopInterface;
//! # use jointio::{Board, DefaultMutex, Poll};
//! use jointio::predicate::{equal, less_than};
//!
//! let io = Board::new(NoopInterface::new()).into_io::<DefaultMutex<_>>();
//! let left = io.digital_pin(0).unwrap();
//! let right = io.digital_pin(1).unwrap();
//! let battery = io.analogue_pin(7).unwrap();
//!
//! let mut both_pressed = equal(left, right).unwrap();
//! let mut flat = less_than(battery, 2.9).unwrap();
//!
//! assert!(both_pressed.eval().unwrap().is_some());
//! assert!(flat.holds().unwrap());
//! assert_eq!(format!("{}", flat), "LessThan(a7 < 2.900)");
//! ```

use core::fmt;

use heapless::Vec;

use error::Error;
use notify::{Notification, PinId, Poll, Value};
use pin::{AnaloguePin, BoardIO, DigitalPin};

/// Most operands an `Equal` predicate accepts.
pub const MAX_OPERANDS: usize = 8;

/// Something a predicate can read a value from: a pin, or a constant.
pub enum Operand<'io, IO: BoardIO + 'io> {
    Digital(DigitalPin<'io, IO>),
    Analogue(AnaloguePin<'io, IO>),
    /// An integer constant.
    DigitalValue(i32),
    /// A voltage constant.
    AnalogueValue(f64),
}

impl<'io, IO: BoardIO> Operand<'io, IO> {
    /// Current value. Pins are read live from the board.
    pub fn value(&self) -> Result<Value, Error<IO::BusError>> {
        match *self {
            Operand::Digital(ref pin) => pin.value().map(Value::Digital),
            Operand::Analogue(ref pin) => pin.value().map(Value::Analogue),
            Operand::DigitalValue(v) => Ok(Value::Digital(v)),
            Operand::AnalogueValue(v) => Ok(Value::Analogue(v)),
        }
    }

    /// The pin behind this operand, if it is not a constant.
    pub fn pin(&self) -> Option<PinId> {
        match *self {
            Operand::Digital(ref pin) => Some(pin.id()),
            Operand::Analogue(ref pin) => Some(pin.id()),
            Operand::DigitalValue(_) | Operand::AnalogueValue(_) => None,
        }
    }

    fn is_analogue_pin(&self) -> bool {
        match *self {
            Operand::Analogue(_) => true,
            _ => false,
        }
    }
}

impl<'io, IO: BoardIO> From<DigitalPin<'io, IO>> for Operand<'io, IO> {
    fn from(pin: DigitalPin<'io, IO>) -> Self {
        Operand::Digital(pin)
    }
}

impl<'io, IO: BoardIO> From<AnaloguePin<'io, IO>> for Operand<'io, IO> {
    fn from(pin: AnaloguePin<'io, IO>) -> Self {
        Operand::Analogue(pin)
    }
}

impl<'io, IO: BoardIO> From<i32> for Operand<'io, IO> {
    fn from(v: i32) -> Self {
        Operand::DigitalValue(v)
    }
}

impl<'io, IO: BoardIO> From<f64> for Operand<'io, IO> {
    fn from(v: f64) -> Self {
        Operand::AnalogueValue(v)
    }
}

impl<'io, IO: BoardIO> Clone for Operand<'io, IO> {
    fn clone(&self) -> Self {
        match *self {
            Operand::Digital(pin) => Operand::Digital(pin),
            Operand::Analogue(pin) => Operand::Analogue(pin),
            Operand::DigitalValue(v) => Operand::DigitalValue(v),
            Operand::AnalogueValue(v) => Operand::AnalogueValue(v),
        }
    }
}

impl<'io, IO: BoardIO> fmt::Display for Operand<'io, IO> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Operand::Digital(ref pin) => write!(f, "{}", pin.id()),
            Operand::Analogue(ref pin) => write!(f, "{}", pin.id()),
            Operand::DigitalValue(v) => write!(f, "{}", Value::Digital(v)),
            Operand::AnalogueValue(v) => write!(f, "{}", Value::Analogue(v)),
        }
    }
}

impl<'io, IO: BoardIO> fmt::Debug for Operand<'io, IO> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// The six comparisons a predicate can make.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Comparison {
    /// All operands equal. Takes two or more operands, none of them analogue pins.
    Equal,
    /// `a != b`.
    NotEqual,
    /// `a < b`.
    LessThan,
    /// `a > b`.
    GreaterThan,
    /// `a <= b`.
    LessOrEqual,
    /// `a >= b`.
    GreaterOrEqual,
}

impl Comparison {
    fn symbol(self) -> &'static str {
        match self {
            Comparison::Equal => "==",
            Comparison::NotEqual => "!=",
            Comparison::LessThan => "<",
            Comparison::GreaterThan => ">",
            Comparison::LessOrEqual => "<=",
            Comparison::GreaterOrEqual => ">=",
        }
    }

    fn test(self, values: &[Value]) -> bool {
        let (a, b) = (values[0], values[1]);
        match self {
            Comparison::Equal => values.iter().all(|v| *v == a),
            Comparison::NotEqual => a != b,
            Comparison::LessThan => a < b,
            Comparison::GreaterThan => a > b,
            Comparison::LessOrEqual => a <= b,
            Comparison::GreaterOrEqual => a >= b,
        }
    }
}

/// A comparison node over two or more operands. Its shape is fixed at construction; only the
/// values read through its pins change from tick to tick.
pub struct Predicate<'io, IO: BoardIO + 'io> {
    kind: Comparison,
    operands: Vec<Operand<'io, IO>, MAX_OPERANDS>,
}

impl<'io, IO: BoardIO> Predicate<'io, IO> {
    /// Build a predicate. `Equal` takes between 2 and `MAX_OPERANDS` operands and rejects
    /// analogue pins; every other comparison takes exactly 2.
    pub fn new<I>(kind: Comparison, operands: I) -> Result<Self, Error<IO::BusError>>
    where
        I: IntoIterator<Item = Operand<'io, IO>>,
    {
        let mut ops = Vec::new();
        for op in operands {
            ops.push(op).map_err(|_| Error::OperandCount)?;
        }
        let arity_ok = match kind {
            Comparison::Equal => ops.len() >= 2,
            _ => ops.len() == 2,
        };
        if !arity_ok {
            return Err(Error::OperandCount);
        }
        if kind == Comparison::Equal && ops.iter().any(Operand::is_analogue_pin) {
            return Err(Error::UnsupportedComparison);
        }
        Ok(Predicate {
            kind,
            operands: ops,
        })
    }

    /// The comparison this predicate makes.
    pub fn kind(&self) -> Comparison {
        self.kind
    }

    /// The operands, in construction order.
    pub fn operands(&self) -> &[Operand<'io, IO>] {
        &self.operands
    }

    /// Whether the condition holds right now.
    pub fn holds(&mut self) -> Result<bool, Error<IO::BusError>> {
        self.eval().map(|n| n.is_some())
    }
}

impl<'io, IO: BoardIO> Poll for Predicate<'io, IO> {
    type Error = Error<IO::BusError>;

    /// Read every operand once, then compare. Notifies with the pin operands' values whenever
    /// the comparison holds.
    fn eval(&mut self) -> Result<Option<Notification>, Self::Error> {
        let mut values: Vec<Value, MAX_OPERANDS> = Vec::new();
        for op in self.operands.iter() {
            let _ = values.push(op.value()?);
        }
        if !self.kind.test(&values) {
            return Ok(None);
        }
        let mut n = Notification::new();
        for (op, value) in self.operands.iter().zip(values.iter()) {
            if let Some(pin) = op.pin() {
                n.record(pin, *value);
            }
        }
        Ok(Some(n))
    }
}

impl<'io, IO: BoardIO> fmt::Display for Predicate<'io, IO> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}(", self.kind)?;
        for (i, op) in self.operands.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", self.kind.symbol())?;
            }
            write!(f, "{}", op)?;
        }
        write!(f, ")")
    }
}

impl<'io, IO: BoardIO> fmt::Debug for Predicate<'io, IO> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

fn binary<'io, IO, A, B>(
    kind: Comparison,
    a: A,
    b: B,
) -> Result<Predicate<'io, IO>, Error<IO::BusError>>
where
    IO: BoardIO + 'io,
    A: Into<Operand<'io, IO>>,
    B: Into<Operand<'io, IO>>,
{
    let pair: [Operand<'io, IO>; 2] = [a.into(), b.into()];
    Predicate::new(kind, pair.iter().cloned())
}

/// `a == b`. Fails with `Error::UnsupportedComparison` if either side is an analogue pin.
pub fn equal<'io, IO, A, B>(a: A, b: B) -> Result<Predicate<'io, IO>, Error<IO::BusError>>
where
    IO: BoardIO + 'io,
    A: Into<Operand<'io, IO>>,
    B: Into<Operand<'io, IO>>,
{
    binary(Comparison::Equal, a, b)
}

/// All operands equal to each other.
pub fn equal_all<'io, IO, I>(operands: I) -> Result<Predicate<'io, IO>, Error<IO::BusError>>
where
    IO: BoardIO + 'io,
    I: IntoIterator,
    I::Item: Into<Operand<'io, IO>>,
{
    Predicate::new(Comparison::Equal, operands.into_iter().map(Into::into))
}

/// `a != b`.
pub fn not_equal<'io, IO, A, B>(a: A, b: B) -> Result<Predicate<'io, IO>, Error<IO::BusError>>
where
    IO: BoardIO + 'io,
    A: Into<Operand<'io, IO>>,
    B: Into<Operand<'io, IO>>,
{
    binary(Comparison::NotEqual, a, b)
}

/// `a < b`.
pub fn less_than<'io, IO, A, B>(a: A, b: B) -> Result<Predicate<'io, IO>, Error<IO::BusError>>
where
    IO: BoardIO + 'io,
    A: Into<Operand<'io, IO>>,
    B: Into<Operand<'io, IO>>,
{
    binary(Comparison::LessThan, a, b)
}

/// `a > b`.
pub fn greater_than<'io, IO, A, B>(a: A, b: B) -> Result<Predicate<'io, IO>, Error<IO::BusError>>
where
    IO: BoardIO + 'io,
    A: Into<Operand<'io, IO>>,
    B: Into<Operand<'io, IO>>,
{
    binary(Comparison::GreaterThan, a, b)
}

/// `a <= b`.
pub fn less_or_equal<'io, IO, A, B>(a: A, b: B) -> Result<Predicate<'io, IO>, Error<IO::BusError>>
where
    IO: BoardIO + 'io,
    A: Into<Operand<'io, IO>>,
    B: Into<Operand<'io, IO>>,
{
    binary(Comparison::LessOrEqual, a, b)
}

/// `a >= b`.
pub fn greater_or_equal<'io, IO, A, B>(
    a: A,
    b: B,
) -> Result<Predicate<'io, IO>, Error<IO::BusError>>
where
    IO: BoardIO + 'io,
    A: Into<Operand<'io, IO>>,
    B: Into<Operand<'io, IO>>,
{
    binary(Comparison::GreaterOrEqual, a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use board::Board;
    use interface::test_spy::{SpyBusError, TestSpyInterface};
    use mutex::DefaultMutex;
    use proptest::prelude::*;

    #[test]
    fn equal_notifies_every_tick_it_holds() {
        let ei = TestSpyInterface::new();
        let io = Board::new(ei.split()).into_io::<DefaultMutex<_>>();
        let a = io.digital_pin(0).unwrap();
        let b = io.digital_pin(1).unwrap();
        let mut same = equal(a, b).unwrap();

        for _ in 0..3 {
            let n = same.eval().unwrap().unwrap();
            assert_eq!(n.get(PinId::digital(0)), Some(Value::Digital(0)));
            assert_eq!(n.get(PinId::digital(1)), Some(Value::Digital(0)));
        }

        ei.set_inputs(0b01);
        assert_eq!(same.eval(), Ok(None));

        ei.set_inputs(0b11);
        assert_eq!(same.eval().unwrap().unwrap().len(), 2);
    }

    #[test]
    fn equal_all_needs_every_operand() {
        let ei = TestSpyInterface::new();
        let io = Board::new(ei.split()).into_io::<DefaultMutex<_>>();
        let pins: std::vec::Vec<_> = (0..3)
            .map(|i| Operand::from(io.digital_pin(i).unwrap()))
            .collect();
        let mut all_high = equal_all(pins.into_iter().chain(Some(Operand::from(1)))).unwrap();
        assert_eq!(all_high.operands().len(), 4);

        ei.set_inputs(0b011);
        assert_eq!(all_high.holds(), Ok(false));
        ei.set_inputs(0b111);
        let n = all_high.eval().unwrap().unwrap();
        assert_eq!(n.len(), 3);
    }

    #[test]
    fn equal_reads_every_operand() {
        let ei = TestSpyInterface::new();
        let io = Board::new(ei.split()).into_io::<DefaultMutex<_>>();
        let mut p = equal_all(vec![
            Operand::from(io.digital_pin(0).unwrap()),
            Operand::from(1),
            Operand::from(io.digital_pin(1).unwrap()),
        ])
        .unwrap();
        ei.clear_log();
        assert_eq!(p.eval(), Ok(None));
        assert_eq!(ei.reads(), vec![4, 4]);
    }

    #[test]
    fn less_than_constant_reports_only_pin() {
        let ei = TestSpyInterface::new();
        let io = Board::new(ei.split()).into_io::<DefaultMutex<_>>();
        let a = io.digital_pin(4).unwrap();
        let mut p = less_than(a, 5).unwrap();
        let n = p.eval().unwrap().unwrap();
        assert_eq!(n.len(), 1);
        assert_eq!(n.get(PinId::digital(4)), Some(Value::Digital(0)));
    }

    #[test]
    fn equal_rejects_analogue_pins() {
        let ei = TestSpyInterface::new();
        let io = Board::new(ei.split()).into_io::<DefaultMutex<_>>();
        let a = io.analogue_pin(0).unwrap();
        let d = io.digital_pin(0).unwrap();
        assert_eq!(equal(a, 1.5).err(), Some(Error::UnsupportedComparison));
        assert_eq!(equal(d, a).err(), Some(Error::UnsupportedComparison));
        assert!(not_equal(a, 1.5).is_ok());
        // An analogue constant is fine.
        assert!(equal(d, 1.0).is_ok());
    }

    #[test]
    fn operand_counts() {
        let ei = TestSpyInterface::new();
        let io = Board::new(ei.split()).into_io::<DefaultMutex<_>>();
        let d = io.digital_pin(0).unwrap();
        assert_eq!(
            equal_all(vec![Operand::from(d)]).err(),
            Some(Error::OperandCount)
        );
        assert_eq!(
            equal_all((0..9).map(|_| Operand::from(d))).err(),
            Some(Error::OperandCount)
        );
        assert_eq!(
            Predicate::new(
                Comparison::LessThan,
                vec![Operand::from(d), Operand::from(1), Operand::from(2)]
            )
            .err(),
            Some(Error::OperandCount)
        );
    }

    #[test]
    fn ordering_comparisons_on_analogue() {
        let ei = TestSpyInterface::new();
        let io = Board::new(ei.split()).into_io::<DefaultMutex<_>>();
        let a = io.analogue_pin(2).unwrap();
        let b = io.analogue_pin(3).unwrap();
        ei.set_analogue(2, 100);
        ei.set_analogue(3, 200);

        assert_eq!(less_than(a, b).unwrap().holds(), Ok(true));
        assert_eq!(greater_than(a, b).unwrap().holds(), Ok(false));
        assert_eq!(less_or_equal(a, a).unwrap().holds(), Ok(true));
        assert_eq!(greater_or_equal(b, a).unwrap().holds(), Ok(true));
        assert_eq!(not_equal(a, b).unwrap().holds(), Ok(true));

        let n = greater_than(b, 0.5).unwrap().eval().unwrap().unwrap();
        assert_eq!(n.len(), 1);
        assert!(n.contains(PinId::analogue(3)));
    }

    #[test]
    fn predicates_share_pins_without_touching_history() {
        let ei = TestSpyInterface::new();
        let io = Board::new(ei.split()).into_io::<DefaultMutex<_>>();
        let mut pin = io.digital_pin(0).unwrap();
        let mut high = equal(pin, 1).unwrap();
        let mut low = equal(pin, 0).unwrap();

        ei.set_inputs(0b1);
        assert_eq!(high.holds(), Ok(true));
        assert_eq!(low.holds(), Ok(false));
        // The edge is still pending for the pin itself.
        assert!(pin.eval().unwrap().is_some());
    }

    #[test]
    fn bus_error_aborts_eval() {
        let ei = TestSpyInterface::new();
        let io = Board::new(ei.split()).into_io::<DefaultMutex<_>>();
        let mut p = greater_than(io.digital_pin(0).unwrap(), 0).unwrap();
        ei.fail_transfers(true);
        assert_eq!(p.eval(), Err(Error::Bus(SpyBusError)));
    }

    #[test]
    fn display() {
        let ei = TestSpyInterface::new();
        let io = Board::new(ei.split()).into_io::<DefaultMutex<_>>();
        let d0 = io.digital_pin(0).unwrap();
        let d1 = io.digital_pin(1).unwrap();
        let p = equal_all(vec![Operand::from(d0), Operand::from(d1), Operand::from(1)]).unwrap();
        assert_eq!(format!("{}", p), "Equal(d0 == d1 == 1)");
        let q = greater_or_equal(io.analogue_pin(2).unwrap(), 1.25).unwrap();
        assert_eq!(format!("{}", q), "GreaterOrEqual(a2 >= 1.250)");
    }

    proptest! {
        #[test]
        fn less_than_five_tracks_pin(inputs in any::<u8>(), index in 0u8..8) {
            let ei = TestSpyInterface::new();
            let io = Board::new(ei.split()).into_io::<DefaultMutex<_>>();
            let a = io.digital_pin(index).unwrap();
            let mut p = less_than(a, 5).unwrap();
            ei.set_inputs(inputs);
            let level = i32::from((inputs >> index) & 1);
            prop_assert_eq!(
                p.eval().unwrap().and_then(|n| n.get(PinId::digital(index))),
                Some(Value::Digital(level))
            );
        }

        #[test]
        fn less_than_threshold_matches_value(sample in 0u16..1024, threshold in 0.0f64..3.3) {
            let ei = TestSpyInterface::new();
            let io = Board::new(ei.split()).into_io::<DefaultMutex<_>>();
            let a = io.analogue_pin(0).unwrap();
            let mut p = less_than(a, threshold).unwrap();
            ei.set_analogue(0, sample);
            let below = a.value().unwrap() < threshold;
            prop_assert_eq!(p.eval().unwrap().is_some(), below);
        }
    }
}
