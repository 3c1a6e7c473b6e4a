//! Values read from the board, the notifications emitted when a condition qualifies, and the
//! per-tick `Poll` hook a scheduler drives.

use core::cmp::Ordering;
use core::fmt;

use heapless::{LinearMap, Vec};

use registers::INPUT_COUNT;

/// Capacity of a notification: every digital and analogue input on the board.
pub const MAX_PINS: usize = 2 * INPUT_COUNT as usize;

/// Which of the board's two input banks a pin belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PinKind {
    Digital,
    Analogue,
}

/// Identifies one physical input on the board. Digital input 3 and analogue input 3 are distinct
/// pins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PinId {
    pub kind: PinKind,
    pub index: u8,
}

impl PinId {
    /// Digital input `index`.
    pub fn digital(index: u8) -> Self {
        PinId {
            kind: PinKind::Digital,
            index,
        }
    }

    /// Analogue input `index`.
    pub fn analogue(index: u8) -> Self {
        PinId {
            kind: PinKind::Analogue,
            index,
        }
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            PinKind::Digital => write!(f, "d{}", self.index),
            PinKind::Analogue => write!(f, "a{}", self.index),
        }
    }
}

/// A value taking part in a comparison. Digital values are 0 or 1 when read from a pin; analogue
/// values are volts.
///
/// Values compare numerically regardless of kind, so `Digital(1) == Analogue(1.0)`.
#[derive(Clone, Copy, Debug)]
pub enum Value {
    Digital(i32),
    Analogue(f64),
}

impl Value {
    /// The value widened to `f64`, as used for comparisons.
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Digital(v) => f64::from(v),
            Value::Analogue(v) => v,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (*self, *other) {
            (Value::Digital(a), Value::Digital(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Value) -> Option<Ordering> {
        match (*self, *other) {
            (Value::Digital(a), Value::Digital(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Value::Digital(v) => write!(f, "{}", v),
            Value::Analogue(v) => write!(f, "{:.3}", v),
        }
    }
}

/// Emitted by [`Poll::eval`] when a condition qualifies. Holds the value each participating pin
/// had at that moment; literal operands are never reported.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pins: LinearMap<PinId, Value, MAX_PINS>,
}

impl Notification {
    pub(crate) fn new() -> Self {
        Notification {
            pins: LinearMap::new(),
        }
    }

    pub(crate) fn single(pin: PinId, value: Value) -> Self {
        let mut n = Notification::new();
        n.record(pin, value);
        n
    }

    /// Every distinct `PinId` fits, so inserting never overflows.
    pub(crate) fn record(&mut self, pin: PinId, value: Value) {
        let _ = self.pins.insert(pin, value);
    }

    /// The value `pin` held when the notification was produced, if it took part.
    pub fn get(&self, pin: PinId) -> Option<Value> {
        self.pins.get(&pin).cloned()
    }

    /// Whether `pin` took part.
    pub fn contains(&self, pin: PinId) -> bool {
        self.pins.contains_key(&pin)
    }

    /// Every reported pin with its value, in the order they were recorded.
    pub fn iter<'a>(&'a self) -> impl Iterator<Item = (PinId, Value)> + 'a {
        self.pins.iter().map(|(p, v)| (*p, *v))
    }

    /// Number of pins reported.
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

/// Folds the notifications from several nodes that fired in one tick into a single record for
/// the continuation, the way a scheduler hands one event to a reaction. Pins keep the order in
/// which they were first seen; a pin reported twice keeps its latest value.
#[derive(Clone, Debug, Default)]
pub struct IoInfo {
    pins: Vec<PinId, MAX_PINS>,
    values: LinearMap<PinId, Value, MAX_PINS>,
}

impl IoInfo {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in every pin of `notification`.
    pub fn add(&mut self, notification: &Notification) {
        for (pin, value) in notification.iter() {
            if !self.pins.contains(&pin) {
                let _ = self.pins.push(pin);
            }
            let _ = self.values.insert(pin, value);
        }
    }

    /// Pins seen so far, in first-seen order.
    pub fn pins(&self) -> &[PinId] {
        &self.pins
    }

    /// Latest value reported for `pin`.
    pub fn value(&self, pin: PinId) -> Option<Value> {
        self.values.get(&pin).cloned()
    }
}

/// The per-tick hook a cooperative scheduler calls on every registered node.
///
/// `eval` performs one live read pass over whatever the node observes and returns a notification
/// when the node's condition qualifies on this tick. Binding notifications to reactions is the
/// scheduler's job.
pub trait Poll {
    /// The error type for failed reads.
    type Error;

    /// Run one tick.
    fn eval(&mut self) -> Result<Option<Notification>, Self::Error>;
}
