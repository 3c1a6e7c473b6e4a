//! Driver library for the JointIO robot I/O board.
//!
//! The JointIO board sits on an I2C bus and provides eight digital inputs, eight 10-bit analogue
//! inputs sharing the same connector pins, and four digital outputs. Each operation is a single
//! command opcode, optionally followed by a payload byte (for writes) or a response (for reads).
//!
//! This driver is intended to work on embedded platforms using any implementation of the
//! `embedded-hal` trait library, as well as on hosted platforms through the `std` feature. It
//! communicates with the board via any I2C master implementing the blocking HAL traits, and
//! permits creation of pin handles which can be polled for changes, combined into comparison
//! predicates, or composed with other drivers through the HAL GPIO traits.
//!
//! # Construction
//!
//! To set up the driver:
//!
//! - Use your platform's `embedded-hal` implementation to obtain the I2C master device the board
//!   is connected to.
//! - Construct a [`BoardInterface`] (the [`I2cInterface`]) which will take ownership of the I2C
//!   device you just obtained.
//! - Construct a [`Board`], which will take ownership of the `BoardInterface`, and which will
//!   provide a builder API to configure the driver.
//!
//! ```ignore
//! let i2c = /* construct something implementing embedded_hal::blocking::i2c::{Write,WriteRead} */
//!
//! let bi = jointio::I2cInterface::new(i2c);
//! let mut board = jointio::Board::new(bi);
//! ```
//!
//! # Configuration
//!
//! *See [`Board::configure`] and [`config::Configurator`].*
//!
//! Output writes are confirmed by reading the committed mask back from the board and rewriting
//! until the two agree. By default this retries forever; the configurator can bound it, and can
//! stage an initial output state to be written (and verified) in one bus write:
//!
//! ```
//! # use jointio::interface::noop::NoopInterface;
//! # let mut board = jointio::Board::new(NoopInterface::new());
//! board
//!     .configure()
//!     .verify(jointio::VerifyPolicy::Attempts(5))
//!     .output(0, true)
//!     .output(3, true)
//!     .commit()
//!     .unwrap();
//! assert_eq!(board.output_mask(), 0b1001);
//! ```
//!
//! # Raw mode
//!
//! *See [`Board`].*
//!
//! A configured board can be driven directly, one bus transaction per call:
//!
//! ```
//! # use jointio::interface::noop::NoopInterface;
//! # let mut board = jointio::Board::new(NoopInterface::new());
//! let inputs: u8 = board.read_digital_input().unwrap();
//! let battery: u16 = board.read_analogue(7).unwrap();
//! board.set_output(2, true).unwrap();
//! # let _ = (inputs, battery);
//! ```
//!
//! # Polled mode
//!
//! *See [`Board::into_io`] and [`JointIO`].*
//!
//! Converting the `Board` into a [`JointIO`] adapter places it behind a mutex and lets you create
//! any number of lightweight handles onto it:
//!
//! - [`DigitalPin`] and [`AnaloguePin`] report a [`Notification`] when their pin changes since the
//!   last time *any* handle on that pin looked at it. Edge history lives with the board, one slot
//!   per physical pin, so two handles on the same pin share it.
//! - [`Predicate`]s compare pins against each other or against constants, and report on every tick
//!   that their condition holds.
//! - An [`InputWatch`] reports every change across the digital input port, filtered by a
//!   sensitivity set.
//! - [`OutputLine`] drives one output bit and implements the HAL `OutputPin` trait.
//!
//! All of these implement [`Poll`], so an application's event loop only needs to call `eval` on
//! each node once per tick and act on the notifications that come back. An [`IoInfo`] can gather
//! the notifications of a tick into one record.
//!
//! ```
//! # use jointio::interface::noop::NoopInterface;
//! use jointio::{predicate, Board, DefaultMutex, IoInfo, Poll};
//!
//! let io = Board::new(NoopInterface::new()).into_io::<DefaultMutex<_>>();
//! let bumper = io.digital_pin(0).unwrap();
//! let battery = io.analogue_pin(7).unwrap();
//! let mut horn = io.output_line(1).unwrap();
//!
//! let mut bumped = predicate::equal(bumper, 1).unwrap();
//! let mut flat = predicate::less_than(battery, 2.9).unwrap();
//!
//! let mut info = IoInfo::new();
//! for n in [bumped.eval().unwrap(), flat.eval().unwrap()].iter() {
//!     if let Some(ref n) = *n {
//!         info.add(n);
//!     }
//! }
//! if !info.pins().is_empty() {
//!     horn.set(true).unwrap();
//! }
//! ```
//!
//! ## Mutual exclusion
//!
//! The `JointIO` adapter requires you to provide a mutual exclusion primitive to arbitrate access
//! to the board from multiple handles. The adapter is parameterized over a type implementing the
//! [`BoardMutex`] trait.
//!
//! In a `std` environment you may enable the `std` Cargo feature, and `mutex::DefaultMutex<T>`
//! will be a type alias to `std::sync::Mutex<T>` with a provided impl of `BoardMutex`. Similarly,
//! for Cortex-M environments using the `cortex-m` crate, enabling the `cortexm` Cargo feature will
//! alias `mutex::DefaultMutex<T>` to `cortex_m::interrupt::Mutex<core::cell::RefCell<T>>` with a
//! provided `BoardMutex` impl. With neither feature there is no `DefaultMutex`; implement
//! `BoardMutex` for your platform's lock and name it in `into_io` instead.
//!
//! # Logging
//!
//! The driver emits records through the `log` facade: `error` for rejected output bits, `warn`
//! when a bounded output write gives up, `debug` for each notification and `trace` for every
//! failed readback. Install whichever logger suits your platform.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate core;
#[cfg(test)]
#[macro_use]
extern crate proptest;

#[cfg(feature = "cortexm")]
extern crate cortex_m;
extern crate embedded_hal as hal;
extern crate heapless;
#[macro_use]
extern crate log;

pub mod board;
pub mod config;
pub mod error;
pub mod interface;
pub mod mutex;
pub mod notify;
pub mod pin;
pub mod predicate;
pub mod registers;
pub mod watch;

pub use board::io::JointIO;
pub use board::Board;
pub use config::{Configurator, VerifyPolicy};
pub use error::Error;
pub use interface::i2c::I2cInterface;
pub use interface::BoardInterface;
pub use mutex::BoardMutex;
#[cfg(any(feature = "std", feature = "cortexm"))]
pub use mutex::DefaultMutex;
pub use notify::{IoInfo, Notification, PinId, PinKind, Poll, Value};
pub use pin::{AnaloguePin, BoardIO, DigitalPin, OutputLine};
pub use predicate::{Comparison, Operand, Predicate};
pub use watch::InputWatch;
