//! This module provides shims between `embedded-hal` bus implementations and the JointIO board's
//! command set.

use registers::Opcode;

/// A transport to the JointIO board implements this trait, which provides the three raw transfer
/// shapes the board's commands use. Implementations must not retry internally.
pub trait BoardInterface {
    /// The type of error that transfers may return.
    type Error;
    /// Send the command `op` followed by a single payload byte.
    fn write_byte(&mut self, op: Opcode, value: u8) -> Result<(), Self::Error>;
    /// Send the command `op` and read a single byte of response.
    fn read_byte(&mut self, op: Opcode) -> Result<u8, Self::Error>;
    /// Send the command `op` and fill `buf` with the response.
    fn read_block(&mut self, op: Opcode, buf: &mut [u8]) -> Result<(), Self::Error>;
}

// Public only so the documentation examples can build a board without hardware.
#[doc(hidden)]
pub mod noop {
    use super::BoardInterface;
    use registers::{Command, Opcode};

    /// Accepts every write and reads back whatever was last written to the output register, so
    /// output verification succeeds immediately.
    #[derive(Default)]
    pub struct NoopInterface {
        output: u8,
    }

    impl NoopInterface {
        pub fn new() -> Self {
            NoopInterface { output: 0 }
        }
    }

    impl BoardInterface for NoopInterface {
        type Error = core::convert::Infallible;
        fn write_byte(&mut self, op: Opcode, value: u8) -> Result<(), Self::Error> {
            if op == Opcode::from(Command::Output) {
                self.output = value;
            }
            Ok(())
        }
        fn read_byte(&mut self, op: Opcode) -> Result<u8, Self::Error> {
            if op == Opcode::from(Command::OutputRead) {
                Ok(self.output)
            } else {
                Ok(0u8)
            }
        }
        fn read_block(&mut self, _op: Opcode, buf: &mut [u8]) -> Result<(), Self::Error> {
            for b in buf.iter_mut() {
                *b = 0;
            }
            Ok(())
        }
    }
}

pub mod i2c {
    //! The I2C interface talks to the board as a register-style slave: the opcode is the first
    //! byte of every transaction, and reads use a repeated-start write-then-read.

    use hal;

    use super::{BoardInterface, Opcode};
    use registers::DEFAULT_ADDRESS;

    /// The union of all errors that may occur on the I2C interface.
    #[derive(Debug)]
    pub enum I2cInterfaceError<WE, RE> {
        /// An error occurred during an I2C write.
        WriteError(WE),
        /// An error occurred during an I2C write-read.
        ReadError(RE),
    }

    impl<WE, RE> I2cInterfaceError<WE, RE> {
        fn from_write(e: WE) -> Self {
            I2cInterfaceError::WriteError(e)
        }
        fn from_read(e: RE) -> Self {
            I2cInterfaceError::ReadError(e)
        }
    }

    /// A configured `BoardInterface` for reaching the board over I2C.
    pub struct I2cInterface<I2C> {
        /// The I2C master device the board hangs off.
        i2c: I2C,
        /// The board's 7-bit address.
        address: u8,
    }

    impl<I2C> I2cInterface<I2C>
    where
        I2C: hal::blocking::i2c::Write + hal::blocking::i2c::WriteRead,
    {
        /// Create an interface to the board at its default address.
        pub fn new(i2c: I2C) -> Self {
            Self::with_address(i2c, DEFAULT_ADDRESS)
        }

        /// Create an interface to a board strapped to a different 7-bit address.
        pub fn with_address(i2c: I2C, address: u8) -> Self {
            Self { i2c, address }
        }

        /// Release the I2C master device.
        pub fn release(self) -> I2C {
            self.i2c
        }
    }

    impl<I2C> BoardInterface for I2cInterface<I2C>
    where
        I2C: hal::blocking::i2c::Write + hal::blocking::i2c::WriteRead,
    {
        type Error = I2cInterfaceError<
            <I2C as hal::blocking::i2c::Write>::Error,
            <I2C as hal::blocking::i2c::WriteRead>::Error,
        >;

        fn write_byte(&mut self, op: Opcode, value: u8) -> Result<(), Self::Error> {
            self.i2c
                .write(self.address, &[u8::from(op), value])
                .map_err(Self::Error::from_write)
        }

        fn read_byte(&mut self, op: Opcode) -> Result<u8, Self::Error> {
            let mut buf = [0u8];
            self.read_block(op, &mut buf)?;
            Ok(buf[0])
        }

        fn read_block(&mut self, op: Opcode, buf: &mut [u8]) -> Result<(), Self::Error> {
            self.i2c
                .write_read(self.address, &[u8::from(op)], buf)
                .map_err(Self::Error::from_read)
        }
    }

}

#[cfg(test)]
pub(crate) mod test_spy {
    //! An interface for use in unit tests to spy on whatever was sent to it, and to script what
    //! the board answers.

    use super::BoardInterface;
    use registers::{Command, Opcode, ANALOGUE_BLOCK_LEN};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Copy, Debug, PartialEq)]
    pub enum Transfer {
        Write(u8, u8),
        Read(u8),
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct SpyBusError;

    struct Board {
        identity: u8,
        inputs: u8,
        analogue: [u16; 8],
        output: u8,
        readbacks: VecDeque<u8>,
        log: Vec<Transfer>,
        fail: bool,
        fail_after: Option<usize>,
    }

    impl Board {
        fn transfer(&mut self, t: Transfer) -> Result<(), SpyBusError> {
            match self.fail_after {
                Some(0) => self.fail = true,
                Some(ref mut n) => *n -= 1,
                None => {}
            }
            if self.fail {
                return Err(SpyBusError);
            }
            self.log.push(t);
            Ok(())
        }
    }

    pub struct TestSpyInterface {
        board: Arc<Mutex<Board>>,
    }

    impl TestSpyInterface {
        pub fn new() -> Self {
            Self {
                board: Arc::new(Mutex::new(Board {
                    identity: 0x5A,
                    inputs: 0,
                    analogue: [0; 8],
                    output: 0,
                    readbacks: VecDeque::new(),
                    log: Vec::new(),
                    fail: false,
                    fail_after: None,
                })),
            }
        }

        pub fn split(&self) -> Self {
            Self {
                board: self.board.clone(),
            }
        }

        pub fn set_inputs(&self, bits: u8) {
            self.board.lock().unwrap().inputs = bits;
        }

        pub fn set_analogue(&self, channel: usize, sample: u16) {
            self.board.lock().unwrap().analogue[channel] = sample;
        }

        /// Queue values the output readback returns before it starts reflecting writes.
        pub fn script_readbacks(&self, values: &[u8]) {
            self.board.lock().unwrap().readbacks.extend(values);
        }

        pub fn fail_transfers(&self, fail: bool) {
            self.board.lock().unwrap().fail = fail;
        }

        /// Let `count` more transfers through, then fail every one after.
        pub fn fail_after(&self, count: usize) {
            self.board.lock().unwrap().fail_after = Some(count);
        }

        pub fn output(&self) -> u8 {
            self.board.lock().unwrap().output
        }

        pub fn log(&self) -> Vec<Transfer> {
            self.board.lock().unwrap().log.clone()
        }

        pub fn writes(&self) -> Vec<(u8, u8)> {
            self.log()
                .into_iter()
                .filter_map(|t| match t {
                    Transfer::Write(op, v) => Some((op, v)),
                    Transfer::Read(_) => None,
                })
                .collect()
        }

        pub fn reads(&self) -> Vec<u8> {
            self.log()
                .into_iter()
                .filter_map(|t| match t {
                    Transfer::Read(op) => Some(op),
                    Transfer::Write(..) => None,
                })
                .collect()
        }

        pub fn clear_log(&self) {
            self.board.lock().unwrap().log.clear();
        }
    }

    impl BoardInterface for TestSpyInterface {
        type Error = SpyBusError;

        fn write_byte(&mut self, op: Opcode, value: u8) -> Result<(), Self::Error> {
            let mut board = self.board.lock().unwrap();
            board.transfer(Transfer::Write(op.into(), value))?;
            if op == Opcode::from(Command::Output) {
                board.output = value;
            } else {
                panic!("Write with read-only opcode {:?}", op);
            }
            Ok(())
        }

        fn read_byte(&mut self, op: Opcode) -> Result<u8, Self::Error> {
            let mut board = self.board.lock().unwrap();
            board.transfer(Transfer::Read(op.into()))?;
            Ok(match op {
                o if o == Opcode::from(Command::Identify) => board.identity,
                o if o == Opcode::from(Command::InputDig) => board.inputs,
                o if o == Opcode::from(Command::OutputRead) => {
                    let output = board.output;
                    board.readbacks.pop_front().unwrap_or(output)
                }
                other => panic!("Byte read with opcode {:?}", other),
            })
        }

        fn read_block(&mut self, op: Opcode, buf: &mut [u8]) -> Result<(), Self::Error> {
            let mut board = self.board.lock().unwrap();
            board.transfer(Transfer::Read(op.into()))?;
            assert_eq!(op, Opcode::from(Command::Input));
            assert_eq!(buf.len(), ANALOGUE_BLOCK_LEN);
            for (channel, word) in board.analogue.iter().enumerate() {
                buf[2 * channel] = (word >> 8) as u8;
                buf[2 * channel + 1] = *word as u8;
            }
            Ok(())
        }
    }
}
