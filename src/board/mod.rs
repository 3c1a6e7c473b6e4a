//! The board device API. This provides the `Board` type, which is a direct abstraction of the
//! JointIO board's command set, plus the two pieces of state the driver keeps on the board's
//! behalf: the commanded output mask and the last observed value of every input pin.

use config::{BoardConfig, Configurator, VerifyPolicy};
use error::Error;
use interface::BoardInterface;
use mutex::BoardMutex;
use notify::{PinId, PinKind};
use registers::{
    clamp_sample, valid_input, valid_output, Command, ANALOGUE_BLOCK_LEN, INPUT_COUNT,
};

use self::io::JointIO;

pub mod io;

/// Last observed raw sample of each physical input. Shared by every handle on the same pin, so
/// edge detection is per pin rather than per observer.
#[derive(Clone, Debug, Default)]
pub(crate) struct PinHistory {
    digital: [Option<u16>; INPUT_COUNT as usize],
    analogue: [Option<u16>; INPUT_COUNT as usize],
}

impl PinHistory {
    fn slot(&mut self, pin: PinId) -> &mut Option<u16> {
        match pin.kind {
            PinKind::Digital => &mut self.digital[pin.index as usize],
            PinKind::Analogue => &mut self.analogue[pin.index as usize],
        }
    }
}

/// The expansion board itself.
pub struct Board<BI: BoardInterface> {
    iface: BI,
    pub(crate) config: BoardConfig,
    output: u8,
    history: PinHistory,
}

impl<BI: BoardInterface> Board<BI> {
    /// Create a new `Board`.
    ///
    /// Takes ownership of the `BoardInterface` which it should use to communicate with the board.
    /// The driver assumes all outputs start low; use [`Board::configure`] to drive a known state.
    pub fn new(iface: BI) -> Self {
        Self {
            iface,
            config: BoardConfig::default(),
            output: 0,
            history: PinHistory::default(),
        }
    }

    /// Begin (re)configuring the driver by returning a [`Configurator`].
    pub fn configure<'b>(&'b mut self) -> Configurator<'b, BI> {
        Configurator::new(self)
    }

    /// Convert this board into an I/O adapter that hands out pin handles.
    ///
    /// See [`JointIO`] for detail.
    pub fn into_io<M: BoardMutex<Self>>(self) -> JointIO<M, BI> {
        JointIO::new(self)
    }

    /// Read the board's identity byte.
    pub fn identify(&mut self) -> Result<u8, Error<BI::Error>> {
        self.iface
            .read_byte(Command::Identify.into())
            .map_err(Error::bus)
    }

    /// Send the full output bitmask to the board. No verification is done.
    pub fn write_digital_output(&mut self, mask: u8) -> Result<(), Error<BI::Error>> {
        self.iface
            .write_byte(Command::Output.into(), mask)
            .map_err(Error::bus)
    }

    /// Read back the output bitmask the board has committed.
    pub fn read_digital_output_readback(&mut self) -> Result<u8, Error<BI::Error>> {
        self.iface
            .read_byte(Command::OutputRead.into())
            .map_err(Error::bus)
    }

    /// Read the digital inputs as a bitmask, bit `n` for input `n`.
    pub fn read_digital_input(&mut self) -> Result<u8, Error<BI::Error>> {
        self.iface
            .read_byte(Command::InputDig.into())
            .map_err(Error::bus)
    }

    /// Read the raw 16-bit words of all eight analogue channels in one transfer.
    pub fn read_analogue_block(&mut self) -> Result<[u16; 8], Error<BI::Error>> {
        let mut buf = [0u8; ANALOGUE_BLOCK_LEN];
        self.iface
            .read_block(Command::Input.into(), &mut buf)
            .map_err(Error::bus)?;
        let mut words = [0u16; 8];
        for (word, pair) in words.iter_mut().zip(buf.chunks(2)) {
            *word = u16::from(pair[0]) << 8 | u16::from(pair[1]);
        }
        Ok(words)
    }

    /// Read digital input `index`, returning 0 or 1.
    pub fn read_digital(&mut self, index: u8) -> Result<u8, Error<BI::Error>> {
        let index = valid_input(index).ok_or(Error::InvalidPin(index))?;
        Ok((self.read_digital_input()? >> index) & 0x01)
    }

    /// Read the raw sample of analogue input `index`.
    pub fn read_analogue(&mut self, index: u8) -> Result<u16, Error<BI::Error>> {
        let index = valid_input(index).ok_or(Error::InvalidPin(index))?;
        Ok(self.read_analogue_block()?[index as usize])
    }

    /// The output mask most recently commanded through this driver.
    pub fn output_mask(&self) -> u8 {
        self.output
    }

    /// Drive output `bit` (in the range `0..4`) high or low, then rewrite the output register
    /// until the board's readback agrees, as governed by the configured [`VerifyPolicy`].
    ///
    /// An out-of-range `bit` is logged and rejected with `Error::InvalidOutput` without touching
    /// the bus or the commanded mask.
    pub fn set_output(&mut self, bit: u8, high: bool) -> Result<(), Error<BI::Error>> {
        let mask = self.merge_output(bit, high)?;
        self.write_output_mask(mask)
    }

    /// Like [`Board::set_output`], but ignores the configured policy and instead asks
    /// `keep_going` before every retry. It receives the number of failed verifications so far;
    /// returning `false` abandons the write with `Error::Cancelled`.
    pub fn set_output_until<F>(
        &mut self,
        bit: u8,
        high: bool,
        keep_going: F,
    ) -> Result<(), Error<BI::Error>>
    where
        F: FnMut(u32) -> bool,
    {
        let mask = self.merge_output(bit, high)?;
        self.output = mask;
        match self.write_verified(mask, keep_going)? {
            Ok(()) => Ok(()),
            Err(_) => Err(Error::Cancelled),
        }
    }

    fn merge_output(&self, bit: u8, high: bool) -> Result<u8, Error<BI::Error>> {
        match valid_output(bit) {
            Some(bit) if high => Ok(self.output | 1 << bit),
            Some(bit) => Ok(self.output & !(1 << bit)),
            None => {
                error!("Trying to set invalid output {}", bit);
                Err(Error::InvalidOutput(bit))
            }
        }
    }

    pub(crate) fn write_output_mask(&mut self, mask: u8) -> Result<(), Error<BI::Error>> {
        self.output = mask;
        match self.config.verify {
            VerifyPolicy::Forever => self.write_verified(mask, |_| true).map(|_| ()),
            VerifyPolicy::Attempts(limit) => match self.write_verified(mask, |n| n < limit)? {
                Ok(()) => Ok(()),
                Err(read) => {
                    warn!(
                        "Board did not confirm outputs {:#06b} after {} attempts (read {:#06b})",
                        mask, limit, read
                    );
                    Err(Error::VerifyFailed { wanted: mask, read })
                }
            },
        }
    }

    /// Write `mask` and read it back until they agree. The inner `Err` carries the last readback
    /// when `keep_going` gave up.
    fn write_verified<F>(
        &mut self,
        mask: u8,
        mut keep_going: F,
    ) -> Result<Result<(), u8>, Error<BI::Error>>
    where
        F: FnMut(u32) -> bool,
    {
        let mut failures = 0u32;
        loop {
            self.write_digital_output(mask)?;
            let read = self.read_digital_output_readback()?;
            if read == mask {
                return Ok(Ok(()));
            }
            failures = failures.saturating_add(1);
            trace!(
                "Output readback {:#06b} != {:#06b} (failure {})",
                read, mask, failures
            );
            if !keep_going(failures) {
                return Ok(Err(read));
            }
        }
    }

    /// A live read of `pin` as a raw sample: 0 or 1 for digital pins, the ADC word for analogue.
    pub(crate) fn sample(&mut self, pin: PinId) -> Result<u16, Error<BI::Error>> {
        match pin.kind {
            PinKind::Digital => self.read_digital(pin.index).map(u16::from),
            PinKind::Analogue => self.read_analogue(pin.index),
        }
    }

    fn history_sample(&mut self, pin: PinId) -> Result<u16, Error<BI::Error>> {
        match pin.kind {
            PinKind::Digital => self.sample(pin),
            PinKind::Analogue => self.sample(pin).map(clamp_sample),
        }
    }

    /// Read `pin` and compare against its history. Returns the new sample if it differs from the
    /// last one observed, recording it. Analogue words are clamped to full scale first, so
    /// readings that convert to the same voltage never count as a change.
    pub(crate) fn sample_edge(&mut self, pin: PinId) -> Result<Option<u16>, Error<BI::Error>> {
        let sample = self.history_sample(pin)?;
        let slot = self.history.slot(pin);
        match *slot {
            Some(last) if last == sample => Ok(None),
            Some(_) => {
                *slot = Some(sample);
                Ok(Some(sample))
            }
            None => {
                *slot = Some(sample);
                Ok(None)
            }
        }
    }

    /// Establish history for `pin` with an eager read, unless another handle already has.
    pub(crate) fn seed(&mut self, pin: PinId) -> Result<(), Error<BI::Error>> {
        let sample = self.history_sample(pin)?;
        let slot = self.history.slot(pin);
        if slot.is_none() {
            *slot = Some(sample);
        }
        Ok(())
    }
}
