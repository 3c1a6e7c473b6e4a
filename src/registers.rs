//! The command opcodes understood by the JointIO board, and the limits of its pin space.

/// The fixed 7-bit bus address the board answers on.
pub const DEFAULT_ADDRESS: u8 = 0x24;

/// Number of digital (and, separately, analogue) input channels.
pub const INPUT_COUNT: u8 = 8;

/// Number of digital output lines.
pub const OUTPUT_COUNT: u8 = 4;

/// Length in bytes of the analogue input block: one big-endian word per channel.
pub const ANALOGUE_BLOCK_LEN: usize = 2 * INPUT_COUNT as usize;

/// Largest raw sample the 10-bit ADC produces.
pub const ADC_FULL_SCALE: u16 = 1023;

/// Voltage corresponding to `ADC_FULL_SCALE`.
pub const REFERENCE_VOLTS: f64 = 3.3;

/// A command opcode for the board. These are created by conversion from `Command`. It is a
/// newtype around `u8` so that arbitrary opcodes cannot be forged and sent through a
/// `BoardInterface`.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Opcode(pub(crate) u8);

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> u8 {
        op.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Read the board's identity.
    Identify,

    /// Set the digital outputs. Takes one byte, the output bitmask, with bit `n` driving output
    /// `n`.
    Output,

    /// Read all eight analogue inputs as a block of big-endian 16-bit words.
    Input,

    /// Read back the digital output bitmask the board has actually committed.
    OutputRead,

    /// Read the digital inputs as one bitmask byte, bit `n` for input `n`.
    InputDig,
}

impl From<Command> for Opcode {
    fn from(cmd: Command) -> Opcode {
        use self::Command::*;
        match cmd {
            Identify => Opcode(0),
            Output => Opcode(1),
            Input => Opcode(2),
            OutputRead => Opcode(3),
            InputDig => Opcode(4),
        }
    }
}

pub(crate) fn valid_input(index: u8) -> Option<u8> {
    if index < INPUT_COUNT {
        Some(index)
    } else {
        None
    }
}

pub(crate) fn valid_output(bit: u8) -> Option<u8> {
    if bit < OUTPUT_COUNT {
        Some(bit)
    } else {
        None
    }
}

/// Limit a raw ADC word to the converter's range.
pub fn clamp_sample(sample: u16) -> u16 {
    if sample > ADC_FULL_SCALE {
        ADC_FULL_SCALE
    } else {
        sample
    }
}

/// Convert a raw ADC word into volts. Words above full scale are clamped.
pub fn sample_to_volts(sample: u16) -> f64 {
    f64::from(clamp_sample(sample)) / f64::from(ADC_FULL_SCALE) * REFERENCE_VOLTS
}
