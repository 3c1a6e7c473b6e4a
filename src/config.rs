//! Driver-side configuration of the board: output verification policy and staged output states.

use board::Board;
use error::Error;
use interface::BoardInterface;
use registers::valid_output;

/// How long `set_output` keeps rewriting the output register while the readback disagrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VerifyPolicy {
    /// Keep writing until the board confirms. There is no timeout; a board that never confirms
    /// blocks the caller forever.
    Forever,
    /// Give up with `Error::VerifyFailed` after this many mismatching readbacks. Zero behaves
    /// like one.
    Attempts(u32),
}

impl Default for VerifyPolicy {
    fn default() -> Self {
        VerifyPolicy::Forever
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct BoardConfig {
    pub(crate) verify: VerifyPolicy,
}

/// A `Configurator` collects configuration changes and staged output states and applies them in
/// one go. You obtain one from `Board::configure()`, chain method calls on it, and end the chain
/// with `commit()`.
///
/// ```
/// # use jointio::interface::noop::NoopInterface;
/// # use jointio::{Board, VerifyPolicy};
/// let mut board = Board::new(NoopInterface::new());
/// board
///     .configure()
///     .verify(VerifyPolicy::Attempts(10))
///     .output(0, true)
///     .output(3, true)
///     .commit()
///     .unwrap();
/// assert_eq!(board.output_mask(), 0b1001);
/// ```
#[must_use = "Configuration changes are not applied unless committed"]
pub struct Configurator<'b, BI: BoardInterface> {
    board: &'b mut Board<BI>,
    verify: Option<VerifyPolicy>,
    set: u8,
    clear: u8,
    invalid: Option<u8>,
}

impl<'b, BI: BoardInterface> Configurator<'b, BI> {
    pub(crate) fn new(board: &'b mut Board<BI>) -> Self {
        Self {
            board,
            verify: None,
            set: 0,
            clear: 0,
            invalid: None,
        }
    }

    /// Choose how output writes are verified from now on.
    pub fn verify(mut self, policy: VerifyPolicy) -> Self {
        self.verify = Some(policy);
        self
    }

    /// Stage the state of output `bit` (in the range `0..4`). Staged outputs are written together
    /// with a single verified write on `commit`. A later call for the same bit wins.
    pub fn output(mut self, bit: u8, high: bool) -> Self {
        match valid_output(bit) {
            Some(bit) if high => {
                self.set |= 1 << bit;
                self.clear &= !(1 << bit);
            }
            Some(bit) => {
                self.clear |= 1 << bit;
                self.set &= !(1 << bit);
            }
            None => self.invalid = Some(bit),
        }
        self
    }

    /// Apply the changes. An invalid staged output aborts the commit before any bus traffic. The
    /// verify policy is applied before the staged outputs are written, so it already governs that
    /// write.
    pub fn commit(self) -> Result<(), Error<BI::Error>> {
        if let Some(bit) = self.invalid {
            error!("Configured output {} does not exist", bit);
            return Err(Error::InvalidOutput(bit));
        }
        if let Some(policy) = self.verify {
            self.board.config.verify = policy;
        }
        if self.set | self.clear != 0 {
            let mask = (self.board.output_mask() | self.set) & !self.clear;
            self.board.write_output_mask(mask)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interface::test_spy::TestSpyInterface;

    #[test]
    fn verify_policy_default() {
        assert_eq!(VerifyPolicy::default(), VerifyPolicy::Forever);
    }

    #[test]
    fn configure_noop_is_silent() {
        let ei = TestSpyInterface::new();
        let mut board = Board::new(ei.split());
        assert!(board.configure().commit().is_ok());
        assert!(ei.log().is_empty());
    }

    #[test]
    fn configure_outputs_single_write() {
        let ei = TestSpyInterface::new();
        let mut board = Board::new(ei.split());
        assert!(board
            .configure()
            .output(1, true)
            .output(2, true)
            .output(1, false)
            .commit()
            .is_ok());
        assert_eq!(ei.writes(), vec![(1, 0b0100)]);
        assert_eq!(board.output_mask(), 0b0100);
    }

    #[test]
    fn configure_invalid_output_aborts() {
        let ei = TestSpyInterface::new();
        let mut board = Board::new(ei.split());
        assert_eq!(
            board
                .configure()
                .verify(VerifyPolicy::Attempts(1))
                .output(0, true)
                .output(6, true)
                .commit(),
            Err(Error::InvalidOutput(6))
        );
        assert!(ei.log().is_empty());
        assert_eq!(board.config.verify, VerifyPolicy::Forever);
    }

    #[test]
    fn configure_verify_applies_to_staged_write() {
        let ei = TestSpyInterface::new();
        ei.script_readbacks(&[0, 0, 0]);
        let mut board = Board::new(ei.split());
        assert_eq!(
            board
                .configure()
                .verify(VerifyPolicy::Attempts(2))
                .output(0, true)
                .commit(),
            Err(Error::VerifyFailed { wanted: 1, read: 0 })
        );
    }
}
