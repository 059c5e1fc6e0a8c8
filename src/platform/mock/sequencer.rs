//! Mock sequencer implementation for testing

use super::hardware::{HardwareOp, MockHardware, TX_FIFO_DEPTH};
use crate::platform::{
    error::{PlatformError, SequencerError},
    traits::{SequencerInstruction, SequencerInterface},
    Result,
};

/// Mock sequencer
///
/// Models the input queue, run state and program counter of one PIO state
/// machine, and records every operation for ordering assertions.
#[derive(Debug)]
pub struct MockSequencer {
    hardware: MockHardware,
    program_offset: u8,
}

impl MockSequencer {
    pub(super) fn new(hardware: MockHardware, program_offset: u8) -> Self {
        Self {
            hardware,
            program_offset,
        }
    }

    fn access<R>(
        &mut self,
        op: HardwareOp,
        f: impl FnOnce(&mut super::hardware::HardwareState) -> Result<R>,
    ) -> Result<R> {
        self.hardware.run_interrupt_hook();
        let mut state = self.hardware.state().borrow_mut();
        if state.offline {
            return Err(PlatformError::ResourceUnavailable);
        }
        state.preempt();
        let result = f(&mut *state)?;
        state.ops.push(op);
        Ok(result)
    }
}

impl SequencerInterface for MockSequencer {
    fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.access(HardwareOp::Enable(enabled), |s| {
            s.enabled = enabled;
            Ok(())
        })
    }

    fn is_enabled(&self) -> bool {
        self.hardware.is_enabled()
    }

    fn clear_fifos(&mut self) -> Result<()> {
        self.access(HardwareOp::ClearFifos, |s| {
            s.fifo.clear();
            Ok(())
        })
    }

    fn restart(&mut self) -> Result<()> {
        self.access(HardwareOp::Restart, |s| {
            s.pc = None;
            Ok(())
        })
    }

    fn exec(&mut self, instruction: SequencerInstruction) -> Result<()> {
        self.access(HardwareOp::Exec(instruction), |s| {
            match instruction {
                SequencerInstruction::PullNonBlocking => {
                    let word = s.fifo.pop_front().unwrap_or(0);
                    s.osr = Some(word);
                }
                SequencerInstruction::OutNull32 => s.osr = None,
                SequencerInstruction::Jump(addr) => s.pc = Some(addr),
            }
            Ok(())
        })
    }

    fn push(&mut self, word: u32) -> Result<()> {
        self.access(HardwareOp::Push(word), |s| {
            if s.fifo.len() >= TX_FIFO_DEPTH {
                return Err(SequencerError::FifoFull.into());
            }
            s.fifo.push_back(word);
            Ok(())
        })
    }

    fn program_offset(&self) -> u8 {
        self.program_offset
    }
}
