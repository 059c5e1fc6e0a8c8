//! RP2350 PIO sequencer implementation
//!
//! Drives one PIO state machine running the pulse microprogram. The state
//! machine's TX and RX FIFOs are joined, giving an 8-word input queue.

use crate::platform::{
    error::SequencerError,
    traits::{SequencerInstruction, SequencerInterface},
    Result,
};
use pio::{Instruction, InstructionOperands, JmpCondition, OutDestination};
use rp235x_hal::pio::{PIOExt, Running, StateMachine, StateMachineIndex, Stopped, Tx};

enum Machine<P: PIOExt, SM: StateMachineIndex> {
    Stopped(StateMachine<(P, SM), Stopped>),
    Running(StateMachine<(P, SM), Running>),
}

/// RP2350 PIO sequencer
///
/// # Example
///
/// ```ignore
/// let (sm, _rx, tx) = PIOBuilder::from_installed_program(installed).build(sm0);
/// let mut sequencer = Rp2350Sequencer::new(sm, tx, program_offset);
/// sequencer.push(word.bits())?;
/// sequencer.set_enabled(true)?;
/// ```
pub struct Rp2350Sequencer<P: PIOExt, SM: StateMachineIndex> {
    // None only while switching run state
    machine: Option<Machine<P, SM>>,
    tx: Tx<(P, SM)>,
    program_offset: u8,
}

impl<P: PIOExt, SM: StateMachineIndex> Rp2350Sequencer<P, SM> {
    /// Wrap a configured, stopped state machine
    ///
    /// `program_offset` is the instruction memory address the microprogram
    /// was installed at.
    pub fn new(sm: StateMachine<(P, SM), Stopped>, tx: Tx<(P, SM)>, program_offset: u8) -> Self {
        Self {
            machine: Some(Machine::Stopped(sm)),
            tx,
            program_offset,
        }
    }

    /// Address of the input queue, for the feed channel
    pub fn fifo_address(&self) -> u32 {
        self.tx.fifo_address() as u32
    }

    fn stopped(&mut self) -> Result<&mut StateMachine<(P, SM), Stopped>> {
        match self.machine.as_mut() {
            Some(Machine::Stopped(sm)) => Ok(sm),
            _ => Err(SequencerError::InvalidState.into()),
        }
    }
}

fn encode(instruction: SequencerInstruction) -> Instruction {
    let operands = match instruction {
        SequencerInstruction::PullNonBlocking => InstructionOperands::PULL {
            if_empty: false,
            block: false,
        },
        SequencerInstruction::OutNull32 => InstructionOperands::OUT {
            destination: OutDestination::NULL,
            bit_count: 32,
        },
        SequencerInstruction::Jump(address) => InstructionOperands::JMP {
            condition: JmpCondition::Always,
            address,
        },
    };
    Instruction {
        operands,
        delay: 0,
        side_set: None,
    }
}

impl<P: PIOExt, SM: StateMachineIndex> SequencerInterface for Rp2350Sequencer<P, SM> {
    fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        let machine = self.machine.take().ok_or(SequencerError::InvalidState)?;
        self.machine = Some(match (machine, enabled) {
            (Machine::Stopped(sm), true) => Machine::Running(sm.start()),
            (Machine::Running(sm), false) => Machine::Stopped(sm.stop()),
            (unchanged, _) => unchanged,
        });
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        matches!(self.machine, Some(Machine::Running(_)))
    }

    fn clear_fifos(&mut self) -> Result<()> {
        self.stopped()?.clear_fifos();
        Ok(())
    }

    fn restart(&mut self) -> Result<()> {
        self.stopped()?.restart();
        Ok(())
    }

    fn exec(&mut self, instruction: SequencerInstruction) -> Result<()> {
        let instruction = encode(instruction);
        match self.machine.as_mut() {
            Some(Machine::Stopped(sm)) => sm.exec_instruction(instruction),
            Some(Machine::Running(sm)) => sm.exec_instruction(instruction),
            None => return Err(SequencerError::InvalidState.into()),
        }
        Ok(())
    }

    fn push(&mut self, word: u32) -> Result<()> {
        if self.tx.write(word) {
            Ok(())
        } else {
            Err(SequencerError::FifoFull.into())
        }
    }

    fn program_offset(&self) -> u8 {
        self.program_offset
    }
}
