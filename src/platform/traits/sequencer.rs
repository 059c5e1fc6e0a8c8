//! Programmable sequencer interface trait
//!
//! The sequencer is a PIO state machine running the pulse microprogram. The
//! firmware treats the microprogram as a black box and only needs the control
//! surface below.

use crate::platform::Result;

/// Instructions the firmware injects into the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum SequencerInstruction {
    /// `pull noblock`: move the next queued word (or X when empty) into the output register
    PullNonBlocking,
    /// `out null, 32`: shift the whole output register out to nowhere
    OutNull32,
    /// `jmp <addr>`: set the program counter
    Jump(u8),
}

/// Sequencer interface trait
///
/// # Safety Invariants
///
/// - The microprogram must be loaded before any method is called
/// - Only the main control loop drives the sequencer; the feed engine only
///   writes to its input queue
pub trait SequencerInterface {
    /// Start or stop instruction execution
    fn set_enabled(&mut self, enabled: bool) -> Result<()>;

    /// Whether the sequencer is currently executing
    fn is_enabled(&self) -> bool;

    /// Discard all words in the input and output queues
    fn clear_fifos(&mut self) -> Result<()>;

    /// Reset internal state (shift counters, delay counters, stall flags)
    fn restart(&mut self) -> Result<()>;

    /// Execute a single instruction immediately
    fn exec(&mut self, instruction: SequencerInstruction) -> Result<()>;

    /// Push one word into the input queue
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Sequencer(SequencerError::FifoFull)` if the queue
    /// has no room. The word is not written in that case.
    fn push(&mut self, word: u32) -> Result<()>;

    /// Instruction-memory address the microprogram was loaded at
    fn program_offset(&self) -> u8;
}
