//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod feed;
pub mod sequencer;
pub mod serial;

// Re-export trait interfaces
pub use feed::FeedChannel;
pub use sequencer::{SequencerInstruction, SequencerInterface};
pub use serial::SerialInterface;
