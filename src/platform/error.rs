//! Platform error types
//!
//! This module defines error types for platform operations. Sequencer and feed
//! channel errors are fatal to the control loop: the firmware has no way to
//! recover from hardware it can no longer program. Serial line errors are
//! turned into protocol errors by the command parser.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All platform implementations map their HAL-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum PlatformError {
    /// Serial link operation failed
    Serial(SerialError),
    /// Sequencer (PIO state machine) operation failed
    Sequencer(SequencerError),
    /// Feed channel (DMA) operation failed
    Feed(FeedError),
    /// Platform initialization failed
    InitializationFailed,
    /// Resource not available
    ResourceUnavailable,
}

/// Serial line errors reported by the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum SerialError {
    /// Framing error
    FramingError,
    /// Parity error
    ParityError,
    /// Line held low for longer than a frame
    Break,
    /// Receive FIFO overflowed
    Overrun,
}

/// Sequencer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum SequencerError {
    /// Input queue is full, the word was not accepted
    FifoFull,
    /// Operation issued while the state machine was in the wrong run state
    InvalidState,
    /// Program could not be loaded into instruction memory
    ProgramLoadFailed,
}

/// Feed channel errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum FeedError {
    /// Channel was re-armed while a transfer was still in flight
    Busy,
    /// Channel was used before being armed
    NotArmed,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Serial(e) => write!(f, "Serial error: {:?}", e),
            PlatformError::Sequencer(e) => write!(f, "Sequencer error: {:?}", e),
            PlatformError::Feed(e) => write!(f, "Feed channel error: {:?}", e),
            PlatformError::InitializationFailed => write!(f, "Platform initialization failed"),
            PlatformError::ResourceUnavailable => write!(f, "Resource not available"),
        }
    }
}

impl From<SerialError> for PlatformError {
    fn from(e: SerialError) -> Self {
        PlatformError::Serial(e)
    }
}

impl From<SequencerError> for PlatformError {
    fn from(e: SequencerError) -> Self {
        PlatformError::Sequencer(e)
    }
}

impl From<FeedError> for PlatformError {
    fn from(e: FeedError) -> Self {
        PlatformError::Feed(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_wraps_peripheral_error() {
        let err = PlatformError::from(SequencerError::FifoFull);
        assert_eq!(err.to_string(), "Sequencer error: FifoFull");
    }

    #[test]
    fn test_from_feed_error() {
        assert_eq!(
            PlatformError::from(FeedError::NotArmed),
            PlatformError::Feed(FeedError::NotArmed)
        );
    }
}
