//! Feed channel interface trait
//!
//! A feed channel is a bulk-transfer (DMA) channel that copies one fixed word
//! from memory into the sequencer's input queue, paced by queue occupancy, and
//! raises a completion interrupt when its transfer count is exhausted.

use crate::platform::Result;

/// Feed channel interface trait
///
/// # Safety Invariants
///
/// - `acknowledge` and `restart` are called from interrupt context and must
///   not block
/// - The source word lives in static memory for the life of the process
pub trait FeedChannel {
    /// Latch `source` as the transfer source and start the first transfer
    fn start(&mut self, source: u32) -> Result<()>;

    /// Clear the completion flag
    ///
    /// Returns `true` if the flag was raised, i.e. the transfer count reached
    /// zero since the last acknowledge.
    fn acknowledge(&mut self) -> bool;

    /// Start a new transfer with the same source, destination and count
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Feed(FeedError::Busy)` if the previous transfer
    /// has not completed.
    fn restart(&mut self) -> Result<()>;

    /// Hold or release the channel
    ///
    /// A paused channel writes nothing into the queue even when pacing allows it.
    fn set_paused(&mut self, paused: bool) -> Result<()>;

    /// Overwrite the latched source word
    fn set_source(&mut self, source: u32) -> Result<()>;
}
