//! Serial link interface trait
//!
//! This module defines the byte-oriented serial interface the command protocol
//! reads from and replies on.

use crate::platform::Result;

/// Serial link interface trait
///
/// Platform implementations must provide this interface for the host link.
///
/// # Safety Invariants
///
/// - The link must be initialized (baud rate, framing) before use
/// - Only the main control loop owns the link
pub trait SerialInterface {
    /// Read one byte, waiting at most `timeout_ms` milliseconds
    ///
    /// A timeout of `0` is a non-blocking poll. Returns `Ok(None)` when no byte
    /// arrived within the timeout.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Serial` when the receiver flags a line error
    /// (framing, parity, break, overrun). The affected byte is dropped.
    fn read_byte(&mut self, timeout_ms: u32) -> Result<Option<u8>>;

    /// Write data to the link
    ///
    /// Returns the number of bytes written.
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Discard received input until the line stays quiet for `quiet_ms`
    ///
    /// Bytes still in flight when the call starts are discarded too, as are
    /// line errors. Returns the number of bytes (and line errors) discarded.
    fn discard_pending(&mut self, quiet_ms: u32) -> Result<usize>;

    /// Block until all written data has left the transmitter
    fn flush(&mut self) -> Result<()>;
}
