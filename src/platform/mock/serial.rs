//! Mock serial link implementation for testing

use crate::platform::{
    error::{PlatformError, SerialError},
    traits::SerialInterface,
    Result,
};
use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;

/// One scripted receive-side event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxEvent {
    /// A byte arrives
    Byte(u8),
    /// The host goes quiet; the next read times out
    Gap,
    /// Short silence inside a burst; a read whose timeout is longer waits it
    /// out and sees the next event
    Pause(u32),
    /// The receiver reports a line error
    Fault(SerialError),
}

/// Mock serial link
///
/// The receive side is a script of [`RxEvent`]s. A read pops one event: a
/// byte is returned, a gap (or an empty script) is a timeout. A pause is a
/// timeout only when it is at least as long as the read's timeout.
/// [`SerialInterface::discard_pending`] drops bytes and line errors up to the
/// next gap, or the next pause as long as its quiet period.
///
/// # Example
///
/// ```ignore
/// use pulse_trigger::platform::mock::MockSerial;
/// use pulse_trigger::platform::traits::SerialInterface;
///
/// let mut serial = MockSerial::new();
/// serial.inject_rx_data(b"S o 50");
/// serial.inject_gap();
///
/// assert_eq!(serial.read_byte(0).unwrap(), Some(b'S'));
/// serial.write(b"OK\n").unwrap();
/// assert_eq!(serial.tx_string(), "OK\n");
/// ```
#[derive(Debug, Default)]
pub struct MockSerial {
    rx: VecDeque<RxEvent>,
    tx_buffer: Vec<u8>,
    read_timeouts: Vec<u32>,
    elapsed_ms: u64,
}

impl MockSerial {
    /// Create a new mock serial link with an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a burst of bytes
    pub fn inject_rx_data(&mut self, data: &[u8]) {
        self.rx.extend(data.iter().map(|&b| RxEvent::Byte(b)));
    }

    /// Queue a quiet period
    pub fn inject_gap(&mut self) {
        self.rx.push_back(RxEvent::Gap);
    }

    /// Queue a silence of `ms` milliseconds inside a burst
    pub fn inject_pause(&mut self, ms: u32) {
        self.rx.push_back(RxEvent::Pause(ms));
    }

    /// Queue a line error
    pub fn inject_fault(&mut self, error: SerialError) {
        self.rx.push_back(RxEvent::Fault(error));
    }

    /// Number of scripted events not yet consumed
    pub fn pending_events(&self) -> usize {
        self.rx.len()
    }

    /// Get transmitted data (for test verification)
    pub fn tx_buffer(&self) -> Vec<u8> {
        self.tx_buffer.clone()
    }

    /// Transmitted data as text
    pub fn tx_string(&self) -> String {
        String::from_utf8_lossy(&self.tx_buffer).into_owned()
    }

    /// Clear transmit buffer
    pub fn clear_tx_buffer(&mut self) {
        self.tx_buffer.clear();
    }

    /// Timeout argument of every read, in call order
    pub fn read_timeouts(&self) -> &[u32] {
        &self.read_timeouts
    }

    /// Simulated time spent waiting in reads that timed out
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}

impl SerialInterface for MockSerial {
    fn read_byte(&mut self, timeout_ms: u32) -> Result<Option<u8>> {
        self.read_timeouts.push(timeout_ms);
        loop {
            match self.rx.pop_front() {
                Some(RxEvent::Byte(b)) => return Ok(Some(b)),
                Some(RxEvent::Fault(e)) => return Err(PlatformError::Serial(e)),
                Some(RxEvent::Pause(ms)) if ms < timeout_ms => {
                    self.elapsed_ms += u64::from(ms);
                }
                Some(RxEvent::Pause(_)) | Some(RxEvent::Gap) | None => {
                    self.elapsed_ms += u64::from(timeout_ms);
                    return Ok(None);
                }
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.tx_buffer.extend_from_slice(data);
        Ok(data.len())
    }

    fn discard_pending(&mut self, quiet_ms: u32) -> Result<usize> {
        let mut discarded = 0;
        loop {
            match self.rx.front() {
                Some(RxEvent::Byte(_)) | Some(RxEvent::Fault(_)) => discarded += 1,
                Some(RxEvent::Pause(ms)) if *ms < quiet_ms => {
                    self.elapsed_ms += u64::from(*ms);
                }
                Some(RxEvent::Pause(_)) => {
                    self.rx.pop_front();
                    self.elapsed_ms += u64::from(quiet_ms);
                    return Ok(discarded);
                }
                Some(RxEvent::Gap) | None => {
                    self.elapsed_ms += u64::from(quiet_ms);
                    return Ok(discarded);
                }
            }
            self.rx.pop_front();
        }
    }

    fn flush(&mut self) -> Result<()> {
        // Mock implementation - nothing to flush
        Ok(())
    }
}
