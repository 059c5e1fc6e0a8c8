//! Mock platform implementation for testing
//!
//! This module provides mock implementations of platform traits that can be used
//! for unit testing without requiring actual hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled
//!
//! # Example
//!
//! ```ignore
//! use pulse_trigger::platform::mock::{MockHardware, MockSerial};
//! use pulse_trigger::platform::traits::{SequencerInterface, SerialInterface};
//!
//! let hardware = MockHardware::new(16);
//! let mut sequencer = hardware.sequencer(0);
//! sequencer.push(0xABCD).unwrap();
//! assert_eq!(hardware.fifo(), vec![0xABCD]);
//!
//! let mut serial = MockSerial::new();
//! serial.inject_rx_data(b"G o");
//! assert_eq!(serial.read_byte(0).unwrap(), Some(b'G'));
//! ```

#![cfg(any(test, feature = "mock"))]

mod feed;
mod hardware;
mod sequencer;
mod serial;

pub use feed::MockFeedChannel;
pub use hardware::{HardwareOp, MockHardware, TX_FIFO_DEPTH};
pub use sequencer::MockSequencer;
pub use serial::{MockSerial, RxEvent};
