//! RP2350 platform implementation for Raspberry Pi Pico 2
//!
//! This module provides concrete implementations of the platform abstraction
//! traits for the RP2350 microcontroller using the `rp235x-hal` crate.
//!
//! # Feature Gate
//!
//! This module is only available when the `pico2_w` feature is enabled:
//!
//! ```toml
//! [dependencies]
//! pulse_trigger = { version = "0.1", features = ["pico2_w"] }
//! ```
//!
//! # Peripheral map
//!
//! | Trait               | Peripheral                          |
//! |---------------------|-------------------------------------|
//! | `SerialInterface`   | UART + TIMER0 (read timeouts)       |
//! | `SequencerInterface`| PIO state machine, joined FIFOs     |
//! | `FeedChannel`       | DMA channel, completion on DMA_IRQ_1|

mod feed;
mod sequencer;
mod serial;

pub use feed::{Rp2350FeedChannel, DREQ_PIO0_TX0};
pub use sequencer::Rp2350Sequencer;
pub use serial::Rp2350Serial;
