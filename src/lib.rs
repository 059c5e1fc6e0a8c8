#![cfg_attr(not(test), no_std)]

//! pulse_trigger - Trigger-synchronised pulse generator for Raspberry Pi Pico 2
//!
//! A host sets the timing of a pulse train over a serial link. After every
//! rising edge on the trigger input the firmware waits `offset` sequencer
//! cycles, then emits `repeats + 1` pulses of `length` cycles high, one every
//! `spacing` cycles. The pulse shape is generated by a PIO state machine; a
//! DMA channel keeps its input queue topped up.
//!
//! # Layout
//!
//! - [`platform`]: hardware traits, RP2350 implementations and mocks
//! - [`parameters`]: the live parameter set and its bounds
//! - [`pulse`]: configuration word codec, reconfiguration, feed engine
//! - [`protocol`]: serial command parser and replies
//! - [`controller`]: the main loop

#[cfg(all(feature = "mock", not(test)))]
extern crate std;

// Logging macros, must come first so later modules can use them
pub mod core;

pub mod config;
pub mod controller;
pub mod parameters;
pub mod platform;
pub mod protocol;
pub mod pulse;

pub use config::FirmwareConfig;
pub use controller::{ControllerStats, FirmwareError, PulseController};
