//! Platform abstraction layer
//!
//! This module provides hardware abstraction for the pulse generator. All
//! target-specific code is isolated here: the rest of the crate only sees the
//! traits in [`traits`].

pub mod error;
pub mod traits;

// Platform implementations (feature-gated)
#[cfg(feature = "pico2_w")]
pub mod rp2350;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{PlatformError, Result};
pub use traits::{FeedChannel, SequencerInstruction, SequencerInterface, SerialInterface};
