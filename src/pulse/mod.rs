//! Pulse sequencer control
//!
//! - [`codec`]: packs `repeats`, `length` and `spacing` into the 32-bit word
//!   the sequencer microprogram unpacks
//! - [`reconfig`]: reprograms a running sequencer with a new parameter set
//! - [`feed`]: keeps the sequencer's input queue topped up with the offset
//!   word from interrupt context

pub mod codec;
pub mod feed;
pub mod reconfig;

pub use codec::{encode, EncodedWord};
pub use feed::{FeedCell, FeedControl, FeedEngine, FeedSourcePolicy, SharedFeed};
pub use reconfig::{ReconfigSettings, Reconfigurator};
