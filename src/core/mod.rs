//! Core infrastructure
//!
//! Target-independent support code shared by every other module.

pub mod logging;
