//! Timing parameters
//!
//! This module holds the four timing parameters the host can read and
//! replace, and the lower bounds a replacement must satisfy.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │     Serial command protocol            │
//! │  (G <key> / S <key> <val> ...)         │
//! └──────────────┬─────────────────────────┘
//!                │ ParamUpdate
//!                ▼
//! ┌────────────────────────────────────────┐
//! │        ParameterStore                  │
//! │  - One live ParameterSet               │
//! │  - Lower-bound validation (Proposal)   │
//! │  - Whole-set replacement only          │
//! └──────────────┬─────────────────────────┘
//!                │ Proposal
//!                ▼
//! ┌────────────────────────────────────────┐
//! │   Reconfigurator (pulse::reconfig)     │
//! └────────────────────────────────────────┘
//! ```
//!
//! # Bounds
//!
//! - `offset >= 2`
//! - `length >= 1`
//! - `spacing >= 6`
//! - `repeats` unbounded here; the codec saturates it to 5 bits

pub mod error;
pub mod set;
pub mod store;

pub use error::BoundViolation;
pub use set::{ParamKey, ParamUpdate, ParameterSet};
pub use store::{ParameterStore, Proposal, MIN_LENGTH, MIN_OFFSET, MIN_SPACING};
