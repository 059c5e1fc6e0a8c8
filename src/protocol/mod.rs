//! Serial command protocol
//!
//! Two commands over a byte-oriented link:
//!
//! - `G <key>` reads one parameter and answers with its decimal value
//! - `S <key> <value> [<key> <value> ...]` assigns one or more parameters
//!
//! Keys are `o` (offset), `l` (length), `s` (spacing) and `r` (repeats).
//! Tokens are separated by one space. There is no line terminator: a `SET`
//! ends when the link goes quiet.
//!
//! - [`parser`]: byte-level state machine with per-position timeouts
//! - [`reply`]: reply lines
//! - [`client`]: host-side request builder (nanosecond units)

pub mod client;
pub mod command;
pub mod error;
pub mod parser;
pub mod reply;

pub use command::{Command, CommandKind};
pub use error::ProtocolError;
pub use parser::{CommandParser, ParseOutcome, ReadTimeouts, MAX_DIGITS};
pub use reply::{Reply, REPLY_CAPACITY};
