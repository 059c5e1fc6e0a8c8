//! Character-level command parser
//!
//! Reads one command per call from the serial link. Each read carries its own
//! timeout:
//!
//! | Position                  | Timeout            | On timeout          |
//! |---------------------------|--------------------|---------------------|
//! | command letter            | none (poll)        | no command pending  |
//! | separator / key           | ~100 ms            | error               |
//! | next key in a `SET` list  | ~100 ms            | end of command      |
//! | digits                    | ~900 ms            | end of command      |
//!
//! On any syntax error (or serial line error) the rest of the burst is
//! discarded until the link has been quiet for one separator timeout, so the
//! next command starts on a clean boundary and a malformed command gets
//! exactly one reply.
//!
//! # State machine
//!
//! ```text
//! AwaitCommandChar ─G/S─▶ AwaitSeparator ─' '─▶ AwaitKey
//!   AwaitKey ─key (G)──▶ Respond
//!   AwaitKey ─key (S)──▶ AwaitValueSeparator ─' '─▶ AccumulateDigits
//!   AccumulateDigits ─' '─────▶ AwaitKey
//!   AccumulateDigits ─timeout─▶ Commit
//!   AwaitKey (S, ≥1 assignment) ─timeout─▶ Commit
//! ```

use super::command::{Command, CommandKind};
use super::error::ProtocolError;
use crate::parameters::{ParamKey, ParamUpdate};
use crate::platform::{error::PlatformError, traits::SerialInterface, Result};
use heapless::Vec;

/// Longest accepted value, in digits
pub const MAX_DIGITS: usize = 12;

const SEPARATOR: u8 = b' ';

/// Per-position read timeouts, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTimeouts {
    /// Command letter (0 = non-blocking poll)
    pub first_byte_ms: u32,
    /// Separators and keys
    pub separator_ms: u32,
    /// Value digits
    pub digit_ms: u32,
}

impl ReadTimeouts {
    pub const DEFAULT: Self = Self {
        first_byte_ms: 0,
        separator_ms: 100,
        digit_ms: 900,
    };
}

impl Default for ReadTimeouts {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Result of one [`CommandParser::poll`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// No command pending
    Idle,
    /// A complete command
    Command(Command),
    /// A malformed command; input has been resynchronised
    Rejected(ProtocolError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    AwaitCommandChar,
    AwaitSeparator(CommandKind),
    AwaitKey(CommandKind),
    AwaitValueSeparator(ParamKey),
    AccumulateDigits(ParamKey),
}

enum Transition {
    Next(ParseState),
    Idle,
    Done(Command),
}

/// Serial command parser
#[derive(Debug)]
pub struct CommandParser {
    timeouts: ReadTimeouts,
    digits: Vec<u8, MAX_DIGITS>,
    update: ParamUpdate,
}

impl CommandParser {
    pub fn new(timeouts: ReadTimeouts) -> Self {
        Self {
            timeouts,
            digits: Vec::new(),
            update: ParamUpdate::new(),
        }
    }

    /// Read at most one command
    ///
    /// # Errors
    ///
    /// Syntax errors and serial line errors come back as
    /// `Ok(ParseOutcome::Rejected(_))`. Any other platform error is returned.
    pub fn poll<S: SerialInterface>(&mut self, serial: &mut S) -> Result<ParseOutcome> {
        self.digits.clear();
        self.update = ParamUpdate::new();

        let mut state = ParseState::AwaitCommandChar;
        loop {
            let byte = match serial.read_byte(self.timeout_for(state)) {
                Ok(byte) => byte,
                Err(PlatformError::Serial(e)) => {
                    return self.resync(serial, ProtocolError::LineError(e));
                }
                Err(e) => return Err(e),
            };
            match self.step(state, byte) {
                Ok(Transition::Next(next)) => state = next,
                Ok(Transition::Idle) => return Ok(ParseOutcome::Idle),
                Ok(Transition::Done(command)) => return Ok(ParseOutcome::Command(command)),
                Err(err) => return self.resync(serial, err),
            }
        }
    }

    fn resync<S: SerialInterface>(
        &self,
        serial: &mut S,
        err: ProtocolError,
    ) -> Result<ParseOutcome> {
        let discarded = serial.discard_pending(self.timeouts.separator_ms)?;
        crate::log_debug!("Resync after {}: {} bytes discarded", err, discarded);
        Ok(ParseOutcome::Rejected(err))
    }

    fn timeout_for(&self, state: ParseState) -> u32 {
        match state {
            ParseState::AwaitCommandChar => self.timeouts.first_byte_ms,
            ParseState::AwaitSeparator(_)
            | ParseState::AwaitKey(_)
            | ParseState::AwaitValueSeparator(_) => self.timeouts.separator_ms,
            ParseState::AccumulateDigits(_) => self.timeouts.digit_ms,
        }
    }

    fn step(
        &mut self,
        state: ParseState,
        byte: Option<u8>,
    ) -> core::result::Result<Transition, ProtocolError> {
        match state {
            ParseState::AwaitCommandChar => match byte {
                None | Some(b'\r') | Some(b'\n') => Ok(Transition::Idle),
                Some(b) => {
                    let kind = CommandKind::try_from(b).map_err(ProtocolError::UnknownCommand)?;
                    Ok(Transition::Next(ParseState::AwaitSeparator(kind)))
                }
            },

            ParseState::AwaitSeparator(kind) => {
                expect_separator(byte)?;
                Ok(Transition::Next(ParseState::AwaitKey(kind)))
            }

            ParseState::AwaitKey(kind) => {
                let Some(b) = byte else {
                    // Quiet link after at least one assignment ends a SET
                    if kind == CommandKind::Set && !self.update.is_empty() {
                        return Ok(Transition::Done(Command::Set(self.update)));
                    }
                    return Err(ProtocolError::Timeout);
                };
                let key = ParamKey::try_from(b).map_err(ProtocolError::UnknownKey)?;
                match kind {
                    CommandKind::Get => Ok(Transition::Done(Command::Get(key))),
                    CommandKind::Set => {
                        if self.update.get(key).is_some() {
                            return Err(ProtocolError::DuplicateKey(key));
                        }
                        Ok(Transition::Next(ParseState::AwaitValueSeparator(key)))
                    }
                }
            }

            ParseState::AwaitValueSeparator(key) => {
                expect_separator(byte)?;
                Ok(Transition::Next(ParseState::AccumulateDigits(key)))
            }

            ParseState::AccumulateDigits(key) => match byte {
                Some(b @ b'0'..=b'9') => {
                    self.digits
                        .push(b)
                        .map_err(|_| ProtocolError::TooManyDigits)?;
                    Ok(Transition::Next(state))
                }
                Some(SEPARATOR) => {
                    self.finish_value(key)?;
                    Ok(Transition::Next(ParseState::AwaitKey(CommandKind::Set)))
                }
                None => {
                    self.finish_value(key)?;
                    Ok(Transition::Done(Command::Set(self.update)))
                }
                Some(b) => Err(ProtocolError::InvalidDigit(b)),
            },
        }
    }

    fn finish_value(&mut self, key: ParamKey) -> core::result::Result<(), ProtocolError> {
        if self.digits.is_empty() {
            return Err(ProtocolError::EmptyValue);
        }
        let value = self
            .digits
            .iter()
            .fold(0u64, |acc, d| acc * 10 + u64::from(d - b'0'));
        let value = u32::try_from(value).map_err(|_| ProtocolError::ValueOverflow)?;
        self.digits.clear();

        if !self.update.insert(key, value) {
            return Err(ProtocolError::DuplicateKey(key));
        }
        Ok(())
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new(ReadTimeouts::DEFAULT)
    }
}

fn expect_separator(byte: Option<u8>) -> core::result::Result<(), ProtocolError> {
    match byte {
        Some(SEPARATOR) => Ok(()),
        Some(b) => Err(ProtocolError::MissingSeparator(b)),
        None => Err(ProtocolError::Timeout),
    }
}
