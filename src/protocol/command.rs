//! Command types

use crate::parameters::{ParamKey, ParamUpdate};

/// Command letter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum CommandKind {
    /// `G`
    Get,
    /// `S`
    Set,
}

impl TryFrom<u8> for CommandKind {
    type Error = u8;

    fn try_from(letter: u8) -> Result<Self, Self::Error> {
        match letter {
            b'G' => Ok(CommandKind::Get),
            b'S' => Ok(CommandKind::Set),
            other => Err(other),
        }
    }
}

/// A complete, syntactically valid command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Read one parameter
    Get(ParamKey),
    /// Replace the assigned parameters, keeping the rest
    Set(ParamUpdate),
}
