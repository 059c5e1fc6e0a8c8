//! Protocol syntax errors

use crate::parameters::ParamKey;
use crate::platform::error::SerialError;
use core::fmt;

/// Malformed input on the serial link
///
/// Recovered locally: the parser discards the rest of the command and the
/// host receives a generic `ERR` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum ProtocolError {
    /// First byte is not a command letter
    UnknownCommand(u8),
    /// Something other than a single space where a separator belongs
    MissingSeparator(u8),
    /// Byte is not one of `o`, `l`, `s`, `r`
    UnknownKey(u8),
    /// Non-digit, non-separator byte inside a value
    InvalidDigit(u8),
    /// Separator or timeout before the first digit
    EmptyValue,
    /// More digits than the accumulation buffer holds
    TooManyDigits,
    /// Value does not fit in 32 bits
    ValueOverflow,
    /// Same key assigned twice in one `SET`
    DuplicateKey(ParamKey),
    /// Required byte did not arrive in time
    Timeout,
    /// Receiver flagged a corrupted byte
    LineError(SerialError),
}

impl ProtocolError {
    /// Short token sent after `ERR`
    pub const fn reason(self) -> &'static str {
        match self {
            ProtocolError::UnknownCommand(_) => "unknown_command",
            ProtocolError::MissingSeparator(_) => "missing_separator",
            ProtocolError::UnknownKey(_) => "unknown_key",
            ProtocolError::InvalidDigit(_) => "invalid_digit",
            ProtocolError::EmptyValue => "empty_value",
            ProtocolError::TooManyDigits => "too_many_digits",
            ProtocolError::ValueOverflow => "value_overflow",
            ProtocolError::DuplicateKey(_) => "duplicate_key",
            ProtocolError::Timeout => "timeout",
            ProtocolError::LineError(_) => "line_error",
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::UnknownCommand(b) => write!(f, "Unknown command 0x{:02x}", b),
            ProtocolError::MissingSeparator(b) => write!(f, "Expected separator, got 0x{:02x}", b),
            ProtocolError::UnknownKey(b) => write!(f, "Unknown key 0x{:02x}", b),
            ProtocolError::InvalidDigit(b) => write!(f, "Invalid digit 0x{:02x}", b),
            ProtocolError::EmptyValue => write!(f, "Empty value"),
            ProtocolError::TooManyDigits => write!(f, "Value has too many digits"),
            ProtocolError::ValueOverflow => write!(f, "Value does not fit in 32 bits"),
            ProtocolError::DuplicateKey(k) => write!(f, "Duplicate key {}", k),
            ProtocolError::Timeout => write!(f, "Timeout inside command"),
            ProtocolError::LineError(e) => write!(f, "Serial line error: {:?}", e),
        }
    }
}
