//! Host-side request builder and reply parser
//!
//! Hosts think in nanoseconds; the firmware thinks in sequencer cycles. This
//! module converts between the two and produces request lines the firmware
//! parser accepts, e.g. `S o 3 l 4 ` and `G o`.
//!
//! # Example
//!
//! ```
//! use pulse_trigger::parameters::ParamKey;
//! use pulse_trigger::protocol::client::{get_request, HostReply, SetRequest};
//!
//! let mut req = SetRequest::new();
//! req.assign(ParamKey::Offset, 15).unwrap();
//! req.assign(ParamKey::Length, 20).unwrap();
//! assert_eq!(req.line(), "S o 3 l 4 ");
//!
//! assert_eq!(get_request(ParamKey::Offset).as_str(), "G o");
//! assert_eq!(HostReply::parse("3\n"), HostReply::Value(3));
//! ```

use crate::parameters::ParamKey;
use core::fmt::{self, Write};
use heapless::String;

/// Nanoseconds per sequencer cycle
pub const NS_PER_CYCLE: u64 = 5;

/// Room for one assignment of every key at full width
pub const REQUEST_CAPACITY: usize = 64;

/// Accepted host-side range for one parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Smallest accepted value, host units
    pub min: u64,
    /// Largest accepted value, host units
    pub max: u64,
    /// Host units per firmware unit
    pub divider: u64,
}

impl Limits {
    pub const fn for_key(key: ParamKey) -> Self {
        match key {
            ParamKey::Offset => Self {
                min: 2 * NS_PER_CYCLE,
                max: u32::MAX as u64 * NS_PER_CYCLE,
                divider: NS_PER_CYCLE,
            },
            ParamKey::Length => Self {
                min: NS_PER_CYCLE,
                max: 127 * NS_PER_CYCLE,
                divider: NS_PER_CYCLE,
            },
            ParamKey::Spacing => Self {
                min: 6 * NS_PER_CYCLE,
                max: ((1 << 20) - 1) * NS_PER_CYCLE,
                divider: NS_PER_CYCLE,
            },
            ParamKey::Repeats => Self {
                min: 0,
                max: 31,
                divider: 1,
            },
        }
    }

    /// Convert a host value to firmware units
    pub fn to_firmware(&self, key: ParamKey, value: u64) -> Result<u32, ClientError> {
        if value < self.min || value > self.max {
            return Err(ClientError::OutOfRange(key));
        }
        if value % self.divider != 0 {
            return Err(ClientError::NotMultiple(key));
        }
        u32::try_from(value / self.divider).map_err(|_| ClientError::OutOfRange(key))
    }

    /// Convert a firmware value back to host units
    pub fn to_host(&self, value: u32) -> u64 {
        u64::from(value) * self.divider
    }
}

/// Request-building errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientError {
    /// Value outside [`Limits`]
    OutOfRange(ParamKey),
    /// Value not a whole number of firmware units
    NotMultiple(ParamKey),
    /// Key assigned twice in one request
    DuplicateKey(ParamKey),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::OutOfRange(key) => {
                let l = Limits::for_key(*key);
                write!(f, "{} must be in {}..={}", key.name(), l.min, l.max)
            }
            ClientError::NotMultiple(key) => {
                let l = Limits::for_key(*key);
                write!(f, "{} must be divisible by {}", key.name(), l.divider)
            }
            ClientError::DuplicateKey(key) => write!(f, "{} assigned twice", key.name()),
        }
    }
}

/// `SET` request under construction
#[derive(Debug, Clone)]
pub struct SetRequest {
    line: String<REQUEST_CAPACITY>,
    assigned: [bool; 4],
}

impl SetRequest {
    pub fn new() -> Self {
        let mut line = String::new();
        // Capacity is far larger than the prefix
        let _ = line.push_str("S ");
        Self {
            line,
            assigned: [false; 4],
        }
    }

    /// Append `key <value> ` with `value` in host units
    pub fn assign(&mut self, key: ParamKey, value: u64) -> Result<&mut Self, ClientError> {
        let slot = key.index();
        if self.assigned[slot] {
            return Err(ClientError::DuplicateKey(key));
        }
        let converted = Limits::for_key(key).to_firmware(key, value)?;
        // Four assignments of at most 10 digits each fit REQUEST_CAPACITY
        let _ = write!(self.line, "{} {} ", key.symbol() as char, converted);
        self.assigned[slot] = true;
        Ok(self)
    }

    /// Number of keys assigned so far
    pub fn len(&self) -> usize {
        self.assigned.iter().filter(|a| **a).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Request line as sent on the wire
    pub fn line(&self) -> &str {
        self.line.as_str()
    }
}

impl Default for SetRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// `G <key>` request line
pub fn get_request(key: ParamKey) -> String<4> {
    let mut line = String::new();
    let _ = write!(line, "G {}", key.symbol() as char);
    line
}

/// One reply line as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostReply<'a> {
    /// `SET` applied
    Ok,
    /// `GET` answer, firmware units
    Value(u32),
    /// Anything else: bound diagnostic or protocol error
    Refused(&'a str),
}

impl<'a> HostReply<'a> {
    /// Classify a reply line, with or without its line terminator
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        if line == "OK" {
            return HostReply::Ok;
        }
        let all_digits = !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit());
        match line.parse::<u32>() {
            Ok(v) if all_digits => HostReply::Value(v),
            _ => HostReply::Refused(line),
        }
    }

    /// `GET` answer converted to host units for `key`
    pub fn value_in_host_units(&self, key: ParamKey) -> Option<u64> {
        match self {
            HostReply::Value(v) => Some(Limits::for_key(key).to_host(*v)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_request_trailing_separator() {
        let mut req = SetRequest::new();
        req.assign(ParamKey::Offset, 15)
            .unwrap()
            .assign(ParamKey::Length, 20)
            .unwrap();
        assert_eq!(req.line(), "S o 3 l 4 ");
        assert_eq!(req.len(), 2);
    }

    #[test]
    fn test_repeats_are_not_scaled() {
        let mut req = SetRequest::new();
        req.assign(ParamKey::Repeats, 31).unwrap();
        assert_eq!(req.line(), "S r 31 ");
    }

    #[test]
    fn test_host_limits_match_firmware_bounds() {
        let mut req = SetRequest::new();
        assert_eq!(
            req.assign(ParamKey::Offset, 5).unwrap_err(),
            ClientError::OutOfRange(ParamKey::Offset)
        );
        assert_eq!(
            req.assign(ParamKey::Spacing, 25).unwrap_err(),
            ClientError::OutOfRange(ParamKey::Spacing)
        );
        req.assign(ParamKey::Spacing, 30).unwrap();
        assert_eq!(req.line(), "S s 6 ");
    }

    #[test]
    fn test_length_upper_limit() {
        let mut req = SetRequest::new();
        assert!(req.assign(ParamKey::Length, 127 * 5).is_ok());
        let mut req = SetRequest::new();
        assert_eq!(
            req.assign(ParamKey::Length, 128 * 5).unwrap_err(),
            ClientError::OutOfRange(ParamKey::Length)
        );
    }

    #[test]
    fn test_value_must_be_whole_cycles() {
        let mut req = SetRequest::new();
        assert_eq!(
            req.assign(ParamKey::Offset, 12).unwrap_err(),
            ClientError::NotMultiple(ParamKey::Offset)
        );
        assert!(req.is_empty());
    }

    #[test]
    fn test_duplicate_assignment() {
        let mut req = SetRequest::new();
        req.assign(ParamKey::Length, 10).unwrap();
        assert_eq!(
            req.assign(ParamKey::Length, 15).unwrap_err(),
            ClientError::DuplicateKey(ParamKey::Length)
        );
    }

    #[test]
    fn test_full_width_request_fits() {
        let mut req = SetRequest::new();
        req.assign(ParamKey::Offset, u32::MAX as u64 * 5)
            .unwrap()
            .assign(ParamKey::Length, 127 * 5)
            .unwrap()
            .assign(ParamKey::Spacing, ((1 << 20) - 1) * 5)
            .unwrap()
            .assign(ParamKey::Repeats, 31)
            .unwrap();
        assert_eq!(req.line(), "S o 4294967295 l 127 s 1048575 r 31 ");
    }

    #[test]
    fn test_get_request_has_no_terminator() {
        assert_eq!(get_request(ParamKey::Spacing).as_str(), "G s");
    }

    #[test]
    fn test_parse_replies() {
        assert_eq!(HostReply::parse("OK\n"), HostReply::Ok);
        assert_eq!(HostReply::parse("42\r\n"), HostReply::Value(42));
        assert_eq!(
            HostReply::parse("min_spacing=6\n"),
            HostReply::Refused("min_spacing=6")
        );
        assert_eq!(
            HostReply::parse("ERR timeout\n"),
            HostReply::Refused("ERR timeout")
        );
        assert_eq!(HostReply::parse("+5"), HostReply::Refused("+5"));
    }

    #[test]
    fn test_value_back_to_nanoseconds() {
        let reply = HostReply::parse("8\n");
        assert_eq!(reply.value_in_host_units(ParamKey::Offset), Some(40));
        assert_eq!(reply.value_in_host_units(ParamKey::Repeats), Some(8));
        assert_eq!(HostReply::Ok.value_in_host_units(ParamKey::Offset), None);
    }
}
