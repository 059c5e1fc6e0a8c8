//! Replies sent back to the host

use super::error::ProtocolError;
use crate::parameters::BoundViolation;
use core::fmt::{self, Write};
use heapless::String;

/// Longest rendered reply, including the newline
pub const REPLY_CAPACITY: usize = 32;

/// One line sent back to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// `GET` answer
    Value(u32),
    /// `SET` applied
    Ok,
    /// `SET` refused, nothing changed
    Bound(BoundViolation),
    /// Malformed command
    Error(ProtocolError),
}

impl Reply {
    /// Render the reply line
    pub fn render(&self) -> String<REPLY_CAPACITY> {
        let mut line = String::new();
        // Every variant fits in REPLY_CAPACITY
        let _ = write!(line, "{}", self);
        line
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Value(v) => writeln!(f, "{}", v),
            Reply::Ok => writeln!(f, "OK"),
            Reply::Bound(b) => writeln!(f, "{}", b),
            Reply::Error(e) => writeln!(f, "ERR {}", e.reason()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_value() {
        assert_eq!(Reply::Value(50).render().as_str(), "50\n");
        assert_eq!(Reply::Value(u32::MAX).render().as_str(), "4294967295\n");
    }

    #[test]
    fn test_render_ok() {
        assert_eq!(Reply::Ok.render().as_str(), "OK\n");
    }

    #[test]
    fn test_render_bound_diagnostics() {
        assert_eq!(
            Reply::Bound(BoundViolation::Offset).render().as_str(),
            "min_offset=2\n"
        );
        assert_eq!(
            Reply::Bound(BoundViolation::Length).render().as_str(),
            "min_length=1\n"
        );
        assert_eq!(
            Reply::Bound(BoundViolation::Spacing).render().as_str(),
            "min_spacing=6\n"
        );
    }

    #[test]
    fn test_render_error_marker() {
        let line = Reply::Error(ProtocolError::MissingSeparator(b'x')).render();
        assert_eq!(line.as_str(), "ERR missing_separator\n");
    }
}
