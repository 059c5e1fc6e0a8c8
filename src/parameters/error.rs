//! Bound violation errors

use core::fmt;

/// A proposed parameter set broke one of the lower bounds
///
/// The `Display` form is the exact diagnostic sent to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum BoundViolation {
    /// `offset < 2`
    Offset,
    /// `length < 1`
    Length,
    /// `spacing < 6`
    Spacing,
}

impl BoundViolation {
    /// Diagnostic text, without line terminator
    pub const fn diagnostic(self) -> &'static str {
        match self {
            BoundViolation::Offset => "min_offset=2",
            BoundViolation::Length => "min_length=1",
            BoundViolation::Spacing => "min_spacing=6",
        }
    }
}

impl fmt::Display for BoundViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.diagnostic())
    }
}
