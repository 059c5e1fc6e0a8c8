//! Sequencer configuration word
//!
//! Three of the four parameters travel to the microprogram packed into one
//! 32-bit word:
//!
//! ```text
//!  31                              12 11          5 4       0
//! ┌──────────────────────────────────┬─────────────┬─────────┐
//! │            spacing (20)          │ length (7)  │ rep (5) │
//! └──────────────────────────────────┴─────────────┴─────────┘
//! ```
//!
//! Each field saturates at its maximum instead of wrapping, so out-of-range
//! inputs do not round-trip.

use crate::parameters::ParameterSet;

pub const REPEATS_BITS: u32 = 5;
pub const LENGTH_BITS: u32 = 7;
pub const SPACING_BITS: u32 = 20;

pub const REPEATS_SHIFT: u32 = 0;
pub const LENGTH_SHIFT: u32 = REPEATS_SHIFT + REPEATS_BITS;
pub const SPACING_SHIFT: u32 = LENGTH_SHIFT + LENGTH_BITS;

pub const REPEATS_MAX: u32 = (1 << REPEATS_BITS) - 1;
pub const LENGTH_MAX: u32 = (1 << LENGTH_BITS) - 1;
pub const SPACING_MAX: u32 = (1 << SPACING_BITS) - 1;

/// Packed configuration word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub struct EncodedWord(u32);

impl EncodedWord {
    /// Raw word as pushed into the sequencer queue
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Repeats field, after saturation
    pub const fn repeats(self) -> u32 {
        (self.0 >> REPEATS_SHIFT) & REPEATS_MAX
    }

    /// Length field, after saturation
    pub const fn length(self) -> u32 {
        (self.0 >> LENGTH_SHIFT) & LENGTH_MAX
    }

    /// Spacing field, after saturation
    pub const fn spacing(self) -> u32 {
        (self.0 >> SPACING_SHIFT) & SPACING_MAX
    }
}

impl From<&ParameterSet> for EncodedWord {
    fn from(params: &ParameterSet) -> Self {
        encode(params.repeats, params.length, params.spacing)
    }
}

const fn saturate(value: u32, max: u32) -> u32 {
    if value > max {
        max
    } else {
        value
    }
}

/// Pack `repeats`, `length` and `spacing` into one word
pub const fn encode(repeats: u32, length: u32, spacing: u32) -> EncodedWord {
    EncodedWord(
        (saturate(repeats, REPEATS_MAX) << REPEATS_SHIFT)
            | (saturate(length, LENGTH_MAX) << LENGTH_SHIFT)
            | (saturate(spacing, SPACING_MAX) << SPACING_SHIFT),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_layout() {
        let word = encode(0b10101, 0b1100110, 0xABCDE);
        assert_eq!(word.bits(), 0b10101 | (0b1100110 << 5) | (0xABCDE << 12));
        assert_eq!(word.repeats(), 0b10101);
        assert_eq!(word.length(), 0b1100110);
        assert_eq!(word.spacing(), 0xABCDE);
    }

    #[test]
    fn test_all_zero() {
        assert_eq!(encode(0, 0, 0).bits(), 0);
    }

    #[test]
    fn test_each_field_saturates_independently() {
        assert_eq!(encode(40, 3, 9).repeats(), encode(31, 3, 9).repeats());
        assert_eq!(encode(40, 3, 9), encode(31, 3, 9));

        let word = encode(2, 500, 9);
        assert_eq!(word.length(), LENGTH_MAX);
        assert_eq!(word.repeats(), 2);
        assert_eq!(word.spacing(), 9);

        let word = encode(2, 3, u32::MAX);
        assert_eq!(word.spacing(), SPACING_MAX);
        assert_eq!(word.length(), 3);
    }

    #[test]
    fn test_maximum_values_fill_word() {
        assert_eq!(encode(u32::MAX, u32::MAX, u32::MAX).bits(), u32::MAX);
        assert_eq!(
            encode(REPEATS_MAX, LENGTH_MAX, SPACING_MAX).bits(),
            u32::MAX
        );
    }

    #[test]
    fn test_encode_is_deterministic() {
        let a = encode(99, 1_000, 2_000_000);
        let b = encode(99, 1_000, 2_000_000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_parameter_set_ignores_offset() {
        let a = EncodedWord::from(&ParameterSet::new(2, 30, 6, 1));
        let b = EncodedWord::from(&ParameterSet::new(9_999, 30, 6, 1));
        assert_eq!(a, b);
        assert_eq!(a, encode(1, 30, 6));
    }
}
