//! Timing parameter types

use core::fmt;

/// One of the four timing parameters
///
/// On the wire each key is a single lowercase letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum ParamKey {
    /// `o`: delay from trigger to first pulse, in sequencer cycles
    Offset,
    /// `l`: pulse high time, in sequencer cycles
    Length,
    /// `s`: pulse period, in sequencer cycles
    Spacing,
    /// `r`: number of additional pulses after the first
    Repeats,
}

impl ParamKey {
    /// All keys, in wire order
    pub const ALL: [ParamKey; 4] = [
        ParamKey::Offset,
        ParamKey::Length,
        ParamKey::Spacing,
        ParamKey::Repeats,
    ];

    /// Wire symbol
    pub const fn symbol(self) -> u8 {
        match self {
            ParamKey::Offset => b'o',
            ParamKey::Length => b'l',
            ParamKey::Spacing => b's',
            ParamKey::Repeats => b'r',
        }
    }

    /// Long name
    pub const fn name(self) -> &'static str {
        match self {
            ParamKey::Offset => "offset",
            ParamKey::Length => "length",
            ParamKey::Spacing => "spacing",
            ParamKey::Repeats => "repeats",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            ParamKey::Offset => 0,
            ParamKey::Length => 1,
            ParamKey::Spacing => 2,
            ParamKey::Repeats => 3,
        }
    }
}

impl TryFrom<u8> for ParamKey {
    type Error = u8;

    fn try_from(symbol: u8) -> Result<Self, Self::Error> {
        match symbol {
            b'o' => Ok(ParamKey::Offset),
            b'l' => Ok(ParamKey::Length),
            b's' => Ok(ParamKey::Spacing),
            b'r' => Ok(ParamKey::Repeats),
            other => Err(other),
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The four live timing parameters, in sequencer cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub struct ParameterSet {
    pub offset: u32,
    pub length: u32,
    pub spacing: u32,
    pub repeats: u32,
}

impl ParameterSet {
    pub const fn new(offset: u32, length: u32, spacing: u32, repeats: u32) -> Self {
        Self {
            offset,
            length,
            spacing,
            repeats,
        }
    }

    /// Value of one parameter
    pub const fn get(&self, key: ParamKey) -> u32 {
        match key {
            ParamKey::Offset => self.offset,
            ParamKey::Length => self.length,
            ParamKey::Spacing => self.spacing,
            ParamKey::Repeats => self.repeats,
        }
    }

    fn set(&mut self, key: ParamKey, value: u32) {
        match key {
            ParamKey::Offset => self.offset = value,
            ParamKey::Length => self.length = value,
            ParamKey::Spacing => self.spacing = value,
            ParamKey::Repeats => self.repeats = value,
        }
    }
}

/// Assignments collected from one `SET` command
///
/// Each key may be assigned at most once. Keys left unassigned keep their
/// current value when the update is merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamUpdate {
    values: [Option<u32>; 4],
}

impl ParamUpdate {
    pub const fn new() -> Self {
        Self { values: [None; 4] }
    }

    /// Record an assignment
    ///
    /// Returns `false`, leaving the update untouched, if `key` was already
    /// assigned.
    pub fn insert(&mut self, key: ParamKey, value: u32) -> bool {
        let slot = &mut self.values[key.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        true
    }

    /// Assigned value for `key`, if any
    pub fn get(&self, key: ParamKey) -> Option<u32> {
        self.values[key.index()]
    }

    /// Number of assignments
    pub fn len(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `base` with every assigned key replaced
    pub fn merged_onto(&self, base: &ParameterSet) -> ParameterSet {
        let mut merged = *base;
        for key in ParamKey::ALL {
            if let Some(value) = self.get(key) {
                merged.set(key, value);
            }
        }
        merged
    }
}
