//! Live parameter store
//!
//! Holds the one `ParameterSet` the main loop owns. The set is only ever
//! replaced whole, through a [`Proposal`] that has passed the lower-bound
//! checks.

use super::error::BoundViolation;
use super::set::{ParamKey, ParamUpdate, ParameterSet};

/// Smallest offset the microprogram can realise
pub const MIN_OFFSET: u32 = 2;

/// Smallest pulse length
pub const MIN_LENGTH: u32 = 1;

/// Smallest pulse spacing
pub const MIN_SPACING: u32 = 6;

/// A merged parameter set that satisfies every lower bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proposal(ParameterSet);

impl Proposal {
    /// Check `set` against the lower bounds
    ///
    /// Bounds are checked in the order offset, length, spacing; the first
    /// violation is reported.
    pub fn validate(set: ParameterSet) -> Result<Self, BoundViolation> {
        if set.offset < MIN_OFFSET {
            return Err(BoundViolation::Offset);
        }
        if set.length < MIN_LENGTH {
            return Err(BoundViolation::Length);
        }
        if set.spacing < MIN_SPACING {
            return Err(BoundViolation::Spacing);
        }
        Ok(Self(set))
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.0
    }
}

/// Owner of the live parameter set
#[derive(Debug, Clone)]
pub struct ParameterStore {
    current: ParameterSet,
}

impl ParameterStore {
    /// Create a store holding `defaults`
    ///
    /// # Errors
    ///
    /// Returns the violated bound if `defaults` is not a valid set.
    pub fn new(defaults: ParameterSet) -> Result<Self, BoundViolation> {
        let proposal = Proposal::validate(defaults)?;
        Ok(Self {
            current: *proposal.parameters(),
        })
    }

    /// Live parameter set
    pub fn current(&self) -> &ParameterSet {
        &self.current
    }

    /// Live value of one parameter
    pub fn get(&self, key: ParamKey) -> u32 {
        self.current.get(key)
    }

    /// Merge `update` onto the live set and validate the result
    ///
    /// Nothing is changed; call [`ParameterStore::commit`] once the hardware
    /// has accepted the proposal.
    pub fn propose(&self, update: &ParamUpdate) -> Result<Proposal, BoundViolation> {
        Proposal::validate(update.merged_onto(&self.current))
    }

    /// Replace the live set
    pub fn commit(&mut self, proposal: Proposal) {
        self.current = proposal.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ParameterStore {
        ParameterStore::new(ParameterSet::new(10, 10, 10, 0)).unwrap()
    }

    #[test]
    fn test_invalid_defaults_rejected() {
        assert_eq!(
            ParameterStore::new(ParameterSet::new(1, 10, 10, 0)).unwrap_err(),
            BoundViolation::Offset
        );
    }

    #[test]
    fn test_propose_reports_offset_bound() {
        let store = store();
        let mut update = ParamUpdate::new();
        update.insert(ParamKey::Offset, 1);

        let err = store.propose(&update).unwrap_err();
        assert_eq!(err, BoundViolation::Offset);
        assert_eq!(err.diagnostic(), "min_offset=2");
        assert_eq!(store.get(ParamKey::Offset), 10);
    }

    #[test]
    fn test_propose_reports_first_violation() {
        let store = store();
        let mut update = ParamUpdate::new();
        update.insert(ParamKey::Spacing, 5);
        update.insert(ParamKey::Length, 0);

        assert_eq!(store.propose(&update).unwrap_err(), BoundViolation::Length);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let store = store();
        let mut update = ParamUpdate::new();
        update.insert(ParamKey::Offset, MIN_OFFSET);
        update.insert(ParamKey::Length, MIN_LENGTH);
        update.insert(ParamKey::Spacing, MIN_SPACING);

        let proposal = store.propose(&update).unwrap();
        assert_eq!(proposal.parameters(), &ParameterSet::new(2, 1, 6, 0));
    }

    #[test]
    fn test_repeats_unbounded_by_store() {
        let mut store = store();
        let mut update = ParamUpdate::new();
        update.insert(ParamKey::Repeats, 1_000);

        let proposal = store.propose(&update).unwrap();
        store.commit(proposal);
        assert_eq!(store.get(ParamKey::Repeats), 1_000);
    }

    #[test]
    fn test_commit_replaces_whole_set() {
        let mut store = store();
        let mut update = ParamUpdate::new();
        update.insert(ParamKey::Offset, 50);
        update.insert(ParamKey::Length, 30);

        let proposal = store.propose(&update).unwrap();
        store.commit(proposal);
        assert_eq!(store.current(), &ParameterSet::new(50, 30, 10, 0));
    }
}
