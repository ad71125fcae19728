// src/action_space.rs
//
// Inclusive integer action range [min, max] and the action <-> index
// bijection used for every policy / reward vector position.
//
// Policies and reward vectors hold one f64 per action, so the range size
// is capped at MAX_ACTIONS and checked at construction.

use crate::error::{GuesserError, GuesserResult};

/// Largest number of actions a range may hold (2^24, 128 MiB per vector).
pub const MAX_ACTIONS: usize = 1 << 24;

/// Contiguous, inclusive range of guessable integer actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionSpace {
    min: i64,
    max: i64,
    len: usize,
}

impl ActionSpace {
    /// Build a range, rejecting `min > max` and ranges of more than
    /// `MAX_ACTIONS` actions.
    pub fn new(min: i64, max: i64) -> GuesserResult<Self> {
        if min > max {
            return Err(GuesserError::config(
                "min",
                format!("min ({min}) must be <= max ({max})"),
            ));
        }
        let len = usize::try_from(max.abs_diff(min))
            .ok()
            .and_then(|span| span.checked_add(1))
            .filter(|&len| len <= MAX_ACTIONS)
            .ok_or_else(|| {
                GuesserError::config(
                    "max",
                    format!("range [{min}, {max}] holds more than {MAX_ACTIONS} actions"),
                )
            })?;
        Ok(Self { min, max, len })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    /// Number of actions, `max - min + 1`.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Never empty; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Largest possible distance between two actions in the range.
    pub fn span(&self) -> u64 {
        self.max.abs_diff(self.min)
    }

    pub fn contains(&self, action: i64) -> bool {
        (self.min..=self.max).contains(&action)
    }

    /// Zero-based vector position of `action`, or None if out of range.
    pub fn index_of(&self, action: i64) -> Option<usize> {
        if self.contains(action) {
            Some(action.abs_diff(self.min) as usize)
        } else {
            None
        }
    }

    /// Like `index_of`, but out-of-range actions are an error.
    pub fn checked_index(&self, action: i64) -> GuesserResult<usize> {
        self.index_of(action)
            .ok_or(GuesserError::ActionOutOfRange {
                action,
                min: self.min,
                max: self.max,
            })
    }

    /// Inverse of `index_of`.
    pub fn action_at(&self, index: usize) -> Option<i64> {
        if index < self.len {
            Some(self.min.wrapping_add(index as i64))
        } else {
            None
        }
    }

    pub fn actions(&self) -> impl Iterator<Item = i64> {
        self.min..=self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_range() {
        let err = ActionSpace::new(5, 4).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn single_action_space_is_valid() {
        let space = ActionSpace::new(3, 3).unwrap();
        assert_eq!(space.len(), 1);
        assert_eq!(space.span(), 0);
        assert_eq!(space.index_of(3), Some(0));
    }

    #[test]
    fn index_bijection_with_negative_min() {
        let space = ActionSpace::new(-5, 5).unwrap();
        assert_eq!(space.len(), 11);
        for (i, a) in space.actions().enumerate() {
            assert_eq!(space.index_of(a), Some(i));
            assert_eq!(space.action_at(i), Some(a));
        }
        assert_eq!(space.index_of(6), None);
        assert_eq!(space.action_at(11), None);
    }

    #[test]
    fn full_i64_range_is_configuration_error() {
        let err = ActionSpace::new(i64::MIN, i64::MAX).unwrap_err();
        assert!(err.is_configuration());
        assert!(ActionSpace::new(0, 10_000_000_000_000)
            .unwrap_err()
            .is_configuration());
    }

    #[test]
    fn size_cap_is_inclusive() {
        let max = MAX_ACTIONS as i64 - 1;
        assert_eq!(ActionSpace::new(0, max).unwrap().len(), MAX_ACTIONS);
        assert!(ActionSpace::new(0, max + 1).is_err());
        assert!(ActionSpace::new(-max - 1, 0).is_err());
    }

    #[test]
    fn checked_index_reports_range() {
        let space = ActionSpace::new(0, 10).unwrap();
        match space.checked_index(-1) {
            Err(GuesserError::ActionOutOfRange { action, min, max }) => {
                assert_eq!((action, min, max), (-1, 0, 10));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
