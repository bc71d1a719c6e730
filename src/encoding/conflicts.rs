//! Minimal resource conflict enumeration.
//!
//! A conflict pattern is a set of activities whose summed demand on one
//! resource exceeds its availability while every proper subset fits.
//! Each pattern later forbids its activities from being active together
//! in any time slot.
//!
//! # Algorithm
//! Depth-first search over index-increasing subsets of the resource's
//! participants, carrying the running demand on an explicit stack. The
//! first index that pushes the sum over the availability closes a
//! candidate pattern and is not descended into. Every minimal infeasible
//! set is reached this way, since all its prefixes fit. Non-minimal
//! candidates are removed by subsumption on insertion.
//!
//! # Complexity
//! Exponential in the number of participants in the worst case; bounded
//! in practice by how many participants fit within the availability.

use crate::error::{SchedulingError, SchedulingResult};
use crate::models::Resource;

/// Largest number of participants a pattern mask can address.
pub const MAX_PARTICIPANTS: usize = u64::BITS as usize;

/// Bit set over the participants of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConflictPattern(u64);

impl ConflictPattern {
    #[inline]
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    #[inline]
    pub fn bits(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn contains(self, position: usize) -> bool {
        position < MAX_PARTICIPANTS && (self.0 >> position) & 1 == 1
    }

    /// Number of participants in the pattern.
    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn is_subset_of(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    /// Participant positions, ascending.
    pub fn positions(self) -> impl Iterator<Item = usize> {
        (0..MAX_PARTICIPANTS).filter(move |&p| self.contains(p))
    }
}

/// Inclusion-minimal conflict patterns of one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictSet {
    /// Activity index of each pattern bit position.
    participants: Vec<usize>,
    patterns: Vec<ConflictPattern>,
}

impl ConflictSet {
    /// Creates an empty set over the given participants.
    pub fn new(participants: Vec<usize>) -> Self {
        Self {
            participants,
            patterns: Vec::new(),
        }
    }

    /// Enumerates the minimal conflicts of a resource.
    ///
    /// # Errors
    /// [`SchedulingError::ResourceTooWide`] when the resource has more
    /// participants than a pattern can address.
    pub fn enumerate(resource_index: usize, resource: &Resource) -> SchedulingResult<Self> {
        let participants = resource.participants();
        if participants.len() > MAX_PARTICIPANTS {
            return Err(SchedulingError::ResourceTooWide {
                resource: resource_index,
                participants: participants.len(),
                limit: MAX_PARTICIPANTS,
            });
        }

        let demands: Vec<u64> = participants
            .iter()
            .map(|&a| u64::from(resource.demand(a)))
            .collect();
        let availability = u64::from(resource.availability);
        let mut set = Self::new(participants);

        // (next position to try, chosen positions, running demand)
        let mut stack: Vec<(usize, u64, u64)> = vec![(0, 0, 0)];
        while let Some(frame) = stack.last_mut() {
            let (next, mask, load) = *frame;
            if next >= demands.len() {
                stack.pop();
                continue;
            }
            frame.0 += 1;

            let load = load + demands[next];
            let mask = mask | (1u64 << next);
            if load > availability {
                set.insert(ConflictPattern(mask));
            } else {
                stack.push((next + 1, mask, load));
            }
        }
        Ok(set)
    }

    /// Inserts a pattern, keeping the set inclusion-minimal.
    ///
    /// Returns `false` if an existing pattern already covers it.
    pub fn insert(&mut self, pattern: ConflictPattern) -> bool {
        if self.patterns.iter().any(|p| p.is_subset_of(pattern)) {
            return false;
        }
        self.patterns.retain(|p| !pattern.is_subset_of(*p));
        self.patterns.push(pattern);
        true
    }

    pub fn patterns(&self) -> &[ConflictPattern] {
        &self.patterns
    }

    pub fn participants(&self) -> &[usize] {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Activity indices of a pattern.
    pub fn activities(&self, pattern: ConflictPattern) -> Vec<usize> {
        pattern
            .positions()
            .filter_map(|p| self.participants.get(p).copied())
            .collect()
    }

    /// Activity sets of every pattern.
    pub fn conflicts(&self) -> Vec<Vec<usize>> {
        self.patterns.iter().map(|&p| self.activities(p)).collect()
    }
}
