//! Renewable resource model.
//!
//! A resource has a fixed availability per time slot and a demand entry
//! for every activity of the project. Activities with zero demand do not
//! use the resource at all.
//!
//! # Reference
//! Brucker et al. (1999), "Resource-constrained project scheduling: Notation, classification, models, and methods"

use serde::{Deserialize, Serialize};

/// A renewable resource shared by the project's activities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Human-readable name.
    #[serde(default)]
    pub name: Option<String>,
    /// Units available in every time slot (default: 1).
    #[serde(default = "default_availability")]
    pub availability: u32,
    /// Units each activity occupies while active, indexed by activity.
    #[serde(default)]
    pub demands: Vec<u32>,
}

fn default_availability() -> u32 {
    1
}

impl Resource {
    /// Creates a resource with availability 1 and zero demand everywhere.
    pub fn new(num_activities: usize) -> Self {
        Self {
            name: None,
            availability: default_availability(),
            demands: vec![0; num_activities],
        }
    }

    /// Sets the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the availability.
    pub fn with_availability(mut self, availability: u32) -> Self {
        self.availability = availability;
        self
    }

    /// Demand of an activity (0 if the vector is shorter).
    #[inline]
    pub fn demand(&self, activity: usize) -> u32 {
        self.demands.get(activity).copied().unwrap_or(0)
    }

    /// Activities with non-zero demand, in index order.
    pub fn participants(&self) -> Vec<usize> {
        self.demands
            .iter()
            .enumerate()
            .filter(|(_, &d)| d > 0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Total demand of the given active activities.
    pub fn load<I: IntoIterator<Item = usize>>(&self, active: I) -> u64 {
        active.into_iter().map(|a| u64::from(self.demand(a))).sum()
    }
}
