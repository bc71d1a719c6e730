//! Random project instances.
//!
//! Activities are laid out in a serial order (index order, or a random
//! permutation with `shuffle`). Relations only point forward in that
//! order, so the event graph is acyclic. Every demand fits its resource on
//! its own and the horizon is the sum of the durations, hence running the
//! activities back to back in serial order is always a feasible schedule.
//! Pinned activities are fixed at their slot in that schedule.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::models::{Project, SequenceKind};

const KINDS: [SequenceKind; 4] = [
    SequenceKind::StartStart,
    SequenceKind::StartFinish,
    SequenceKind::FinishStart,
    SequenceKind::FinishFinish,
];

/// Shape of generated instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub activities: usize,
    /// Durations are drawn from `1..=max_duration`.
    pub max_duration: usize,
    pub resources: usize,
    /// Availabilities are drawn from `1..=max_availability`.
    pub max_availability: u32,
    /// Chance that a forward pair of activities gets a relation.
    pub sequence_probability: f64,
    /// Fix the first activity of the serial order at slot 0.
    pub pin_first: bool,
    /// Chance that an activity is fixed at its serial start slot.
    pub pin_probability: f64,
    /// Draw the serial order at random instead of index order, so
    /// relations may point from higher to lower indices.
    pub shuffle: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            activities: 6,
            max_duration: 3,
            resources: 2,
            max_availability: 3,
            sequence_probability: 0.3,
            pin_first: false,
            pin_probability: 0.0,
            shuffle: false,
        }
    }
}

impl GeneratorConfig {
    pub fn with_activities(mut self, activities: usize) -> Self {
        self.activities = activities;
        self
    }

    pub fn with_resources(mut self, resources: usize) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_max_duration(mut self, max_duration: usize) -> Self {
        self.max_duration = max_duration;
        self
    }

    pub fn with_sequence_probability(mut self, p: f64) -> Self {
        self.sequence_probability = p;
        self
    }

    pub fn with_pin_first(mut self, pin: bool) -> Self {
        self.pin_first = pin;
        self
    }

    pub fn with_pin_probability(mut self, p: f64) -> Self {
        self.pin_probability = p;
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }
}

/// Draws a project from `rng`.
pub fn random_project<R: Rng>(config: &GeneratorConfig, rng: &mut R) -> Project {
    let n = config.activities;
    let durations: Vec<usize> = (0..n)
        .map(|_| rng.random_range(1..=config.max_duration.max(1)))
        .collect();
    let horizon = durations.iter().sum::<usize>().max(1);

    let mut order: Vec<usize> = (0..n).collect();
    if config.shuffle {
        order.shuffle(rng);
    }

    let mut project = Project::new(n, horizon, config.resources);
    let pin_p = config.pin_probability.clamp(0.0, 1.0);
    let mut slot = 0;
    for (position, &a) in order.iter().enumerate() {
        let pinned = (config.pin_first && position == 0) || rng.random_bool(pin_p);
        project.define_activity(a, durations[a], pinned.then_some(slot));
        slot += durations[a];
    }

    let p = config.sequence_probability.clamp(0.0, 1.0);
    for i in 0..n {
        for j in i + 1..n {
            if rng.random_bool(p) {
                let kind = KINDS[rng.random_range(0..KINDS.len())];
                project.define_sequence(order[i], order[j], kind);
            }
        }
    }

    for r in 0..config.resources {
        let availability = rng.random_range(1..=config.max_availability.max(1));
        project.set_resource_availability(r, availability);
        for a in 0..n {
            project.alloc_resource(a, r, rng.random_range(0..=availability));
        }
    }
    project
}

/// Deterministic instance for a seed.
///
/// ```
/// use rcpsp_sat::generate::{generate, GeneratorConfig};
///
/// let config = GeneratorConfig::default();
/// assert_eq!(generate(7, &config), generate(7, &config));
/// ```
pub fn generate(seed: u64, config: &GeneratorConfig) -> Project {
    let mut rng = StdRng::seed_from_u64(seed);
    random_project(config, &mut rng)
}
