//! Schedule (solution) model.
//!
//! A schedule assigns every activity a start and a finish slot. It is
//! produced by decoding and verifying a SAT model, so it always satisfies
//! the project's constraints.

use serde::{Deserialize, Serialize};

use super::{Project, ResolvedTimes};

/// A verified schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Number of time slots of the project.
    pub horizon: usize,
    /// One entry per activity, in activity order.
    pub assignments: Vec<Assignment>,
}

/// Start/finish slots of one activity (both inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub activity: usize,
    pub start: usize,
    pub finish: usize,
}

impl Assignment {
    pub fn new(activity: usize, start: usize, finish: usize) -> Self {
        Self {
            activity,
            start,
            finish,
        }
    }

    /// Number of occupied slots.
    #[inline]
    pub fn duration(&self) -> usize {
        self.finish + 1 - self.start
    }

    /// Whether the activity is active at `slot`.
    #[inline]
    pub fn is_active_at(&self, slot: usize) -> bool {
        self.start <= slot && slot <= self.finish
    }

    #[inline]
    pub fn times(&self) -> ResolvedTimes {
        ResolvedTimes {
            start: self.start,
            finish: self.finish,
        }
    }
}

impl Schedule {
    /// Builds a schedule from resolved times in activity order.
    pub fn from_resolved(horizon: usize, times: &[ResolvedTimes]) -> Self {
        Self {
            horizon,
            assignments: times
                .iter()
                .enumerate()
                .map(|(i, t)| Assignment::new(i, t.start, t.finish))
                .collect(),
        }
    }

    /// Finds the assignment for an activity.
    pub fn assignment_for_activity(&self, activity: usize) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.activity == activity)
    }

    /// Resolved times in activity order.
    pub fn resolved_times(&self) -> Vec<ResolvedTimes> {
        self.assignments.iter().map(Assignment::times).collect()
    }

    /// Makespan: number of slots up to and including the last finish.
    pub fn makespan(&self) -> usize {
        self.assignments
            .iter()
            .map(|a| a.finish + 1)
            .max()
            .unwrap_or(0)
    }

    /// Activities active at `slot`.
    pub fn active_at(&self, slot: usize) -> Vec<usize> {
        self.assignments
            .iter()
            .filter(|a| a.is_active_at(slot))
            .map(|a| a.activity)
            .collect()
    }

    /// Per-slot usage of a resource over the horizon.
    ///
    /// Returns `None` if `resource` is out of range.
    pub fn resource_profile(&self, project: &Project, resource: usize) -> Option<Vec<u64>> {
        let r = project.resources.get(resource)?;
        Some(
            (0..self.horizon)
                .map(|t| r.load(self.active_at(t)))
                .collect(),
        )
    }

    /// Highest per-slot usage of a resource.
    pub fn peak_usage(&self, project: &Project, resource: usize) -> Option<u64> {
        self.resource_profile(project, resource)
            .map(|p| p.into_iter().max().unwrap_or(0))
    }

    /// Used fraction of a resource's capacity over the makespan.
    ///
    /// Returns `None` if the resource does not exist, has zero availability,
    /// or the schedule is empty.
    pub fn resource_utilization(&self, project: &Project, resource: usize) -> Option<f64> {
        let makespan = self.makespan();
        let r = project.resources.get(resource)?;
        if makespan == 0 || r.availability == 0 {
            return None;
        }
        let used: u64 = self.resource_profile(project, resource)?[..makespan.min(self.horizon)]
            .iter()
            .sum();
        Some(used as f64 / (u64::from(r.availability) * makespan as u64) as f64)
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }
}
