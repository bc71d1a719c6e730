//! Project (problem instance) model.
//!
//! A project gathers the activities, the precedence relations, the
//! renewable resources and the scheduling horizon. It exposes the
//! definition calls an upstream project source makes, mirroring the
//! usual "build, then define" flow:
//!
//! ```
//! use rcpsp_sat::models::{Project, SequenceKind};
//!
//! let mut project = Project::new(2, 4, 1);
//! project.define_activity(0, 2, None);
//! project.define_activity(1, 2, None);
//! project.define_sequence(0, 1, SequenceKind::FinishStart);
//! project.alloc_resource(0, 0, 1);
//! project.alloc_resource(1, 0, 1);
//! assert!(project.check_activities());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Activity, ActivitySequence, ResolvedTimes, Resource, SequenceKind, TimeBounds};

/// A resource-constrained project with generalized precedence relations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Number of discrete time slots.
    pub horizon: usize,
    /// Activities, addressed by index.
    pub activities: Vec<Activity>,
    /// Precedence relations, in definition order.
    #[serde(default)]
    pub sequences: Vec<ActivitySequence>,
    /// Renewable resources.
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl Project {
    /// Creates a project with undefined activities and default resources
    /// (availability 1, zero demand).
    pub fn new(num_activities: usize, horizon: usize, num_resources: usize) -> Self {
        Self {
            horizon,
            activities: vec![Activity::new(); num_activities],
            sequences: Vec::new(),
            resources: vec![Resource::new(num_activities); num_resources],
        }
    }

    /// Number of activities.
    #[inline]
    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }

    /// Defines an activity's duration and optional fixed start.
    ///
    /// # Panics
    /// If `activity` is out of range.
    pub fn define_activity(&mut self, activity: usize, duration: usize, start: Option<usize>) {
        let a = &mut self.activities[activity];
        a.duration = Some(duration);
        a.fixed_start = start;
    }

    /// Adds a precedence relation.
    ///
    /// Finish-Start relations are also recorded in the activities'
    /// predecessor/successor lists for the critical path analysis.
    pub fn define_sequence(&mut self, first: usize, second: usize, kind: SequenceKind) {
        self.sequences
            .push(ActivitySequence::new(first, second, kind));
        if kind == SequenceKind::FinishStart {
            if let Some(a) = self.activities.get_mut(first) {
                a.successors.push(second);
            }
            if let Some(a) = self.activities.get_mut(second) {
                a.predecessors.push(first);
            }
        }
    }

    /// Whether every activity has a positive duration.
    pub fn check_activities(&self) -> bool {
        self.activities.iter().all(Activity::is_defined)
    }

    /// Sets the availability of a resource.
    ///
    /// # Panics
    /// If `resource` is out of range.
    pub fn set_resource_availability(&mut self, resource: usize, amount: u32) {
        self.resources[resource].availability = amount;
    }

    /// Sets the demand of `activity` on `resource`.
    ///
    /// # Panics
    /// If `resource` is out of range.
    pub fn alloc_resource(&mut self, activity: usize, resource: usize, amount: u32) {
        let demands = &mut self.resources[resource].demands;
        if demands.len() <= activity {
            demands.resize(activity + 1, 0);
        }
        demands[activity] = amount;
    }

    /// Rebuilds predecessor/successor lists from the Finish-Start relations.
    ///
    /// Needed after deserializing a project whose lists were omitted.
    pub fn rebuild_links(&mut self) {
        for a in &mut self.activities {
            a.predecessors.clear();
            a.successors.clear();
        }
        for s in &self.sequences {
            if s.kind != SequenceKind::FinishStart {
                continue;
            }
            let n = self.activities.len();
            if s.first < n && s.second < n {
                self.activities[s.first].successors.push(s.second);
                self.activities[s.second].predecessors.push(s.first);
            }
        }
    }

    /// Stores critical path bounds on the activities.
    pub fn record_bounds(&mut self, bounds: &[TimeBounds]) {
        for (a, b) in self.activities.iter_mut().zip(bounds) {
            a.bounds = Some(*b);
        }
    }

    /// Stores resolved start/finish times on the activities.
    pub fn record_resolution(&mut self, times: &[ResolvedTimes]) {
        for (a, t) in self.activities.iter_mut().zip(times) {
            a.resolved = Some(*t);
        }
    }

    /// Report label of an activity (`name` or `A01`, `A02`, ...).
    pub fn label(&self, activity: usize) -> String {
        self.activities
            .get(activity)
            .and_then(|a| a.name.clone())
            .unwrap_or_else(|| format!("A{:02}", activity + 1))
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Activities Duration:")?;
        for (i, a) in self.activities.iter().enumerate() {
            match a.duration {
                Some(d) => write!(f, "({i} --> {d}) ")?,
                None => write!(f, "({i} --> ?) ")?,
            }
        }
        writeln!(f)?;
        writeln!(f, "Activities Sequence:")?;
        for s in &self.sequences {
            write!(f, "{s} ")?;
        }
        writeln!(f)
    }
}
