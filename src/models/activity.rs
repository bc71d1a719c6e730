//! Activity model.
//!
//! An activity is the smallest schedulable unit of work. It occupies a
//! contiguous run of discrete time slots equal to its duration, may be
//! pinned to a fixed start slot, and carries bounds computed by the
//! critical path analysis and the times resolved after solving.
//!
//! # Time Model
//!
//! Time slots are 0-based and inclusive: an activity starting at `s` with
//! duration `d` is active on `s..=s + d - 1` and finishes at `s + d - 1`.
//!
//! # Reference
//! Kolisch & Padman (2001), "An integrated survey of deterministic project scheduling"

use serde::{Deserialize, Serialize};

/// An activity to be scheduled.
///
/// Created empty when the project is built, then populated by the
/// definition calls. `bounds` is filled by the critical path analysis,
/// `resolved` by the verifier once a model is found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Human-readable label (reports fall back to `A01`, `A02`, ...).
    #[serde(default)]
    pub name: Option<String>,
    /// Number of time slots the activity occupies. `None` until defined.
    #[serde(default)]
    pub duration: Option<usize>,
    /// Pre-scheduled start slot.
    #[serde(default)]
    pub fixed_start: Option<usize>,
    /// Predecessors through Finish-Start relations, derived from
    /// `Project::sequences` (see [`Project::rebuild_links`](crate::models::Project::rebuild_links)).
    #[serde(default)]
    pub predecessors: Vec<usize>,
    /// Successors through Finish-Start relations, derived like `predecessors`.
    #[serde(default)]
    pub successors: Vec<usize>,
    /// Earliest/latest bounds from the critical path analysis.
    #[serde(default, skip_deserializing)]
    pub bounds: Option<TimeBounds>,
    /// Start/finish read back from a verified model.
    #[serde(default, skip_deserializing)]
    pub resolved: Option<ResolvedTimes>,
}

impl Activity {
    /// Creates an undefined activity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the duration.
    pub fn with_duration(mut self, duration: usize) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Pins the activity to a start slot.
    pub fn with_fixed_start(mut self, start: usize) -> Self {
        self.fixed_start = Some(start);
        self
    }

    /// Sets the label used in reports.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether the activity has a usable (positive) duration.
    #[inline]
    pub fn is_defined(&self) -> bool {
        matches!(self.duration, Some(d) if d > 0)
    }

    /// Duration, treating an undefined activity as zero-length.
    ///
    /// Only meaningful after validation has rejected undefined activities.
    #[inline]
    pub fn length(&self) -> usize {
        self.duration.unwrap_or(0)
    }
}

/// Earliest/latest start and finish slots of an activity.
///
/// Latest bounds may be negative when the horizon is too short for the
/// precedence chain; such an activity has no admissible start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBounds {
    pub earliest_start: i64,
    pub latest_start: i64,
    pub earliest_finish: i64,
    pub latest_finish: i64,
}

impl TimeBounds {
    /// Whether some start slot satisfies both bounds.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.earliest_start <= self.latest_start
    }

    /// Slack between earliest and latest start.
    #[inline]
    pub fn slack(&self) -> i64 {
        self.latest_start - self.earliest_start
    }

    /// Whether the activity lies on a critical path.
    #[inline]
    pub fn is_critical(&self) -> bool {
        self.slack() == 0
    }
}

/// Start and finish slots read from a solved model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTimes {
    pub start: usize,
    pub finish: usize,
}
