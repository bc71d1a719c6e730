//! Independent verification of a decoded model.
//!
//! Re-checks every constraint family against the concrete 0/1 values of
//! the matrices, without looking at the clauses. A failure means the
//! encoding and the SAT engine disagree; it is never a property of the
//! input and is surfaced as [`SchedulingError::Verification`].
//!
//! [`SchedulingError::Verification`]: crate::error::SchedulingError::Verification

use thiserror::Error;

use crate::encoding::EncodingConfig;
use crate::models::{ActivitySequence, Event, Project, ResolvedTimes, TimeBounds};
use crate::sat::TimeMatrices;

/// The first constraint found violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("activity {activity} has {count} start slots")]
    StartNotUnique { activity: usize, count: usize },

    #[error("activity {activity} has {count} finish slots")]
    FinishNotUnique { activity: usize, count: usize },

    #[error("activity {activity} starts at {start}, latest possible start is {latest}")]
    StartTooLate {
        activity: usize,
        start: usize,
        latest: i64,
    },

    #[error("activity {activity} finishes at {finish}, earliest possible finish is {earliest}")]
    FinishTooEarly {
        activity: usize,
        finish: usize,
        earliest: usize,
    },

    #[error("activity {activity} starts at {start} and finishes at {finish}, expected {expected}")]
    FinishMismatch {
        activity: usize,
        start: usize,
        finish: usize,
        expected: usize,
    },

    #[error("activity {activity} is never active")]
    InactiveActivity { activity: usize },

    #[error("activity {activity} is inactive at slot {slot} inside its run")]
    GapInActivity { activity: usize, slot: usize },

    #[error(
        "activity {activity} is active over {first}..={last}, but starts at {start} and finishes at {finish}"
    )]
    ActiveRunMismatch {
        activity: usize,
        first: usize,
        last: usize,
        start: usize,
        finish: usize,
    },

    #[error("slot {slot} is idle but slot {} is not", .slot + 1)]
    IdleSlot { slot: usize },

    #[error("relation {sequence} violated: {first} is not before {second}")]
    SequenceViolated {
        sequence: ActivitySequence,
        first: usize,
        second: usize,
    },

    #[error("activity {activity} is fixed at {fixed} but starts at {start}")]
    FixedStartMissed {
        activity: usize,
        fixed: usize,
        start: usize,
    },

    #[error("resource {resource} at slot {slot}: load {load} exceeds availability {availability}")]
    ResourceExceeded {
        resource: usize,
        slot: usize,
        load: u64,
        availability: u32,
    },

    #[error("activity {activity} runs {start}..={finish}, outside its critical path bounds")]
    OutsideBounds {
        activity: usize,
        start: usize,
        finish: usize,
    },
}

/// Checks solved matrices against a project.
#[derive(Debug, Clone)]
pub struct Verifier<'a> {
    project: &'a Project,
    config: &'a EncodingConfig,
    bounds: &'a [TimeBounds],
}

impl<'a> Verifier<'a> {
    pub fn new(project: &'a Project, config: &'a EncodingConfig) -> Self {
        Self {
            project,
            config,
            bounds: &[],
        }
    }

    /// Also checks the critical path bounds (when pruning is enabled).
    pub fn with_bounds(mut self, bounds: &'a [TimeBounds]) -> Self {
        self.bounds = bounds;
        self
    }

    /// Runs every check and returns the resolved times per activity.
    pub fn verify(&self, m: &TimeMatrices) -> Result<Vec<ResolvedTimes>, VerificationError> {
        let times = (0..self.project.activity_count())
            .map(|a| self.resolve_activity(m, a))
            .collect::<Result<Vec<_>, _>>()?;

        if self.config.no_time_gaps {
            self.check_no_idle_gap(m)?;
        }
        self.check_sequences(&times)?;
        self.check_fixed_starts(&times)?;
        self.check_resources(m)?;
        if self.config.domain_pruning {
            self.check_bounds(&times)?;
        }
        Ok(times)
    }

    fn resolve_activity(
        &self,
        m: &TimeMatrices,
        activity: usize,
    ) -> Result<ResolvedTimes, VerificationError> {
        let horizon = self.project.horizon;
        let d = self.project.activities[activity].length();

        let starts = m.starts.set_columns(activity);
        let [start] = starts[..] else {
            return Err(VerificationError::StartNotUnique {
                activity,
                count: starts.len(),
            });
        };
        let finishes = m.finishes.set_columns(activity);
        let [finish] = finishes[..] else {
            return Err(VerificationError::FinishNotUnique {
                activity,
                count: finishes.len(),
            });
        };

        let latest = horizon as i64 - d as i64;
        if start as i64 > latest {
            return Err(VerificationError::StartTooLate {
                activity,
                start,
                latest,
            });
        }
        if finish + 1 < d {
            return Err(VerificationError::FinishTooEarly {
                activity,
                finish,
                earliest: d - 1,
            });
        }
        if finish != start + d - 1 {
            return Err(VerificationError::FinishMismatch {
                activity,
                start,
                finish,
                expected: start + d - 1,
            });
        }

        let active = m.active.set_columns(activity);
        let (Some(&first), Some(&last)) = (active.first(), active.last()) else {
            return Err(VerificationError::InactiveActivity { activity });
        };
        if let Some(slot) = (first..=last).find(|&t| !m.active.is_set(activity, t)) {
            return Err(VerificationError::GapInActivity { activity, slot });
        }
        if (first, last) != (start, finish) {
            return Err(VerificationError::ActiveRunMismatch {
                activity,
                first,
                last,
                start,
                finish,
            });
        }
        Ok(ResolvedTimes { start, finish })
    }

    fn check_no_idle_gap(&self, m: &TimeMatrices) -> Result<(), VerificationError> {
        let n = self.project.activity_count();
        let busy: Vec<bool> = (0..self.project.horizon)
            .map(|t| (0..n).any(|a| m.active.is_set(a, t)))
            .collect();
        match busy.windows(2).position(|w| !w[0] && w[1]) {
            Some(slot) => Err(VerificationError::IdleSlot { slot }),
            None => Ok(()),
        }
    }

    fn check_sequences(&self, times: &[ResolvedTimes]) -> Result<(), VerificationError> {
        for &sequence in &self.project.sequences {
            let a = times[sequence.first];
            let b = times[sequence.second];
            if !sequence.kind.holds((a.start, a.finish), (b.start, b.finish)) {
                let pick = |t: ResolvedTimes, event| match event {
                    Event::Start => t.start,
                    Event::Finish => t.finish,
                };
                return Err(VerificationError::SequenceViolated {
                    sequence,
                    first: pick(a, sequence.kind.from_event()),
                    second: pick(b, sequence.kind.to_event()),
                });
            }
        }
        Ok(())
    }

    fn check_fixed_starts(&self, times: &[ResolvedTimes]) -> Result<(), VerificationError> {
        for (activity, (a, t)) in self.project.activities.iter().zip(times).enumerate() {
            if let Some(fixed) = a.fixed_start {
                if fixed != t.start {
                    return Err(VerificationError::FixedStartMissed {
                        activity,
                        fixed,
                        start: t.start,
                    });
                }
            }
        }
        Ok(())
    }

    fn check_resources(&self, m: &TimeMatrices) -> Result<(), VerificationError> {
        let n = self.project.activity_count();
        for (resource, r) in self.project.resources.iter().enumerate() {
            for slot in 0..self.project.horizon {
                let load = r.load((0..n).filter(|&a| m.active.is_set(a, slot)));
                if load > u64::from(r.availability) {
                    return Err(VerificationError::ResourceExceeded {
                        resource,
                        slot,
                        load,
                        availability: r.availability,
                    });
                }
            }
        }
        Ok(())
    }

    fn check_bounds(&self, times: &[ResolvedTimes]) -> Result<(), VerificationError> {
        for (activity, (b, t)) in self.bounds.iter().zip(times).enumerate() {
            let (s, f) = (t.start as i64, t.finish as i64);
            let inside = b.earliest_start <= s
                && s <= b.latest_start
                && b.earliest_finish <= f
                && f <= b.latest_finish;
            if !inside {
                return Err(VerificationError::OutsideBounds {
                    activity,
                    start: t.start,
                    finish: t.finish,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SequenceKind;
    use crate::precedence::CriticalPath;

    /// Matrices holding the given `(start)` per activity, all other cells false.
    fn paint(project: &Project, starts: &[usize]) -> TimeMatrices {
        let horizon = project.horizon;
        let mut m = TimeMatrices::build(project.activity_count(), horizon);
        for (a, &s) in starts.iter().enumerate() {
            let d = project.activities[a].length();
            for t in 0..horizon {
                m.starts.set_value(a, t, Some(t == s));
                m.finishes.set_value(a, t, Some(t + 1 == s + d));
                m.active.set_value(a, t, Some(s <= t && t < s + d));
            }
        }
        m
    }

    fn chain() -> Project {
        let mut p = Project::new(2, 4, 0);
        p.define_activity(0, 2, None);
        p.define_activity(1, 2, None);
        p.define_sequence(0, 1, SequenceKind::FinishStart);
        p
    }

    #[test]
    fn test_accepts_valid_schedule() {
        let p = chain();
        let config = EncodingConfig::default();
        let bounds = CriticalPath::analyze(&p).into_bounds();
        let times = Verifier::new(&p, &config)
            .with_bounds(&bounds)
            .verify(&paint(&p, &[0, 2]))
            .unwrap();
        assert_eq!(
            times,
            vec![
                ResolvedTimes { start: 0, finish: 1 },
                ResolvedTimes { start: 2, finish: 3 }
            ]
        );
    }

    #[test]
    fn test_rejects_overlapping_chain() {
        let p = chain();
        let config = EncodingConfig::default();
        let err = Verifier::new(&p, &config)
            .verify(&paint(&p, &[0, 1]))
            .unwrap_err();
        assert_eq!(
            err,
            VerificationError::SequenceViolated {
                sequence: ActivitySequence::new(0, 1, SequenceKind::FinishStart),
                first: 1,
                second: 1,
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_start() {
        let p = chain();
        let config = EncodingConfig::default();
        let mut m = paint(&p, &[0, 2]);
        m.starts.set_value(0, 1, Some(true));
        let err = Verifier::new(&p, &config).verify(&m).unwrap_err();
        assert_eq!(err, VerificationError::StartNotUnique { activity: 0, count: 2 });
    }

    #[test]
    fn test_rejects_decoupled_finish() {
        let p = chain();
        let config = EncodingConfig::default();
        let mut m = paint(&p, &[0, 2]);
        m.finishes.set_value(0, 1, Some(false));
        m.finishes.set_value(0, 2, Some(true));
        let err = Verifier::new(&p, &config).verify(&m).unwrap_err();
        assert!(matches!(err, VerificationError::FinishMismatch { activity: 0, .. }));
    }

    #[test]
    fn test_rejects_gap_inside_run() {
        let mut p = Project::new(1, 5, 0);
        p.define_activity(0, 3, None);
        let config = EncodingConfig::default();
        let mut m = paint(&p, &[0]);
        m.active.set_value(0, 1, Some(false));
        let err = Verifier::new(&p, &config).verify(&m).unwrap_err();
        assert_eq!(err, VerificationError::GapInActivity { activity: 0, slot: 1 });
    }

    #[test]
    fn test_rejects_shifted_active_run() {
        let mut p = Project::new(1, 5, 0);
        p.define_activity(0, 2, None);
        let config = EncodingConfig::default();
        let mut m = paint(&p, &[0]);
        m.active.set_value(0, 0, Some(false));
        m.active.set_value(0, 2, Some(true));
        let err = Verifier::new(&p, &config).verify(&m).unwrap_err();
        assert!(matches!(err, VerificationError::ActiveRunMismatch { first: 1, last: 2, .. }));
    }

    #[test]
    fn test_idle_slot_depends_on_config() {
        let mut p = Project::new(1, 4, 0);
        p.define_activity(0, 2, None);
        let m = paint(&p, &[1]);
        let config = EncodingConfig::default();
        assert_eq!(
            Verifier::new(&p, &config).verify(&m).unwrap_err(),
            VerificationError::IdleSlot { slot: 0 }
        );
        let relaxed = config.with_no_time_gaps(false);
        assert!(Verifier::new(&p, &relaxed).verify(&m).is_ok());
    }

    #[test]
    fn test_rejects_resource_overload() {
        let mut p = Project::new(2, 2, 1);
        p.define_activity(0, 2, None);
        p.define_activity(1, 2, None);
        p.alloc_resource(0, 0, 1);
        p.alloc_resource(1, 0, 1);
        let config = EncodingConfig::default();
        let err = Verifier::new(&p, &config)
            .verify(&paint(&p, &[0, 0]))
            .unwrap_err();
        assert_eq!(
            err,
            VerificationError::ResourceExceeded {
                resource: 0,
                slot: 0,
                load: 2,
                availability: 1
            }
        );
    }

    #[test]
    fn test_rejects_missed_fixed_start() {
        let mut p = Project::new(1, 3, 0);
        p.define_activity(0, 1, Some(0));
        let config = EncodingConfig::default().with_no_time_gaps(false);
        let err = Verifier::new(&p, &config)
            .verify(&paint(&p, &[2]))
            .unwrap_err();
        assert_eq!(
            err,
            VerificationError::FixedStartMissed {
                activity: 0,
                fixed: 0,
                start: 2
            }
        );
    }

    #[test]
    fn test_bounds_checked_only_with_pruning() {
        let mut p = Project::new(1, 3, 0);
        p.define_activity(0, 1, None);
        let bounds = vec![TimeBounds {
            earliest_start: 1,
            latest_start: 2,
            earliest_finish: 1,
            latest_finish: 2,
        }];
        let m = paint(&p, &[0]);
        let config = EncodingConfig::default();
        assert!(matches!(
            Verifier::new(&p, &config).with_bounds(&bounds).verify(&m),
            Err(VerificationError::OutsideBounds { activity: 0, .. })
        ));
        let unpruned = config.with_domain_pruning(false);
        assert!(Verifier::new(&p, &unpruned).with_bounds(&bounds).verify(&m).is_ok());
    }

    #[test]
    fn test_single_activity_fills_horizon() {
        let mut p = Project::new(1, 3, 0);
        p.define_activity(0, 3, None);
        let config = EncodingConfig::default();
        assert!(Verifier::new(&p, &config).verify(&paint(&p, &[0])).is_ok());
        // any other start overruns the horizon
        let mut m = paint(&p, &[0]);
        m.starts.set_value(0, 0, Some(false));
        m.starts.set_value(0, 1, Some(true));
        assert!(matches!(
            Verifier::new(&p, &config).verify(&m),
            Err(VerificationError::StartTooLate { start: 1, latest: 0, .. })
        ));
    }
}
