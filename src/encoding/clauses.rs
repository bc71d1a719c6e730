//! Clause families of the time-indexed encoding.
//!
//! With horizon `T` and duration `d`, an activity may start in
//! `0..=T-d` and finish in `d-1..T`. `A`, `S` and `F` below are the
//! active, starts and finishes matrices.

use log::trace;

use super::conflicts::ConflictSet;
use super::EncodingConfig;
use crate::models::{ActivitySequence, Event, Project, TimeBounds};
use crate::sat::{CnfFormula, Connective, Literal, TimeMatrices, VariableMatrix};

/// Inclusive slot window, empty when `first > last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Window {
    pub first: i64,
    pub last: i64,
}

impl Window {
    pub fn slots(self) -> impl Iterator<Item = usize> {
        (self.first.max(0)..=self.last).map(|t| t as usize)
    }

    pub fn intersect(self, other: Window) -> Window {
        Window {
            first: self.first.max(other.first),
            last: self.last.min(other.last),
        }
    }
}

/// Writes the clause families of one project into a formula.
pub(crate) struct ClauseEmitter<'a> {
    pub project: &'a Project,
    pub matrices: &'a TimeMatrices,
    pub bounds: &'a [TimeBounds],
    pub config: &'a EncodingConfig,
    pub formula: &'a mut CnfFormula,
}

impl ClauseEmitter<'_> {
    #[inline]
    fn horizon(&self) -> usize {
        self.project.horizon
    }

    #[inline]
    fn duration(&self, activity: usize) -> usize {
        self.project.activities[activity].length()
    }

    /// Slots where an activity may start, from its duration alone.
    pub fn start_window(&self, activity: usize) -> Window {
        Window {
            first: 0,
            last: self.horizon() as i64 - self.duration(activity) as i64,
        }
    }

    /// Slots where an activity may finish, from its duration alone.
    pub fn finish_window(&self, activity: usize) -> Window {
        Window {
            first: self.duration(activity) as i64 - 1,
            last: self.horizon() as i64 - 1,
        }
    }

    fn event_matrix(&self, event: Event) -> &VariableMatrix {
        match event {
            Event::Start => &self.matrices.starts,
            Event::Finish => &self.matrices.finishes,
        }
    }

    /// Emits every family in order and returns the clause count.
    pub fn emit_all(&mut self, conflicts: &[ConflictSet]) -> usize {
        let before = self.formula.clause_count();
        let families: [(&str, usize); 9] = [
            ("unique events", self.unique_events()),
            ("duration bounds", self.duration_bounds()),
            ("start/finish coupling", self.start_finish_coupling()),
            ("no time gaps", self.no_time_gaps()),
            ("active patterns", self.active_patterns()),
            ("sequencing", self.sequencing()),
            ("pre-scheduled", self.pre_scheduled()),
            ("resources", self.resources(conflicts)),
            ("domain pruning", self.domain_pruning()),
        ];
        for (name, count) in families {
            trace!("{name}: {count} clauses");
        }
        self.formula.clause_count() - before
    }

    /// Exactly one start slot and exactly one finish slot per activity.
    pub fn unique_events(&mut self) -> usize {
        let before = self.formula.clause_count();
        for a in 0..self.project.activity_count() {
            self.formula.exactly_one(&self.matrices.starts.row(a));
            self.formula.exactly_one(&self.matrices.finishes.row(a));
        }
        self.formula.clause_count() - before
    }

    /// No start after `T-d`, no finish before `d-1`.
    pub fn duration_bounds(&mut self) -> usize {
        let before = self.formula.clause_count();
        for a in 0..self.project.activity_count() {
            let starts = self.start_window(a);
            let finishes = self.finish_window(a);
            for t in 0..self.horizon() {
                let t_ = t as i64;
                if t_ > starts.last {
                    self.formula.unit(-self.matrices.starts.variable(a, t));
                }
                if t_ < finishes.first {
                    self.formula.unit(-self.matrices.finishes.variable(a, t));
                }
            }
        }
        self.formula.clause_count() - before
    }

    /// `S[t] → F[t+d-1]`
    pub fn start_finish_coupling(&mut self) -> usize {
        let before = self.formula.clause_count();
        for a in 0..self.project.activity_count() {
            let d = self.duration(a);
            for t in self.start_window(a).slots() {
                self.formula.implies(
                    self.matrices.starts.variable(a, t),
                    self.matrices.finishes.variable(a, t + d - 1),
                );
            }
        }
        self.formula.clause_count() - before
    }

    /// Once a slot is idle for every activity, the next one is too.
    pub fn no_time_gaps(&mut self) -> usize {
        let n = self.project.activity_count();
        if !self.config.no_time_gaps || n == 0 {
            return 0;
        }
        let before = self.formula.clause_count();
        for t in 0..self.horizon().saturating_sub(1) {
            let idle_now: Vec<Literal> = (0..n)
                .map(|a| -self.matrices.active.variable(a, t))
                .collect();
            let idle_next: Vec<Literal> = (0..n)
                .map(|a| -self.matrices.active.variable(a, t + 1))
                .collect();
            self.formula
                .groups_imply(Connective::And, &idle_now, Connective::And, &idle_next);
        }
        self.formula.clause_count() - before
    }

    /// `S[s]` fixes the whole active row: true on `s..s+d`, false elsewhere.
    pub fn active_patterns(&mut self) -> usize {
        let before = self.formula.clause_count();
        for a in 0..self.project.activity_count() {
            let d = self.duration(a);
            let row = self.matrices.active.row(a);
            let mut pattern: Vec<Literal> = row
                .iter()
                .enumerate()
                .map(|(t, &v)| if t < d { v } else { -v })
                .collect();
            for s in self.start_window(a).slots() {
                if s > 0 {
                    // slide the window by one slot
                    pattern[s - 1] = -row[s - 1];
                    pattern[s + d - 1] = row[s + d - 1];
                }
                self.formula.implies_group(
                    self.matrices.starts.variable(a, s),
                    Connective::And,
                    &pattern,
                );
            }
        }
        self.formula.clause_count() - before
    }

    /// Antecedent window of a relation's first event.
    fn antecedent_window(&self, activity: usize, event: Event) -> Window {
        let base = match event {
            Event::Start => self.start_window(activity),
            Event::Finish => self.finish_window(activity),
        };
        if !self.config.uses_tight_windows() {
            return base;
        }
        let Some(b) = self.bounds.get(activity) else {
            return base;
        };
        let critical = match event {
            Event::Start => Window {
                first: b.earliest_start,
                last: b.latest_start,
            },
            Event::Finish => Window {
                first: b.earliest_finish,
                last: b.latest_finish,
            },
        };
        base.intersect(critical)
    }

    /// Emits one relation: the first event at `t1` forbids the second
    /// event at any `t2 <= t1`.
    pub fn sequence(&mut self, sequence: &ActivitySequence) -> usize {
        let before = self.formula.clause_count();
        let from = sequence.kind.from_event();
        let to = sequence.kind.to_event();
        let window = self.antecedent_window(sequence.first, from);
        let targets = self.event_matrix(to).row(sequence.second);
        let antecedents = self.event_matrix(from).row(sequence.first);

        for t1 in window.slots() {
            let forbidden: Vec<Literal> = targets[..=t1].iter().map(|&v| -v).collect();
            self.formula
                .implies_group(antecedents[t1], Connective::And, &forbidden);
        }
        self.formula.clause_count() - before
    }

    pub fn sequencing(&mut self) -> usize {
        let project = self.project;
        project.sequences.iter().map(|s| self.sequence(s)).sum()
    }

    /// Fixed starts as unit clauses.
    pub fn pre_scheduled(&mut self) -> usize {
        let before = self.formula.clause_count();
        for (a, activity) in self.project.activities.iter().enumerate() {
            if let Some(start) = activity.fixed_start {
                self.formula.unit(self.matrices.starts.variable(a, start));
            }
        }
        self.formula.clause_count() - before
    }

    /// One clause per conflict pattern and slot.
    pub fn resources(&mut self, conflicts: &[ConflictSet]) -> usize {
        let before = self.formula.clause_count();
        for set in conflicts {
            for &pattern in set.patterns() {
                let members = set.activities(pattern);
                for t in 0..self.horizon() {
                    let clause = members
                        .iter()
                        .map(|&a| -self.matrices.active.variable(a, t))
                        .collect();
                    self.formula.add_clause(clause);
                }
            }
        }
        self.formula.clause_count() - before
    }

    /// Forces variables outside the critical path bounds to false.
    pub fn domain_pruning(&mut self) -> usize {
        if !self.config.domain_pruning {
            return 0;
        }
        let before = self.formula.clause_count();
        for (a, b) in self.bounds.iter().enumerate() {
            for t in 0..self.horizon() {
                let t_ = t as i64;
                let start = self.matrices.starts.variable(a, t);
                let finish = self.matrices.finishes.variable(a, t);
                let active = self.matrices.active.variable(a, t);
                if t_ < b.earliest_start {
                    self.formula.unit(-start);
                    self.formula.unit(-active);
                }
                if t_ > b.latest_start {
                    self.formula.unit(-start);
                }
                if t_ < b.earliest_finish {
                    self.formula.unit(-finish);
                }
                if t_ > b.latest_finish {
                    self.formula.unit(-finish);
                    self.formula.unit(-active);
                }
            }
        }
        self.formula.clause_count() - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SequenceKind;
    use crate::precedence::CriticalPath;

    struct Fixture {
        project: Project,
        matrices: TimeMatrices,
        bounds: Vec<TimeBounds>,
        config: EncodingConfig,
        formula: CnfFormula,
    }

    impl Fixture {
        fn new(project: Project) -> Self {
            let matrices = TimeMatrices::build(project.activity_count(), project.horizon);
            let bounds = CriticalPath::analyze(&project).into_bounds();
            Self {
                project,
                matrices,
                bounds,
                config: EncodingConfig::default(),
                formula: CnfFormula::new(),
            }
        }

        fn emitter(&mut self) -> ClauseEmitter<'_> {
            ClauseEmitter {
                project: &self.project,
                matrices: &self.matrices,
                bounds: &self.bounds,
                config: &self.config,
                formula: &mut self.formula,
            }
        }
    }

    fn single(duration: usize, horizon: usize) -> Project {
        let mut p = Project::new(1, horizon, 0);
        p.define_activity(0, duration, None);
        p
    }

    #[test]
    fn test_windows() {
        let mut f = Fixture::new(single(2, 5));
        let e = f.emitter();
        assert_eq!(e.start_window(0), Window { first: 0, last: 3 });
        assert_eq!(e.finish_window(0), Window { first: 1, last: 4 });
        let w = Window { first: -2, last: 1 };
        assert_eq!(w.slots().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(Window { first: 3, last: 2 }.slots().count(), 0);
    }

    #[test]
    fn test_unique_events_count() {
        // per row: 1 + C(4, 2) clauses
        let mut f = Fixture::new(single(2, 4));
        assert_eq!(f.emitter().unique_events(), 14);
    }

    #[test]
    fn test_duration_bounds_units() {
        let mut f = Fixture::new(single(3, 4));
        let n = f.emitter().duration_bounds();
        let s = |t| f.matrices.starts.variable(0, t);
        let fin = |t| f.matrices.finishes.variable(0, t);
        // starts 2, 3 and finishes 0, 1 are forbidden
        assert_eq!(n, 4);
        let clauses = f.formula.clauses();
        assert!(clauses.contains(&vec![-s(2)]));
        assert!(clauses.contains(&vec![-s(3)]));
        assert!(clauses.contains(&vec![-fin(0)]));
        assert!(clauses.contains(&vec![-fin(1)]));
    }

    #[test]
    fn test_coupling_pairs() {
        let mut f = Fixture::new(single(2, 3));
        f.emitter().start_finish_coupling();
        let m = &f.matrices;
        assert_eq!(
            f.formula.clauses(),
            &[
                vec![-m.starts.variable(0, 0), m.finishes.variable(0, 1)],
                vec![-m.starts.variable(0, 1), m.finishes.variable(0, 2)],
            ]
        );
    }

    #[test]
    fn test_active_pattern_slides() {
        let mut f = Fixture::new(single(2, 4));
        f.emitter().active_patterns();
        let m = &f.matrices;
        let a = |t| m.active.variable(0, t);
        // three starts, four slots each
        assert_eq!(f.formula.clause_count(), 12);
        let s1 = m.starts.variable(0, 1);
        let expected: Vec<Vec<Literal>> = vec![
            vec![-s1, -a(0)],
            vec![-s1, a(1)],
            vec![-s1, a(2)],
            vec![-s1, -a(3)],
        ];
        assert_eq!(&f.formula.clauses()[4..8], expected.as_slice());
    }

    #[test]
    fn test_no_time_gaps_shape_and_switch() {
        let mut p = Project::new(2, 3, 0);
        p.define_activity(0, 1, None);
        p.define_activity(1, 1, None);
        let mut f = Fixture::new(p);
        // two slot pairs, one clause per consequent activity
        assert_eq!(f.emitter().no_time_gaps(), 4);
        let a = |x, t| f.matrices.active.variable(x, t);
        assert_eq!(f.formula.clauses()[0], vec![a(0, 0), a(1, 0), -a(0, 1)]);

        f.config = EncodingConfig::default().with_no_time_gaps(false);
        assert_eq!(f.emitter().no_time_gaps(), 0);
    }

    #[test]
    fn test_finish_start_sequence() {
        let mut p = Project::new(2, 4, 0);
        p.define_activity(0, 2, None);
        p.define_activity(1, 2, None);
        p.define_sequence(0, 1, SequenceKind::FinishStart);
        let mut f = Fixture::new(p);
        f.config = EncodingConfig::default().with_tight_sequencing_windows(false);
        let seq = f.project.sequences[0];
        let n = f.emitter().sequence(&seq);
        // finishes 1..=3 of the first activity, forbidding starts 0..=t1
        assert_eq!(n, 2 + 3 + 4);
        let fin = f.matrices.finishes.variable(0, 1);
        let s = |t| f.matrices.starts.variable(1, t);
        assert!(f.formula.clauses().contains(&vec![-fin, -s(0)]));
        assert!(f.formula.clauses().contains(&vec![-fin, -s(1)]));
    }

    #[test]
    fn test_tight_window_restricts_antecedents() {
        let mut p = Project::new(2, 4, 0);
        p.define_activity(0, 2, None);
        p.define_activity(1, 2, None);
        p.define_sequence(0, 1, SequenceKind::FinishStart);
        let mut f = Fixture::new(p);
        let seq = f.project.sequences[0];
        // critical path pins the first finish to slot 1
        assert_eq!(f.emitter().sequence(&seq), 2);

        // tight windows need pruning to stay sound
        f.config = EncodingConfig::default().with_domain_pruning(false);
        assert_eq!(f.emitter().sequence(&seq), 9);
    }

    #[test]
    fn test_pre_scheduled_unit() {
        let mut p = Project::new(1, 5, 0);
        p.define_activity(0, 1, Some(3));
        let mut f = Fixture::new(p);
        assert_eq!(f.emitter().pre_scheduled(), 1);
        assert_eq!(
            f.formula.clauses()[0],
            vec![f.matrices.starts.variable(0, 3)]
        );
    }

    #[test]
    fn test_resource_clauses_per_slot() {
        let mut p = Project::new(3, 2, 1);
        for a in 0..3 {
            p.define_activity(a, 1, None);
        }
        p.alloc_resource(0, 0, 1);
        p.alloc_resource(2, 0, 1);
        let conflicts = vec![ConflictSet::enumerate(0, &p.resources[0]).unwrap()];
        let mut f = Fixture::new(p);
        assert_eq!(f.emitter().resources(&conflicts), 2);
        let a = |x, t| f.matrices.active.variable(x, t);
        assert_eq!(f.formula.clauses()[1], vec![-a(0, 1), -a(2, 1)]);
    }

    #[test]
    fn test_domain_pruning_units() {
        let mut p = Project::new(2, 4, 0);
        p.define_activity(0, 2, None);
        p.define_activity(1, 2, None);
        p.define_sequence(0, 1, SequenceKind::FinishStart);
        let mut f = Fixture::new(p);
        let n = f.emitter().domain_pruning();
        assert!(n > 0);
        let clauses = f.formula.clauses().to_vec();
        let m = &f.matrices;
        // second activity cannot start or run before slot 2
        assert!(clauses.contains(&vec![-m.starts.variable(1, 1)]));
        assert!(clauses.contains(&vec![-m.active.variable(1, 0)]));
        // first activity cannot run after slot 1
        assert!(clauses.contains(&vec![-m.active.variable(0, 2)]));

        f.config = EncodingConfig::default().with_domain_pruning(false);
        assert_eq!(f.emitter().domain_pruning(), 0);
    }
}
