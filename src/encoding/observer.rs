//! Phase observers for the solve pipeline.
//!
//! The pipeline reports each phase boundary to an injected
//! [`SolveObserver`] instead of touching process-wide state. `()` is the
//! silent observer.

use std::time::Duration;

use log::{debug, info};

/// Pipeline phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Validation, cycle check, critical path, conflicts and clause emission.
    Encode,
    /// The SAT engine call.
    Solve,
    /// Model decoding and verification.
    Verify,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Encode => "encode",
            Phase::Solve => "solve",
            Phase::Verify => "verify",
        }
    }
}

/// Receives phase boundaries of one solve.
pub trait SolveObserver {
    fn phase_started(&mut self, _phase: Phase) {}

    fn phase_finished(&mut self, _phase: Phase, _elapsed: Duration) {}

    /// Called once the formula is complete, before solving.
    fn formula_built(&mut self, _variables: usize, _clauses: usize) {}

    /// Called with the engine's verdict.
    fn solved(&mut self, _satisfiable: bool) {}
}

impl SolveObserver for () {}

/// Observer writing phase boundaries to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl SolveObserver for LogObserver {
    fn phase_started(&mut self, phase: Phase) {
        debug!("{} started", phase.name());
    }

    fn phase_finished(&mut self, phase: Phase, elapsed: Duration) {
        debug!("{} finished in {:.3}s", phase.name(), elapsed.as_secs_f64());
    }

    fn formula_built(&mut self, variables: usize, clauses: usize) {
        info!("formula: {variables} variables, {clauses} clauses");
    }

    fn solved(&mut self, satisfiable: bool) {
        info!(
            "engine answer: {}",
            if satisfiable { "satisfiable" } else { "unsatisfiable" }
        );
    }
}

/// Observer accumulating time spent per phase.
#[derive(Debug, Clone, Default)]
pub struct TimingObserver {
    timings: Vec<(Phase, Duration)>,
}

impl TimingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time spent in a phase (summed if it ran more than once).
    pub fn time_in(&self, phase: Phase) -> Duration {
        self.timings
            .iter()
            .filter(|(p, _)| *p == phase)
            .map(|(_, d)| *d)
            .sum()
    }

    pub fn solver_time(&self) -> Duration {
        self.time_in(Phase::Solve)
    }

    pub fn total_time(&self) -> Duration {
        self.timings.iter().map(|(_, d)| *d).sum()
    }

    pub fn timings(&self) -> &[(Phase, Duration)] {
        &self.timings
    }
}

impl SolveObserver for TimingObserver {
    fn phase_finished(&mut self, phase: Phase, elapsed: Duration) {
        self.timings.push((phase, elapsed));
    }
}

/// Forwards every event to two observers.
#[derive(Debug)]
pub struct Both<A, B>(pub A, pub B);

impl<A: SolveObserver, B: SolveObserver> SolveObserver for Both<A, B> {
    fn phase_started(&mut self, phase: Phase) {
        self.0.phase_started(phase);
        self.1.phase_started(phase);
    }

    fn phase_finished(&mut self, phase: Phase, elapsed: Duration) {
        self.0.phase_finished(phase, elapsed);
        self.1.phase_finished(phase, elapsed);
    }

    fn formula_built(&mut self, variables: usize, clauses: usize) {
        self.0.formula_built(variables, clauses);
        self.1.formula_built(variables, clauses);
    }

    fn solved(&mut self, satisfiable: bool) {
        self.0.solved(satisfiable);
        self.1.solved(satisfiable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_observer_sums_phases() {
        let mut t = TimingObserver::new();
        t.phase_finished(Phase::Encode, Duration::from_millis(5));
        t.phase_finished(Phase::Solve, Duration::from_millis(7));
        t.phase_finished(Phase::Solve, Duration::from_millis(3));
        assert_eq!(t.solver_time(), Duration::from_millis(10));
        assert_eq!(t.total_time(), Duration::from_millis(15));
        assert_eq!(t.time_in(Phase::Verify), Duration::ZERO);
    }

    #[test]
    fn test_both_forwards() {
        let mut both = Both(TimingObserver::new(), TimingObserver::new());
        both.phase_finished(Phase::Verify, Duration::from_millis(2));
        assert_eq!(both.0.time_in(Phase::Verify), Duration::from_millis(2));
        assert_eq!(both.1.time_in(Phase::Verify), Duration::from_millis(2));
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(Phase::Encode.name(), "encode");
        assert_eq!(Phase::Solve.name(), "solve");
        assert_eq!(Phase::Verify.name(), "verify");
    }
}
