//! Time-indexed SAT encoding of a project.
//!
//! # Pipeline
//!
//! 1. Validate the definition and reject precedence cycles.
//! 2. Enumerate the minimal resource conflicts (width checked here, so
//!    no variable is allocated for an unrepresentable resource).
//! 3. Compute critical path bounds.
//! 4. Allocate the `active`/`starts`/`finishes` matrices and emit every
//!    clause family.
//! 5. Solve, reload the matrices from the model and verify them
//!    independently before building the [`Schedule`].
//!
//! # Example
//!
//! ```
//! use rcpsp_sat::encoding::{ScheduleEncoding, SolveOutcome};
//! use rcpsp_sat::models::{Project, SequenceKind};
//! use rcpsp_sat::sat::SplrEngine;
//!
//! let mut project = Project::new(2, 4, 0);
//! project.define_activity(0, 2, None);
//! project.define_activity(1, 2, None);
//! project.define_sequence(0, 1, SequenceKind::FinishStart);
//!
//! let mut encoding = ScheduleEncoding::build(&project).unwrap();
//! match encoding.solve(&SplrEngine, &mut ()).unwrap() {
//!     SolveOutcome::Scheduled(schedule) => assert_eq!(schedule.makespan(), 4),
//!     SolveOutcome::Unsatisfiable => unreachable!(),
//! }
//! ```

mod clauses;
mod conflicts;
mod observer;

pub use conflicts::{ConflictPattern, ConflictSet, MAX_PARTICIPANTS};
pub use observer::{Both, LogObserver, Phase, SolveObserver, TimingObserver};

use std::time::Instant;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{SchedulingError, SchedulingResult};
use crate::models::{Project, Schedule, TimeBounds};
use crate::precedence::{check_sequences, CriticalPath};
use crate::sat::{CnfFormula, EngineOutcome, SatEngine, TimeMatrices, TruthValue};
use crate::validation::validate_project;
use crate::verify::Verifier;

use clauses::ClauseEmitter;

/// Switches for the optional clause families.
///
/// # Example
///
/// ```
/// use rcpsp_sat::encoding::EncodingConfig;
///
/// let config = EncodingConfig::default().with_no_time_gaps(false);
/// assert!(config.domain_pruning);
/// assert!(!config.no_time_gaps);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Force variables outside the critical path bounds to false.
    pub domain_pruning: bool,
    /// Forbid an idle slot (no activity active) followed by a busy one.
    pub no_time_gaps: bool,
    /// Emit sequencing clauses only for antecedent slots inside the
    /// critical path window. Only honoured with `domain_pruning`.
    pub tight_sequencing_windows: bool,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            domain_pruning: true,
            no_time_gaps: true,
            tight_sequencing_windows: true,
        }
    }
}

impl EncodingConfig {
    pub fn with_domain_pruning(mut self, enabled: bool) -> Self {
        self.domain_pruning = enabled;
        self
    }

    pub fn with_no_time_gaps(mut self, enabled: bool) -> Self {
        self.no_time_gaps = enabled;
        self
    }

    pub fn with_tight_sequencing_windows(mut self, enabled: bool) -> Self {
        self.tight_sequencing_windows = enabled;
        self
    }

    /// Whether sequencing antecedents are cut to the critical path windows.
    ///
    /// Without pruning an activity may sit outside its window, so the
    /// cut would lose clauses.
    #[inline]
    pub fn uses_tight_windows(&self) -> bool {
        self.tight_sequencing_windows && self.domain_pruning
    }
}

/// Result of solving an encoded project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// A verified schedule.
    Scheduled(Schedule),
    /// No schedule exists within the horizon.
    Unsatisfiable,
}

impl SolveOutcome {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, SolveOutcome::Scheduled(_))
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        match self {
            SolveOutcome::Scheduled(s) => Some(s),
            SolveOutcome::Unsatisfiable => None,
        }
    }
}

/// A project compiled to CNF, with the matrices its variables live in.
#[derive(Debug, Clone)]
pub struct ScheduleEncoding {
    project: Project,
    config: EncodingConfig,
    critical_path: CriticalPath,
    conflicts: Vec<ConflictSet>,
    matrices: TimeMatrices,
    formula: CnfFormula,
}

impl ScheduleEncoding {
    /// Encodes a project with the default configuration.
    pub fn build(project: &Project) -> SchedulingResult<Self> {
        Self::build_with(project, EncodingConfig::default())
    }

    /// Encodes a project.
    ///
    /// # Errors
    /// - [`SchedulingError::InvalidProject`] listing every definition problem
    /// - [`SchedulingError::PrecedenceCycle`] with the cyclic relations
    /// - [`SchedulingError::ResourceTooWide`] for an unrepresentable resource
    pub fn build_with(project: &Project, config: EncodingConfig) -> SchedulingResult<Self> {
        validate_project(project).map_err(SchedulingError::InvalidProject)?;
        if let Some(cycle) = check_sequences(project) {
            return Err(SchedulingError::PrecedenceCycle(cycle));
        }
        debug!(
            "project: {} activities, {} relations, {} resources, horizon {}",
            project.activity_count(),
            project.sequences.len(),
            project.resources.len(),
            project.horizon
        );

        let conflicts = project
            .resources
            .iter()
            .enumerate()
            .map(|(r, resource)| ConflictSet::enumerate(r, resource))
            .collect::<SchedulingResult<Vec<_>>>()?;
        debug!(
            "conflict patterns per resource: {:?}",
            conflicts.iter().map(ConflictSet::len).collect::<Vec<_>>()
        );

        let critical_path = CriticalPath::analyze(project);
        debug!(
            "critical path: minimum makespan {}, {} critical activities",
            critical_path.minimum_makespan(),
            critical_path.critical_activities().len()
        );
        if critical_path.minimum_makespan() > project.horizon as i64 {
            debug!("finish-start chains exceed the horizon, formula is unsatisfiable");
        }

        let matrices = TimeMatrices::build(project.activity_count(), project.horizon);
        let mut formula = CnfFormula::new();
        formula.reserve_variables(matrices.variable_count());

        let emitted = ClauseEmitter {
            project,
            matrices: &matrices,
            bounds: critical_path.bounds(),
            config: &config,
            formula: &mut formula,
        }
        .emit_all(&conflicts);
        info!(
            "encoded {} variables, {} clauses",
            formula.variable_count(),
            emitted
        );

        Ok(Self {
            project: project.clone(),
            config,
            critical_path,
            conflicts,
            matrices,
            formula,
        })
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn config(&self) -> &EncodingConfig {
        &self.config
    }

    pub fn formula(&self) -> &CnfFormula {
        &self.formula
    }

    /// Matrices, holding the last decoded model if any.
    pub fn matrices(&self) -> &TimeMatrices {
        &self.matrices
    }

    pub fn critical_path(&self) -> &CriticalPath {
        &self.critical_path
    }

    /// Critical path bounds per activity.
    pub fn bounds(&self) -> &[TimeBounds] {
        self.critical_path.bounds()
    }

    /// Conflict sets per resource.
    pub fn conflicts(&self) -> &[ConflictSet] {
        &self.conflicts
    }

    /// Loads a model into the matrices and verifies it.
    ///
    /// # Errors
    /// [`SchedulingError::Verification`] if any constraint family fails.
    pub fn decode(&mut self, model: &[TruthValue]) -> SchedulingResult<Schedule> {
        self.matrices.load_solution(model);
        let times = Verifier::new(&self.project, &self.config)
            .with_bounds(self.critical_path.bounds())
            .verify(&self.matrices)?;
        Ok(Schedule::from_resolved(self.project.horizon, &times))
    }

    /// Solves the formula and decodes the model.
    pub fn solve<E, O>(&mut self, engine: &E, observer: &mut O) -> SchedulingResult<SolveOutcome>
    where
        E: SatEngine + ?Sized,
        O: SolveObserver + ?Sized,
    {
        observer.formula_built(self.formula.variable_count(), self.formula.clause_count());

        observer.phase_started(Phase::Solve);
        let started = Instant::now();
        let outcome = self.formula.solve(engine)?;
        observer.phase_finished(Phase::Solve, started.elapsed());
        observer.solved(outcome.is_satisfiable());

        let model = match outcome {
            EngineOutcome::Satisfiable(model) => model,
            EngineOutcome::Unsatisfiable => {
                info!("{}: no schedule within horizon {}", engine.name(), self.project.horizon);
                return Ok(SolveOutcome::Unsatisfiable);
            }
        };

        observer.phase_started(Phase::Verify);
        let started = Instant::now();
        let schedule = self.decode(&model)?;
        observer.phase_finished(Phase::Verify, started.elapsed());
        debug!("schedule verified, makespan {}", schedule.makespan());
        Ok(SolveOutcome::Scheduled(schedule))
    }
}

/// Encodes, solves and verifies a project, recording critical path bounds
/// and resolved times on its activities.
pub fn solve_project<E, O>(
    project: &mut Project,
    config: EncodingConfig,
    engine: &E,
    observer: &mut O,
) -> SchedulingResult<SolveOutcome>
where
    E: SatEngine + ?Sized,
    O: SolveObserver + ?Sized,
{
    observer.phase_started(Phase::Encode);
    let started = Instant::now();
    let mut encoding = ScheduleEncoding::build_with(project, config)?;
    observer.phase_finished(Phase::Encode, started.elapsed());
    project.record_bounds(encoding.bounds());

    let outcome = encoding.solve(engine, observer)?;
    if let SolveOutcome::Scheduled(schedule) = &outcome {
        project.record_resolution(&schedule.resolved_times());
    }
    Ok(outcome)
}
