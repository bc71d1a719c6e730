//! RCPSP with generalized precedence relations, compiled to SAT.
//!
//! Decides whether a project (activities with fixed durations, strict
//! start/finish precedence relations, renewable resources, a discrete
//! horizon) has a schedule, by encoding it as a CNF formula over
//! time-indexed Boolean variables and handing it to a SAT engine. Every
//! model the engine returns is checked again, independently of the
//! clauses, before it becomes a [`models::Schedule`].
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Project`, `Activity`, `ActivitySequence`,
//!   `Resource`, `Schedule`
//! - **`validation`**: Definition checks (durations, references, horizon)
//! - **`precedence`**: Event graph cycle detection, critical path bounds
//! - **`sat`**: Variable matrices, CNF builder, DIMACS, SAT engines
//! - **`encoding`**: Conflict enumeration, clause families, solve pipeline
//! - **`verify`**: Post-solve verification of every constraint family
//! - **`report`**: Text grids and schedule summary
//! - **`generate`**: Seeded random instances
//!
//! # Example
//!
//! ```
//! use rcpsp_sat::encoding::{solve_project, EncodingConfig};
//! use rcpsp_sat::models::Project;
//! use rcpsp_sat::sat::SplrEngine;
//!
//! let mut project = Project::new(1, 3, 0);
//! project.define_activity(0, 3, None);
//! let outcome = solve_project(&mut project, EncodingConfig::default(), &SplrEngine, &mut ())
//!     .unwrap();
//! let schedule = outcome.schedule().unwrap();
//! assert_eq!((schedule.assignments[0].start, schedule.assignments[0].finish), (0, 2));
//! ```
//!
//! # References
//!
//! - Bartusch, Möhring & Radermacher (1988), "Scheduling project networks
//!   with resource constraints and time windows"
//! - Horbach (2010), "A Boolean satisfiability approach to the
//!   resource-constrained project scheduling problem"

pub mod encoding;
pub mod error;
pub mod generate;
pub mod models;
pub mod precedence;
pub mod report;
pub mod sat;
pub mod validation;
pub mod verify;

pub use encoding::{solve_project, EncodingConfig, ScheduleEncoding, SolveOutcome};
pub use error::{SchedulingError, SchedulingResult};
