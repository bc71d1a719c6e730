//! Crate error type.
//!
//! Structural problems (incomplete definitions, precedence cycles,
//! unrepresentable resources) are detected before any SAT variable is
//! allocated. An unsatisfiable instance is not an error; see
//! [`SolveOutcome`](crate::encoding::SolveOutcome).

use thiserror::Error;

use crate::precedence::PrecedenceCycle;
use crate::sat::DimacsError;
use crate::validation::ValidationError;
use crate::verify::VerificationError;

pub type SchedulingResult<T> = Result<T, SchedulingError>;

#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("invalid project definition: {}", join_messages(.0))]
    InvalidProject(Vec<ValidationError>),
    #[error("precedence relations form a cycle: {0}")]
    PrecedenceCycle(PrecedenceCycle),
    #[error(
        "resource {resource} is used by {participants} activities, conflict patterns hold at most {limit}"
    )]
    ResourceTooWide {
        resource: usize,
        participants: usize,
        limit: usize,
    },
    #[error("model failed verification, the encoding and the SAT engine disagree: {0}")]
    Verification(#[from] VerificationError),
    #[error("SAT engine failure: {0}")]
    Engine(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed DIMACS input: {0}")]
    Dimacs(#[from] DimacsError),
}

impl SchedulingError {
    pub(crate) fn engine(message: impl std::fmt::Display) -> Self {
        Self::Engine(message.to_string())
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
