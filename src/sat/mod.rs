//! Propositional layer.
//!
//! Variables are numbered from 1 and literals are signed integers
//! (negative = negated), the DIMACS convention shared with the SAT
//! engines this crate talks to.
//!
//! - **`matrix`**: (activity × time slot) grids of fresh variables
//! - **`formula`**: append-only clause store with implication combinators
//! - **`dimacs`**: CNF and result text formats
//! - **`engine`**: the SAT engine boundary and its implementations

mod dimacs;
mod engine;
mod formula;
mod matrix;

pub use dimacs::{parse_dimacs, parse_result, to_dimacs_string, write_dimacs, write_result, DimacsError};
pub use engine::{EngineOutcome, ExternalEngine, SatEngine, SplrEngine};
pub use formula::{CnfFormula, Connective};
pub use matrix::{TimeMatrices, VariableMatrix, MAX_VARIABLES};

/// A signed DIMACS literal.
pub type Literal = i32;

/// Value of a variable in an engine's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TruthValue {
    True,
    False,
    /// The engine left the variable unconstrained.
    Unassigned,
}

impl TruthValue {
    /// Value a literal gives its variable.
    #[inline]
    pub fn of_literal(literal: Literal) -> Self {
        if literal > 0 {
            TruthValue::True
        } else {
            TruthValue::False
        }
    }

    #[inline]
    pub fn as_bool(self) -> Option<bool> {
        match self {
            TruthValue::True => Some(true),
            TruthValue::False => Some(false),
            TruthValue::Unassigned => None,
        }
    }
}

/// Variable of a literal.
#[inline]
pub fn variable_of(literal: Literal) -> usize {
    literal.unsigned_abs() as usize
}
