//! CNF clause store.
//!
//! Clauses are appended in emission order and never removed. The
//! implication combinators expand to the clauses of their CNF form:
//!
//! | combinator | CNF |
//! |------------|-----|
//! | `x → y` | `(¬x ∨ y)` |
//! | `x → ∧Y` | `(¬x ∨ yᵢ)` for each `i` |
//! | `x → ∨Y` | `(¬x ∨ y₁ ∨ … ∨ yₖ)` |
//! | `∧X → y` | `(¬x₁ ∨ … ∨ ¬xₖ ∨ y)` |
//! | `∨X → y` | `(¬xᵢ ∨ y)` for each `i` |

use super::engine::{EngineOutcome, SatEngine};
use super::{variable_of, Literal};
use crate::error::SchedulingResult;

/// How the literals of a group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    And,
    Or,
}

/// A formula in conjunctive normal form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CnfFormula {
    clauses: Vec<Vec<Literal>>,
    variable_count: usize,
}

impl CnfFormula {
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest variable id seen or reserved.
    #[inline]
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    #[inline]
    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    #[inline]
    pub fn clauses(&self) -> &[Vec<Literal>] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Whether the formula holds the empty clause.
    pub fn has_empty_clause(&self) -> bool {
        self.clauses.iter().any(Vec::is_empty)
    }

    /// Raises the variable count to at least `count`, so variables that
    /// appear in no clause still get a value slot in the model.
    pub fn reserve_variables(&mut self, count: usize) {
        self.variable_count = self.variable_count.max(count);
    }

    /// Appends a clause as is.
    ///
    /// # Panics
    /// On literal `0`.
    pub fn add_clause(&mut self, clause: Vec<Literal>) {
        for &lit in &clause {
            assert!(lit != 0, "literal 0 is not a variable");
            self.variable_count = self.variable_count.max(variable_of(lit));
        }
        self.clauses.push(clause);
    }

    pub fn unit(&mut self, x: Literal) {
        self.add_clause(vec![x]);
    }

    pub fn binary(&mut self, x: Literal, y: Literal) {
        self.add_clause(vec![x, y]);
    }

    pub fn ternary(&mut self, x: Literal, y: Literal, z: Literal) {
        self.add_clause(vec![x, y, z]);
    }

    /// `x → y`
    pub fn implies(&mut self, x: Literal, y: Literal) {
        self.binary(-x, y);
    }

    /// `x → op(group)`
    pub fn implies_group(&mut self, x: Literal, op: Connective, group: &[Literal]) {
        match op {
            Connective::And => {
                for &y in group {
                    self.binary(-x, y);
                }
            }
            Connective::Or => {
                let mut clause = Vec::with_capacity(group.len() + 1);
                clause.push(-x);
                clause.extend_from_slice(group);
                self.add_clause(clause);
            }
        }
    }

    /// `op(group) → y`
    pub fn group_implies(&mut self, op: Connective, group: &[Literal], y: Literal) {
        match op {
            Connective::And => {
                let mut clause: Vec<Literal> = group.iter().map(|&x| -x).collect();
                clause.push(y);
                self.add_clause(clause);
            }
            Connective::Or => {
                for &x in group {
                    self.binary(-x, y);
                }
            }
        }
    }

    /// `op1(left) → op2(right)`
    ///
    /// An `∧ → ∧` emits one clause per consequent literal; the other
    /// shapes reduce the antecedent first.
    pub fn groups_imply(
        &mut self,
        left_op: Connective,
        left: &[Literal],
        right_op: Connective,
        right: &[Literal],
    ) {
        match (left_op, right_op) {
            (Connective::And, Connective::And) => {
                for &y in right {
                    self.group_implies(Connective::And, left, y);
                }
            }
            (Connective::And, Connective::Or) => {
                let mut clause: Vec<Literal> = left.iter().map(|&x| -x).collect();
                clause.extend_from_slice(right);
                self.add_clause(clause);
            }
            (Connective::Or, op) => {
                for &x in left {
                    self.implies_group(x, op, right);
                }
            }
        }
    }

    /// `x ↔ y`
    pub fn equivalent(&mut self, x: Literal, y: Literal) {
        self.implies(x, y);
        self.implies(y, x);
    }

    /// `x ↔ op(group)`
    pub fn equivalent_group(&mut self, x: Literal, op: Connective, group: &[Literal]) {
        self.implies_group(x, op, group);
        self.group_implies(op, group, x);
    }

    /// `op1(left) ↔ op2(right)`
    pub fn groups_equivalent(
        &mut self,
        left_op: Connective,
        left: &[Literal],
        right_op: Connective,
        right: &[Literal],
    ) {
        self.groups_imply(left_op, left, right_op, right);
        self.groups_imply(right_op, right, left_op, left);
    }

    /// Exactly one literal of the group is true: one at-least-one clause
    /// plus pairwise at-most-one clauses. An empty group is unsatisfiable.
    pub fn exactly_one(&mut self, group: &[Literal]) {
        self.add_clause(group.to_vec());
        for (i, &x) in group.iter().enumerate() {
            for &y in &group[i + 1..] {
                self.binary(-x, -y);
            }
        }
    }

    /// Hands the formula to an engine.
    pub fn solve<E: SatEngine + ?Sized>(&self, engine: &E) -> SchedulingResult<EngineOutcome> {
        engine.solve(self)
    }
}
