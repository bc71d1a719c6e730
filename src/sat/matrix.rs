//! Time-indexed Boolean variable matrices.
//!
//! A [`VariableMatrix`] reserves `rows * cols` consecutive variable ids in
//! row-major order starting at a base id. Cells also hold the value read
//! back from a model (`None` before solving or when unassigned).

use super::{Literal, TruthValue};

/// A grid of propositional variables with their solved values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableMatrix {
    base: Literal,
    rows: usize,
    cols: usize,
    values: Vec<Option<bool>>,
}

impl VariableMatrix {
    /// Reserves `rows * cols` ids starting at `base`.
    ///
    /// # Panics
    /// If `base < 1` or the ids would exceed the literal range.
    pub fn build(base: Literal, rows: usize, cols: usize) -> Self {
        assert!(base >= 1, "variable ids start at 1, got base {base}");
        let cells = rows
            .checked_mul(cols)
            .and_then(|c| Literal::try_from(c).ok())
            .and_then(|c| base.checked_add(c));
        assert!(cells.is_some(), "{rows}x{cols} matrix at base {base} exceeds the literal range");
        Self {
            base,
            rows,
            cols,
            values: vec![None; rows * cols],
        }
    }

    #[inline]
    pub fn base(&self) -> Literal {
        self.base
    }

    /// First id after this matrix.
    #[inline]
    pub fn next_free(&self) -> Literal {
        self.base + (self.rows * self.cols) as Literal
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({row}, {col}) outside {}x{} matrix",
            self.rows,
            self.cols
        );
        row * self.cols + col
    }

    /// Variable id of a cell.
    ///
    /// # Panics
    /// If the cell is out of range.
    #[inline]
    pub fn variable(&self, row: usize, col: usize) -> Literal {
        self.base + self.offset(row, col) as Literal
    }

    /// Variable ids of a row, in column order.
    pub fn row(&self, row: usize) -> Vec<Literal> {
        (0..self.cols).map(|c| self.variable(row, c)).collect()
    }

    /// Variable ids of a column, in row order.
    pub fn column(&self, col: usize) -> Vec<Literal> {
        (0..self.rows).map(|r| self.variable(r, col)).collect()
    }

    /// Copies cell values from an assignment indexed by `variable - 1`.
    ///
    /// Cells whose variable lies beyond the assignment become `None`.
    pub fn load_solution(&mut self, assignment: &[TruthValue]) {
        let first = (self.base - 1) as usize;
        for (i, value) in self.values.iter_mut().enumerate() {
            *value = assignment.get(first + i).and_then(|v| v.as_bool());
        }
    }

    /// Solved value of a cell.
    #[inline]
    pub fn value(&self, row: usize, col: usize) -> Option<bool> {
        self.values[self.offset(row, col)]
    }

    /// Whether a cell is true in the loaded model.
    #[inline]
    pub fn is_set(&self, row: usize, col: usize) -> bool {
        self.value(row, col) == Some(true)
    }

    /// Overrides a cell value.
    pub fn set_value(&mut self, row: usize, col: usize, value: Option<bool>) {
        let offset = self.offset(row, col);
        self.values[offset] = value;
    }

    /// Columns of a row that are true.
    pub fn set_columns(&self, row: usize) -> Vec<usize> {
        (0..self.cols).filter(|&c| self.is_set(row, c)).collect()
    }
}

/// The three (activity × slot) matrices of the scheduling encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeMatrices {
    /// Activity occupies the slot.
    pub active: VariableMatrix,
    /// Activity starts at the slot.
    pub starts: VariableMatrix,
    /// Activity finishes at the slot.
    pub finishes: VariableMatrix,
}

/// Most variables the three matrices can reserve while the next free id
/// is still a literal.
pub const MAX_VARIABLES: usize = Literal::MAX as usize - 1;

impl TimeMatrices {
    /// Variables needed for a project, `None` past [`MAX_VARIABLES`].
    pub fn required_variables(activities: usize, horizon: usize) -> Option<usize> {
        activities
            .checked_mul(horizon)?
            .checked_mul(3)
            .filter(|&count| count <= MAX_VARIABLES)
    }

    /// Allocates `active`, `starts` and `finishes` back to back from id 1.
    pub fn build(activities: usize, horizon: usize) -> Self {
        let active = VariableMatrix::build(1, activities, horizon);
        let starts = VariableMatrix::build(active.next_free(), activities, horizon);
        let finishes = VariableMatrix::build(starts.next_free(), activities, horizon);
        Self {
            active,
            starts,
            finishes,
        }
    }

    /// Number of variables reserved by the three matrices.
    pub fn variable_count(&self) -> usize {
        (self.finishes.next_free() - 1) as usize
    }

    pub fn load_solution(&mut self, assignment: &[TruthValue]) {
        self.active.load_solution(assignment);
        self.starts.load_solution(assignment);
        self.finishes.load_solution(assignment);
    }
}
