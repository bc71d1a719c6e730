//! SAT engine boundary.
//!
//! An engine takes a [`CnfFormula`] and answers satisfiable with a model
//! covering every variable of the formula, or unsatisfiable.
//!
//! - [`SplrEngine`]: the linked CDCL solver.
//! - [`ExternalEngine`]: any binary following the minisat convention
//!   `<binary> <cnf-file> <result-file>`.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};
use splr::Certificate;

use super::dimacs::{parse_result, write_dimacs};
use super::{variable_of, CnfFormula, TruthValue};
use crate::error::{SchedulingError, SchedulingResult};

/// Answer of a SAT engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOutcome {
    /// Model indexed by `variable - 1`.
    Satisfiable(Vec<TruthValue>),
    Unsatisfiable,
}

impl EngineOutcome {
    pub fn is_satisfiable(&self) -> bool {
        matches!(self, EngineOutcome::Satisfiable(_))
    }

    pub fn model(&self) -> Option<&[TruthValue]> {
        match self {
            EngineOutcome::Satisfiable(m) => Some(m),
            EngineOutcome::Unsatisfiable => None,
        }
    }
}

/// A decision procedure for CNF formulas.
pub trait SatEngine {
    fn name(&self) -> &str;

    fn solve(&self, formula: &CnfFormula) -> SchedulingResult<EngineOutcome>;
}

/// Spreads signed literals over `variable_count` slots.
fn model_from_literals(literals: &[i32], variable_count: usize) -> Vec<TruthValue> {
    let mut model = vec![TruthValue::Unassigned; variable_count];
    for &lit in literals {
        let var = variable_of(lit);
        if (1..=variable_count).contains(&var) {
            model[var - 1] = TruthValue::of_literal(lit);
        }
    }
    model
}

/// In-process engine backed by `splr`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplrEngine;

impl SplrEngine {
    pub fn new() -> Self {
        Self
    }
}

impl SatEngine for SplrEngine {
    fn name(&self) -> &str {
        "splr"
    }

    fn solve(&self, formula: &CnfFormula) -> SchedulingResult<EngineOutcome> {
        let n = formula.variable_count();
        if formula.has_empty_clause() {
            return Ok(EngineOutcome::Unsatisfiable);
        }
        if formula.is_empty() {
            return Ok(EngineOutcome::Satisfiable(vec![TruthValue::Unassigned; n]));
        }

        debug!("splr: {} variables, {} clauses", n, formula.clause_count());
        let clauses: Vec<Vec<i32>> = formula.clauses().to_vec();
        match Certificate::try_from(clauses) {
            Ok(Certificate::SAT(literals)) => {
                Ok(EngineOutcome::Satisfiable(model_from_literals(&literals, n)))
            }
            Ok(Certificate::UNSAT) => Ok(EngineOutcome::Unsatisfiable),
            Err(e) => Err(SchedulingError::engine(format!("splr: {e:?}"))),
        }
    }
}

/// Engine that runs an external solver binary on temporary files.
#[derive(Debug, Clone)]
pub struct ExternalEngine {
    program: PathBuf,
    args: Vec<String>,
    work_dir: PathBuf,
}

impl ExternalEngine {
    /// Uses the system temporary directory for the exchange files.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            work_dir: std::env::temp_dir(),
        }
    }

    /// Extra arguments placed before the file names.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn exchange_files(&self) -> ExchangeFiles {
        let tag = std::process::id();
        ExchangeFiles {
            cnf: self.work_dir.join(format!("rcpsp-sat-{tag}.cnf")),
            result: self.work_dir.join(format!("rcpsp-sat-{tag}.res")),
        }
    }
}

/// Formula and result files of one external run, removed on drop.
struct ExchangeFiles {
    cnf: PathBuf,
    result: PathBuf,
}

impl Drop for ExchangeFiles {
    fn drop(&mut self) {
        for path in [&self.cnf, &self.result] {
            match fs::remove_file(path) {
                Err(e) if e.kind() != ErrorKind::NotFound => {
                    warn!("cannot remove {}: {e}", path.display());
                }
                _ => {}
            }
        }
    }
}

impl SatEngine for ExternalEngine {
    fn name(&self) -> &str {
        self.program
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("external")
    }

    fn solve(&self, formula: &CnfFormula) -> SchedulingResult<EngineOutcome> {
        let files = self.exchange_files();
        // a stale result from an earlier run must not be read back
        let _ = fs::remove_file(&files.result);
        write_dimacs(formula, BufWriter::new(File::create(&files.cnf)?))?;

        debug!(
            "running {} {:?} {} {}",
            self.program.display(),
            self.args,
            files.cnf.display(),
            files.result.display()
        );
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&files.cnf)
            .arg(&files.result)
            .status()
            .map_err(|e| {
                SchedulingError::engine(format!("cannot run {}: {e}", self.program.display()))
            })?;

        let file = File::open(&files.result).map_err(|e| {
            SchedulingError::engine(format!(
                "{} exited with {status} and left no result file: {e}",
                self.program.display()
            ))
        })?;
        Ok(parse_result(BufReader::new(file), formula.variable_count())?)
    }
}
