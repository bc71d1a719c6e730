//! DIMACS CNF and solver result text formats.
//!
//! CNF: `c` comment lines, a `p cnf <variables> <clauses>` header, then
//! whitespace-separated literals with each clause closed by `0`. A `%`
//! line ends the formula early (SATLIB benchmark files carry one).
//!
//! Result: first line `SAT` or `UNSAT`; after `SAT`, the model as signed
//! literals terminated by `0`.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use super::engine::EngineOutcome;
use super::{variable_of, CnfFormula, Literal, TruthValue};

/// Malformed DIMACS or result text.
#[derive(Error, Debug)]
pub enum DimacsError {
    #[error("missing 'p cnf' header")]
    MissingHeader,

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("line {line}: invalid literal '{token}'")]
    InvalidLiteral { line: usize, token: String },

    #[error("literal {literal} exceeds the declared {declared} variables")]
    LiteralOutOfRange { literal: Literal, declared: usize },

    #[error("header declares {declared} clauses, found {found}")]
    ClauseCountMismatch { declared: usize, found: usize },

    #[error("last clause is not terminated by 0")]
    UnterminatedClause,

    #[error("unknown result status '{0}'")]
    UnknownStatus(String),

    #[error("satisfiable result without a model")]
    MissingModel,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Writes a formula in DIMACS CNF.
pub fn write_dimacs<W: Write>(formula: &CnfFormula, mut out: W) -> io::Result<()> {
    writeln!(out, "p cnf {} {}", formula.variable_count(), formula.clause_count())?;
    for clause in formula.clauses() {
        for lit in clause {
            write!(out, "{lit} ")?;
        }
        writeln!(out, "0")?;
    }
    out.flush()
}

/// DIMACS text of a formula.
pub fn to_dimacs_string(formula: &CnfFormula) -> String {
    let mut buf = Vec::new();
    // writing into a Vec cannot fail
    let _ = write_dimacs(formula, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn parse_literal(token: &str, line: usize) -> Result<Literal, DimacsError> {
    token.parse::<Literal>().map_err(|_| DimacsError::InvalidLiteral {
        line,
        token: token.to_string(),
    })
}

/// Reads a DIMACS CNF formula.
///
/// The variable count is the header's, even when fewer variables occur.
pub fn parse_dimacs<R: BufRead>(input: R) -> Result<CnfFormula, DimacsError> {
    let mut formula = CnfFormula::new();
    let mut header: Option<(usize, usize)> = None;
    let mut current: Vec<Literal> = Vec::new();
    let mut parsed = 0usize;

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('c') {
            continue;
        }
        if trimmed.starts_with('%') {
            break;
        }

        let Some((declared_vars, _)) = header else {
            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            let parsed_header = match fields.as_slice() {
                ["p", "cnf", v, c] => v.parse::<usize>().ok().zip(c.parse::<usize>().ok()),
                _ => None,
            };
            let Some((v, c)) = parsed_header else {
                return Err(if trimmed.starts_with('p') {
                    DimacsError::InvalidHeader(trimmed.to_string())
                } else {
                    DimacsError::MissingHeader
                });
            };
            formula.reserve_variables(v);
            header = Some((v, c));
            continue;
        };

        for token in trimmed.split_whitespace() {
            let lit = parse_literal(token, line_no)?;
            if lit == 0 {
                formula.add_clause(std::mem::take(&mut current));
                parsed += 1;
            } else if variable_of(lit) > declared_vars {
                return Err(DimacsError::LiteralOutOfRange {
                    literal: lit,
                    declared: declared_vars,
                });
            } else {
                current.push(lit);
            }
        }
    }

    let (_, declared_clauses) = header.ok_or(DimacsError::MissingHeader)?;
    if !current.is_empty() {
        return Err(DimacsError::UnterminatedClause);
    }
    if parsed != declared_clauses {
        return Err(DimacsError::ClauseCountMismatch {
            declared: declared_clauses,
            found: parsed,
        });
    }
    Ok(formula)
}

/// Writes an engine outcome in the result format.
///
/// Unassigned variables are left out of the model line.
pub fn write_result<W: Write>(outcome: &EngineOutcome, mut out: W) -> io::Result<()> {
    match outcome {
        EngineOutcome::Unsatisfiable => writeln!(out, "UNSAT")?,
        EngineOutcome::Satisfiable(model) => {
            writeln!(out, "SAT")?;
            for (i, value) in model.iter().enumerate() {
                let var = (i + 1) as Literal;
                match value {
                    TruthValue::True => write!(out, "{var} ")?,
                    TruthValue::False => write!(out, "{} ", -var)?,
                    TruthValue::Unassigned => {}
                }
            }
            writeln!(out, "0")?;
        }
    }
    out.flush()
}

/// Reads a result file into an outcome over `variable_count` variables.
///
/// Variables the model does not mention stay [`TruthValue::Unassigned`].
pub fn parse_result<R: BufRead>(
    input: R,
    variable_count: usize,
) -> Result<EngineOutcome, DimacsError> {
    let mut lines = input.lines().enumerate();
    let status = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                let trimmed = line.trim().to_string();
                if !trimmed.is_empty() {
                    break trimmed;
                }
            }
            None => return Err(DimacsError::UnknownStatus(String::new())),
        }
    };

    match status.as_str() {
        "UNSAT" => return Ok(EngineOutcome::Unsatisfiable),
        "SAT" => {}
        other => return Err(DimacsError::UnknownStatus(other.to_string())),
    }

    let mut model = vec![TruthValue::Unassigned; variable_count];
    let mut terminated = false;
    let mut seen_any = false;
    'outer: for (index, line) in lines {
        let line = line?;
        for token in line.split_whitespace() {
            seen_any = true;
            let lit = parse_literal(token, index + 1)?;
            if lit == 0 {
                terminated = true;
                break 'outer;
            }
            let var = variable_of(lit);
            if var > variable_count {
                return Err(DimacsError::LiteralOutOfRange {
                    literal: lit,
                    declared: variable_count,
                });
            }
            model[var - 1] = TruthValue::of_literal(lit);
        }
    }

    if !seen_any {
        return Err(DimacsError::MissingModel);
    }
    if !terminated {
        return Err(DimacsError::UnterminatedClause);
    }
    Ok(EngineOutcome::Satisfiable(model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> CnfFormula {
        let mut f = CnfFormula::new();
        f.binary(1, -2);
        f.unit(3);
        f
    }

    #[test]
    fn test_write_dimacs() {
        assert_eq!(to_dimacs_string(&sample()), "p cnf 3 2\n1 -2 0\n3 0\n");
    }

    #[test]
    fn test_parse_written_formula() {
        let text = to_dimacs_string(&sample());
        let parsed = parse_dimacs(Cursor::new(text)).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_parse_comments_and_wrapped_clauses() {
        let text = "c generated\np cnf 4 2\n1 -2\n 3 0 -4\n0\n";
        let f = parse_dimacs(Cursor::new(text)).unwrap();
        assert_eq!(f.clauses(), &[vec![1, -2, 3], vec![-4]]);
        assert_eq!(f.variable_count(), 4);
    }

    #[test]
    fn test_parse_percent_terminator() {
        let text = "p cnf 2 1\n1 2 0\n%\n0\n";
        let f = parse_dimacs(Cursor::new(text)).unwrap();
        assert_eq!(f.clause_count(), 1);
    }

    #[test]
    fn test_declared_variables_kept() {
        let f = parse_dimacs(Cursor::new("p cnf 10 1\n1 0\n")).unwrap();
        assert_eq!(f.variable_count(), 10);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_dimacs(Cursor::new("1 2 0\n")),
            Err(DimacsError::MissingHeader)
        ));
        assert!(matches!(
            parse_dimacs(Cursor::new("p dnf 1 1\n1 0\n")),
            Err(DimacsError::InvalidHeader(_))
        ));
        assert!(matches!(
            parse_dimacs(Cursor::new("p cnf 2 1\n1 x 0\n")),
            Err(DimacsError::InvalidLiteral { line: 2, .. })
        ));
        assert!(matches!(
            parse_dimacs(Cursor::new("p cnf 2 1\n1 3 0\n")),
            Err(DimacsError::LiteralOutOfRange { literal: 3, .. })
        ));
        assert!(matches!(
            parse_dimacs(Cursor::new("p cnf 2 2\n1 0\n")),
            Err(DimacsError::ClauseCountMismatch {
                declared: 2,
                found: 1
            })
        ));
        assert!(matches!(
            parse_dimacs(Cursor::new("p cnf 2 1\n1 2\n")),
            Err(DimacsError::UnterminatedClause)
        ));
    }

    #[test]
    fn test_write_result() {
        let mut buf = Vec::new();
        let outcome = EngineOutcome::Satisfiable(vec![
            TruthValue::True,
            TruthValue::Unassigned,
            TruthValue::False,
        ]);
        write_result(&outcome, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "SAT\n1 -3 0\n");

        let mut buf = Vec::new();
        write_result(&EngineOutcome::Unsatisfiable, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "UNSAT\n");
    }

    #[test]
    fn test_parse_result() {
        let outcome = parse_result(Cursor::new("SAT\n-1 3 0\n"), 3).unwrap();
        assert_eq!(
            outcome,
            EngineOutcome::Satisfiable(vec![
                TruthValue::False,
                TruthValue::Unassigned,
                TruthValue::True,
            ])
        );
        assert_eq!(
            parse_result(Cursor::new("UNSAT\n"), 3).unwrap(),
            EngineOutcome::Unsatisfiable
        );
    }

    #[test]
    fn test_parse_result_errors() {
        assert!(matches!(
            parse_result(Cursor::new("INDET\n"), 1),
            Err(DimacsError::UnknownStatus(_))
        ));
        assert!(matches!(
            parse_result(Cursor::new("SAT\n"), 1),
            Err(DimacsError::MissingModel)
        ));
        assert!(matches!(
            parse_result(Cursor::new("SAT\n1 2\n"), 2),
            Err(DimacsError::UnterminatedClause)
        ));
        assert!(matches!(
            parse_result(Cursor::new("SAT\n5 0\n"), 2),
            Err(DimacsError::LiteralOutOfRange { .. })
        ));
    }
}
