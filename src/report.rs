//! Plain-text schedule report.
//!
//! One grid per matrix, a column per time slot and a row per activity:
//!
//! ```text
//! Active
//!     T01 T02 T03 T04
//! ====================
//! A01|########
//! A02|        ########
//! ```
//!
//! followed by a start/finish table, the makespan and the peak usage of
//! every resource.

use std::fmt::Write as _;
use std::io::{self, Write};

use crate::encoding::{ScheduleEncoding, SolveOutcome};
use crate::models::{Project, Schedule};
use crate::sat::VariableMatrix;

/// Marker for a true cell of the active matrix.
pub const ACTIVE_FILL: &str = "####";
/// Marker for a true cell of the starts/finishes matrices.
pub const EVENT_FILL: &str = " X  ";
const EMPTY_CELL: &str = "    ";

/// Renders one matrix as a grid.
///
/// Rows are labelled with [`Project::label`]; unset and undecided cells
/// stay blank.
pub fn render_matrix(project: &Project, matrix: &VariableMatrix, fill: &str) -> String {
    let labels: Vec<String> = (0..matrix.rows()).map(|a| project.label(a)).collect();
    let width = labels.iter().map(String::len).max().unwrap_or(0).max(3);

    let mut out = String::new();
    let _ = write!(out, "{:width$} ", "");
    for t in 0..matrix.cols() {
        let _ = write!(out, "T{:02} ", t + 1);
    }
    out.push('\n');
    out.push_str(&"=".repeat(width + 1 + 4 * matrix.cols()));
    out.push('\n');

    for (a, label) in labels.iter().enumerate() {
        let _ = write!(out, "{label:width$}|");
        for t in 0..matrix.cols() {
            out.push_str(if matrix.is_set(a, t) { fill } else { EMPTY_CELL });
        }
        out.push('\n');
    }
    out
}

/// Start/finish table, makespan and resource peaks.
pub fn render_summary(project: &Project, schedule: &Schedule) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<8} {:>5} {:>6} {:>8}", "Activity", "Start", "Finish", "Duration");
    for a in &schedule.assignments {
        let _ = writeln!(
            out,
            "{:<8} {:>5} {:>6} {:>8}",
            project.label(a.activity),
            a.start,
            a.finish,
            a.duration()
        );
    }
    let _ = writeln!(out, "Makespan: {}", schedule.makespan());
    for (r, resource) in project.resources.iter().enumerate() {
        let peak = schedule.peak_usage(project, r).unwrap_or(0);
        let name = resource.name.clone().unwrap_or_else(|| format!("R{:02}", r + 1));
        let _ = writeln!(out, "{name}: peak {peak} of {}", resource.availability);
    }
    out
}

/// Full report of a solve.
pub fn render_report(encoding: &ScheduleEncoding, outcome: &SolveOutcome) -> String {
    let project = encoding.project();
    let schedule = match outcome {
        SolveOutcome::Scheduled(s) => s,
        SolveOutcome::Unsatisfiable => return "No solution found.\n".to_string(),
    };
    let m = encoding.matrices();
    let mut out = String::new();
    for (title, matrix, fill) in [
        ("Active", &m.active, ACTIVE_FILL),
        ("Starts", &m.starts, EVENT_FILL),
        ("Finishes", &m.finishes, EVENT_FILL),
    ] {
        out.push_str(title);
        out.push('\n');
        out.push_str(&render_matrix(project, matrix, fill));
        out.push('\n');
    }
    out.push_str(&render_summary(project, schedule));
    out
}

/// Writes [`render_report`] to `out`.
pub fn write_report<W: Write>(
    mut out: W,
    encoding: &ScheduleEncoding,
    outcome: &SolveOutcome,
) -> io::Result<()> {
    out.write_all(render_report(encoding, outcome).as_bytes())?;
    out.flush()
}
