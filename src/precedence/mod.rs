//! Precedence structure analysis.
//!
//! - **`cycle`**: event graph over start/finish nodes and cycle detection,
//!   the acyclicity gate every project passes before encoding.
//! - **`critical_path`**: earliest/latest bounds over Finish-Start
//!   relations, used to prune the time-indexed variables.

mod critical_path;
mod cycle;

pub use critical_path::CriticalPath;
pub use cycle::{check_sequences, EventGraph, PrecedenceCycle};
