//! Input validation for project definitions.
//!
//! Checks structural integrity of a project before any clause is
//! emitted. Detects:
//! - Activities without a (positive) duration
//! - An empty horizon
//! - Relations referencing unknown activities
//! - Fixed starts outside the horizon
//! - Resource demand vectors longer than the activity list
//! - Instances whose variables would not fit the literal range
//!
//! Precedence cycles are checked separately by
//! [`EventGraph`](crate::precedence::EventGraph) so the cycle itself can
//! be reported.

use crate::models::Project;
use crate::sat::{TimeMatrices, MAX_VARIABLES};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// An activity has no duration, or a zero duration.
    MissingDuration,
    /// The horizon has no time slot.
    EmptyHorizon,
    /// A relation references an activity that doesn't exist.
    InvalidActivityReference,
    /// A pre-scheduled start lies outside the horizon.
    FixedStartOutOfRange,
    /// A resource has demands for activities that don't exist.
    DemandLengthMismatch,
    /// Activities times slots need more variables than a literal can number.
    TooManyVariables,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a project definition.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_project(project: &Project) -> ValidationResult {
    let mut errors = Vec::new();
    let n = project.activity_count();

    if project.horizon == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyHorizon,
            "horizon must contain at least one time slot",
        ));
    }

    if TimeMatrices::required_variables(n, project.horizon).is_none() {
        errors.push(ValidationError::new(
            ValidationErrorKind::TooManyVariables,
            format!(
                "{n} activities over {} slots need more than {MAX_VARIABLES} variables",
                project.horizon
            ),
        ));
    }

    for (i, activity) in project.activities.iter().enumerate() {
        if !activity.is_defined() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingDuration,
                format!("activity {i} has no positive duration"),
            ));
        }
        if let Some(start) = activity.fixed_start {
            if start >= project.horizon {
                errors.push(ValidationError::new(
                    ValidationErrorKind::FixedStartOutOfRange,
                    format!(
                        "activity {i} is fixed at slot {start}, horizon has {} slots",
                        project.horizon
                    ),
                ));
            }
        }
    }

    for sequence in &project.sequences {
        for activity in [sequence.first, sequence.second] {
            if activity >= n {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidActivityReference,
                    format!("relation {sequence} references unknown activity {activity}"),
                ));
            }
        }
    }

    for (r, resource) in project.resources.iter().enumerate() {
        let extra = resource.demands.iter().skip(n).any(|&d| d > 0);
        if extra {
            errors.push(ValidationError::new(
                ValidationErrorKind::DemandLengthMismatch,
                format!(
                    "resource {r} has demands beyond the {n} defined activities"
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
