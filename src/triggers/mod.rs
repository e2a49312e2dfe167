//! Trigger evaluation: decides which of a device's triggers fire for a reading.
//!
//! Each trigger is checked on its own. A trigger whose field is missing from
//! the reading cannot fire; a trigger with an unrecognised operator or
//! parameter is logged and skipped without affecting the others.

pub mod comparator;
pub mod parameter;

use thiserror::Error;
use tracing::{debug, warn};

use crate::db::models::{Reading, Trigger};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("unknown trigger operator: {0:?}")]
    UnknownOperator(String),
    #[error("unknown trigger parameter: {0:?}")]
    UnknownParameter(String),
}

/// Outcome of checking one trigger against one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Fires,
    Holds,
    /// The reading carries no value for the trigger's parameter.
    Absent,
}

/// Check a single trigger.
///
/// The parameter is extracted before the operator is resolved, so a missing
/// field short-circuits to `Absent`.
pub fn check(reading: &Reading, trigger: &Trigger) -> Result<Verdict, EvaluationError> {
    let Some(value) = parameter::extract(&trigger.parameter, reading)? else {
        return Ok(Verdict::Absent);
    };
    let compare = comparator::resolve(&trigger.operator)?;

    Ok(if compare(value, trigger.threshold) {
        Verdict::Fires
    } else {
        Verdict::Holds
    })
}

/// Result of evaluating a reading against a set of triggers.
#[derive(Debug, Default)]
pub struct Evaluation<'a> {
    pub fired: Vec<&'a Trigger>,
    pub held: usize,
    pub absent: usize,
    pub invalid: usize,
}

/// Evaluate every trigger in `triggers` against `reading`.
pub fn evaluate<'a>(reading: &Reading, triggers: &'a [Trigger]) -> Evaluation<'a> {
    let mut evaluation = Evaluation::default();

    for trigger in triggers {
        match check(reading, trigger) {
            Ok(Verdict::Fires) => {
                debug!(trigger_id = %trigger.id, reading_id = %reading.id, "Trigger fired");
                evaluation.fired.push(trigger);
            }
            Ok(Verdict::Holds) => evaluation.held += 1,
            Ok(Verdict::Absent) => {
                debug!(
                    trigger_id = %trigger.id,
                    parameter = %trigger.parameter,
                    "Reading has no value for trigger parameter; skipping"
                );
                evaluation.absent += 1;
            }
            Err(e) => {
                warn!(
                    trigger_id = %trigger.id,
                    error = %e,
                    "Skipping trigger with invalid definition"
                );
                evaluation.invalid += 1;
            }
        }
    }

    evaluation
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
