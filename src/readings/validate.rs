use thiserror::Error;

use crate::db::models::NewReading;

const HUMIDITY_MIN: f64 = 0.0;
const HUMIDITY_MAX: f64 = 100.0;
const ABSOLUTE_ZERO_C: f64 = -273.15;

/// Every problem found in one payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .violations.join("; "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}

/// Validates the measurement values of an incoming reading.
///
/// Absent fields are always fine; present ones must be finite and within
/// physical bounds.
pub fn validate(values: &NewReading) -> Result<(), ValidationError> {
    let mut violations = Vec::new();

    let mut check = |name: &str, value: Option<f64>, ok: fn(f64) -> bool, bounds: &str| {
        if let Some(v) = value {
            if !v.is_finite() {
                violations.push(format!("{name} must be a finite number"));
            } else if !ok(v) {
                violations.push(format!("{name} {v} out of range {bounds}"));
            }
        }
    };

    check(
        "humidity",
        values.humidity,
        |v| (HUMIDITY_MIN..=HUMIDITY_MAX).contains(&v),
        "[0, 100]",
    );
    check("pressure", values.pressure, |v| v >= 0.0, "[0, inf)");
    check(
        "temperature",
        values.temperature,
        |v| v >= ABSOLUTE_ZERO_C,
        "[-273.15, inf)",
    );
    check("gasResistance", values.gas_resistance, |v| v >= 0.0, "[0, inf)");

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}
