use super::EvaluationError;
use crate::db::models::Reading;

pub type Accessor = fn(&Reading) -> Option<f64>;

const PARAMETERS: &[(&str, Accessor)] = &[
    ("humidity", |r: &Reading| r.humidity),
    ("pressure", |r: &Reading| r.pressure),
    ("temperature", |r: &Reading| r.temperature),
    ("gasResistance", |r: &Reading| r.gas_resistance),
];

/// Value of the named field on `reading`, `None` when the reading lacks it.
pub fn extract(name: &str, reading: &Reading) -> Result<Option<f64>, EvaluationError> {
    PARAMETERS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, accessor)| accessor(reading))
        .ok_or_else(|| EvaluationError::UnknownParameter(name.to_owned()))
}

/// Every parameter name `extract` recognises, in table order.
pub fn names() -> impl Iterator<Item = &'static str> {
    PARAMETERS.iter().map(|(name, _)| *name)
}
