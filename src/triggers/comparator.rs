use super::EvaluationError;

/// `comparator(value, threshold)`.
pub type Comparator = fn(f64, f64) -> bool;

const COMPARATORS: &[(&str, Comparator)] = &[
    ("gt", greater_than),
    ("gte", greater_than_or_equal),
    ("lt", less_than),
    ("lte", less_than_or_equal),
];

fn greater_than(value: f64, threshold: f64) -> bool {
    value > threshold
}

fn greater_than_or_equal(value: f64, threshold: f64) -> bool {
    value >= threshold
}

fn less_than(value: f64, threshold: f64) -> bool {
    value < threshold
}

fn less_than_or_equal(value: f64, threshold: f64) -> bool {
    value <= threshold
}

/// Look up the comparison for a stored operator symbol.
pub fn resolve(symbol: &str) -> Result<Comparator, EvaluationError> {
    COMPARATORS
        .iter()
        .find(|(known, _)| *known == symbol)
        .map(|(_, f)| *f)
        .ok_or_else(|| EvaluationError::UnknownOperator(symbol.to_owned()))
}

/// Every operator symbol `resolve` recognises, in table order.
pub fn symbols() -> impl Iterator<Item = &'static str> {
    COMPARATORS.iter().map(|(symbol, _)| *symbol)
}
