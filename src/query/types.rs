//! Core types for the query system

/// Weight applied to a clause whose boost is unset
pub const DEFAULT_BOOST: f64 = 1.0;

/// Normalize a raw boost value from a query document
///
/// Values that are not strictly positive and finite (including NaN) mean
/// "unset" and never become an error. Carried values keep full precision.
pub fn normalize_boost(raw: f64) -> Option<f64> {
    if raw > 0.0 && raw.is_finite() {
        Some(raw)
    } else {
        None
    }
}

/// Query execution statistics
#[derive(Clone, Debug, Default)]
pub struct QueryStats {
    /// Number of documents matched
    pub docs_matched: u64,
    /// Query execution time in microseconds
    pub execution_time_us: u64,
}
