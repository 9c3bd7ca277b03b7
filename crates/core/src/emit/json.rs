//! JSON emission: a bundle-per-row array of `[ALU1, ALU2, Mulu, Mem, Branch]`
//! string arrays, via `serde_json`.

use crate::common::error::{Result, SchedError};
use crate::emit::BundleRow;

/// Serializes `bundles` to a pretty-printed JSON array of five-element
/// string arrays.
///
/// # Errors
///
/// Returns [`SchedError::InvariantViolation`] if serialization fails — this
/// cannot happen for a `Vec<[String; 5]>`, but the `Result` return keeps this
/// symmetric with [`super::csv::to_csv`].
pub fn to_json(bundles: &[BundleRow]) -> Result<String> {
    serde_json::to_string_pretty(bundles)
        .map_err(|e| SchedError::InvariantViolation(format!("JSON serialization failed: {e}")))
}
