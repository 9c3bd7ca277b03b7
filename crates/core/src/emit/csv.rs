//! CSV emission: header `ALU1,ALU2,Mulu,Mem,Branch` plus one row per bundle,
//! via the `csv` crate.

use crate::common::error::{Result, SchedError};
use crate::emit::BundleRow;

/// Serializes `bundles` to CSV text with a fixed header row.
///
/// # Errors
///
/// Returns [`SchedError::InvariantViolation`] if the underlying `csv` writer
/// fails — an I/O failure against an in-memory buffer, which does not happen
/// in practice.
pub fn to_csv(bundles: &[BundleRow]) -> Result<String> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["ALU1", "ALU2", "Mulu", "Mem", "Branch"])
        .map_err(|e| SchedError::InvariantViolation(format!("CSV header write failed: {e}")))?;
    for row in bundles {
        writer
            .write_record(row)
            .map_err(|e| SchedError::InvariantViolation(format!("CSV row write failed: {e}")))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| SchedError::InvariantViolation(format!("CSV flush failed: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| SchedError::InvariantViolation(format!("CSV output not UTF-8: {e}")))
}
