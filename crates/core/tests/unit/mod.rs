//! Unit test tree for the scheduler.

/// The six literal end-to-end scenarios.
pub mod end_to_end;
/// Quantified invariants checked over many generated programs.
pub mod invariants;
/// Comparator behavior against schedule files on disk.
pub mod comparator;
