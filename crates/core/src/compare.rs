//! Reference-schedule comparator: diffs a produced schedule against a
//! reference one, bundle by bundle and slot by slot, normalizing whitespace
//! and case and tolerating an ALU0/ALU1 swap within a bundle. Used by the
//! test suite and exposed as the CLI's `cmp` subcommand.

use std::path::Path;

use crate::common::error::{Result, SchedError};
use crate::emit::BundleRow;

/// Which of the two schedules a [`Mismatch`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleKind {
    /// The non-pipelined schedule.
    Simple,
    /// The modulo-scheduled, pipelined schedule.
    Pipeline,
}

impl std::fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Pipeline => write!(f, "pipeline"),
        }
    }
}

/// A single differing `(cycle, slot)` pair between a produced and a
/// reference schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Which schedule this mismatch was found in.
    pub kind: ScheduleKind,
    /// The bundle's cycle index.
    pub cycle: usize,
    /// The slot index within the bundle, `0..5` in `[ALU1, ALU2, Mulu, Mem, Branch]` order.
    pub slot: usize,
    /// The produced schedule's text for this slot.
    pub produced: String,
    /// The reference schedule's text for this slot.
    pub reference: String,
}

/// Counts and mismatch list produced by comparing one or more schedule pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonReport {
    /// Total bundles compared across every schedule pair.
    pub bundles_compared: usize,
    /// Every mismatch found, in comparison order.
    pub mismatches: Vec<Mismatch>,
}

impl ComparisonReport {
    /// True when every compared bundle matched.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.mismatches.is_empty()
    }

    fn merge(&mut self, other: ComparisonReport) {
        self.bundles_compared += other.bundles_compared;
        self.mismatches.extend(other.mismatches);
    }
}

impl std::fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_match() {
            return writeln!(f, "OK: {} bundles match", self.bundles_compared);
        }
        writeln!(
            f,
            "MISMATCH: {} of {} bundles differ",
            self.mismatches.len(),
            self.bundles_compared
        )?;
        for m in &self.mismatches {
            writeln!(
                f,
                "  [{}] cycle {}, slot {}: produced `{}` != reference `{}`",
                m.kind, m.cycle, m.slot, m.produced, m.reference
            )?;
        }
        Ok(())
    }
}

/// Compares a produced schedule's pair of files (simple, pipelined) against a
/// reference's pair, auto-detecting CSV vs JSON by file extension.
///
/// # Errors
///
/// Returns [`SchedError::Io`] if a file cannot be read or does not parse as a
/// schedule of five-slot bundle rows.
pub fn compare_files(
    produced_simple: &Path,
    produced_pipeline: &Path,
    reference_simple: &Path,
    reference_pipeline: &Path,
) -> Result<ComparisonReport> {
    let mut report = ComparisonReport::default();
    report.merge(compare_schedules(
        ScheduleKind::Simple,
        &load_bundle_rows(produced_simple)?,
        &load_bundle_rows(reference_simple)?,
    ));
    report.merge(compare_schedules(
        ScheduleKind::Pipeline,
        &load_bundle_rows(produced_pipeline)?,
        &load_bundle_rows(reference_pipeline)?,
    ));
    Ok(report)
}

/// Compares two already-loaded schedules of the given kind.
#[must_use]
pub fn compare_schedules(
    kind: ScheduleKind,
    produced: &[BundleRow],
    reference: &[BundleRow],
) -> ComparisonReport {
    let bundles_compared = produced.len().max(reference.len());
    let mut mismatches = Vec::new();

    for cycle in 0..bundles_compared {
        match (produced.get(cycle), reference.get(cycle)) {
            (Some(p), Some(r)) => {
                if !rows_match(p, r) {
                    for slot in 0..5 {
                        let (np, nr) = (normalize(&p[slot]), normalize(&r[slot]));
                        if np != nr {
                            mismatches.push(Mismatch {
                                kind,
                                cycle,
                                slot,
                                produced: p[slot].clone(),
                                reference: r[slot].clone(),
                            });
                        }
                    }
                }
            }
            (p, r) => {
                for slot in 0..5 {
                    mismatches.push(Mismatch {
                        kind,
                        cycle,
                        slot,
                        produced: p.map_or_else(|| "<missing bundle>".to_string(), |b| b[slot].clone()),
                        reference: r.map_or_else(|| "<missing bundle>".to_string(), |b| b[slot].clone()),
                    });
                }
            }
        }
    }

    ComparisonReport {
        bundles_compared,
        mismatches,
    }
}

/// A bundle row matches if every slot matches after normalization, or if
/// swapping the first two (ALU0/ALU1) slots makes every slot match — the two
/// ALU slots carry no ordering meaning.
fn rows_match(produced: &BundleRow, reference: &BundleRow) -> bool {
    let direct = (0..5).all(|i| normalize(&produced[i]) == normalize(&reference[i]));
    if direct {
        return true;
    }
    let mut swapped = produced.clone();
    swapped.swap(0, 1);
    (0..5).all(|i| normalize(&swapped[i]) == normalize(&reference[i]))
}

fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Loads a schedule file as bundle rows. `.json` files are parsed as a JSON
/// array of five-element string arrays; anything else is parsed as CSV with
/// the `ALU1,ALU2,Mulu,Mem,Branch` header.
fn load_bundle_rows(path: &Path) -> Result<Vec<BundleRow>> {
    let text = std::fs::read_to_string(path).map_err(|e| SchedError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&text).map_err(|e| SchedError::Io {
            path: path.display().to_string(),
            reason: format!("invalid JSON schedule: {e}"),
        })
    } else {
        let mut reader = ::csv::Reader::from_reader(text.as_bytes());
        reader
            .records()
            .map(|rec| {
                let rec = rec.map_err(|e| SchedError::Io {
                    path: path.display().to_string(),
                    reason: format!("invalid CSV row: {e}"),
                })?;
                if rec.len() != 5 {
                    return Err(SchedError::Io {
                        path: path.display().to_string(),
                        reason: format!("expected 5 columns, found {}", rec.len()),
                    });
                }
                Ok([
                    rec[0].to_string(),
                    rec[1].to_string(),
                    rec[2].to_string(),
                    rec[3].to_string(),
                    rec[4].to_string(),
                ])
            })
            .collect()
    }
}
