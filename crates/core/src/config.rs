//! Non-functional scheduling knobs: the II search ceiling, the
//! `depTable.csv` diagnostic dump toggle, and logging verbosity. None of
//! these change scheduling semantics, only search limits and diagnostic
//! output, so they live outside `sched` as a small, independently
//! deserializable layer.

use serde::Deserialize;

/// Logging verbosity, mapped to a `tracing` filter level by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Only warnings and errors.
    Quiet,
    /// Phase-boundary events.
    Normal,
    /// Per-II-attempt and per-rename-step detail.
    Verbose,
}

impl Default for Verbosity {
    fn default() -> Self {
        Self::Normal
    }
}

/// Scheduler configuration. Every field has a sensible default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upper bound on the pipelined scheduler's II search.
    pub ii_ceiling: usize,
    /// Whether to additionally emit a `depTable.csv` diagnostic dump.
    pub dump_dep_table: bool,
    /// Logging verbosity passed through to the `tracing` filter.
    pub verbosity: Verbosity,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ii_ceiling: 256,
            dump_dep_table: false,
            verbosity: Verbosity::Normal,
        }
    }
}

impl Config {
    /// A ceiling scaled to `program_len`, generous enough that II search is
    /// never the limiting factor for a well-formed program — II is provably
    /// bounded by body length (see `sched::pipeline`'s termination note).
    #[must_use]
    pub fn with_program_len(program_len: usize) -> Self {
        Self {
            ii_ceiling: (program_len * 4).max(16),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_a_generous_ii_ceiling() {
        let c = Config::default();
        assert_eq!(c.ii_ceiling, 256);
        assert!(!c.dump_dep_table);
        assert_eq!(c.verbosity, Verbosity::Normal);
    }

    #[test]
    fn scaled_ceiling_grows_with_program_length() {
        let c = Config::with_program_len(100);
        assert_eq!(c.ii_ceiling, 400);
    }

    #[test]
    fn scaled_ceiling_has_a_floor_for_tiny_programs() {
        let c = Config::with_program_len(1);
        assert_eq!(c.ii_ceiling, 16);
    }
}
