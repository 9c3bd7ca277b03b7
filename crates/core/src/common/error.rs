//! Error types shared across the decoder, analyzer, and schedulers.
//!
//! All fallible library entry points return `Result<T, SchedError>`. Decode and
//! malformed-program errors carry the offending instruction index so a caller
//! can point a user at the exact source line. Invariant violations are
//! programmer errors surfaced as a normal `Err` (not a panic) so the CLI can
//! still print a clean diagnostic and exit non-zero.

use thiserror::Error;

/// Top-level error type for every phase of the scheduler pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedError {
    /// A source instruction string could not be decoded.
    #[error("decode error at instruction {index}: {reason}")]
    Decode {
        /// 0-based index of the offending line in the input stream.
        index: usize,
        /// Human-readable reason (unknown opcode, malformed operand, ...).
        reason: String,
    },

    /// The program's control flow does not match the single-counted-loop shape.
    #[error("malformed program at instruction {index}: {reason}")]
    MalformedProgram {
        /// 0-based index of the offending instruction.
        index: usize,
        /// Human-readable reason (loop immediate out of range, multiple loops, ...).
        reason: String,
    },

    /// Modulo scheduling exceeded the configured II search ceiling.
    ///
    /// This is purely defensive: II is provably bounded by the body length
    /// (see [`crate::sched::pipeline`]), so this should never trigger in
    /// practice short of a misconfigured ceiling.
    #[error("scheduling error: II search exceeded ceiling {ceiling} (last attempt: {last_ii})")]
    Scheduling {
        /// The configured upper bound on II.
        ceiling: usize,
        /// The last II value attempted before giving up.
        last_ii: usize,
    },

    /// An internal consistency check failed.
    ///
    /// These are programmer errors: a double-booked slot, a rename left
    /// unassigned, or a dependency pointing at a producer that was never
    /// renamed. They are never recovered from; the caller should treat them
    /// as a bug report.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A schedule file for the comparator could not be read or parsed.
    #[error("I/O error reading {path}: {reason}")]
    Io {
        /// The path that failed to load.
        path: String,
        /// Human-readable reason (file not found, malformed CSV/JSON, ...).
        reason: String,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SchedError>;
