//! A static instruction scheduler for a five-slot VLIW processor with
//! software pipelining.
//!
//! The pipeline is decode → basic-block split → dependency analysis →
//! schedule (non-pipelined and/or software-pipelined) → emit. [`schedule_program`]
//! drives the whole thing for both schedulers against independent clones of
//! the dependency table, since each scheduler owns its own rename-state
//! counters and neither observes the other's intermediate state.

/// Register model, bundle/schedule container, and the crate-wide error type.
pub mod common;
/// Non-functional scheduling knobs: II ceiling, diagnostic dumps, logging verbosity.
pub mod config;
/// Reference-schedule comparator.
pub mod compare;
/// Rendering a finished schedule to JSON/CSV.
pub mod emit;
/// Textual decode, the typed instruction model, and the disassembler.
pub mod isa;
/// Basic-block partitioning, dependency analysis, and the two schedulers.
pub mod sched;

pub use common::error::{Result, SchedError};
pub use config::Config;
pub use isa::{decode_program, Instruction};
pub use sched::{DependencyTable, PipelineSchedule, SimpleSchedule};

use sched::basic_blocks::BasicBlocks;

/// The result of scheduling one program both ways: non-pipelined and (when
/// the program contains a `loop`) software-pipelined.
#[derive(Debug, Clone)]
pub struct ScheduledProgram {
    /// The decoded source program.
    pub instructions: Vec<Instruction>,
    /// The structural dependency table (shared read-only view; rename fields
    /// are populated independently per scheduler — see [`Self::simple_deps`]
    /// and [`Self::pipeline_deps`]).
    pub simple: SimpleSchedule,
    /// The dependency table as renamed by the simple scheduler.
    pub simple_deps: DependencyTable,
    /// The pipelined schedule.
    pub pipeline: PipelineSchedule,
    /// The dependency table as renamed by the pipelined scheduler.
    pub pipeline_deps: DependencyTable,
}

/// Decodes, analyzes, and schedules `source` both ways.
///
/// Each scheduler runs against its own clone of the structural dependency
/// table, so the simple and pipelined rename passes never observe each
/// other's `renamed_dest`/`stage` writes.
///
/// # Errors
///
/// Returns [`SchedError::Decode`] or [`SchedError::MalformedProgram`] if
/// `source` does not parse, or [`SchedError::Scheduling`] if the pipelined
/// search exceeds `config.ii_ceiling`.
pub fn schedule_program(source: &str, config: &Config) -> Result<ScheduledProgram> {
    let instructions = decode_program(source)?;
    let blocks = BasicBlocks::split(&instructions)?;

    let mut simple_deps = DependencyTable::analyze(&instructions, blocks.clone());
    let simple = sched::schedule_simple(&instructions, &mut simple_deps)?;

    let mut pipeline_deps = DependencyTable::analyze(&instructions, blocks);
    let pipeline = sched::schedule_pipeline(&instructions, &mut pipeline_deps, config.ii_ceiling)?;

    Ok(ScheduledProgram {
        instructions,
        simple,
        simple_deps,
        pipeline,
        pipeline_deps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedules_a_straight_line_program_with_an_empty_pipeline() {
        let result = schedule_program("mov x1, 1\naddi x2, x1, 5", &Config::default()).unwrap();
        assert_eq!(result.pipeline.ii, 0);
        assert_eq!(result.simple.bb0_end, result.simple.bb1_end);
    }

    #[test]
    fn schedules_a_loop_program_both_ways() {
        let src = "mov x1, 10\nmov LC, x1\naddi x2, x2, 1\nloop 2";
        let result = schedule_program(src, &Config::default()).unwrap();
        assert!(result.pipeline.ii >= 1);
        assert!(result.simple.bb1_end > result.simple.bb0_end);
    }

    #[test]
    fn a_malformed_program_surfaces_a_decode_error() {
        let err = schedule_program("frobnicate x1, x2, x3", &Config::default()).unwrap_err();
        assert!(matches!(err, SchedError::Decode { .. }));
    }
}
