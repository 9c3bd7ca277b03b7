//! Scheduling: basic-block partitioning, dependency analysis, and the two
//! schedule builders (non-pipelined and software-pipelined).

/// ASAP list scheduling, shared across both schedulers' straight-line blocks.
pub mod asap;
/// Control-flow partitioning into BB0/BB1/BB2.
pub mod basic_blocks;
/// Four-category per-operand dependency analysis.
pub mod deps;
/// The software-pipelined (modulo-scheduled) schedule builder.
pub mod pipeline;
/// Fresh-register allocators shared by both schedulers.
pub mod rename;
/// The non-pipelined schedule builder.
pub mod simple;

pub use basic_blocks::BasicBlocks;
pub use deps::{Dep, DependencyTable, DependencyTableEntry};
pub use pipeline::{run as schedule_pipeline, PipelineSchedule};
pub use simple::{run as schedule_simple, SimpleSchedule};
