//! Test harness: builds programs and schedules them both ways without
//! repeating the decode/analyze/schedule boilerplate in every test.

use vliw470_core::config::Config;
use vliw470_core::sched::basic_blocks::BasicBlocks;
use vliw470_core::sched::deps::DependencyTable;
use vliw470_core::sched::{schedule_pipeline, schedule_simple, PipelineSchedule, SimpleSchedule};
use vliw470_core::{decode_program, Instruction};

/// A decoded program plus both of its schedules, each against its own
/// independently-renamed dependency table clone.
pub struct Scheduled {
    pub instructions: Vec<Instruction>,
    pub simple: SimpleSchedule,
    pub simple_deps: DependencyTable,
    pub pipeline: PipelineSchedule,
    pub pipeline_deps: DependencyTable,
}

/// Decodes `src` and runs both schedulers, panicking on any failure — tests
/// that expect a failure should call [`decode_program`] directly instead.
pub fn schedule_source(src: &str) -> Scheduled {
    let instructions = decode_program(src).expect("test program decodes");
    let blocks = BasicBlocks::split(&instructions).expect("test program has valid control flow");

    let mut simple_deps = DependencyTable::analyze(&instructions, blocks.clone());
    let simple = schedule_simple(&instructions, &mut simple_deps).expect("simple schedule succeeds");

    let mut pipeline_deps = DependencyTable::analyze(&instructions, blocks);
    let ceiling = Config::with_program_len(instructions.len()).ii_ceiling;
    let pipeline = schedule_pipeline(&instructions, &mut pipeline_deps, ceiling)
        .expect("pipeline schedule succeeds");

    Scheduled {
        instructions,
        simple,
        simple_deps,
        pipeline,
        pipeline_deps,
    }
}

/// Collects every non-synthetic, non-`nop` instruction's rendered text across
/// a schedule's bundles, in cycle then slot order.
pub fn rendered_instructions(rows: &[vliw470_core::emit::BundleRow]) -> Vec<String> {
    rows.iter()
        .flat_map(|row| row.iter())
        .filter(|s| s.as_str() != "nop")
        .cloned()
        .collect()
}
