//! The ASAP (as-soon-as-possible) list-scheduling pass shared by every basic
//! block of both schedulers: BB0/BB1/BB2 for the simple schedule, BB0/BB2 for
//! the pipelined schedule (whose body instead goes through modulo scheduling).

use std::ops::Range;

use crate::common::bundle::Schedule;
use crate::isa::instruction::{Instruction, ScheduledInstruction};
use crate::sched::deps::DependencyTable;

/// Schedules `range` against `schedule`, starting no earlier than `prev_end`,
/// placing each instruction at the earliest cycle that is both resource-free
/// and at or after every one of its `producer`-linked dependencies' finish
/// cycle. Returns the block's finish cycle (the max over every instruction's
/// `issue + latency`, or `prev_end` if `range` is empty).
///
/// Only the `producer` field of each [`crate::sched::deps::Dep`] feeds the
/// earliest-cycle computation — an inter-loop dependency with no BB0
/// producer contributes nothing here; its ordering is instead enforced by
/// the loop-body stretch pass.
pub fn schedule_asap(
    insts: &[Instruction],
    deps: &DependencyTable,
    range: Range<usize>,
    prev_end: usize,
    finished: &mut [Option<usize>],
    schedule: &mut Schedule,
) -> usize {
    let mut block_end = prev_end;
    for i in range {
        let earliest = deps.entries[i]
            .all_deps()
            .filter_map(|d| d.producer)
            .map(|p| finished[p].expect("producer scheduled before its consumer"))
            .max()
            .unwrap_or(prev_end)
            .max(prev_end);

        let sinst = ScheduledInstruction::from_instruction(&insts[i], i);
        let class = insts[i].class();
        let mut cycle = earliest;
        while !schedule.at_mut(cycle).insert(sinst.clone(), class) {
            cycle += 1;
        }

        let fin = cycle + insts[i].opcode.latency() as usize;
        finished[i] = Some(fin);
        block_end = block_end.max(fin);
    }
    block_end
}
