//! The non-pipelined schedule: ASAP list scheduling of each basic block,
//! a loop-body stretch to respect inter-loop recurrences, synthetic `mov`
//! fixups that carry a recurrence's running value forward, and a single
//! linear SSA renaming pass.

use std::ops::Range;

use crate::common::bundle::{ExecClass, Schedule};
use crate::common::error::{Result, SchedError};
use crate::common::reg::{RegKind, Register};
use crate::isa::instruction::{Instruction, Opcode, ScheduledInstruction};
use crate::sched::asap::schedule_asap;
use crate::sched::basic_blocks::BasicBlocks;
use crate::sched::deps::{Dep, DependencyTable};
use crate::sched::rename::{fill_null_registers, resolve_operand, FreshRegGenerator};

/// The scheduled, renamed, non-pipelined program.
#[derive(Debug, Clone)]
pub struct SimpleSchedule {
    /// The bundle axis, sorted into canonical slot order.
    pub schedule: Schedule,
    /// First cycle of BB1 (i.e. the prolog's length).
    pub bb0_end: usize,
    /// First cycle past BB1 (the cycle the `loop` instruction occupies is
    /// `bb1_end - 1`).
    pub bb1_end: usize,
    /// First cycle past BB2.
    pub bb2_end: usize,
}

/// Builds the simple (non-pipelined) schedule for `insts`, recording every
/// assigned destination register on `deps` as it goes.
///
/// # Errors
///
/// Returns [`SchedError::InvariantViolation`] if the `loop` instruction or an
/// inter-loop fixup `mov` cannot be placed at a cycle the algorithm
/// guarantees is free — a scheduler bug, not a malformed input.
pub fn run(insts: &[Instruction], deps: &mut DependencyTable) -> Result<SimpleSchedule> {
    let blocks = deps.blocks.clone();
    let mut finished: Vec<Option<usize>> = vec![None; insts.len()];
    let mut schedule = Schedule::new();
    let mut fresh = FreshRegGenerator::starting_at(0);

    let bb0_end = schedule_asap(insts, deps, blocks.bb0.clone(), 0, &mut finished, &mut schedule);

    if !blocks.has_loop() {
        schedule.sort_all();
        rename_all(insts, deps, &mut schedule, 0..bb0_end, &mut fresh);
        fill_null_registers(&mut schedule, &mut fresh);
        return Ok(SimpleSchedule {
            schedule,
            bb0_end,
            bb1_end: bb0_end,
            bb2_end: bb0_end,
        });
    }

    let body = blocks.bb1.start..blocks.bb1.end - 1; // exclude `loop` itself
    let mut bb1_end = schedule_asap(insts, deps, body, bb0_end, &mut finished, &mut schedule);
    let mut bb2_end = schedule_asap(
        insts,
        deps,
        blocks.bb2.clone(),
        bb1_end,
        &mut finished,
        &mut schedule,
    );

    let old_bb1_end = bb1_end;
    stretch_body_for_recurrences(
        deps,
        &mut schedule,
        bb0_end..old_bb1_end,
        &finished,
        &mut bb1_end,
        &mut bb2_end,
    );

    schedule.sort_all();
    rename_all(insts, deps, &mut schedule, 0..bb2_end, &mut fresh);

    insert_fixups_and_loop(
        deps,
        &blocks,
        &mut schedule,
        bb0_end,
        old_bb1_end,
        &mut bb1_end,
        &mut bb2_end,
        &finished,
    )?;

    fill_null_registers(&mut schedule, &mut fresh);
    schedule.sort_all();

    Ok(SimpleSchedule {
        schedule,
        bb0_end,
        bb1_end,
        bb2_end,
    })
}

/// Inserts empty bundles at the end of BB1 until every inter-loop dependency
/// satisfies `finished(producer) <= II + issue(consumer)`, where `II` is the
/// body's current length. BB2 shifts forward by the same count.
fn stretch_body_for_recurrences(
    deps: &DependencyTable,
    schedule: &mut Schedule,
    body: Range<usize>,
    finished: &[Option<usize>],
    bb1_end: &mut usize,
    bb2_end: &mut usize,
) {
    let ii = body.end - body.start;
    let mut max_diff: isize = 0;
    for cycle in body {
        let Some(bundle) = schedule.get(cycle) else {
            continue;
        };
        for inst in bundle.instructions() {
            if inst.id < 0 {
                continue;
            }
            for dep in &deps.entries[inst.id as usize].inter_loop {
                let Some(producer_interloop) = dep.producer_interloop else {
                    continue;
                };
                let sp_finished = finished[producer_interloop]
                    .expect("inter-loop producer already scheduled");
                let diff = sp_finished as isize - (ii + cycle) as isize;
                max_diff = max_diff.max(diff);
            }
        }
    }
    for _ in 0..max_diff.max(0) {
        schedule.insert_empty_at(*bb1_end);
        *bb1_end += 1;
        *bb2_end += 1;
    }
}

/// Assigns a fresh destination register to every `General` `rd` in program
/// order, then links every `rs1`/`rs2` to the producer's renamed register (or
/// [`crate::sched::rename::NULL_MARKER`], resolved by [`fill_null_registers`]).
fn rename_all(
    insts: &[Instruction],
    deps: &mut DependencyTable,
    schedule: &mut Schedule,
    range: Range<usize>,
    fresh: &mut FreshRegGenerator,
) {
    for cycle in range.clone() {
        let Some(bundle) = schedule.get_mut(cycle) else {
            continue;
        };
        for inst in bundle.instructions_mut() {
            if inst.id < 0 {
                continue;
            }
            let idx = inst.id as usize;
            let Some(rd) = insts[idx].rd else { continue };
            let renamed = if rd.kind() == RegKind::General {
                fresh.next_general()
            } else {
                rd
            };
            deps.entries[idx].renamed_dest = Some(renamed);
            inst.rd = Some(renamed);
        }
    }

    for cycle in range {
        let Some(bundle) = schedule.get_mut(cycle) else {
            continue;
        };
        for inst in bundle.instructions_mut() {
            if inst.id < 0 {
                continue;
            }
            let idx = inst.id as usize;
            if let Some(orig) = insts[idx].rs1 {
                inst.rs1 = Some(resolve_operand(deps, idx, orig));
            }
            if let Some(orig) = insts[idx].rs2 {
                inst.rs2 = Some(resolve_operand(deps, idx, orig));
            }
        }
    }
}

/// Inserts one synthetic `mov` per distinct inter-loop dependency that has a
/// BB0 producer — carrying that producer's value forward from the previous
/// iteration's computation into the register the consumer is wired to read —
/// then places `loop` in BB1's final cycle.
#[allow(clippy::too_many_arguments)]
fn insert_fixups_and_loop(
    deps: &DependencyTable,
    blocks: &BasicBlocks,
    schedule: &mut Schedule,
    bb0_end: usize,
    old_bb1_end: usize,
    bb1_end: &mut usize,
    bb2_end: &mut usize,
    finished: &[Option<usize>],
) -> Result<()> {
    let mut seen: Vec<Dep> = Vec::new();
    for i in blocks.bb1.clone() {
        for dep in &deps.entries[i].inter_loop {
            if !seen.contains(dep) {
                seen.push(*dep);
            }
        }
    }

    for dep in &seen {
        let Some(p_bb0) = dep.producer else {
            continue; // no BB0 seed: the BB1 producer's own register closes the loop.
        };
        let p_bb1 = dep
            .producer_interloop
            .expect("an inter-loop dependency always carries a BB1 producer");
        let rd = deps.entries[p_bb0]
            .renamed_dest
            .expect("BB0 producer renamed before fixups run");
        let rs1 = deps.entries[p_bb1]
            .renamed_dest
            .expect("BB1 producer renamed before fixups run");
        let prod_finished = finished[p_bb1].expect("BB1 producer already scheduled");

        let mut cycle = old_bb1_end.saturating_sub(1);
        loop {
            let ready = cycle >= prod_finished
                && schedule
                    .get(cycle)
                    .is_some_and(|b| b.can_insert(ExecClass::Alu));
            if ready {
                break;
            }
            cycle += 1;
            if cycle >= *bb1_end {
                schedule.insert_empty_at(*bb1_end);
                *bb1_end += 1;
                *bb2_end += 1;
            }
        }

        let mov = ScheduledInstruction {
            id: -1,
            opcode: Opcode::Mov,
            rd: Some(rd),
            rs1: Some(rs1),
            rs2: None,
            imm: None,
        };
        if !schedule.at_mut(cycle).insert(mov, ExecClass::Alu) {
            return Err(SchedError::InvariantViolation(format!(
                "inter-loop fixup mov could not be placed at cycle {cycle}"
            )));
        }
    }

    let loop_idx = blocks.bb1.end - 1;
    let loop_cycle = *bb1_end - 1;
    let loop_inst = ScheduledInstruction {
        id: loop_idx as i64,
        opcode: Opcode::Loop,
        rd: None,
        rs1: None,
        rs2: None,
        imm: Some(bb0_end as i64),
    };
    if !schedule.at_mut(loop_cycle).insert(loop_inst, ExecClass::Branch) {
        return Err(SchedError::InvariantViolation(format!(
            "loop instruction could not be placed at cycle {loop_cycle}"
        )));
    }

    Ok(())
}
