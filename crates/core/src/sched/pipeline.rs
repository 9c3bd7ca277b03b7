//! The software-pipelined schedule: resource-bound initiation-interval (II)
//! search, modulo scheduling of the loop body against a circular reservation
//! table, stage-aware rotating-register renaming, prolog priming, and
//! collapse of the body into exactly `II` bundles.

use std::ops::Range;

use crate::common::bundle::{ExecClass, Schedule};
use crate::common::error::{Result, SchedError};
use crate::common::reg::{RegKind, Register};
use crate::isa::instruction::{Instruction, Opcode, ScheduledInstruction};
use crate::sched::asap::schedule_asap;
use crate::sched::basic_blocks::BasicBlocks;
use crate::sched::deps::{Dep, DependencyTable};
use crate::sched::rename::{
    fill_null_registers, resolve_operand, FreshRegGenerator, FreshRotatingGenerator,
    NULL_MARKER,
};

/// The scheduled, renamed, software-pipelined program.
#[derive(Debug, Clone)]
pub struct PipelineSchedule {
    /// The bundle axis, already collapsed and sorted into canonical slot order.
    pub schedule: Schedule,
    /// First cycle of the (collapsed) loop body, i.e. the primed prolog's length.
    pub bb0_end: usize,
    /// First cycle past the loop body; the body occupies exactly `ii` bundles.
    pub bb1_end: usize,
    /// First cycle past the epilog.
    pub bb2_end: usize,
    /// The chosen initiation interval. Zero for a straight-line program.
    pub ii: usize,
    /// The number of pipeline stages the body was scheduled across. Zero for
    /// a straight-line program.
    pub num_stage: u32,
}

/// Builds the software-pipelined schedule for `insts`.
///
/// A program with no `loop` instruction pipelines to exactly the same bundles
/// the non-pipelined scheduler would produce: there is no body to modulo
/// schedule.
///
/// # Errors
///
/// Returns [`SchedError::Scheduling`] if no candidate II up to `ii_ceiling`
/// admits a valid modulo schedule — II is provably bounded by the body's
/// instruction count, so this only fires on a misconfigured ceiling.
pub fn run(
    insts: &[Instruction],
    deps: &mut DependencyTable,
    ii_ceiling: usize,
) -> Result<PipelineSchedule> {
    let blocks = deps.blocks.clone();

    if !blocks.has_loop() {
        return Ok(run_straight_line(insts, deps, &blocks));
    }

    let mut ii = resource_lower_bound(insts, &blocks).max(1);
    let attempt = loop {
        if ii > ii_ceiling {
            return Err(SchedError::Scheduling {
                ceiling: ii_ceiling,
                last_ii: ii - 1,
            });
        }
        match try_schedule_body(insts, deps, &blocks, ii) {
            Some(attempt) => break attempt,
            None => ii += 1,
        }
    };

    let BodyAttempt {
        mut sched,
        finished,
        bb0_end,
        bb1_padded_end,
        bb2_end,
    } = attempt;

    let num_stage = ((bb1_padded_end - bb0_end) / ii) as u32;

    rename_pipelined(
        insts,
        deps,
        &mut sched,
        &blocks,
        bb0_end,
        ii,
        num_stage,
        &finished,
    );

    let mut collapsed = collapse_body(&sched, bb0_end, bb1_padded_end, ii, bb2_end);

    let p32_prime = ScheduledInstruction {
        id: -1,
        opcode: Opcode::Mov,
        rd: Some(Register::predicate(32)),
        rs1: None,
        rs2: None,
        imm: Some(1),
    };
    let ec_prime = ScheduledInstruction {
        id: -2,
        opcode: Opcode::Mov,
        rd: Some(Register::ec()),
        rs1: None,
        rs2: None,
        imm: Some(i64::from(num_stage.saturating_sub(1))),
    };
    let final_bb0_end = insert_priming(&mut collapsed, bb0_end, p32_prime, ec_prime);

    let final_bb1_end = final_bb0_end + ii;
    update_loop_target(&mut collapsed, final_bb0_end, final_bb1_end);
    let final_bb2_end = final_bb1_end + (bb2_end - bb1_padded_end);

    collapsed.sort_all();

    Ok(PipelineSchedule {
        schedule: collapsed,
        bb0_end: final_bb0_end,
        bb1_end: final_bb1_end,
        bb2_end: final_bb2_end,
        ii,
        num_stage,
    })
}

/// A straight-line program has no body to modulo schedule; its pipelined
/// form is identical in shape to the non-pipelined schedule.
fn run_straight_line(
    insts: &[Instruction],
    deps: &mut DependencyTable,
    blocks: &BasicBlocks,
) -> PipelineSchedule {
    let mut finished: Vec<Option<usize>> = vec![None; insts.len()];
    let mut sched = Schedule::new();
    let bb0_end = schedule_asap(insts, deps, blocks.bb0.clone(), 0, &mut finished, &mut sched);

    let mut fresh = FreshRegGenerator::starting_at(1);
    rename_static_region(insts, deps, &mut sched, 0..bb0_end, &mut fresh);
    fill_null_registers(&mut sched, &mut fresh);
    sched.sort_all();

    PipelineSchedule {
        schedule: sched,
        bb0_end,
        bb1_end: bb0_end,
        bb2_end: bb0_end,
        ii: 0,
        num_stage: 0,
    }
}

/// `II₀ = max over execution-unit class c of ceil(count_c / units_c)`, counted
/// over BB1 including the `loop` instruction itself.
fn resource_lower_bound(insts: &[Instruction], blocks: &BasicBlocks) -> usize {
    let mut alu = 0usize;
    let mut mulu = 0usize;
    let mut mem = 0usize;
    let mut branch = 0usize;
    for i in blocks.bb1.clone() {
        match insts[i].class() {
            ExecClass::Alu => alu += 1,
            ExecClass::Mulu => mulu += 1,
            ExecClass::Mem => mem += 1,
            ExecClass::Branch => branch += 1,
        }
    }
    [ceil_div(alu, 2), ceil_div(mulu, 1), ceil_div(mem, 1), ceil_div(branch, 1)]
        .into_iter()
        .max()
        .unwrap_or(1)
}

fn ceil_div(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

/// A circular per-virtual-cycle reservation table, indexed by
/// `(cycle - bb0_end) % ii`, tracking how many instructions of each class
/// have already claimed that slot across every iteration the window spans.
struct ReservedTable {
    ii: usize,
    alu: Vec<u8>,
    mulu: Vec<bool>,
    mem: Vec<bool>,
    branch: Vec<bool>,
}

impl ReservedTable {
    fn new(ii: usize) -> Self {
        Self {
            ii,
            alu: vec![0; ii],
            mulu: vec![false; ii],
            mem: vec![false; ii],
            branch: vec![false; ii],
        }
    }

    fn slot(&self, cycle: usize, bb0_end: usize) -> usize {
        (cycle - bb0_end) % self.ii
    }

    fn is_reserved(&self, cycle: usize, class: ExecClass, bb0_end: usize) -> bool {
        let i = self.slot(cycle, bb0_end);
        match class {
            ExecClass::Alu => self.alu[i] >= 2,
            ExecClass::Mulu => self.mulu[i],
            ExecClass::Mem => self.mem[i],
            ExecClass::Branch => self.branch[i],
        }
    }

    fn mark_reserved(&mut self, cycle: usize, class: ExecClass, bb0_end: usize) {
        let i = self.slot(cycle, bb0_end);
        match class {
            ExecClass::Alu => self.alu[i] += 1,
            ExecClass::Mulu => self.mulu[i] = true,
            ExecClass::Mem => self.mem[i] = true,
            ExecClass::Branch => self.branch[i] = true,
        }
    }
}

struct BodyAttempt {
    sched: Schedule,
    finished: Vec<Option<usize>>,
    bb0_end: usize,
    bb1_padded_end: usize,
    bb2_end: usize,
}

/// Attempts modulo scheduling the loop body at a fixed `ii`. Returns `None`
/// if resource exhaustion (no free slot found after `ii` advancements) or a
/// recurrence-constraint violation (`finished(P) > ii + issue(C)` for some
/// already-scheduled inter-loop consumer `C` of the instruction `P` just
/// placed) forces a retry at a larger `ii`.
fn try_schedule_body(
    insts: &[Instruction],
    deps: &DependencyTable,
    blocks: &BasicBlocks,
    ii: usize,
) -> Option<BodyAttempt> {
    let mut finished: Vec<Option<usize>> = vec![None; insts.len()];
    let mut sched = Schedule::new();
    let bb0_end = schedule_asap(insts, deps, blocks.bb0.clone(), 0, &mut finished, &mut sched);

    let mut reserved = ReservedTable::new(ii);
    let mut bb1_finished = bb0_end;

    for i in blocks.bb1.start..blocks.bb1.end - 1 {
        let earliest = deps.entries[i]
            .all_deps()
            .filter_map(|d| d.producer)
            .map(|p| finished[p].expect("producer scheduled before its consumer"))
            .max()
            .unwrap_or(bb0_end)
            .max(bb0_end);

        let class = insts[i].class();
        let mut cycle = earliest;
        let mut advances = 0;
        while reserved.is_reserved(cycle, class, bb0_end) {
            cycle += 1;
            advances += 1;
            if advances > ii {
                return None;
            }
        }

        let fin = cycle + insts[i].opcode.latency() as usize;
        finished[i] = Some(fin);
        bb1_finished = bb1_finished.max(fin);

        for j in blocks.bb1.start..=i {
            for dep in &deps.entries[j].inter_loop {
                if dep.producer_interloop != Some(i) {
                    continue;
                }
                let sc = finished[j].expect("consumer already scheduled") - insts[j].opcode.latency() as usize;
                if fin > ii + sc {
                    return None;
                }
            }
        }

        reserved.mark_reserved(cycle, class, bb0_end);
        let sinst = ScheduledInstruction::from_instruction(&insts[i], i);
        let placed = sched.at_mut(cycle).insert(sinst, class);
        debug_assert!(placed, "reservation table and bundle capacity diverged");
    }

    while (bb1_finished - bb0_end) % ii != 0 {
        bb1_finished += 1;
    }

    let loop_idx = blocks.bb1.end - 1;
    let loop_inst = ScheduledInstruction {
        id: loop_idx as i64,
        opcode: Opcode::Loop,
        rd: None,
        rs1: None,
        rs2: None,
        imm: Some(bb0_end as i64),
    };
    let placed = sched
        .at_mut(bb1_finished - 1)
        .insert(loop_inst, ExecClass::Branch);
    debug_assert!(placed, "loop placement at a padded body boundary always has a free branch slot");

    let bb2_end = schedule_asap(
        insts,
        deps,
        blocks.bb2.clone(),
        bb1_finished,
        &mut finished,
        &mut sched,
    );

    Some(BodyAttempt {
        sched,
        finished,
        bb0_end,
        bb1_padded_end: bb1_finished,
        bb2_end,
    })
}

/// Computes every stage assignment and renamed destination, then commits
/// them — and the resulting stage-offset source operands — into `sched`.
#[allow(clippy::too_many_arguments)]
fn rename_pipelined(
    insts: &[Instruction],
    deps: &mut DependencyTable,
    sched: &mut Schedule,
    blocks: &BasicBlocks,
    bb0_end: usize,
    ii: usize,
    num_stage: u32,
    finished: &[Option<usize>],
) {
    let body = blocks.bb1.start..blocks.bb1.end - 1;

    for i in body.clone() {
        let issue = finished[i].expect("body instruction scheduled") - insts[i].opcode.latency() as usize;
        deps.entries[i].stage = Some(((issue - bb0_end) / ii) as u32);
    }

    let mut rot = FreshRotatingGenerator::new(num_stage);
    for i in body.clone() {
        let Some(rd) = insts[i].rd else { continue };
        let renamed = if rd.kind() == RegKind::General {
            rot.next_general()
        } else {
            rd
        };
        deps.entries[i].renamed_dest = Some(renamed);
    }

    // Inter-loop rewrite: prime the BB0 first-iteration producer's `rd`, if
    // one exists, with the same rotating base the BB1 producer was allocated.
    let mut seen_interloop: Vec<Dep> = Vec::new();
    for i in blocks.bb1.clone() {
        for dep in &deps.entries[i].inter_loop {
            if !seen_interloop.contains(dep) {
                seen_interloop.push(*dep);
            }
        }
    }
    for dep in &seen_interloop {
        let Some(p_bb0) = dep.producer else { continue };
        let p_bb1 = dep
            .producer_interloop
            .expect("an inter-loop dependency always carries a BB1 producer");
        let base = deps.entries[p_bb1]
            .renamed_dest
            .expect("BB1 producer's rotating base allocated before priming");
        let p_stage = deps.entries[p_bb1]
            .stage
            .expect("BB1 producer is a body instruction");
        deps.entries[p_bb0].renamed_dest = Some(base.with_offsets(1, -(p_stage as i32)));
    }

    // Loop-invariant rewrite: one fresh static register per distinct BB0
    // producer, shared by every BB1/BB2 consumer that reads it.
    let mut static_fresh = FreshRegGenerator::starting_at(1);
    let mut seen_invariant_producers: Vec<usize> = Vec::new();
    for i in blocks.bb1.clone().chain(blocks.bb2.clone()) {
        for dep in &deps.entries[i].loop_invariant {
            let p = dep.producer.expect("loop-invariant dependency always has a producer");
            if deps.entries[p].renamed_dest.is_some() || seen_invariant_producers.contains(&p) {
                continue;
            }
            seen_invariant_producers.push(p);
            deps.entries[p].renamed_dest = Some(static_fresh.next_general());
        }
    }

    // Everything in BB0/BB2 not already claimed above gets an ordinary fresh
    // static register.
    for i in blocks.bb0.clone().chain(blocks.bb2.clone()) {
        if deps.entries[i].renamed_dest.is_some() {
            continue;
        }
        let Some(rd) = insts[i].rd else { continue };
        let renamed = if rd.kind() == RegKind::General {
            static_fresh.next_general()
        } else {
            rd
        };
        deps.entries[i].renamed_dest = Some(renamed);
    }

    for bundle in sched.iter_mut() {
        for inst in bundle.instructions_mut() {
            if inst.id < 0 {
                continue;
            }
            if let Some(renamed) = deps.entries[inst.id as usize].renamed_dest {
                inst.rd = Some(renamed);
            }
        }
    }

    for cycle in blocks.bb0.clone() {
        commit_operands(insts, deps, sched, cycle, resolve_operand);
    }
    for cycle in body {
        commit_operands(insts, deps, sched, cycle, resolve_body_operand);
    }
    for cycle in blocks.bb2.clone() {
        commit_operands(insts, deps, sched, cycle, |d, i, r| {
            resolve_epilog_operand(d, num_stage, i, r)
        });
    }

    fill_null_registers(sched, &mut static_fresh);
}

fn commit_operands(
    insts: &[Instruction],
    deps: &DependencyTable,
    sched: &mut Schedule,
    cycle: usize,
    resolve: impl Fn(&DependencyTable, usize, Register) -> Register,
) {
    let Some(bundle) = sched.get_mut(cycle) else {
        return;
    };
    for inst in bundle.instructions_mut() {
        if inst.id < 0 {
            continue;
        }
        let idx = inst.id as usize;
        if let Some(orig) = insts[idx].rs1 {
            inst.rs1 = Some(resolve(deps, idx, orig));
        }
        if let Some(orig) = insts[idx].rs2 {
            inst.rs2 = Some(resolve(deps, idx, orig));
        }
    }
}

/// Resolves a loop-body operand: local and inter-loop reads shift the
/// producer's rotating base by the consumer/producer stage delta (inter-loop
/// also crosses one iteration boundary); a loop-invariant read copies the
/// fresh static register allocated for its BB0 producer verbatim.
fn resolve_body_operand(deps: &DependencyTable, idx: usize, orig: Register) -> Register {
    let my_stage = deps.entries[idx].stage.expect("body instruction has a stage");

    for dep in &deps.entries[idx].local {
        if dep.consumer_reg != orig {
            continue;
        }
        let p = dep.producer.expect("local dependency always has a producer");
        let p_stage = deps.entries[p].stage.expect("local producer is a body instruction");
        let base = deps.entries[p]
            .renamed_dest
            .expect("producer renamed before its consumer is linked");
        return base.with_added_offsets(0, my_stage as i32 - p_stage as i32);
    }
    for dep in &deps.entries[idx].inter_loop {
        if dep.consumer_reg != orig {
            continue;
        }
        let p_bb1 = dep
            .producer_interloop
            .expect("an inter-loop dependency always carries a BB1 producer");
        let p_stage = deps.entries[p_bb1].stage.expect("BB1 producer is a body instruction");
        let base = deps.entries[p_bb1]
            .renamed_dest
            .expect("producer renamed before its consumer is linked");
        return base.with_added_offsets(1, my_stage as i32 - p_stage as i32);
    }
    for dep in &deps.entries[idx].loop_invariant {
        if dep.consumer_reg != orig {
            continue;
        }
        let p = dep.producer.expect("loop-invariant dependency always has a producer");
        return deps.entries[p]
            .renamed_dest
            .expect("producer renamed before its consumer is linked");
    }
    NULL_MARKER
}

/// Resolves an epilog operand: a post-loop read shifts the body producer's
/// rotating base to the last stage it is live in (`numStage - 1`); local and
/// loop-invariant reads copy the producer's renamed register verbatim.
fn resolve_epilog_operand(deps: &DependencyTable, num_stage: u32, idx: usize, orig: Register) -> Register {
    for dep in &deps.entries[idx].local {
        if dep.consumer_reg != orig {
            continue;
        }
        let p = dep.producer.expect("local dependency always has a producer");
        return deps.entries[p]
            .renamed_dest
            .expect("producer renamed before its consumer is linked");
    }
    for dep in &deps.entries[idx].post_loop {
        if dep.consumer_reg != orig {
            continue;
        }
        let p = dep.producer.expect("post-loop dependency always has a producer");
        let p_stage = deps.entries[p].stage.expect("post-loop producer is a body instruction");
        let base = deps.entries[p]
            .renamed_dest
            .expect("producer renamed before its consumer is linked");
        return base.with_offsets(0, num_stage as i32 - 1 - p_stage as i32);
    }
    for dep in &deps.entries[idx].loop_invariant {
        if dep.consumer_reg != orig {
            continue;
        }
        let p = dep.producer.expect("loop-invariant dependency always has a producer");
        return deps.entries[p]
            .renamed_dest
            .expect("producer renamed before its consumer is linked");
    }
    NULL_MARKER
}

/// Generic fresh-static renaming for a contiguous BB0/BB2-shaped region with
/// no special-cased producers — used only by the straight-line fast path.
fn rename_static_region(
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

/// Copies `sched` into a fresh, collapsed [`Schedule`]: BB0 unchanged, the
/// (possibly padded) body folded into exactly `ii` bundles by virtual cycle
/// `(cycle - bb0_end) % ii`, and BB2 translated to sit immediately after.
fn collapse_body(
    sched: &Schedule,
    bb0_end: usize,
    bb1_padded_end: usize,
    ii: usize,
    bb2_end: usize,
) -> Schedule {
    let mut out = Schedule::new();

    for cycle in 0..bb0_end {
        copy_bundle(sched, cycle, &mut out, cycle);
    }
    for cycle in bb0_end..bb1_padded_end {
        let virt = bb0_end + (cycle - bb0_end) % ii;
        copy_bundle(sched, cycle, &mut out, virt);
    }
    let collapsed_body_end = bb0_end + ii;
    for cycle in bb1_padded_end..bb2_end {
        let shifted = collapsed_body_end + (cycle - bb1_padded_end);
        copy_bundle(sched, cycle, &mut out, shifted);
    }

    out
}

fn copy_bundle(src: &Schedule, src_cycle: usize, dst: &mut Schedule, dst_cycle: usize) {
    let Some(bundle) = src.get(src_cycle) else {
        return;
    };
    for (inst, class) in bundle.instructions().iter().zip(bundle.classes()) {
        let placed = dst.at_mut(dst_cycle).insert(inst.clone(), *class);
        debug_assert!(placed, "the reservation table guarantees collapse never overflows a bundle");
    }
}

/// Appends the `mov p32, true` / `mov EC, numStage - 1` priming pair to the
/// tail of BB0, using whatever free ALU slots remain there before allocating
/// a new bundle for the rest. Returns the (possibly larger) final `bb0_end`.
fn insert_priming(
    collapsed: &mut Schedule,
    bb0_end: usize,
    p32: ScheduledInstruction,
    ec: ScheduledInstruction,
) -> usize {
    let mut to_place = vec![p32, ec];

    if bb0_end > 0 {
        if let Some(bundle) = collapsed.get_mut(bb0_end - 1) {
            while !to_place.is_empty() && bundle.can_insert(ExecClass::Alu) {
                let inst = to_place.remove(0);
                bundle.insert(inst, ExecClass::Alu);
            }
        }
    }

    if to_place.is_empty() {
        return bb0_end;
    }

    collapsed.insert_empty_at(bb0_end);
    let new_bb0_end = bb0_end + 1;
    let bundle = collapsed.at_mut(new_bb0_end - 1);
    for inst in to_place {
        bundle.insert(inst, ExecClass::Alu);
    }
    new_bb0_end
}

fn update_loop_target(collapsed: &mut Schedule, bb0_end: usize, bb1_end: usize) {
    for cycle in bb0_end..bb1_end {
        let Some(bundle) = collapsed.get_mut(cycle) else {
            continue;
        };
        for inst in bundle.instructions_mut() {
            if inst.opcode == Opcode::Loop {
                inst.imm = Some(bb0_end as i64);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::decode_program;

    fn schedule_source(src: &str, ii_ceiling: usize) -> PipelineSchedule {
        let prog = decode_program(src).unwrap();
        let blocks = BasicBlocks::split(&prog).unwrap();
        let mut deps = DependencyTable::analyze(&prog, blocks);
        run(&prog, &mut deps, ii_ceiling).unwrap()
    }

    #[test]
    fn straight_line_program_has_zero_ii_and_no_stage() {
        let s = schedule_source("mov x1, 1\naddi x2, x1, 5", 16);
        assert_eq!(s.ii, 0);
        assert_eq!(s.num_stage, 0);
        assert_eq!(s.bb0_end, s.bb1_end);
    }

    #[test]
    fn single_instruction_body_pipelines_with_ii_one() {
        let s = schedule_source("mov x1, 10\nmov LC, x1\naddi x2, x2, 1\nloop 2", 16);
        assert_eq!(s.ii, 1);
        assert_eq!(s.num_stage, 1);
        assert_eq!(s.bb1_end - s.bb0_end, 1);
    }

    #[test]
    fn resource_pressure_forces_ii_two() {
        let s = schedule_source(
            "add x1, x2, x3\nadd x4, x5, x6\nadd x7, x8, x9\nadd x10, x11, x12\nloop 0",
            16,
        );
        assert_eq!(s.ii, 2);
        assert_eq!(s.bb1_end - s.bb0_end, 2);
    }

    #[test]
    fn mulu_self_recurrence_forces_ii_at_least_three() {
        let s = schedule_source("mulu x3, x3, x4\nloop 0", 16);
        assert!(s.ii >= 3);
    }

    #[test]
    fn body_destinations_are_rotating_registers() {
        let s = schedule_source("mov x1, 10\nmov LC, x1\naddi x2, x2, 1\nloop 2", 16);
        let body = s.schedule.get(s.bb0_end).unwrap();
        let addi = body
            .instructions()
            .iter()
            .find(|i| i.opcode == Opcode::Addi)
            .unwrap();
        assert!(matches!(addi.rd, Some(Register::Rotating { .. })));
    }

    #[test]
    fn loop_pip_target_accounts_for_priming_bundles() {
        let s = schedule_source("mov x1, 10\nmov LC, x1\naddi x2, x2, 1\nloop 2", 16);
        let body = s.schedule.get(s.bb1_end - 1).unwrap();
        let loop_inst = body
            .instructions()
            .iter()
            .find(|i| i.opcode == Opcode::Loop)
            .unwrap();
        assert_eq!(loop_inst.imm, Some(s.bb0_end as i64));
    }
}
