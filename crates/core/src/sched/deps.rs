//! Dependency analysis: four disjoint per-operand dependency categories,
//! computed by last-writer search restricted to basic-block-specific ranges.

use std::ops::Range;

use crate::common::reg::Register;
use crate::isa::instruction::Instruction;
use crate::sched::basic_blocks::BasicBlocks;

/// A single source-operand dependency.
///
/// `producer` is the instruction that defines the value a non-inter-loop
/// consumer reads, or (for an inter-loop dependency) the BB0 instruction
/// defining the *first-iteration* value. `producer_interloop` is populated
/// only for inter-loop dependencies: the BB1 instruction whose value from
/// the *previous* iteration is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dep {
    /// The original-program register this dependency resolves.
    pub consumer_reg: Register,
    /// The producing instruction's index, for every category except a
    /// producer-less inter-loop dependency.
    pub producer: Option<usize>,
    /// The BB1 producer whose previous-iteration value is read. Populated
    /// only for inter-loop dependencies.
    pub producer_interloop: Option<usize>,
}

impl Dep {
    fn local_or_simple(consumer_reg: Register, producer: usize) -> Self {
        Self {
            consumer_reg,
            producer: Some(producer),
            producer_interloop: None,
        }
    }

    fn inter_loop(consumer_reg: Register, producer_bb0: Option<usize>, producer_bb1: usize) -> Self {
        Self {
            consumer_reg,
            producer: producer_bb0,
            producer_interloop: Some(producer_bb1),
        }
    }
}

/// One dependency-table row per original instruction.
#[derive(Debug, Clone, Default)]
pub struct DependencyTableEntry {
    /// Dependencies whose producer lies in the same basic block, before `i`.
    pub local: Vec<Dep>,
    /// Dependencies on a producer later in the loop body (previous iteration).
    pub inter_loop: Vec<Dep>,
    /// Dependencies on a BB0 producer, read without an intervening rewrite.
    pub loop_invariant: Vec<Dep>,
    /// BB2 dependencies on a BB1 producer.
    pub post_loop: Vec<Dep>,
    /// Pipeline stage assigned by the pipelined scheduler, if any.
    pub stage: Option<u32>,
    /// The renamed destination register, filled in by whichever scheduler runs.
    pub renamed_dest: Option<Register>,
}

impl DependencyTableEntry {
    /// All four dependency lists, concatenated. Used by renaming passes that
    /// need to search across every category uniformly.
    pub fn all_deps(&self) -> impl Iterator<Item = &Dep> {
        self.local
            .iter()
            .chain(self.inter_loop.iter())
            .chain(self.loop_invariant.iter())
            .chain(self.post_loop.iter())
    }
}

/// The full per-instruction dependency table, plus the basic-block partition
/// it was computed against.
#[derive(Debug, Clone)]
pub struct DependencyTable {
    /// The basic-block partition this table was analyzed against.
    pub blocks: BasicBlocks,
    /// One entry per original instruction, in program order.
    pub entries: Vec<DependencyTableEntry>,
}

impl DependencyTable {
    /// Runs dependency analysis over `insts`, already partitioned into `blocks`.
    #[must_use]
    pub fn analyze(insts: &[Instruction], blocks: BasicBlocks) -> Self {
        let mut entries: Vec<DependencyTableEntry> = (0..insts.len())
            .map(|_| DependencyTableEntry::default())
            .collect();

        for (i, inst) in insts.iter().enumerate() {
            let operands = distinct_operands(inst);
            for reg in operands {
                let dep = if blocks.bb0.contains(&i) {
                    analyze_bb0(insts, &blocks, i, reg)
                } else if blocks.bb1.contains(&i) {
                    analyze_bb1(insts, &blocks, i, reg)
                } else {
                    analyze_bb2(insts, &blocks, i, reg)
                };
                let Some((dep, category)) = dep else {
                    continue;
                };
                match category {
                    Category::Local => entries[i].local.push(dep),
                    Category::InterLoop => entries[i].inter_loop.push(dep),
                    Category::LoopInvariant => entries[i].loop_invariant.push(dep),
                    Category::PostLoop => entries[i].post_loop.push(dep),
                }
            }
        }

        Self { blocks, entries }
    }
}

#[derive(Debug, Clone, Copy)]
enum Category {
    Local,
    InterLoop,
    LoopInvariant,
    PostLoop,
}

/// `{rs1, rs2} \ {null}`, deduplicated when `rs1 == rs2`.
fn distinct_operands(inst: &Instruction) -> Vec<Register> {
    let mut out = Vec::with_capacity(2);
    if let Some(r) = inst.rs1 {
        out.push(r);
    }
    if let Some(r) = inst.rs2 {
        if Some(r) != inst.rs1 {
            out.push(r);
        }
    }
    out
}

/// Highest-index writer of `reg` within `range`, i.e. the *latest* writer —
/// ties (there can be none; indices are unique) always resolve to the
/// highest index.
fn last_writer(insts: &[Instruction], range: Range<usize>, reg: Register) -> Option<usize> {
    range.rev().find(|&j| insts[j].rd == Some(reg))
}

fn analyze_bb0(
    insts: &[Instruction],
    _blocks: &BasicBlocks,
    i: usize,
    reg: Register,
) -> Option<(Dep, Category)> {
    let producer = last_writer(insts, 0..i, reg)?;
    Some((Dep::local_or_simple(reg, producer), Category::Local))
}

fn analyze_bb1(
    insts: &[Instruction],
    blocks: &BasicBlocks,
    i: usize,
    reg: Register,
) -> Option<(Dep, Category)> {
    if let Some(p) = last_writer(insts, blocks.bb1.start..i, reg) {
        return Some((Dep::local_or_simple(reg, p), Category::Local));
    }
    if let Some(p_bb1) = last_writer(insts, i..blocks.bb2.start, reg) {
        let p_bb0 = last_writer(insts, 0..blocks.bb0.end, reg);
        return Some((Dep::inter_loop(reg, p_bb0, p_bb1), Category::InterLoop));
    }
    if let Some(p) = last_writer(insts, 0..blocks.bb0.end, reg) {
        return Some((Dep::local_or_simple(reg, p), Category::LoopInvariant));
    }
    None
}

fn analyze_bb2(
    insts: &[Instruction],
    blocks: &BasicBlocks,
    i: usize,
    reg: Register,
) -> Option<(Dep, Category)> {
    if let Some(p) = last_writer(insts, blocks.bb2.start..i, reg) {
        return Some((Dep::local_or_simple(reg, p), Category::Local));
    }
    if let Some(p) = last_writer(insts, blocks.bb1.clone(), reg) {
        return Some((Dep::local_or_simple(reg, p), Category::PostLoop));
    }
    if let Some(p) = last_writer(insts, 0..blocks.bb0.end, reg) {
        return Some((Dep::local_or_simple(reg, p), Category::LoopInvariant));
    }
    None
}
