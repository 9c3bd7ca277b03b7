//! Quantified invariants, checked over many generated straight-line and
//! single-recurrence programs.

use proptest::prelude::*;
use vliw470_core::common::bundle::ExecClass;

use crate::common::schedule_source;

fn arb_straight_line_program() -> impl Strategy<Value = String> {
    prop::collection::vec(0u32..4, 1..12).prop_map(|ops| {
        ops.iter()
            .enumerate()
            .map(|(i, op)| match op {
                0 => format!("add x{}, x{}, x{}", i % 8, (i + 1) % 8, (i + 2) % 8),
                1 => format!("sub x{}, x{}, x{}", i % 8, (i + 1) % 8, (i + 2) % 8),
                2 => format!("addi x{}, x{}, {}", i % 8, (i + 1) % 8, i),
                _ => format!("mulu x{}, x{}, x{}", i % 8, (i + 1) % 8, (i + 2) % 8),
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}

proptest! {
    #[test]
    fn bundle_capacity_never_exceeds_one_instruction_per_non_alu_class(src in arb_straight_line_program()) {
        let s = schedule_source(&src);
        for bundle in s.simple.schedule.iter() {
            let mut alu = 0;
            let mut mulu = 0;
            let mut mem = 0;
            let mut branch = 0;
            for class in bundle.classes() {
                match class {
                    ExecClass::Alu => alu += 1,
                    ExecClass::Mulu => mulu += 1,
                    ExecClass::Mem => mem += 1,
                    ExecClass::Branch => branch += 1,
                }
            }
            prop_assert!(alu <= 2);
            prop_assert!(mulu <= 1);
            prop_assert!(mem <= 1);
            prop_assert!(branch <= 1);
        }
    }

    #[test]
    fn every_local_dependency_is_respected_in_the_simple_schedule(src in arb_straight_line_program()) {
        let s = schedule_source(&src);
        let issue_cycle: Vec<Option<usize>> = {
            let mut issue = vec![None; s.instructions.len()];
            for (cycle, bundle) in s.simple.schedule.iter().enumerate() {
                for inst in bundle.instructions() {
                    if inst.id >= 0 {
                        issue[inst.id as usize] = Some(cycle);
                    }
                }
            }
            issue
        };
        let latency = |idx: usize| {
            if s.instructions[idx].opcode == vliw470_core::isa::Opcode::Mulu { 3 } else { 1 }
        };
        for (i, entry) in s.simple_deps.entries.iter().enumerate() {
            let Some(consumer_issue) = issue_cycle[i] else { continue };
            for dep in &entry.local {
                let Some(producer) = dep.producer else { continue };
                let finished = issue_cycle[producer].unwrap() + latency(producer);
                prop_assert!(consumer_issue >= finished);
            }
        }
    }
}

#[test]
fn recurrence_bound_holds_for_every_pipelined_inter_loop_dependency() {
    for src in [
        "mulu x3, x3, x4\nsub x4, x4, x5\nloop 0",
        "addi x1, x1, 1\naddi x2, x2, 1\naddi x3, x3, 1\naddi x4, x4, 1\nloop 0",
    ] {
        let s = schedule_source(src);
        let mut issue = vec![None; s.instructions.len()];
        for (cycle, bundle) in s.pipeline.schedule.iter().enumerate() {
            if cycle < s.pipeline.bb0_end || cycle >= s.pipeline.bb1_end {
                continue;
            }
            for inst in bundle.instructions() {
                if inst.id >= 0 {
                    issue[inst.id as usize] = Some(cycle - s.pipeline.bb0_end);
                }
            }
        }
        let latency = |idx: usize| {
            if s.instructions[idx].opcode == vliw470_core::isa::Opcode::Mulu { 3 } else { 1 }
        };
        for (i, entry) in s.pipeline_deps.entries.iter().enumerate() {
            for dep in &entry.inter_loop {
                let Some(producer) = dep.producer_interloop else { continue };
                let Some(consumer_issue) = issue[i] else { continue };
                let Some(producer_issue) = issue[producer] else { continue };
                let finished = producer_issue + latency(producer);
                assert!(finished <= s.pipeline.ii + consumer_issue);
            }
        }
    }
}

#[test]
fn renaming_never_leaves_a_source_program_general_register_name_behind() {
    // x9/x10 sit well above the fresh counter's low allocations, so they can
    // only appear post-rename if the renamer failed to rewrite them.
    let s = schedule_source("mov x9, 1\naddi x10, x9, 5\nst x10, 0(x9)");
    for bundle in s.simple.schedule.iter() {
        for inst in bundle.instructions() {
            for reg in [inst.rd, inst.rs1, inst.rs2].into_iter().flatten() {
                if reg.kind() == vliw470_core::common::reg::RegKind::General {
                    assert_ne!(reg, vliw470_core::common::reg::Register::general(9));
                    assert_ne!(reg, vliw470_core::common::reg::Register::general(10));
                }
            }
        }
    }
}
