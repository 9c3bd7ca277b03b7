//! The six literal end-to-end scenarios.

use pretty_assertions::assert_eq;
use rstest::rstest;
use vliw470_core::common::reg::Register;
use vliw470_core::isa::Opcode;

use crate::common::schedule_source;

#[rstest]
#[case::straight_line("mov x1, 1\naddi x2, x1, 5\nst x2, 0(x1)", 0)]
#[case::single_instruction_body("mov x1, 10\nmov LC, x1\naddi x2, x2, 1\nloop 2", 1)]
#[case::mulu_recurrence("mulu x3, x3, x4\nsub x4, x4, x5\nloop 0", 3)]
#[case::resource_pressure(
    "addi x1, x1, 1\naddi x2, x2, 1\naddi x3, x3, 1\naddi x4, x4, 1\nloop 0",
    2
)]
fn pipelined_ii_matches_the_expected_lower_bound(#[case] src: &str, #[case] min_ii: usize) {
    let s = schedule_source(src);
    assert!(s.pipeline.ii >= min_ii);
}

#[test]
fn straight_line_program_pipelines_identically_to_simple() {
    let s = schedule_source("mov x1, 1\naddi x2, x1, 5\nst x2, 0(x1)");

    assert_eq!(s.simple.bb0_end, 3);
    let c0 = s.simple.schedule.get(0).unwrap().instructions()[0].clone();
    assert_eq!(c0.opcode, Opcode::Mov);
    assert_eq!(c0.imm, Some(1));

    let c1 = s.simple.schedule.get(1).unwrap().instructions()[0].clone();
    assert_eq!(c1.opcode, Opcode::Addi);
    assert_eq!(c1.rs1, Some(c0.rd.unwrap()));

    let c2 = s.simple.schedule.get(2).unwrap().instructions()[0].clone();
    assert_eq!(c2.opcode, Opcode::St);
    assert_eq!(c2.rs1, Some(c1.rd.unwrap()));
    assert_eq!(c2.rs2, Some(c0.rd.unwrap()));

    // No loop: the pipelined schedule degenerates to the straight-line path.
    assert_eq!(s.pipeline.ii, 0);
    assert_eq!(s.pipeline.num_stage, 0);
}

#[test]
fn one_instruction_body_pipelines_with_ii_one_guarded_by_p32() {
    let s = schedule_source("mov x1, 10\nmov LC, x1\naddi x2, x2, 1\nloop 2");

    assert_eq!(s.simple.bb0_end, 2);
    assert_eq!(s.simple.bb1_end - s.simple.bb0_end, 2); // addi + loop

    assert_eq!(s.pipeline.ii, 1);
    assert_eq!(s.pipeline.num_stage, 1);
    let body = s
        .pipeline
        .schedule
        .get(s.pipeline.bb0_end)
        .unwrap()
        .instructions()
        .iter()
        .find(|i| i.opcode == Opcode::Addi)
        .unwrap();
    assert_eq!(s.pipeline_deps.entries[2].stage, Some(0));
    let _ = body;
}

#[test]
fn mulu_self_recurrence_stretches_the_simple_body_and_raises_pipelined_ii() {
    let s = schedule_source("mulu x3, x3, x4\nsub x4, x4, x5\nloop 0");

    // finished(mulu) = issue + 3; body must stretch until that fits in one iteration.
    assert!(s.simple.bb1_end - s.simple.bb0_end >= 3);

    let fixups: Vec<_> = s
        .simple
        .schedule
        .iter()
        .flat_map(|b| b.instructions())
        .filter(|i| i.id < 0 && i.opcode == Opcode::Mov)
        .collect();
    // `loop 0` means BB0 is empty, so x3/x4 have no BB0 producer to seed from —
    // the self-recurrence closes on the BB1 producer's own register instead.
    assert_eq!(fixups.len(), 0, "no BB0 producer exists for x3/x4, so no fixup mov is inserted");

    // issue(mulu) = 0 within the body; 3 <= II + 0 forces II >= 3.
    assert!(s.pipeline.ii >= 3);
}

#[test]
fn loop_invariant_base_gets_a_static_renamed_register_in_the_body() {
    let s = schedule_source("mov x1, 7\nld x2, 0(x1)\naddi x3, x2, 1\nloop 1");

    let ld = s
        .pipeline
        .schedule
        .get(s.pipeline.bb0_end)
        .unwrap()
        .instructions()
        .iter()
        .find(|i| i.opcode == Opcode::Ld)
        .unwrap()
        .clone();
    let base = ld.rs1.unwrap();
    assert!(
        matches!(base, Register::Static { .. }),
        "a loop-invariant operand resolves to a static (non-rotating) register"
    );
}

#[test]
fn post_loop_use_reads_the_final_iterations_rotating_value() {
    let s = schedule_source("mulu x1, x2, x3\nloop 0\nst x1, 0(x4)");

    let epilog_cycle = s.pipeline.bb1_end;
    let st = s
        .pipeline
        .schedule
        .get(epilog_cycle)
        .unwrap()
        .instructions()
        .iter()
        .find(|i| i.opcode == Opcode::St)
        .unwrap()
        .clone();
    let src = st.rs2.unwrap();
    match src {
        Register::Rotating { stage_offset, .. } => {
            assert_eq!(stage_offset, s.pipeline.num_stage as i32 - 1);
        }
        Register::Static { .. } => panic!("post-loop read of a BB1-produced value must rotate"),
    }
}

#[test]
fn four_independent_alu_instructions_force_ii_two() {
    let s = schedule_source(
        "addi x1, x1, 1\naddi x2, x2, 1\naddi x3, x3, 1\naddi x4, x4, 1\nloop 0",
    );
    assert_eq!(s.pipeline.ii, 2); // ceil(4 ALU / 2 ALU slots)
}
