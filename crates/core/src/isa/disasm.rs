//! Renders a [`ScheduledInstruction`] back to the textual forms of §6,
//! including the pipelined-schedule conventions: `loop.pip`, a `(p{32+stage})`
//! guard prefix, and `mov p32, true` rendered verbatim rather than as `mov
//! p32, 1`.

use crate::isa::instruction::{Opcode, ScheduledInstruction};

/// Renders a bare instruction (used for the simple schedule, and for
/// non-body instructions of the pipelined schedule).
#[must_use]
pub fn render(inst: &ScheduledInstruction) -> String {
    match inst.opcode {
        Opcode::Add | Opcode::Sub | Opcode::Mulu => format!(
            "{} {}, {}, {}",
            inst.opcode.mnemonic(),
            inst.rd.unwrap(),
            inst.rs1.unwrap(),
            inst.rs2.unwrap()
        ),
        Opcode::Addi => format!(
            "addi {}, {}, {}",
            inst.rd.unwrap(),
            inst.rs1.unwrap(),
            inst.imm.unwrap()
        ),
        Opcode::Mov => render_mov(inst),
        Opcode::Ld => format!(
            "ld {}, {}({})",
            inst.rd.unwrap(),
            inst.imm.unwrap(),
            inst.rs1.unwrap()
        ),
        Opcode::St => format!(
            "st {}, {}({})",
            inst.rs2.unwrap(),
            inst.imm.unwrap(),
            inst.rs1.unwrap()
        ),
        Opcode::Loop => format!("loop {}", inst.imm.unwrap()),
    }
}

fn render_mov(inst: &ScheduledInstruction) -> String {
    // `mov p32, true` is the predicate-init synthetic the pipelined scheduler
    // inserts at the end of BB0; it must render verbatim, not as `mov p32, 1`.
    if inst.is_synthetic() {
        if let Some(rd) = inst.rd {
            if rd.kind() == crate::common::reg::RegKind::Predicate && inst.rs1.is_none() {
                return format!("mov {rd}, true");
            }
        }
    }
    match (inst.rs1, inst.imm) {
        (Some(rs1), _) => format!("mov {}, {}", inst.rd.unwrap(), rs1),
        (None, Some(imm)) => format!("mov {}, {}", inst.rd.unwrap(), imm),
        (None, None) => unreachable!("mov must carry either rs1 or imm"),
    }
}

/// Renders a body instruction of the pipelined schedule, with its predicate
/// guard prefix and `loop` → `loop.pip` rewrite.
///
/// `stage` is `None` for synthetic prolog instructions (which carry no
/// predicate guard) and `Some(stage)` for every real body instruction.
/// `loop_pip_target` is the already-adjusted branch target to substitute for
/// the `loop` instruction's immediate.
#[must_use]
pub fn render_pipelined_body(
    inst: &ScheduledInstruction,
    stage: Option<u32>,
    loop_pip_target: Option<i64>,
) -> String {
    if inst.opcode == Opcode::Loop {
        let target = loop_pip_target.unwrap_or_else(|| inst.imm.unwrap());
        return format!("loop.pip {target}");
    }
    if inst.is_synthetic() {
        return render(inst);
    }
    match stage {
        Some(s) => format!("(p{}) {}", 32 + s, render(inst)),
        None => render(inst),
    }
}
