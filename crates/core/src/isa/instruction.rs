//! Instruction representation: the decoder's immutable output and the
//! scheduler's mutable working copy.

use crate::common::reg::Register;
use crate::common::ExecClass;

/// The instruction mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `add rd, rs1, rs2`
    Add,
    /// `sub rd, rs1, rs2`
    Sub,
    /// `addi rd, rs1, imm`
    Addi,
    /// `mulu rd, rs1, rs2`
    Mulu,
    /// `ld rd, imm(rs1)`
    Ld,
    /// `st rs2, imm(rs1)` — store source first, per the input dialect.
    St,
    /// `mov rd, rs1` or `mov rd, imm`
    Mov,
    /// `loop imm`
    Loop,
}

impl Opcode {
    /// The execution-unit class this opcode is dispatched to.
    #[must_use]
    pub fn class(self) -> ExecClass {
        match self {
            Self::Add | Self::Sub | Self::Addi | Self::Mov => ExecClass::Alu,
            Self::Mulu => ExecClass::Mulu,
            Self::Ld | Self::St => ExecClass::Mem,
            Self::Loop => ExecClass::Branch,
        }
    }

    /// Latency in cycles from issue to result visibility: 3 for `mulu`, 1 for
    /// everything else.
    #[must_use]
    pub fn latency(self) -> u32 {
        if matches!(self, Self::Mulu) {
            3
        } else {
            1
        }
    }

    /// The textual mnemonic, as it appears in input/output.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Addi => "addi",
            Self::Mulu => "mulu",
            Self::Ld => "ld",
            Self::St => "st",
            Self::Mov => "mov",
            Self::Loop => "loop",
        }
    }
}

/// An immutable decoded instruction, indexed once by its position in the
/// input stream and never renumbered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The mnemonic.
    pub opcode: Opcode,
    /// Destination register, if any.
    pub rd: Option<Register>,
    /// First source register, if any.
    pub rs1: Option<Register>,
    /// Second source register, if any.
    pub rs2: Option<Register>,
    /// Immediate operand, if any.
    pub imm: Option<i64>,
}

impl Instruction {
    /// The execution-unit class for this instruction's opcode.
    #[must_use]
    pub fn class(&self) -> ExecClass {
        self.opcode.class()
    }
}

/// A mutable working copy of an [`Instruction`], tagged with its original
/// index. The renamer rewrites `rd`/`rs1`/`rs2` in place as scheduling
/// proceeds; `opcode` and `imm` are otherwise stable (`imm` is rewritten only
/// for the `loop` instruction's target cycle).
///
/// `id < 0` marks a synthetic instruction with no dependency-table entry —
/// the `mov p32, true` / `mov EC, ...` prolog instructions the pipelined
/// scheduler inserts, and the inter-loop `mov` fixups the simple scheduler
/// inserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledInstruction {
    /// Original program index, or a negative sentinel for synthetic instructions.
    pub id: i64,
    /// The mnemonic (never rewritten).
    pub opcode: Opcode,
    /// Destination register, rewritten by the renamer.
    pub rd: Option<Register>,
    /// First source register, rewritten by the renamer.
    pub rs1: Option<Register>,
    /// Second source register, rewritten by the renamer.
    pub rs2: Option<Register>,
    /// Immediate operand. Rewritten for `loop`'s target cycle.
    pub imm: Option<i64>,
}

impl ScheduledInstruction {
    /// Builds a scheduler-owned copy of `inst`, tagged with its program index.
    #[must_use]
    pub fn from_instruction(inst: &Instruction, id: usize) -> Self {
        Self {
            id: id as i64,
            opcode: inst.opcode,
            rd: inst.rd,
            rs1: inst.rs1,
            rs2: inst.rs2,
            imm: inst.imm,
        }
    }

    /// Whether this is a synthetic instruction with no dependency-table entry.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.id < 0
    }
}
