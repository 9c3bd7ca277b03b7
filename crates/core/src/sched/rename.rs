//! Fresh-register allocators shared by both schedulers.
//!
//! Each scheduler run owns its own generator instances — there is no global
//! counter, and the two schedulers never see each other's allocations (see
//! SPEC_FULL.md's note on independent rename-state per scheduler).

use crate::common::bundle::Schedule;
use crate::common::reg::Register;
use crate::sched::deps::DependencyTable;

/// A register with no resolved producer yet. Operand-linking passes write
/// this placeholder in, then a final pass replaces every occurrence with a
/// freshly allocated register — mirroring an operand that reads a value
/// defined outside the program (hardware-reset state, an unwritten input).
pub const NULL_MARKER: Register = Register::general(u32::MAX);

/// Allocates fresh, non-rotating general registers from a starting index.
#[derive(Debug, Clone)]
pub struct FreshRegGenerator {
    next: u32,
}

impl FreshRegGenerator {
    /// A generator whose first allocation is `start`.
    #[must_use]
    pub fn starting_at(start: u32) -> Self {
        Self { next: start }
    }

    /// Allocates and returns the next general register.
    pub fn next_general(&mut self) -> Register {
        let r = Register::general(self.next);
        self.next += 1;
        r
    }
}

/// Allocates fresh rotating-register bases, spaced so that no two
/// simultaneously-live values ever alias across the `num_stage + 1` physical
/// copies the rotating file provides per logical name.
#[derive(Debug, Clone)]
pub struct FreshRotatingGenerator {
    next_base: u32,
    step: u32,
}

impl FreshRotatingGenerator {
    /// A generator for a pipelined schedule with `num_stage` stages.
    #[must_use]
    pub fn new(num_stage: u32) -> Self {
        Self {
            next_base: 32,
            step: num_stage + 1,
        }
    }

    /// Allocates a fresh rotating general register.
    pub fn next_general(&mut self) -> Register {
        let base = self.next_base;
        self.next_base += self.step;
        Register::rotating_general(base)
    }

    /// Allocates a fresh rotating predicate register.
    pub fn next_predicate(&mut self) -> Register {
        let base = self.next_base;
        self.next_base += self.step;
        Register::rotating_predicate(base)
    }
}

/// Finds the `Dep` matching `orig` among `idx`'s dependencies and returns its
/// producer's renamed register. An inter-loop dependency with no BB0
/// producer resolves directly to the BB1 producer's own register — the
/// recurrence is closed by that instruction's own fixed destination, with no
/// separate "first iteration" home to seed.
///
/// Used for BB0/BB2 local linking by both schedulers; the pipelined
/// scheduler's loop body instead resolves operands through its own
/// stage-offset arithmetic (see [`crate::sched::pipeline`]).
pub fn resolve_operand(deps: &DependencyTable, idx: usize, orig: Register) -> Register {
    for dep in deps.entries[idx].all_deps() {
        if dep.consumer_reg != orig {
            continue;
        }
        if let Some(p) = dep.producer {
            return deps.entries[p]
                .renamed_dest
                .expect("producer renamed before its consumer is linked");
        }
        if let Some(p_bb1) = dep.producer_interloop {
            return deps.entries[p_bb1]
                .renamed_dest
                .expect("producer renamed before its consumer is linked");
        }
    }
    NULL_MARKER
}

/// Replaces every remaining [`NULL_MARKER`] operand — an operand with no
/// dependency-table producer at all, i.e. one reading externally-defined
/// state — with a freshly allocated register.
pub fn fill_null_registers(schedule: &mut Schedule, fresh: &mut FreshRegGenerator) {
    for bundle in schedule.iter_mut() {
        for inst in bundle.instructions_mut() {
            if inst.rs1 == Some(NULL_MARKER) {
                inst.rs1 = Some(fresh.next_general());
            }
            if inst.rs2 == Some(NULL_MARKER) {
                inst.rs2 = Some(fresh.next_general());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_reg_generator_counts_up_from_start() {
        let mut g = FreshRegGenerator::starting_at(1);
        assert_eq!(g.next_general(), Register::general(1));
        assert_eq!(g.next_general(), Register::general(2));
    }

    #[test]
    fn fresh_rotating_generator_spaces_by_num_stage_plus_one() {
        let mut g = FreshRotatingGenerator::new(2);
        assert_eq!(g.next_general(), Register::rotating_general(32));
        assert_eq!(g.next_general(), Register::rotating_general(35));
    }
}
