//! Register model: static and rotating architectural registers.
//!
//! A [`Register`] is either `Static` — a plain architectural register with no
//! rotation — or `Rotating`, which additionally carries an `iter_offset` and
//! `stage_offset` that are resolved to a final index only at emission time.
//! Offset arithmetic is intra-struct and never mutates `base`; see
//! [`Register::resolved_index`].

use std::fmt;

/// The architectural register class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegKind {
    /// General-purpose integer register (`xN`).
    General,
    /// Rotating predicate register (`pN`).
    Predicate,
    /// The loop counter. Has no index.
    Lc,
    /// The epilog counter. Has no index.
    Ec,
}

/// A register operand, static or rotating.
///
/// `Static` registers are used for BB0/BB2 architectural state, for `LC`/`EC`,
/// and for loop-invariant statically-renamed registers. `Rotating` registers
/// are used only for the pipelined schedule's body instructions, where the
/// visible index shifts by one per iteration boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// A register with a fixed, non-rotating index (or no index, for LC/EC).
    Static {
        /// Register class.
        kind: RegKind,
        /// Index within the class. Unused (always 0) for `Lc`/`Ec`.
        idx: u32,
    },
    /// A rotating register: `General` or `Predicate` only.
    Rotating {
        /// Register class; must be `General` or `Predicate`.
        kind: RegKind,
        /// The allocated rotating base index.
        base: u32,
        /// Number of iteration boundaries crossed since allocation.
        iter_offset: i32,
        /// Number of pipeline stages crossed since allocation.
        stage_offset: i32,
    },
}

impl Register {
    /// A general-purpose static register `xN`.
    #[must_use]
    pub const fn general(idx: u32) -> Self {
        Self::Static {
            kind: RegKind::General,
            idx,
        }
    }

    /// A predicate static register `pN`.
    #[must_use]
    pub const fn predicate(idx: u32) -> Self {
        Self::Static {
            kind: RegKind::Predicate,
            idx,
        }
    }

    /// The loop counter register.
    #[must_use]
    pub const fn lc() -> Self {
        Self::Static {
            kind: RegKind::Lc,
            idx: 0,
        }
    }

    /// The epilog counter register.
    #[must_use]
    pub const fn ec() -> Self {
        Self::Static {
            kind: RegKind::Ec,
            idx: 0,
        }
    }

    /// A fresh rotating general register allocated at `base`, with zero offsets.
    #[must_use]
    pub fn rotating_general(base: u32) -> Self {
        Self::Rotating {
            kind: RegKind::General,
            base,
            iter_offset: 0,
            stage_offset: 0,
        }
    }

    /// A fresh rotating predicate register allocated at `base`.
    #[must_use]
    pub fn rotating_predicate(base: u32) -> Self {
        Self::Rotating {
            kind: RegKind::Predicate,
            base,
            iter_offset: 0,
            stage_offset: 0,
        }
    }

    /// Returns the register class.
    #[must_use]
    pub fn kind(&self) -> RegKind {
        match self {
            Self::Static { kind, .. } | Self::Rotating { kind, .. } => *kind,
        }
    }

    /// Returns a copy of this register with the given offsets added on top of
    /// any it already carries. Panics if called on a `Static` register —
    /// callers must allocate via `rotating_general`/`rotating_predicate` first.
    #[must_use]
    pub fn with_added_offsets(&self, iter_delta: i32, stage_delta: i32) -> Self {
        match *self {
            Self::Rotating {
                kind,
                base,
                iter_offset,
                stage_offset,
            } => Self::Rotating {
                kind,
                base,
                iter_offset: iter_offset + iter_delta,
                stage_offset: stage_offset + stage_delta,
            },
            Self::Static { .. } => {
                unreachable!("offsets can only be added to a rotating register")
            }
        }
    }

    /// Returns a copy of this rotating register with its offsets replaced
    /// outright (used when priming the prolog's first-iteration producer).
    #[must_use]
    pub fn with_offsets(&self, iter_offset: i32, stage_offset: i32) -> Self {
        match *self {
            Self::Rotating { kind, base, .. } => Self::Rotating {
                kind,
                base,
                iter_offset,
                stage_offset,
            },
            Self::Static { .. } => {
                unreachable!("offsets can only be set on a rotating register")
            }
        }
    }

    /// Resolves the final displayed index: `idx + iter_offset + stage_offset`
    /// for a rotating register, or the bare `idx` for a static one.
    ///
    /// # Panics
    ///
    /// Panics if called on `Lc`/`Ec`, which have no index to resolve.
    #[must_use]
    pub fn resolved_index(&self) -> i64 {
        match *self {
            Self::Static { kind, idx } => {
                assert!(
                    !matches!(kind, RegKind::Lc | RegKind::Ec),
                    "LC/EC have no resolvable index"
                );
                i64::from(idx)
            }
            Self::Rotating {
                base,
                iter_offset,
                stage_offset,
                ..
            } => i64::from(base) + i64::from(iter_offset) + i64::from(stage_offset),
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            RegKind::General => write!(f, "x{}", self.resolved_index()),
            RegKind::Predicate => write!(f, "p{}", self.resolved_index()),
            RegKind::Lc => write!(f, "LC"),
            RegKind::Ec => write!(f, "EC"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_register_display() {
        assert_eq!(Register::general(3).to_string(), "x3");
        assert_eq!(Register::predicate(1).to_string(), "p1");
        assert_eq!(Register::lc().to_string(), "LC");
        assert_eq!(Register::ec().to_string(), "EC");
    }

    #[test]
    fn rotating_register_resolves_with_offsets() {
        let r = Register::rotating_general(32).with_added_offsets(1, 2);
        assert_eq!(r.resolved_index(), 35);
        assert_eq!(r.to_string(), "x35");
    }

    #[test]
    fn offsets_never_mutate_base() {
        let base = Register::rotating_general(40);
        let shifted = base.with_added_offsets(3, 0);
        assert_eq!(base.resolved_index(), 40);
        assert_eq!(shifted.resolved_index(), 43);
    }

    #[test]
    #[should_panic(expected = "LC/EC have no resolvable index")]
    fn lc_has_no_resolvable_index() {
        let _ = Register::lc().resolved_index();
    }
}
