//! Error types produced by the FET-80 machine model and interpreter.

use std::fmt;

/// Identifies which register or memory cell an uninitialized read came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterKind {
    /// The `A` register.
    A,
    /// The `B` register.
    B,
    /// The ALU's accumulator.
    Acc,
    /// The RAM cell currently addressed by the MAR.
    M,
    /// The RAM's memory-address register.
    Mar,
    /// The program counter.
    Pc,
    /// A ROM slot at the given address.
    Rom(u32),
}

impl fmt::Display for RegisterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "register A"),
            Self::B => write!(f, "register B"),
            Self::Acc => write!(f, "accumulator"),
            Self::M => write!(f, "RAM cell M"),
            Self::Mar => write!(f, "memory-address register"),
            Self::Pc => write!(f, "program counter"),
            Self::Rom(addr) => write!(f, "ROM[0x{addr:x}]"),
        }
    }
}

/// Errors raised while stepping or constructing a [`crate::Machine`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecutionError {
    /// A register or memory cell was read before it was ever written.
    #[error("uninitialized read of {which} at instruction 0x{address:x}")]
    UninitializedRead {
        /// What was read.
        which: RegisterKind,
        /// The instruction address at which the read occurred.
        address: u32,
    },

    /// ALU flags were read before any computation was performed.
    #[error("ALU flags unavailable before any computation (at 0x{address:x})")]
    FlagsUnavailable {
        /// The instruction address at which the read occurred.
        address: u32,
    },

    /// A ROM slot was empty, or an instruction's `src`/`dest`/opcode was
    /// invalid for its family.
    #[error("illegal instruction at 0x{address:x}: {reason}")]
    IllegalInstruction {
        /// The offending instruction's address.
        address: u32,
        /// Human-readable reason.
        reason: String,
    },

    /// A loaded record's operand or address exceeded the configured width.
    #[error("value 0x{value:x} out of range for a {width}-bit field")]
    ValueOutOfRange {
        /// The out-of-range value.
        value: u32,
        /// The width (in bits) it was expected to fit.
        width: u32,
    },

    /// `Machine::new` was called with a width outside `1..=32`.
    #[error("invalid construction width: {0} bits")]
    InvalidWidth(u32),
}

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, ExecutionError>;
