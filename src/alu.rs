//! The two-function ALU: `ADD` and `NAND`, with a derived flag block and a
//! latched accumulator register.

use crate::error::{ExecutionError, RegisterKind};
use crate::register::{mask_for_width, Register};

/// The ALU's selectable function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    /// Binary addition with carry-in.
    Add,
    /// Bitwise NAND (`!(x & y)`).
    Nand,
}

/// The seven status flags derived from the most recent [`Alu::compute`] call.
///
/// All flags are derived from the same computed output and the adder's carry
/// bit, regardless of which function (`ADD` or `NAND`) produced that output —
/// `cout` always reflects the adder running *during this call*, even under
/// `NAND` (see spec §4.2 / §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)] // one flag per named condition, not independent settings
pub struct Flags {
    /// Carry out of the adder, unconditionally computed every call.
    pub cout: bool,
    /// `OUT == 0`.
    pub eqz: bool,
    /// `!eqz`.
    pub nez: bool,
    /// Sign bit of `OUT` is set.
    pub ltz: bool,
    /// `!ltz`.
    pub gez: bool,
    /// `ltz || eqz`.
    pub lez: bool,
    /// `!lez`.
    pub gtz: bool,
}

/// Two-function combinational ALU with a latched accumulator.
#[derive(Debug, Clone)]
pub struct Alu {
    width: u32,
    mask: u32,
    acc: Register,
    flags: Option<Flags>,
}

impl Alu {
    pub(crate) fn new(width: u32) -> Self {
        Self {
            width,
            mask: mask_for_width(width),
            acc: Register::new(width),
            flags: None,
        }
    }

    /// Run `op` over `x` and `y` (both normalized mod `2^width`) with carry-in
    /// `cin`, latching the output into the accumulator and refreshing the
    /// flag block. Always succeeds.
    pub(crate) fn compute(&mut self, op: AluOp, x: u32, y: u32, cin: bool) {
        let x = x & self.mask;
        let y = y & self.mask;

        let sum_raw = u64::from(x) + u64::from(y) + u64::from(cin);
        let carry = sum_raw > u64::from(self.mask);
        let sum = (sum_raw as u32) & self.mask;

        let nand_out = !(x & y) & self.mask;

        let out = match op {
            AluOp::Add => sum,
            AluOp::Nand => nand_out,
        };

        let sign_bit = 1u32 << (self.width.saturating_sub(1));
        let eqz = out == 0;
        let ltz = self.width > 0 && out & sign_bit != 0;
        let lez = ltz || eqz;

        self.flags = Some(Flags {
            cout: carry,
            eqz,
            nez: !eqz,
            ltz,
            gez: !ltz,
            lez,
            gtz: !lez,
        });

        self.acc.set(out);
    }

    /// Read the latched accumulator, failing if no computation has run yet.
    pub(crate) fn acc(&self, address: u32) -> Result<u32, ExecutionError> {
        self.acc.get(RegisterKind::Acc, address)
    }

    /// Read the current flag block, failing if no computation has run yet.
    pub(crate) fn flags(&self, address: u32) -> Result<Flags, ExecutionError> {
        self.flags
            .ok_or(ExecutionError::FlagsUnavailable { address })
    }
}
