//! Headless core of a FET-80 emulator: the machine model (register file,
//! two-function ALU, RAM, program ROM + PC) and the instruction interpreter
//! that dispatches one decoded record per [`interpreter::step`].
//!
//! Assemblers and front-ends are external collaborators; this crate is
//! driveable entirely by a test harness — construct a [`Machine`], call
//! [`Machine::load_program`] once, then call [`interpreter::step`] in a loop.

#![warn(missing_docs)]

mod alu;
mod error;
mod instruction;
mod interpreter;
mod machine;
mod ram;
mod register;
mod rom;

pub use alu::{AluOp, Flags};
pub use error::{ExecutionError, RegisterKind, Result};
pub use instruction::{Dest, Instruction, JumpCond, Operand, Src};
pub use interpreter::step;
pub use machine::Machine;
