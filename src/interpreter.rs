//! Decodes one instruction record per [`step`] and dispatches it to its
//! family's semantic effect on a [`Machine`], including the PC update.
//!
//! Ordering inside a single step is strictly sequential (spec §5): fetch,
//! resolve operands, apply side effects, update PC. An error aborts exactly
//! where it occurs; earlier side effects in the same instruction remain
//! visible to the caller.

use crate::alu::Flags;
use crate::error::ExecutionError;
use crate::instruction::{Dest, Instruction, JumpCond, Operand, Src};
use crate::machine::Machine;

/// Execute exactly one instruction: fetch from ROM at the current PC, apply
/// its effect, and update PC. The only public mutator of a [`Machine`].
///
/// # Errors
///
/// Returns whatever [`ExecutionError`] the instruction's family raises
/// resolving an operand, reading an uninitialized register, or fetching an
/// empty ROM slot. Any side effects already applied earlier in the same step
/// remain visible on the `Machine` after an error (see module docs).
pub fn step(machine: &mut Machine) -> Result<(), ExecutionError> {
    let instr = machine.current_instruction()?;
    let address = instr.address();

    let result = match instr {
        Instruction::Transfer { dest, src, .. } => run_transfer(machine, dest, src),
        Instruction::Mem { src, .. } => run_mem(machine, src),
        Instruction::Compute { op, dest, src, .. } => run_compute(machine, op, dest, src),
        Instruction::Jump { cond, src, .. } => run_jump(machine, cond, src),
        Instruction::Nop { .. } => Ok(()), // No state change, no PC increment (spec §9 Q1).
    };

    match &result {
        Ok(()) => log::trace!("step at 0x{:x} ok, PC now 0x{:x}", address, machine.get_pc()),
        Err(e) => log::warn!("step at 0x{address:x} failed: {e}"),
    }

    result
}

fn source_value(machine: &Machine, src: Operand) -> Result<u32, ExecutionError> {
    match src {
        Operand::Direct(v) => Ok(v),
        Operand::Register(Src::A) => machine.get_a(),
        Operand::Register(Src::B) => machine.get_b(),
        Operand::Register(Src::M) => machine.get_m(),
    }
}

fn destination_read(machine: &Machine, dest: Dest) -> Result<u32, ExecutionError> {
    match dest {
        Dest::A => machine.get_a(),
        Dest::B => machine.get_b(),
        Dest::M => machine.get_m(),
    }
}

fn destination_write(machine: &mut Machine, dest: Dest, value: u32) -> Result<(), ExecutionError> {
    match dest {
        Dest::A => {
            machine.set_a(value);
            Ok(())
        }
        Dest::B => {
            machine.set_b(value);
            Ok(())
        }
        Dest::M => machine.set_m(value),
    }
}

fn run_transfer(machine: &mut Machine, dest: Dest, src: Operand) -> Result<(), ExecutionError> {
    let value = source_value(machine, src)?;
    destination_write(machine, dest, value)?;
    machine.increment_pc()
}

fn run_mem(machine: &mut Machine, src: Operand) -> Result<(), ExecutionError> {
    // Operand width is min(data_width, addr_width); excess bits are dropped
    // by the MAR's own modulo on set_m_address, so no extra masking needed
    // here beyond reading the value normally.
    let value = source_value(machine, src)?;
    machine.set_m_address(value);
    machine.increment_pc()
}

fn run_compute(
    machine: &mut Machine,
    op: crate::alu::AluOp,
    dest: Dest,
    src: Operand,
) -> Result<(), ExecutionError> {
    let x = destination_read(machine, dest)?;
    let y = source_value(machine, src)?;
    match op {
        crate::alu::AluOp::Add => machine.add(x, y, false),
        crate::alu::AluOp::Nand => machine.nand(x, y),
    }
    let acc = machine.get_acc()?;
    destination_write(machine, dest, acc)?;
    machine.increment_pc()
}

fn run_jump(machine: &mut Machine, cond: JumpCond, src: Operand) -> Result<(), ExecutionError> {
    let jump = if cond == JumpCond::Jmp {
        true
    } else {
        let flags: Flags = machine.flags()?;
        match cond {
            JumpCond::Jmp => unreachable!(),
            JumpCond::Jc => flags.cout,
            JumpCond::Jnc => !flags.cout,
            JumpCond::Jeqz => flags.eqz,
            JumpCond::Jnez => flags.nez,
            JumpCond::Jgtz => flags.gtz,
            JumpCond::Jltz => flags.ltz,
            JumpCond::Jgez => flags.gez,
            JumpCond::Jlez => flags.lez,
        }
    };

    if jump {
        let target = source_value(machine, src)?;
        machine.set_pc(target);
        Ok(())
    } else {
        machine.increment_pc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alu::AluOp;
    use crate::instruction::Instruction;
    use crate::Machine;

    fn mk(records: &[Instruction]) -> Machine {
        let mut m = Machine::new(8, 8).unwrap();
        m.load_program(records).unwrap();
        m
    }

    #[test]
    fn transfer_increments_pc() {
        let mut m = mk(&[Instruction::Transfer {
            address: 0,
            dest: Dest::A,
            src: Operand::Direct(42),
        }]);
        step(&mut m).unwrap();
        assert_eq!(m.get_a().unwrap(), 42);
        assert_eq!(m.get_pc(), 1);
    }

    #[test]
    fn nop_does_not_advance_pc() {
        let mut m = mk(&[Instruction::Nop { address: 0 }]);
        step(&mut m).unwrap();
        assert_eq!(m.get_pc(), 0);
        step(&mut m).unwrap();
        assert_eq!(m.get_pc(), 0);
    }

    #[test]
    fn compute_reads_dest_and_src_then_writes_back() {
        let mut m = mk(&[Instruction::Compute {
            address: 0,
            op: AluOp::Add,
            dest: Dest::A,
            src: Operand::Direct(5),
        }]);
        m.set_a(10);
        step(&mut m).unwrap();
        assert_eq!(m.get_a().unwrap(), 15);
        assert_eq!(m.get_pc(), 1);
    }

    #[test]
    fn failed_step_leaves_earlier_state_visible_and_pc_unmoved() {
        // First instruction succeeds and latches ACC==6. Second instruction
        // fails resolving its source (M never written) before ever reaching
        // the ALU, so ACC and PC are left exactly as the first step left
        // them (spec §5/§7: the machine remains inspectable after an error).
        let mut m = mk(&[
            Instruction::Compute {
                address: 0,
                op: AluOp::Add,
                dest: Dest::A,
                src: Operand::Direct(6),
            },
            Instruction::Compute {
                address: 1,
                op: AluOp::Add,
                dest: Dest::A,
                src: Operand::Register(Src::M),
            },
        ]);
        m.set_a(0);
        step(&mut m).unwrap();
        assert_eq!(m.get_acc().unwrap(), 6);

        assert!(step(&mut m).is_err());
        assert_eq!(m.get_acc().unwrap(), 6);
        assert_eq!(m.get_pc(), 1);
    }

    #[test]
    fn jump_before_compute_is_flags_unavailable() {
        let mut m = mk(&[Instruction::Jump {
            address: 0,
            cond: JumpCond::Jeqz,
            src: Operand::Direct(5),
        }]);
        assert!(step(&mut m).is_err());
    }

    #[test]
    fn unconditional_jump_sets_pc() {
        let mut m = mk(&[Instruction::Jump {
            address: 0,
            cond: JumpCond::Jmp,
            src: Operand::Direct(5),
        }]);
        step(&mut m).unwrap();
        assert_eq!(m.get_pc(), 5);
    }

    #[test]
    fn conditional_jump_not_taken_falls_through() {
        let mut m = mk(&[
            Instruction::Compute {
                address: 0,
                op: AluOp::Add,
                dest: Dest::A,
                src: Operand::Direct(0),
            },
            Instruction::Jump {
                address: 1,
                cond: JumpCond::Jeqz,
                src: Operand::Direct(20),
            },
        ]);
        m.set_a(1);
        step(&mut m).unwrap();
        step(&mut m).unwrap();
        assert_eq!(m.get_pc(), 2);
    }
}
