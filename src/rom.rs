//! `2^A`-slot program ROM with an integrated program counter register.

use crate::error::{ExecutionError, RegisterKind};
use crate::instruction::Instruction;
use crate::register::{mask_for_width, Register};

/// Program ROM: a flat array of instruction slots plus the PC.
#[derive(Debug, Clone)]
pub struct Rom {
    slots: Vec<Option<Instruction>>,
    pc: Register,
    addr_mask: u32,
}

impl Rom {
    pub(crate) fn new(addr_width: u32) -> Self {
        let words = 1usize << addr_width.min(31);
        let mut rom = Self {
            slots: vec![None; words],
            pc: Register::new(addr_width),
            addr_mask: mask_for_width(addr_width),
        };
        rom.pc.set(0);
        rom
    }

    /// Empty every slot.
    pub(crate) fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    /// Clear, then place each record at its `address` field (last wins on
    /// duplicate addresses); reset PC to 0.
    pub(crate) fn load(&mut self, records: &[Instruction]) {
        self.clear();
        for record in records {
            let idx = (record.address() as usize) & (self.slots.len() - 1);
            self.slots[idx] = Some(*record);
        }
        self.pc.set(0);
    }

    /// `PC <- v mod 2^A`. Always succeeds.
    pub(crate) fn set_pc(&mut self, v: u32) {
        self.pc.set(v & self.addr_mask);
    }

    /// `PC <- (PC + 1) mod 2^A`.
    pub(crate) fn increment_pc(&mut self, address: u32) -> Result<(), ExecutionError> {
        let cur = self.pc.get(RegisterKind::Pc, address)?;
        self.pc.set(cur.wrapping_add(1) & self.addr_mask);
        Ok(())
    }

    /// Current PC value.
    pub(crate) fn pc(&self) -> u32 {
        // PC is always set (constructed at 0, and load() resets it), so this
        // never observes "unwritten" in practice; peek() avoids threading a
        // fallible read through every caller for a register that is an
        // invariant-maintained non-null value.
        self.pc.peek().unwrap_or(0)
    }

    /// Fetch the record at the current PC; fatal if that slot is empty.
    pub(crate) fn fetch(&self) -> Result<Instruction, ExecutionError> {
        let pc = self.pc();
        self.slots
            .get(pc as usize)
            .and_then(|s| *s)
            .ok_or_else(|| ExecutionError::IllegalInstruction {
                address: pc,
                reason: "empty ROM slot".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{Dest, Operand};

    fn nop(address: u32) -> Instruction {
        Instruction::Nop { address }
    }

    fn mov(address: u32, dest: Dest, src: Operand) -> Instruction {
        Instruction::Transfer { address, dest, src }
    }

    #[test]
    fn fetch_empty_slot_is_illegal() {
        let rom = Rom::new(4);
        assert!(rom.fetch().is_err());
    }

    #[test]
    fn load_places_records_by_address() {
        let mut rom = Rom::new(4);
        rom.load(&[nop(0), mov(2, Dest::A, Operand::Direct(1))]);
        assert!(rom.fetch().is_ok());
        rom.set_pc(1);
        assert!(rom.fetch().is_err());
        rom.set_pc(2);
        assert!(rom.fetch().is_ok());
    }

    #[test]
    fn duplicate_address_last_wins() {
        let mut rom = Rom::new(4);
        rom.load(&[nop(0), mov(0, Dest::A, Operand::Direct(1))]);
        assert!(matches!(rom.fetch().unwrap(), Instruction::Transfer { .. }));
    }

    #[test]
    fn load_resets_pc_and_clears_slots() {
        let mut rom = Rom::new(4);
        rom.load(&[nop(0)]);
        rom.set_pc(5);
        rom.load(&[nop(1)]);
        assert_eq!(rom.pc(), 0);
        assert!(rom.fetch().is_err());
    }

    #[test]
    fn increment_pc_wraps_modulo_width() {
        let mut rom = Rom::new(2);
        rom.set_pc(3);
        rom.increment_pc(0).unwrap();
        assert_eq!(rom.pc(), 0);
    }
}
