//! The `Machine`: owns one ALU, one RAM, one ROM, and the `A`/`B` registers.
//!
//! This is a thin composition layer — all widths are taken from construction
//! parameters and forwarded to each component. `Machine` performs no
//! interpretation of instructions itself; that's [`crate::interpreter`]'s job.

use crate::alu::{Alu, AluOp, Flags};
use crate::error::{ExecutionError, RegisterKind};
use crate::instruction::Instruction;
use crate::ram::Ram;
use crate::register::Register;
use crate::rom::Rom;

/// The complete FET-80 machine state: register file, ALU, RAM, and ROM+PC.
#[derive(Debug, Clone)]
pub struct Machine {
    data_width: u32,
    addr_width: u32,
    a: Register,
    b: Register,
    alu: Alu,
    ram: Ram,
    rom: Rom,
}

impl Machine {
    /// Construct a new machine with the given data and address bit widths.
    ///
    /// Both widths must be in `1..=32`. RAM and ROM each get `2^addr_width`
    /// words; `A`, `B`, `M`, and `ACC` are `data_width` bits wide.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::InvalidWidth`] if either width is 0 or
    /// greater than 32.
    pub fn new(data_width: u32, addr_width: u32) -> Result<Self, ExecutionError> {
        if !(1..=32).contains(&data_width) {
            return Err(ExecutionError::InvalidWidth(data_width));
        }
        if !(1..=32).contains(&addr_width) {
            return Err(ExecutionError::InvalidWidth(addr_width));
        }
        Ok(Self {
            data_width,
            addr_width,
            a: Register::new(data_width),
            b: Register::new(data_width),
            alu: Alu::new(data_width),
            ram: Ram::new(data_width, addr_width),
            rom: Rom::new(addr_width),
        })
    }

    /// The configured data width, in bits.
    #[must_use]
    pub fn data_width(&self) -> u32 {
        self.data_width
    }

    /// The configured address width, in bits.
    #[must_use]
    pub fn addr_width(&self) -> u32 {
        self.addr_width
    }

    /// Load a program into ROM, clearing previous contents and resetting PC
    /// to 0. Loads once per call (spec §9 Q3 — the source's double-call
    /// is treated as a bug and not reproduced). Does **not** clear RAM, A, B,
    /// or ALU state; programs are expected to initialize memory they read.
    ///
    /// Every record's `address` is validated against `2^addr_width` before
    /// anything is committed to ROM, rather than silently wrapping a
    /// caller's out-of-range address.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::ValueOutOfRange`] if any record's `address`
    /// does not fit in `addr_width` bits. On error, ROM is left unchanged.
    pub fn load_program(&mut self, records: &[Instruction]) -> Result<(), ExecutionError> {
        let limit = 1u64 << self.addr_width.min(63);
        if let Some(bad) = records
            .iter()
            .map(Instruction::address)
            .find(|&addr| u64::from(addr) >= limit)
        {
            return Err(ExecutionError::ValueOutOfRange {
                value: bad,
                width: self.addr_width,
            });
        }

        log::debug!(
            "loading program: {} record(s), highest address 0x{:x}",
            records.len(),
            records.iter().map(Instruction::address).max().unwrap_or(0)
        );
        self.rom.load(records);
        Ok(())
    }

    /// Set register `A`.
    pub fn set_a(&mut self, v: u32) {
        self.a.set(v);
    }

    /// Read register `A`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::UninitializedRead`] if `A` has never been set.
    pub fn get_a(&self) -> Result<u32, ExecutionError> {
        self.a.get(RegisterKind::A, self.rom.pc())
    }

    /// Set register `B`.
    pub fn set_b(&mut self, v: u32) {
        self.b.set(v);
    }

    /// Read register `B`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::UninitializedRead`] if `B` has never been set.
    pub fn get_b(&self) -> Result<u32, ExecutionError> {
        self.b.get(RegisterKind::B, self.rom.pc())
    }

    /// Set the RAM's memory-address register (the first half of the
    /// MAR-then-data write protocol described in spec §4.3).
    pub fn set_m_address(&mut self, v: u32) {
        self.ram.set_address(v);
    }

    /// Current MAR value, if ever written.
    #[must_use]
    pub fn get_m_address(&self) -> Option<u32> {
        self.ram.mar_value()
    }

    /// Write the RAM cell currently addressed by the MAR.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::UninitializedRead`] if the MAR has never
    /// been set via [`Machine::set_m_address`].
    pub fn set_m(&mut self, v: u32) -> Result<(), ExecutionError> {
        self.ram.write(v, self.rom.pc())
    }

    /// Read the RAM cell currently addressed by the MAR.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::UninitializedRead`] if the MAR is unset or
    /// the addressed cell has never been written.
    pub fn get_m(&self) -> Result<u32, ExecutionError> {
        self.ram.read(self.rom.pc())
    }

    /// Set the program counter.
    pub fn set_pc(&mut self, v: u32) {
        self.rom.set_pc(v);
    }

    /// Read the program counter.
    #[must_use]
    pub fn get_pc(&self) -> u32 {
        self.rom.pc()
    }

    /// Advance the program counter by one, modulo `2^addr_width`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::UninitializedRead`] if the PC has somehow
    /// never been set; in practice this cannot happen since construction and
    /// [`Machine::load_program`] both initialize it to 0.
    pub fn increment_pc(&mut self) -> Result<(), ExecutionError> {
        self.rom.increment_pc(self.rom.pc())
    }

    /// Run the ALU's `ADD` function over `x` and `y` with optional carry-in.
    pub fn add(&mut self, x: u32, y: u32, cin: bool) {
        self.alu.compute(AluOp::Add, x, y, cin);
    }

    /// Run the ALU's `NAND` function over `x` and `y`.
    pub fn nand(&mut self, x: u32, y: u32) {
        self.alu.compute(AluOp::Nand, x, y, false);
    }

    /// Read the ALU's latched accumulator.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::UninitializedRead`] if [`Machine::add`] or
    /// [`Machine::nand`] has never run.
    pub fn get_acc(&self) -> Result<u32, ExecutionError> {
        self.alu.acc(self.rom.pc())
    }

    /// Read the ALU's current flag block.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::FlagsUnavailable`] if [`Machine::add`] or
    /// [`Machine::nand`] has never run.
    pub fn flags(&self) -> Result<Flags, ExecutionError> {
        self.alu.flags(self.rom.pc())
    }

    /// Fetch the instruction at the current PC without advancing it.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::IllegalInstruction`] if the ROM slot at the
    /// current PC is empty.
    pub fn current_instruction(&self) -> Result<Instruction, ExecutionError> {
        self.rom.fetch()
    }

    /// The raw PC value, independent of whether that slot holds an
    /// instruction. Useful for logging and debug output without paying for
    /// a full fetch.
    #[must_use]
    pub fn current_instruction_address(&self) -> u32 {
        self.rom.pc()
    }

    /// A `2^addr_width`-long snapshot of RAM contents; `None` for
    /// never-written cells.
    #[must_use]
    pub fn ram_snapshot(&self) -> Vec<Option<u32>> {
        self.ram.snapshot()
    }
}
