//! `2^A`-word RAM addressed through an internal memory-address register (MAR).

use crate::error::{ExecutionError, RegisterKind};
use crate::register::{mask_for_width, Register};

/// Byte-addressable (word-addressable, really) RAM with an internal MAR.
#[derive(Debug, Clone)]
pub struct Ram {
    cells: Vec<Register>,
    mar: Register,
    addr_mask: u32,
}

impl Ram {
    pub(crate) fn new(data_width: u32, addr_width: u32) -> Self {
        let words = 1usize << addr_width.min(31);
        Self {
            cells: vec![Register::new(data_width); words],
            mar: Register::new(addr_width),
            addr_mask: mask_for_width(addr_width),
        }
    }

    /// `MAR <- v mod 2^A`. Always succeeds.
    pub(crate) fn set_address(&mut self, v: u32) {
        self.mar.set(v & self.addr_mask);
    }

    /// Write `v` to the cell currently addressed by the MAR.
    ///
    /// Fails if the MAR was never written.
    pub(crate) fn write(&mut self, v: u32, address: u32) -> Result<(), ExecutionError> {
        let idx = self.mar.get(RegisterKind::Mar, address)? as usize;
        self.cells[idx].set(v);
        Ok(())
    }

    /// Read the cell currently addressed by the MAR.
    ///
    /// Fails if the MAR was never written, or if the addressed cell was
    /// never written.
    pub(crate) fn read(&self, address: u32) -> Result<u32, ExecutionError> {
        let idx = self.mar.get(RegisterKind::Mar, address)? as usize;
        self.cells[idx].get(RegisterKind::M, address)
    }

    /// Current MAR value, if ever written.
    pub(crate) fn mar_value(&self) -> Option<u32> {
        self.mar.peek()
    }

    /// A `2^A`-long snapshot of RAM contents; `None` for never-written cells.
    pub(crate) fn snapshot(&self) -> Vec<Option<u32>> {
        self.cells.iter().map(Register::peek).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_before_address_set_fails() {
        let mut ram = Ram::new(8, 8);
        assert!(ram.write(5, 0).is_err());
    }

    #[test]
    fn read_before_address_set_fails() {
        let ram = Ram::new(8, 8);
        assert!(ram.read(0).is_err());
    }

    #[test]
    fn read_unwritten_cell_fails() {
        let mut ram = Ram::new(8, 8);
        ram.set_address(3);
        assert!(ram.read(0).is_err());
    }

    #[test]
    fn roundtrip_through_address() {
        let mut ram = Ram::new(8, 8);
        ram.set_address(9);
        ram.write(123, 0).unwrap();
        ram.set_address(9);
        assert_eq!(ram.read(0).unwrap(), 123);
    }

    #[test]
    fn address_wraps_modulo_width() {
        let mut ram = Ram::new(8, 4);
        ram.set_address(0b1_0000_0011);
        ram.write(7, 0).unwrap();
        ram.set_address(0b0011);
        assert_eq!(ram.read(0).unwrap(), 7);
    }

    #[test]
    fn snapshot_reports_none_for_unwritten() {
        let mut ram = Ram::new(8, 4);
        ram.set_address(1);
        ram.write(42, 0).unwrap();
        let snap = ram.snapshot();
        assert_eq!(snap.len(), 16);
        assert_eq!(snap[1], Some(42));
        assert_eq!(snap[0], None);
    }
}
