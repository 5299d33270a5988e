//! Byte-addressable memory, mode-dependent.
//!
//! One type covers both addressing regimes, selected at construction:
//! 1. **Standard:** a dense 256-byte array; every address is materialized.
//! 2. **Expanded:** a sparse map from 32-bit address to byte. Reading an
//!    absent address yields zero and writing zero deletes the entry, so the
//!    materialized key set is exactly the set of addresses holding a
//!    non-zero byte.
//!
//! Out-of-range access is a [`Fault`], not a recoverable error; the control
//! unit halts the clock on it.

use std::collections::HashMap;

use crate::common::Fault;
use crate::common::constants::STANDARD_MEMORY_BYTES;
use crate::config::MachineMode;

/// The machine's byte store.
pub enum Memory {
    /// Dense standard-mode array, all zero at reset.
    Standard(Box<[u8; STANDARD_MEMORY_BYTES as usize]>),
    /// Sparse expanded-mode map holding only non-zero bytes.
    Expanded(HashMap<u32, u8>),
}

impl Memory {
    /// Creates zeroed memory for the given mode.
    pub fn new(mode: MachineMode) -> Self {
        match mode {
            MachineMode::Standard => {
                Memory::Standard(Box::new([0; STANDARD_MEMORY_BYTES as usize]))
            }
            MachineMode::Expanded => Memory::Expanded(HashMap::new()),
        }
    }

    /// Size of the address space in bytes.
    pub fn limit(&self) -> u64 {
        match self {
            Memory::Standard(_) => MachineMode::Standard.memory_limit(),
            Memory::Expanded(_) => MachineMode::Expanded.memory_limit(),
        }
    }

    /// Reads the byte at `addr`. Absent sparse addresses read as zero.
    ///
    /// # Errors
    ///
    /// [`Fault::AddressOutOfRange`] when `addr` is outside the mode's
    /// address space.
    pub fn read(&self, addr: u64) -> Result<u8, Fault> {
        self.check(addr)?;
        match self {
            Memory::Standard(cells) => Ok(cells[addr as usize]),
            Memory::Expanded(cells) => Ok(cells.get(&(addr as u32)).copied().unwrap_or(0)),
        }
    }

    /// Writes the byte at `addr`. Writing zero to sparse memory deletes the
    /// entry, keeping only non-zero bytes materialized.
    ///
    /// # Errors
    ///
    /// [`Fault::AddressOutOfRange`] when `addr` is outside the mode's
    /// address space.
    pub fn write(&mut self, addr: u64, value: u8) -> Result<(), Fault> {
        self.check(addr)?;
        match self {
            Memory::Standard(cells) => cells[addr as usize] = value,
            Memory::Expanded(cells) => {
                if value == 0 {
                    let _ = cells.remove(&(addr as u32));
                } else {
                    let _ = cells.insert(addr as u32, value);
                }
            }
        }
        Ok(())
    }

    /// The materialized (address, byte) pairs, sorted by address.
    ///
    /// For standard mode this is the non-zero cells; for expanded mode it is
    /// the whole backing map. Display front ends and tests use this to walk
    /// memory without touching every sparse address.
    pub fn materialized(&self) -> Vec<(u64, u8)> {
        let mut cells: Vec<(u64, u8)> = match self {
            Memory::Standard(cells) => cells
                .iter()
                .enumerate()
                .filter(|&(_, &b)| b != 0)
                .map(|(addr, &b)| (addr as u64, b))
                .collect(),
            Memory::Expanded(cells) => cells
                .iter()
                .map(|(&addr, &b)| (u64::from(addr), b))
                .collect(),
        };
        cells.sort_unstable_by_key(|&(addr, _)| addr);
        cells
    }

    fn check(&self, addr: u64) -> Result<(), Fault> {
        let limit = self.limit();
        if addr < limit {
            Ok(())
        } else {
            Err(Fault::AddressOutOfRange { addr, limit })
        }
    }
}
