//! CPU core: ALU, registers, micro-operations, and the control unit.
//!
//! The control unit drives everything: it sequences bus handshakes, invokes
//! the ALU with operands staged on the data bus, and reaches memory through
//! the address and data buses. The passive components live together in a
//! [`Datapath`] so a dispatched micro-operation can touch any of them.

/// Arithmetic logic unit and operand staging.
pub mod alu;
/// Micro-operation queue owner, clock, and instruction cycle.
pub mod control;
/// The typed micro-operation vocabulary.
pub mod micro;
/// Register file and STATUS flags.
pub mod registers;

pub use alu::{Alu, OperandSlot};
pub use control::{ControlUnit, RunState};
pub use micro::MicroOp;
pub use registers::{RegId, RegisterFile, Snapshot};

use crate::config::MachineMode;
use crate::soc::{Buses, Memory};

/// The passive half of the machine: everything a micro-operation mutates.
pub struct Datapath {
    /// Arithmetic logic unit.
    pub alu: Alu,
    /// Register file.
    pub registers: RegisterFile,
    /// Bus lanes and control lines.
    pub buses: Buses,
    /// Byte-addressable memory.
    pub memory: Memory,
}

impl Datapath {
    /// Creates a zeroed datapath for the given mode.
    pub fn new(mode: MachineMode) -> Self {
        Self {
            alu: Alu::new(),
            registers: RegisterFile::new(mode),
            buses: Buses::new(mode),
            memory: Memory::new(mode),
        }
    }
}
