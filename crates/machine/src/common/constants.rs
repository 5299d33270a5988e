//! Width, field-size, and step constants.
//!
//! These values define the two addressing regimes and the instruction
//! encoding shared between them. They are fixed properties of the simulated
//! architecture, not tunables.

/// Width of a data word, the data bus, the I/O bus, and the accumulator.
pub const BYTE_BITS: usize = 8;

/// Address width in standard mode (256-byte address space).
pub const STANDARD_ADDR_BITS: usize = 8;

/// Address width in expanded mode (4 GiB address space).
pub const EXPANDED_ADDR_BITS: usize = 32;

/// Size of standard-mode memory in bytes. Every address is materialized.
pub const STANDARD_MEMORY_BYTES: u64 = 256;

/// One past the highest valid expanded-mode address.
pub const EXPANDED_MEMORY_BYTES: u64 = 1 << 32;

/// Total instruction width in standard mode (opcode + mode + operand).
pub const STANDARD_INSTR_BITS: usize = 14;

/// Width of the opcode field in both encodings.
pub const OPCODE_BITS: usize = 4;

/// Width of the addressing-mode field in the standard encoding.
pub const STANDARD_MODE_BITS: usize = 2;

/// Width of the operand-length field in the expanded header byte.
pub const EXPANDED_LEN_BITS: usize = 3;

/// Program-counter step per instruction in standard mode (two packed bytes).
pub const STANDARD_PC_STEP: u64 = 2;

/// Program-counter step per fetched byte in expanded mode.
pub const EXPANDED_PC_STEP: u64 = 1;

/// Default number of micro-operations dispatched per `run` slice before
/// control returns to the caller.
pub const DEFAULT_STEP_BUDGET: usize = 10_000;
