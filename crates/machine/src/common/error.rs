//! Fault and program-image error types.
//!
//! Two taxonomies cover everything that can go wrong:
//! 1. **Faults:** Fatal runtime conditions that halt the clock. There is no
//!    recoverable-error path in the machine core; every fault ends the run.
//! 2. **Program errors:** Rejected program images, raised before anything
//!    is written to memory.
//!
//! Branch-not-taken, a busy I/O bus, and an empty micro-operation queue are
//! ordinary control-flow outcomes, not errors, and have no variants here.

use thiserror::Error;

/// A fatal machine fault. The clock halts and the run cannot continue.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Fault {
    /// A resolved address fell outside the current mode's address space.
    #[error("address {addr:#x} outside the {limit}-byte address space")]
    AddressOutOfRange {
        /// The offending address.
        addr: u64,
        /// Size of the address space in bytes.
        limit: u64,
    },

    /// An opcode field decoded to a value with no instruction assigned.
    #[error("illegal opcode {0:#06b}")]
    IllegalOpcode(u8),

    /// An addressing-mode field decoded to a reserved value.
    #[error("illegal addressing mode {0:#04b}")]
    IllegalAddressingMode(u8),

    /// An expanded-mode operand-length field named a length other than
    /// 0, 1, or 4 bytes.
    #[error("illegal operand length of {0} bytes")]
    IllegalOperandLength(u8),
}

/// A rejected program image. Raised by the loader before memory is touched.
#[derive(Debug, Error)]
pub enum ProgramError {
    /// An instruction pattern contained a character other than '0' or '1'.
    #[error("instruction {index}: invalid character {found:?} in bit pattern")]
    InvalidBit {
        /// Zero-based instruction index within the program.
        index: usize,
        /// The offending character.
        found: char,
    },

    /// An instruction pattern had the wrong number of bits for the mode.
    #[error("instruction {index}: expected {expected} bits, found {found}")]
    BadLength {
        /// Zero-based instruction index within the program.
        index: usize,
        /// The bit count the encoding requires.
        expected: usize,
        /// The bit count actually supplied.
        found: usize,
    },

    /// The encoded image does not fit in the mode's memory.
    #[error("program of {bytes} bytes does not fit in {limit}-byte memory")]
    TooLarge {
        /// Encoded image size in bytes.
        bytes: u64,
        /// Size of the address space in bytes.
        limit: u64,
    },

    /// The program contained no instructions.
    #[error("empty program")]
    Empty,
}
