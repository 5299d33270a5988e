//! Common types shared across the machine.
//!
//! This module collects the leaf types every other component builds on:
//! 1. **Words:** The MSB-first bit-vector value type ([`word::Word`]).
//! 2. **Flags:** The four STATUS bits ([`flag::Flag`]).
//! 3. **Faults:** Fatal runtime and program-image errors ([`error::Fault`], [`error::ProgramError`]).
//! 4. **Constants:** Register widths, instruction field sizes, and step sizes.

/// Shared width, field-size, and step constants.
pub mod constants;
/// Fatal fault and program-image error types.
pub mod error;
/// The four STATUS flag bits.
pub mod flag;
/// MSB-first bit-vector value type.
pub mod word;

pub use error::{Fault, ProgramError};
pub use flag::Flag;
pub use word::{Direction, Word};
