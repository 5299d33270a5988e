//! Machine configuration.
//!
//! This module defines the knobs a host sets before constructing a machine:
//! 1. **Addressing mode:** standard (8-bit, dense) or expanded (32-bit, sparse).
//! 2. **Clock frequency:** honored by timed front ends; 0 means unlimited.
//! 3. **Step budget:** micro-operations per `run` slice before yielding.
//!
//! Configuration deserializes from JSON via serde; `Config::default()` is a
//! standard-mode, unlimited-speed machine.

use serde::Deserialize;

use crate::common::constants::{
    BYTE_BITS, DEFAULT_STEP_BUDGET, EXPANDED_ADDR_BITS, EXPANDED_MEMORY_BYTES, EXPANDED_PC_STEP,
    STANDARD_ADDR_BITS, STANDARD_MEMORY_BYTES, STANDARD_PC_STEP,
};

/// The machine's addressing regime, fixed at construction.
///
/// Both modes share one instruction set; they differ in address width,
/// memory materialization, and instruction encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineMode {
    /// 8-bit addresses, dense 256-byte memory, 14-bit instructions.
    #[default]
    Standard,
    /// 32-bit addresses, sparse memory, variable-length instructions.
    Expanded,
}

impl MachineMode {
    /// Width of the address bus, PC, MAR, and MDR in this mode.
    pub fn address_bits(self) -> usize {
        match self {
            MachineMode::Standard => STANDARD_ADDR_BITS,
            MachineMode::Expanded => EXPANDED_ADDR_BITS,
        }
    }

    /// Size of the address space in bytes.
    pub fn memory_limit(self) -> u64 {
        match self {
            MachineMode::Standard => STANDARD_MEMORY_BYTES,
            MachineMode::Expanded => EXPANDED_MEMORY_BYTES,
        }
    }

    /// Program-counter increment: a whole instruction in standard mode,
    /// a single byte in expanded mode where instruction length varies.
    pub fn pc_step(self) -> u64 {
        match self {
            MachineMode::Standard => STANDARD_PC_STEP,
            MachineMode::Expanded => EXPANDED_PC_STEP,
        }
    }

    /// Width of a data word; the same in both modes.
    pub fn data_bits(self) -> usize {
        BYTE_BITS
    }
}

/// Top-level machine configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Addressing regime for this run.
    pub mode: MachineMode,
    /// Clock frequency in Hz for timed front ends; 0 selects unlimited speed.
    pub clock_hz: u64,
    /// Micro-operations dispatched per `run` slice before control returns to
    /// the caller. The cooperative yield point for long-running programs.
    pub step_budget: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: MachineMode::Standard,
            clock_hz: 0,
            step_budget: DEFAULT_STEP_BUDGET,
        }
    }
}

impl Config {
    /// A default-speed configuration for the given mode.
    pub fn for_mode(mode: MachineMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}
