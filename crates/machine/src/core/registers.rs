//! The register file: PC, MAR, MDR, ACC, CIR, and STATUS.
//!
//! Registers are typed fixed-width storage with mode-aware update rules:
//! 1. **Widths:** PC/MAR/MDR follow the address width (8 or 32 bits); ACC is
//!    always 8 bits; CIR is 14 bits standard and variable expanded.
//! 2. **Transfers:** loads deep-copy the data bus, tail-aligned; the rotate
//!    protocol assembles a 32-bit register from four 8-bit transfers.
//! 3. **Increments:** ripple-carry addition of a register-dependent step
//!    over the register's full width, independent of the ALU.
//! 4. **STATUS:** four flag bits applied through the control-bus flag signal.

use std::fmt;

use crate::common::constants::{BYTE_BITS, STANDARD_INSTR_BITS};
use crate::common::word::Direction;
use crate::common::{Flag, Word};
use crate::config::MachineMode;

/// Names one of the addressable registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegId {
    /// Program counter.
    Pc,
    /// Memory address register.
    Mar,
    /// Memory data register.
    Mdr,
    /// Accumulator.
    Acc,
    /// Current instruction register.
    Cir,
}

impl fmt::Display for RegId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegId::Pc => "pc",
            RegId::Mar => "mar",
            RegId::Mdr => "mdr",
            RegId::Acc => "acc",
            RegId::Cir => "cir",
        };
        f.write_str(name)
    }
}

/// A point-in-time copy of every register, for display front ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// Program counter.
    pub pc: Word,
    /// Memory address register.
    pub mar: Word,
    /// Memory data register.
    pub mdr: Word,
    /// Accumulator.
    pub acc: Word,
    /// Current instruction register.
    pub cir: Word,
    /// STATUS bits in [`Flag::index`] order: Zero, Negative, Overflow, Carry.
    pub status: [bool; 4],
}

/// The machine's register file.
pub struct RegisterFile {
    mode: MachineMode,
    pc: Word,
    mar: Word,
    mdr: Word,
    acc: Word,
    cir: Word,
    status: [bool; 4],
}

impl RegisterFile {
    /// Creates a zeroed register file for the given mode.
    pub fn new(mode: MachineMode) -> Self {
        let addr_bits = mode.address_bits();
        Self {
            mode,
            pc: Word::zero(addr_bits),
            mar: Word::zero(addr_bits),
            mdr: Word::zero(addr_bits),
            acc: Word::zero(BYTE_BITS),
            cir: Word::zero(Self::cir_reset_width(mode)),
            status: [false; 4],
        }
    }

    /// Zeroes every register and clears STATUS.
    pub fn reset(&mut self) {
        *self = Self::new(self.mode);
    }

    /// Reads a register.
    pub fn get(&self, reg: RegId) -> &Word {
        match reg {
            RegId::Pc => &self.pc,
            RegId::Mar => &self.mar,
            RegId::Mdr => &self.mdr,
            RegId::Acc => &self.acc,
            RegId::Cir => &self.cir,
        }
    }

    /// Reads one STATUS flag.
    pub fn flag(&self, flag: Flag) -> bool {
        self.status[flag.index()]
    }

    /// Copies the data bus into a register, zero-extended and tail-aligned.
    pub fn load(&mut self, reg: RegId, data: &Word) {
        self.reg_mut(reg).copy_from(data);
    }

    /// Merges the data bus into a register's tail, preserving the head.
    /// Paired with [`RegisterFile::rotate`] to assemble a wide register from
    /// sequential byte transfers.
    pub fn load_tail(&mut self, reg: RegId, data: &Word) {
        self.reg_mut(reg).merge_tail(data);
    }

    /// Copies the address bus into MAR.
    pub fn latch_mar(&mut self, address: &Word) {
        self.mar.copy_from(address);
    }

    /// Rotates a register circularly by `times` bit positions.
    pub fn rotate(&mut self, reg: RegId, times: usize, direction: Direction) {
        self.reg_mut(reg).rotate(times, direction);
    }

    /// Advances a register by its step constant with ripple carry over the
    /// register's full width; the carry out of the top bit is discarded.
    ///
    /// PC steps by a whole instruction in standard mode and a single byte in
    /// expanded mode; every other register steps by one.
    pub fn increment(&mut self, reg: RegId) {
        let step = match reg {
            RegId::Pc => self.mode.pc_step(),
            _ => 1,
        };
        let target = self.reg_mut(reg);
        let width = target.width();
        let addend = Word::from_u64(step, width);
        let mut carry = false;
        for i in (0..width).rev() {
            let a = target.bit(i);
            let b = addend.bit(i);
            target.set_bit(i, a ^ b ^ carry);
            carry = (a && b) || (carry && (a ^ b));
        }
    }

    /// Latches one bus transfer into the instruction register.
    ///
    /// Standard mode packs a 14-bit instruction into two bytes: part 0 is
    /// the full first byte, part 1 contributes the second byte's low six
    /// bits (the two leading padding bits are discarded). Expanded mode
    /// resets the CIR to the header byte at part 0 and appends one byte per
    /// later part.
    pub fn latch_cir(&mut self, part: usize, data: &Word) {
        match self.mode {
            MachineMode::Standard => {
                if part == 0 {
                    for i in 0..BYTE_BITS {
                        self.cir.set_bit(i, data.bit(i));
                    }
                } else {
                    let padding = 2 * BYTE_BITS - STANDARD_INSTR_BITS;
                    for i in padding..BYTE_BITS {
                        self.cir.set_bit(BYTE_BITS + i - padding, data.bit(i));
                    }
                }
            }
            MachineMode::Expanded => {
                if part == 0 {
                    self.cir = data.clone();
                } else {
                    self.cir.append(data);
                }
            }
        }
    }

    /// Copies the I/O bus into the accumulator.
    pub fn load_input(&mut self, io: &Word) {
        self.acc.copy_from(io);
    }

    /// Applies a control-bus flag signal to STATUS.
    pub fn status_update(&mut self, flag: Flag, value: bool) {
        self.status[flag.index()] = value;
    }

    /// Copies a decoded operand field into a register, left-padded with
    /// zeros to the register's width.
    pub fn load_operand(&mut self, reg: RegId, operand: &Word) {
        self.reg_mut(reg).copy_from(operand);
    }

    /// A point-in-time copy of every register for display.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pc: self.pc.clone(),
            mar: self.mar.clone(),
            mdr: self.mdr.clone(),
            acc: self.acc.clone(),
            cir: self.cir.clone(),
            status: self.status,
        }
    }

    fn reg_mut(&mut self, reg: RegId) -> &mut Word {
        match reg {
            RegId::Pc => &mut self.pc,
            RegId::Mar => &mut self.mar,
            RegId::Mdr => &mut self.mdr,
            RegId::Acc => &mut self.acc,
            RegId::Cir => &mut self.cir,
        }
    }

    fn cir_reset_width(mode: MachineMode) -> usize {
        match mode {
            MachineMode::Standard => STANDARD_INSTR_BITS,
            MachineMode::Expanded => BYTE_BITS,
        }
    }
}
