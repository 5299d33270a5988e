//! The arithmetic logic unit.
//!
//! The ALU computes over two staged 8-bit operand snapshots and signals the
//! STATUS flags through the control bus:
//! 1. **Addition:** ripple carry from the least significant bit up, setting
//!    Carry from the bit that falls off the top and Overflow from the
//!    same-sign rule.
//! 2. **Subtraction:** two's-complement negation of operand one followed by
//!    the shared addition path. A set Carry afterwards is legitimate.
//! 3. **Bitwise:** AND, OR, XOR over both operands; NOT over operand one.
//! 4. **Flags:** every operation finishes with the zero/negative check;
//!    results land on the data bus for the following register load.
//!
//! Operations are total over fixed-width vectors. There are no traps here,
//! only flag signalling.

use tracing::trace;

use crate::common::constants::BYTE_BITS;
use crate::common::{Flag, Word};
use crate::core::registers::RegisterFile;
use crate::soc::bus::Buses;

/// Names one of the two ALU operand registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandSlot {
    /// Operand register one; the target of NOT and negation.
    First,
    /// Operand register two.
    Second,
}

impl OperandSlot {
    /// The slot's one-based number, for logs.
    pub fn number(self) -> u8 {
        match self {
            OperandSlot::First => 1,
            OperandSlot::Second => 2,
        }
    }
}

/// The ALU: two staged operands and the operations over them.
pub struct Alu {
    val1: Word,
    val2: Word,
    subtract: bool,
}

impl Alu {
    /// Creates an ALU with both operand registers zeroed.
    pub fn new() -> Self {
        Self {
            val1: Word::zero(BYTE_BITS),
            val2: Word::zero(BYTE_BITS),
            subtract: false,
        }
    }

    /// Snapshots the data bus into an operand register. A deep copy, so
    /// later bus traffic cannot alias the staged value.
    pub fn stage_operand(&mut self, slot: OperandSlot, data: &Word) {
        match slot {
            OperandSlot::First => self.val1.copy_from(data),
            OperandSlot::Second => self.val2.copy_from(data),
        }
    }

    /// Whether the most recent addition was the tail of a subtraction.
    /// Flag computation is identical; the distinction is kept for hosts
    /// that interpret Carry after subtraction.
    pub fn subtract_mode(&self) -> bool {
        self.subtract
    }

    /// Reads a staged operand register.
    pub fn operand(&self, slot: OperandSlot) -> &Word {
        match slot {
            OperandSlot::First => &self.val1,
            OperandSlot::Second => &self.val2,
        }
    }

    /// Ripple-carry addition of the staged operands.
    ///
    /// The result lands on the data bus. Carry is set iff the addition
    /// carried out of the most significant bit. Overflow is set iff both
    /// operands share a sign bit and the result's sign differs, and cleared
    /// in every other case. The zero/negative check runs last.
    ///
    /// # Arguments
    ///
    /// * `subtract` - Marks the operation as the tail of a subtraction; the
    ///   flag computation is identical.
    /// * `buses` - Control bus for flag signals; data bus for the result.
    /// * `regs` - Register file holding STATUS.
    pub fn addition(&mut self, subtract: bool, buses: &mut Buses, regs: &mut RegisterFile) {
        self.subtract = subtract;
        let (result, carry_out) = ripple_add(&self.val1, &self.val2);
        raise(buses, regs, Flag::Carry, carry_out);
        let overflow =
            self.val1.sign() == self.val2.sign() && result.sign() != self.val1.sign();
        raise(buses, regs, Flag::Overflow, overflow);
        trace!(result = %result, carry = carry_out, overflow, subtract, "alu addition");
        self.finish(result, buses, regs);
    }

    /// Two's-complement negation of operand one, in place: NOT then a
    /// ripple-carry add of the constant one. Used to implement subtraction
    /// as addition of the negated subtrahend.
    pub fn twos_complement(&mut self, buses: &mut Buses, regs: &mut RegisterFile) {
        let width = self.val1.width();
        let mut inverted = Word::zero(width);
        for i in 0..width {
            inverted.set_bit(i, !self.val1.bit(i));
        }
        let one = Word::from_u64(1, width);
        let (result, carry_out) = ripple_add(&inverted, &one);
        raise(buses, regs, Flag::Carry, carry_out);
        let overflow = inverted.sign() == one.sign() && result.sign() != inverted.sign();
        raise(buses, regs, Flag::Overflow, overflow);
        self.val1 = result.clone();
        self.finish(result, buses, regs);
    }

    /// Bitwise AND of the staged operands.
    pub fn and(&mut self, buses: &mut Buses, regs: &mut RegisterFile) {
        self.bitwise(|a, b| a && b, buses, regs);
    }

    /// Bitwise OR of the staged operands.
    pub fn or(&mut self, buses: &mut Buses, regs: &mut RegisterFile) {
        self.bitwise(|a, b| a || b, buses, regs);
    }

    /// Bitwise XOR of the staged operands.
    pub fn xor(&mut self, buses: &mut Buses, regs: &mut RegisterFile) {
        self.bitwise(|a, b| a ^ b, buses, regs);
    }

    /// Bitwise NOT of operand one.
    pub fn not(&mut self, buses: &mut Buses, regs: &mut RegisterFile) {
        let width = self.val1.width();
        let mut result = Word::zero(width);
        for i in 0..width {
            result.set_bit(i, !self.val1.bit(i));
        }
        self.finish(result, buses, regs);
    }

    fn bitwise(
        &mut self,
        op: impl Fn(bool, bool) -> bool,
        buses: &mut Buses,
        regs: &mut RegisterFile,
    ) {
        let width = self.val1.width();
        let mut result = Word::zero(width);
        for i in 0..width {
            result.set_bit(i, op(self.val1.bit(i), self.val2.bit(i)));
        }
        self.finish(result, buses, regs);
    }

    /// Zero/negative check plus result staging, shared by every operation.
    fn finish(&mut self, result: Word, buses: &mut Buses, regs: &mut RegisterFile) {
        raise(buses, regs, Flag::Zero, result.is_zero());
        raise(buses, regs, Flag::Negative, result.sign());
        buses.data = result;
    }
}

impl Default for Alu {
    fn default() -> Self {
        Self::new()
    }
}

/// Full-adder ripple over the operand width, least significant bit first.
///
/// Returns the result word and the carry out of the most significant bit.
fn ripple_add(a: &Word, b: &Word) -> (Word, bool) {
    let width = a.width();
    let mut result = Word::zero(width);
    let mut carry = false;
    for i in (0..width).rev() {
        let (x, y) = (a.bit(i), b.bit(i));
        result.set_bit(i, x ^ y ^ carry);
        carry = (x && y) || (carry && (x ^ y));
    }
    (result, carry)
}

/// Signals a flag on the control bus and applies it to STATUS in the same
/// micro-operation.
fn raise(buses: &mut Buses, regs: &mut RegisterFile, flag: Flag, value: bool) {
    buses.signal_flag(flag, value);
    regs.status_update(flag, value);
}
