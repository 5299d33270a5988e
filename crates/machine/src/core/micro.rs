//! Micro-operations: the unit of work the clock dispatches.
//!
//! Every instruction is executed as a queue of [`MicroOp`] values, one
//! dispatched per clock cycle. The queue is produced by the fetch, decode,
//! get-operand, and execute expansion steps and consumed strictly in FIFO
//! order, so the request/grant bus protocol holds by sequencing alone.

use std::fmt;

use crate::common::word::Direction;
use crate::common::Flag;
use crate::core::alu::OperandSlot;
use crate::core::registers::RegId;

/// One atomic step of an instruction's execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MicroOp {
    /// Assert the data-bus request line.
    RequestBus,
    /// Assert the data-bus grant line.
    GrantBus,
    /// Drop both halves of the data-bus handshake.
    ReleaseBus,
    /// Set the memory read strobe.
    SetRead(bool),
    /// Set the memory write strobe.
    SetWrite(bool),
    /// Set the I/O request line.
    SetIoRequest(bool),
    /// Set the I/O grant line; pending input transfers on assertion.
    SetIoGrant(bool),

    /// Copy a register onto the address bus.
    StageAddress(RegId),
    /// Copy a register onto the data bus.
    StageData(RegId),
    /// Copy a register onto the I/O bus.
    StageIo(RegId),
    /// Copy the decoded operand field onto the address bus.
    OperandToAddressBus,
    /// Copy the address bus into MAR.
    LatchMar,
    /// Copy the data bus into a register, zero-extended.
    Load(RegId),
    /// Merge the data bus into a register's tail, preserving the head.
    LoadTail(RegId),
    /// Rotate a register circularly.
    Rotate {
        /// The register to rotate.
        reg: RegId,
        /// Bit positions to rotate by.
        times: usize,
        /// Rotation direction.
        direction: Direction,
    },
    /// Add the register's step constant with ripple carry.
    Increment(RegId),
    /// Latch the data bus into part `0..n` of the instruction register.
    LatchCir(usize),
    /// Copy the decoded operand field into a register, zero-padded.
    LoadOperand(RegId),
    /// Copy the I/O bus into the accumulator.
    LoadInput,

    /// Resolve the address bus and place the addressed byte on the data bus.
    MemoryRead,
    /// Resolve the address bus and store the data bus byte there.
    MemoryWrite,

    /// Snapshot the data bus into an ALU operand slot.
    StageOperand(OperandSlot),
    /// Ripple-carry addition of the staged operands.
    AluAdd {
        /// Marks the operation as the tail of a subtraction.
        subtract: bool,
    },
    /// Two's-complement negation of operand slot one, in place.
    AluComplement,
    /// Bitwise AND of the staged operands.
    AluAnd,
    /// Bitwise OR of the staged operands.
    AluOr,
    /// Bitwise XOR of the staged operands.
    AluXor,
    /// Bitwise NOT of operand slot one.
    AluNot,

    /// Enqueue the instruction-fetch sequence.
    Fetch,
    /// Expanded mode: read the header's length field and enqueue the
    /// operand-byte fetches.
    DecodeHeader,
    /// Decode the instruction register and enqueue the operand step.
    Decode,
    /// Resolve the operand per the addressing mode and enqueue execution.
    GetOperand,
    /// Expand the decoded opcode into its micro-operation sequence.
    Execute,
    /// Fall through to the queued jump when the flag is set; otherwise clear
    /// the pending queue and fetch the next sequential instruction.
    Branch(Flag),

    /// Invoke the attached device with the I/O bus contents.
    InvokeDevice,
    /// Grant the I/O bus to a waiting device, re-queuing while the data bus
    /// is busy.
    IoHandler,

    /// Halt: clear the queue, drop the clock line, finish the run.
    End,
}

impl fmt::Display for MicroOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MicroOp::RequestBus => write!(f, "bus.request"),
            MicroOp::GrantBus => write!(f, "bus.grant"),
            MicroOp::ReleaseBus => write!(f, "bus.release"),
            MicroOp::SetRead(v) => write!(f, "line.read={}", u8::from(*v)),
            MicroOp::SetWrite(v) => write!(f, "line.write={}", u8::from(*v)),
            MicroOp::SetIoRequest(v) => write!(f, "line.iorequest={}", u8::from(*v)),
            MicroOp::SetIoGrant(v) => write!(f, "line.iogrant={}", u8::from(*v)),
            MicroOp::StageAddress(r) => write!(f, "abus<-{r}"),
            MicroOp::StageData(r) => write!(f, "dbus<-{r}"),
            MicroOp::StageIo(r) => write!(f, "iobus<-{r}"),
            MicroOp::OperandToAddressBus => write!(f, "abus<-operand"),
            MicroOp::LatchMar => write!(f, "mar<-abus"),
            MicroOp::Load(r) => write!(f, "{r}<-dbus"),
            MicroOp::LoadTail(r) => write!(f, "{r}.tail<-dbus"),
            MicroOp::Rotate {
                reg,
                times,
                direction,
            } => write!(f, "rotate {reg} {times} {direction:?}"),
            MicroOp::Increment(r) => write!(f, "incr {r}"),
            MicroOp::LatchCir(part) => write!(f, "cir[{part}]<-dbus"),
            MicroOp::LoadOperand(r) => write!(f, "{r}<-operand"),
            MicroOp::LoadInput => write!(f, "acc<-iobus"),
            MicroOp::MemoryRead => write!(f, "mem.read"),
            MicroOp::MemoryWrite => write!(f, "mem.write"),
            MicroOp::StageOperand(slot) => write!(f, "alu.val{}<-dbus", slot.number()),
            MicroOp::AluAdd { subtract } => {
                write!(f, "alu.{}", if *subtract { "add(sub)" } else { "add" })
            }
            MicroOp::AluComplement => write!(f, "alu.complement"),
            MicroOp::AluAnd => write!(f, "alu.and"),
            MicroOp::AluOr => write!(f, "alu.or"),
            MicroOp::AluXor => write!(f, "alu.xor"),
            MicroOp::AluNot => write!(f, "alu.not"),
            MicroOp::Fetch => write!(f, "fetch"),
            MicroOp::DecodeHeader => write!(f, "decode.header"),
            MicroOp::Decode => write!(f, "decode"),
            MicroOp::GetOperand => write!(f, "get-operand"),
            MicroOp::Execute => write!(f, "execute"),
            MicroOp::Branch(flag) => write!(f, "branch-if-{flag}"),
            MicroOp::InvokeDevice => write!(f, "io.device"),
            MicroOp::IoHandler => write!(f, "io.handler"),
            MicroOp::End => write!(f, "end"),
        }
    }
}
