//! The control unit: micro-operation queue, clock, and instruction cycle.
//!
//! The control unit owns the FIFO micro-operation queue and the two-phase
//! clock that drains it. It provides:
//! 1. **The instruction cycle:** fetch → decode → get-operand → execute,
//!    each step expanding into further queued micro-operations.
//! 2. **Dispatch:** an exhaustive match over [`MicroOp`] driving the ALU,
//!    registers, buses, and memory.
//! 3. **I/O arbitration:** a handler op appended behind in-flight work that
//!    re-queues itself while the data bus is busy, so input service never
//!    preempts a transfer.
//! 4. **Pause/resume:** the pending queue is detached verbatim and restored
//!    exactly.
//!
//! Faults halt the clock; there is no recoverable-error path.

use std::collections::VecDeque;

use tracing::{debug, error, trace};

use crate::common::constants::BYTE_BITS;
use crate::common::word::Direction;
use crate::common::{Fault, Word};
use crate::config::MachineMode;
use crate::core::Datapath;
use crate::core::alu::OperandSlot;
use crate::core::micro::MicroOp;
use crate::core::registers::RegId;
use crate::isa::{AddressingMode, Instruction, Opcode};
use crate::soc::io::IoDevice;
use crate::stats::RunStats;

/// Bytes a 32-bit register is assembled from, one bus transfer each.
const WIDE_TRANSFER_BYTES: usize = 4;

/// Whether the machine is still consuming micro-operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// The queue is live; keep ticking.
    Running,
    /// The run finished through `end` or a fault; ticking is a no-op.
    Halted,
}

/// The control unit.
pub struct ControlUnit {
    mode: MachineMode,
    queue: VecDeque<MicroOp>,
    decoded: Option<Instruction>,
    clock_high: bool,
    halted: bool,
    paused: Option<VecDeque<MicroOp>>,
}

impl ControlUnit {
    /// Creates a control unit with an empty queue and the clock line low.
    pub fn new(mode: MachineMode) -> Self {
        Self {
            mode,
            queue: VecDeque::new(),
            decoded: None,
            clock_high: false,
            halted: false,
            paused: None,
        }
    }

    /// Clears all cycle state: queue, decoded instruction, clock, halt.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.decoded = None;
        self.clock_high = false;
        self.halted = false;
        self.paused = None;
    }

    /// Seeds the queue with the first instruction fetch.
    pub fn start(&mut self) {
        self.queue.push_back(MicroOp::Fetch);
    }

    /// Whether the run has finished.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Whether there is nothing to dispatch: paused or not yet started.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && !self.halted
    }

    /// The pending micro-operations, front of the queue first.
    pub fn pending(&self) -> impl Iterator<Item = &MicroOp> {
        self.queue.iter()
    }

    /// Detaches the pending queue for later exact resumption. Pausing a
    /// paused or halted machine is a no-op.
    pub fn pause(&mut self) {
        if self.paused.is_none() && !self.halted {
            self.paused = Some(std::mem::take(&mut self.queue));
            debug!("queue detached for pause");
        }
    }

    /// Restores a queue detached by [`ControlUnit::pause`], verbatim.
    pub fn resume(&mut self) {
        if let Some(queue) = self.paused.take() {
            self.queue = queue;
            debug!("queue restored from pause");
        }
    }

    /// Advances the clock by one tick.
    ///
    /// Each tick toggles the clock line; a micro-operation dispatches only
    /// on the high phase, so a full cycle is two ticks. After a dispatched
    /// op, a pending unacknowledged I/O request gets a handler appended at
    /// the queue tail.
    ///
    /// # Errors
    ///
    /// The fault that halted the clock. The machine stays halted.
    pub fn tick(
        &mut self,
        dp: &mut Datapath,
        device: &mut dyn IoDevice,
        stats: &mut RunStats,
    ) -> Result<RunState, Fault> {
        if self.halted {
            return Ok(RunState::Halted);
        }
        self.clock_high = !self.clock_high;
        dp.buses.control.clock = self.clock_high;
        stats.ticks += 1;
        if !self.clock_high {
            return Ok(RunState::Running);
        }
        let Some(op) = self.queue.pop_front() else {
            return Ok(RunState::Running);
        };
        trace!(op = %op, "dispatch");
        stats.micro_ops += 1;
        if let Err(fault) = self.dispatch(op, dp, device, stats) {
            error!(%fault, "fatal fault, clock halted");
            self.halt(dp);
            return Err(fault);
        }
        if self.halted {
            return Ok(RunState::Halted);
        }
        let control = &dp.buses.control;
        if control.io_request
            && !control.io_grant
            && !matches!(self.queue.back(), Some(MicroOp::IoHandler))
        {
            self.queue.push_back(MicroOp::IoHandler);
        }
        Ok(RunState::Running)
    }

    fn dispatch(
        &mut self,
        op: MicroOp,
        dp: &mut Datapath,
        device: &mut dyn IoDevice,
        stats: &mut RunStats,
    ) -> Result<(), Fault> {
        match op {
            MicroOp::RequestBus => dp.buses.request_data(),
            MicroOp::GrantBus => dp.buses.grant_data(),
            MicroOp::ReleaseBus => dp.buses.release_data(),
            MicroOp::SetRead(v) => dp.buses.set_read(v),
            MicroOp::SetWrite(v) => dp.buses.set_write(v),
            MicroOp::SetIoRequest(v) => dp.buses.set_io_request(v),
            MicroOp::SetIoGrant(v) => dp.buses.set_io_grant(v),

            MicroOp::StageAddress(reg) => dp.buses.stage_address(dp.registers.get(reg)),
            MicroOp::StageData(reg) => dp.buses.stage_data(dp.registers.get(reg)),
            MicroOp::StageIo(reg) => dp.buses.stage_io(dp.registers.get(reg)),
            MicroOp::OperandToAddressBus => {
                if let Some(instr) = &self.decoded {
                    dp.buses.stage_address(&instr.operand);
                }
            }
            MicroOp::LatchMar => dp.registers.latch_mar(&dp.buses.address),
            MicroOp::Load(reg) => dp.registers.load(reg, &dp.buses.data),
            MicroOp::LoadTail(reg) => dp.registers.load_tail(reg, &dp.buses.data),
            MicroOp::Rotate {
                reg,
                times,
                direction,
            } => dp.registers.rotate(reg, times, direction),
            MicroOp::Increment(reg) => dp.registers.increment(reg),
            MicroOp::LatchCir(part) => dp.registers.latch_cir(part, &dp.buses.data),
            MicroOp::LoadOperand(reg) => {
                if let Some(instr) = &self.decoded {
                    dp.registers.load_operand(reg, &instr.operand);
                }
            }
            MicroOp::LoadInput => {
                dp.registers.load_input(&dp.buses.io);
                stats.io_inputs += 1;
            }

            MicroOp::MemoryRead => {
                let addr = dp.buses.address.to_u64();
                let byte = dp.memory.read(addr)?;
                dp.buses.data = Word::from_u64(u64::from(byte), BYTE_BITS);
                stats.mem_reads += 1;
            }
            MicroOp::MemoryWrite => {
                let addr = dp.buses.address.to_u64();
                dp.memory.write(addr, dp.buses.data.to_u64() as u8)?;
                stats.mem_writes += 1;
            }

            MicroOp::StageOperand(slot) => dp.alu.stage_operand(slot, &dp.buses.data),
            MicroOp::AluAdd { subtract } => {
                dp.alu.addition(subtract, &mut dp.buses, &mut dp.registers);
            }
            MicroOp::AluComplement => dp.alu.twos_complement(&mut dp.buses, &mut dp.registers),
            MicroOp::AluAnd => dp.alu.and(&mut dp.buses, &mut dp.registers),
            MicroOp::AluOr => dp.alu.or(&mut dp.buses, &mut dp.registers),
            MicroOp::AluXor => dp.alu.xor(&mut dp.buses, &mut dp.registers),
            MicroOp::AluNot => dp.alu.not(&mut dp.buses, &mut dp.registers),

            MicroOp::Fetch => self.enqueue_fetch(),
            MicroOp::DecodeHeader => {
                let len = Instruction::operand_len_from_header(dp.registers.get(RegId::Cir))?;
                self.enqueue_operand_fetch(len);
            }
            MicroOp::Decode => {
                let cir = dp.registers.get(RegId::Cir);
                let instr = match self.mode {
                    MachineMode::Standard => Instruction::decode_standard(cir)?,
                    MachineMode::Expanded => Instruction::decode_expanded(cir)?,
                };
                debug!(instr = %instr, pc = dp.registers.get(RegId::Pc).to_u64(), "decoded");
                stats.instructions += 1;
                self.decoded = Some(instr);
                self.queue.push_back(MicroOp::GetOperand);
            }
            MicroOp::GetOperand => self.enqueue_get_operand(),
            MicroOp::Execute => self.enqueue_execute(),
            MicroOp::Branch(flag) => {
                if dp.registers.flag(flag) {
                    trace!(%flag, "branch taken");
                    stats.branches_taken += 1;
                } else {
                    trace!(%flag, "branch not taken, queue cleared");
                    stats.branches_not_taken += 1;
                    self.queue.clear();
                    self.queue.push_back(MicroOp::Fetch);
                }
            }

            MicroOp::InvokeDevice => {
                let reply = device.output(&dp.buses.io);
                stats.io_outputs += 1;
                if let Some(byte) = reply {
                    dp.buses.receive_input(byte);
                }
            }
            MicroOp::IoHandler => {
                let control = &dp.buses.control;
                if control.io_request && !control.io_grant {
                    if control.request {
                        // Data bus in use; try again behind the transfer.
                        self.queue.push_back(MicroOp::IoHandler);
                    } else {
                        dp.buses.set_io_grant(true);
                    }
                }
            }

            MicroOp::End => {
                debug!("end reached, run complete");
                self.halt(dp);
            }
        }
        Ok(())
    }

    fn halt(&mut self, dp: &mut Datapath) {
        self.queue.clear();
        self.halted = true;
        self.clock_high = false;
        dp.buses.control.clock = false;
    }

    /// Queues the mode's instruction-fetch sequence.
    fn enqueue_fetch(&mut self) {
        match self.mode {
            MachineMode::Standard => self.queue.extend([
                MicroOp::RequestBus,
                MicroOp::GrantBus,
                MicroOp::StageAddress(RegId::Pc),
                MicroOp::LatchMar,
                MicroOp::SetRead(true),
                MicroOp::MemoryRead,
                MicroOp::LatchCir(0),
                MicroOp::Increment(RegId::Mar),
                MicroOp::StageAddress(RegId::Mar),
                MicroOp::MemoryRead,
                MicroOp::LatchCir(1),
                MicroOp::SetRead(false),
                MicroOp::Increment(RegId::Pc),
                MicroOp::ReleaseBus,
                MicroOp::Decode,
            ]),
            MachineMode::Expanded => self.queue.extend([
                MicroOp::RequestBus,
                MicroOp::GrantBus,
                MicroOp::StageAddress(RegId::Pc),
                MicroOp::LatchMar,
                MicroOp::SetRead(true),
                MicroOp::MemoryRead,
                MicroOp::LatchCir(0),
                MicroOp::SetRead(false),
                MicroOp::Increment(RegId::Pc),
                MicroOp::ReleaseBus,
                MicroOp::DecodeHeader,
            ]),
        }
    }

    /// Queues one read group per expanded operand byte, then the decode.
    fn enqueue_operand_fetch(&mut self, len: usize) {
        for part in 0..len {
            self.queue.extend([
                MicroOp::RequestBus,
                MicroOp::GrantBus,
                MicroOp::Increment(RegId::Mar),
                MicroOp::StageAddress(RegId::Mar),
                MicroOp::SetRead(true),
                MicroOp::MemoryRead,
                MicroOp::LatchCir(part + 1),
                MicroOp::SetRead(false),
                MicroOp::Increment(RegId::Pc),
                MicroOp::ReleaseBus,
            ]);
        }
        self.queue.push_back(MicroOp::Decode);
    }

    /// Queues the operand-resolution step for the decoded instruction.
    fn enqueue_get_operand(&mut self) {
        let Some(instr) = self.decoded.clone() else {
            return;
        };
        match instr.mode {
            AddressingMode::Direct => {
                self.queue.push_back(MicroOp::LoadOperand(RegId::Mdr));
            }
            AddressingMode::Indirect => self.queue.extend([
                MicroOp::RequestBus,
                MicroOp::GrantBus,
                MicroOp::OperandToAddressBus,
                MicroOp::SetRead(true),
                MicroOp::MemoryRead,
                MicroOp::Load(RegId::Mdr),
                MicroOp::SetRead(false),
                MicroOp::ReleaseBus,
            ]),
        }
        self.queue.push_back(MicroOp::Execute);
    }

    /// Expands the decoded opcode into its micro-operation sequence. Every
    /// opcode except `end` appends the fetch of the next instruction.
    fn enqueue_execute(&mut self) {
        let Some(instr) = self.decoded.clone() else {
            return;
        };
        let mut ops: Vec<MicroOp> = Vec::new();
        match instr.opcode {
            Opcode::Add => ops.extend([
                MicroOp::RequestBus,
                MicroOp::GrantBus,
                MicroOp::StageData(RegId::Acc),
                MicroOp::StageOperand(OperandSlot::First),
                MicroOp::StageData(RegId::Mdr),
                MicroOp::StageOperand(OperandSlot::Second),
                MicroOp::AluAdd { subtract: false },
                MicroOp::Load(RegId::Acc),
                MicroOp::ReleaseBus,
            ]),
            Opcode::Sub => ops.extend([
                MicroOp::RequestBus,
                MicroOp::GrantBus,
                MicroOp::StageData(RegId::Mdr),
                MicroOp::StageOperand(OperandSlot::First),
                MicroOp::AluComplement,
                MicroOp::StageData(RegId::Acc),
                MicroOp::StageOperand(OperandSlot::Second),
                MicroOp::AluAdd { subtract: true },
                MicroOp::Load(RegId::Acc),
                MicroOp::ReleaseBus,
            ]),
            Opcode::And | Opcode::Or | Opcode::Xor => {
                let alu_op = match instr.opcode {
                    Opcode::And => MicroOp::AluAnd,
                    Opcode::Or => MicroOp::AluOr,
                    _ => MicroOp::AluXor,
                };
                ops.extend([
                    MicroOp::RequestBus,
                    MicroOp::GrantBus,
                    MicroOp::StageData(RegId::Mdr),
                    MicroOp::StageOperand(OperandSlot::First),
                    MicroOp::StageData(RegId::Acc),
                    MicroOp::StageOperand(OperandSlot::Second),
                    alu_op,
                    MicroOp::Load(RegId::Acc),
                    MicroOp::ReleaseBus,
                ]);
            }
            Opcode::Not => ops.extend([
                MicroOp::RequestBus,
                MicroOp::GrantBus,
                MicroOp::StageData(RegId::Acc),
                MicroOp::StageOperand(OperandSlot::First),
                MicroOp::AluNot,
                MicroOp::Load(RegId::Acc),
                MicroOp::ReleaseBus,
            ]),
            Opcode::Read => ops.extend([
                MicroOp::SetRead(true),
                MicroOp::RequestBus,
                MicroOp::GrantBus,
                MicroOp::StageAddress(RegId::Mdr),
                MicroOp::MemoryRead,
                MicroOp::Load(RegId::Acc),
                MicroOp::SetRead(false),
                MicroOp::ReleaseBus,
            ]),
            Opcode::Write => ops.extend([
                MicroOp::SetWrite(true),
                MicroOp::RequestBus,
                MicroOp::GrantBus,
                MicroOp::StageAddress(RegId::Mdr),
                MicroOp::StageData(RegId::Acc),
                MicroOp::MemoryWrite,
                MicroOp::SetWrite(false),
                MicroOp::ReleaseBus,
            ]),
            Opcode::Goto => ops.extend(self.goto_ops()),
            Opcode::BranchIfZero
            | Opcode::BranchIfNegative
            | Opcode::BranchIfOverflow
            | Opcode::BranchIfCarry => {
                if let Some(flag) = instr.opcode.branch_flag() {
                    ops.push(MicroOp::Branch(flag));
                    ops.extend(self.goto_ops());
                }
            }
            Opcode::Output => {
                let source = match instr.mode {
                    AddressingMode::Direct => RegId::Acc,
                    AddressingMode::Indirect => RegId::Mdr,
                };
                ops.extend([
                    MicroOp::SetIoRequest(true),
                    MicroOp::SetIoGrant(true),
                    MicroOp::StageIo(source),
                    MicroOp::InvokeDevice,
                    MicroOp::SetIoGrant(false),
                    MicroOp::SetIoRequest(false),
                ]);
            }
            Opcode::Input => ops.extend([MicroOp::LoadInput, MicroOp::SetIoGrant(false)]),
            Opcode::End => {
                self.queue.push_back(MicroOp::End);
                return;
            }
        }
        ops.push(MicroOp::Fetch);
        self.queue.extend(ops);
    }

    /// The PC-load sequence shared by `goto` and the taken branches: one
    /// transfer in standard mode, four rotate-assembled byte transfers in
    /// expanded mode (most significant byte first).
    fn goto_ops(&self) -> Vec<MicroOp> {
        match self.mode {
            MachineMode::Standard => vec![
                MicroOp::RequestBus,
                MicroOp::GrantBus,
                MicroOp::StageData(RegId::Mdr),
                MicroOp::Load(RegId::Pc),
                MicroOp::ReleaseBus,
            ],
            MachineMode::Expanded => {
                let mut ops = vec![MicroOp::RequestBus, MicroOp::GrantBus];
                for _ in 0..WIDE_TRANSFER_BYTES {
                    ops.extend([
                        MicroOp::Rotate {
                            reg: RegId::Mdr,
                            times: BYTE_BITS,
                            direction: Direction::Left,
                        },
                        MicroOp::StageData(RegId::Mdr),
                        MicroOp::Rotate {
                            reg: RegId::Pc,
                            times: BYTE_BITS,
                            direction: Direction::Left,
                        },
                        MicroOp::LoadTail(RegId::Pc),
                    ]);
                }
                ops.push(MicroOp::ReleaseBus);
                ops
            }
        }
    }
}
