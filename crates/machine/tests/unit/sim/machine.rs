//! End-to-end instruction scenarios through the full machine.

use bytesim_core::common::{Fault, Flag};
use bytesim_core::isa::AddressingMode::{Direct, Indirect};
use bytesim_core::isa::Opcode;

use crate::common::harness::{TestContext, exp_instr0, exp_instr1, exp_instr4, std_instr};

// ─── Arithmetic ──────────────────────────────────────────────────────────────

#[test]
fn add_direct_accumulates() {
    let mut ctx = TestContext::standard();
    ctx.load(&[
        std_instr(Opcode::Add, Direct, 3),
        std_instr(Opcode::Add, Direct, 5),
        std_instr(Opcode::End, Direct, 0),
    ]);
    ctx.run_to_halt();
    assert_eq!(ctx.acc(), 8);
    assert!(!ctx.flag(Flag::Zero));
    assert!(!ctx.flag(Flag::Negative));
}

#[test]
fn sub_below_zero_wraps_and_sets_negative() {
    let mut ctx = TestContext::standard();
    ctx.load(&[
        std_instr(Opcode::Add, Direct, 5),
        std_instr(Opcode::Sub, Direct, 7),
        std_instr(Opcode::End, Direct, 0),
    ]);
    ctx.run_to_halt();
    assert_eq!(ctx.acc(), 254);
    assert!(ctx.flag(Flag::Negative));
    assert!(!ctx.flag(Flag::Zero));
}

#[test]
fn logic_ops_run_against_the_accumulator() {
    let mut ctx = TestContext::standard();
    ctx.load(&[
        std_instr(Opcode::Add, Direct, 0b1111_0000),
        std_instr(Opcode::And, Direct, 0b1010_1010),
        std_instr(Opcode::Or, Direct, 0b0000_0001),
        std_instr(Opcode::Xor, Direct, 0b1010_0001),
        std_instr(Opcode::End, Direct, 0),
    ]);
    ctx.run_to_halt();
    // 0b11110000 & 0b10101010 = 0b10100000; | 1 = 0b10100001; ^ itself = 0.
    assert_eq!(ctx.acc(), 0);
    assert!(ctx.flag(Flag::Zero));
}

#[test]
fn not_inverts_the_accumulator() {
    let mut ctx = TestContext::standard();
    ctx.load(&[
        std_instr(Opcode::Not, Direct, 0),
        std_instr(Opcode::End, Direct, 0),
    ]);
    ctx.run_to_halt();
    assert_eq!(ctx.acc(), 255);
    assert!(ctx.flag(Flag::Negative));
}

#[test]
fn indirect_operands_are_fetched_from_memory() {
    let mut ctx = TestContext::standard();
    ctx.load(&[
        std_instr(Opcode::Add, Indirect, 20),
        std_instr(Opcode::End, Direct, 0),
    ]);
    ctx.machine.write_memory(20, 9).expect("in range");
    ctx.run_to_halt();
    assert_eq!(ctx.acc(), 9);
}

// ─── Memory instructions ─────────────────────────────────────────────────────

#[test]
fn write_then_read_round_trips_through_memory() {
    let mut ctx = TestContext::standard();
    ctx.load(&[
        std_instr(Opcode::Add, Direct, 7),
        std_instr(Opcode::Write, Direct, 30),
        std_instr(Opcode::Add, Direct, 1),
        std_instr(Opcode::Read, Direct, 30),
        std_instr(Opcode::End, Direct, 0),
    ]);
    ctx.run_to_halt();
    assert_eq!(ctx.acc(), 7);
    assert_eq!(ctx.machine.read_memory(30).expect("in range"), 7);
    assert_eq!(ctx.machine.stats().mem_writes, 1);
}

#[test]
fn memory_interface_is_bounds_checked() {
    let mut ctx = TestContext::standard();
    assert!(matches!(
        ctx.machine.read_memory(256),
        Err(Fault::AddressOutOfRange { .. })
    ));
    assert!(ctx.machine.write_memory(255, 1).is_ok());

    let expanded = TestContext::expanded();
    assert!(expanded.machine.read_memory(u64::from(u32::MAX)).is_ok());
    assert!(expanded.machine.read_memory(1 << 32).is_err());
}

// ─── I/O ─────────────────────────────────────────────────────────────────────

#[test]
fn output_invokes_the_device_exactly_once() {
    let mut ctx = TestContext::standard();
    ctx.load(&[
        std_instr(Opcode::Add, Direct, 0b1010_0000),
        std_instr(Opcode::Output, Direct, 0),
        std_instr(Opcode::End, Direct, 0),
    ]);
    ctx.run_to_halt();

    assert_eq!(ctx.device.borrow().outputs, vec![0b1010_0000]);
    assert_eq!(ctx.machine.stats().io_outputs, 1);
    // The grant and request lines are released after the transfer.
    assert!(!ctx.machine.control_lines().io_grant);
    assert!(!ctx.machine.control_lines().io_request);
}

#[test]
fn staged_input_reaches_the_accumulator() {
    let mut ctx = TestContext::standard();
    ctx.load(&[
        std_instr(Opcode::Input, Direct, 0),
        std_instr(Opcode::End, Direct, 0),
    ]);
    ctx.machine.receive_input(42);
    ctx.run_to_halt();
    assert_eq!(ctx.acc(), 42);
    assert_eq!(ctx.machine.stats().io_inputs, 1);
    assert!(!ctx.machine.control_lines().io_grant);
}

#[test]
fn device_replies_feed_a_later_input() {
    // The device answers an output by staging a byte; the input instruction
    // picks it up once the handler grants the bus.
    let mut ctx = TestContext::standard();
    ctx.device.borrow_mut().push_reply(7);
    ctx.load(&[
        std_instr(Opcode::Add, Direct, 1),
        std_instr(Opcode::Output, Direct, 0),
        std_instr(Opcode::Input, Direct, 0),
        std_instr(Opcode::End, Direct, 0),
    ]);
    ctx.run_to_halt();
    assert_eq!(ctx.device.borrow().outputs, vec![1]);
    assert_eq!(ctx.acc(), 7);
}

#[test]
fn indirect_output_sends_the_fetched_operand() {
    let mut ctx = TestContext::standard();
    ctx.load(&[
        std_instr(Opcode::Output, Indirect, 40),
        std_instr(Opcode::End, Direct, 0),
    ]);
    ctx.machine.write_memory(40, 99).expect("in range");
    ctx.run_to_halt();
    assert_eq!(ctx.device.borrow().outputs, vec![99]);
}

// ─── Expanded mode ───────────────────────────────────────────────────────────

#[test]
fn expanded_arithmetic_and_carry() {
    let mut ctx = TestContext::expanded();
    ctx.load(&[
        exp_instr1(Opcode::Add, Direct, 200),
        exp_instr1(Opcode::Add, Direct, 100),
        exp_instr0(Opcode::End),
    ]);
    ctx.run_to_halt();
    assert_eq!(ctx.acc(), 44);
    assert!(ctx.flag(Flag::Carry));
    assert_eq!(ctx.machine.stats().instructions, 3);
}

#[test]
fn expanded_goto_assembles_a_wide_target() {
    // goto (5 bytes) jumps over the end at address 5 to the end at 6.
    let mut ctx = TestContext::expanded();
    ctx.load(&[
        exp_instr4(Opcode::Goto, Direct, 6),
        exp_instr0(Opcode::End),
        exp_instr0(Opcode::End),
    ]);
    ctx.run_to_halt();
    // The end at 6 was fetched, so the PC rests past it.
    assert_eq!(ctx.pc(), 7);
    assert_eq!(ctx.machine.stats().instructions, 2);
}

#[test]
fn expanded_indirect_operand() {
    let mut ctx = TestContext::expanded();
    ctx.load(&[
        exp_instr1(Opcode::Add, Indirect, 20),
        exp_instr0(Opcode::End),
    ]);
    ctx.machine.write_memory(20, 9).expect("in range");
    ctx.run_to_halt();
    assert_eq!(ctx.acc(), 9);
}

#[test]
fn expanded_runs_keep_memory_sparse() {
    let mut ctx = TestContext::expanded();
    ctx.load(&[
        exp_instr1(Opcode::Add, Direct, 7),
        exp_instr4(Opcode::Write, Direct, 1_000_000),
        exp_instr0(Opcode::End),
    ]);
    ctx.run_to_halt();
    assert_eq!(ctx.machine.read_memory(1_000_000).expect("in range"), 7);
    // Every materialized cell is non-zero: program bytes and the write.
    for (_, byte) in ctx.machine.memory().materialized() {
        assert_ne!(byte, 0);
    }
}

// ─── Bookkeeping ─────────────────────────────────────────────────────────────

#[test]
fn stats_count_the_run() {
    let mut ctx = TestContext::standard();
    ctx.load(&[
        std_instr(Opcode::Add, Direct, 1),
        std_instr(Opcode::End, Direct, 0),
    ]);
    ctx.run_to_halt();
    let stats = ctx.machine.stats();
    assert_eq!(stats.instructions, 2);
    assert!(stats.micro_ops > 0);
    // Two ticks per dispatched micro-op, minus the final halting cycle.
    assert!(stats.ticks >= stats.micro_ops);
    // Four fetch reads for two standard instructions.
    assert_eq!(stats.mem_reads, 4);
}

#[test]
fn reloading_resets_the_machine() {
    let mut ctx = TestContext::standard();
    ctx.load(&[
        std_instr(Opcode::Add, Direct, 9),
        std_instr(Opcode::End, Direct, 0),
    ]);
    ctx.run_to_halt();
    assert_eq!(ctx.acc(), 9);

    ctx.load(&[std_instr(Opcode::End, Direct, 0)]);
    assert!(!ctx.machine.is_halted());
    assert_eq!(ctx.acc(), 0);
    assert_eq!(ctx.machine.stats().instructions, 0);
    ctx.run_to_halt();
    assert_eq!(ctx.machine.stats().instructions, 1);
}

#[test]
fn loader_rejection_reports_the_offending_instruction() {
    let mut ctx = TestContext::standard();
    let err = ctx
        .machine
        .load_program(&["banana".to_string()])
        .expect_err("invalid program");
    assert!(err.to_string().contains("instruction 0"));
}
