//! Register file tests: widths, increments, CIR assembly, and the
//! rotate-assemble transfer protocol.

use bytesim_core::MachineMode;
use bytesim_core::common::Flag;
use bytesim_core::common::word::{Direction, Word};
use bytesim_core::core::registers::{RegId, RegisterFile};

// ─── Increments ──────────────────────────────────────────────────────────────

#[test]
fn pc_steps_by_two_in_standard_mode() {
    let mut regs = RegisterFile::new(MachineMode::Standard);
    regs.increment(RegId::Pc);
    regs.increment(RegId::Pc);
    assert_eq!(regs.get(RegId::Pc).to_u64(), 4);
}

#[test]
fn pc_steps_by_one_in_expanded_mode() {
    let mut regs = RegisterFile::new(MachineMode::Expanded);
    regs.increment(RegId::Pc);
    assert_eq!(regs.get(RegId::Pc).to_u64(), 1);
    assert_eq!(regs.get(RegId::Pc).width(), 32);
}

#[test]
fn mar_steps_by_one() {
    let mut regs = RegisterFile::new(MachineMode::Standard);
    regs.increment(RegId::Mar);
    assert_eq!(regs.get(RegId::Mar).to_u64(), 1);
}

#[test]
fn increment_wraps_at_register_width() {
    let mut regs = RegisterFile::new(MachineMode::Standard);
    regs.load(RegId::Pc, &Word::from_u64(254, 8));
    regs.increment(RegId::Pc);
    assert_eq!(regs.get(RegId::Pc).to_u64(), 0);

    regs.load(RegId::Mar, &Word::from_u64(255, 8));
    regs.increment(RegId::Mar);
    assert_eq!(regs.get(RegId::Mar).to_u64(), 0);
}

// ─── Loads ───────────────────────────────────────────────────────────────────

#[test]
fn load_zero_extends_into_wide_registers() {
    let mut regs = RegisterFile::new(MachineMode::Expanded);
    regs.load(RegId::Mdr, &Word::from_u64(0xFFFF_FFFF, 32));
    regs.load(RegId::Mdr, &Word::from_u64(0xAB, 8));
    // A fresh 8-bit load must not inherit stale high bytes.
    assert_eq!(regs.get(RegId::Mdr).to_u64(), 0xAB);
}

#[test]
fn load_tail_preserves_the_head() {
    let mut regs = RegisterFile::new(MachineMode::Expanded);
    regs.load(RegId::Mdr, &Word::from_u64(0xAABB_CCDD, 32));
    regs.load_tail(RegId::Mdr, &Word::from_u64(0x11, 8));
    assert_eq!(regs.get(RegId::Mdr).to_u64(), 0xAABB_CC11);
}

#[test]
fn load_operand_left_pads_to_register_width() {
    let mut regs = RegisterFile::new(MachineMode::Expanded);
    regs.load_operand(RegId::Mdr, &Word::from_u64(0x7F, 8));
    assert_eq!(regs.get(RegId::Mdr).to_u64(), 0x7F);
    assert_eq!(regs.get(RegId::Mdr).width(), 32);
}

#[test]
fn latch_mar_copies_the_address_bus() {
    let mut regs = RegisterFile::new(MachineMode::Standard);
    regs.latch_mar(&Word::from_u64(42, 8));
    assert_eq!(regs.get(RegId::Mar).to_u64(), 42);
}

// ─── CIR assembly ────────────────────────────────────────────────────────────

#[test]
fn standard_cir_discards_second_byte_padding() {
    let mut regs = RegisterFile::new(MachineMode::Standard);
    regs.latch_cir(0, &Word::from_u64(0b0001_0101, 8));
    // The top two bits of the second byte are packing waste.
    regs.latch_cir(1, &Word::from_u64(0b1100_0011, 8));
    assert_eq!(regs.get(RegId::Cir).width(), 14);
    assert_eq!(regs.get(RegId::Cir).to_u64(), 0b0001_0101_000011);
}

#[test]
fn expanded_cir_grows_byte_by_byte() {
    let mut regs = RegisterFile::new(MachineMode::Expanded);
    regs.latch_cir(0, &Word::from_u64(0xF0, 8));
    assert_eq!(regs.get(RegId::Cir).width(), 8);
    regs.latch_cir(1, &Word::from_u64(0xAB, 8));
    assert_eq!(regs.get(RegId::Cir).width(), 16);
    assert_eq!(regs.get(RegId::Cir).to_u64(), 0xF0AB);
}

#[test]
fn expanded_cir_resets_on_part_zero() {
    let mut regs = RegisterFile::new(MachineMode::Expanded);
    regs.latch_cir(0, &Word::from_u64(0x01, 8));
    regs.latch_cir(1, &Word::from_u64(0x02, 8));
    regs.latch_cir(0, &Word::from_u64(0x03, 8));
    assert_eq!(regs.get(RegId::Cir).width(), 8);
    assert_eq!(regs.get(RegId::Cir).to_u64(), 0x03);
}

// ─── Rotate-assemble protocol ────────────────────────────────────────────────

#[test]
fn rotate_assembles_a_wide_register_from_byte_transfers() {
    // The expanded goto protocol: four times, rotate MDR left a byte, move
    // its tail over the 8-bit data bus, rotate PC left a byte, merge the
    // tail. MSB byte travels first; MDR ends where it started.
    let mut regs = RegisterFile::new(MachineMode::Expanded);
    let target = 0x0102_0304u64;
    regs.load_operand(RegId::Mdr, &Word::from_u64(target, 32));

    for _ in 0..4 {
        regs.rotate(RegId::Mdr, 8, Direction::Left);
        let mut bus = Word::zero(8);
        bus.copy_from(regs.get(RegId::Mdr));
        regs.rotate(RegId::Pc, 8, Direction::Left);
        regs.load_tail(RegId::Pc, &bus);
    }

    assert_eq!(regs.get(RegId::Pc).to_u64(), target);
    assert_eq!(regs.get(RegId::Mdr).to_u64(), target);
}

// ─── STATUS and snapshots ────────────────────────────────────────────────────

#[test]
fn status_update_sets_and_clears_single_flags() {
    let mut regs = RegisterFile::new(MachineMode::Standard);
    regs.status_update(Flag::Carry, true);
    assert!(regs.flag(Flag::Carry));
    assert!(!regs.flag(Flag::Zero));
    regs.status_update(Flag::Carry, false);
    assert!(!regs.flag(Flag::Carry));
}

#[test]
fn load_input_fills_the_accumulator() {
    let mut regs = RegisterFile::new(MachineMode::Standard);
    regs.load_input(&Word::from_u64(0b1010_0000, 8));
    assert_eq!(regs.get(RegId::Acc).to_u64(), 0b1010_0000);
}

#[test]
fn snapshot_is_a_point_in_time_copy() {
    let mut regs = RegisterFile::new(MachineMode::Standard);
    regs.load(RegId::Acc, &Word::from_u64(7, 8));
    let snap = regs.snapshot();
    regs.load(RegId::Acc, &Word::from_u64(9, 8));
    assert_eq!(snap.acc.to_u64(), 7);
    assert_eq!(regs.get(RegId::Acc).to_u64(), 9);
}
