//! Tests for the LDA (Load Accumulator) instruction.
//!
//! Tests cover:
//! - All 8 addressing modes
//! - Flag updates (Z, N)
//! - Bus cycles per mode, including page crossing penalties

use chiplab65::{BusCycle, BusFlags, Direction, MemoryBus, MemoryImage, CPU, RESET_CYCLES};

/// Creates a CPU with `program` at 0x8000 and runs the reset sequence.
fn setup_cpu(program: &[u8]) -> CPU<MemoryImage> {
    let mut memory = MemoryImage::new();
    memory.load(0xFFFC, &[0x00, 0x80]);
    memory.load(0x8000, program);
    let mut cpu = CPU::new(memory);
    for _ in 0..RESET_CYCLES {
        cpu.tick().unwrap();
    }
    cpu
}

/// Runs one instruction and returns its bus cycles.
fn step(cpu: &mut CPU<MemoryImage>) -> Vec<BusCycle> {
    let mut cycles = vec![cpu.tick().unwrap()];
    while !cpu.at_instruction_boundary() {
        cycles.push(cpu.tick().unwrap());
    }
    cycles
}

fn addresses(cycles: &[BusCycle]) -> Vec<u16> {
    cycles.iter().map(|c| c.address).collect()
}

// ========== Immediate ==========

#[test]
fn test_lda_immediate_from_reset() {
    let mut cpu = setup_cpu(&[0xA9, 0xAB]);

    let cycles = step(&mut cpu);

    assert_eq!(cycles.len(), 2);
    assert_eq!(cycles[0].address, 0x8000);
    assert_eq!(cycles[0].data, 0xA9);
    assert_eq!(cycles[0].flags, BusFlags::SYNC);
    assert_eq!(cycles[1].address, 0x8001);
    assert_eq!(cycles[1].data, 0xAB);
    assert_eq!(cycles[1].flags, BusFlags::empty());
    assert!(cycles.iter().all(|c| c.direction == Direction::Read));

    assert_eq!(cpu.a(), 0xAB);
    assert!(!cpu.flag_z());
    assert!(cpu.flag_n());
    assert_eq!(cpu.pc(), 0x8002);
}

#[test]
fn test_lda_zero_flag() {
    let mut cpu = setup_cpu(&[0xA9, 0x00]);
    cpu.set_a(0xFF);

    step(&mut cpu);

    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_z());
    assert!(!cpu.flag_n());
}

#[test]
fn test_lda_positive_value_clears_flags() {
    let mut cpu = setup_cpu(&[0xA9, 0x80, 0xA9, 0x42]);

    step(&mut cpu);
    assert!(cpu.flag_n());

    step(&mut cpu);
    assert_eq!(cpu.a(), 0x42);
    assert!(!cpu.flag_n());
    assert!(!cpu.flag_z());
}

// ========== Zero Page Modes ==========

#[test]
fn test_lda_zero_page() {
    // LDA $42
    let mut cpu = setup_cpu(&[0xA5, 0x42]);
    cpu.memory_mut().write(0x0042, 0x37);

    let cycles = step(&mut cpu);

    assert_eq!(addresses(&cycles), vec![0x8000, 0x8001, 0x0042]);
    assert_eq!(cycles[2].data, 0x37);
    assert_eq!(cpu.a(), 0x37);
}

#[test]
fn test_lda_zero_page_x_wraps() {
    // LDA $F0,X with X=0x20 reads $0010, not $0110
    let mut cpu = setup_cpu(&[0xB5, 0xF0]);
    cpu.set_x(0x20);
    cpu.memory_mut().write(0x0010, 0x99);
    cpu.memory_mut().write(0x0110, 0x11);

    let cycles = step(&mut cpu);

    // Dummy read of the operand while the index is added
    assert_eq!(addresses(&cycles), vec![0x8000, 0x8001, 0x8001, 0x0010]);
    assert_eq!(cpu.a(), 0x99);
}

#[test]
fn test_lda_zero_page_indirect() {
    // LDA ($40)
    let mut cpu = setup_cpu(&[0xB2, 0x40]);
    cpu.memory_mut().write(0x0040, 0x00);
    cpu.memory_mut().write(0x0041, 0x30);
    cpu.memory_mut().write(0x3000, 0x5A);

    let cycles = step(&mut cpu);

    assert_eq!(
        addresses(&cycles),
        vec![0x8000, 0x8001, 0x0040, 0x0041, 0x3000]
    );
    assert_eq!(cpu.a(), 0x5A);
}

#[test]
fn test_lda_indirect_x() {
    // LDA ($40,X) with X=2 uses the pointer at $42
    let mut cpu = setup_cpu(&[0xA1, 0x40]);
    cpu.set_x(0x02);
    cpu.memory_mut().write(0x0042, 0x34);
    cpu.memory_mut().write(0x0043, 0x12);
    cpu.memory_mut().write(0x1234, 0x77);

    let cycles = step(&mut cpu);

    assert_eq!(
        addresses(&cycles),
        vec![0x8000, 0x8001, 0x8001, 0x0042, 0x0043, 0x1234]
    );
    assert_eq!(cpu.a(), 0x77);
}

#[test]
fn test_lda_indirect_x_pointer_wraps_in_zero_page() {
    // Pointer at $FF takes its high byte from $00
    let mut cpu = setup_cpu(&[0xA1, 0xFE]);
    cpu.set_x(0x01);
    cpu.memory_mut().write(0x00FF, 0x00);
    cpu.memory_mut().write(0x0000, 0x40);
    cpu.memory_mut().write(0x4000, 0x66);

    let cycles = step(&mut cpu);

    assert_eq!(cycles[4].address, 0x0000);
    assert_eq!(cpu.a(), 0x66);
}

// ========== Absolute Modes ==========

#[test]
fn test_lda_absolute() {
    // LDA $1234
    let mut cpu = setup_cpu(&[0xAD, 0x34, 0x12]);
    cpu.memory_mut().write(0x1234, 0x80);

    let cycles = step(&mut cpu);

    assert_eq!(addresses(&cycles), vec![0x8000, 0x8001, 0x8002, 0x1234]);
    assert_eq!(cpu.a(), 0x80);
    assert!(cpu.flag_n());
    assert_eq!(cpu.pc(), 0x8003);
}

#[test]
fn test_lda_absolute_x_same_page() {
    let mut cpu = setup_cpu(&[0xBD, 0x00, 0x12]);
    cpu.set_x(0x05);
    cpu.memory_mut().write(0x1205, 0x21);

    let cycles = step(&mut cpu);

    assert_eq!(cycles.len(), 4);
    assert_eq!(cycles[3].address, 0x1205);
    assert_eq!(cpu.a(), 0x21);
}

#[test]
fn test_lda_absolute_x_page_crossing() {
    let mut cpu = setup_cpu(&[0xBD, 0xFF, 0x12]);
    cpu.set_x(0x01);
    cpu.memory_mut().write(0x1300, 0x5F);

    let cycles = step(&mut cpu);

    // One extra cycle re-reading the last operand byte
    assert_eq!(
        addresses(&cycles),
        vec![0x8000, 0x8001, 0x8002, 0x8002, 0x1300]
    );
    assert_eq!(cpu.a(), 0x5F);
}

#[test]
fn test_lda_absolute_y_page_crossing() {
    let mut cpu = setup_cpu(&[0xB9, 0x80, 0x12]);
    cpu.set_y(0x80);
    cpu.memory_mut().write(0x1300, 0x01);

    let cycles = step(&mut cpu);

    assert_eq!(cycles.len(), 5);
    assert_eq!(cycles[4].address, 0x1300);
    assert_eq!(cpu.a(), 0x01);
}

#[test]
fn test_lda_indirect_y_page_crossing() {
    // LDA ($40),Y with base $12FF and Y=1
    let mut cpu = setup_cpu(&[0xB1, 0x40]);
    cpu.set_y(0x01);
    cpu.memory_mut().write(0x0040, 0xFF);
    cpu.memory_mut().write(0x0041, 0x12);
    cpu.memory_mut().write(0x1300, 0xC3);

    let cycles = step(&mut cpu);

    assert_eq!(
        addresses(&cycles),
        vec![0x8000, 0x8001, 0x0040, 0x0041, 0x0041, 0x1300]
    );
    assert_eq!(cpu.a(), 0xC3);
}

#[test]
fn test_lda_indirect_y_same_page() {
    let mut cpu = setup_cpu(&[0xB1, 0x40]);
    cpu.set_y(0x10);
    cpu.memory_mut().write(0x0040, 0x00);
    cpu.memory_mut().write(0x0041, 0x12);
    cpu.memory_mut().write(0x1210, 0x3C);

    let cycles = step(&mut cpu);

    assert_eq!(cycles.len(), 5);
    assert_eq!(cpu.a(), 0x3C);
}
