//! Tests for the store instructions (STA, STX, STY, STZ).
//!
//! Stores never read their target. Indexed absolute and indirect-indexed
//! stores always spend the fix-up cycle, page crossing or not.

use chiplab65::{BusCycle, Direction, MemoryBus, MemoryImage, CPU, RESET_CYCLES};

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

fn step(cpu: &mut CPU<MemoryImage>) -> Vec<BusCycle> {
    let mut cycles = vec![cpu.tick().unwrap()];
    while !cpu.at_instruction_boundary() {
        cycles.push(cpu.tick().unwrap());
    }
    cycles
}

fn writes(cycles: &[BusCycle]) -> Vec<(u16, u8)> {
    cycles
        .iter()
        .filter(|c| c.direction == Direction::Write)
        .map(|c| (c.address, c.data))
        .collect()
}

#[test]
fn test_lda_zero_page_then_sta_zero_page() {
    // LDA $00 / STA $10
    let mut cpu = setup_cpu(&[0xA5, 0x00, 0x85, 0x10]);
    cpu.memory_mut().write(0x0000, 0xCA);

    let load = step(&mut cpu);
    let store = step(&mut cpu);

    assert!(writes(&load).is_empty());
    assert_eq!(store.len(), 3);
    assert_eq!(writes(&store), vec![(0x0010, 0xCA)]);
    assert_eq!(store[2].address, 0x0010);
    assert_eq!(cpu.memory_mut().read(0x0010), 0xCA);
}

#[test]
fn test_sta_absolute() {
    let mut cpu = setup_cpu(&[0x8D, 0x34, 0x12]);
    cpu.set_a(0x5A);

    let cycles = step(&mut cpu);

    assert_eq!(cycles.len(), 4);
    assert_eq!(writes(&cycles), vec![(0x1234, 0x5A)]);
    // Flags untouched
    assert!(!cpu.flag_z());
    assert!(!cpu.flag_n());
}

#[test]
fn test_sta_absolute_x_always_five_cycles() {
    let mut cpu = setup_cpu(&[0x9D, 0x00, 0x12]);
    cpu.set_a(0x11);
    cpu.set_x(0x01);

    let cycles = step(&mut cpu);

    assert_eq!(cycles.len(), 5);
    // Fix-up is a read, never a write to the unfixed address
    assert_eq!(cycles[3].direction, Direction::Read);
    assert_eq!(writes(&cycles), vec![(0x1201, 0x11)]);
}

#[test]
fn test_sta_absolute_y_page_crossing() {
    let mut cpu = setup_cpu(&[0x99, 0xFF, 0x12]);
    cpu.set_a(0x22);
    cpu.set_y(0x01);

    let cycles = step(&mut cpu);

    assert_eq!(cycles.len(), 5);
    assert_eq!(writes(&cycles), vec![(0x1300, 0x22)]);
}

#[test]
fn test_sta_indirect_y_always_six_cycles() {
    let mut cpu = setup_cpu(&[0x91, 0x40]);
    cpu.set_a(0x33);
    cpu.set_y(0x02);
    cpu.memory_mut().write(0x0040, 0x00);
    cpu.memory_mut().write(0x0041, 0x20);

    let cycles = step(&mut cpu);

    assert_eq!(cycles.len(), 6);
    assert_eq!(writes(&cycles), vec![(0x2002, 0x33)]);
}

#[test]
fn test_sta_zero_page_indirect() {
    let mut cpu = setup_cpu(&[0x92, 0x40]);
    cpu.set_a(0x44);
    cpu.memory_mut().write(0x0040, 0x10);
    cpu.memory_mut().write(0x0041, 0x20);

    let cycles = step(&mut cpu);

    assert_eq!(cycles.len(), 5);
    assert_eq!(writes(&cycles), vec![(0x2010, 0x44)]);
}

#[test]
fn test_stx_zero_page_y() {
    let mut cpu = setup_cpu(&[0x96, 0x10]);
    cpu.set_x(0x7E);
    cpu.set_y(0x02);

    let cycles = step(&mut cpu);

    assert_eq!(cycles.len(), 4);
    assert_eq!(writes(&cycles), vec![(0x0012, 0x7E)]);
}

#[test]
fn test_sty_absolute() {
    let mut cpu = setup_cpu(&[0x8C, 0x00, 0x30]);
    cpu.set_y(0x9C);

    let cycles = step(&mut cpu);

    assert_eq!(writes(&cycles), vec![(0x3000, 0x9C)]);
}

#[test]
fn test_stz_zero_page_and_absolute_x() {
    // STZ $10 / STZ $2000,X
    let mut cpu = setup_cpu(&[0x64, 0x10, 0x9E, 0x00, 0x20]);
    cpu.set_a(0xFF);
    cpu.set_x(0x03);
    cpu.memory_mut().write(0x0010, 0xAA);
    cpu.memory_mut().write(0x2003, 0xBB);

    let first = step(&mut cpu);
    let second = step(&mut cpu);

    assert_eq!(first.len(), 3);
    assert_eq!(writes(&first), vec![(0x0010, 0x00)]);
    assert_eq!(second.len(), 5);
    assert_eq!(writes(&second), vec![(0x2003, 0x00)]);
    assert_eq!(cpu.a(), 0xFF);
}
