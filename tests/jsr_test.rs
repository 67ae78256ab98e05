//! Tests for JSR, RTS and the JMP forms.
//!
//! Tests cover:
//! - JSR pushes the address of its last byte, high byte first
//! - RTS pulls it and steps past it
//! - JMP absolute, indirect and absolute-indexed-indirect timing
//! - The 65C02 fix for indirect pointers at a page end

use chiplab65::{BusCycle, Direction, MemoryBus, MemoryImage, CPU, RESET_CYCLES};

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

// ========== JSR / RTS ==========

#[test]
fn test_jsr_pushes_return_address() {
    // JSR $1234
    let mut cpu = setup_cpu(&[0x20, 0x34, 0x12]);

    let cycles = step(&mut cpu);

    assert_eq!(cycles.len(), 6);
    assert_eq!(cycles[2].address, 0x01FD);
    assert_eq!(cycles[2].direction, Direction::Read);
    assert_eq!(
        (cycles[3].address, cycles[3].data, cycles[3].direction),
        (0x01FD, 0x80, Direction::Write)
    );
    assert_eq!(
        (cycles[4].address, cycles[4].data, cycles[4].direction),
        (0x01FC, 0x02, Direction::Write)
    );
    // High operand byte is read after the pushes
    assert_eq!(cycles[5].address, 0x8002);

    assert_eq!(cpu.pc(), 0x1234);
    assert_eq!(cpu.sp(), 0xFB);
}

#[test]
fn test_rts_returns_after_jsr() {
    let mut cpu = setup_cpu(&[0x20, 0x34, 0x12, 0xEA]);
    cpu.memory_mut().write(0x1234, 0x60); // RTS

    step(&mut cpu);
    let cycles = step(&mut cpu);

    assert_eq!(cycles.len(), 6);
    assert_eq!(cycles[3].address, 0x01FC);
    assert_eq!(cycles[4].address, 0x01FD);
    // Dummy read of the pulled address before incrementing it
    assert_eq!(cycles[5].address, 0x8002);
    assert!(cycles.iter().all(|c| c.direction == Direction::Read));

    assert_eq!(cpu.pc(), 0x8003);
    assert_eq!(cpu.sp(), 0xFD);
}

#[test]
fn test_jsr_does_not_affect_flags() {
    let mut cpu = setup_cpu(&[0x20, 0x00, 0x90]);
    cpu.set_status(0xC3);
    let status = cpu.status();

    step(&mut cpu);

    assert_eq!(cpu.status(), status);
}

// ========== JMP ==========

#[test]
fn test_jmp_absolute() {
    let mut cpu = setup_cpu(&[0x4C, 0x00, 0x90]);

    let cycles = step(&mut cpu);

    assert_eq!(cycles.len(), 3);
    assert_eq!(cpu.pc(), 0x9000);
}

#[test]
fn test_jmp_indirect() {
    let mut cpu = setup_cpu(&[0x6C, 0x00, 0x20]);
    cpu.memory_mut().write(0x2000, 0x78);
    cpu.memory_mut().write(0x2001, 0x56);

    let cycles = step(&mut cpu);

    assert_eq!(cycles.len(), 6);
    assert_eq!(cycles[4].address, 0x2000);
    assert_eq!(cycles[5].address, 0x2001);
    assert_eq!(cpu.pc(), 0x5678);
}

#[test]
fn test_jmp_indirect_page_end_reads_next_page() {
    // The NMOS part would read the high byte from $1200
    let mut cpu = setup_cpu(&[0x6C, 0xFF, 0x12]);
    cpu.memory_mut().write(0x12FF, 0x34);
    cpu.memory_mut().write(0x1300, 0x12);
    cpu.memory_mut().write(0x1200, 0xEE);

    let cycles = step(&mut cpu);

    assert_eq!(cycles[5].address, 0x1300);
    assert_eq!(cpu.pc(), 0x1234);
}

#[test]
fn test_jmp_absolute_indexed_indirect() {
    // JMP ($2000,X) with X=4
    let mut cpu = setup_cpu(&[0x7C, 0x00, 0x20]);
    cpu.set_x(0x04);
    cpu.memory_mut().write(0x2004, 0xCD);
    cpu.memory_mut().write(0x2005, 0xAB);

    let cycles = step(&mut cpu);

    assert_eq!(cycles.len(), 6);
    assert_eq!(cycles[4].address, 0x2004);
    assert_eq!(cpu.pc(), 0xABCD);
}
