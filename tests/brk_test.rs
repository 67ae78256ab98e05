//! Tests for BRK and RTI.

use chiplab65::{BusCycle, BusFlags, Direction, MemoryImage, Status, CPU, RESET_CYCLES};

/// Reset vector 0x8000, IRQ/BRK vector 0x9000.
fn setup_cpu(program: &[u8], handler: &[u8]) -> CPU<MemoryImage> {
    let mut memory = MemoryImage::new();
    memory.load(0xFFFC, &[0x00, 0x80, 0x00, 0x90]);
    memory.load(0x8000, program);
    memory.load(0x9000, handler);
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

#[test]
fn test_brk_sequence() {
    let mut cpu = setup_cpu(&[0x00, 0xEE], &[0x40]);
    cpu.set_flag(Status::I, false);

    let cycles = step(&mut cpu);

    assert_eq!(cycles.len(), 7);
    // Signature byte is read and skipped
    assert_eq!(cycles[1].address, 0x8001);
    assert_eq!(cycles[1].data, 0xEE);

    let pushes: Vec<(u16, u8)> = cycles
        .iter()
        .filter(|c| c.direction == Direction::Write)
        .map(|c| (c.address, c.data))
        .collect();
    // Return address skips the signature; pushed P has B and bit 5 set
    assert_eq!(pushes, vec![(0x01FD, 0x80), (0x01FC, 0x02), (0x01FB, 0x30)]);

    assert_eq!(cycles[5].address, 0xFFFE);
    assert_eq!(cycles[6].address, 0xFFFF);
    assert!(cycles[5].flags.contains(BusFlags::VECTOR_PULL));
    assert!(cycles[6].flags.contains(BusFlags::VECTOR_PULL));

    assert_eq!(cpu.pc(), 0x9000);
    assert_eq!(cpu.sp(), 0xFA);
    assert!(cpu.flag_i());
}

#[test]
fn test_brk_clears_decimal() {
    let mut cpu = setup_cpu(&[0x00, 0x00], &[0x40]);
    cpu.set_flag(Status::D, true);

    let cycles = step(&mut cpu);

    // D is pushed as it was, then cleared for the handler
    assert_eq!(cycles[4].data & 0x08, 0x08);
    assert!(!cpu.flag_d());
}

#[test]
fn test_rti_restores_state() {
    let mut cpu = setup_cpu(&[0x00, 0x00, 0xEA], &[0x40]);
    cpu.set_status(0xC3);

    step(&mut cpu);
    let cycles = step(&mut cpu);

    assert_eq!(cycles.len(), 6);
    assert!(cycles.iter().all(|c| c.direction == Direction::Read));
    assert_eq!(cpu.pc(), 0x8002);
    assert_eq!(cpu.sp(), 0xFD);
    // B is not a stored flag; bit 5 always reads as set
    assert_eq!(cpu.status(), 0xE3);
}

#[test]
fn test_rti_does_not_increment_return_address() {
    let mut cpu = setup_cpu(&[0x40], &[]);
    // Hand-built frame: P, PCL, PCH
    cpu.set_sp(0xFA);
    cpu.memory_mut().load(0x01FB, &[0x01, 0x34, 0x12]);

    step(&mut cpu);

    assert_eq!(cpu.pc(), 0x1234);
    assert!(cpu.flag_c());
    assert!(!cpu.flag_i());
}
