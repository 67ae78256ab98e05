//! Property-based tests for engine invariants.
//!
//! These tests use proptest to check properties that must hold for every
//! implemented opcode and any register/operand combination.

use chiplab65::{
    implemented_opcodes, BusCycle, DecodeError, MemoryBus, MemoryImage, Operation, CPU,
    RESET_CYCLES,
};
use proptest::prelude::*;

/// Helper function to create a CPU with reset vector at 0x8000, after reset
fn setup_cpu(program: &[u8]) -> CPU<MemoryImage> {
    let mut memory = MemoryImage::new();
    memory.write(0xFFFC, 0x00);
    memory.write(0xFFFD, 0x80);
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

/// Opcodes that finish on their own; WAI and STP idle until an external event.
fn terminating_opcodes() -> Vec<u8> {
    implemented_opcodes()
        .filter(|d| !matches!(d.operation, Operation::Wai | Operation::Stp))
        .map(|d| d.opcode)
        .collect()
}

prop_compose! {
    fn registers()(a in any::<u8>(), x in any::<u8>(), y in any::<u8>(),
                   sp in any::<u8>(), p in any::<u8>()) -> (u8, u8, u8, u8, u8) {
        (a, x, y, sp, p)
    }
}

fn load_registers(cpu: &mut CPU<MemoryImage>, (a, x, y, sp, p): (u8, u8, u8, u8, u8)) {
    cpu.set_a(a);
    cpu.set_x(x);
    cpu.set_y(y);
    cpu.set_sp(sp);
    cpu.set_status(p);
}

proptest! {
    /// Two engines over the same memory produce the same bus cycles.
    #[test]
    fn prop_bus_activity_is_deterministic(
        program in prop::collection::vec(any::<u8>(), 1..32),
        regs in registers(),
    ) {
        let mut first = setup_cpu(&program);
        let mut second = setup_cpu(&program);
        load_registers(&mut first, regs);
        load_registers(&mut second, regs);

        let run = |cpu: &mut CPU<MemoryImage>| -> Vec<Result<BusCycle, DecodeError>> {
            (0..64).map(|_| cpu.tick()).collect()
        };

        prop_assert_eq!(run(&mut first), run(&mut second));
    }

    /// Every instruction takes its documented cycle count, plus at most two
    /// for a taken branch, a page crossing or a decimal-mode fixup.
    #[test]
    fn prop_cycle_count_within_documented_range(
        opcode in prop::sample::select(terminating_opcodes()),
        lo in any::<u8>(),
        hi in any::<u8>(),
        regs in registers(),
    ) {
        let mut cpu = setup_cpu(&[opcode, lo, hi]);
        load_registers(&mut cpu, regs);
        let documented = chiplab65::decode(opcode).cycles as usize;

        let cycles = step(&mut cpu);

        prop_assert!(
            cycles.len() >= documented && cycles.len() <= documented + 2,
            "opcode 0x{:02X} took {} cycles, documented {}",
            opcode, cycles.len(), documented
        );
    }

    /// Only the opcode fetch of an instruction has SYNC high, and cycle
    /// indices run consecutively.
    #[test]
    fn prop_sync_marks_only_the_fetch(
        opcode in prop::sample::select(terminating_opcodes()),
        lo in any::<u8>(),
        hi in any::<u8>(),
        regs in registers(),
    ) {
        let mut cpu = setup_cpu(&[opcode, lo, hi]);
        load_registers(&mut cpu, regs);

        let cycles = step(&mut cpu);

        prop_assert!(cycles[0].is_opcode_fetch());
        prop_assert_eq!(cycles[0].address, 0x8000);
        prop_assert_eq!(cycles[0].data, opcode);
        prop_assert!(cycles[1..].iter().all(|c| !c.is_opcode_fetch()));
        for pair in cycles.windows(2) {
            prop_assert_eq!(pair[1].cycle, pair[0].cycle + 1);
        }
    }

    /// PHA followed by PLA restores A and S.
    #[test]
    fn prop_push_pull_round_trip(a in any::<u8>(), sp in any::<u8>()) {
        // PHA / LDA #$00 / PLA
        let mut cpu = setup_cpu(&[0x48, 0xA9, 0x00, 0x68]);
        cpu.set_a(a);
        cpu.set_sp(sp);

        step(&mut cpu);
        step(&mut cpu);
        step(&mut cpu);

        prop_assert_eq!(cpu.a(), a);
        prop_assert_eq!(cpu.sp(), sp);
        prop_assert_eq!(cpu.flag_z(), a == 0);
        prop_assert_eq!(cpu.flag_n(), a & 0x80 != 0);
    }
}
