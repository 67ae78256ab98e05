//! # CPU State and Execution
//!
//! This module contains the CPU struct representing the 65C02 processor state
//! and the cycle-level execution engine.
//!
//! ## CPU State
//!
//! The CPU maintains:
//! - **Registers**: A, X, Y, S, PC and the packed status byte
//! - **Micro-op position**: the running program and the next step in it
//! - **Internal latches**: effective address, pointer, data and the
//!   page-crossing / branch-taken conditions
//! - **Cycle counter**: u64 monotonically increasing cycle count
//!
//! ## Execution Model
//!
//! The only way to advance the CPU is [`CPU::tick`], which runs exactly one
//! clock cycle and returns the [`BusCycle`] it produced. Repeated ticks run
//! the reset sequence, each instruction's program and, transparently, the
//! next opcode fetch or interrupt sequence.

use log::{debug, trace};

use crate::bus::{BusCycle, BusFlags, Direction};
use crate::instructions;
use crate::interrupts::{InterruptLines, InterruptState, IRQ_VECTOR, RESET_VECTOR};
use crate::memory::MemoryBus;
use crate::microcode::{Index, MicroOp, When, INTERRUPT_SEQUENCE, RESET_SEQUENCE};
use crate::opcodes::{decode, Operation};
use crate::registers::{Registers, Status};
use crate::DecodeError;

/// Number of cycles the reset sequence takes.
pub const RESET_CYCLES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Next tick fetches an opcode or starts an interrupt sequence.
    Fetch,
    /// Running `program[step]`.
    Execute,
    /// WAI: idle until an interrupt line wakes the CPU.
    Waiting,
    /// STP: idle until reset.
    Stopped,
    /// An opcode without a program was fetched.
    Jammed(DecodeError),
}

/// 65C02 CPU state and execution context.
///
/// The CPU is generic over the memory implementation via the `MemoryBus`
/// trait and owns that memory for its whole lifetime.
///
/// # Examples
///
/// ```
/// use chiplab65::{MemoryBus, MemoryImage, CPU, RESET_CYCLES};
///
/// let mut memory = MemoryImage::new();
/// memory.write(0xFFFC, 0x00); // Low byte
/// memory.write(0xFFFD, 0x80); // High byte (PC = 0x8000)
/// memory.write(0x8000, 0xA9); // LDA #$AB
/// memory.write(0x8001, 0xAB);
///
/// let mut cpu = CPU::new(memory);
/// for _ in 0..RESET_CYCLES {
///     cpu.tick().unwrap();
/// }
/// assert_eq!(cpu.pc(), 0x8000);
/// assert_eq!(cpu.sp(), 0xFD);
///
/// let fetch = cpu.tick().unwrap();
/// assert!(fetch.is_opcode_fetch());
/// let operand = cpu.tick().unwrap();
/// assert_eq!(operand.data, 0xAB);
/// assert_eq!(cpu.a(), 0xAB);
/// ```
pub struct CPU<M: MemoryBus> {
    regs: Registers,
    memory: M,
    cycles: u64,

    phase: Phase,
    program: &'static [MicroOp],
    step: usize,
    operation: Operation,

    /// Effective address being built or used.
    address: u16,
    /// Zero page pointer for the indirect modes.
    pointer: u8,
    /// Byte latched by an earlier cycle of the program.
    data: u8,
    page_crossed: bool,
    branch_taken: bool,
    vector: u16,
    last_address: u16,

    lines: InterruptLines,
    /// I as it stood at the start of the last bus cycle. The next boundary
    /// polls IRQ against this, so CLI/SEI/PLP take effect one instruction late.
    irq_masked: Option<bool>,
    interrupt_state: InterruptState,
    pending: Option<BusCycle>,
}

impl<M: MemoryBus> CPU<M> {
    /// Creates a CPU in the power-on state with a reset pending.
    ///
    /// No bus activity happens here; the first [`RESET_CYCLES`] ticks run the
    /// reset sequence, which loads PC from $FFFC/$FFFD, leaves S at $FD, sets
    /// I and clears D.
    pub fn new(memory: M) -> Self {
        let mut cpu = Self {
            regs: Registers::power_on(),
            memory,
            cycles: 0,
            phase: Phase::Fetch,
            program: &[],
            step: 0,
            operation: Operation::Nop,
            address: 0,
            pointer: 0,
            data: 0,
            page_crossed: false,
            branch_taken: false,
            vector: RESET_VECTOR,
            last_address: 0,
            lines: InterruptLines::default(),
            irq_masked: None,
            interrupt_state: InterruptState::Running,
            pending: None,
        };
        cpu.reset();
        cpu
    }

    /// Starts the reset sequence on the next tick.
    ///
    /// Clears a stopped or jammed state and any latched NMI. Registers other
    /// than S, PC and P keep their values, as on the real chip.
    pub fn reset(&mut self) {
        debug!("reset requested at cycle {}", self.cycles);
        self.lines.clear_pending();
        self.interrupt_state = InterruptState::Running;
        self.operation = Operation::Nop;
        self.vector = RESET_VECTOR;
        self.start_program(RESET_SEQUENCE);
    }

    /// Advances exactly one clock cycle.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] on the cycle that fetches an opcode without a
    /// micro-op program. The CPU stays jammed and every later tick returns the
    /// same error until [`reset`](Self::reset).
    pub fn tick(&mut self) -> Result<BusCycle, DecodeError> {
        loop {
            match self.phase {
                Phase::Jammed(err) => return Err(err),
                Phase::Stopped => {
                    self.read(self.regs.pc, BusFlags::empty());
                }
                Phase::Waiting => {
                    // Leaving WAI costs one more read of PC before the fetch
                    if self.lines.wakes(self.irq_line()) {
                        debug!("WAI released at cycle {}", self.cycles);
                        self.phase = Phase::Fetch;
                    }
                    self.read(self.regs.pc, BusFlags::empty());
                }
                Phase::Fetch => {
                    if let Err(err) = self.fetch() {
                        self.pending = None;
                        return Err(err);
                    }
                }
                Phase::Execute => match self.program.get(self.step) {
                    Some(&op) => {
                        self.step += 1;
                        let masked = self.regs.flag(Status::I);
                        self.execute(op);
                        if self.pending.is_some() {
                            self.irq_masked = Some(masked);
                        }
                    }
                    None => self.phase = Phase::Fetch,
                },
            }

            if let Some(cycle) = self.pending.take() {
                return Ok(cycle);
            }
        }
    }

    /// Either starts an interrupt sequence (no cycle used) or fetches and
    /// decodes the next opcode (one cycle).
    fn fetch(&mut self) -> Result<(), DecodeError> {
        let irq_line = self.irq_line();
        let masked = self.irq_masked.take().unwrap_or(self.regs.flag(Status::I));
        if let Some(kind) = self.lines.poll(irq_line, masked) {
            debug!("{:?} taken at pc=0x{:04X}", kind, self.regs.pc);
            self.interrupt_state = kind.servicing_state();
            self.vector = kind.vector();
            self.start_program(INTERRUPT_SEQUENCE);
            return Ok(());
        }

        let address = self.regs.pc;
        let opcode = self.read(address, BusFlags::SYNC);
        self.regs.pc = address.wrapping_add(1);

        let descriptor = decode(opcode);
        match descriptor.program_at(address) {
            Ok(program) => {
                trace!(
                    "0x{:04X}: {} {:?} (0x{:02X})",
                    address,
                    descriptor.mnemonic,
                    descriptor.mode,
                    opcode
                );
                self.operation = descriptor.operation;
                self.vector = IRQ_VECTOR;
                self.start_program(program);
                Ok(())
            }
            Err(err) => {
                debug!("{}", err);
                self.phase = Phase::Jammed(err);
                Err(err)
            }
        }
    }

    fn start_program(&mut self, program: &'static [MicroOp]) {
        self.program = program;
        self.step = 0;
        self.page_crossed = false;
        self.branch_taken = false;
        self.phase = Phase::Execute;
    }

    fn execute(&mut self, op: MicroOp) {
        match op {
            MicroOp::SpuriousFetch => {
                self.read(self.regs.pc, BusFlags::SYNC);
            }
            MicroOp::OperandDummy => {
                self.read(self.regs.pc, BusFlags::empty());
            }
            MicroOp::ReadImmediate => {
                let value = self.read_pc();
                instructions::read_immediate(self.operation, &mut self.regs, value);
            }
            MicroOp::OperandZp | MicroOp::OperandLo => {
                self.address = self.read_pc() as u16;
            }
            MicroOp::OperandHi => {
                let hi = self.read_pc();
                self.address = (hi as u16) << 8 | (self.address & 0x00FF);
            }
            MicroOp::OperandHiIndexed(index) => {
                let hi = self.read_pc();
                let base = (hi as u16) << 8 | (self.address & 0x00FF);
                let offset = self.index(index);
                self.index_address(base, offset);
            }
            MicroOp::IndexZeroPage(index) => {
                self.read(self.last_address, BusFlags::empty());
                self.address = (self.address as u8).wrapping_add(self.index(index)) as u16;
            }
            MicroOp::PointerLo => {
                self.pointer = self.address as u8;
                self.data = self.read(self.pointer as u16, BusFlags::empty());
            }
            MicroOp::PointerHi => {
                let hi = self.read(self.pointer.wrapping_add(1) as u16, BusFlags::empty());
                self.address = (hi as u16) << 8 | self.data as u16;
            }
            MicroOp::PointerHiIndexed => {
                let hi = self.read(self.pointer.wrapping_add(1) as u16, BusFlags::empty());
                let base = (hi as u16) << 8 | self.data as u16;
                let offset = self.regs.y;
                self.index_address(base, offset);
            }
            MicroOp::AbsPointerLo => {
                self.data = self.read(self.address, BusFlags::empty());
            }
            MicroOp::AbsPointerHiJump => {
                let hi = self.read(self.address.wrapping_add(1), BusFlags::empty());
                self.regs.pc = (hi as u16) << 8 | self.data as u16;
            }
            MicroOp::Fixup(when) => {
                if self.fixup_due(when) {
                    self.read(self.last_address, BusFlags::empty());
                }
            }
            MicroOp::Read => {
                let value = self.read(self.address, BusFlags::empty());
                instructions::read(self.operation, &mut self.regs, value);
            }
            MicroOp::Write => {
                let value = instructions::store(self.operation, &self.regs);
                self.write(self.address, value, BusFlags::empty());
            }
            MicroOp::ReadModify => {
                self.data = self.read(self.address, BusFlags::MEMORY_LOCK);
            }
            MicroOp::ModifyDummy => {
                self.read(self.address, BusFlags::MEMORY_LOCK);
            }
            MicroOp::WriteModified => {
                let value = instructions::modify(self.operation, &mut self.regs, self.data);
                self.write(self.address, value, BusFlags::MEMORY_LOCK);
            }
            MicroOp::Implied => {
                self.read(self.regs.pc, BusFlags::empty());
                instructions::implied(self.operation, &mut self.regs);
            }
            MicroOp::Push => {
                let value = instructions::push(self.operation, &self.regs);
                self.push(value);
            }
            MicroOp::Pull => {
                let value = self.pull();
                instructions::pull(self.operation, &mut self.regs, value);
            }
            MicroOp::StackDummy => {
                self.read(self.regs.stack_address(), BusFlags::empty());
            }
            MicroOp::StackDecrement => {
                self.read(self.regs.stack_address(), BusFlags::empty());
                self.regs.s = self.regs.s.wrapping_sub(1);
            }
            MicroOp::PushPch => self.push((self.regs.pc >> 8) as u8),
            MicroOp::PushPcl => self.push(self.regs.pc as u8),
            MicroOp::PushStatus { brk } => self.push(self.regs.p.pushed(brk)),
            MicroOp::PullStatus => {
                let value = self.pull();
                self.regs.set_status(value);
            }
            MicroOp::PullPcl => {
                let lo = self.pull();
                self.regs.pc = (self.regs.pc & 0xFF00) | lo as u16;
            }
            MicroOp::PullPch => {
                let hi = self.pull();
                self.regs.pc = (hi as u16) << 8 | (self.regs.pc & 0x00FF);
                if self.operation == Operation::Rti {
                    self.interrupt_state = InterruptState::Running;
                }
            }
            MicroOp::RtsIncrement => {
                self.read(self.regs.pc, BusFlags::empty());
                self.regs.pc = self.regs.pc.wrapping_add(1);
            }
            MicroOp::JumpHi => {
                let hi = self.read(self.regs.pc, BusFlags::empty());
                self.regs.pc = (hi as u16) << 8 | (self.address & 0x00FF);
            }
            MicroOp::SkipByte => {
                self.read_pc();
            }
            MicroOp::VectorLo => {
                self.regs.set_flag(Status::I, true);
                self.regs.set_flag(Status::D, false);
                self.data = self.read(self.vector, BusFlags::VECTOR_PULL);
            }
            MicroOp::VectorHi => {
                let hi = self.read(self.vector.wrapping_add(1), BusFlags::VECTOR_PULL);
                self.regs.pc = (hi as u16) << 8 | self.data as u16;
                if self.vector == RESET_VECTOR {
                    debug!("reset complete, pc=0x{:04X}", self.regs.pc);
                }
            }
            MicroOp::BranchOffset => {
                self.data = self.read_pc();
                if !self.operation.is_bit_branch() {
                    self.branch_taken = instructions::branch_taken(self.operation, self.regs.p);
                }
            }
            MicroOp::BranchTaken => {
                if self.branch_taken {
                    self.read(self.regs.pc, BusFlags::empty());
                    let target = instructions::branch_target(self.regs.pc, self.data);
                    self.page_crossed = target & 0xFF00 != self.regs.pc & 0xFF00;
                    self.address = target;
                    if !self.page_crossed {
                        self.regs.pc = target;
                    }
                }
            }
            MicroOp::BranchFixup => {
                if self.branch_taken && self.page_crossed {
                    self.read(self.regs.pc, BusFlags::empty());
                    self.regs.pc = self.address;
                }
            }
            MicroOp::BitTest => {
                let value = self.read(self.address, BusFlags::empty());
                self.branch_taken = instructions::bit_branch_taken(self.operation, value);
            }
            MicroOp::Wait => {
                self.read(self.regs.pc, BusFlags::empty());
                self.phase = Phase::Waiting;
            }
            MicroOp::Stop => {
                self.read(self.regs.pc, BusFlags::empty());
                debug!("STP at cycle {}", self.cycles);
                self.phase = Phase::Stopped;
            }
        }
    }

    fn fixup_due(&self, when: When) -> bool {
        match when {
            When::PageCrossed => self.page_crossed,
            When::Always => true,
            When::Decimal => {
                matches!(self.operation, Operation::Adc | Operation::Sbc)
                    && self.regs.flag(Status::D)
            }
        }
    }

    /// Returns true if a conditional micro-op will pass without a bus cycle
    /// in the current state.
    fn skips(&self, op: MicroOp) -> bool {
        match op {
            MicroOp::Fixup(when) => !self.fixup_due(when),
            MicroOp::BranchTaken => !self.branch_taken,
            MicroOp::BranchFixup => !(self.branch_taken && self.page_crossed),
            _ => false,
        }
    }

    fn index(&self, index: Index) -> u8 {
        match index {
            Index::X => self.regs.x,
            Index::Y => self.regs.y,
        }
    }

    fn index_address(&mut self, base: u16, offset: u8) {
        let address = base.wrapping_add(offset as u16);
        self.page_crossed = address & 0xFF00 != base & 0xFF00;
        self.address = address;
    }

    fn irq_line(&self) -> bool {
        self.lines.irq() || self.memory.irq_active()
    }

    fn read_pc(&mut self) -> u8 {
        let value = self.read(self.regs.pc, BusFlags::empty());
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    fn push(&mut self, value: u8) {
        self.write(self.regs.stack_address(), value, BusFlags::empty());
        self.regs.s = self.regs.s.wrapping_sub(1);
    }

    fn pull(&mut self) -> u8 {
        self.regs.s = self.regs.s.wrapping_add(1);
        self.read(self.regs.stack_address(), BusFlags::empty())
    }

    fn read(&mut self, address: u16, flags: BusFlags) -> u8 {
        let data = self.memory.read(address);
        self.emit(address, data, Direction::Read, flags);
        data
    }

    fn write(&mut self, address: u16, value: u8, flags: BusFlags) {
        self.memory.write(address, value);
        self.emit(address, value, Direction::Write, flags);
    }

    fn emit(&mut self, address: u16, data: u8, direction: Direction, flags: BusFlags) {
        self.pending = Some(BusCycle {
            cycle: self.cycles,
            address,
            data,
            direction,
            flags,
        });
        self.cycles += 1;
        self.last_address = address;
    }

    // ========== Interrupt Lines ==========

    /// Drives the NMI input (true = asserted). NMI is taken on the
    /// released-to-asserted edge.
    pub fn set_nmi(&mut self, asserted: bool) {
        self.lines.set_nmi(asserted);
    }

    /// Drives the IRQ input (true = asserted). Devices on the bus can also
    /// hold the line through [`MemoryBus::irq_active`].
    pub fn set_irq(&mut self, asserted: bool) {
        self.lines.set_irq(asserted);
    }

    /// Interrupt handler the CPU is in, if any.
    pub fn interrupt_state(&self) -> InterruptState {
        self.interrupt_state
    }

    // ========== Execution State ==========

    /// Returns true after STP until the next reset.
    pub fn is_stopped(&self) -> bool {
        self.phase == Phase::Stopped
    }

    /// Returns true while WAI is idling.
    pub fn is_waiting(&self) -> bool {
        self.phase == Phase::Waiting
    }

    /// The decode failure the CPU is jammed on, if any.
    pub fn jammed(&self) -> Option<DecodeError> {
        match self.phase {
            Phase::Jammed(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if the next tick fetches an opcode or begins an
    /// interrupt sequence.
    pub fn at_instruction_boundary(&self) -> bool {
        match self.phase {
            Phase::Fetch => true,
            Phase::Execute => self.program[self.step.min(self.program.len())..]
                .iter()
                .all(|&op| self.skips(op)),
            _ => false,
        }
    }

    /// Total cycles executed since creation.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    // ========== Register Access ==========

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn a(&self) -> u8 {
        self.regs.a
    }

    pub fn x(&self) -> u8 {
        self.regs.x
    }

    pub fn y(&self) -> u8 {
        self.regs.y
    }

    pub fn pc(&self) -> u16 {
        self.regs.pc
    }

    pub fn sp(&self) -> u8 {
        self.regs.s
    }

    /// Status register as a byte (bit 5 set, B clear).
    pub fn status(&self) -> u8 {
        self.regs.p.bits()
    }

    pub fn flag(&self, flag: Status) -> bool {
        self.regs.flag(flag)
    }

    pub fn flag_n(&self) -> bool {
        self.regs.flag(Status::N)
    }

    pub fn flag_v(&self) -> bool {
        self.regs.flag(Status::V)
    }

    pub fn flag_d(&self) -> bool {
        self.regs.flag(Status::D)
    }

    pub fn flag_i(&self) -> bool {
        self.regs.flag(Status::I)
    }

    pub fn flag_z(&self) -> bool {
        self.regs.flag(Status::Z)
    }

    pub fn flag_c(&self) -> bool {
        self.regs.flag(Status::C)
    }

    pub fn set_a(&mut self, value: u8) {
        self.regs.a = value;
    }

    pub fn set_x(&mut self, value: u8) {
        self.regs.x = value;
    }

    pub fn set_y(&mut self, value: u8) {
        self.regs.y = value;
    }

    pub fn set_pc(&mut self, value: u16) {
        self.regs.pc = value;
    }

    pub fn set_sp(&mut self, value: u8) {
        self.regs.s = value;
    }

    /// Replaces the status register; bit 5 is forced high and B dropped.
    pub fn set_status(&mut self, value: u8) {
        self.regs.set_status(value);
        self.irq_masked = None;
    }

    pub fn set_flag(&mut self, flag: Status, value: bool) {
        self.regs.set_flag(flag, value);
        self.irq_masked = None;
    }

    // ========== Memory Access ==========

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Consumes the CPU and returns its memory.
    pub fn into_memory(self) -> M {
        self.memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryImage;

    fn reset_cpu(program: &[u8]) -> CPU<MemoryImage> {
        let mut memory = MemoryImage::new();
        memory.load(0xFFFC, &[0x00, 0x80]);
        memory.load(0x8000, program);
        let mut cpu = CPU::new(memory);
        for _ in 0..RESET_CYCLES {
            cpu.tick().unwrap();
        }
        cpu
    }

    #[test]
    fn test_reset_sequence() {
        let mut memory = MemoryImage::new();
        memory.load(0xFFFC, &[0x34, 0x12]);
        let mut cpu = CPU::new(memory);

        let cycles: Vec<BusCycle> = (0..RESET_CYCLES).map(|_| cpu.tick().unwrap()).collect();

        assert!(cycles[0].is_opcode_fetch());
        assert_eq!(cycles[0].address, 0xFFFF);
        assert_eq!(cycles[1].address, 0xFFFF);
        assert_eq!(cycles[2].address, 0x0000);
        assert_eq!(cycles[3].address, 0x0100);
        assert_eq!(cycles[4].address, 0x01FF);
        assert_eq!(cycles[5].address, 0x01FE);
        assert!(cycles.iter().all(|c| !c.is_write()));
        assert_eq!(cycles[6].address, 0xFFFC);
        assert!(cycles[6].flags.contains(BusFlags::VECTOR_PULL));
        assert_eq!(cycles[7].address, 0xFFFD);

        assert_eq!(cpu.pc(), 0x1234);
        assert_eq!(cpu.sp(), 0xFD);
        assert!(cpu.flag_i());
        assert!(!cpu.flag_d());
        assert!(cpu.at_instruction_boundary());
    }

    #[test]
    fn test_cycle_indices_are_consecutive() {
        let mut cpu = reset_cpu(&[0xEA, 0xEA]);
        let first = cpu.tick().unwrap();
        let second = cpu.tick().unwrap();
        assert_eq!(first.cycle, RESET_CYCLES as u64);
        assert_eq!(second.cycle, first.cycle + 1);
        assert_eq!(cpu.cycles(), RESET_CYCLES as u64 + 2);
    }

    #[test]
    fn test_jam_is_sticky_until_reset() {
        let mut cpu = reset_cpu(&[0x03]);
        let err = cpu.tick().unwrap_err();
        assert_eq!(err.opcode, 0x03);
        assert_eq!(err.address, 0x8000);
        assert_eq!(cpu.tick().unwrap_err(), err);
        assert_eq!(cpu.jammed(), Some(err));

        cpu.reset();
        assert!(cpu.jammed().is_none());
        assert!(cpu.tick().is_ok());
    }

    #[test]
    fn test_stp_stops_until_reset() {
        let mut cpu = reset_cpu(&[0xDB]);
        for _ in 0..3 {
            cpu.tick().unwrap();
        }
        assert!(cpu.is_stopped());
        let idle = cpu.tick().unwrap();
        assert!(!idle.is_write());
        assert_eq!(cpu.pc(), 0x8001);
    }

    #[test]
    fn test_rmw_is_locked() {
        // INC $10
        let mut cpu = reset_cpu(&[0xE6, 0x10]);
        cpu.memory_mut().write(0x0010, 0x41);
        let cycles: Vec<BusCycle> = (0..5).map(|_| cpu.tick().unwrap()).collect();

        assert!(!cycles[1].flags.contains(BusFlags::MEMORY_LOCK));
        for cycle in &cycles[2..5] {
            assert_eq!(cycle.address, 0x0010);
            assert!(cycle.flags.contains(BusFlags::MEMORY_LOCK));
        }
        assert!(!cycles[3].is_write());
        assert!(cycles[4].is_write());
        assert_eq!(cycles[4].data, 0x42);
    }
}
