//! # Micro-Op Programs
//!
//! Every instruction is a fixed program of single-cycle micro-ops that runs
//! after the opcode fetch. The program is chosen from a small set of
//! templates keyed by addressing mode and access kind; the instruction's own
//! operation (load, store, shift, ...) is applied by the template's access
//! cycle, so the same template serves every instruction with that shape.
//!
//! Each micro-op performs exactly one bus cycle, except the conditional ones
//! (`Fixup`, `BranchTaken`, `BranchFixup`) which are skipped without using a
//! cycle when their condition is false.

use crate::addressing::AddressingMode;
use crate::opcodes::{Operation, OperationKind};

/// Index register used by an indexed micro-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Index {
    X,
    Y,
}

/// Condition under which a `Fixup` cycle is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum When {
    /// Only when indexing carried into the high address byte.
    PageCrossed,
    /// Unconditionally (stores and slow read-modify-write forms).
    Always,
    /// Only for ADC/SBC executed with the D flag set.
    Decimal,
}

/// One clock cycle of an instruction, interrupt or reset sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MicroOp {
    /// Opcode-address read with SYNC high that does not advance PC.
    SpuriousFetch,
    /// Read the byte at PC without advancing it.
    OperandDummy,
    /// Read the operand at PC, advance PC, apply the operation.
    ReadImmediate,
    /// Read a zero page address from PC.
    OperandZp,
    /// Read the low address byte from PC.
    OperandLo,
    /// Read the high address byte from PC.
    OperandHi,
    /// Read the high address byte from PC and add an index register.
    OperandHiIndexed(Index),
    /// Re-read the previous address while adding an index within zero page.
    IndexZeroPage(Index),
    /// Read the low byte of a zero page pointer.
    PointerLo,
    /// Read the high byte of a zero page pointer.
    PointerHi,
    /// Read the high byte of a zero page pointer and add Y.
    PointerHiIndexed,
    /// Read the low byte of an absolute pointer (JMP indirect forms).
    AbsPointerLo,
    /// Read the high byte of an absolute pointer and jump.
    AbsPointerHiJump,
    /// Re-read the previous bus address when the condition holds.
    Fixup(When),
    /// Read the effective address and apply the operation.
    Read,
    /// Write the operation's value to the effective address.
    Write,
    /// Read the effective address at the start of a locked sequence.
    ReadModify,
    /// Re-read the effective address while the ALU works.
    ModifyDummy,
    /// Write the modified value back.
    WriteModified,
    /// Two-cycle register operation; reads PC as a dummy.
    Implied,
    /// Write the operation's value to the stack.
    Push,
    /// Pull a byte from the stack into the operation.
    Pull,
    /// Read the current stack slot without moving S.
    StackDummy,
    /// Read the current stack slot and decrement S (reset only).
    StackDecrement,
    PushPch,
    PushPcl,
    /// Push the status register; `brk` selects the B bit in the pushed copy.
    PushStatus { brk: bool },
    PullStatus,
    PullPcl,
    PullPch,
    /// Read the pulled return address and step past it (RTS).
    RtsIncrement,
    /// Read the high address byte from PC and jump (JMP abs, JSR).
    JumpHi,
    /// Read the byte at PC and step past it (BRK signature byte, reset).
    SkipByte,
    /// Read the low vector byte; sets I and clears D.
    VectorLo,
    /// Read the high vector byte and jump.
    VectorHi,
    /// Read the branch offset and evaluate the condition.
    BranchOffset,
    /// Dummy read while adding the offset (taken branches).
    BranchTaken,
    /// Dummy read while fixing the high PC byte (taken, page crossed).
    BranchFixup,
    /// Read the zero page byte a BBRn/BBSn instruction tests.
    BitTest,
    /// Enter the WAI low-power state.
    Wait,
    /// Enter the STP stopped state.
    Stop,
}

use Index::{X, Y};
use MicroOp::*;

const READ_IMMEDIATE: &[MicroOp] = &[ReadImmediate, Fixup(When::Decimal)];
const READ_ZP: &[MicroOp] = &[OperandZp, Read, Fixup(When::Decimal)];
const READ_ZPX: &[MicroOp] = &[OperandZp, IndexZeroPage(X), Read, Fixup(When::Decimal)];
const READ_ZPY: &[MicroOp] = &[OperandZp, IndexZeroPage(Y), Read, Fixup(When::Decimal)];
const READ_ABS: &[MicroOp] = &[OperandLo, OperandHi, Read, Fixup(When::Decimal)];
const READ_ABSX: &[MicroOp] = &[
    OperandLo,
    OperandHiIndexed(X),
    Fixup(When::PageCrossed),
    Read,
    Fixup(When::Decimal),
];
const READ_ABSY: &[MicroOp] = &[
    OperandLo,
    OperandHiIndexed(Y),
    Fixup(When::PageCrossed),
    Read,
    Fixup(When::Decimal),
];
const READ_INDX: &[MicroOp] = &[
    OperandZp,
    IndexZeroPage(X),
    PointerLo,
    PointerHi,
    Read,
    Fixup(When::Decimal),
];
const READ_INDY: &[MicroOp] = &[
    OperandZp,
    PointerLo,
    PointerHiIndexed,
    Fixup(When::PageCrossed),
    Read,
    Fixup(When::Decimal),
];
const READ_ZPI: &[MicroOp] = &[OperandZp, PointerLo, PointerHi, Read, Fixup(When::Decimal)];

const WRITE_ZP: &[MicroOp] = &[OperandZp, Write];
const WRITE_ZPX: &[MicroOp] = &[OperandZp, IndexZeroPage(X), Write];
const WRITE_ZPY: &[MicroOp] = &[OperandZp, IndexZeroPage(Y), Write];
const WRITE_ABS: &[MicroOp] = &[OperandLo, OperandHi, Write];
const WRITE_ABSX: &[MicroOp] = &[OperandLo, OperandHiIndexed(X), Fixup(When::Always), Write];
const WRITE_ABSY: &[MicroOp] = &[OperandLo, OperandHiIndexed(Y), Fixup(When::Always), Write];
const WRITE_INDX: &[MicroOp] = &[OperandZp, IndexZeroPage(X), PointerLo, PointerHi, Write];
const WRITE_INDY: &[MicroOp] = &[
    OperandZp,
    PointerLo,
    PointerHiIndexed,
    Fixup(When::Always),
    Write,
];
const WRITE_ZPI: &[MicroOp] = &[OperandZp, PointerLo, PointerHi, Write];

const MODIFY_ZP: &[MicroOp] = &[OperandZp, ReadModify, ModifyDummy, WriteModified];
const MODIFY_ZPX: &[MicroOp] = &[
    OperandZp,
    IndexZeroPage(X),
    ReadModify,
    ModifyDummy,
    WriteModified,
];
const MODIFY_ABS: &[MicroOp] = &[OperandLo, OperandHi, ReadModify, ModifyDummy, WriteModified];
const MODIFY_ABSX: &[MicroOp] = &[
    OperandLo,
    OperandHiIndexed(X),
    Fixup(When::PageCrossed),
    ReadModify,
    ModifyDummy,
    WriteModified,
];
const MODIFY_ABSX_SLOW: &[MicroOp] = &[
    OperandLo,
    OperandHiIndexed(X),
    Fixup(When::Always),
    ReadModify,
    ModifyDummy,
    WriteModified,
];

const IMPLIED: &[MicroOp] = &[Implied];
const PUSH: &[MicroOp] = &[OperandDummy, Push];
const PULL: &[MicroOp] = &[OperandDummy, StackDummy, Pull];

const JMP_ABS: &[MicroOp] = &[OperandLo, JumpHi];
const JMP_IND: &[MicroOp] = &[
    OperandLo,
    OperandHi,
    Fixup(When::Always),
    AbsPointerLo,
    AbsPointerHiJump,
];
const JMP_ABSX_IND: &[MicroOp] = &[
    OperandLo,
    OperandHiIndexed(X),
    Fixup(When::Always),
    AbsPointerLo,
    AbsPointerHiJump,
];
const JSR: &[MicroOp] = &[OperandLo, StackDummy, PushPch, PushPcl, JumpHi];
const RTS: &[MicroOp] = &[OperandDummy, StackDummy, PullPcl, PullPch, RtsIncrement];
const RTI: &[MicroOp] = &[OperandDummy, StackDummy, PullStatus, PullPcl, PullPch];
const BRK: &[MicroOp] = &[
    SkipByte,
    PushPch,
    PushPcl,
    PushStatus { brk: true },
    VectorLo,
    VectorHi,
];

const BRANCH: &[MicroOp] = &[BranchOffset, BranchTaken, BranchFixup];
const BIT_BRANCH: &[MicroOp] = &[
    OperandZp,
    BitTest,
    Fixup(When::Always),
    BranchOffset,
    BranchTaken,
    BranchFixup,
];

const WAI: &[MicroOp] = &[OperandDummy, Wait];
const STP: &[MicroOp] = &[OperandDummy, Stop];

/// Hardware interrupt entry (NMI and IRQ), including the suppressed fetch.
pub const INTERRUPT_SEQUENCE: &[MicroOp] = &[
    SpuriousFetch,
    OperandDummy,
    PushPch,
    PushPcl,
    PushStatus { brk: false },
    VectorLo,
    VectorHi,
];

/// Reset sequence: two reads past the interrupted opcode, then the stack
/// pushes turned into reads.
pub const RESET_SEQUENCE: &[MicroOp] = &[
    SpuriousFetch,
    SkipByte,
    OperandDummy,
    StackDecrement,
    StackDecrement,
    StackDecrement,
    VectorLo,
    VectorHi,
];

/// Selects the micro-op program for an operation in an addressing mode.
///
/// Returns `None` for combinations the 65C02 does not implement, which is
/// how reserved opcodes end up without a program.
pub const fn program_for(operation: Operation, mode: AddressingMode) -> Option<&'static [MicroOp]> {
    use AddressingMode as Mode;

    let program: &'static [MicroOp] = match (operation.kind(), mode) {
        (OperationKind::Read, Mode::Immediate) => READ_IMMEDIATE,
        (OperationKind::Read, Mode::ZeroPage) => READ_ZP,
        (OperationKind::Read, Mode::ZeroPageX) => READ_ZPX,
        (OperationKind::Read, Mode::ZeroPageY) => READ_ZPY,
        (OperationKind::Read, Mode::Absolute) => READ_ABS,
        (OperationKind::Read, Mode::AbsoluteX) => READ_ABSX,
        (OperationKind::Read, Mode::AbsoluteY) => READ_ABSY,
        (OperationKind::Read, Mode::IndirectX) => READ_INDX,
        (OperationKind::Read, Mode::IndirectY) => READ_INDY,
        (OperationKind::Read, Mode::ZeroPageIndirect) => READ_ZPI,

        (OperationKind::Write, Mode::ZeroPage) => WRITE_ZP,
        (OperationKind::Write, Mode::ZeroPageX) => WRITE_ZPX,
        (OperationKind::Write, Mode::ZeroPageY) => WRITE_ZPY,
        (OperationKind::Write, Mode::Absolute) => WRITE_ABS,
        (OperationKind::Write, Mode::AbsoluteX) => WRITE_ABSX,
        (OperationKind::Write, Mode::AbsoluteY) => WRITE_ABSY,
        (OperationKind::Write, Mode::IndirectX) => WRITE_INDX,
        (OperationKind::Write, Mode::IndirectY) => WRITE_INDY,
        (OperationKind::Write, Mode::ZeroPageIndirect) => WRITE_ZPI,

        (OperationKind::Modify, Mode::Accumulator) => IMPLIED,
        (OperationKind::Modify, Mode::ZeroPage) => MODIFY_ZP,
        (OperationKind::Modify, Mode::ZeroPageX) => MODIFY_ZPX,
        (OperationKind::Modify, Mode::Absolute) => MODIFY_ABS,
        (OperationKind::Modify, Mode::AbsoluteX) => {
            // INC/DEC always spend the index fix-up cycle; shifts only on a carry.
            if matches!(operation, Operation::Inc | Operation::Dec) {
                MODIFY_ABSX_SLOW
            } else {
                MODIFY_ABSX
            }
        }

        (OperationKind::Implied, Mode::Implied) => IMPLIED,
        (OperationKind::Push, Mode::Implied) => PUSH,
        (OperationKind::Pull, Mode::Implied) => PULL,
        (OperationKind::Branch, Mode::Relative) => BRANCH,
        (OperationKind::BitBranch, Mode::ZeroPageRelative) => BIT_BRANCH,

        (OperationKind::Jump, Mode::Absolute) => JMP_ABS,
        (OperationKind::Jump, Mode::Indirect) => JMP_IND,
        (OperationKind::Jump, Mode::AbsoluteIndexedIndirect) => JMP_ABSX_IND,
        (OperationKind::Subroutine, Mode::Absolute) => JSR,
        (OperationKind::ReturnFromSubroutine, Mode::Implied) => RTS,
        (OperationKind::ReturnFromInterrupt, Mode::Implied) => RTI,
        (OperationKind::Break, Mode::Implied) => BRK,
        (OperationKind::Wait, Mode::Implied) => WAI,
        (OperationKind::Stop, Mode::Implied) => STP,

        _ => return None,
    };
    Some(program)
}

impl MicroOp {
    /// Returns true if the micro-op may be skipped without a bus cycle.
    pub const fn is_conditional(self) -> bool {
        matches!(
            self,
            Fixup(When::PageCrossed) | Fixup(When::Decimal) | BranchTaken | BranchFixup
        )
    }
}

/// Number of cycles an instruction takes when no conditional micro-op fires,
/// counting the opcode fetch.
pub fn minimum_cycles(program: &[MicroOp]) -> usize {
    1 + program.iter().filter(|op| !op.is_conditional()).count()
}
