//! # 65C02 Instruction Operations
//!
//! The register-level effect of every instruction, organized by category.
//! Each function works on [`Registers`] and the byte a micro-op latched;
//! bus traffic and timing belong to the micro-op programs.
//!
//! ## Categories
//!
//! - **alu**: ADC, SBC, AND, ORA, EOR, CMP, CPX, CPY, BIT
//! - **bits**: TSB, TRB, RMBn, SMBn, BBRn, BBSn
//! - **branches**: conditional branch tests
//! - **flags**: CLC, SEC, CLI, SEI, CLD, SED, CLV
//! - **inc_dec**: INC, DEC, INX, INY, DEX, DEY
//! - **load_store**: LDA, LDX, LDY, STA, STX, STY, STZ
//! - **shifts**: ASL, LSR, ROL, ROR
//! - **stack**: PHA, PHP, PHX, PHY, PLA, PLP, PLX, PLY
//! - **transfer**: TAX, TAY, TXA, TYA, TSX, TXS

pub(crate) mod alu;
pub(crate) mod bits;
pub(crate) mod branches;
pub(crate) mod flags;
pub(crate) mod inc_dec;
pub(crate) mod load_store;
pub(crate) mod shifts;
pub(crate) mod stack;
pub(crate) mod transfer;

use crate::opcodes::Operation;
use crate::registers::{Registers, Status};

/// Applies a read-class operation to an operand fetched from memory.
pub(crate) fn read(operation: Operation, regs: &mut Registers, value: u8) {
    match operation {
        Operation::Lda => load_store::lda(regs, value),
        Operation::Ldx => load_store::ldx(regs, value),
        Operation::Ldy => load_store::ldy(regs, value),
        Operation::Adc => alu::adc(regs, value),
        Operation::Sbc => alu::sbc(regs, value),
        Operation::And => alu::and(regs, value),
        Operation::Ora => alu::ora(regs, value),
        Operation::Eor => alu::eor(regs, value),
        Operation::Cmp => {
            let a = regs.a;
            alu::compare(regs, a, value);
        }
        Operation::Cpx => {
            let x = regs.x;
            alu::compare(regs, x, value);
        }
        Operation::Cpy => {
            let y = regs.y;
            alu::compare(regs, y, value);
        }
        Operation::Bit => alu::bit(regs, value),
        _ => {}
    }
}

/// Applies a read-class operation to an immediate operand.
pub(crate) fn read_immediate(operation: Operation, regs: &mut Registers, value: u8) {
    match operation {
        Operation::Bit => alu::bit_immediate(regs, value),
        _ => read(operation, regs, value),
    }
}

/// Byte driven onto the bus by a store.
pub(crate) fn store(operation: Operation, regs: &Registers) -> u8 {
    load_store::store_value(operation, regs)
}

/// Computes the value a read-modify-write instruction writes back.
pub(crate) fn modify(operation: Operation, regs: &mut Registers, value: u8) -> u8 {
    match operation {
        Operation::Asl => shifts::asl(regs, value),
        Operation::Lsr => shifts::lsr(regs, value),
        Operation::Rol => shifts::rol(regs, value),
        Operation::Ror => shifts::ror(regs, value),
        Operation::Inc => inc_dec::inc(regs, value),
        Operation::Dec => inc_dec::dec(regs, value),
        Operation::Tsb => bits::tsb(regs, value),
        Operation::Trb => bits::trb(regs, value),
        Operation::Rmb(bit) => bits::rmb(bit, value),
        Operation::Smb(bit) => bits::smb(bit, value),
        _ => value,
    }
}

/// Executes a single-byte register instruction, including accumulator-mode
/// shifts and INC A / DEC A.
pub(crate) fn implied(operation: Operation, regs: &mut Registers) {
    match operation {
        Operation::Tax => transfer::tax(regs),
        Operation::Tay => transfer::tay(regs),
        Operation::Txa => transfer::txa(regs),
        Operation::Tya => transfer::tya(regs),
        Operation::Tsx => transfer::tsx(regs),
        Operation::Txs => transfer::txs(regs),
        Operation::Inx => inc_dec::inx(regs),
        Operation::Iny => inc_dec::iny(regs),
        Operation::Dex => inc_dec::dex(regs),
        Operation::Dey => inc_dec::dey(regs),
        Operation::Asl
        | Operation::Lsr
        | Operation::Rol
        | Operation::Ror
        | Operation::Inc
        | Operation::Dec => {
            let a = regs.a;
            regs.a = modify(operation, regs, a);
        }
        Operation::Nop => {}
        other => flags::apply(other, regs),
    }
}

/// Byte written by a push instruction.
pub(crate) fn push(operation: Operation, regs: &Registers) -> u8 {
    stack::pushed_value(operation, regs)
}

/// Stores a byte pulled by a pull instruction.
pub(crate) fn pull(operation: Operation, regs: &mut Registers, value: u8) {
    stack::pull(operation, regs, value)
}

/// Whether a relative branch is taken.
pub(crate) fn branch_taken(operation: Operation, p: Status) -> bool {
    branches::taken(operation, p)
}

/// Whether BBRn/BBSn branches for the tested zero page byte.
pub(crate) fn bit_branch_taken(operation: Operation, value: u8) -> bool {
    match operation {
        Operation::Bbr(bit) => bits::bit_branch_taken(bit, false, value),
        Operation::Bbs(bit) => bits::bit_branch_taken(bit, true, value),
        _ => false,
    }
}

/// Signed branch target relative to the address after the branch.
pub(crate) fn branch_target(pc: u16, offset: u8) -> u16 {
    branches::target(pc, offset)
}
