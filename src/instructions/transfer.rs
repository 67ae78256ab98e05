//! # Register Transfer Instructions
//!
//! This module implements register transfer operations:
//! - TAX, TAY, TXA, TYA: copy between A and the index registers
//! - TSX: Transfer Stack Pointer to X
//! - TXS: Transfer X to Stack Pointer
//!
//! Every transfer except TXS sets Z and N from the copied value.

use crate::registers::Registers;

pub(crate) fn tax(regs: &mut Registers) {
    regs.x = regs.a;
    regs.set_nz(regs.x);
}

pub(crate) fn tay(regs: &mut Registers) {
    regs.y = regs.a;
    regs.set_nz(regs.y);
}

pub(crate) fn txa(regs: &mut Registers) {
    regs.a = regs.x;
    regs.set_nz(regs.a);
}

pub(crate) fn tya(regs: &mut Registers) {
    regs.a = regs.y;
    regs.set_nz(regs.a);
}

pub(crate) fn tsx(regs: &mut Registers) {
    regs.x = regs.s;
    regs.set_nz(regs.x);
}

/// TXS does not affect flags.
pub(crate) fn txs(regs: &mut Registers) {
    regs.s = regs.x;
}
