//! # Load and Store Instructions
//!
//! This module implements:
//! - LDA, LDX, LDY: load a register and set Z/N
//! - STA, STX, STY, STZ: choose the byte a store drives onto the bus
//!
//! Stores never touch flags.

use crate::opcodes::Operation;
use crate::registers::Registers;

pub(crate) fn lda(regs: &mut Registers, value: u8) {
    regs.a = value;
    regs.set_nz(value);
}

pub(crate) fn ldx(regs: &mut Registers, value: u8) {
    regs.x = value;
    regs.set_nz(value);
}

pub(crate) fn ldy(regs: &mut Registers, value: u8) {
    regs.y = value;
    regs.set_nz(value);
}

/// Byte written by a store instruction.
pub(crate) fn store_value(operation: Operation, regs: &Registers) -> u8 {
    match operation {
        Operation::Sta => regs.a,
        Operation::Stx => regs.x,
        Operation::Sty => regs.y,
        _ => 0x00,
    }
}
