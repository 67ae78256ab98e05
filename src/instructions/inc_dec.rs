//! # Increment and Decrement Instructions
//!
//! INC/DEC on memory or the accumulator and INX/INY/DEX/DEY. All wrap at
//! 8 bits and update only Z and N.

use crate::registers::Registers;

pub(crate) fn inc(regs: &mut Registers, value: u8) -> u8 {
    let result = value.wrapping_add(1);
    regs.set_nz(result);
    result
}

pub(crate) fn dec(regs: &mut Registers, value: u8) -> u8 {
    let result = value.wrapping_sub(1);
    regs.set_nz(result);
    result
}

pub(crate) fn inx(regs: &mut Registers) {
    let value = regs.x;
    regs.x = inc(regs, value);
}

pub(crate) fn iny(regs: &mut Registers) {
    let value = regs.y;
    regs.y = inc(regs, value);
}

pub(crate) fn dex(regs: &mut Registers) {
    let value = regs.x;
    regs.x = dec(regs, value);
}

pub(crate) fn dey(regs: &mut Registers) {
    let value = regs.y;
    regs.y = dec(regs, value);
}
