//! # ALU (Arithmetic Logic Unit) Instructions
//!
//! This module implements arithmetic and logical operations:
//! - ADC: Add with Carry (binary and decimal)
//! - SBC: Subtract with Borrow (binary and decimal)
//! - AND, ORA, EOR: Logical operations
//! - CMP, CPX, CPY: Comparisons
//! - BIT: Bit test
//!
//! Decimal mode follows the 65C02: N and Z reflect the corrected BCD result,
//! and V is computed the same way as on the NMOS part.

use crate::registers::{Registers, Status};

/// Executes ADC against the accumulator.
///
/// Updates N, V, Z and C. In decimal mode the result is BCD-adjusted.
pub(crate) fn adc(regs: &mut Registers, value: u8) {
    let carry_in = regs.flag(Status::C) as u8;
    if regs.flag(Status::D) {
        adc_decimal(regs, value, carry_in);
        return;
    }

    let a = regs.a;
    let result16 = a as u16 + value as u16 + carry_in as u16;
    let result = result16 as u8;

    regs.set_flag(Status::C, result16 > 0xFF);
    // Overflow when both operands share a sign the result does not have
    regs.set_flag(Status::V, (a ^ result) & (value ^ result) & 0x80 != 0);
    regs.set_nz(result);
    regs.a = result;
}

fn adc_decimal(regs: &mut Registers, value: u8, carry_in: u8) {
    let a = regs.a;

    let mut lo = (a & 0x0F) + (value & 0x0F) + carry_in;
    if lo >= 0x0A {
        lo = ((lo + 0x06) & 0x0F) + 0x10;
    }

    let mut sum = (a & 0xF0) as u16 + (value & 0xF0) as u16 + lo as u16;
    let signed = (a & 0xF0) as i8 as i16 + (value & 0xF0) as i8 as i16 + lo as i16;
    if sum >= 0xA0 {
        sum += 0x60;
    }

    let result = sum as u8;
    regs.set_flag(Status::C, sum >= 0x100);
    regs.set_flag(Status::V, !(-128..=127).contains(&signed));
    regs.set_nz(result);
    regs.a = result;
}

/// Executes SBC against the accumulator.
///
/// Updates N, V, Z and C. C is the inverted borrow.
pub(crate) fn sbc(regs: &mut Registers, value: u8) {
    if !regs.flag(Status::D) {
        adc(regs, !value);
        return;
    }

    let a = regs.a;
    let borrow = 1 - regs.flag(Status::C) as i16;

    // C and V come out of the binary subtraction
    let binary = a as i16 - value as i16 - borrow;
    let overflow = (a ^ value) & (a ^ binary as u8) & 0x80 != 0;

    let lo = (a & 0x0F) as i16 - (value & 0x0F) as i16 - borrow;
    let mut result = binary;
    if result < 0 {
        result -= 0x60;
    }
    if lo < 0 {
        result -= 0x06;
    }

    let result = result as u8;
    regs.set_flag(Status::C, binary >= 0);
    regs.set_flag(Status::V, overflow);
    regs.set_nz(result);
    regs.a = result;
}

pub(crate) fn and(regs: &mut Registers, value: u8) {
    regs.a &= value;
    regs.set_nz(regs.a);
}

pub(crate) fn ora(regs: &mut Registers, value: u8) {
    regs.a |= value;
    regs.set_nz(regs.a);
}

pub(crate) fn eor(regs: &mut Registers, value: u8) {
    regs.a ^= value;
    regs.set_nz(regs.a);
}

/// Compares `register` with `value` as CMP/CPX/CPY do.
///
/// C is set when `register >= value`; N and Z come from the difference.
pub(crate) fn compare(regs: &mut Registers, register: u8, value: u8) {
    regs.set_flag(Status::C, register >= value);
    regs.set_nz(register.wrapping_sub(value));
}

/// Executes BIT in a memory addressing mode: Z from `A & value`, N and V
/// copied from bits 7 and 6 of the operand.
pub(crate) fn bit(regs: &mut Registers, value: u8) {
    regs.set_flag(Status::Z, regs.a & value == 0);
    regs.set_flag(Status::N, value & 0x80 != 0);
    regs.set_flag(Status::V, value & 0x40 != 0);
}

/// BIT #imm only touches Z.
pub(crate) fn bit_immediate(regs: &mut Registers, value: u8) {
    regs.set_flag(Status::Z, regs.a & value == 0);
}
