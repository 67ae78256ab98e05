//! # Shift and Rotate Instructions
//!
//! This module implements bit shift and rotate operations:
//! - ASL: Arithmetic Shift Left
//! - LSR: Logical Shift Right
//! - ROL: Rotate Left through carry
//! - ROR: Rotate Right through carry
//!
//! Each function takes the operand (accumulator or memory byte), updates
//! C, Z and N, and returns the shifted value for the caller to store.

use crate::registers::{Registers, Status};

/// Shifts left; bit 7 goes to C and bit 0 becomes 0.
pub(crate) fn asl(regs: &mut Registers, value: u8) -> u8 {
    regs.set_flag(Status::C, value & 0x80 != 0);
    let result = value << 1;
    regs.set_nz(result);
    result
}

/// Shifts right; bit 0 goes to C and bit 7 becomes 0, so N always clears.
pub(crate) fn lsr(regs: &mut Registers, value: u8) -> u8 {
    regs.set_flag(Status::C, value & 0x01 != 0);
    let result = value >> 1;
    regs.set_nz(result);
    result
}

pub(crate) fn rol(regs: &mut Registers, value: u8) -> u8 {
    let carry_in = regs.flag(Status::C) as u8;
    regs.set_flag(Status::C, value & 0x80 != 0);
    let result = (value << 1) | carry_in;
    regs.set_nz(result);
    result
}

pub(crate) fn ror(regs: &mut Registers, value: u8) -> u8 {
    let carry_in = (regs.flag(Status::C) as u8) << 7;
    regs.set_flag(Status::C, value & 0x01 != 0);
    let result = (value >> 1) | carry_in;
    regs.set_nz(result);
    result
}
