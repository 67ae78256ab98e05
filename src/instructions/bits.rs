//! # Bit Manipulation Instructions
//!
//! The 65C02 additions that operate on single bits of a memory byte:
//! - TSB / TRB: Test and Set / Reset Bits against the accumulator
//! - RMBn / SMBn: Reset / Set bit n of a zero page byte
//! - BBRn / BBSn: branch on bit n of a zero page byte

use crate::registers::{Registers, Status};

/// Z from `A & value`, then returns `value | A`.
pub(crate) fn tsb(regs: &mut Registers, value: u8) -> u8 {
    regs.set_flag(Status::Z, regs.a & value == 0);
    value | regs.a
}

/// Z from `A & value`, then returns `value & !A`.
pub(crate) fn trb(regs: &mut Registers, value: u8) -> u8 {
    regs.set_flag(Status::Z, regs.a & value == 0);
    value & !regs.a
}

pub(crate) fn rmb(bit: u8, value: u8) -> u8 {
    value & !(1 << (bit & 7))
}

pub(crate) fn smb(bit: u8, value: u8) -> u8 {
    value | (1 << (bit & 7))
}

/// Whether BBRn (`branch_if_set = false`) or BBSn branches for `value`.
pub(crate) fn bit_branch_taken(bit: u8, branch_if_set: bool, value: u8) -> bool {
    (value & (1 << (bit & 7)) != 0) == branch_if_set
}
