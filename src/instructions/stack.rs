//! # Stack Operations
//!
//! This module implements the register side of stack instructions:
//! - PHA, PHX, PHY, PHP: the byte pushed
//! - PLA, PLX, PLY, PLP: where a pulled byte goes
//!
//! The stack lives at 0x0100-0x01FF and grows downward; the micro-op
//! programs move S and drive the bus.

use crate::opcodes::Operation;
use crate::registers::Registers;

/// Byte a push instruction writes to the stack.
///
/// PHP pushes the status with B and bit 5 set.
pub(crate) fn pushed_value(operation: Operation, regs: &Registers) -> u8 {
    match operation {
        Operation::Php => regs.p.pushed(true),
        Operation::Phx => regs.x,
        Operation::Phy => regs.y,
        _ => regs.a,
    }
}

/// Stores a pulled byte. PLP drops B; the others set Z and N.
pub(crate) fn pull(operation: Operation, regs: &mut Registers, value: u8) {
    match operation {
        Operation::Plp => regs.set_status(value),
        Operation::Plx => {
            regs.x = value;
            regs.set_nz(value);
        }
        Operation::Ply => {
            regs.y = value;
            regs.set_nz(value);
        }
        _ => {
            regs.a = value;
            regs.set_nz(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::Status;

    #[test]
    fn test_php_sets_break_bit() {
        let mut regs = Registers::power_on();
        regs.p = Status::UNUSED;
        assert_eq!(pushed_value(Operation::Php, &regs), 0x30);
    }

    #[test]
    fn test_plp_ignores_break_bit() {
        let mut regs = Registers::power_on();
        pull(Operation::Plp, &mut regs, 0xFF);
        assert_eq!(regs.p.bits(), 0xEF);
    }
}
