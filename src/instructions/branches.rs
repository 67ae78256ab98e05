//! # Branch Conditions
//!
//! Conditional branches test a single status flag. The branch timing (extra
//! cycle when taken, another when the target is on a different page) lives in
//! the micro-op programs; this module only answers "taken or not".

use crate::opcodes::Operation;
use crate::registers::Status;

/// Returns true if the relative branch `operation` is taken with status `p`.
pub(crate) fn taken(operation: Operation, p: Status) -> bool {
    match operation {
        Operation::Bpl => !p.contains(Status::N),
        Operation::Bmi => p.contains(Status::N),
        Operation::Bvc => !p.contains(Status::V),
        Operation::Bvs => p.contains(Status::V),
        Operation::Bcc => !p.contains(Status::C),
        Operation::Bcs => p.contains(Status::C),
        Operation::Bne => !p.contains(Status::Z),
        Operation::Beq => p.contains(Status::Z),
        Operation::Bra => true,
        _ => false,
    }
}

/// Applies a signed branch offset to the address following the branch.
pub(crate) fn target(pc: u16, offset: u8) -> u16 {
    pc.wrapping_add(offset as i8 as u16)
}
