//! # Status Flag Instructions
//!
//! CLC, SEC, CLI, SEI, CLD, SED and CLV each set or clear one flag.

use crate::opcodes::Operation;
use crate::registers::{Registers, Status};

/// The flag an instruction targets and the value it writes.
fn target(operation: Operation) -> Option<(Status, bool)> {
    match operation {
        Operation::Clc => Some((Status::C, false)),
        Operation::Sec => Some((Status::C, true)),
        Operation::Cli => Some((Status::I, false)),
        Operation::Sei => Some((Status::I, true)),
        Operation::Cld => Some((Status::D, false)),
        Operation::Sed => Some((Status::D, true)),
        Operation::Clv => Some((Status::V, false)),
        _ => None,
    }
}

pub(crate) fn apply(operation: Operation, regs: &mut Registers) {
    if let Some((flag, value)) = target(operation) {
        regs.set_flag(flag, value);
    }
}
