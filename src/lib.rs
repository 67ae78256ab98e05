//! # 65C02 Conformance Model
//!
//! A cycle-accurate W65C02S model and a harness that checks it, clock by
//! clock, against bus traces recorded from a real chip on the ChipLab rig.
//!
//! The engine produces one [`BusCycle`] per [`CPU::tick`]: address, data,
//! direction and the SYNC/VPB/MLB pins. Traces are Ed25519-signed text files;
//! [`TraceVerifier`] authenticates them and [`Comparator`] replays them.
//!
//! ## Quick Start
//!
//! ```rust
//! use chiplab65::{MemoryBus, MemoryImage, CPU, RESET_CYCLES};
//!
//! let mut memory = MemoryImage::new();
//! memory.write(0xFFFC, 0x00); // Low byte
//! memory.write(0xFFFD, 0x80); // High byte
//!
//! let mut cpu = CPU::new(memory);
//! for _ in 0..RESET_CYCLES {
//!     cpu.tick().unwrap();
//! }
//!
//! assert_eq!(cpu.pc(), 0x8000);
//! assert_eq!(cpu.sp(), 0xFD);
//! assert_eq!(cpu.flag_i(), true);
//! ```
//!
//! ## Modules
//!
//! - `cpu` - engine state and the per-cycle scheduler
//! - `microcode` - micro-op programs, one per (operation, addressing mode)
//! - `opcodes` - the 256-entry decode table and capability set
//! - `memory` - `MemoryBus` trait and the mapped `MemoryImage`
//! - `bus` - bus cycle records and status pins
//! - `interrupts` - NMI/IRQ lines and vectors
//! - `trace` - signed trace parsing and verification
//! - `conformance` - model-versus-trace comparison and batch runs

pub mod addressing;
pub mod bus;
pub mod conformance;
pub mod cpu;
pub mod interrupts;
pub mod memory;
pub mod microcode;
pub mod opcodes;
pub mod registers;
pub mod trace;

// Internal instruction implementations (not part of public API)
mod instructions;

use thiserror::Error;

// Re-export public API
pub use addressing::AddressingMode;
pub use bus::{BusCycle, BusFlags, Direction};
pub use conformance::{
    run_directory, run_trace_file, BatchSummary, Comparator, ComparatorConfig, ConformanceError,
    ConformanceVerdict, Divergence, DivergenceKind, Field, SetupError, TraceOutcome,
};
pub use cpu::{CPU, RESET_CYCLES};
pub use interrupts::InterruptState;
pub use memory::{
    ImageAccess, MapError, MemoryBus, MemoryConfig, MemoryImage, MemoryPolicyEvent, OpenBus,
    PolicyStats, RegionKind, RomWritePolicy,
};
pub use microcode::MicroOp;
pub use opcodes::{
    capabilities, decode, implemented_opcodes, Capabilities, OpcodeDescriptor, OpcodeStatus,
    Operation, DECODE_TABLE,
};
pub use registers::{Registers, Status};
pub use trace::{image_checksum, SignedTrace, TraceRecord, TraceVerifier, VerificationError};

/// The engine fetched an opcode it has no micro-op program for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("opcode 0x{opcode:02X} at 0x{address:04X} has no micro-op program ({status})")]
pub struct DecodeError {
    pub opcode: u8,
    pub address: u16,
    pub status: OpcodeStatus,
}
