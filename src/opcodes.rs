//! # Opcode Decode Table
//!
//! This module contains the 256-entry decode table that serves as the single
//! source of truth for all 65C02 instruction information.
//!
//! The table covers:
//! - **212 documented instructions** - the full W65C02S set, each with a
//!   micro-op program
//! - **44 reserved opcodes** - the x2/x3/xB NOP family plus $44, $54, $D4,
//!   $F4, $5C, $DC and $FC, kept as placeholders that fail fast
//!
//! The table is built by a `const fn` into a `static`, so it exists once per
//! process and is never mutated.

use std::fmt;

use crate::addressing::AddressingMode;
use crate::microcode::{program_for, MicroOp};
use crate::DecodeError;

/// What an instruction does, independent of how its operand is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Adc,
    And,
    Asl,
    /// Branch on bit n of a zero page byte reset.
    Bbr(u8),
    /// Branch on bit n of a zero page byte set.
    Bbs(u8),
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Bra,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Phx,
    Phy,
    Pla,
    Plp,
    Plx,
    Ply,
    /// Reset bit n of a zero page byte.
    Rmb(u8),
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    /// Set bit n of a zero page byte.
    Smb(u8),
    Sta,
    Stp,
    Stx,
    Sty,
    Stz,
    Tax,
    Tay,
    Trb,
    Tsb,
    Tsx,
    Txa,
    Txs,
    Tya,
    Wai,
    /// Reserved opcode without modeled behavior.
    Reserved,
}

/// Shape of an operation, which selects its micro-op template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Read,
    Write,
    Modify,
    Implied,
    Push,
    Pull,
    Branch,
    BitBranch,
    Jump,
    Subroutine,
    ReturnFromSubroutine,
    ReturnFromInterrupt,
    Break,
    Wait,
    Stop,
    Reserved,
}

const RMB: [&str; 8] = ["RMB0", "RMB1", "RMB2", "RMB3", "RMB4", "RMB5", "RMB6", "RMB7"];
const SMB: [&str; 8] = ["SMB0", "SMB1", "SMB2", "SMB3", "SMB4", "SMB5", "SMB6", "SMB7"];
const BBR: [&str; 8] = ["BBR0", "BBR1", "BBR2", "BBR3", "BBR4", "BBR5", "BBR6", "BBR7"];
const BBS: [&str; 8] = ["BBS0", "BBS1", "BBS2", "BBS3", "BBS4", "BBS5", "BBS6", "BBS7"];

impl Operation {
    pub const fn kind(self) -> OperationKind {
        use Operation::*;
        match self {
            Adc | And | Bit | Cmp | Cpx | Cpy | Eor | Lda | Ldx | Ldy | Ora | Sbc => {
                OperationKind::Read
            }
            Sta | Stx | Sty | Stz => OperationKind::Write,
            Asl | Lsr | Rol | Ror | Inc | Dec | Tsb | Trb | Rmb(_) | Smb(_) => {
                OperationKind::Modify
            }
            Clc | Cld | Cli | Clv | Sec | Sed | Sei | Dex | Dey | Inx | Iny | Nop | Tax | Tay
            | Tsx | Txa | Txs | Tya => OperationKind::Implied,
            Pha | Php | Phx | Phy => OperationKind::Push,
            Pla | Plp | Plx | Ply => OperationKind::Pull,
            Bcc | Bcs | Beq | Bmi | Bne | Bpl | Bra | Bvc | Bvs => OperationKind::Branch,
            Bbr(_) | Bbs(_) => OperationKind::BitBranch,
            Jmp => OperationKind::Jump,
            Jsr => OperationKind::Subroutine,
            Rts => OperationKind::ReturnFromSubroutine,
            Rti => OperationKind::ReturnFromInterrupt,
            Brk => OperationKind::Break,
            Wai => OperationKind::Wait,
            Stp => OperationKind::Stop,
            Reserved => OperationKind::Reserved,
        }
    }

    /// Assembler mnemonic, with the bit number for the bit instructions.
    pub const fn mnemonic(self) -> &'static str {
        use Operation::*;
        match self {
            Adc => "ADC",
            And => "AND",
            Asl => "ASL",
            Bbr(bit) => BBR[(bit & 7) as usize],
            Bbs(bit) => BBS[(bit & 7) as usize],
            Bcc => "BCC",
            Bcs => "BCS",
            Beq => "BEQ",
            Bit => "BIT",
            Bmi => "BMI",
            Bne => "BNE",
            Bpl => "BPL",
            Bra => "BRA",
            Brk => "BRK",
            Bvc => "BVC",
            Bvs => "BVS",
            Clc => "CLC",
            Cld => "CLD",
            Cli => "CLI",
            Clv => "CLV",
            Cmp => "CMP",
            Cpx => "CPX",
            Cpy => "CPY",
            Dec => "DEC",
            Dex => "DEX",
            Dey => "DEY",
            Eor => "EOR",
            Inc => "INC",
            Inx => "INX",
            Iny => "INY",
            Jmp => "JMP",
            Jsr => "JSR",
            Lda => "LDA",
            Ldx => "LDX",
            Ldy => "LDY",
            Lsr => "LSR",
            Nop => "NOP",
            Ora => "ORA",
            Pha => "PHA",
            Php => "PHP",
            Phx => "PHX",
            Phy => "PHY",
            Pla => "PLA",
            Plp => "PLP",
            Plx => "PLX",
            Ply => "PLY",
            Rmb(bit) => RMB[(bit & 7) as usize],
            Rol => "ROL",
            Ror => "ROR",
            Rti => "RTI",
            Rts => "RTS",
            Sbc => "SBC",
            Sec => "SEC",
            Sed => "SED",
            Sei => "SEI",
            Smb(bit) => SMB[(bit & 7) as usize],
            Sta => "STA",
            Stp => "STP",
            Stx => "STX",
            Sty => "STY",
            Stz => "STZ",
            Tax => "TAX",
            Tay => "TAY",
            Trb => "TRB",
            Tsb => "TSB",
            Tsx => "TSX",
            Txa => "TXA",
            Txs => "TXS",
            Tya => "TYA",
            Wai => "WAI",
            Reserved => "???",
        }
    }

    /// Returns true for BBRn/BBSn.
    pub const fn is_bit_branch(self) -> bool {
        matches!(self, Operation::Bbr(_) | Operation::Bbs(_))
    }
}

/// Coverage status of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeStatus {
    /// Documented opcode with a micro-op program.
    Official,
    /// Documented opcode whose program is not modeled yet.
    Unimplemented,
    /// Reserved opcode; a placeholder until its behavior is modeled.
    Unofficial,
}

impl fmt::Display for OpcodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OpcodeStatus::Official => write!(f, "official"),
            OpcodeStatus::Unimplemented => write!(f, "not implemented"),
            OpcodeStatus::Unofficial => write!(f, "reserved"),
        }
    }
}

/// Decode information for a single opcode byte.
///
/// # Examples
///
/// ```
/// use chiplab65::{decode, AddressingMode, OpcodeStatus};
///
/// let lda_imm = decode(0xA9);
/// assert_eq!(lda_imm.mnemonic, "LDA");
/// assert_eq!(lda_imm.mode, AddressingMode::Immediate);
/// assert_eq!(lda_imm.cycles, 2);
/// assert_eq!(lda_imm.size, 2);
/// assert_eq!(lda_imm.status, OpcodeStatus::Official);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeDescriptor {
    /// The opcode byte this entry describes.
    pub opcode: u8,

    /// Instruction mnemonic ("???" for reserved opcodes).
    pub mnemonic: &'static str,

    /// Addressing mode for this instruction.
    pub mode: AddressingMode,

    /// Operation applied by the micro-op program.
    pub operation: Operation,

    /// Documented cycle count, before page-crossing, branch and decimal
    /// penalties. Reserved opcodes carry the count the chip spends on them.
    pub cycles: u8,

    /// Total instruction size in bytes (opcode + operands).
    pub size: u8,

    /// Coverage status.
    pub status: OpcodeStatus,

    program: Option<&'static [MicroOp]>,
}

impl OpcodeDescriptor {
    const fn new(opcode: u8, operation: Operation, mode: AddressingMode, cycles: u8) -> Self {
        let program = match operation {
            Operation::Reserved => None,
            _ => program_for(operation, mode),
        };
        let status = match (operation, program) {
            (Operation::Reserved, _) => OpcodeStatus::Unofficial,
            (_, Some(_)) => OpcodeStatus::Official,
            (_, None) => OpcodeStatus::Unimplemented,
        };
        Self {
            opcode,
            mnemonic: operation.mnemonic(),
            mode,
            operation,
            cycles,
            size: mode.size(),
            status,
            program,
        }
    }

    /// Micro-op program run after the opcode fetch, if the opcode has one.
    pub fn program(&self) -> Option<&'static [MicroOp]> {
        self.program
    }

    /// Like [`program`](Self::program), but reports a missing program as the
    /// error the engine raises when it fetches this opcode at `address`.
    pub fn program_at(&self, address: u16) -> Result<&'static [MicroOp], DecodeError> {
        self.program.ok_or(DecodeError {
            opcode: self.opcode,
            address,
            status: self.status,
        })
    }

    /// Returns true if the engine can execute this opcode.
    pub fn is_implemented(&self) -> bool {
        self.program.is_some()
    }
}

const fn describe(opcode: u8) -> OpcodeDescriptor {
    use AddressingMode::*;
    use Operation as Op;

    let (operation, mode, cycles) = match opcode {
        0x00 => (Op::Brk, Implied, 7),
        0x01 => (Op::Ora, IndirectX, 6),
        0x02 => (Op::Reserved, Immediate, 2),
        0x03 => (Op::Reserved, Implied, 1),
        0x04 => (Op::Tsb, ZeroPage, 5),
        0x05 => (Op::Ora, ZeroPage, 3),
        0x06 => (Op::Asl, ZeroPage, 5),
        0x07 => (Op::Rmb(0), ZeroPage, 5),
        0x08 => (Op::Php, Implied, 3),
        0x09 => (Op::Ora, Immediate, 2),
        0x0A => (Op::Asl, Accumulator, 2),
        0x0B => (Op::Reserved, Implied, 1),
        0x0C => (Op::Tsb, Absolute, 6),
        0x0D => (Op::Ora, Absolute, 4),
        0x0E => (Op::Asl, Absolute, 6),
        0x0F => (Op::Bbr(0), ZeroPageRelative, 5),

        0x10 => (Op::Bpl, Relative, 2),
        0x11 => (Op::Ora, IndirectY, 5),
        0x12 => (Op::Ora, ZeroPageIndirect, 5),
        0x13 => (Op::Reserved, Implied, 1),
        0x14 => (Op::Trb, ZeroPage, 5),
        0x15 => (Op::Ora, ZeroPageX, 4),
        0x16 => (Op::Asl, ZeroPageX, 6),
        0x17 => (Op::Rmb(1), ZeroPage, 5),
        0x18 => (Op::Clc, Implied, 2),
        0x19 => (Op::Ora, AbsoluteY, 4),
        0x1A => (Op::Inc, Accumulator, 2),
        0x1B => (Op::Reserved, Implied, 1),
        0x1C => (Op::Trb, Absolute, 6),
        0x1D => (Op::Ora, AbsoluteX, 4),
        0x1E => (Op::Asl, AbsoluteX, 6),
        0x1F => (Op::Bbr(1), ZeroPageRelative, 5),

        0x20 => (Op::Jsr, Absolute, 6),
        0x21 => (Op::And, IndirectX, 6),
        0x22 => (Op::Reserved, Immediate, 2),
        0x23 => (Op::Reserved, Implied, 1),
        0x24 => (Op::Bit, ZeroPage, 3),
        0x25 => (Op::And, ZeroPage, 3),
        0x26 => (Op::Rol, ZeroPage, 5),
        0x27 => (Op::Rmb(2), ZeroPage, 5),
        0x28 => (Op::Plp, Implied, 4),
        0x29 => (Op::And, Immediate, 2),
        0x2A => (Op::Rol, Accumulator, 2),
        0x2B => (Op::Reserved, Implied, 1),
        0x2C => (Op::Bit, Absolute, 4),
        0x2D => (Op::And, Absolute, 4),
        0x2E => (Op::Rol, Absolute, 6),
        0x2F => (Op::Bbr(2), ZeroPageRelative, 5),

        0x30 => (Op::Bmi, Relative, 2),
        0x31 => (Op::And, IndirectY, 5),
        0x32 => (Op::And, ZeroPageIndirect, 5),
        0x33 => (Op::Reserved, Implied, 1),
        0x34 => (Op::Bit, ZeroPageX, 4),
        0x35 => (Op::And, ZeroPageX, 4),
        0x36 => (Op::Rol, ZeroPageX, 6),
        0x37 => (Op::Rmb(3), ZeroPage, 5),
        0x38 => (Op::Sec, Implied, 2),
        0x39 => (Op::And, AbsoluteY, 4),
        0x3A => (Op::Dec, Accumulator, 2),
        0x3B => (Op::Reserved, Implied, 1),
        0x3C => (Op::Bit, AbsoluteX, 4),
        0x3D => (Op::And, AbsoluteX, 4),
        0x3E => (Op::Rol, AbsoluteX, 6),
        0x3F => (Op::Bbr(3), ZeroPageRelative, 5),

        0x40 => (Op::Rti, Implied, 6),
        0x41 => (Op::Eor, IndirectX, 6),
        0x42 => (Op::Reserved, Immediate, 2),
        0x43 => (Op::Reserved, Implied, 1),
        0x44 => (Op::Reserved, ZeroPage, 3),
        0x45 => (Op::Eor, ZeroPage, 3),
        0x46 => (Op::Lsr, ZeroPage, 5),
        0x47 => (Op::Rmb(4), ZeroPage, 5),
        0x48 => (Op::Pha, Implied, 3),
        0x49 => (Op::Eor, Immediate, 2),
        0x4A => (Op::Lsr, Accumulator, 2),
        0x4B => (Op::Reserved, Implied, 1),
        0x4C => (Op::Jmp, Absolute, 3),
        0x4D => (Op::Eor, Absolute, 4),
        0x4E => (Op::Lsr, Absolute, 6),
        0x4F => (Op::Bbr(4), ZeroPageRelative, 5),

        0x50 => (Op::Bvc, Relative, 2),
        0x51 => (Op::Eor, IndirectY, 5),
        0x52 => (Op::Eor, ZeroPageIndirect, 5),
        0x53 => (Op::Reserved, Implied, 1),
        0x54 => (Op::Reserved, ZeroPageX, 4),
        0x55 => (Op::Eor, ZeroPageX, 4),
        0x56 => (Op::Lsr, ZeroPageX, 6),
        0x57 => (Op::Rmb(5), ZeroPage, 5),
        0x58 => (Op::Cli, Implied, 2),
        0x59 => (Op::Eor, AbsoluteY, 4),
        0x5A => (Op::Phy, Implied, 3),
        0x5B => (Op::Reserved, Implied, 1),
        0x5C => (Op::Reserved, Absolute, 8),
        0x5D => (Op::Eor, AbsoluteX, 4),
        0x5E => (Op::Lsr, AbsoluteX, 6),
        0x5F => (Op::Bbr(5), ZeroPageRelative, 5),

        0x60 => (Op::Rts, Implied, 6),
        0x61 => (Op::Adc, IndirectX, 6),
        0x62 => (Op::Reserved, Immediate, 2),
        0x63 => (Op::Reserved, Implied, 1),
        0x64 => (Op::Stz, ZeroPage, 3),
        0x65 => (Op::Adc, ZeroPage, 3),
        0x66 => (Op::Ror, ZeroPage, 5),
        0x67 => (Op::Rmb(6), ZeroPage, 5),
        0x68 => (Op::Pla, Implied, 4),
        0x69 => (Op::Adc, Immediate, 2),
        0x6A => (Op::Ror, Accumulator, 2),
        0x6B => (Op::Reserved, Implied, 1),
        0x6C => (Op::Jmp, Indirect, 6),
        0x6D => (Op::Adc, Absolute, 4),
        0x6E => (Op::Ror, Absolute, 6),
        0x6F => (Op::Bbr(6), ZeroPageRelative, 5),

        0x70 => (Op::Bvs, Relative, 2),
        0x71 => (Op::Adc, IndirectY, 5),
        0x72 => (Op::Adc, ZeroPageIndirect, 5),
        0x73 => (Op::Reserved, Implied, 1),
        0x74 => (Op::Stz, ZeroPageX, 4),
        0x75 => (Op::Adc, ZeroPageX, 4),
        0x76 => (Op::Ror, ZeroPageX, 6),
        0x77 => (Op::Rmb(7), ZeroPage, 5),
        0x78 => (Op::Sei, Implied, 2),
        0x79 => (Op::Adc, AbsoluteY, 4),
        0x7A => (Op::Ply, Implied, 4),
        0x7B => (Op::Reserved, Implied, 1),
        0x7C => (Op::Jmp, AbsoluteIndexedIndirect, 6),
        0x7D => (Op::Adc, AbsoluteX, 4),
        0x7E => (Op::Ror, AbsoluteX, 6),
        0x7F => (Op::Bbr(7), ZeroPageRelative, 5),

        0x80 => (Op::Bra, Relative, 3),
        0x81 => (Op::Sta, IndirectX, 6),
        0x82 => (Op::Reserved, Immediate, 2),
        0x83 => (Op::Reserved, Implied, 1),
        0x84 => (Op::Sty, ZeroPage, 3),
        0x85 => (Op::Sta, ZeroPage, 3),
        0x86 => (Op::Stx, ZeroPage, 3),
        0x87 => (Op::Smb(0), ZeroPage, 5),
        0x88 => (Op::Dey, Implied, 2),
        0x89 => (Op::Bit, Immediate, 2),
        0x8A => (Op::Txa, Implied, 2),
        0x8B => (Op::Reserved, Implied, 1),
        0x8C => (Op::Sty, Absolute, 4),
        0x8D => (Op::Sta, Absolute, 4),
        0x8E => (Op::Stx, Absolute, 4),
        0x8F => (Op::Bbs(0), ZeroPageRelative, 5),

        0x90 => (Op::Bcc, Relative, 2),
        0x91 => (Op::Sta, IndirectY, 6),
        0x92 => (Op::Sta, ZeroPageIndirect, 5),
        0x93 => (Op::Reserved, Implied, 1),
        0x94 => (Op::Sty, ZeroPageX, 4),
        0x95 => (Op::Sta, ZeroPageX, 4),
        0x96 => (Op::Stx, ZeroPageY, 4),
        0x97 => (Op::Smb(1), ZeroPage, 5),
        0x98 => (Op::Tya, Implied, 2),
        0x99 => (Op::Sta, AbsoluteY, 5),
        0x9A => (Op::Txs, Implied, 2),
        0x9B => (Op::Reserved, Implied, 1),
        0x9C => (Op::Stz, Absolute, 4),
        0x9D => (Op::Sta, AbsoluteX, 5),
        0x9E => (Op::Stz, AbsoluteX, 5),
        0x9F => (Op::Bbs(1), ZeroPageRelative, 5),

        0xA0 => (Op::Ldy, Immediate, 2),
        0xA1 => (Op::Lda, IndirectX, 6),
        0xA2 => (Op::Ldx, Immediate, 2),
        0xA3 => (Op::Reserved, Implied, 1),
        0xA4 => (Op::Ldy, ZeroPage, 3),
        0xA5 => (Op::Lda, ZeroPage, 3),
        0xA6 => (Op::Ldx, ZeroPage, 3),
        0xA7 => (Op::Smb(2), ZeroPage, 5),
        0xA8 => (Op::Tay, Implied, 2),
        0xA9 => (Op::Lda, Immediate, 2),
        0xAA => (Op::Tax, Implied, 2),
        0xAB => (Op::Reserved, Implied, 1),
        0xAC => (Op::Ldy, Absolute, 4),
        0xAD => (Op::Lda, Absolute, 4),
        0xAE => (Op::Ldx, Absolute, 4),
        0xAF => (Op::Bbs(2), ZeroPageRelative, 5),

        0xB0 => (Op::Bcs, Relative, 2),
        0xB1 => (Op::Lda, IndirectY, 5),
        0xB2 => (Op::Lda, ZeroPageIndirect, 5),
        0xB3 => (Op::Reserved, Implied, 1),
        0xB4 => (Op::Ldy, ZeroPageX, 4),
        0xB5 => (Op::Lda, ZeroPageX, 4),
        0xB6 => (Op::Ldx, ZeroPageY, 4),
        0xB7 => (Op::Smb(3), ZeroPage, 5),
        0xB8 => (Op::Clv, Implied, 2),
        0xB9 => (Op::Lda, AbsoluteY, 4),
        0xBA => (Op::Tsx, Implied, 2),
        0xBB => (Op::Reserved, Implied, 1),
        0xBC => (Op::Ldy, AbsoluteX, 4),
        0xBD => (Op::Lda, AbsoluteX, 4),
        0xBE => (Op::Ldx, AbsoluteY, 4),
        0xBF => (Op::Bbs(3), ZeroPageRelative, 5),

        0xC0 => (Op::Cpy, Immediate, 2),
        0xC1 => (Op::Cmp, IndirectX, 6),
        0xC2 => (Op::Reserved, Immediate, 2),
        0xC3 => (Op::Reserved, Implied, 1),
        0xC4 => (Op::Cpy, ZeroPage, 3),
        0xC5 => (Op::Cmp, ZeroPage, 3),
        0xC6 => (Op::Dec, ZeroPage, 5),
        0xC7 => (Op::Smb(4), ZeroPage, 5),
        0xC8 => (Op::Iny, Implied, 2),
        0xC9 => (Op::Cmp, Immediate, 2),
        0xCA => (Op::Dex, Implied, 2),
        0xCB => (Op::Wai, Implied, 3),
        0xCC => (Op::Cpy, Absolute, 4),
        0xCD => (Op::Cmp, Absolute, 4),
        0xCE => (Op::Dec, Absolute, 6),
        0xCF => (Op::Bbs(4), ZeroPageRelative, 5),

        0xD0 => (Op::Bne, Relative, 2),
        0xD1 => (Op::Cmp, IndirectY, 5),
        0xD2 => (Op::Cmp, ZeroPageIndirect, 5),
        0xD3 => (Op::Reserved, Implied, 1),
        0xD4 => (Op::Reserved, ZeroPageX, 4),
        0xD5 => (Op::Cmp, ZeroPageX, 4),
        0xD6 => (Op::Dec, ZeroPageX, 6),
        0xD7 => (Op::Smb(5), ZeroPage, 5),
        0xD8 => (Op::Cld, Implied, 2),
        0xD9 => (Op::Cmp, AbsoluteY, 4),
        0xDA => (Op::Phx, Implied, 3),
        0xDB => (Op::Stp, Implied, 3),
        0xDC => (Op::Reserved, Absolute, 4),
        0xDD => (Op::Cmp, AbsoluteX, 4),
        0xDE => (Op::Dec, AbsoluteX, 7),
        0xDF => (Op::Bbs(5), ZeroPageRelative, 5),

        0xE0 => (Op::Cpx, Immediate, 2),
        0xE1 => (Op::Sbc, IndirectX, 6),
        0xE2 => (Op::Reserved, Immediate, 2),
        0xE3 => (Op::Reserved, Implied, 1),
        0xE4 => (Op::Cpx, ZeroPage, 3),
        0xE5 => (Op::Sbc, ZeroPage, 3),
        0xE6 => (Op::Inc, ZeroPage, 5),
        0xE7 => (Op::Smb(6), ZeroPage, 5),
        0xE8 => (Op::Inx, Implied, 2),
        0xE9 => (Op::Sbc, Immediate, 2),
        0xEA => (Op::Nop, Implied, 2),
        0xEB => (Op::Reserved, Implied, 1),
        0xEC => (Op::Cpx, Absolute, 4),
        0xED => (Op::Sbc, Absolute, 4),
        0xEE => (Op::Inc, Absolute, 6),
        0xEF => (Op::Bbs(6), ZeroPageRelative, 5),

        0xF0 => (Op::Beq, Relative, 2),
        0xF1 => (Op::Sbc, IndirectY, 5),
        0xF2 => (Op::Sbc, ZeroPageIndirect, 5),
        0xF3 => (Op::Reserved, Implied, 1),
        0xF4 => (Op::Reserved, ZeroPageX, 4),
        0xF5 => (Op::Sbc, ZeroPageX, 4),
        0xF6 => (Op::Inc, ZeroPageX, 6),
        0xF7 => (Op::Smb(7), ZeroPage, 5),
        0xF8 => (Op::Sed, Implied, 2),
        0xF9 => (Op::Sbc, AbsoluteY, 4),
        0xFA => (Op::Plx, Implied, 4),
        0xFB => (Op::Reserved, Implied, 1),
        0xFC => (Op::Reserved, Absolute, 4),
        0xFD => (Op::Sbc, AbsoluteX, 4),
        0xFE => (Op::Inc, AbsoluteX, 7),
        0xFF => (Op::Bbs(7), ZeroPageRelative, 5),
    };

    OpcodeDescriptor::new(opcode, operation, mode, cycles)
}

const fn build_table() -> [OpcodeDescriptor; 256] {
    let mut table = [describe(0x00); 256];
    let mut i = 1;
    while i < 256 {
        table[i] = describe(i as u8);
        i += 1;
    }
    table
}

/// Complete 256-entry decode table indexed by opcode byte value.
pub static DECODE_TABLE: [OpcodeDescriptor; 256] = build_table();

/// Looks up the descriptor for an opcode byte. Never fails: the table is
/// exhaustive.
pub fn decode(opcode: u8) -> &'static OpcodeDescriptor {
    &DECODE_TABLE[opcode as usize]
}

/// All opcodes the engine can execute, in opcode order.
pub fn implemented_opcodes() -> impl Iterator<Item = &'static OpcodeDescriptor> {
    DECODE_TABLE.iter().filter(|descriptor| descriptor.is_implemented())
}

/// Counts of opcodes per coverage status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub official: usize,
    pub unimplemented: usize,
    pub unofficial: usize,
}

impl Capabilities {
    /// Returns true if the opcode has a micro-op program.
    pub fn supports(&self, opcode: u8) -> bool {
        decode(opcode).is_implemented()
    }
}

/// Summarizes decode table coverage.
pub fn capabilities() -> Capabilities {
    DECODE_TABLE
        .iter()
        .fold(Capabilities::default(), |mut caps, descriptor| {
            match descriptor.status {
                OpcodeStatus::Official => caps.official += 1,
                OpcodeStatus::Unimplemented => caps.unimplemented += 1,
                OpcodeStatus::Unofficial => caps.unofficial += 1,
            }
            caps
        })
}
