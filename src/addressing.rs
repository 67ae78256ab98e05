//! # Addressing Modes
//!
//! This module defines the addressing modes of the 65C02. Each mode determines
//! how the CPU interprets operand bytes, which bus cycles it spends computing
//! the effective address, and therefore which micro-op template an opcode runs.

/// 65C02 addressing mode enumeration.
///
/// # Operand Sizes
///
/// - **0 bytes**: Implied, Accumulator
/// - **1 byte**: Immediate, ZeroPage, ZeroPageX, ZeroPageY, Relative, IndirectX,
///   IndirectY, ZeroPageIndirect
/// - **2 bytes**: Absolute, AbsoluteX, AbsoluteY, Indirect,
///   AbsoluteIndexedIndirect, ZeroPageRelative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// No operand, operation implied by instruction.
    ///
    /// Examples: CLC, RTS, PHX
    Implied,

    /// Operates directly on the accumulator register.
    ///
    /// Examples: LSR A, INC A
    Accumulator,

    /// 8-bit constant operand in instruction.
    ///
    /// Example: LDA #$10
    Immediate,

    /// 8-bit address in zero page (0x00-0xFF).
    ///
    /// Example: LDA $80
    ZeroPage,

    /// Zero page address indexed by X register, wrapping within zero page.
    ///
    /// Example: LDA $80,X
    ZeroPageX,

    /// Zero page address indexed by Y register, wrapping within zero page.
    ///
    /// Example: LDX $80,Y
    ZeroPageY,

    /// Signed 8-bit offset for branch instructions.
    ///
    /// Example: BEQ label
    Relative,

    /// Full 16-bit address.
    ///
    /// Example: JMP $1234
    Absolute,

    /// 16-bit address indexed by X register.
    ///
    /// Reads take one extra cycle when the index crosses a page.
    AbsoluteX,

    /// 16-bit address indexed by Y register.
    ///
    /// Reads take one extra cycle when the index crosses a page.
    AbsoluteY,

    /// Indirect jump through a 16-bit pointer.
    ///
    /// Example: JMP ($FFFC). Unlike the NMOS part, the 65C02 fetches the high
    /// byte from the next address even across a page boundary.
    Indirect,

    /// Indirect jump through a 16-bit pointer indexed by X.
    ///
    /// Example: JMP ($1234,X)
    AbsoluteIndexedIndirect,

    /// Indexed indirect: (ZP + X) then dereference.
    ///
    /// Example: LDA ($40,X)
    IndirectX,

    /// Indirect indexed: ZP dereference then + Y.
    ///
    /// Example: LDA ($40),Y
    IndirectY,

    /// Zero page indirect without indexing.
    ///
    /// Example: LDA ($40)
    ZeroPageIndirect,

    /// Zero page address followed by a branch offset (BBRn/BBSn).
    ///
    /// Example: BBR3 $40,label
    ZeroPageRelative,
}

impl AddressingMode {
    /// Number of operand bytes following the opcode.
    pub const fn operand_bytes(self) -> u8 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 0,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::Relative
            | AddressingMode::IndirectX
            | AddressingMode::IndirectY
            | AddressingMode::ZeroPageIndirect => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect
            | AddressingMode::AbsoluteIndexedIndirect
            | AddressingMode::ZeroPageRelative => 2,
        }
    }

    /// Total instruction size including the opcode byte.
    pub const fn size(self) -> u8 {
        1 + self.operand_bytes()
    }
}
