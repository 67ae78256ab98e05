//! # Register and Flag State
//!
//! The programmer-visible state of the 65C02: accumulator, index registers,
//! stack pointer, program counter and the packed processor status byte.
//!
//! Status layout (NV1BDIZC):
//! - Bit 7: N (Negative)
//! - Bit 6: V (Overflow)
//! - Bit 5: always 1
//! - Bit 4: B (Break, only meaningful in a pushed copy)
//! - Bit 3: D (Decimal)
//! - Bit 2: I (Interrupt Disable)
//! - Bit 1: Z (Zero)
//! - Bit 0: C (Carry)

use bitflags::bitflags;

/// Base address of the hardware stack page.
pub const STACK_PAGE: u16 = 0x0100;

bitflags! {
    /// Processor status register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Status: u8 {
        const N = 0b1000_0000;
        const V = 0b0100_0000;
        const UNUSED = 0b0010_0000;
        const B = 0b0001_0000;
        const D = 0b0000_1000;
        const I = 0b0000_0100;
        const Z = 0b0000_0010;
        const C = 0b0000_0001;
    }
}

impl Status {
    /// Builds a live status register from a byte pulled off the stack.
    ///
    /// The B bit has no storage in the chip and bit 5 is hardwired high.
    pub fn from_pulled(value: u8) -> Self {
        (Status::from_bits_retain(value) | Status::UNUSED) - Status::B
    }

    /// The byte pushed to the stack by PHP/BRK (`brk = true`) or by a
    /// hardware interrupt (`brk = false`).
    pub fn pushed(self, brk: bool) -> u8 {
        let mut value = self | Status::UNUSED;
        value.set(Status::B, brk);
        value.bits()
    }
}

/// CPU registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    /// Accumulator
    pub a: u8,
    /// X index register
    pub x: u8,
    /// Y index register
    pub y: u8,
    /// Stack pointer (the stack lives at `$0100 | s`)
    pub s: u8,
    /// Program counter (address of the next byte to fetch)
    pub pc: u16,
    /// Processor status
    pub p: Status,
}

impl Registers {
    /// Register contents the model assumes before the first reset.
    ///
    /// The real chip powers up with undefined registers. ChipLab captures
    /// show the first reset reading $FFFF twice and then $0000, so PC starts
    /// at $FFFF. The reset sequence decrements S three times, so S starts at
    /// $00 to land on $FD.
    pub fn power_on() -> Self {
        Self {
            a: 0x00,
            x: 0x00,
            y: 0x00,
            s: 0x00,
            pc: 0xFFFF,
            p: Status::UNUSED | Status::I,
        }
    }

    /// Sets Z if `result` is zero and N from bit 7 of `result`.
    pub fn set_nz(&mut self, result: u8) {
        self.p.set(Status::Z, result == 0);
        self.p.set(Status::N, result & 0x80 != 0);
    }

    /// Returns true if the given flag is set.
    pub fn flag(&self, flag: Status) -> bool {
        self.p.contains(flag)
    }

    /// Sets or clears a flag.
    pub fn set_flag(&mut self, flag: Status, value: bool) {
        self.p.set(flag, value);
    }

    /// Replaces the status register, keeping bit 5 high and B clear.
    pub fn set_status(&mut self, value: u8) {
        self.p = Status::from_pulled(value);
    }

    /// Full address of the current stack slot.
    pub fn stack_address(&self) -> u16 {
        STACK_PAGE | self.s as u16
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::power_on()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_nz() {
        let mut regs = Registers::power_on();

        regs.set_nz(0x00);
        assert!(regs.flag(Status::Z));
        assert!(!regs.flag(Status::N));

        regs.set_nz(0x80);
        assert!(!regs.flag(Status::Z));
        assert!(regs.flag(Status::N));

        regs.set_nz(0x7F);
        assert!(!regs.flag(Status::Z));
        assert!(!regs.flag(Status::N));
    }

    #[test]
    fn test_pulled_status_drops_break_bit() {
        let status = Status::from_pulled(0xFF);
        assert!(!status.contains(Status::B));
        assert!(status.contains(Status::UNUSED));

        let status = Status::from_pulled(0x00);
        assert_eq!(status.bits(), 0x20);
    }

    #[test]
    fn test_pushed_status() {
        let p = Status::UNUSED | Status::C | Status::N;
        assert_eq!(p.pushed(true), 0xB1);
        assert_eq!(p.pushed(false), 0xA1);
    }

    #[test]
    fn test_stack_address_uses_page_one() {
        let mut regs = Registers::power_on();
        regs.s = 0xFD;
        assert_eq!(regs.stack_address(), 0x01FD);
    }
}
