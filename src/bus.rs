//! # Bus Cycles
//!
//! One [`BusCycle`] is produced for every clock the engine runs. It records
//! what an external observer (a logic analyzer on the ChipLab rig) would see
//! on the address bus, the data bus, the RWB pin and the status pins.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Status pins sampled alongside a bus cycle.
    ///
    /// The flags are stored in their *logical* sense: a set flag means the
    /// condition is active, even for pins that are electrically active-low
    /// (VPB and MLB on the W65C02S).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BusFlags: u8 {
        /// SYNC: the cycle is an opcode fetch.
        const SYNC = 0b0000_0001;
        /// VPB: the cycle reads part of an interrupt/reset vector.
        const VECTOR_PULL = 0b0000_0010;
        /// MLB: the cycle belongs to a locked read-modify-write sequence.
        const MEMORY_LOCK = 0b0000_0100;
    }
}

/// Direction of a bus transaction, as driven on the RWB pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// RWB high: the CPU samples the data bus.
    Read,
    /// RWB low: the CPU drives the data bus.
    Write,
}

impl Direction {
    /// Level of the RWB pin for this direction (1 = read, 0 = write).
    pub fn rwb(self) -> u8 {
        match self {
            Direction::Read => 1,
            Direction::Write => 0,
        }
    }

    /// Inverse of [`Direction::rwb`]; any non-zero level reads as high.
    pub fn from_rwb(level: u16) -> Self {
        if level == 0 {
            Direction::Write
        } else {
            Direction::Read
        }
    }
}

/// A single clock cycle of externally observable bus activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BusCycle {
    /// Zero-based index of this cycle since the engine was created.
    pub cycle: u64,
    /// Address asserted on A0-A15.
    pub address: u16,
    /// Byte on the data bus: the value read, or the value written.
    pub data: u8,
    /// Read or write.
    pub direction: Direction,
    /// Status pins active during the cycle.
    pub flags: BusFlags,
}

impl BusCycle {
    /// Returns true if this cycle is an opcode fetch (SYNC high).
    pub fn is_opcode_fetch(&self) -> bool {
        self.flags.contains(BusFlags::SYNC)
    }

    /// Returns true if the CPU drove the data bus during this cycle.
    pub fn is_write(&self) -> bool {
        self.direction == Direction::Write
    }
}

impl fmt::Display for BusCycle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "#{} a=0x{:04X} rwb={} d=0x{:02X}",
            self.cycle,
            self.address,
            self.direction.rwb(),
            self.data
        )?;
        if self.flags.contains(BusFlags::SYNC) {
            write!(f, " sync")?;
        }
        if self.flags.contains(BusFlags::VECTOR_PULL) {
            write!(f, " vpb")?;
        }
        if self.flags.contains(BusFlags::MEMORY_LOCK) {
            write!(f, " mlb")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rwb_levels() {
        assert_eq!(Direction::Read.rwb(), 1);
        assert_eq!(Direction::Write.rwb(), 0);
        assert_eq!(Direction::from_rwb(1), Direction::Read);
        assert_eq!(Direction::from_rwb(0), Direction::Write);
    }

    #[test]
    fn test_display_lists_active_pins() {
        let cycle = BusCycle {
            cycle: 3,
            address: 0xFFFA,
            data: 0x34,
            direction: Direction::Read,
            flags: BusFlags::VECTOR_PULL,
        };
        assert_eq!(cycle.to_string(), "#3 a=0xFFFA rwb=1 d=0x34 vpb");
    }
}
