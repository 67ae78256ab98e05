//! # Memory Bus Abstraction
//!
//! This module provides the `MemoryBus` trait that decouples the CPU from specific
//! memory implementations, and `MemoryImage`, the 64 KiB memory model used by the
//! conformance harness.
//!
//! ## Design Principles
//!
//! The MemoryBus trait follows 65C02 hardware behavior:
//! - No bus errors - reads/writes always succeed
//! - Unmapped reads return an open-bus value chosen by policy
//! - Writes to ROM windows never reach the backing array
//! - Addresses are `u16`, so an address beyond 16 bits cannot be expressed
//!
//! Policy events (open-bus reads, dropped writes) are logged and counted but
//! never abort execution.

use std::ops::RangeInclusive;

use thiserror::Error;

/// Size of the 65C02 address space.
pub const ADDRESS_SPACE: usize = 0x1_0000;

/// Memory bus trait for CPU to read/write bytes.
///
/// The CPU performs exactly one `read` or `write` per bus cycle, including the
/// dummy cycles real hardware performs, so implementations see the same access
/// pattern as devices attached to a real 65C02.
///
/// # Examples
///
/// ```
/// use chiplab65::{MemoryBus, MemoryImage};
///
/// let mut mem = MemoryImage::new();
/// mem.write(0x1234, 0x42);
/// assert_eq!(mem.read(0x1234), 0x42);
/// ```
pub trait MemoryBus {
    /// Reads a byte from the specified 16-bit address.
    ///
    /// Takes `&mut self` because reads on real buses have side effects
    /// (floating bus latches, I/O registers that clear on read).
    fn read(&mut self, addr: u16) -> u8;

    /// Writes a byte to the specified 16-bit address.
    fn write(&mut self, addr: u16, value: u8);

    /// Checks if a device on the bus is holding the IRQ line active.
    ///
    /// The line is level-sensitive and shared: the CPU ORs this with its own
    /// IRQ input at every instruction boundary.
    fn irq_active(&self) -> bool {
        false
    }
}

/// Value returned when reading an address no region claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenBus {
    /// Always read the given byte (0xFF mimics pulled-up data lines).
    Fixed(u8),
    /// Read whatever byte was last on the data bus.
    LastValue,
}

/// What happens when the CPU writes to a ROM window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RomWritePolicy {
    /// Drop the write quietly.
    Ignore,
    /// Drop the write and report it as a warning.
    Reject,
}

/// How `MemoryImage::from_image` maps the supplied program image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAccess {
    /// The image is a fixed environment; CPU writes never change it.
    ReadOnly,
    /// The image is loaded into RAM.
    Writable,
}

/// Memory policy configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryConfig {
    pub open_bus: OpenBus,
    pub rom_writes: RomWritePolicy,
    pub image_access: ImageAccess,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            open_bus: OpenBus::Fixed(0xFF),
            rom_writes: RomWritePolicy::Ignore,
            image_access: ImageAccess::ReadOnly,
        }
    }
}

/// What a mapped address range behaves like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// Readable and writable storage.
    Ram,
    /// Read-only storage; writes follow `RomWritePolicy`.
    Rom,
    /// Repeats `len` bytes starting at `source` across the region.
    Mirror { source: u16, len: u16 },
}

/// A non-fatal, observable memory event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryPolicyEvent {
    /// Read from an address no region claims.
    OpenBusRead { address: u16, value: u8 },
    /// Write to ROM dropped under `RomWritePolicy::Ignore`.
    RomWriteIgnored { address: u16, value: u8 },
    /// Write to ROM dropped under `RomWritePolicy::Reject`.
    RomWriteRejected { address: u16, value: u8 },
    /// Write to an address no region claims.
    UnmappedWrite { address: u16, value: u8 },
}

/// Running counts of memory policy events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyStats {
    pub open_bus_reads: u64,
    pub ignored_writes: u64,
    pub rejected_writes: u64,
    pub unmapped_writes: u64,
}

/// Error returned when building a memory map fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error(
        "region 0x{new_start:04X}-0x{new_end:04X} overlaps existing region 0x{existing_start:04X}-0x{existing_end:04X}"
    )]
    Overlap {
        new_start: u16,
        new_end: u16,
        existing_start: u16,
        existing_end: u16,
    },

    #[error("region 0x{start:04X}-0x{end:04X} is empty")]
    EmptyRange { start: u16, end: u16 },

    #[error("mirror at 0x{start:04X} has zero length")]
    EmptyMirror { start: u16 },

    #[error("program image is {len} bytes, larger than the 64 KiB address space")]
    ImageTooLarge { len: usize },
}

#[derive(Debug, Clone, Copy)]
struct Region {
    start: u16,
    end: u16,
    kind: RegionKind,
}

impl Region {
    fn contains(&self, addr: u16) -> bool {
        addr >= self.start && addr <= self.end
    }
}

/// Where an address landed after region and mirror resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Ram(u16),
    Rom(u16),
}

/// 64 KiB memory with RAM, ROM and mirror windows.
///
/// A single backing array holds every byte; the region map decides which
/// addresses are writable, which are fixed, which alias another range, and
/// which float (open bus).
///
/// # Examples
///
/// ```
/// use chiplab65::{MemoryBus, MemoryConfig, MemoryImage, RegionKind};
///
/// let mut memory = MemoryImage::unmapped(MemoryConfig::default());
/// memory.map(0x0000..=0x07FF, RegionKind::Ram).unwrap();
/// memory
///     .map(0x0800..=0x1FFF, RegionKind::Mirror { source: 0x0000, len: 0x0800 })
///     .unwrap();
///
/// memory.write(0x0801, 0x42);
/// assert_eq!(memory.read(0x0001), 0x42);
///
/// // Unmapped address returns the open-bus value
/// assert_eq!(memory.read(0x8000), 0xFF);
/// ```
#[derive(Clone)]
pub struct MemoryImage {
    data: Box<[u8]>,
    regions: Vec<Region>,
    config: MemoryConfig,
    last_bus: u8,
    stats: PolicyStats,
    last_event: Option<MemoryPolicyEvent>,
}

impl MemoryImage {
    /// Creates a memory where all 64 KiB are RAM initialized to zero.
    pub fn new() -> Self {
        let mut memory = Self::unmapped(MemoryConfig::default());
        memory.regions.push(Region {
            start: 0x0000,
            end: 0xFFFF,
            kind: RegionKind::Ram,
        });
        memory
    }

    /// Creates a memory with no regions; every read is open bus.
    pub fn unmapped(config: MemoryConfig) -> Self {
        Self {
            data: vec![0; ADDRESS_SPACE].into_boxed_slice(),
            regions: Vec::new(),
            config,
            last_bus: 0,
            stats: PolicyStats::default(),
            last_event: None,
        }
    }

    /// Creates a memory holding `image` at $0000.
    ///
    /// The image becomes a ROM or RAM window depending on
    /// `config.image_access`; anything past its end is unmapped.
    pub fn from_image(image: &[u8], config: MemoryConfig) -> Result<Self, MapError> {
        if image.len() > ADDRESS_SPACE {
            return Err(MapError::ImageTooLarge { len: image.len() });
        }

        let mut memory = Self::unmapped(config);
        if image.is_empty() {
            return Ok(memory);
        }

        let kind = match config.image_access {
            ImageAccess::ReadOnly => RegionKind::Rom,
            ImageAccess::Writable => RegionKind::Ram,
        };
        memory.map(0x0000..=(image.len() - 1) as u16, kind)?;
        memory.load(0x0000, image);
        Ok(memory)
    }

    /// Registers a region. Fails if it overlaps an existing region.
    pub fn map(&mut self, range: RangeInclusive<u16>, kind: RegionKind) -> Result<(), MapError> {
        let (start, end) = (*range.start(), *range.end());
        if start > end {
            return Err(MapError::EmptyRange { start, end });
        }
        if let RegionKind::Mirror { len: 0, .. } = kind {
            return Err(MapError::EmptyMirror { start });
        }

        if let Some(existing) = self
            .regions
            .iter()
            .find(|region| start <= region.end && region.start <= end)
        {
            return Err(MapError::Overlap {
                new_start: start,
                new_end: end,
                existing_start: existing.start,
                existing_end: existing.end,
            });
        }

        self.regions.push(Region { start, end, kind });
        Ok(())
    }

    /// Copies `bytes` into the backing array starting at `addr`, bypassing
    /// the region map and write policy.
    ///
    /// # Panics
    ///
    /// Panics if the bytes would run past $FFFF.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        let start = addr as usize;
        let end = start + bytes.len();
        assert!(
            end <= ADDRESS_SPACE,
            "load of {} bytes at 0x{:04X} runs past 0xFFFF",
            bytes.len(),
            addr
        );
        self.data[start..end].copy_from_slice(bytes);
    }

    /// Returns the byte a read of `addr` would produce, without side effects.
    pub fn peek(&self, addr: u16) -> u8 {
        match self.resolve(addr) {
            Some(Target::Ram(target)) | Some(Target::Rom(target)) => self.data[target as usize],
            None => self.open_bus_value(),
        }
    }

    /// Active memory configuration.
    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Counts of policy events since creation.
    pub fn policy_stats(&self) -> PolicyStats {
        self.stats
    }

    /// Most recent policy event, if any.
    pub fn last_policy_event(&self) -> Option<MemoryPolicyEvent> {
        self.last_event
    }

    fn open_bus_value(&self) -> u8 {
        match self.config.open_bus {
            OpenBus::Fixed(value) => value,
            OpenBus::LastValue => self.last_bus,
        }
    }

    fn find_region(&self, addr: u16) -> Option<&Region> {
        self.regions.iter().find(|region| region.contains(addr))
    }

    fn resolve(&self, addr: u16) -> Option<Target> {
        let region = self.find_region(addr)?;
        match region.kind {
            RegionKind::Ram => Some(Target::Ram(addr)),
            RegionKind::Rom => Some(Target::Rom(addr)),
            RegionKind::Mirror { source, len } => {
                let target = source.wrapping_add((addr - region.start) % len);
                // Mirrors alias a concrete window, never another mirror.
                match self.find_region(target)?.kind {
                    RegionKind::Ram => Some(Target::Ram(target)),
                    RegionKind::Rom => Some(Target::Rom(target)),
                    RegionKind::Mirror { .. } => None,
                }
            }
        }
    }

    fn record(&mut self, event: MemoryPolicyEvent) {
        match event {
            MemoryPolicyEvent::OpenBusRead { address, value } => {
                self.stats.open_bus_reads += 1;
                log::trace!("open bus read at 0x{:04X} -> 0x{:02X}", address, value);
            }
            MemoryPolicyEvent::RomWriteIgnored { address, value } => {
                self.stats.ignored_writes += 1;
                log::trace!("ignored ROM write 0x{:02X} -> 0x{:04X}", value, address);
            }
            MemoryPolicyEvent::RomWriteRejected { address, value } => {
                self.stats.rejected_writes += 1;
                log::warn!("rejected ROM write 0x{:02X} -> 0x{:04X}", value, address);
            }
            MemoryPolicyEvent::UnmappedWrite { address, value } => {
                self.stats.unmapped_writes += 1;
                log::trace!("unmapped write 0x{:02X} -> 0x{:04X}", value, address);
            }
        }
        self.last_event = Some(event);
    }
}

impl Default for MemoryImage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for MemoryImage {
    fn read(&mut self, addr: u16) -> u8 {
        let value = match self.resolve(addr) {
            Some(Target::Ram(target)) | Some(Target::Rom(target)) => self.data[target as usize],
            None => {
                let value = self.open_bus_value();
                self.record(MemoryPolicyEvent::OpenBusRead {
                    address: addr,
                    value,
                });
                value
            }
        };
        self.last_bus = value;
        value
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.last_bus = value;
        match self.resolve(addr) {
            Some(Target::Ram(target)) => self.data[target as usize] = value,
            Some(Target::Rom(_)) => {
                let event = match self.config.rom_writes {
                    RomWritePolicy::Ignore => MemoryPolicyEvent::RomWriteIgnored {
                        address: addr,
                        value,
                    },
                    RomWritePolicy::Reject => MemoryPolicyEvent::RomWriteRejected {
                        address: addr,
                        value,
                    },
                };
                self.record(event);
            }
            None => self.record(MemoryPolicyEvent::UnmappedWrite {
                address: addr,
                value,
            }),
        }
    }
}
