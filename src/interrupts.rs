//! # Interrupt Controller
//!
//! Tracks the NMI and IRQ input lines and decides, at each instruction
//! boundary, whether the CPU starts an interrupt sequence instead of fetching
//! the next opcode.
//!
//! ## Line Behavior
//!
//! - **NMI** is edge-triggered: a transition from released to asserted latches
//!   a pending NMI that survives until serviced, even if the line is released
//!   again. NMI ignores the I flag.
//! - **IRQ** is level-sensitive and shared: the line is active if the CPU's own
//!   input is asserted OR any device on the bus reports
//!   [`MemoryBus::irq_active`](crate::MemoryBus::irq_active). It is masked while
//!   I is set. Nothing is queued; if the line is still active after RTI the
//!   CPU re-enters the handler.
//!
//! NMI wins when both are pending at the same boundary.
//!
//! ## Interrupt Sequence
//!
//! Both interrupts run the same 7 cycles as a forced BRK:
//!
//! 1. Spurious opcode fetch at PC (SYNC high, PC not advanced)
//! 2. Spurious read at PC
//! 3. Push PC high byte
//! 4. Push PC low byte
//! 5. Push status with B clear
//! 6. Read vector low byte (VPB asserted), set I, clear D
//! 7. Read vector high byte and jump
//!
//! IRQ is masked by I as it stood at the start of the previous instruction's
//! last cycle. CLI, SEI and PLP change I during that cycle, so the
//! instruction after them runs before the change is seen. RTI restores I
//! earlier and takes effect at once.
//!
//! WAI also watches the lines: any asserted IRQ (masked or not) or a pending
//! NMI wakes the processor. Leaving the wait state takes one read of PC
//! before the next fetch or interrupt sequence.

/// NMI vector address.
pub const NMI_VECTOR: u16 = 0xFFFA;
/// Reset vector address.
pub const RESET_VECTOR: u16 = 0xFFFC;
/// IRQ/BRK vector address.
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// What the CPU is doing with respect to interrupts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InterruptState {
    /// Normal fetch-decode-execute.
    #[default]
    Running,
    /// Inside an NMI handler (until RTI).
    ServicingNmi,
    /// Inside an IRQ handler (until RTI).
    ServicingIrq,
}

/// A hardware interrupt chosen for service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterruptKind {
    Nmi,
    Irq,
}

impl InterruptKind {
    /// Vector the interrupt sequence reads.
    pub fn vector(self) -> u16 {
        match self {
            InterruptKind::Nmi => NMI_VECTOR,
            InterruptKind::Irq => IRQ_VECTOR,
        }
    }

    /// State entered while the handler runs.
    pub fn servicing_state(self) -> InterruptState {
        match self {
            InterruptKind::Nmi => InterruptState::ServicingNmi,
            InterruptKind::Irq => InterruptState::ServicingIrq,
        }
    }
}

/// The CPU's NMI and IRQ inputs, in logical (asserted = true) sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct InterruptLines {
    nmi: bool,
    nmi_pending: bool,
    irq: bool,
}

impl InterruptLines {
    /// Drives the NMI input. A released-to-asserted transition latches an NMI.
    pub(crate) fn set_nmi(&mut self, asserted: bool) {
        if asserted && !self.nmi {
            self.nmi_pending = true;
        }
        self.nmi = asserted;
    }

    /// Drives the IRQ input.
    pub(crate) fn set_irq(&mut self, asserted: bool) {
        self.irq = asserted;
    }

    pub(crate) fn irq(&self) -> bool {
        self.irq
    }

    /// Picks the interrupt to service at an instruction boundary.
    ///
    /// `irq_line` is the combined IRQ level (CPU input OR bus devices);
    /// `masked` is the I flag. Taking an NMI consumes its latched edge.
    pub(crate) fn poll(&mut self, irq_line: bool, masked: bool) -> Option<InterruptKind> {
        if self.nmi_pending {
            self.nmi_pending = false;
            Some(InterruptKind::Nmi)
        } else if irq_line && !masked {
            Some(InterruptKind::Irq)
        } else {
            None
        }
    }

    /// Returns true if a WAI should end.
    pub(crate) fn wakes(&self, irq_line: bool) -> bool {
        self.nmi_pending || irq_line
    }

    /// Drops a latched NMI edge (reset). Line levels are left alone.
    pub(crate) fn clear_pending(&mut self) {
        self.nmi_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nmi_is_edge_triggered() {
        let mut lines = InterruptLines::default();
        lines.set_nmi(true);
        assert_eq!(lines.poll(false, true), Some(InterruptKind::Nmi));

        // Holding the line does not retrigger
        lines.set_nmi(true);
        assert_eq!(lines.poll(false, true), None);

        lines.set_nmi(false);
        lines.set_nmi(true);
        assert_eq!(lines.poll(false, true), Some(InterruptKind::Nmi));
    }

    #[test]
    fn test_nmi_survives_release_before_boundary() {
        let mut lines = InterruptLines::default();
        lines.set_nmi(true);
        lines.set_nmi(false);
        assert!(lines.wakes(false));
        assert_eq!(lines.poll(false, false), Some(InterruptKind::Nmi));
    }

    #[test]
    fn test_irq_masked_by_i_flag() {
        let mut lines = InterruptLines::default();
        lines.set_irq(true);
        assert_eq!(lines.poll(lines.irq(), true), None);
        assert_eq!(lines.poll(lines.irq(), false), Some(InterruptKind::Irq));
        // Level-sensitive: still active on the next boundary
        assert_eq!(lines.poll(lines.irq(), false), Some(InterruptKind::Irq));
    }

    #[test]
    fn test_nmi_has_priority() {
        let mut lines = InterruptLines::default();
        lines.set_irq(true);
        lines.set_nmi(true);
        assert_eq!(lines.poll(true, false), Some(InterruptKind::Nmi));
        assert_eq!(lines.poll(true, false), Some(InterruptKind::Irq));
    }

    #[test]
    fn test_masked_irq_still_wakes() {
        let lines = InterruptLines::default();
        assert!(!lines.wakes(false));
        assert!(lines.wakes(true));
    }
}
