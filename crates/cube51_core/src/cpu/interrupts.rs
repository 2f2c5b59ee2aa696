//! Priority-based interrupt controller.
//!
//! Arbitration polls request bits that the timers and peripherals leave in
//! SFRs; nothing calls into the controller directly. At most one interrupt
//! is accepted per arbitration, and only if it outranks the innermost
//! active handler.
mod sources;

use super::Cpu;
use crate::config::{RetiChecks, Variant};
use crate::exception::Exception;
use crate::peripheral::Peripherals;
use crate::sfr::{self, Ien0, Psw, Tcon};

use sources::IrqSource;

const MAX_LEVELS: usize = 4;

/// State captured when a handler is entered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IrqLevel {
    pub vector: u16,
    pub priority: u8,
    pub acc: u8,
    pub psw: u8,
    pub sp: u8,
}

#[derive(Default)]
pub(super) struct IrqState {
    pub(super) depth: usize,
    pub(super) levels: [IrqLevel; MAX_LEVELS],
    /// Last sampled level of the interrupt-from-pin input.
    ifp: bool,
}

impl Cpu {
    /// Try to enter at most one pending interrupt.
    pub(super) fn handle_interrupts(&mut self, io: &mut dyn Peripherals) {
        let table: &[IrqSource] = match self.config.variant {
            Variant::Nrf24le1 => {
                self.sample_ifp();
                &sources::NRF24LE1
            }
            Variant::Classic => &sources::CLASSIC,
        };

        if self.mem.sfr(sfr::IEN0) & Ien0::EN.bits() == 0 {
            return;
        }

        let mut found: Option<(&IrqSource, u8)> = None;
        for source in table {
            let enabled = self.mem.sfr(source.enable_reg) & source.enable_mask != 0;
            let requested = self.mem.sfr(source.request_reg) & source.request_mask != 0;
            if !(enabled && requested) {
                continue;
            }
            let priority = self.irq_priority(source.enable_mask);
            // Strictly greater: the first source found wins a tie.
            if found.map_or(true, |(_, best)| priority > best) {
                found = Some((source, priority));
            }
        }

        if let Some((source, priority)) = found {
            if self.irq_invoke(io, priority, source.vector()) {
                *self.mem.sfr_mut(source.request_reg) &= !source.autoclear;
            }
        }
    }

    fn irq_priority(&self, mask: u8) -> u8 {
        match self.config.variant {
            Variant::Nrf24le1 => {
                let high = self.mem.sfr(sfr::IP1) & mask != 0;
                let low = self.mem.sfr(sfr::IP0) & mask != 0;
                ((high as u8) << 1) | low as u8
            }
            Variant::Classic => (self.mem.sfr(sfr::IP) & mask != 0) as u8,
        }
    }

    /// Enter the handler at `vector` unless an equal or higher priority
    /// handler is already running. Returns whether the call happened.
    fn irq_invoke(&mut self, io: &mut dyn Peripherals, priority: u8, vector: u16) -> bool {
        let depth = self.irq.depth;
        if depth > 0 && priority <= self.irq.levels[depth - 1].priority {
            return false;
        }
        if depth >= self.config.variant.max_irq_depth() {
            return false;
        }

        let pc = self.pc;
        self.push_pc(io, pc);
        self.pc = vector;
        self.tick_delay += self.config.variant.irq_latency();

        self.irq.levels[depth] = IrqLevel {
            vector,
            priority,
            acc: self.acc(),
            psw: self.mem.sfr(sfr::PSW),
            sp: self.sp(),
        };
        self.irq.depth = depth + 1;

        log::debug!(
            "8051 interrupt: vector=0x{vector:04X} priority={priority} depth={depth} return=0x{pc:04X}",
            depth = depth + 1,
        );
        true
    }

    /// Leave the innermost handler (RETI) and run the enabled consistency
    /// checks. Mismatches are reported but never block the return.
    pub(super) fn irq_return(&mut self, io: &mut dyn Peripherals) {
        if self.irq.depth == 0 {
            return;
        }
        self.irq.depth -= 1;
        let level = self.irq.levels[self.irq.depth];
        let checks = self.config.reti_checks;

        if checks.contains(RetiChecks::ACC) && level.acc != self.acc() {
            io.except(self, Exception::IretAccMismatch);
        }
        if checks.contains(RetiChecks::SP) && level.sp != self.sp() {
            io.except(self, Exception::IretSpMismatch);
        }
        let mask = Psw::RETI_MASK.bits();
        if checks.contains(RetiChecks::PSW) && (level.psw ^ self.mem.sfr(sfr::PSW)) & mask != 0 {
            io.except(self, Exception::IretPswMismatch);
        }

        log::debug!(
            "8051 reti: vector=0x{:04X} depth={}",
            level.vector,
            self.irq.depth
        );
    }

    /// Latch external interrupt 0 from the GPIO selected by INTEXP.
    ///
    /// TCON.IT0 selects falling-edge or low-level triggering. With no pin
    /// selected the input reads low.
    fn sample_ifp(&mut self) {
        let p1 = self.mem.sfr(sfr::P1);
        let pin = match self.mem.sfr(sfr::INTEXP) & 0x38 {
            0x08 => p1 & 0x04 != 0,
            0x10 => p1 & 0x08 != 0,
            0x20 => p1 & 0x10 != 0,
            _ => false,
        };

        let tcon = Tcon::from_bits_retain(self.mem.sfr(sfr::TCON));
        let request = if tcon.contains(Tcon::IT0) {
            self.irq.ifp && !pin
        } else {
            !pin
        };
        if request {
            self.mem.set_sfr(sfr::TCON, (tcon | Tcon::IE0).bits());
        }
        self.irq.ifp = pin;
    }
}
