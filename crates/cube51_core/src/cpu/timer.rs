//! Timer/counter 0, 1 and 2.
//!
//! The engine runs once per tick regardless of instruction dispatch. In
//! timer mode a counter advances once per `timer_prescaler` ticks; in
//! counter mode (C/T set) it advances on falling edges of its input pin.
//! Overflows only set flag bits; the interrupt controller picks them up on a
//! later arbitration.

use super::Cpu;
use crate::config::Variant;
use crate::sfr::{self, Ircon, Tcon, Tmod};

#[derive(Default)]
pub(super) struct TimerState {
    prescaler: u32,
    /// Extra /2 stage for timer 2.
    half: bool,
    /// Last sampled counter input pins.
    pins: u8,
}

/// Clock events seen by the timers during one tick.
#[derive(Clone, Copy)]
struct Clocks {
    tick: bool,
    half_tick: bool,
    /// Counter pins (T0/T1/T2 masks) that went from high to low.
    falling: u8,
    /// Current level of the counter pins.
    level: u8,
}

/// Increment an 8-bit register and report the carry out.
#[inline]
fn bump(value: &mut u8) -> bool {
    let (next, carry) = value.overflowing_add(1);
    *value = next;
    carry
}

impl Cpu {
    pub(super) fn timer_tick(&mut self) {
        let clocks = self.timer_clocks();
        if !clocks.tick && clocks.falling == 0 {
            return;
        }

        let tmod = Tmod::from_bits_retain(self.mem.sfr(sfr::TMOD));
        let inputs = self.config.counter_inputs;

        let run0 = self.timer_increment(tmod, Tmod::GATE_0, Tmod::CT_0, Tcon::TR0, inputs.t0, clocks);
        let run1 = self.timer_increment(tmod, Tmod::GATE_1, Tmod::CT_1, Tcon::TR1, inputs.t1, clocks);

        let mode0 = tmod.bits() & 0x03;
        let mode1 = (tmod.bits() >> 4) & 0x03;

        if mode0 == 3 {
            // Split mode: TL0 runs from timer 0's controls, TH0 is a plain
            // machine-cycle timer on TR1 and owns TF1.
            if run0 && bump(self.mem.sfr_mut(sfr::TL0)) {
                self.set_tcon(Tcon::TF0);
            }
            let tcon = Tcon::from_bits_retain(self.mem.sfr(sfr::TCON));
            if clocks.tick && tcon.contains(Tcon::TR1) && bump(self.mem.sfr_mut(sfr::TH0)) {
                self.set_tcon(Tcon::TF1);
            }
        } else if run0 && self.count(mode0, sfr::TL0, sfr::TH0) {
            self.set_tcon(Tcon::TF0);
        }

        // Timer 1 keeps counting while timer 0 is split, but its overflow no
        // longer reaches TF1. Mode 3 stops timer 1.
        if run1 && mode1 != 3 && self.count(mode1, sfr::TL1, sfr::TH1) && mode0 != 3 {
            self.set_tcon(Tcon::TF1);
        }

        // The nRF T2CON layout is not the 8052 one.
        if self.config.variant == Variant::Nrf24le1 {
            self.timer2_tick(clocks);
        }
    }

    fn timer_clocks(&mut self) -> Clocks {
        self.timer.prescaler += 1;
        let tick = self.timer.prescaler >= self.config.timer_prescaler;
        if tick {
            self.timer.prescaler = 0;
        }
        let mut half_tick = false;
        if tick {
            half_tick = self.timer.half;
            self.timer.half = !self.timer.half;
        }

        let inputs = self.config.counter_inputs;
        let level = self.mem.sfr(inputs.port) & (inputs.t0 | inputs.t1 | inputs.t2);
        let falling = self.timer.pins & !level;
        self.timer.pins = level;

        Clocks {
            tick,
            half_tick,
            falling,
            level,
        }
    }

    /// Whether a timer/counter with the given control bits counts this tick.
    fn timer_increment(
        &self,
        tmod: Tmod,
        gate: Tmod,
        counter: Tmod,
        run: Tcon,
        pin: u8,
        clocks: Clocks,
    ) -> bool {
        let tcon = Tcon::from_bits_retain(self.mem.sfr(sfr::TCON));
        // TODO: GATE set should let the INTx pin enable counting.
        if tmod.contains(gate) || !tcon.contains(run) {
            return false;
        }
        if tmod.contains(counter) {
            clocks.falling & pin != 0
        } else {
            clocks.tick
        }
    }

    /// Advance a TL/TH pair in mode 0, 1 or 2. Returns true on overflow.
    fn count(&mut self, mode: u8, tl: u8, th: u8) -> bool {
        match mode {
            // 13 bits: the low 5 bits of TL prescale TH.
            0 => {
                let low = self.mem.sfr(tl);
                let next = (low & 0x1F) + 1;
                self.mem.set_sfr(tl, (low & !0x1F) | (next & 0x1F));
                next > 0x1F && bump(self.mem.sfr_mut(th))
            }
            1 => bump(self.mem.sfr_mut(tl)) && bump(self.mem.sfr_mut(th)),
            // 8-bit auto-reload from TH.
            2 => {
                if bump(self.mem.sfr_mut(tl)) {
                    let reload = self.mem.sfr(th);
                    self.mem.set_sfr(tl, reload);
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    fn set_tcon(&mut self, flag: Tcon) {
        *self.mem.sfr_mut(sfr::TCON) |= flag.bits();
    }

    /// nRF24LE1 timer 2: 16-bit up counter with optional reload from
    /// CRCH:CRCL, overflowing into IRCON.TF2.
    fn timer2_tick(&mut self, clocks: Clocks) {
        let t2con = self.mem.sfr(sfr::T2CON);
        let clock = if t2con & 0x80 != 0 {
            clocks.half_tick
        } else {
            clocks.tick
        };
        let pin = self.config.counter_inputs.t2;
        let increment = match t2con & 0x03 {
            0 => false,
            1 => clock,
            2 => clocks.falling & pin != 0,
            _ => clock && clocks.level & pin != 0,
        };
        if !increment {
            return;
        }

        if bump(self.mem.sfr_mut(sfr::TL2)) && bump(self.mem.sfr_mut(sfr::TH2)) {
            // Reload mode 0; reload mode 1 (T2EX triggered) is not modelled.
            if t2con & 0x18 == 0x10 {
                let (low, high) = (self.mem.sfr(sfr::CRCL), self.mem.sfr(sfr::CRCH));
                self.mem.set_sfr(sfr::TL2, low);
                self.mem.set_sfr(sfr::TH2, high);
            }
            *self.mem.sfr_mut(sfr::IRCON) |= Ircon::TF2.bits();
        }
    }
}
