use super::Cpu;
use crate::exception::Exception;
use crate::peripheral::Peripherals;

impl Cpu {
    /// Advance the machine by one tick (12 oscillator clocks).
    ///
    /// While an instruction's cycles are still being paid off the tick only
    /// counts down. Once the delay has run out, interrupts are arbitrated
    /// and, unless one was just entered, the next instruction dispatches.
    /// The timers run on every tick either way.
    ///
    /// The first tick from an idle delay dispatches, so N ticks of a uniform
    /// C-cycle instruction stream dispatch `ceil(N / C)` instructions; that
    /// is `N / C` only when C divides N.
    ///
    /// Returns whether an instruction was dispatched.
    pub fn tick(&mut self, io: &mut dyn Peripherals) -> bool {
        let mut dispatched = false;

        if self.tick_delay > 0 {
            self.tick_delay -= 1;
        } else {
            self.handle_interrupts(io);

            // Entering an interrupt charges its latency before the first
            // handler instruction.
            if self.tick_delay == 0 {
                let pc = self.pc;
                let cycles = self.execute(io);
                self.previous_pc = pc;
                self.tick_delay = cycles.saturating_sub(1);
                self.update_parity();
                dispatched = true;

                if let Some(profiler) = self.profiler.as_mut() {
                    profiler.record(pc, cycles);
                }
                if self.breakpoint == Some(self.pc) {
                    io.except(self, Exception::Break);
                }
            }
        }

        self.timer_tick();
        dispatched
    }

    /// Run ticks until one instruction has dispatched. Returns the number of
    /// ticks consumed.
    pub fn step_instruction(&mut self, io: &mut dyn Peripherals) -> u32 {
        let mut ticks = 1;
        while !self.tick(io) {
            ticks += 1;
        }
        ticks
    }
}
