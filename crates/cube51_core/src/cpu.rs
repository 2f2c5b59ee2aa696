//! The 8051 CPU: register file views, dispatch tables and the tick loop.
//!
//! `Cpu` is split across several files in the same way the instruction set
//! is: `exec/*` holds the opcode handlers, `decode` the disassembler,
//! `interrupts` and `timer` the two engines that run alongside instruction
//! dispatch, and `step` the per-tick orchestration that ties them together.
mod alu;
mod decode;
mod exec;
mod helpers;
mod interrupts;
mod stack;
mod step;
mod timer;

#[cfg(test)]
mod tests;

use crate::config::CpuConfig;
use crate::error::ConfigError;
use crate::memory::Memory;
use crate::peripheral::Peripherals;
use crate::profiler::Profiler;
use crate::sfr::{self, Psw};

pub use decode::Decoded;
pub use interrupts::IrqLevel;

/// Opcode handler: runs one instruction whose bytes are `opcode, op1, op2`
/// and returns its cycle cost. Handlers advance `pc` themselves.
pub(crate) type ExecFn = fn(&mut Cpu, &mut dyn Peripherals, u8, u8, u8) -> u32;

/// Disassembler entry: renders the instruction at the given address.
pub(crate) type DecodeFn = fn(&Memory, u16) -> Decoded;

pub struct Cpu {
    pub mem: Memory,
    pub pc: u16,
    /// Address of the most recently dispatched instruction.
    pub previous_pc: u16,
    /// Ticks left before the next instruction may dispatch.
    pub tick_delay: u32,
    /// Raise [`Exception::Break`](crate::Exception::Break) when an
    /// instruction lands here.
    pub breakpoint: Option<u16>,
    pub profiler: Option<Profiler>,
    config: CpuConfig,
    irq: interrupts::IrqState,
    timer: timer::TimerState,
    exec_table: [ExecFn; 256],
    decode_table: [DecodeFn; 256],
}

impl Cpu {
    /// Build a CPU for `config` and put it into the reset state.
    pub fn new(config: CpuConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let profiler = config.profile.then(|| Profiler::new(config.code_size));
        let mut cpu = Self {
            mem: Memory::new(&config),
            pc: 0,
            previous_pc: 0,
            tick_delay: 0,
            breakpoint: None,
            profiler,
            config,
            irq: interrupts::IrqState::default(),
            timer: timer::TimerState::default(),
            exec_table: *exec::EXEC_TABLE,
            decode_table: *decode::DECODE_TABLE,
        };
        cpu.reset(true);
        Ok(cpu)
    }

    /// Return to the power-on state.
    ///
    /// SFRs are always cleared; `wipe` additionally zeroes code, external
    /// and internal RAM.
    pub fn reset(&mut self, wipe: bool) {
        if wipe {
            self.mem.wipe();
        }
        self.mem.clear_sfrs();

        self.pc = 0;
        self.previous_pc = 0;
        self.tick_delay = 0;
        self.mem.set_sfr(sfr::SP, 0x07);
        for port in [sfr::P0, sfr::P1, sfr::P2, sfr::P3] {
            self.mem.set_sfr(port, 0xFF);
        }

        self.exec_table = *exec::EXEC_TABLE;
        self.decode_table = *decode::DECODE_TABLE;

        self.irq = interrupts::IrqState::default();
        self.timer = timer::TimerState::default();
        if let Some(profiler) = self.profiler.as_mut() {
            profiler.clear();
        }
    }

    pub fn config(&self) -> &CpuConfig {
        &self.config
    }

    /// Disassemble the instruction at `position`. Reads code memory only.
    pub fn decode(&self, position: u16) -> Decoded {
        let opcode = self.mem.code(position);
        (self.decode_table[opcode as usize])(&self.mem, position)
    }

    #[inline]
    pub fn acc(&self) -> u8 {
        self.mem.sfr(sfr::ACC)
    }

    #[inline]
    pub fn set_acc(&mut self, value: u8) {
        self.mem.set_sfr(sfr::ACC, value);
    }

    #[inline]
    pub fn b(&self) -> u8 {
        self.mem.sfr(sfr::B)
    }

    #[inline]
    pub fn psw(&self) -> Psw {
        Psw::from_bits_retain(self.mem.sfr(sfr::PSW))
    }

    #[inline]
    pub fn set_psw(&mut self, psw: Psw) {
        self.mem.set_sfr(sfr::PSW, psw.bits());
    }

    #[inline]
    pub fn sp(&self) -> u8 {
        self.mem.sfr(sfr::SP)
    }

    /// Current register bank R0..R7 (`n` is masked to 0..=7).
    #[inline]
    pub fn reg(&self, n: u8) -> u8 {
        self.mem.lower(self.reg_addr(n))
    }

    #[inline]
    pub fn set_reg(&mut self, n: u8, value: u8) {
        let addr = self.reg_addr(n);
        self.mem.set_lower(addr, value);
    }

    /// Number of interrupt handlers currently active.
    pub fn irq_depth(&self) -> usize {
        self.irq.depth
    }

    /// Snapshots of the active handlers, outermost first.
    pub fn irq_levels(&self) -> &[IrqLevel] {
        &self.irq.levels[..self.irq.depth]
    }
}
