use crate::cpu::Cpu;
use crate::exception::Exception;

/// Boundary between the CPU core and the simulated peripherals around it.
///
/// The executor calls these hooks synchronously while an instruction runs.
/// Every method has a default that models a bare chip with nothing attached,
/// so a host only overrides the hooks its peripherals care about. `()`
/// implements the trait with all defaults.
pub trait Peripherals {
    /// Advisory fault notification. The instruction that raised it still
    /// completes normally.
    fn except(&mut self, _cpu: &Cpu, _exception: Exception) {}

    /// Direct read of SFR `reg` (0x80..=0xFF).
    ///
    /// Not called for implicit accumulator/PSW accesses or for the latch
    /// reads of read-modify-write instructions. The default returns the
    /// stored byte.
    fn sfr_read(&mut self, cpu: &Cpu, reg: u8) -> u8 {
        cpu.mem.sfr(reg)
    }

    /// Called after SFR `reg` has been written. The new value is already in
    /// `cpu.mem`; peripherals may update other registers in response.
    fn sfr_write(&mut self, _cpu: &mut Cpu, _reg: u8) {}

    /// `MOVX` read from external data space.
    fn xdata_read(&mut self, cpu: &Cpu, addr: u16) -> u8 {
        cpu.mem.xdata(addr)
    }

    /// `MOVX` write to external data space.
    fn xdata_write(&mut self, cpu: &mut Cpu, addr: u16, value: u8) {
        cpu.mem.set_xdata(addr, value);
    }
}

impl Peripherals for () {}
