use bitflags::bitflags;
use typed_builder::TypedBuilder;

use crate::error::ConfigError;
use crate::sfr;

/// Which interrupt controller and addressing extras the core models.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Variant {
    /// nRF24LE1: table-driven 2-bit priorities, four nesting levels, MPAGE
    /// for `MOVX @Ri` and a second data pointer selected by DPS.
    #[default]
    Nrf24le1,
    /// Plain 8051: one priority bit, two nesting levels, single DPTR.
    Classic,
}

impl Variant {
    /// Cycles added to the tick delay when an interrupt is taken.
    pub fn irq_latency(self) -> u32 {
        match self {
            Variant::Nrf24le1 => 6,
            Variant::Classic => 2,
        }
    }

    /// Maximum number of simultaneously active handlers.
    pub fn max_irq_depth(self) -> usize {
        match self {
            Variant::Nrf24le1 => 4,
            Variant::Classic => 2,
        }
    }
}

bitflags! {
    /// Register snapshots that RETI compares against interrupt entry.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct RetiChecks: u8 {
        const ACC = 0x01;
        const SP = 0x02;
        const PSW = 0x04;
    }
}

/// Port and pin masks sampled for counter-mode timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterInputs {
    pub port: u8,
    pub t0: u8,
    pub t1: u8,
    pub t2: u8,
}

impl Default for CounterInputs {
    fn default() -> Self {
        Self {
            port: sfr::P0,
            t0: 0x20,
            t1: 0x40,
            t2: 0x80,
        }
    }
}

#[derive(Clone, Debug, TypedBuilder)]
pub struct CpuConfig {
    #[builder(default = 16 * 1024)]
    pub code_size: usize,
    #[builder(default = 1024)]
    pub xdata_size: usize,
    /// Whether indirect addresses 0x80..=0xFF are backed by RAM.
    #[builder(default = true)]
    pub upper_data: bool,
    #[builder(default)]
    pub variant: Variant,
    #[builder(default = RetiChecks::all())]
    pub reti_checks: RetiChecks,
    /// Ticks per timer count in timer (not counter) mode.
    #[builder(default = 1)]
    pub timer_prescaler: u32,
    #[builder(default)]
    pub counter_inputs: CounterInputs,
    /// Collect per-address cycle statistics.
    #[builder(default = false)]
    pub profile: bool,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CpuConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.code_size.is_power_of_two() || !(1024..=0x10000).contains(&self.code_size) {
            return Err(ConfigError::CodeSize(self.code_size));
        }
        if self.xdata_size != 0
            && (!self.xdata_size.is_power_of_two() || self.xdata_size > 0x10000)
        {
            return Err(ConfigError::XdataSize(self.xdata_size));
        }
        if self.timer_prescaler == 0 {
            return Err(ConfigError::Prescaler);
        }
        Ok(())
    }
}
