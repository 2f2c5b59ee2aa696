//! Instruction-level core for the nRF24LE1 flavour of the 8051.
//!
//! The crate owns the CPU state and its address spaces. Everything outside
//! the chip (radio, flash, display, debuggers) plugs in through
//! [`Peripherals`].
pub mod config;
pub mod cpu;
pub mod error;
pub mod exception;
pub mod hex;
pub mod memory;
pub mod peripheral;
pub mod profiler;
pub mod sfr;

pub use config::{CounterInputs, CpuConfig, RetiChecks, Variant};
pub use cpu::{Cpu, Decoded, IrqLevel};
pub use error::{ConfigError, HexError};
pub use exception::Exception;
pub use memory::Memory;
pub use peripheral::Peripherals;
pub use profiler::{ProfileEntry, Profiler};
