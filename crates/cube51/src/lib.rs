//! Headless runner: loads an Intel HEX image and ticks the core.
pub mod history;
pub mod host;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use cube51_core::{Cpu, CpuConfig, Exception, Variant};
use typed_builder::TypedBuilder;

use history::{History, HistoryEntry};
use host::{default_policies, Host};

#[derive(Clone, Debug, TypedBuilder)]
pub struct RunOptions {
    /// Stop after this many ticks.
    #[builder(default = 1_000_000)]
    pub ticks: u64,
    #[builder(default)]
    pub variant: Variant,
    #[builder(default = false)]
    pub profile: bool,
    #[builder(default, setter(strip_option))]
    pub breakpoint: Option<u16>,
    /// Log every dispatched instruction at trace level.
    #[builder(default = false)]
    pub trace: bool,
    /// Log exceptions instead of stopping on them (breakpoints still stop).
    #[builder(default = false)]
    pub keep_going: bool,
    /// Instructions kept for the post-mortem listing.
    #[builder(default = 16)]
    pub history: usize,
}

#[derive(Debug)]
pub struct RunReport {
    pub ticks: u64,
    pub instructions: u64,
    /// The exception that ended the run early, if any.
    pub stopped: Option<Exception>,
}

pub fn run(path: &Path, options: RunOptions) -> Result<RunReport> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    run_reader(BufReader::new(file), options)
}

/// Run an image read from `reader`.
pub fn run_reader<R: BufRead>(reader: R, options: RunOptions) -> Result<RunReport> {
    let config = CpuConfig::builder()
        .variant(options.variant)
        .profile(options.profile)
        .build();
    let mut cpu = Cpu::new(config)?;
    cpu.load_hex(reader).context("failed to load firmware")?;
    cpu.breakpoint = options.breakpoint;

    let mut host = Host::new(default_policies(options.keep_going));
    let mut history = History::new(options.history);
    let mut report = RunReport {
        ticks: 0,
        instructions: 0,
        stopped: None,
    };

    while report.ticks < options.ticks {
        report.ticks += 1;
        if cpu.tick(&mut host) {
            report.instructions += 1;
            history.push(HistoryEntry::capture(&cpu));
            if options.trace {
                log::trace!(
                    "{:04X}  {}",
                    cpu.previous_pc,
                    cpu.decode(cpu.previous_pc).text
                );
            }
        }
        if let Some(exception) = host.stopped() {
            report.stopped = Some(exception);
            break;
        }
    }

    log::info!(
        "ran {} ticks, {} instructions, pc=0x{:04X}",
        report.ticks,
        report.instructions,
        cpu.pc
    );
    for (exception, count) in host.counts() {
        log::info!("{exception:?}: {count}");
    }
    if report.stopped.is_some() && !history.is_empty() {
        log::info!("last {} instructions:", history.len());
        for line in history.render(&cpu) {
            log::info!("  {line}");
        }
    }
    if let Some(profiler) = cpu.profiler.as_ref() {
        log::info!("profile: {} cycles", profiler.total());
        for (pc, entry) in profiler.hot_spots(10) {
            log::info!(
                "  {pc:04X}  {:>10} cycles  {:>8} loops  {}",
                entry.total_cycles,
                entry.loop_hits,
                cpu.decode(pc).text
            );
        }
    }

    Ok(report)
}
