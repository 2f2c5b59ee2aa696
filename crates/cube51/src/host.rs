use std::collections::{BTreeMap, HashMap};

use cube51_core::{Cpu, Exception, Peripherals};

/// What the host does when the core reports an [`Exception`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExceptionPolicy {
    /// Stop the run after the current tick.
    Fatal,
    Log,
    Ignore,
}

/// Policies used by the runner. Breakpoints always stop; with
/// `keep_going` every other kind is only logged.
pub fn default_policies(keep_going: bool) -> HashMap<Exception, ExceptionPolicy> {
    Exception::ALL
        .iter()
        .map(|&exception| {
            let policy = match exception {
                Exception::Break => ExceptionPolicy::Fatal,
                _ if keep_going => ExceptionPolicy::Log,
                Exception::Stack | Exception::AccToA | Exception::IllegalOpcode => {
                    ExceptionPolicy::Fatal
                }
                _ => ExceptionPolicy::Log,
            };
            (exception, policy)
        })
        .collect()
}

/// The board around the CPU. Nothing is wired to the SFR or external
/// memory hooks yet, so those keep their bare-chip defaults.
pub struct Host {
    policies: HashMap<Exception, ExceptionPolicy>,
    counts: BTreeMap<Exception, u64>,
    stopped: Option<Exception>,
}

impl Host {
    pub fn new(policies: HashMap<Exception, ExceptionPolicy>) -> Self {
        Self {
            policies,
            counts: BTreeMap::new(),
            stopped: None,
        }
    }

    pub fn policy(&self, exception: Exception) -> ExceptionPolicy {
        self.policies
            .get(&exception)
            .copied()
            .unwrap_or(ExceptionPolicy::Log)
    }

    /// First fatal exception seen, if any.
    pub fn stopped(&self) -> Option<Exception> {
        self.stopped
    }

    /// How many times each kind has been raised.
    pub fn counts(&self) -> &BTreeMap<Exception, u64> {
        &self.counts
    }
}

impl Peripherals for Host {
    fn except(&mut self, cpu: &Cpu, exception: Exception) {
        *self.counts.entry(exception).or_default() += 1;

        match self.policy(exception) {
            ExceptionPolicy::Fatal => {
                log::error!("{exception} (pc=0x{:04X})", cpu.previous_pc);
                self.stopped.get_or_insert(exception);
            }
            ExceptionPolicy::Log => {
                log::warn!("{exception} (pc=0x{:04X})", cpu.previous_pc);
            }
            ExceptionPolicy::Ignore => {}
        }
    }
}
