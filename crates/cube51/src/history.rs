use std::collections::VecDeque;

use cube51_core::Cpu;

/// Register state right after an instruction dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub pc: u16,
    pub acc: u8,
    pub psw: u8,
    pub sp: u8,
    pub dptr: u16,
}

impl HistoryEntry {
    /// Snapshot the instruction at `cpu.previous_pc` and the registers it left.
    pub fn capture(cpu: &Cpu) -> Self {
        Self {
            pc: cpu.previous_pc,
            acc: cpu.acc(),
            psw: cpu.psw().bits(),
            sp: cpu.sp(),
            dptr: cpu.dptr(),
        }
    }
}

/// The most recently dispatched instructions.
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> + '_ {
        self.entries.iter()
    }

    /// One line per entry, disassembled against current code memory.
    pub fn render(&self, cpu: &Cpu) -> Vec<String> {
        self.iter()
            .map(|entry| {
                format!(
                    "{:04X}  {:<24} A={:02X} PSW={:02X} SP={:02X} DPTR={:04X}",
                    entry.pc,
                    cpu.decode(entry.pc).text,
                    entry.acc,
                    entry.psw,
                    entry.sp,
                    entry.dptr
                )
            })
            .collect()
    }
}
