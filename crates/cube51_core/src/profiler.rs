/// Per code address execution statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProfileEntry {
    /// Cycles spent in instructions starting at this address.
    pub total_cycles: u64,
    /// Cycles between consecutive visits, summed.
    pub loop_cycles: u64,
    /// Cycle counter at the previous visit (0 if never visited).
    pub loop_prev: u64,
    /// Number of revisits.
    pub loop_hits: u64,
}

/// Observational cycle profiler. Never influences execution.
pub struct Profiler {
    entries: Vec<ProfileEntry>,
    total: u64,
}

impl Profiler {
    pub fn new(code_size: usize) -> Self {
        Self {
            entries: vec![ProfileEntry::default(); code_size],
            total: 0,
        }
    }

    pub fn clear(&mut self) {
        self.entries.fill(ProfileEntry::default());
        self.total = 0;
    }

    /// Account `cycles` to the instruction dispatched at `pc`.
    pub fn record(&mut self, pc: u16, cycles: u32) {
        self.total += cycles as u64;
        let index = pc as usize & (self.entries.len() - 1);
        let entry = &mut self.entries[index];
        entry.total_cycles += cycles as u64;
        if entry.loop_prev != 0 {
            entry.loop_cycles += self.total - entry.loop_prev;
            entry.loop_hits += 1;
        }
        entry.loop_prev = self.total;
    }

    /// Cycles dispatched since the profiler was created or cleared.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn entry(&self, pc: u16) -> &ProfileEntry {
        &self.entries[pc as usize & (self.entries.len() - 1)]
    }

    /// The `n` addresses with the most cycles, busiest first.
    pub fn hot_spots(&self, n: usize) -> Vec<(u16, ProfileEntry)> {
        let mut spots: Vec<(u16, ProfileEntry)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.total_cycles > 0)
            .map(|(addr, entry)| (addr as u16, *entry))
            .collect();
        spots.sort_by(|a, b| b.1.total_cycles.cmp(&a.1.total_cycles).then(a.0.cmp(&b.0)));
        spots.truncate(n);
        spots
    }
}
