//! Address spaces owned by the CPU.
//!
//! Every accessor masks its address to the owning buffer, so callers never
//! have to range check. Hooks (SFR read/write, MOVX) are layered on top of
//! these raw accessors by the executor.

use crate::config::CpuConfig;

/// Value returned by indirect reads of 0x80..=0xFF when no upper data exists.
pub const BAD_VALUE: u8 = 0x77;

pub struct Memory {
    code: Vec<u8>,
    xdata: Vec<u8>,
    lower: [u8; 128],
    upper: Option<Box<[u8; 128]>>,
    sfr: [u8; 128],
}

impl Memory {
    /// Allocate buffers for an already validated configuration.
    pub(crate) fn new(config: &CpuConfig) -> Self {
        Self {
            code: vec![0; config.code_size],
            xdata: vec![0; config.xdata_size],
            lower: [0; 128],
            upper: config.upper_data.then(|| Box::new([0; 128])),
            sfr: [0; 128],
        }
    }

    /// Zero code, external data and internal RAM. SFRs are left alone.
    pub(crate) fn wipe(&mut self) {
        self.code.fill(0);
        self.xdata.fill(0);
        self.lower.fill(0);
        if let Some(upper) = self.upper.as_deref_mut() {
            upper.fill(0);
        }
    }

    pub(crate) fn clear_sfrs(&mut self) {
        self.sfr.fill(0);
    }

    #[inline]
    pub fn code_mask(&self) -> u16 {
        (self.code.len() - 1) as u16
    }

    #[inline]
    pub fn code(&self, addr: u16) -> u8 {
        self.code[(addr & self.code_mask()) as usize]
    }

    #[inline]
    pub fn set_code(&mut self, addr: u16, value: u8) {
        let mask = self.code_mask();
        self.code[(addr & mask) as usize] = value;
    }

    /// Copy `bytes` into code memory starting at `addr`, wrapping at the end.
    pub fn load_code(&mut self, addr: u16, bytes: &[u8]) {
        for (offset, &byte) in bytes.iter().enumerate() {
            self.set_code(addr.wrapping_add(offset as u16), byte);
        }
    }

    pub fn code_bytes(&self) -> &[u8] {
        &self.code
    }

    #[inline]
    pub fn xdata(&self, addr: u16) -> u8 {
        if self.xdata.is_empty() {
            return 0;
        }
        self.xdata[addr as usize & (self.xdata.len() - 1)]
    }

    #[inline]
    pub fn set_xdata(&mut self, addr: u16, value: u8) {
        if self.xdata.is_empty() {
            return;
        }
        let len = self.xdata.len();
        self.xdata[addr as usize & (len - 1)] = value;
    }

    pub fn xdata_bytes(&self) -> &[u8] {
        &self.xdata
    }

    #[inline]
    pub fn lower(&self, addr: u8) -> u8 {
        self.lower[(addr & 0x7F) as usize]
    }

    #[inline]
    pub fn set_lower(&mut self, addr: u8, value: u8) {
        self.lower[(addr & 0x7F) as usize] = value;
    }

    pub fn has_upper(&self) -> bool {
        self.upper.is_some()
    }

    /// Upper data byte for `addr` in 0x80..=0xFF, if upper data exists.
    #[inline]
    pub fn upper(&self, addr: u8) -> Option<u8> {
        self.upper.as_ref().map(|upper| upper[(addr & 0x7F) as usize])
    }

    /// Returns false when there is no upper data and the write was dropped.
    #[inline]
    pub fn set_upper(&mut self, addr: u8, value: u8) -> bool {
        match self.upper.as_deref_mut() {
            Some(upper) => {
                upper[(addr & 0x7F) as usize] = value;
                true
            }
            None => false,
        }
    }

    /// Indirect (`@Ri`) read: lower RAM, upper RAM, or [`BAD_VALUE`].
    #[inline]
    pub fn indirect(&self, addr: u8) -> u8 {
        if addr < 0x80 {
            self.lower(addr)
        } else {
            self.upper(addr).unwrap_or(BAD_VALUE)
        }
    }

    #[inline]
    pub fn set_indirect(&mut self, addr: u8, value: u8) {
        if addr < 0x80 {
            self.set_lower(addr, value);
        } else {
            self.set_upper(addr, value);
        }
    }

    /// Raw SFR latch at direct address `reg` (0x80..=0xFF).
    #[inline]
    pub fn sfr(&self, reg: u8) -> u8 {
        self.sfr[(reg & 0x7F) as usize]
    }

    #[inline]
    pub fn set_sfr(&mut self, reg: u8, value: u8) {
        self.sfr[(reg & 0x7F) as usize] = value;
    }

    #[inline]
    pub fn sfr_mut(&mut self, reg: u8) -> &mut u8 {
        &mut self.sfr[(reg & 0x7F) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_addresses_wrap_to_buffer_size() {
        let config = CpuConfig::builder().code_size(1024).build();
        let mut mem = Memory::new(&config);
        mem.set_code(0x0400, 0xAB);
        assert_eq!(mem.code(0x0000), 0xAB);
        mem.load_code(0x03FF, &[1, 2]);
        assert_eq!(mem.code(0x03FF), 1);
        assert_eq!(mem.code(0x0000), 2);
    }

    #[test]
    fn missing_upper_data_reads_sentinel_and_drops_writes() {
        let config = CpuConfig::builder().upper_data(false).build();
        let mut mem = Memory::new(&config);
        assert!(!mem.has_upper());
        mem.set_indirect(0x90, 0x12);
        assert_eq!(mem.indirect(0x90), BAD_VALUE);
        mem.set_indirect(0x10, 0x34);
        assert_eq!(mem.indirect(0x10), 0x34);
    }

    #[test]
    fn empty_xdata_reads_zero() {
        let config = CpuConfig::builder().xdata_size(0).build();
        let mut mem = Memory::new(&config);
        mem.set_xdata(0x10, 0x55);
        assert_eq!(mem.xdata(0x10), 0);
    }
}
