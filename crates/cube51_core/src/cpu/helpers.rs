use super::Cpu;
use crate::config::Variant;
use crate::peripheral::Peripherals;
use crate::sfr::{self, Psw};

/// Byte address and mask of a bit address operand.
#[inline]
pub(super) fn bit_location(bit: u8) -> (u8, u8) {
    let byte = if bit < 0x80 {
        0x20 + (bit >> 3)
    } else {
        bit & 0xF8
    };
    (byte, 1 << (bit & 7))
}

/// Target of a relative branch taken from an instruction of `len` bytes.
#[inline]
pub(super) fn relative(pc: u16, len: u16, rel: u8) -> u16 {
    pc.wrapping_add(len).wrapping_add(rel as i8 as i16 as u16)
}

impl Cpu {
    #[inline]
    pub(super) fn carry(&self) -> bool {
        self.mem.sfr(sfr::PSW) & Psw::C.bits() != 0
    }

    #[inline]
    pub(super) fn set_carry(&mut self, value: bool) {
        self.set_psw_flag(Psw::C, value);
    }

    #[inline]
    pub(super) fn set_psw_flag(&mut self, flag: Psw, value: bool) {
        let mut psw = self.psw();
        psw.set(flag, value);
        self.set_psw(psw);
    }

    #[inline]
    pub(super) fn reg_addr(&self, n: u8) -> u8 {
        let bank = (self.mem.sfr(sfr::PSW) & (Psw::RS0 | Psw::RS1).bits()) >> 3;
        (n & 7) + 8 * bank
    }

    /// Address held in R0 or R1, selected by the low opcode bit.
    #[inline]
    pub(super) fn indirect_addr(&self, opcode: u8) -> u8 {
        self.reg(opcode & 1)
    }

    /// Read a direct address: lower RAM, or an SFR through the read hook.
    pub(super) fn read_direct(&mut self, io: &mut dyn Peripherals, addr: u8) -> u8 {
        if addr < 0x80 {
            self.mem.lower(addr)
        } else {
            io.sfr_read(self, addr)
        }
    }

    /// Write a direct address; SFR writes notify the write hook afterwards.
    pub(super) fn write_direct(&mut self, io: &mut dyn Peripherals, addr: u8, value: u8) {
        if addr < 0x80 {
            self.mem.set_lower(addr, value);
        } else {
            self.mem.set_sfr(addr, value);
            io.sfr_write(self, addr);
        }
    }

    /// Read-modify-write on a direct address. SFRs are modified from their
    /// latch value, not through the read hook.
    pub(super) fn modify_direct(
        &mut self,
        io: &mut dyn Peripherals,
        addr: u8,
        f: impl FnOnce(u8) -> u8,
    ) -> u8 {
        let old = if addr < 0x80 {
            self.mem.lower(addr)
        } else {
            self.mem.sfr(addr)
        };
        let new = f(old);
        self.write_direct(io, addr, new);
        new
    }

    /// Test a bit, going through the SFR read hook for SFR bits.
    pub(super) fn read_bit(&mut self, io: &mut dyn Peripherals, bit: u8) -> bool {
        let (byte, mask) = bit_location(bit);
        self.read_direct(io, byte) & mask != 0
    }

    /// Current latch value of a bit, without hooks.
    pub(super) fn latch_bit(&self, bit: u8) -> bool {
        let (byte, mask) = bit_location(bit);
        let value = if byte < 0x80 {
            self.mem.lower(byte)
        } else {
            self.mem.sfr(byte)
        };
        value & mask != 0
    }

    pub(super) fn write_bit(&mut self, io: &mut dyn Peripherals, bit: u8, value: bool) {
        let (byte, mask) = bit_location(bit);
        self.modify_direct(io, byte, |old| if value { old | mask } else { old & !mask });
    }

    /// DPL/DPH register pair of the active data pointer.
    #[inline]
    fn dptr_regs(&self) -> (u8, u8) {
        if self.config.variant == Variant::Nrf24le1 && self.mem.sfr(sfr::DPS) & 1 != 0 {
            (sfr::DPL1, sfr::DPH1)
        } else {
            (sfr::DPL, sfr::DPH)
        }
    }

    pub fn dptr(&self) -> u16 {
        let (lo, hi) = self.dptr_regs();
        u16::from_be_bytes([self.mem.sfr(hi), self.mem.sfr(lo)])
    }

    pub fn set_dptr(&mut self, value: u16) {
        let (lo, hi) = self.dptr_regs();
        let [h, l] = value.to_be_bytes();
        self.mem.set_sfr(hi, h);
        self.mem.set_sfr(lo, l);
    }

    /// External address used by `MOVX @Ri`.
    #[inline]
    pub(super) fn xdata_indirect_addr(&self, opcode: u8) -> u16 {
        let page = match self.config.variant {
            Variant::Nrf24le1 => self.mem.sfr(sfr::MPAGE),
            Variant::Classic => 0,
        };
        u16::from_be_bytes([page, self.indirect_addr(opcode)])
    }
}
