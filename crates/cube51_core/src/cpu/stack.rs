use super::Cpu;
use crate::exception::Exception;
use crate::memory::BAD_VALUE;
use crate::peripheral::Peripherals;
use crate::sfr;

impl Cpu {
    /// Increment SP, then store. Addresses above 0x7F need upper data.
    pub(super) fn push(&mut self, io: &mut dyn Peripherals, value: u8) {
        let sp = self.sp().wrapping_add(1);
        self.mem.set_sfr(sfr::SP, sp);

        if sp > 0x7F {
            if !self.mem.set_upper(sp, value) {
                io.except(self, Exception::Stack);
            }
        } else {
            self.mem.set_lower(sp, value);
        }

        if sp == 0 {
            io.except(self, Exception::Stack);
        }
    }

    /// Load, then decrement SP.
    pub(super) fn pop(&mut self, io: &mut dyn Peripherals) -> u8 {
        let sp = self.sp();
        let value = if sp > 0x7F {
            match self.mem.upper(sp) {
                Some(value) => value,
                None => {
                    io.except(self, Exception::Stack);
                    BAD_VALUE
                }
            }
        } else {
            self.mem.lower(sp)
        };

        let sp = sp.wrapping_sub(1);
        self.mem.set_sfr(sfr::SP, sp);
        if sp == 0xFF {
            io.except(self, Exception::Stack);
        }
        value
    }

    /// Push a return address: low byte first, so the high byte ends on top.
    pub(super) fn push_pc(&mut self, io: &mut dyn Peripherals, addr: u16) {
        let [hi, lo] = addr.to_be_bytes();
        self.push(io, lo);
        self.push(io, hi);
    }

    pub(super) fn pop_pc(&mut self, io: &mut dyn Peripherals) -> u16 {
        let hi = self.pop(io);
        let lo = self.pop(io);
        u16::from_be_bytes([hi, lo])
    }
}
