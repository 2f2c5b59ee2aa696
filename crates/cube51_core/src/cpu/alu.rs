use super::Cpu;
use crate::sfr::Psw;

impl Cpu {
    /// Set C, AC and OV for `a + b + carry_in`.
    ///
    /// C is the carry out of bit 7, AC the carry out of bit 3 and OV the
    /// XOR of the carries out of bits 6 and 7. Shared by ADD and ADDC.
    pub(super) fn add_flags(&mut self, a: u8, b: u8, carry_in: u8) {
        let carry = (a as u16 + b as u16 + carry_in as u16) > 0xFF;
        let aux = (a & 0x0F) + (b & 0x0F) + carry_in > 0x0F;
        let carry6 = (a & 0x7F) + (b & 0x7F) + carry_in > 0x7F;

        let mut psw = self.psw();
        psw.set(Psw::C, carry);
        psw.set(Psw::AC, aux);
        psw.set(Psw::OV, carry ^ carry6);
        self.set_psw(psw);
    }

    /// Set C, AC and OV for `a - b - borrow_in` (SUBB).
    pub(super) fn sub_flags(&mut self, a: u8, b: u8, borrow_in: u8) {
        let borrow = (a as i16) - (b as i16) - (borrow_in as i16) < 0;
        let aux = ((a & 0x0F) as i16) - ((b & 0x0F) as i16) - (borrow_in as i16) < 0;
        let borrow6 = ((a & 0x7F) as i16) - ((b & 0x7F) as i16) - (borrow_in as i16) < 0;

        let mut psw = self.psw();
        psw.set(Psw::C, borrow);
        psw.set(Psw::AC, aux);
        psw.set(Psw::OV, borrow ^ borrow6);
        self.set_psw(psw);
    }

    /// ADD / ADDC into the accumulator.
    pub(super) fn alu_add(&mut self, value: u8, use_carry: bool) {
        let a = self.acc();
        let carry_in = (use_carry && self.carry()) as u8;
        self.add_flags(a, value, carry_in);
        self.set_acc(a.wrapping_add(value).wrapping_add(carry_in));
    }

    pub(super) fn alu_subb(&mut self, value: u8) {
        let a = self.acc();
        let borrow_in = self.carry() as u8;
        self.sub_flags(a, value, borrow_in);
        self.set_acc(a.wrapping_sub(value).wrapping_sub(borrow_in));
    }

    /// Decimal adjust after a BCD addition.
    pub(super) fn alu_da(&mut self) {
        let mut value = self.acc() as u16;
        let mut psw = self.psw();

        if value & 0x0F > 9 || psw.contains(Psw::AC) {
            value += 0x06;
            if value > 0xFF {
                psw.insert(Psw::C);
            }
        }
        if value & 0xF0 > 0x90 || psw.contains(Psw::C) {
            value += 0x60;
            if value > 0xFF {
                psw.insert(Psw::C);
            }
        }

        self.set_psw(psw);
        self.set_acc(value as u8);
    }

    /// MUL AB: 16-bit product in B:A, OV when it does not fit in A.
    pub(super) fn alu_mul(&mut self, b: u8) -> u8 {
        let product = self.acc() as u16 * b as u16;
        let [hi, lo] = product.to_be_bytes();
        self.set_acc(lo);

        let mut psw = self.psw();
        psw.remove(Psw::C);
        psw.set(Psw::OV, product > 0xFF);
        self.set_psw(psw);
        hi
    }

    /// DIV AB. Returns the new B, or `None` on divide by zero (A and B are
    /// left untouched and OV is set).
    pub(super) fn alu_div(&mut self, b: u8) -> Option<u8> {
        let mut psw = self.psw();
        psw.remove(Psw::C);
        psw.set(Psw::OV, b == 0);
        self.set_psw(psw);

        if b == 0 {
            return None;
        }
        let a = self.acc();
        self.set_acc(a / b);
        Some(a % b)
    }

    /// Recompute the parity flag from the accumulator.
    pub(super) fn update_parity(&mut self) {
        let mut v = self.acc();
        v ^= v >> 4;
        v &= 0x0F;
        let parity = (0x6996u16 >> v) & 1 != 0;
        self.set_psw_flag(Psw::P, parity);
    }
}
