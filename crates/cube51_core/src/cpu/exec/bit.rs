use crate::cpu::Cpu;
use crate::peripheral::Peripherals;

impl Cpu {
    pub(super) fn op_mov_bit_c(&mut self, io: &mut dyn Peripherals, _: u8, op1: u8, _: u8) -> u32 {
        let carry = self.carry();
        self.write_bit(io, op1, carry);
        self.advance(2);
        3
    }

    pub(super) fn op_mov_c_bit(&mut self, io: &mut dyn Peripherals, _: u8, op1: u8, _: u8) -> u32 {
        let bit = self.read_bit(io, op1);
        self.set_carry(bit);
        self.advance(2);
        2
    }

    /// CPL / CLR / SETB on an addressable bit.
    pub(super) fn op_bit_modify(&mut self, io: &mut dyn Peripherals, opcode: u8, op1: u8, _: u8) -> u32 {
        let value = match opcode {
            0xB2 => !self.latch_bit(op1),
            0xC2 => false,
            _ => true,
        };
        self.write_bit(io, op1, value);
        self.advance(2);
        3
    }

    /// CPL / CLR / SETB on the carry flag.
    pub(super) fn op_carry_modify(&mut self, _: &mut dyn Peripherals, opcode: u8, _: u8, _: u8) -> u32 {
        let value = match opcode {
            0xB3 => !self.carry(),
            0xC3 => false,
            _ => true,
        };
        self.set_carry(value);
        self.advance(1);
        1
    }
}
