use crate::cpu::Cpu;
use crate::peripheral::Peripherals;
use crate::sfr;

impl Cpu {
    /// INC A / direct / @Ri / Rn.
    pub(super) fn op_inc(&mut self, io: &mut dyn Peripherals, opcode: u8, op1: u8, _: u8) -> u32 {
        self.step_by_one(io, opcode, op1, 1)
    }

    /// DEC A / direct / @Ri / Rn.
    pub(super) fn op_dec(&mut self, io: &mut dyn Peripherals, opcode: u8, op1: u8, _: u8) -> u32 {
        self.step_by_one(io, opcode, op1, 0xFF)
    }

    fn step_by_one(&mut self, io: &mut dyn Peripherals, opcode: u8, op1: u8, delta: u8) -> u32 {
        match opcode & 0x0F {
            0x04 => {
                let a = self.acc().wrapping_add(delta);
                self.set_acc(a);
                self.advance(1);
                1
            }
            0x05 => {
                self.modify_direct(io, op1, |v| v.wrapping_add(delta));
                self.advance(2);
                3
            }
            0x06 | 0x07 => {
                let addr = self.indirect_addr(opcode);
                let value = self.mem.indirect(addr).wrapping_add(delta);
                self.mem.set_indirect(addr, value);
                self.advance(1);
                3
            }
            _ => {
                let value = self.reg(opcode).wrapping_add(delta);
                self.set_reg(opcode, value);
                self.advance(1);
                2
            }
        }
    }

    pub(super) fn op_add(&mut self, io: &mut dyn Peripherals, opcode: u8, op1: u8, _: u8) -> u32 {
        let (value, len, cycles) = self.alu_operand(io, opcode, op1);
        self.alu_add(value, false);
        self.advance(len);
        cycles
    }

    pub(super) fn op_addc(&mut self, io: &mut dyn Peripherals, opcode: u8, op1: u8, _: u8) -> u32 {
        let (value, len, cycles) = self.alu_operand(io, opcode, op1);
        self.alu_add(value, true);
        self.advance(len);
        cycles
    }

    pub(super) fn op_subb(&mut self, io: &mut dyn Peripherals, opcode: u8, op1: u8, _: u8) -> u32 {
        let (value, len, cycles) = self.alu_operand(io, opcode, op1);
        self.alu_subb(value);
        self.advance(len);
        cycles
    }

    pub(super) fn op_inc_dptr(&mut self, _: &mut dyn Peripherals, _: u8, _: u8, _: u8) -> u32 {
        let dptr = self.dptr().wrapping_add(1);
        self.set_dptr(dptr);
        self.advance(1);
        1
    }

    pub(super) fn op_mul(&mut self, _: &mut dyn Peripherals, _: u8, _: u8, _: u8) -> u32 {
        let high = self.alu_mul(self.b());
        self.mem.set_sfr(sfr::B, high);
        self.advance(1);
        5
    }

    pub(super) fn op_div(&mut self, _: &mut dyn Peripherals, _: u8, _: u8, _: u8) -> u32 {
        if let Some(remainder) = self.alu_div(self.b()) {
            self.mem.set_sfr(sfr::B, remainder);
        }
        self.advance(1);
        5
    }

    pub(super) fn op_da(&mut self, _: &mut dyn Peripherals, _: u8, _: u8, _: u8) -> u32 {
        self.alu_da();
        self.advance(1);
        1
    }
}
