use crate::cpu::helpers::relative;
use crate::cpu::Cpu;
use crate::peripheral::Peripherals;

/// 11-bit AJMP/ACALL target within the 2 KiB page following the instruction.
fn absolute_target(pc: u16, opcode: u8, op1: u8) -> u16 {
    (pc.wrapping_add(2) & 0xF800) | op1 as u16 | (((opcode & 0xE0) as u16) << 3)
}

impl Cpu {
    pub(super) fn op_ajmp(&mut self, _: &mut dyn Peripherals, opcode: u8, op1: u8, _: u8) -> u32 {
        self.pc = absolute_target(self.pc, opcode, op1);
        3
    }

    pub(super) fn op_acall(&mut self, io: &mut dyn Peripherals, opcode: u8, op1: u8, _: u8) -> u32 {
        let ret = self.pc.wrapping_add(2);
        self.push_pc(io, ret);
        self.pc = absolute_target(self.pc, opcode, op1);
        6
    }

    pub(super) fn op_ljmp(&mut self, _: &mut dyn Peripherals, _: u8, op1: u8, op2: u8) -> u32 {
        self.pc = u16::from_be_bytes([op1, op2]);
        4
    }

    pub(super) fn op_lcall(&mut self, io: &mut dyn Peripherals, _: u8, op1: u8, op2: u8) -> u32 {
        let ret = self.pc.wrapping_add(3);
        self.push_pc(io, ret);
        self.pc = u16::from_be_bytes([op1, op2]);
        6
    }

    pub(super) fn op_ret(&mut self, io: &mut dyn Peripherals, _: u8, _: u8, _: u8) -> u32 {
        self.pc = self.pop_pc(io);
        4
    }

    pub(super) fn op_reti(&mut self, io: &mut dyn Peripherals, _: u8, _: u8, _: u8) -> u32 {
        self.irq_return(io);
        self.pc = self.pop_pc(io);
        4
    }

    pub(super) fn op_sjmp(&mut self, _: &mut dyn Peripherals, _: u8, op1: u8, _: u8) -> u32 {
        self.pc = relative(self.pc, 2, op1);
        3
    }

    pub(super) fn op_jmp_a_dptr(&mut self, _: &mut dyn Peripherals, _: u8, _: u8, _: u8) -> u32 {
        self.pc = self.dptr().wrapping_add(self.acc() as u16);
        2
    }

    /// JC, JNC, JZ, JNZ.
    pub(super) fn op_cond_jump(&mut self, _: &mut dyn Peripherals, opcode: u8, op1: u8, _: u8) -> u32 {
        let taken = match opcode {
            0x40 => self.carry(),
            0x50 => !self.carry(),
            0x60 => self.acc() == 0,
            _ => self.acc() != 0,
        };
        self.branch(taken, 2, op1);
        3
    }

    /// JBC, JB, JNB.
    pub(super) fn op_bit_jump(&mut self, io: &mut dyn Peripherals, opcode: u8, op1: u8, op2: u8) -> u32 {
        let taken = match opcode {
            // JBC tests the output latch, never the pin.
            0x10 => {
                let set = self.latch_bit(op1);
                if set {
                    self.write_bit(io, op1, false);
                }
                set
            }
            0x20 => self.read_bit(io, op1),
            _ => !self.read_bit(io, op1),
        };
        self.branch(taken, 3, op2);
        4
    }

    /// CJNE A,#imm / A,direct / @Ri,#imm / Rn,#imm.
    pub(super) fn op_cjne(&mut self, io: &mut dyn Peripherals, opcode: u8, op1: u8, op2: u8) -> u32 {
        let (lhs, rhs) = match opcode & 0x0F {
            0x04 => (self.acc(), op1),
            0x05 => {
                let value = self.read_direct(io, op1);
                (self.acc(), value)
            }
            0x06 | 0x07 => (self.mem.indirect(self.indirect_addr(opcode)), op1),
            _ => (self.reg(opcode), op1),
        };
        self.set_carry(lhs < rhs);
        self.branch(lhs != rhs, 3, op2);
        4
    }

    /// DJNZ direct,rel (0xD5) and DJNZ Rn,rel.
    pub(super) fn op_djnz(&mut self, io: &mut dyn Peripherals, opcode: u8, op1: u8, op2: u8) -> u32 {
        if opcode == 0xD5 {
            let value = self.modify_direct(io, op1, |v| v.wrapping_sub(1));
            self.branch(value != 0, 3, op2);
            4
        } else {
            let value = self.reg(opcode).wrapping_sub(1);
            self.set_reg(opcode, value);
            self.branch(value != 0, 2, op1);
            3
        }
    }

    #[inline]
    fn branch(&mut self, taken: bool, len: u16, rel: u8) {
        self.pc = if taken {
            relative(self.pc, len, rel)
        } else {
            self.pc.wrapping_add(len)
        };
    }
}
