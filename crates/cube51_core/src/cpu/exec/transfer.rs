use crate::cpu::Cpu;
use crate::exception::Exception;
use crate::peripheral::Peripherals;
use crate::sfr;

impl Cpu {
    /// NOP, also installed for the reserved opcode 0xA5.
    pub(super) fn op_nop(&mut self, io: &mut dyn Peripherals, opcode: u8, _: u8, _: u8) -> u32 {
        if opcode != 0 {
            io.except(self, Exception::IllegalOpcode);
        }
        self.advance(1);
        1
    }

    /// MOV A,#imm / A,direct / A,@Ri / A,Rn.
    pub(super) fn op_mov_a(&mut self, io: &mut dyn Peripherals, opcode: u8, op1: u8, _: u8) -> u32 {
        if opcode == 0xE5 && op1 == sfr::ACC {
            io.except(self, Exception::AccToA);
        }
        let (value, len, cycles) = self.alu_operand(io, opcode, op1);
        self.set_acc(value);
        self.advance(len);
        cycles
    }

    /// MOV direct,#imm / direct,direct / direct,@Ri / direct,Rn / direct,A.
    pub(super) fn op_mov_direct(&mut self, io: &mut dyn Peripherals, opcode: u8, op1: u8, op2: u8) -> u32 {
        let (dest, value, len, cycles) = match opcode {
            0x75 => (op1, op2, 3, 3),
            // Source comes first in the encoding.
            0x85 => (op2, self.read_direct(io, op1), 3, 4),
            0x86 | 0x87 => {
                let addr = self.indirect_addr(opcode);
                (op1, self.mem.indirect(addr), 2, 4)
            }
            0xF5 => (op1, self.acc(), 2, 3),
            _ => (op1, self.reg(opcode), 2, 3),
        };
        self.write_direct(io, dest, value);
        self.advance(len);
        cycles
    }

    /// MOV @Ri,#imm / @Ri,direct / @Ri,A.
    pub(super) fn op_mov_indirect(&mut self, io: &mut dyn Peripherals, opcode: u8, op1: u8, _: u8) -> u32 {
        let (value, len, cycles) = match opcode & 0xF0 {
            0x70 => (op1, 2, 3),
            0xA0 => (self.read_direct(io, op1), 2, 5),
            _ => (self.acc(), 1, 3),
        };
        let addr = self.indirect_addr(opcode);
        self.mem.set_indirect(addr, value);
        self.advance(len);
        cycles
    }

    /// MOV Rn,#imm / Rn,direct / Rn,A.
    pub(super) fn op_mov_reg(&mut self, io: &mut dyn Peripherals, opcode: u8, op1: u8, _: u8) -> u32 {
        let (value, len, cycles) = match opcode & 0xF0 {
            0x70 => (op1, 2, 2),
            0xA0 => (self.read_direct(io, op1), 2, 4),
            _ => (self.acc(), 1, 2),
        };
        self.set_reg(opcode, value);
        self.advance(len);
        cycles
    }

    pub(super) fn op_mov_dptr(&mut self, _: &mut dyn Peripherals, _: u8, op1: u8, op2: u8) -> u32 {
        self.set_dptr(u16::from_be_bytes([op1, op2]));
        self.advance(3);
        3
    }

    /// MOVC A,@A+PC (0x83) and MOVC A,@A+DPTR (0x93).
    pub(super) fn op_movc(&mut self, _: &mut dyn Peripherals, opcode: u8, _: u8, _: u8) -> u32 {
        let base = if opcode == 0x83 {
            self.pc.wrapping_add(1)
        } else {
            self.dptr()
        };
        let value = self.mem.code(base.wrapping_add(self.acc() as u16));
        self.set_acc(value);
        self.advance(1);
        3
    }

    /// MOVX A,@DPTR / A,@Ri.
    pub(super) fn op_movx_read(&mut self, io: &mut dyn Peripherals, opcode: u8, _: u8, _: u8) -> u32 {
        let addr = if opcode == 0xE0 {
            self.dptr()
        } else {
            self.xdata_indirect_addr(opcode)
        };
        let value = io.xdata_read(self, addr);
        self.set_acc(value);
        self.advance(1);
        4
    }

    /// MOVX @DPTR,A / @Ri,A.
    pub(super) fn op_movx_write(&mut self, io: &mut dyn Peripherals, opcode: u8, _: u8, _: u8) -> u32 {
        let addr = if opcode == 0xF0 {
            self.dptr()
        } else {
            self.xdata_indirect_addr(opcode)
        };
        let value = self.acc();
        io.xdata_write(self, addr, value);
        self.advance(1);
        5
    }

    pub(super) fn op_push(&mut self, io: &mut dyn Peripherals, _: u8, op1: u8, _: u8) -> u32 {
        let value = self.read_direct(io, op1);
        self.push(io, value);
        self.advance(2);
        4
    }

    pub(super) fn op_pop(&mut self, io: &mut dyn Peripherals, _: u8, op1: u8, _: u8) -> u32 {
        let value = self.pop(io);
        self.write_direct(io, op1, value);
        self.advance(2);
        3
    }

    /// XCH A,direct / A,@Ri / A,Rn.
    pub(super) fn op_xch(&mut self, io: &mut dyn Peripherals, opcode: u8, op1: u8, _: u8) -> u32 {
        let a = self.acc();
        match opcode & 0x0F {
            0x05 => {
                let mut old = 0;
                self.modify_direct(io, op1, |v| {
                    old = v;
                    a
                });
                self.set_acc(old);
                self.advance(2);
                3
            }
            0x06 | 0x07 => {
                let addr = self.indirect_addr(opcode);
                let value = self.mem.indirect(addr);
                self.mem.set_indirect(addr, a);
                self.set_acc(value);
                self.advance(1);
                3
            }
            _ => {
                let value = self.reg(opcode);
                self.set_reg(opcode, a);
                self.set_acc(value);
                self.advance(1);
                2
            }
        }
    }

    /// Exchange the low nibbles of A and @Ri.
    pub(super) fn op_xchd(&mut self, _: &mut dyn Peripherals, opcode: u8, _: u8, _: u8) -> u32 {
        let addr = self.indirect_addr(opcode);
        let a = self.acc();
        let value = self.mem.indirect(addr);
        self.mem.set_indirect(addr, (value & 0xF0) | (a & 0x0F));
        self.set_acc((a & 0xF0) | (value & 0x0F));
        self.advance(1);
        3
    }
}
