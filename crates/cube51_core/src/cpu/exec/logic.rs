use crate::cpu::Cpu;
use crate::peripheral::Peripherals;
use crate::sfr::Psw;

/// ORL, ANL or XRL, selected by the opcode row (0x4_, 0x5_, 0x6_).
fn logic_fn(opcode: u8) -> fn(u8, u8) -> u8 {
    match opcode >> 4 {
        0x4 => |a: u8, b: u8| a | b,
        0x5 => |a: u8, b: u8| a & b,
        _ => |a: u8, b: u8| a ^ b,
    }
}

impl Cpu {
    /// ORL/ANL/XRL in all of their forms: `direct,A`, `direct,#imm` and
    /// `A,src`.
    pub(super) fn op_logic(&mut self, io: &mut dyn Peripherals, opcode: u8, op1: u8, op2: u8) -> u32 {
        let f = logic_fn(opcode);
        match opcode & 0x0F {
            0x02 => {
                let a = self.acc();
                self.modify_direct(io, op1, |v| f(v, a));
                self.advance(2);
                3
            }
            0x03 => {
                self.modify_direct(io, op1, |v| f(v, op2));
                self.advance(3);
                4
            }
            _ => {
                let (value, len, cycles) = self.alu_operand(io, opcode, op1);
                let a = self.acc();
                self.set_acc(f(a, value));
                self.advance(len);
                cycles
            }
        }
    }

    /// RR, RRC, RL, RLC on the accumulator.
    pub(super) fn op_rotate(&mut self, _: &mut dyn Peripherals, opcode: u8, _: u8, _: u8) -> u32 {
        let a = self.acc();
        match opcode {
            0x03 => self.set_acc(a.rotate_right(1)),
            0x13 => {
                let carry = self.carry();
                self.set_acc((a >> 1) | ((carry as u8) << 7));
                self.set_carry(a & 0x01 != 0);
            }
            0x23 => self.set_acc(a.rotate_left(1)),
            _ => {
                let carry = self.carry();
                self.set_acc((a << 1) | carry as u8);
                self.set_carry(a & 0x80 != 0);
            }
        }
        self.advance(1);
        1
    }

    pub(super) fn op_swap(&mut self, _: &mut dyn Peripherals, _: u8, _: u8, _: u8) -> u32 {
        let a = self.acc();
        self.set_acc(a.rotate_left(4));
        self.advance(1);
        1
    }

    pub(super) fn op_clr_a(&mut self, _: &mut dyn Peripherals, _: u8, _: u8, _: u8) -> u32 {
        self.set_acc(0);
        self.advance(1);
        1
    }

    pub(super) fn op_cpl_a(&mut self, _: &mut dyn Peripherals, _: u8, _: u8, _: u8) -> u32 {
        let a = self.acc();
        self.set_acc(!a);
        self.advance(1);
        1
    }

    /// ORL/ANL C with a bit or its complement.
    pub(super) fn op_carry_logic(&mut self, io: &mut dyn Peripherals, opcode: u8, op1: u8, _: u8) -> u32 {
        let bit = self.read_bit(io, op1);
        let carry = self.carry();
        let result = match opcode {
            0x72 => carry | bit,
            0x82 => carry & bit,
            0xA0 => carry | !bit,
            _ => carry & !bit,
        };
        self.set_psw_flag(Psw::C, result);
        self.advance(2);
        2
    }
}
