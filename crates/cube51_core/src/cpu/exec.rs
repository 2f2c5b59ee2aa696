//! Opcode dispatch.
//!
//! Handlers are grouped by instruction family. Most families share a column
//! layout in the opcode map (`x4` immediate, `x5` direct, `x6`/`x7` @Ri,
//! `x8..xF` Rn), which `alu_operand` resolves in one place.
mod arith;
mod bit;
mod branch;
mod logic;
mod transfer;

use lazy_static::lazy_static;

use super::{Cpu, ExecFn};
use crate::peripheral::Peripherals;

lazy_static! {
    pub(super) static ref EXEC_TABLE: [ExecFn; 256] = build_exec_table();
}

fn build_exec_table() -> [ExecFn; 256] {
    let mut t: [ExecFn; 256] = [Cpu::op_nop as ExecFn; 256];

    // AJMP/ACALL alternate down the x1 column.
    for page in 0..8usize {
        t[page * 0x20 + 0x01] = Cpu::op_ajmp;
        t[page * 0x20 + 0x11] = Cpu::op_acall;
    }

    for op in 0x04..=0x0F {
        t[op] = Cpu::op_inc;
        t[op + 0x10] = Cpu::op_dec;
        t[op + 0x20] = Cpu::op_add;
        t[op + 0x30] = Cpu::op_addc;
        t[op + 0x40] = Cpu::op_logic;
        t[op + 0x50] = Cpu::op_logic;
        t[op + 0x60] = Cpu::op_logic;
        t[op + 0x90] = Cpu::op_subb;
    }
    for op in [0x42, 0x43, 0x52, 0x53, 0x62, 0x63] {
        t[op] = Cpu::op_logic;
    }

    // MOV A,src shares the ALU operand columns; E4 is CLR A.
    t[0x74] = Cpu::op_mov_a;
    for op in 0xE5..=0xEF {
        t[op] = Cpu::op_mov_a;
    }
    t[0x75] = Cpu::op_mov_direct;
    t[0x85] = Cpu::op_mov_direct;
    t[0xF5] = Cpu::op_mov_direct;
    for op in 0x86..=0x8F {
        t[op] = Cpu::op_mov_direct;
    }
    for op in [0x76, 0x77, 0xA6, 0xA7, 0xF6, 0xF7] {
        t[op] = Cpu::op_mov_indirect;
    }
    for r in 0..8 {
        t[0x78 + r] = Cpu::op_mov_reg;
        t[0xA8 + r] = Cpu::op_mov_reg;
        t[0xF8 + r] = Cpu::op_mov_reg;
        t[0xB8 + r] = Cpu::op_cjne;
        t[0xC8 + r] = Cpu::op_xch;
        t[0xD8 + r] = Cpu::op_djnz;
    }

    t[0x02] = Cpu::op_ljmp;
    t[0x12] = Cpu::op_lcall;
    t[0x22] = Cpu::op_ret;
    t[0x32] = Cpu::op_reti;
    t[0x73] = Cpu::op_jmp_a_dptr;
    t[0x80] = Cpu::op_sjmp;
    for op in [0x40, 0x50, 0x60, 0x70] {
        t[op] = Cpu::op_cond_jump;
    }
    for op in [0x10, 0x20, 0x30] {
        t[op] = Cpu::op_bit_jump;
    }
    for op in [0xB4, 0xB5, 0xB6, 0xB7] {
        t[op] = Cpu::op_cjne;
    }
    t[0xD5] = Cpu::op_djnz;

    t[0x03] = Cpu::op_rotate;
    t[0x13] = Cpu::op_rotate;
    t[0x23] = Cpu::op_rotate;
    t[0x33] = Cpu::op_rotate;
    t[0xC4] = Cpu::op_swap;
    t[0xE4] = Cpu::op_clr_a;
    t[0xF4] = Cpu::op_cpl_a;
    t[0xD4] = Cpu::op_da;
    t[0x84] = Cpu::op_div;
    t[0xA4] = Cpu::op_mul;
    t[0xA3] = Cpu::op_inc_dptr;

    for op in [0x72, 0x82, 0xA0, 0xB0] {
        t[op] = Cpu::op_carry_logic;
    }
    t[0x92] = Cpu::op_mov_bit_c;
    t[0xA2] = Cpu::op_mov_c_bit;
    for op in [0xB2, 0xC2, 0xD2] {
        t[op] = Cpu::op_bit_modify;
    }
    for op in [0xB3, 0xC3, 0xD3] {
        t[op] = Cpu::op_carry_modify;
    }

    t[0x90] = Cpu::op_mov_dptr;
    t[0x83] = Cpu::op_movc;
    t[0x93] = Cpu::op_movc;
    for op in [0xE0, 0xE2, 0xE3] {
        t[op] = Cpu::op_movx_read;
    }
    for op in [0xF0, 0xF2, 0xF3] {
        t[op] = Cpu::op_movx_write;
    }
    t[0xC0] = Cpu::op_push;
    t[0xD0] = Cpu::op_pop;
    for op in [0xC5, 0xC6, 0xC7] {
        t[op] = Cpu::op_xch;
    }
    t[0xD6] = Cpu::op_xchd;
    t[0xD7] = Cpu::op_xchd;

    // 0x00 and the reserved 0xA5 stay on op_nop.
    t
}

impl Cpu {
    /// Run the instruction at PC and return its cycle cost.
    ///
    /// This does not touch `tick_delay`, interrupts or timers; `tick` is the
    /// normal entry point. Exposed for single-stepping tools.
    pub fn execute(&mut self, io: &mut dyn Peripherals) -> u32 {
        let pc = self.pc;
        let opcode = self.mem.code(pc);
        let op1 = self.mem.code(pc.wrapping_add(1));
        let op2 = self.mem.code(pc.wrapping_add(2));
        let handler = self.exec_table[opcode as usize];
        let cycles = handler(self, io, opcode, op1, op2);
        self.pc &= self.mem.code_mask();
        cycles
    }

    /// Source operand of the `x4..xF` columns: immediate, direct, @Ri or
    /// Rn. Returns the value, instruction length and cycle cost.
    pub(super) fn alu_operand(
        &mut self,
        io: &mut dyn Peripherals,
        opcode: u8,
        op1: u8,
    ) -> (u8, u16, u32) {
        match opcode & 0x0F {
            0x04 => (op1, 2, 2),
            0x05 => (self.read_direct(io, op1), 2, 2),
            0x06 | 0x07 => {
                let addr = self.indirect_addr(opcode);
                (self.mem.indirect(addr), 1, 2)
            }
            _ => (self.reg(opcode), 1, 1),
        }
    }

    #[inline]
    pub(super) fn advance(&mut self, len: u16) {
        self.pc = self.pc.wrapping_add(len);
    }
}
