//! Disassembler.
//!
//! Mirrors the executor's dispatch table: one renderer per opcode family,
//! looked up by opcode byte. Renderers only read code memory, so decoding is
//! safe at any address (history views, profilers, speculative listings).

use lazy_static::lazy_static;

use super::DecodeFn;
use crate::memory::Memory;
use crate::sfr;

/// A rendered instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    /// Instruction length in bytes (1..=3).
    pub length: u8,
}

impl Decoded {
    fn new(text: String, length: u8) -> Self {
        Self { text, length }
    }
}

lazy_static! {
    pub(super) static ref DECODE_TABLE: [DecodeFn; 256] = build_decode_table();
}

fn build_decode_table() -> [DecodeFn; 256] {
    let mut t: [DecodeFn; 256] = [decode_nop as DecodeFn; 256];

    for page in 0..8usize {
        t[page * 0x20 + 0x01] = decode_absolute;
        t[page * 0x20 + 0x11] = decode_absolute;
    }
    for op in 0x04..=0x0F {
        t[op] = decode_inc_dec;
        t[op + 0x10] = decode_inc_dec;
        for row in [0x20, 0x30, 0x40, 0x50, 0x60, 0x90] {
            t[op + row] = decode_alu;
        }
    }
    t[0x74] = decode_alu;
    for op in 0xE5..=0xEF {
        t[op] = decode_alu;
    }
    for op in [0x42, 0x43, 0x52, 0x53, 0x62, 0x63] {
        t[op] = decode_logic_direct;
    }
    for op in [0x75, 0x85, 0x86, 0x87, 0xF5] {
        t[op] = decode_mov_direct;
    }
    for op in 0x88..=0x8F {
        t[op] = decode_mov_direct;
    }
    for op in [0x76, 0x77, 0xA6, 0xA7, 0xF6, 0xF7] {
        t[op] = decode_mov_indirect;
    }
    for r in 0..8 {
        t[0x78 + r] = decode_mov_reg;
        t[0xA8 + r] = decode_mov_reg;
        t[0xF8 + r] = decode_mov_reg;
        t[0xB8 + r] = decode_cjne;
        t[0xC8 + r] = decode_xch;
        t[0xD8 + r] = decode_djnz;
    }
    for op in [0xB4, 0xB5, 0xB6, 0xB7] {
        t[op] = decode_cjne;
    }
    for op in [0xC5, 0xC6, 0xC7] {
        t[op] = decode_xch;
    }
    t[0xD5] = decode_djnz;

    t[0x02] = decode_long;
    t[0x12] = decode_long;
    for op in [0x40, 0x50, 0x60, 0x70, 0x80] {
        t[op] = decode_relative;
    }
    for op in [0x10, 0x20, 0x30] {
        t[op] = decode_bit_jump;
    }
    for op in [0x72, 0x82, 0x92, 0xA0, 0xA2, 0xB0, 0xB2, 0xC2, 0xD2] {
        t[op] = decode_bit;
    }
    for op in [0xC0, 0xD0] {
        t[op] = decode_stack;
    }
    t[0x90] = decode_mov_dptr;
    for op in [0xD6, 0xD7, 0xE2, 0xE3, 0xF2, 0xF3] {
        t[op] = decode_indirect_only;
    }
    for op in [
        0x03, 0x13, 0x22, 0x23, 0x32, 0x33, 0x73, 0x83, 0x84, 0x93, 0xA3, 0xA4, 0xB3, 0xC3,
        0xC4, 0xD3, 0xD4, 0xE0, 0xE4, 0xF0, 0xF4,
    ] {
        t[op] = decode_implied;
    }
    t
}

/// Direct address operand: hex for RAM, register name for SFRs.
fn mem_name(addr: u8) -> String {
    match sfr::name(addr) {
        Some(name) => name.to_string(),
        None => format!("{addr:02X}h"),
    }
}

/// Bit address operand rendered as `byte.bit`. Bits in RAM show their
/// byte index within the bit area (`bit >> 3`), not the RAM address.
fn bit_name(bit: u8) -> String {
    if bit < 0x80 {
        format!("{:02X}h.{}", bit >> 3, bit & 7)
    } else {
        format!("{}.{}", mem_name(bit & 0xF8), bit & 7)
    }
}

#[inline]
fn operands(mem: &Memory, pos: u16) -> (u8, u8, u8) {
    (
        mem.code(pos),
        mem.code(pos.wrapping_add(1)),
        mem.code(pos.wrapping_add(2)),
    )
}

#[inline]
fn rel(offset: u8) -> i8 {
    offset as i8
}

/// Source operand of the `x4..xF` columns and the length it implies.
fn column_operand(opcode: u8, op1: u8) -> (String, u8) {
    match opcode & 0x0F {
        0x04 => (format!("#{op1:02X}h"), 2),
        0x05 => (mem_name(op1), 2),
        0x06 | 0x07 => (format!("@R{}", opcode & 1), 1),
        _ => (format!("R{}", opcode & 7), 1),
    }
}

fn decode_nop(mem: &Memory, pos: u16) -> Decoded {
    let text = if mem.code(pos) != 0 { "??UNKNOWN" } else { "NOP" };
    Decoded::new(text.to_string(), 1)
}

fn decode_implied(mem: &Memory, pos: u16) -> Decoded {
    let text = match mem.code(pos) {
        0x03 => "RR    A",
        0x13 => "RRC   A",
        0x22 => "RET",
        0x23 => "RL    A",
        0x32 => "RETI",
        0x33 => "RLC   A",
        0x73 => "JMP   @A+DPTR",
        0x83 => "MOVC  A, @A+PC",
        0x84 => "DIV   AB",
        0x93 => "MOVC  A, @A+DPTR",
        0xA3 => "INC   DPTR",
        0xA4 => "MUL   AB",
        0xB3 => "CPL   C",
        0xC3 => "CLR   C",
        0xC4 => "SWAP  A",
        0xD3 => "SETB  C",
        0xD4 => "DA    A",
        0xE0 => "MOVX  A, @DPTR",
        0xE4 => "CLR   A",
        0xF0 => "MOVX  @DPTR, A",
        _ => "CPL   A",
    };
    Decoded::new(text.to_string(), 1)
}

fn decode_absolute(mem: &Memory, pos: u16) -> Decoded {
    let (opcode, op1, _) = operands(mem, pos);
    let target = (pos.wrapping_add(2) & 0xF800) | op1 as u16 | (((opcode & 0xE0) as u16) << 3);
    let text = if opcode & 0x10 == 0 {
        format!("AJMP  #{target:04X}h")
    } else {
        format!("ACALL {target:04X}h")
    };
    Decoded::new(text, 2)
}

fn decode_long(mem: &Memory, pos: u16) -> Decoded {
    let (opcode, op1, op2) = operands(mem, pos);
    let target = u16::from_be_bytes([op1, op2]);
    let text = if opcode == 0x02 {
        format!("LJMP  #{target:04X}h")
    } else {
        format!("LCALL #{target:04X}h")
    };
    Decoded::new(text, 3)
}

fn decode_relative(mem: &Memory, pos: u16) -> Decoded {
    let (opcode, op1, _) = operands(mem, pos);
    let name = match opcode {
        0x40 => "JC   ",
        0x50 => "JNC  ",
        0x60 => "JZ   ",
        0x70 => "JNZ  ",
        _ => "SJMP ",
    };
    Decoded::new(format!("{name} #{:+}", rel(op1)), 2)
}

fn decode_bit_jump(mem: &Memory, pos: u16) -> Decoded {
    let (opcode, op1, op2) = operands(mem, pos);
    let name = match opcode {
        0x10 => "JBC   ",
        0x20 => "JB   ",
        _ => "JNB   ",
    };
    Decoded::new(format!("{name}{}, #{:+}", bit_name(op1), rel(op2)), 3)
}

fn decode_inc_dec(mem: &Memory, pos: u16) -> Decoded {
    let (opcode, op1, _) = operands(mem, pos);
    let name = if opcode & 0xF0 == 0 { "INC" } else { "DEC" };
    let (operand, length) = match opcode & 0x0F {
        0x04 => ("A".to_string(), 1),
        _ => column_operand(opcode, op1),
    };
    Decoded::new(format!("{name}   {operand}"), length)
}

fn decode_alu(mem: &Memory, pos: u16) -> Decoded {
    let (opcode, op1, _) = operands(mem, pos);
    let name = match opcode >> 4 {
        0x2 => "ADD  ",
        0x3 => "ADDC ",
        0x4 => "ORL  ",
        0x5 => "ANL  ",
        0x6 => "XRL  ",
        0x9 => "SUBB ",
        _ => "MOV  ",
    };
    let (operand, length) = column_operand(opcode, op1);
    Decoded::new(format!("{name} A, {operand}"), length)
}

fn decode_logic_direct(mem: &Memory, pos: u16) -> Decoded {
    let (opcode, op1, op2) = operands(mem, pos);
    let name = match opcode >> 4 {
        0x4 => "ORL",
        0x5 => "ANL",
        _ => "XRL",
    };
    if opcode & 0x0F == 0x02 {
        Decoded::new(format!("{name}   {}, A", mem_name(op1)), 2)
    } else {
        Decoded::new(format!("{name}   {}, #{op2:02X}h", mem_name(op1)), 3)
    }
}

fn decode_mov_direct(mem: &Memory, pos: u16) -> Decoded {
    let (opcode, op1, op2) = operands(mem, pos);
    match opcode {
        0x75 => Decoded::new(format!("MOV   {}, #{op2:02X}h", mem_name(op1)), 3),
        0x85 => Decoded::new(format!("MOV   {}, {}", mem_name(op2), mem_name(op1)), 3),
        0x86 | 0x87 => Decoded::new(format!("MOV   {}, @R{}", mem_name(op1), opcode & 1), 2),
        0xF5 => Decoded::new(format!("MOV   {}, A", mem_name(op1)), 2),
        _ => Decoded::new(format!("MOV   {}, R{}", mem_name(op1), opcode & 7), 2),
    }
}

fn decode_mov_indirect(mem: &Memory, pos: u16) -> Decoded {
    let (opcode, op1, _) = operands(mem, pos);
    let ri = opcode & 1;
    match opcode & 0xF0 {
        0x70 => Decoded::new(format!("MOV   @R{ri}, #{op1:02X}h"), 2),
        0xA0 => Decoded::new(format!("MOV   @R{ri}, {}", mem_name(op1)), 2),
        _ => Decoded::new(format!("MOV   @R{ri}, A"), 1),
    }
}

fn decode_mov_reg(mem: &Memory, pos: u16) -> Decoded {
    let (opcode, op1, _) = operands(mem, pos);
    let rn = opcode & 7;
    match opcode & 0xF0 {
        0x70 => Decoded::new(format!("MOV   R{rn}, #{op1:02X}h"), 2),
        0xA0 => Decoded::new(format!("MOV   R{rn}, {}", mem_name(op1)), 2),
        _ => Decoded::new(format!("MOV   R{rn}, A"), 1),
    }
}

fn decode_mov_dptr(mem: &Memory, pos: u16) -> Decoded {
    let (_, op1, op2) = operands(mem, pos);
    Decoded::new(format!("MOV   DPTR, #0{op1:02X}{op2:02X}h"), 3)
}

fn decode_bit(mem: &Memory, pos: u16) -> Decoded {
    let (opcode, op1, _) = operands(mem, pos);
    let bit = bit_name(op1);
    let text = match opcode {
        0x72 => format!("ORL   C, {bit}"),
        0x82 => format!("ANL   C, {bit}"),
        0x92 => format!("MOV   {bit}, C"),
        0xA0 => format!("ORL   C, /{bit}"),
        0xA2 => format!("MOV   C, {bit}"),
        0xB0 => format!("ANL   C, /{bit}"),
        0xB2 => format!("CPL   {bit}"),
        0xC2 => format!("CLR   {bit}"),
        _ => format!("SETB  {bit}"),
    };
    Decoded::new(text, 2)
}

fn decode_cjne(mem: &Memory, pos: u16) -> Decoded {
    let (opcode, op1, op2) = operands(mem, pos);
    let offset = rel(op2);
    let text = match opcode & 0x0F {
        0x04 => format!("CJNE  A, #{op1:02X}h, #{offset:+}"),
        0x05 => format!("CJNE  A, {}, #{offset:+}", mem_name(op1)),
        0x06 | 0x07 => format!("CJNE  @R{}, #{op1:02X}h, #{offset:+}", opcode & 1),
        _ => format!("CJNE  R{}, #{op1:02X}h, #{offset:+}", opcode & 7),
    };
    Decoded::new(text, 3)
}

fn decode_djnz(mem: &Memory, pos: u16) -> Decoded {
    let (opcode, op1, op2) = operands(mem, pos);
    if opcode == 0xD5 {
        Decoded::new(format!("DJNZ  {}, #{:+}", mem_name(op1), rel(op2)), 3)
    } else {
        Decoded::new(format!("DJNZ  R{}, #{:+}", opcode & 7, rel(op1)), 2)
    }
}

fn decode_xch(mem: &Memory, pos: u16) -> Decoded {
    let (opcode, op1, _) = operands(mem, pos);
    let (operand, length) = column_operand(opcode, op1);
    Decoded::new(format!("XCH   A, {operand}"), length)
}

fn decode_stack(mem: &Memory, pos: u16) -> Decoded {
    let (opcode, op1, _) = operands(mem, pos);
    let name = if opcode == 0xC0 { "PUSH " } else { "POP  " };
    Decoded::new(format!("{name} {}", mem_name(op1)), 2)
}

/// One-byte @Ri forms without a direct operand.
fn decode_indirect_only(mem: &Memory, pos: u16) -> Decoded {
    let opcode = mem.code(pos);
    let ri = opcode & 1;
    let text = match opcode & 0xF0 {
        0xD0 => format!("XCHD  A, @R{ri}"),
        0xE0 => format!("MOVX  A, @R{ri}"),
        _ => format!("MOVX  @R{ri}, A"),
    };
    Decoded::new(text, 1)
}
