use std::collections::HashMap;

use super::*;
use crate::config::{RetiChecks, Variant};
use crate::exception::Exception;
use crate::sfr::{Ien0, Ircon, Tcon};

/// Peripheral stand-in that records every hook invocation.
#[derive(Default)]
struct TestPeripherals {
    exceptions: Vec<Exception>,
    sfr_writes: Vec<(u8, u8)>,
    /// SFR reads answered from here instead of the latch.
    pins: HashMap<u8, u8>,
    xdata_reads: Vec<u16>,
    xdata_writes: Vec<(u16, u8)>,
}

impl Peripherals for TestPeripherals {
    fn except(&mut self, _cpu: &Cpu, exception: Exception) {
        self.exceptions.push(exception);
    }

    fn sfr_read(&mut self, cpu: &Cpu, reg: u8) -> u8 {
        self.pins.get(&reg).copied().unwrap_or(cpu.mem.sfr(reg))
    }

    fn sfr_write(&mut self, cpu: &mut Cpu, reg: u8) {
        self.sfr_writes.push((reg, cpu.mem.sfr(reg)));
    }

    fn xdata_read(&mut self, cpu: &Cpu, addr: u16) -> u8 {
        self.xdata_reads.push(addr);
        cpu.mem.xdata(addr)
    }

    fn xdata_write(&mut self, cpu: &mut Cpu, addr: u16, value: u8) {
        self.xdata_writes.push((addr, value));
        cpu.mem.set_xdata(addr, value);
    }
}

fn boot_with(config: CpuConfig, code: &[u8]) -> Cpu {
    let mut cpu = Cpu::new(config).unwrap();
    cpu.mem.load_code(0, code);
    cpu
}

fn boot(code: &[u8]) -> Cpu {
    boot_with(CpuConfig::default(), code)
}

fn tcon(cpu: &Cpu) -> Tcon {
    Tcon::from_bits_retain(cpu.mem.sfr(sfr::TCON))
}

fn tick_n(cpu: &mut Cpu, io: &mut dyn Peripherals, n: usize) -> usize {
    (0..n).filter(|_| cpu.tick(io)).count()
}

#[test]
fn decode_length_matches_execute_for_every_opcode() {
    for opcode in 0..=255u8 {
        let mut cpu = boot(&[]);
        let absolute = opcode & 0x1F == 0x01;
        // AJMP/ACALL land on the next instruction when the 11-bit target
        // encodes base + 2.
        let base: u16 = if absolute {
            (((opcode & 0xE0) as u16) << 3) + 0x10
        } else {
            0x0100
        };
        let (op1, op2) = match opcode {
            0x02 | 0x12 => {
                let [hi, lo] = (base + 3).to_be_bytes();
                (hi, lo)
            }
            _ if absolute => (0x12, 0x00),
            _ => (0x00, 0x00),
        };
        cpu.mem.load_code(base, &[opcode, op1, op2]);

        match opcode {
            0x22 | 0x32 => {
                let [hi, lo] = (base + 1).to_be_bytes();
                cpu.mem.set_lower(0x08, lo);
                cpu.mem.set_lower(0x09, hi);
                cpu.mem.set_sfr(sfr::SP, 0x09);
            }
            0x73 => cpu.set_dptr(base + 1),
            _ => {}
        }

        cpu.pc = base;
        let decoded = cpu.decode(base);
        let cycles = cpu.execute(&mut ());
        assert_eq!(
            cpu.pc,
            base + decoded.length as u16,
            "opcode {opcode:#04x} ({})",
            decoded.text
        );
        assert!((1..=3).contains(&decoded.length));
        assert!(cycles >= 1, "opcode {opcode:#04x} costs no cycles");
    }
}

#[test]
fn add_immediate_sets_carry_and_aux_carry() {
    let mut cpu = boot(&[0x24, 0x01]);
    cpu.set_acc(0xFF);
    let cycles = cpu.execute(&mut ());

    assert_eq!(cycles, 2);
    assert_eq!(cpu.acc(), 0x00);
    let psw = cpu.psw();
    assert!(psw.contains(Psw::C));
    assert!(psw.contains(Psw::AC));
    assert!(!psw.contains(Psw::OV));
}

#[test]
fn add_signed_overflow() {
    let mut cpu = boot(&[0x24, 0x01]);
    cpu.set_acc(0x7F);
    cpu.execute(&mut ());

    assert_eq!(cpu.acc(), 0x80);
    assert!(cpu.psw().contains(Psw::OV));
    assert!(!cpu.psw().contains(Psw::C));
}

#[test]
fn subb_borrows() {
    let mut cpu = boot(&[0x94, 0x01]);
    cpu.set_acc(0x00);
    cpu.execute(&mut ());

    assert_eq!(cpu.acc(), 0xFF);
    assert!(cpu.psw().contains(Psw::C));
}

#[test]
fn subb_uses_carry_as_borrow() {
    let mut cpu = boot(&[0x94, 0x01]);
    cpu.set_acc(0x05);
    cpu.set_psw(Psw::C);
    cpu.execute(&mut ());

    assert_eq!(cpu.acc(), 0x03);
    assert!(!cpu.psw().contains(Psw::C));
}

#[test]
fn decimal_adjust_after_bcd_add() {
    // MOV A,#15h; ADD A,#27h; DA A
    let mut cpu = boot(&[0x74, 0x15, 0x24, 0x27, 0xD4]);
    for _ in 0..3 {
        cpu.execute(&mut ());
    }
    assert_eq!(cpu.acc(), 0x42);
}

#[test]
fn mul_and_div() {
    let mut cpu = boot(&[0xA4, 0x84]);
    cpu.set_acc(0x80);
    cpu.mem.set_sfr(sfr::B, 0x04);
    cpu.execute(&mut ());
    assert_eq!(cpu.acc(), 0x00);
    assert_eq!(cpu.b(), 0x02);
    assert!(cpu.psw().contains(Psw::OV));

    cpu.set_acc(0x10);
    cpu.mem.set_sfr(sfr::B, 0x03);
    cpu.execute(&mut ());
    assert_eq!(cpu.acc(), 0x05);
    assert_eq!(cpu.b(), 0x01);
    assert!(!cpu.psw().contains(Psw::OV));
}

#[test]
fn divide_by_zero_sets_overflow_and_keeps_operands() {
    let mut cpu = boot(&[0x84]);
    cpu.set_acc(0x42);
    cpu.execute(&mut ());
    assert_eq!(cpu.acc(), 0x42);
    assert!(cpu.psw().contains(Psw::OV));
}

#[test]
fn cjne_sets_carry_when_less() {
    let mut cpu = boot(&[0xB4, 0x05, 0x10]);
    cpu.set_acc(0x03);
    cpu.execute(&mut ());
    assert!(cpu.psw().contains(Psw::C));
    assert_eq!(cpu.pc, 0x13);
}

#[test]
fn djnz_loops_until_zero() {
    // MOV R2,#03h; loop: DJNZ R2,loop
    let mut cpu = boot(&[0x7A, 0x03, 0xDA, 0xFE]);
    let mut io = ();
    cpu.execute(&mut io);
    for _ in 0..3 {
        cpu.execute(&mut io);
    }
    assert_eq!(cpu.reg(2), 0);
    assert_eq!(cpu.pc, 4);
}

#[test]
fn register_banks_follow_psw() {
    let mut cpu = boot(&[0x79, 0x5A]);
    cpu.set_psw(Psw::RS0 | Psw::RS1);
    cpu.execute(&mut ());
    assert_eq!(cpu.mem.lower(0x19), 0x5A);
}

#[test]
fn lcall_and_ret_use_the_stack() {
    // LCALL 0010h ... at 0010h: RET
    let mut cpu = boot(&[0x12, 0x00, 0x10]);
    cpu.mem.set_code(0x10, 0x22);
    let mut io = TestPeripherals::default();

    cpu.execute(&mut io);
    assert_eq!(cpu.pc, 0x0010);
    assert_eq!(cpu.sp(), 0x09);
    // Low byte pushed first, high byte on top.
    assert_eq!(cpu.mem.lower(0x08), 0x03);
    assert_eq!(cpu.mem.lower(0x09), 0x00);

    cpu.execute(&mut io);
    assert_eq!(cpu.pc, 0x0003);
    assert_eq!(cpu.sp(), 0x07);
    assert!(io.exceptions.is_empty());
}

#[test]
fn stack_past_lower_data_without_upper_data() {
    let config = CpuConfig::builder().upper_data(false).build();
    // PUSH ACC; POP B
    let mut cpu = boot_with(config, &[0xC0, 0xE0, 0xD0, 0xF0]);
    cpu.mem.set_sfr(sfr::SP, 0x7F);
    cpu.set_acc(0x42);
    let mut io = TestPeripherals::default();

    cpu.execute(&mut io);
    assert_eq!(cpu.sp(), 0x80);
    assert_eq!(io.exceptions, vec![Exception::Stack]);

    cpu.execute(&mut io);
    assert_eq!(cpu.b(), crate::memory::BAD_VALUE);
    assert_eq!(io.exceptions, vec![Exception::Stack, Exception::Stack]);
}

#[test]
fn stack_in_upper_data() {
    let mut cpu = boot(&[0xC0, 0xE0, 0xD0, 0xF0]);
    cpu.mem.set_sfr(sfr::SP, 0x7F);
    cpu.set_acc(0x42);
    let mut io = TestPeripherals::default();

    cpu.execute(&mut io);
    cpu.execute(&mut io);
    assert_eq!(cpu.b(), 0x42);
    assert!(io.exceptions.is_empty());
}

#[test]
fn stack_pointer_wrap_is_reported() {
    let mut cpu = boot(&[0xC0, 0xE0]);
    cpu.mem.set_sfr(sfr::SP, 0xFF);
    let mut io = TestPeripherals::default();
    cpu.execute(&mut io);
    assert_eq!(cpu.sp(), 0x00);
    assert_eq!(io.exceptions, vec![Exception::Stack]);
}

#[test]
fn mov_a_acc_is_reported_and_completes() {
    let mut cpu = boot(&[0xE5, 0xE0]);
    cpu.set_acc(0x33);
    let mut io = TestPeripherals::default();
    cpu.execute(&mut io);

    assert_eq!(io.exceptions, vec![Exception::AccToA]);
    assert_eq!(cpu.acc(), 0x33);
    assert_eq!(cpu.pc, 2);
}

#[test]
fn reserved_opcode_is_illegal_but_nop_is_not() {
    let mut cpu = boot(&[0x00, 0xA5, 0x00]);
    let mut io = TestPeripherals::default();

    cpu.execute(&mut io);
    assert!(io.exceptions.is_empty());
    cpu.execute(&mut io);
    assert_eq!(io.exceptions, vec![Exception::IllegalOpcode]);
    assert_eq!(cpu.pc, 2);
}

#[test]
fn reset_state() {
    let mut cpu = boot(&[0x74, 0x12]);
    cpu.execute(&mut ());
    cpu.mem.set_lower(0x30, 0x99);

    cpu.reset(false);
    assert_eq!(cpu.pc, 0);
    assert_eq!(cpu.sp(), 0x07);
    assert_eq!(cpu.acc(), 0x00);
    for port in [sfr::P0, sfr::P1, sfr::P2, sfr::P3] {
        assert_eq!(cpu.mem.sfr(port), 0xFF);
    }
    assert_eq!(cpu.irq_depth(), 0);
    assert_eq!(cpu.mem.code(0), 0x74);
    assert_eq!(cpu.mem.lower(0x30), 0x99);

    cpu.reset(true);
    assert_eq!(cpu.mem.code(0), 0x00);
    assert_eq!(cpu.mem.lower(0x30), 0x00);
}

#[test]
fn invalid_configs_are_rejected() {
    let config = CpuConfig::builder().code_size(3000).build();
    assert!(matches!(Cpu::new(config), Err(ConfigError::CodeSize(3000))));
    let config = CpuConfig::builder().xdata_size(100).build();
    assert!(matches!(Cpu::new(config), Err(ConfigError::XdataSize(100))));
    let config = CpuConfig::builder().timer_prescaler(0).build();
    assert!(matches!(Cpu::new(config), Err(ConfigError::Prescaler)));
}

#[test]
fn program_counter_wraps_at_code_size() {
    let config = CpuConfig::builder().code_size(1024).build();
    let mut cpu = boot_with(config, &[]);
    cpu.pc = 0x03FF;
    cpu.execute(&mut ());
    assert_eq!(cpu.pc, 0x0000);
}

#[test]
fn sfr_write_hook_sees_new_value() {
    let mut cpu = boot(&[0x75, 0x90, 0x12]);
    let mut io = TestPeripherals::default();
    cpu.execute(&mut io);
    assert_eq!(io.sfr_writes, vec![(sfr::P1, 0x12)]);
}

#[test]
fn read_modify_write_uses_the_latch() {
    // MOV A,P1; ORL P1,#01h
    let mut cpu = boot(&[0xE5, 0x90, 0x43, 0x90, 0x01]);
    let mut io = TestPeripherals::default();
    io.pins.insert(sfr::P1, 0x00);

    cpu.execute(&mut io);
    assert_eq!(cpu.acc(), 0x00);

    cpu.execute(&mut io);
    assert_eq!(cpu.mem.sfr(sfr::P1), 0xFF);
    assert_eq!(io.sfr_writes, vec![(sfr::P1, 0xFF)]);
}

#[test]
fn bit_tests_read_pins() {
    // JB P1.2, +3
    let mut cpu = boot(&[0x20, 0x92, 0x03]);
    let mut io = TestPeripherals::default();
    io.pins.insert(sfr::P1, 0x00);
    cpu.execute(&mut io);
    assert_eq!(cpu.pc, 3);
}

#[test]
fn jbc_clears_bit_in_lower_data() {
    let mut cpu = boot(&[0x10, 0x08, 0x10]);
    cpu.mem.set_lower(0x21, 0x01);
    cpu.execute(&mut ());
    assert_eq!(cpu.mem.lower(0x21), 0x00);
    assert_eq!(cpu.pc, 0x13);
}

#[test]
fn movx_goes_through_hooks() {
    // MOV DPTR,#0234h; MOVX A,@DPTR; INC A; MOVX @DPTR,A
    let mut cpu = boot(&[0x90, 0x02, 0x34, 0xE0, 0x04, 0xF0]);
    cpu.mem.set_xdata(0x0234, 0x5A);
    let mut io = TestPeripherals::default();
    for _ in 0..4 {
        cpu.execute(&mut io);
    }
    assert_eq!(io.xdata_reads, vec![0x0234]);
    assert_eq!(io.xdata_writes, vec![(0x0234, 0x5B)]);
    assert_eq!(cpu.mem.xdata(0x0234), 0x5B);
}

#[test]
fn movx_ri_uses_mpage() {
    let mut cpu = boot(&[0xE2]);
    cpu.mem.set_sfr(sfr::MPAGE, 0x03);
    cpu.set_reg(0, 0x40);
    let mut io = TestPeripherals::default();
    cpu.execute(&mut io);
    assert_eq!(io.xdata_reads, vec![0x0340]);
}

#[test]
fn second_data_pointer_selected_by_dps() {
    let mut cpu = boot(&[0x90, 0x12, 0x34]);
    cpu.mem.set_sfr(sfr::DPS, 0x01);
    cpu.execute(&mut ());
    assert_eq!(cpu.mem.sfr(sfr::DPH1), 0x12);
    assert_eq!(cpu.mem.sfr(sfr::DPL1), 0x34);
    assert_eq!(cpu.mem.sfr(sfr::DPH), 0x00);
}

#[test]
fn indirect_upper_data_without_backing_reads_sentinel() {
    let config = CpuConfig::builder().upper_data(false).build();
    // MOV A,@R0
    let mut cpu = boot_with(config, &[0xE6]);
    cpu.set_reg(0, 0x90);
    cpu.execute(&mut ());
    assert_eq!(cpu.acc(), crate::memory::BAD_VALUE);
}

#[test]
fn parity_tracks_accumulator() {
    // MOV A,#07h; MOV A,#03h
    let mut cpu = boot(&[0x74, 0x07, 0x74, 0x03]);
    let mut io = ();
    cpu.step_instruction(&mut io);
    assert!(cpu.psw().contains(Psw::P));
    cpu.step_instruction(&mut io);
    assert!(!cpu.psw().contains(Psw::P));
}

#[test]
fn dispatch_count_over_n_ticks() {
    // MOV A,#00h repeated: two cycles each.
    let code: Vec<u8> = [0x74, 0x00].repeat(64);
    let mut cpu = boot(&code);
    let mut io = ();
    assert_eq!(tick_n(&mut cpu, &mut io, 100), 50);

    // LJMP 0000h: four cycles, forever.
    let mut cpu = boot(&[0x02, 0x00, 0x00]);
    assert_eq!(tick_n(&mut cpu, &mut io, 40), 10);

    // The first tick dispatches, so a partial period still counts.
    let mut cpu = boot(&code);
    assert_eq!(tick_n(&mut cpu, &mut io, 3), 2);
    let mut cpu = boot(&[0x02, 0x00, 0x00]);
    assert_eq!(tick_n(&mut cpu, &mut io, 5), 2);
}

#[test]
fn timers_advance_while_instructions_wait() {
    // LJMP 0000h keeps the core busy for four ticks per dispatch.
    let mut cpu = boot(&[0x02, 0x00, 0x00]);
    cpu.mem.set_sfr(sfr::TMOD, 0x01);
    cpu.mem.set_sfr(sfr::TCON, Tcon::TR0.bits());
    let mut io = ();

    assert!(cpu.tick(&mut io));
    assert_eq!(cpu.tick_delay, 3);
    for remaining in (0..3).rev() {
        assert!(!cpu.tick(&mut io));
        assert_eq!(cpu.tick_delay, remaining);
    }
    assert_eq!(cpu.mem.sfr(sfr::TL0), 4);
}

#[test]
fn timer_mode_1_overflow() {
    let mut cpu = boot(&[]);
    cpu.mem.set_sfr(sfr::TMOD, 0x01);
    cpu.mem.set_sfr(sfr::TL0, 0xFF);
    cpu.mem.set_sfr(sfr::TH0, 0xFF);
    cpu.mem.set_sfr(sfr::TCON, Tcon::TR0.bits());
    cpu.tick(&mut ());

    assert_eq!(cpu.mem.sfr(sfr::TL0), 0x00);
    assert_eq!(cpu.mem.sfr(sfr::TH0), 0x00);
    assert!(tcon(&cpu).contains(Tcon::TF0));
}

#[test]
fn timer_mode_0_counts_thirteen_bits() {
    let mut cpu = boot(&[]);
    cpu.mem.set_sfr(sfr::TMOD, 0x00);
    cpu.mem.set_sfr(sfr::TL0, 0xFE);
    cpu.mem.set_sfr(sfr::TH0, 0xFF);
    cpu.mem.set_sfr(sfr::TCON, Tcon::TR0.bits());
    let mut io = ();

    cpu.tick(&mut io);
    assert_eq!(cpu.mem.sfr(sfr::TL0), 0xFF);
    assert!(!tcon(&cpu).contains(Tcon::TF0));

    cpu.tick(&mut io);
    // Upper TL bits are not part of the count.
    assert_eq!(cpu.mem.sfr(sfr::TL0), 0xE0);
    assert_eq!(cpu.mem.sfr(sfr::TH0), 0x00);
    assert!(tcon(&cpu).contains(Tcon::TF0));
}

#[test]
fn timer_mode_2_reloads() {
    let mut cpu = boot(&[]);
    cpu.mem.set_sfr(sfr::TMOD, 0x20);
    cpu.mem.set_sfr(sfr::TL1, 0xFF);
    cpu.mem.set_sfr(sfr::TH1, 0x80);
    cpu.mem.set_sfr(sfr::TCON, Tcon::TR1.bits());
    cpu.tick(&mut ());

    assert_eq!(cpu.mem.sfr(sfr::TL1), 0x80);
    assert!(tcon(&cpu).contains(Tcon::TF1));
}

#[test]
fn timer_mode_3_splits_timer_0() {
    let mut cpu = boot(&[]);
    cpu.mem.set_sfr(sfr::TMOD, 0x03);
    cpu.mem.set_sfr(sfr::TL0, 0xFF);
    cpu.mem.set_sfr(sfr::TH0, 0xFF);
    cpu.mem.set_sfr(sfr::TCON, (Tcon::TR0 | Tcon::TR1).bits());
    cpu.tick(&mut ());

    assert_eq!(cpu.mem.sfr(sfr::TL0), 0x00);
    assert_eq!(cpu.mem.sfr(sfr::TH0), 0x00);
    assert!(tcon(&cpu).contains(Tcon::TF0 | Tcon::TF1));
}

#[test]
fn timer_1_overflow_is_silent_while_timer_0_is_split() {
    let mut cpu = boot(&[]);
    cpu.mem.set_sfr(sfr::TMOD, 0x13);
    cpu.mem.set_sfr(sfr::TL1, 0xFF);
    cpu.mem.set_sfr(sfr::TH1, 0xFF);
    cpu.mem.set_sfr(sfr::TCON, Tcon::TR1.bits());
    cpu.tick(&mut ());

    assert_eq!(cpu.mem.sfr(sfr::TL1), 0x00);
    assert_eq!(cpu.mem.sfr(sfr::TH1), 0x00);
    assert_eq!(cpu.mem.sfr(sfr::TH0), 0x01);
    assert!(!tcon(&cpu).contains(Tcon::TF1));
}

#[test]
fn split_th0_ignores_timer_1_counter_and_gate_bits() {
    // Timer 1 as a counter with no input edges, then gated.
    for tmod in [0x43, 0x83] {
        let mut cpu = boot(&[]);
        cpu.mem.set_sfr(sfr::TMOD, tmod);
        cpu.mem.set_sfr(sfr::TCON, Tcon::TR1.bits());
        tick_n(&mut cpu, &mut (), 10);

        assert_eq!(cpu.mem.sfr(sfr::TH0), 10);
        assert_eq!(cpu.mem.sfr(sfr::TL0), 0);
        assert_eq!(cpu.mem.sfr(sfr::TL1), 0);
    }

    let mut cpu = boot(&[]);
    cpu.mem.set_sfr(sfr::TMOD, 0x43);
    cpu.mem.set_sfr(sfr::TH0, 0xFF);
    cpu.mem.set_sfr(sfr::TCON, Tcon::TR1.bits());
    cpu.tick(&mut ());
    assert!(tcon(&cpu).contains(Tcon::TF1));
}

#[test]
fn timer_mode_3_stops_timer_1() {
    let mut cpu = boot(&[]);
    cpu.mem.set_sfr(sfr::TMOD, 0x30);
    cpu.mem.set_sfr(sfr::TCON, Tcon::TR1.bits());
    tick_n(&mut cpu, &mut (), 10);
    assert_eq!(cpu.mem.sfr(sfr::TL1), 0x00);
}

#[test]
fn gated_timer_does_not_count() {
    let mut cpu = boot(&[]);
    cpu.mem.set_sfr(sfr::TMOD, 0x09);
    cpu.mem.set_sfr(sfr::TCON, Tcon::TR0.bits());
    tick_n(&mut cpu, &mut (), 10);
    assert_eq!(cpu.mem.sfr(sfr::TL0), 0x00);
}

#[test]
fn counter_mode_counts_falling_edges() {
    let mut cpu = boot(&[]);
    cpu.mem.set_sfr(sfr::TMOD, 0x05);
    cpu.mem.set_sfr(sfr::TCON, Tcon::TR0.bits());
    let mut io = ();

    tick_n(&mut cpu, &mut io, 5);
    assert_eq!(cpu.mem.sfr(sfr::TL0), 0);

    for _ in 0..3 {
        cpu.mem.set_sfr(sfr::P0, 0xDF);
        cpu.tick(&mut io);
        cpu.mem.set_sfr(sfr::P0, 0xFF);
        cpu.tick(&mut io);
    }
    assert_eq!(cpu.mem.sfr(sfr::TL0), 3);
}

#[test]
fn prescaler_divides_timer_clock() {
    let config = CpuConfig::builder().timer_prescaler(12).build();
    let mut cpu = boot_with(config, &[]);
    cpu.mem.set_sfr(sfr::TMOD, 0x01);
    cpu.mem.set_sfr(sfr::TCON, Tcon::TR0.bits());
    tick_n(&mut cpu, &mut (), 24);
    assert_eq!(cpu.mem.sfr(sfr::TL0), 2);
}

#[test]
fn timer_2_reloads_from_crc_registers() {
    let mut cpu = boot(&[]);
    cpu.mem.set_sfr(sfr::T2CON, 0x11);
    cpu.mem.set_sfr(sfr::TL2, 0xFF);
    cpu.mem.set_sfr(sfr::TH2, 0xFF);
    cpu.mem.set_sfr(sfr::CRCL, 0x34);
    cpu.mem.set_sfr(sfr::CRCH, 0x12);
    cpu.tick(&mut ());

    assert_eq!(cpu.mem.sfr(sfr::TL2), 0x34);
    assert_eq!(cpu.mem.sfr(sfr::TH2), 0x12);
    assert!(cpu.mem.sfr(sfr::IRCON) & Ircon::TF2.bits() != 0);
}

fn enable_irqs(cpu: &mut Cpu, ien0: Ien0) {
    cpu.mem.set_sfr(sfr::IEN0, (Ien0::EN | ien0).bits());
}

#[test]
fn higher_priority_wins_and_equal_priority_never_preempts() {
    // Timer 1 handler at 001Bh: NOP; NOP; RETI
    let mut cpu = boot(&[]);
    cpu.mem.load_code(0x001B, &[0x00, 0x00, 0x32]);
    enable_irqs(&mut cpu, Ien0::TF0 | Ien0::TF1 | Ien0::PFAIL);
    // TF1 and PFAIL at priority 1, TF0 at 0.
    cpu.mem.set_sfr(sfr::IP0, (Ien0::TF1 | Ien0::PFAIL).bits());
    cpu.mem.set_sfr(sfr::TCON, (Tcon::TF0 | Tcon::TF1).bits());
    let mut io = TestPeripherals::default();

    assert!(!cpu.tick(&mut io));
    assert_eq!(cpu.pc, 0x001B);
    assert_eq!(cpu.irq_depth(), 1);
    assert_eq!(cpu.irq_levels()[0].priority, 1);
    assert!(!tcon(&cpu).contains(Tcon::TF1));
    assert!(tcon(&cpu).contains(Tcon::TF0));

    // Entry latency, then the first handler instruction. TF0 stays pending.
    assert_eq!(cpu.step_instruction(&mut io), 7);
    assert_eq!(cpu.pc, 0x001C);
    assert_eq!(cpu.irq_depth(), 1);

    // Another priority 1 request does not preempt.
    let raised = tcon(&cpu) | Tcon::IE1;
    cpu.mem.set_sfr(sfr::TCON, raised.bits());
    assert_eq!(cpu.step_instruction(&mut io), 1);
    assert_eq!(cpu.pc, 0x001D);
    assert_eq!(cpu.irq_depth(), 1);

    // RETI
    cpu.step_instruction(&mut io);
    assert_eq!(cpu.irq_depth(), 0);
    assert_eq!(cpu.pc, 0x0000);
    assert!(io.exceptions.is_empty());

    // Pending priority 1 source goes before the priority 0 one.
    tick_n(&mut cpu, &mut io, 4);
    assert_eq!(cpu.pc, 0x0013);
    assert!(!tcon(&cpu).contains(Tcon::IE1));
    assert!(tcon(&cpu).contains(Tcon::TF0));
}

#[test]
fn higher_priority_nests() {
    let mut cpu = boot(&[]);
    enable_irqs(&mut cpu, Ien0::TF0 | Ien0::TF1);
    cpu.mem.set_sfr(sfr::IP1, Ien0::TF1.bits());
    cpu.mem.set_sfr(sfr::TCON, Tcon::TF0.bits());
    let mut io = TestPeripherals::default();

    cpu.tick(&mut io);
    assert_eq!(cpu.pc, 0x000B);
    cpu.step_instruction(&mut io);

    let raised = tcon(&cpu) | Tcon::TF1;
    cpu.mem.set_sfr(sfr::TCON, raised.bits());
    cpu.tick(&mut io);
    assert_eq!(cpu.pc, 0x001B);
    assert_eq!(cpu.irq_depth(), 2);
    let levels = cpu.irq_levels();
    assert_eq!(levels[0].vector, 0x000B);
    assert_eq!(levels[1].vector, 0x001B);
    assert_eq!(levels[1].priority, 2);
}

#[test]
fn nested_handlers_return_in_order() {
    let mut code = vec![0u8; 0x20];
    // Timer 0: NOP; RETI. Timer 1: SETB F0; RETI.
    code[0x0B..0x0D].copy_from_slice(&[0x00, 0x32]);
    code[0x1B..0x1E].copy_from_slice(&[0xD2, 0xD5, 0x32]);
    let mut cpu = boot(&code);
    enable_irqs(&mut cpu, Ien0::TF0 | Ien0::TF1);
    cpu.mem.set_sfr(sfr::IP1, Ien0::TF1.bits());
    cpu.mem.set_sfr(sfr::TCON, Tcon::TF0.bits());
    let mut io = TestPeripherals::default();

    cpu.tick(&mut io);
    cpu.step_instruction(&mut io);
    let raised = tcon(&cpu) | Tcon::TF1;
    cpu.mem.set_sfr(sfr::TCON, raised.bits());
    cpu.tick(&mut io);
    assert_eq!(cpu.irq_depth(), 2);

    // SETB F0, then the inner RETI.
    cpu.step_instruction(&mut io);
    cpu.step_instruction(&mut io);
    assert_eq!(cpu.irq_depth(), 1);
    assert_eq!(cpu.pc, 0x000C);

    cpu.step_instruction(&mut io);
    assert_eq!(cpu.irq_depth(), 0);
    assert_eq!(cpu.pc, 0x0000);
    assert_eq!(cpu.sp(), 0x07);
    assert!(cpu.psw().contains(Psw::F0));
    assert!(io.exceptions.is_empty());
}

#[test]
fn global_enable_gates_every_source() {
    let mut cpu = boot(&[]);
    cpu.mem.set_sfr(sfr::IEN0, Ien0::TF0.bits());
    cpu.mem.set_sfr(sfr::TCON, Tcon::TF0.bits());
    tick_n(&mut cpu, &mut (), 4);
    assert_eq!(cpu.irq_depth(), 0);
    assert_eq!(cpu.pc, 4);
}

#[test]
fn interrupt_return_checks_report_mismatches() {
    // Timer 0 handler: MOV A,#55h; RETI
    let code = {
        let mut code = vec![0u8; 0x10];
        code[0x0B..0x0E].copy_from_slice(&[0x74, 0x55, 0x32]);
        code
    };

    let mut cpu = boot(&code);
    enable_irqs(&mut cpu, Ien0::TF0);
    cpu.mem.set_sfr(sfr::TCON, Tcon::TF0.bits());
    let mut io = TestPeripherals::default();
    cpu.tick(&mut io);
    cpu.step_instruction(&mut io);
    cpu.step_instruction(&mut io);
    assert_eq!(io.exceptions, vec![Exception::IretAccMismatch]);
    assert_eq!(cpu.irq_depth(), 0);

    let config = CpuConfig::builder()
        .reti_checks(RetiChecks::empty())
        .build();
    let mut cpu = boot_with(config, &code);
    enable_irqs(&mut cpu, Ien0::TF0);
    cpu.mem.set_sfr(sfr::TCON, Tcon::TF0.bits());
    let mut io = TestPeripherals::default();
    cpu.tick(&mut io);
    cpu.step_instruction(&mut io);
    cpu.step_instruction(&mut io);
    assert!(io.exceptions.is_empty());
}

/// Run the timer 0 handler `handler` (placed at 000Bh) through its RETI.
fn run_timer0_handler(config: CpuConfig, handler: &[u8]) -> (Cpu, Vec<Exception>) {
    let mut code = vec![0u8; 0x20];
    code[0x0B..0x0B + handler.len()].copy_from_slice(handler);
    let mut cpu = boot_with(config, &code);
    enable_irqs(&mut cpu, Ien0::TF0);
    cpu.mem.set_sfr(sfr::TCON, Tcon::TF0.bits());
    let mut io = TestPeripherals::default();

    cpu.tick(&mut io);
    assert_eq!(cpu.irq_depth(), 1);
    for _ in 0..handler.len() {
        if cpu.irq_depth() == 0 {
            break;
        }
        cpu.step_instruction(&mut io);
    }
    assert_eq!(cpu.irq_depth(), 0);
    (cpu, io.exceptions)
}

#[test]
fn interrupt_return_checks_stack_pointer() {
    // INC SP; RETI
    let (_, exceptions) = run_timer0_handler(CpuConfig::default(), &[0x05, 0x81, 0x32]);
    assert_eq!(exceptions, vec![Exception::IretSpMismatch]);
}

#[test]
fn interrupt_return_checks_psw() {
    // SETB C; RETI
    let (_, exceptions) = run_timer0_handler(CpuConfig::default(), &[0xD3, 0x32]);
    assert_eq!(exceptions, vec![Exception::IretPswMismatch]);

    // ORL PSW,#08h selects bank 1.
    let (_, exceptions) = run_timer0_handler(CpuConfig::default(), &[0x43, 0xD0, 0x08, 0x32]);
    assert_eq!(exceptions, vec![Exception::IretPswMismatch]);
}

#[test]
fn interrupt_return_ignores_f0_f1_and_parity() {
    // SETB F0; SETB PSW.1; RETI
    let (cpu, exceptions) =
        run_timer0_handler(CpuConfig::default(), &[0xD2, 0xD5, 0xD2, 0xD1, 0x32]);
    assert!(exceptions.is_empty());
    assert!(cpu.psw().contains(Psw::F0));

    // MOV A,#01h flips parity; only the PSW check is on.
    let config = CpuConfig::builder().reti_checks(RetiChecks::PSW).build();
    let (cpu, exceptions) = run_timer0_handler(config, &[0x74, 0x01, 0x32]);
    assert!(exceptions.is_empty());
    assert!(cpu.psw().contains(Psw::P));
}

#[test]
fn pin_interrupt_from_selected_gpio() {
    let mut cpu = boot(&[]);
    enable_irqs(&mut cpu, Ien0::IFP);
    cpu.mem.set_sfr(sfr::INTEXP, 0x08);
    cpu.mem.set_sfr(sfr::P1, 0xFB);
    cpu.tick(&mut ());

    assert_eq!(cpu.pc, 0x0003);
    assert_eq!(cpu.irq_depth(), 1);
}

#[test]
fn unselected_pin_reads_low() {
    // Low-level triggering fires at once.
    let mut cpu = boot(&[]);
    enable_irqs(&mut cpu, Ien0::IFP);
    cpu.mem.set_sfr(sfr::P1, 0xFF);
    cpu.tick(&mut ());
    assert_eq!(cpu.pc, 0x0003);
    assert_eq!(cpu.irq_depth(), 1);

    // A pin that never goes high has no falling edge.
    let mut cpu = boot(&[]);
    enable_irqs(&mut cpu, Ien0::IFP);
    cpu.mem.set_sfr(sfr::TCON, Tcon::IT0.bits());
    tick_n(&mut cpu, &mut (), 3);
    assert_eq!(cpu.irq_depth(), 0);
    assert!(!tcon(&cpu).contains(Tcon::IE0));
}

#[test]
fn classic_variant_priorities_and_depth() {
    let config = CpuConfig::builder().variant(Variant::Classic).build();
    let mut cpu = boot_with(config, &[]);
    // EA | ET0 | ET1 | EX0
    cpu.mem.set_sfr(sfr::IE, 0x8B);
    cpu.mem.set_sfr(sfr::IP, 0x08);
    cpu.mem.set_sfr(sfr::TCON, (Tcon::TF0 | Tcon::TF1).bits());
    let mut io = TestPeripherals::default();

    cpu.tick(&mut io);
    assert_eq!(cpu.pc, 0x001B);
    assert_eq!(cpu.irq_levels()[0].priority, 1);

    // Classic latency is two cycles.
    assert_eq!(cpu.step_instruction(&mut io), 3);
    assert_eq!(cpu.irq_depth(), 1);
}

#[test]
fn breakpoint_raises_break() {
    let mut cpu = boot(&[0x00, 0x00, 0x00]);
    cpu.breakpoint = Some(0x0002);
    let mut io = TestPeripherals::default();

    cpu.step_instruction(&mut io);
    assert!(io.exceptions.is_empty());
    cpu.step_instruction(&mut io);
    assert_eq!(io.exceptions, vec![Exception::Break]);
}

#[test]
fn profiler_accumulates_cycles() {
    let config = CpuConfig::builder().profile(true).build();
    let mut cpu = boot_with(config, &[0x02, 0x00, 0x00]);
    tick_n(&mut cpu, &mut (), 40);

    let profiler = cpu.profiler.as_ref().unwrap();
    let entry = profiler.entry(0);
    assert_eq!(entry.total_cycles, 40);
    assert_eq!(entry.loop_hits, 9);
    assert_eq!(profiler.hot_spots(4), vec![(0, *entry)]);
}

#[test]
fn sfr_names_are_stable() {
    for addr in 0x80..=0xFFu8 {
        let first = sfr::name(addr);
        assert!(first.is_some());
        assert_eq!(first, sfr::name(addr));
    }
    assert_eq!(sfr::name(0x7F), None);
    assert_eq!(sfr::name(sfr::ACC), Some("ACC"));
    assert_eq!(sfr::name(sfr::PSW), Some("PSW"));
}

#[test]
fn disassembly_text() {
    let cases: &[(&[u8], &str)] = &[
        (&[0x00], "NOP"),
        (&[0xA5], "??UNKNOWN"),
        (&[0x24, 0x05], "ADD   A, #05h"),
        (&[0x35, 0x30], "ADDC  A, 30h"),
        (&[0x96], "SUBB  A, @R0"),
        (&[0x85, 0xE0, 0x30], "MOV   30h, ACC"),
        (&[0x75, 0x90, 0xFF], "MOV   P1, #FFh"),
        (&[0xD2, 0xD7], "SETB  PSW.7"),
        (&[0x20, 0x08, 0xFE], "JB   01h.0, #-2"),
        (&[0x30, 0x92, 0x04], "JNB   P1.2, #+4"),
        (&[0x80, 0x05], "SJMP  #+5"),
        (&[0x90, 0x12, 0x34], "MOV   DPTR, #01234h"),
        (&[0x12, 0x12, 0x34], "LCALL #1234h"),
        (&[0x02, 0x00, 0x40], "LJMP  #0040h"),
        (&[0xB5, 0xF0, 0x00], "CJNE  A, B, #+0"),
        (&[0xBB, 0x10, 0xFD], "CJNE  R3, #10h, #-3"),
        (&[0xD5, 0x31, 0xFD], "DJNZ  31h, #-3"),
        (&[0xDF, 0xFE], "DJNZ  R7, #-2"),
        (&[0xC0, 0xE0], "PUSH  ACC"),
        (&[0xD0, 0xD0], "POP   PSW"),
        (&[0xE2], "MOVX  A, @R0"),
        (&[0xF0], "MOVX  @DPTR, A"),
        (&[0x93], "MOVC  A, @A+DPTR"),
        (&[0xA0, 0x00], "ORL   C, /00h.0"),
        (&[0x53, 0x80, 0x0F], "ANL   P0, #0Fh"),
        (&[0xC6], "XCH   A, @R0"),
        (&[0xD7], "XCHD  A, @R1"),
        (&[0x8A, 0x40], "MOV   40h, R2"),
        (&[0xA9, 0x40], "MOV   R1, 40h"),
        (&[0xF6], "MOV   @R0, A"),
        (&[0xE4], "CLR   A"),
    ];

    for (bytes, text) in cases {
        let cpu = boot(bytes);
        let decoded = cpu.decode(0);
        assert_eq!(decoded.text, *text);
        assert_eq!(decoded.length as usize, bytes.len(), "{text}");
    }
}

#[test]
fn absolute_jumps_decode_within_page() {
    let mut cpu = boot(&[]);
    cpu.mem.load_code(0x0100, &[0x21, 0x23]);
    assert_eq!(cpu.decode(0x0100).text, "AJMP  #0123h");
    cpu.mem.load_code(0x0200, &[0x51, 0x80]);
    assert_eq!(cpu.decode(0x0200).text, "ACALL 0280h");
}
