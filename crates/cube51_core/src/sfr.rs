//! Special function register map of the nRF24LE1 flavoured 8051.
//!
//! Addresses are absolute direct addresses (0x80..=0xFF). `Memory` stores the
//! register file at `address - 0x80`.

use bitflags::bitflags;

pub const P0: u8 = 0x80;
pub const SP: u8 = 0x81;
pub const DPL: u8 = 0x82;
pub const DPH: u8 = 0x83;
pub const DPL1: u8 = 0x84;
pub const DPH1: u8 = 0x85;
pub const TCON: u8 = 0x88;
pub const TMOD: u8 = 0x89;
pub const TL0: u8 = 0x8A;
pub const TL1: u8 = 0x8B;
pub const TH0: u8 = 0x8C;
pub const TH1: u8 = 0x8D;
pub const P1: u8 = 0x90;
pub const DPS: u8 = 0x92;
pub const S0CON: u8 = 0x98;
pub const S0BUF: u8 = 0x99;
pub const P2: u8 = 0xA0;
pub const INTEXP: u8 = 0xA6;
/// IEN0 on the nRF24LE1, IE on a classic 8051.
pub const IEN0: u8 = 0xA8;
pub const IP0: u8 = 0xA9;
pub const P3: u8 = 0xB0;
/// IEN1 on the nRF24LE1, IP on a classic 8051.
pub const IEN1: u8 = 0xB8;
pub const IP1: u8 = 0xB9;
pub const IRCON: u8 = 0xC0;
pub const T2CON: u8 = 0xC8;
pub const MPAGE: u8 = 0xC9;
pub const CRCL: u8 = 0xCA;
pub const CRCH: u8 = 0xCB;
pub const TL2: u8 = 0xCC;
pub const TH2: u8 = 0xCD;
pub const PSW: u8 = 0xD0;
pub const ACC: u8 = 0xE0;
pub const B: u8 = 0xF0;

/// Classic 8051 aliases for the registers shared with the nRF map.
pub const IE: u8 = IEN0;
pub const IP: u8 = IEN1;

bitflags! {
    /// Program status word.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Psw: u8 {
        const P = 0x01;
        const F1 = 0x02;
        const OV = 0x04;
        const RS0 = 0x08;
        const RS1 = 0x10;
        const F0 = 0x20;
        const AC = 0x40;
        const C = 0x80;
    }
}

impl Psw {
    /// Bits compared by the RETI consistency check. Parity, F0 and the
    /// unused F1 bit may legitimately change inside a handler.
    pub const RETI_MASK: Psw = Psw::OV
        .union(Psw::RS0)
        .union(Psw::RS1)
        .union(Psw::AC)
        .union(Psw::C);
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Tcon: u8 {
        const IT0 = 0x01;
        const IE0 = 0x02;
        const IT1 = 0x04;
        const IE1 = 0x08;
        const TR0 = 0x10;
        const TF0 = 0x20;
        const TR1 = 0x40;
        const TF1 = 0x80;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Tmod: u8 {
        const M0_0 = 0x01;
        const M1_0 = 0x02;
        const CT_0 = 0x04;
        const GATE_0 = 0x08;
        const M0_1 = 0x10;
        const M1_1 = 0x20;
        const CT_1 = 0x40;
        const GATE_1 = 0x80;
    }
}

bitflags! {
    /// IEN0 (nRF24LE1). Bit 7 is the global enable on both variants.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Ien0: u8 {
        const IFP = 0x01;
        const TF0 = 0x02;
        const PFAIL = 0x04;
        const TF1 = 0x08;
        const SER = 0x10;
        const TF2 = 0x20;
        const EN = 0x80;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Ien1: u8 {
        const RFSPI = 0x01;
        const RF = 0x02;
        const SPI = 0x04;
        const WUOP = 0x08;
        const MISC = 0x10;
        const TICK = 0x20;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Ircon: u8 {
        const RFSPI = 0x01;
        const RF = 0x02;
        const SPI = 0x04;
        const WUOP = 0x08;
        const MISC = 0x10;
        const TICK = 0x20;
        const TF2 = 0x40;
        const EXF2 = 0x80;
    }
}

/// Printable names for direct addresses 0x80..=0xFF, indexed by `addr - 0x80`.
const SFR_NAMES: [&str; 128] = [
    "P0", "SP", "DPL", "DPH", "DPL1", "DPH1", "DEBUG", "SFR_87",
    "TCON", "TMOD", "TL0", "TL1", "TH0", "TH1", "SFR_8E", "P3CON",
    "P1", "SFR_91", "DPS", "P0DIR", "P1DIR", "P2DIR", "P3DIR", "P2CON",
    "S0CON", "S0BUF", "SFR_9A", "SFR_9B", "SFR_9C", "SFR_9D", "P0CON", "P1CON",
    "P2", "PWMDC0", "PWMDC1", "CLKCTRL", "PWRDWN", "WUCON", "INTEXP", "MEMCON",
    "IEN0", "IP0", "S0RELL", "RTC2CPT01", "RTC2CPT10", "CLKLFCTRL", "OPMCON", "WDSV",
    "P3", "RSTREAS", "PWMCON", "RTC2CON", "RTC2CMP0", "RTC2CMP1", "RTC2CPT00", "SFR_B7",
    "IEN1", "IP1", "S0RELH", "SFR_BB", "SPISCON0", "SFR_BD", "SPISSTAT", "SPISDAT",
    "IRCON", "CCEN", "CCL1", "CCH1", "CCL2", "CCH2", "CCL3", "CCH3",
    "T2CON", "MPAGE", "CRCL", "CRCH", "TL2", "TH2", "WUOPC1", "WUOPC0",
    "PSW", "ADCCON3", "ADCCON2", "ADCCON1", "ADCDATH", "ADCDATL", "RNGCTL", "RNGDAT",
    "ADCON", "W2SADR", "W2DAT", "COMPCON", "POFCON", "CCPDATIA", "CCPDATIB", "CCPDATO",
    "ACC", "W2CON1", "W2CON0", "SFR_E3", "SPIRCON0", "SPIRCON1", "SPIRSTAT", "SPIRDAT",
    "RFCON", "MD0", "MD1", "MD2", "MD3", "MD4", "MD5", "ARCON",
    "B", "SFR_F1", "SFR_F2", "SFR_F3", "SFR_F4", "SFR_F5", "SFR_F6", "SFR_F7",
    "FSR", "FPCR", "FCR", "SFR_FB", "SPIMCON0", "SPIMCON1", "SPIMSTAT", "SPIMDAT",
];

/// Name of the SFR at direct address `addr`, or `None` below 0x80.
pub fn name(addr: u8) -> Option<&'static str> {
    addr.checked_sub(0x80).map(|index| SFR_NAMES[index as usize])
}
