use crate::sfr::{self, Ien0, Ien1, Ircon, Tcon};

/// One row of an interrupt source table.
///
/// A source is pending when both its enable bit and any of its request bits
/// are set. The enable mask doubles as the priority mask.
#[derive(Clone, Copy, Debug)]
pub(super) struct IrqSource {
    pub(super) irqn: u8,
    pub(super) enable_reg: u8,
    pub(super) enable_mask: u8,
    pub(super) request_reg: u8,
    pub(super) request_mask: u8,
    /// Request bits cleared by hardware when the handler is entered.
    pub(super) autoclear: u8,
}

impl IrqSource {
    #[inline]
    pub(super) fn vector(&self) -> u16 {
        self.irqn as u16 * 8 + 3
    }
}

const fn source(
    irqn: u8,
    enable_reg: u8,
    enable_mask: u8,
    request_reg: u8,
    request_mask: u8,
    autoclear: u8,
) -> IrqSource {
    IrqSource {
        irqn,
        enable_reg,
        enable_mask,
        request_reg,
        request_mask,
        autoclear,
    }
}

/// nRF24LE1 sources in hardware polling order (datasheet
/// section 9.2). IEN0 and IEN1 groups are interleaved.
pub(super) const NRF24LE1: [IrqSource; 12] = [
    source(0, sfr::IEN0, Ien0::IFP.bits(), sfr::TCON, Tcon::IE0.bits(), Tcon::IE0.bits()),
    source(8, sfr::IEN1, Ien1::RFSPI.bits(), sfr::IRCON, Ircon::RFSPI.bits(), 0),
    source(1, sfr::IEN0, Ien0::TF0.bits(), sfr::TCON, Tcon::TF0.bits(), Tcon::TF0.bits()),
    source(9, sfr::IEN1, Ien1::RF.bits(), sfr::IRCON, Ircon::RF.bits(), Ircon::RF.bits()),
    source(2, sfr::IEN0, Ien0::PFAIL.bits(), sfr::TCON, Tcon::IE1.bits(), Tcon::IE1.bits()),
    source(10, sfr::IEN1, Ien1::SPI.bits(), sfr::IRCON, Ircon::SPI.bits(), Ircon::SPI.bits()),
    source(3, sfr::IEN0, Ien0::TF1.bits(), sfr::TCON, Tcon::TF1.bits(), Tcon::TF1.bits()),
    source(11, sfr::IEN1, Ien1::WUOP.bits(), sfr::IRCON, Ircon::WUOP.bits(), Ircon::WUOP.bits()),
    source(4, sfr::IEN0, Ien0::SER.bits(), sfr::S0CON, 0x03, 0),
    source(12, sfr::IEN1, Ien1::MISC.bits(), sfr::IRCON, Ircon::MISC.bits(), Ircon::MISC.bits()),
    source(
        5,
        sfr::IEN0,
        Ien0::TF2.bits(),
        sfr::IRCON,
        Ircon::TF2.bits() | Ircon::EXF2.bits(),
        0,
    ),
    source(13, sfr::IEN1, Ien1::TICK.bits(), sfr::IRCON, Ircon::TICK.bits(), Ircon::TICK.bits()),
];

/// Classic 8051/8052 sources: IE enables, IP selects high priority.
pub(super) const CLASSIC: [IrqSource; 6] = [
    source(0, sfr::IE, 0x01, sfr::TCON, Tcon::IE0.bits(), 0),
    source(1, sfr::IE, 0x02, sfr::TCON, Tcon::TF0.bits(), Tcon::TF0.bits()),
    source(2, sfr::IE, 0x04, sfr::TCON, Tcon::IE1.bits(), 0),
    source(3, sfr::IE, 0x08, sfr::TCON, Tcon::TF1.bits(), Tcon::TF1.bits()),
    source(4, sfr::IE, 0x10, sfr::S0CON, 0x03, 0),
    // TF2 | EXF2 in the 8052 T2CON layout.
    source(5, sfr::IE, 0x20, sfr::T2CON, 0xC0, 0),
];
