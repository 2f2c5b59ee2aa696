use std::fmt;

/// Advisory fault conditions reported through [`Peripherals::except`].
///
/// Exceptions never alter the completion of the instruction that raised them;
/// the host decides per kind whether to stop, log or ignore.
///
/// [`Peripherals::except`]: crate::Peripherals::except
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Exception {
    /// Host configured breakpoint reached.
    Break,
    /// Stack above 0x7F with no upper data, or SP wrapped.
    Stack,
    /// `MOV A, ACC`.
    AccToA,
    IretPswMismatch,
    IretSpMismatch,
    IretAccMismatch,
    /// The reserved opcode 0xA5.
    IllegalOpcode,
    BusContention,
    SpiXrun,
    RadioXrun,
    I2c,
    XdataError,
}

impl Exception {
    pub const ALL: [Exception; 12] = [
        Exception::Break,
        Exception::Stack,
        Exception::AccToA,
        Exception::IretPswMismatch,
        Exception::IretSpMismatch,
        Exception::IretAccMismatch,
        Exception::IllegalOpcode,
        Exception::BusContention,
        Exception::SpiXrun,
        Exception::RadioXrun,
        Exception::I2c,
        Exception::XdataError,
    ];

    pub fn message(self) -> &'static str {
        match self {
            Exception::Break => "Breakpoint reached",
            Exception::Stack => {
                "SP exception: stack address > 127 with no upper memory, or SP roll over"
            }
            Exception::AccToA => "Invalid operation: acc-to-a move operation",
            Exception::IretPswMismatch => "PSW not preserved over interrupt call",
            Exception::IretSpMismatch => "SP not preserved over interrupt call",
            Exception::IretAccMismatch => "ACC not preserved over interrupt call",
            Exception::IllegalOpcode => "Invalid opcode: 0xA5 encountered",
            Exception::BusContention => "Hardware bus contention occurred",
            Exception::SpiXrun => "SPI FIFO overrun/underrun",
            Exception::RadioXrun => "Radio FIFO overrun/underrun",
            Exception::I2c => "I2C error",
            Exception::XdataError => "XDATA error",
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
