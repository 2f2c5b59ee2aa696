use thiserror::Error;

/// Rejected [`CpuConfig`](crate::CpuConfig) values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("code memory size {0} must be a power of two between 1 KiB and 64 KiB")]
    CodeSize(usize),
    #[error("external data size {0} must be zero or a power of two up to 64 KiB")]
    XdataSize(usize),
    #[error("timer prescaler must be at least 1")]
    Prescaler,
}

/// Intel HEX load failures. Records accepted before the failure stay in code
/// memory.
#[derive(Debug, Error)]
pub enum HexError {
    #[error("unsupported file format: image does not start with ':'")]
    UnsupportedFormat,
    #[error("unsupported record type {record_type:#04x} on line {line}")]
    UnsupportedRecord { line: usize, record_type: u8 },
    #[error("checksum failure on line {line}: expected {expected:#04x}, found {found:#04x}")]
    ChecksumFailure { line: usize, expected: u8, found: u8 },
    #[error("malformed record on line {line}")]
    Malformed { line: usize },
    #[error("no end-of-file record")]
    NoEndMarker,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
