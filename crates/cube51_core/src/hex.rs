//! Intel HEX firmware loader.
//!
//! Only data (`00`) and end-of-file (`01`) records are understood. Loading
//! is not transactional: records accepted before an error stay in code
//! memory.

use std::io::BufRead;

use crate::cpu::Cpu;
use crate::error::HexError;
use crate::memory::Memory;

const RECORD_DATA: u8 = 0x00;
const RECORD_EOF: u8 = 0x01;

/// Load an Intel HEX image into code memory.
pub fn load<R: BufRead>(mem: &mut Memory, reader: R) -> Result<(), HexError> {
    let mut first = true;

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line?;
        let record = line.trim_end_matches(['\r', '\n']);
        if record.is_empty() {
            continue;
        }

        let Some(body) = record.strip_prefix(':') else {
            if first {
                return Err(HexError::UnsupportedFormat);
            }
            return Err(HexError::Malformed { line: line_no });
        };
        first = false;

        let bytes = parse_hex_bytes(body).ok_or(HexError::Malformed { line: line_no })?;
        if bytes.len() < 5 {
            return Err(HexError::Malformed { line: line_no });
        }
        let length = bytes[0] as usize;
        if bytes.len() != length + 5 {
            return Err(HexError::Malformed { line: line_no });
        }

        let address = u16::from_be_bytes([bytes[1], bytes[2]]);
        let record_type = bytes[3];
        let data = &bytes[4..4 + length];
        let found = bytes[4 + length];

        match record_type {
            RECORD_DATA => {
                // Data lands before the checksum is verified; a bad record
                // still leaves its bytes behind, like every record before it.
                mem.load_code(address, data);
                log::debug!("hex: {length} bytes at 0x{address:04X}");
            }
            RECORD_EOF => {}
            _ => {
                return Err(HexError::UnsupportedRecord {
                    line: line_no,
                    record_type,
                })
            }
        }

        let expected = checksum(&bytes[..4 + length]);
        if expected != found {
            return Err(HexError::ChecksumFailure {
                line: line_no,
                expected,
                found,
            });
        }

        if record_type == RECORD_EOF {
            return Ok(());
        }
    }

    if first {
        return Err(HexError::UnsupportedFormat);
    }
    Err(HexError::NoEndMarker)
}

/// Load an Intel HEX image held in a string.
pub fn load_str(mem: &mut Memory, text: &str) -> Result<(), HexError> {
    load(mem, text.as_bytes())
}

impl Cpu {
    /// Load firmware into code memory. See [`load`].
    pub fn load_hex<R: BufRead>(&mut self, reader: R) -> Result<(), HexError> {
        load(&mut self.mem, reader)
    }
}

/// Two's complement of the byte sum.
fn checksum(bytes: &[u8]) -> u8 {
    bytes
        .iter()
        .fold(0u8, |sum, &b| sum.wrapping_add(b))
        .wrapping_neg()
}

fn parse_hex_bytes(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 || !text.is_ascii() {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).ok())
        .collect()
}
