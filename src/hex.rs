//! Intel HEX parsing
//!
//! The caller-side collaborator that turns a HEX text blob into the flat
//! byte image the core consumes. Only data (00) and end-of-file (01) records
//! are meaningful for the small AVR address space; gaps between data records
//! are filled with 0xFF, the erased flash value, so they are left untouched.

use thiserror::Error;

/// Intel HEX parse errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexError {
    /// Record does not start with ':' or is too short
    #[error("malformed record on line {0}")]
    MalformedRecord(usize),

    /// Record contains a non-hex character
    #[error("invalid hex digits on line {0}")]
    InvalidDigits(usize),

    /// Record checksum does not add up
    #[error("checksum mismatch on line {0}")]
    ChecksumMismatch(usize),

    /// Record type this tool does not support
    #[error("unsupported record type 0x{kind:02X} on line {line}")]
    UnsupportedRecordType {
        /// The record type byte
        kind: u8,
        /// Line number
        line: usize,
    },

    /// No data records before end of file
    #[error("no data records found")]
    NoData,
}

/// A parsed HEX image: flat bytes starting at `base`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexImage {
    /// Lowest address seen in any data record
    pub base: u32,
    /// Contiguous bytes from `base`, gaps filled with 0xFF
    pub data: Vec<u8>,
}

/// Parse Intel HEX text into a flat byte image
pub fn parse(text: &str) -> Result<HexImage, HexError> {
    let mut records: Vec<(u32, Vec<u8>)> = Vec::new();

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let body = line
            .strip_prefix(':')
            .ok_or(HexError::MalformedRecord(line_no))?;
        if body.len() < 10 || body.len() % 2 != 0 {
            return Err(HexError::MalformedRecord(line_no));
        }

        let bytes: Vec<u8> = (0..body.len() / 2)
            .map(|i| u8::from_str_radix(&body[i * 2..i * 2 + 2], 16))
            .collect::<Result<_, _>>()
            .map_err(|_| HexError::InvalidDigits(line_no))?;

        let count = bytes[0] as usize;
        if bytes.len() != count + 5 {
            return Err(HexError::MalformedRecord(line_no));
        }
        if bytes.iter().fold(0u8, |sum, b| sum.wrapping_add(*b)) != 0 {
            return Err(HexError::ChecksumMismatch(line_no));
        }

        let address = ((bytes[1] as u32) << 8) | bytes[2] as u32;
        let kind = bytes[3];
        match kind {
            0x00 => records.push((address, bytes[4..4 + count].to_vec())),
            0x01 => break,
            _ => return Err(HexError::UnsupportedRecordType { kind, line: line_no }),
        }
    }

    if records.is_empty() {
        return Err(HexError::NoData);
    }

    let base = records.iter().map(|(addr, _)| *addr).min().unwrap_or(0);
    let end = records
        .iter()
        .map(|(addr, data)| *addr as usize + data.len())
        .max()
        .unwrap_or(0);

    let mut data = vec![0xFF; end - base as usize];
    for (addr, record) in &records {
        let offset = (*addr - base) as usize;
        data[offset..offset + record.len()].copy_from_slice(record);
    }

    Ok(HexImage { base, data })
}
